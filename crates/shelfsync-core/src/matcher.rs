//! Filename matcher: partitions a platform's catalog assets into files already
//! on disk and files still missing. Content is not looked at here.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Asset, CatalogEntry};
use crate::repair::WorkItem;

/// An asset whose expected file exists locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub asset: &'a Asset,
    pub filetype: String,
    /// Filename as found on disk (case preserved).
    pub filename: String,
}

/// An asset that cannot be matched or fetched because its URL carries no
/// usable filetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly<'a> {
    pub entry: &'a CatalogEntry,
    pub asset: &'a Asset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub local_files: usize,
    pub matches: usize,
    pub misses: usize,
    pub anomalies: usize,
    /// Local files no catalog asset accounts for (diagnostic only).
    pub unexplained: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome<'a> {
    pub matches: Vec<LocalMatch<'a>>,
    pub misses: BTreeSet<WorkItem>,
    pub anomalies: Vec<Anomaly<'a>>,
    pub stats: MatchStats,
}

/// Expected on-disk filename for an item's asset of `filetype`.
pub fn expected_filename(machine_name: &str, filetype: &str) -> String {
    format!("{}.{}", machine_name, filetype)
}

/// Matches every asset of `entries` against `local` filenames.
///
/// Filenames are compared case-insensitively. Each local file is matched at
/// most once, so an item listed in several bundles does not inflate counts.
pub fn match_platform<'a, I>(entries: I, local: &BTreeSet<String>) -> MatchOutcome<'a>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let by_lower: BTreeMap<String, &String> =
        local.iter().map(|n| (n.to_lowercase(), n)).collect();

    let mut out = MatchOutcome::default();
    let mut matched: BTreeSet<&String> = BTreeSet::new();

    for entry in entries {
        for asset in &entry.assets {
            let filetype = asset.filetype();
            if filetype.is_empty() {
                out.anomalies.push(Anomaly { entry, asset });
                continue;
            }
            let wanted = expected_filename(&entry.item_machine_name, &filetype);
            match by_lower.get(&wanted.to_lowercase()) {
                Some(on_disk) => {
                    if matched.insert(*on_disk) {
                        out.matches.push(LocalMatch {
                            entry,
                            asset,
                            filetype,
                            filename: (*on_disk).clone(),
                        });
                    }
                }
                None => {
                    out.misses.insert(WorkItem::new(&entry.item_machine_name, &filetype));
                }
            }
        }
    }

    out.stats = MatchStats {
        local_files: local.len(),
        matches: out.matches.len(),
        misses: out.misses.len(),
        anomalies: out.anomalies.len(),
        unexplained: local.len().saturating_sub(matched.len()),
    };
    out
}
