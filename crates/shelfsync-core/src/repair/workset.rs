use std::collections::BTreeSet;
use std::fmt;

/// One pending download-and-verify unit: an item's file of one filetype.
///
/// Ordered by machine name then filetype, so a work set iterates the same way
/// on every run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkItem {
    pub machine_name: String,
    pub filetype: String,
}

impl WorkItem {
    pub fn new(machine_name: &str, filetype: &str) -> Self {
        Self {
            machine_name: machine_name.to_string(),
            filetype: filetype.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.machine_name, self.filetype)
    }
}

/// Files missing by name plus files present but failing verification.
pub fn build(missing: BTreeSet<WorkItem>, failed_existing: BTreeSet<WorkItem>) -> BTreeSet<WorkItem> {
    let mut work = missing;
    work.extend(failed_existing);
    work
}
