//! File verification against manifest-declared MD5/SHA1 digests.
//!
//! Digests are computed by streaming the file in fixed-size blocks. A digest the
//! manifest does not provide is never computed and always passes.

use anyhow::{Context, Result};
use md5::Md5;
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::catalog::{Asset, DeclaredDigest};

const BUF_SIZE: usize = 64 * 1024;

/// Marker stored in [`Verdict::computed`] when no computation was performed.
pub const SKIPPED: &str = "skipped";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha1,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => f.write_str("MD5"),
            Algorithm::Sha1 => f.write_str("SHA1"),
        }
    }
}

/// Outcome of checking one file against one declared digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub algorithm: Algorithm,
    pub passed: bool,
    pub declared: String,
    pub computed: String,
}

impl Verdict {
    pub fn skipped(&self) -> bool {
        self.computed == SKIPPED
    }
}

/// Compute the digest of a file and return it as lowercase hex.
pub fn digest_path(path: &Path, algorithm: Algorithm) -> Result<String> {
    match algorithm {
        Algorithm::Md5 => stream_digest::<Md5>(path),
        Algorithm::Sha1 => stream_digest::<Sha1>(path),
    }
}

fn stream_digest<D: Digest>(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify `path` against `declared`.
///
/// `NotProvided` passes without touching the file. An I/O failure is returned
/// as an error, never as a failed verdict.
pub fn verify(path: &Path, declared: &DeclaredDigest, algorithm: Algorithm) -> Result<Verdict> {
    let expected = match declared {
        DeclaredDigest::NotProvided => {
            return Ok(Verdict {
                algorithm,
                passed: true,
                declared: declared.as_str().to_string(),
                computed: SKIPPED.to_string(),
            })
        }
        DeclaredDigest::Provided(hex) => hex,
    };
    let computed = digest_path(path, algorithm)
        .with_context(|| format!("{} check failure", algorithm))?;
    Ok(Verdict {
        algorithm,
        passed: computed == *expected,
        declared: expected.clone(),
        computed,
    })
}

/// Both per-algorithm verdicts for one file and the combined outcome.
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub md5: Verdict,
    pub sha1: Verdict,
}

impl FileCheck {
    /// Overall pass if at least one check passes on its own.
    pub fn passed(&self) -> bool {
        combine(&self.md5, &self.sha1)
    }

    /// Individual checks that failed, for the audit log.
    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        [&self.md5, &self.sha1].into_iter().filter(|v| !v.passed)
    }
}

/// Combining policy across MD5 and SHA1: fail only if neither passes.
pub fn combine(md5: &Verdict, sha1: &Verdict) -> bool {
    md5.passed || sha1.passed
}

/// Run both checks for `path` against the digests declared by `asset`.
pub fn check_file(path: &Path, asset: &Asset) -> Result<FileCheck> {
    Ok(FileCheck {
        md5: verify(path, &asset.md5, Algorithm::Md5)?,
        sha1: verify(path, &asset.sha1, Algorithm::Sha1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const HELLO_MD5: &str = "b1946ac92492d2347c6235b4d2611184";
    const HELLO_SHA1: &str = "f572d396fae9206628714fb2ce00f72e94f2258f";

    fn verdict(algorithm: Algorithm, passed: bool) -> Verdict {
        Verdict {
            algorithm,
            passed,
            declared: "x".to_string(),
            computed: "y".to_string(),
        }
    }

    #[test]
    fn digest_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(digest_path(f.path(), Algorithm::Md5).unwrap(), EMPTY_MD5);
        assert_eq!(
            digest_path(f.path(), Algorithm::Sha1).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn verify_known_content_ignores_declared_case() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let declared = DeclaredDigest::parse(&HELLO_MD5.to_ascii_uppercase());
        let v = verify(f.path(), &declared, Algorithm::Md5).unwrap();
        assert!(v.passed);
        assert_eq!(v.computed, HELLO_MD5);
        let v = verify(f.path(), &DeclaredDigest::parse(HELLO_SHA1), Algorithm::Sha1).unwrap();
        assert!(v.passed);
    }

    #[test]
    fn mismatch_is_a_failed_verdict() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let v = verify(f.path(), &DeclaredDigest::parse(EMPTY_MD5), Algorithm::Md5).unwrap();
        assert!(!v.passed);
        assert_eq!(v.declared, EMPTY_MD5);
        assert_eq!(v.computed, HELLO_MD5);
    }

    #[test]
    fn sentinel_skips_even_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let v = verify(&missing, &DeclaredDigest::parse("n/a"), Algorithm::Sha1).unwrap();
        assert!(v.passed);
        assert!(v.skipped());
        assert_eq!(v.declared, "n/a");
        assert_eq!(v.computed, SKIPPED);
    }

    #[test]
    fn io_failure_is_an_error_not_a_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.pdf");
        assert!(verify(&missing, &DeclaredDigest::parse(EMPTY_MD5), Algorithm::Md5).is_err());
    }

    #[test]
    fn combining_policy() {
        let pass = |a| verdict(a, true);
        let fail = |a| verdict(a, false);
        assert!(combine(&pass(Algorithm::Md5), &fail(Algorithm::Sha1)));
        assert!(combine(&fail(Algorithm::Md5), &pass(Algorithm::Sha1)));
        assert!(!combine(&fail(Algorithm::Md5), &fail(Algorithm::Sha1)));
        assert!(combine(&pass(Algorithm::Md5), &pass(Algorithm::Sha1)));
    }

    #[test]
    fn check_file_reports_individual_failures() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let asset = Asset {
            declared_name: "PDF".into(),
            url: "https://dl/a.pdf".into(),
            human_size: "6 B".into(),
            md5: DeclaredDigest::parse(HELLO_MD5),
            sha1: DeclaredDigest::parse("0000000000000000000000000000000000000000"),
        };
        let check = check_file(f.path(), &asset).unwrap();
        assert!(check.passed());
        let failed: Vec<_> = check.failures().map(|v| v.algorithm).collect();
        assert_eq!(failed, vec![Algorithm::Sha1]);
    }
}
