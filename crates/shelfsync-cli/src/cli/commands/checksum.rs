//! Checksum command: MD5 and SHA1 of a file, with optional verification.

use anyhow::{bail, Result};
use shelfsync_core::catalog::DeclaredDigest;
use shelfsync_core::checksum::{self, Algorithm, Verdict};
use std::path::Path;

/// Print both digests of `path`; when expected digests are given, check them
/// with the same combining policy the sync uses.
pub fn run_checksum(path: &Path, md5: Option<&str>, sha1: Option<&str>) -> Result<()> {
    let md5_hex = checksum::digest_path(path, Algorithm::Md5)?;
    let sha1_hex = checksum::digest_path(path, Algorithm::Sha1)?;
    println!("MD5   {}  {}", md5_hex, path.display());
    println!("SHA1  {}  {}", sha1_hex, path.display());

    if md5.is_none() && sha1.is_none() {
        return Ok(());
    }
    let md5_verdict = checksum::verify(path, &DeclaredDigest::from_optional(md5), Algorithm::Md5)?;
    let sha1_verdict =
        checksum::verify(path, &DeclaredDigest::from_optional(sha1), Algorithm::Sha1)?;
    print_verdict(&md5_verdict);
    print_verdict(&sha1_verdict);
    if !checksum::combine(&md5_verdict, &sha1_verdict) {
        bail!("checksum verification failed for {}", path.display());
    }
    println!("verified");
    Ok(())
}

fn print_verdict(v: &Verdict) {
    let state = if v.skipped() {
        "skipped"
    } else if v.passed {
        "OK"
    } else {
        "FAILED"
    };
    println!("{} {}", v.algorithm, state);
}
