// src/fetch/staging.rs

//! Staging directory selection and locking
//!
//! A component fetched from `https://host/owner/repo` is staged under
//! `<root>/repo`. Each staged directory carries a marker file recording the
//! address it was cloned from, so a later install of the same component finds
//! and reuses it instead of cloning again.
//!
//! # Naming
//!
//! 1. `<root>/<segment>` if it is vacant (missing or empty) or already owned
//!    by the same address
//! 2. otherwise `<root>/<segment>-<hash>`, where `<hash>` is the first eight
//!    hex digits of the SHA-256 of the address, under the same rule
//! 3. otherwise the install fails with a staging conflict
//!
//! Names are therefore bounded and depend only on the address. An occupied
//! directory that is not owned by the address is never written to.
//!
//! # Locking
//!
//! Selection and cloning happen under an exclusive `flock` on
//! `<root>/.locks/<segment>.lock`, so two processes installing components
//! with the same segment are serialised.

use crate::error::{Error, Result};
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Marker file written into a staged directory after a successful clone
pub const MARKER_FILE: &str = ".compman-source";

/// Directory holding per-segment lock files
const LOCK_DIR: &str = ".locks";

/// Number of hex digits of the address hash used for disambiguation
const SUFFIX_LEN: usize = 8;

/// Directory chosen for a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingSlot {
    /// Nothing staged yet; the caller clones into this directory
    Fresh(PathBuf),
    /// Already staged from the same address
    Reuse(PathBuf),
}

impl StagingSlot {
    pub fn path(&self) -> &Path {
        match self {
            StagingSlot::Fresh(path) | StagingSlot::Reuse(path) => path,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Occupancy {
    Vacant,
    Owned,
    Foreign,
}

/// Final path segment of a remote address, without a trailing `.git`
pub fn directory_name(address: &str) -> Option<String> {
    let last = match Url::parse(address) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => address
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .map(str::to_string),
    }?;

    let name = last.strip_suffix(".git").unwrap_or(&last);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Short, stable hash of an address used to disambiguate directory names
pub fn address_suffix(address: &str) -> String {
    let digest = hex::encode(Sha256::digest(address.as_bytes()));
    digest[..SUFFIX_LEN].to_string()
}

/// Pick the staging directory for `address` under `root`
pub fn select_staging_dir(root: &Path, name: &str, address: &str) -> Result<StagingSlot> {
    let candidates = [
        root.join(name),
        root.join(format!("{}-{}", name, address_suffix(address))),
    ];

    for candidate in &candidates {
        match occupancy(candidate, address)? {
            Occupancy::Vacant => return Ok(StagingSlot::Fresh(candidate.clone())),
            Occupancy::Owned => return Ok(StagingSlot::Reuse(candidate.clone())),
            Occupancy::Foreign => {
                debug!("Staging directory {} is taken", candidate.display());
            }
        }
    }

    Err(Error::StagingConflict {
        path: candidates[candidates.len() - 1].clone(),
    })
}

fn occupancy(path: &Path, address: &str) -> io::Result<Occupancy> {
    if !path.exists() {
        return Ok(Occupancy::Vacant);
    }
    if !path.is_dir() {
        return Ok(Occupancy::Foreign);
    }

    let marker = path.join(MARKER_FILE);
    if marker.is_file() {
        let owner = fs::read_to_string(&marker)?;
        return Ok(if owner.trim() == address {
            Occupancy::Owned
        } else {
            Occupancy::Foreign
        });
    }

    if fs::read_dir(path)?.next().is_none() {
        Ok(Occupancy::Vacant)
    } else {
        Ok(Occupancy::Foreign)
    }
}

/// Record that `dir` was staged from `address`
pub fn write_marker(dir: &Path, address: &str) -> io::Result<()> {
    fs::write(dir.join(MARKER_FILE), format!("{}\n", address))
}

/// Exclusive lock guarding one staging name
///
/// Released when dropped.
pub struct StagingLock {
    /// The lock file handle (kept open to maintain lock)
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl StagingLock {
    /// Acquire the lock for `name` under `root`, blocking until available
    pub fn acquire(root: &Path, name: &str) -> Result<Self> {
        let path = root.join(LOCK_DIR).join(format!("{}.lock", name));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        file.lock_exclusive().map_err(|e| {
            Error::IoError(format!(
                "Failed to acquire staging lock {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!("Acquired staging lock at {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "https://github.com/owner/repo";

    #[test]
    fn test_directory_name() {
        assert_eq!(directory_name(ADDRESS).as_deref(), Some("repo"));
        assert_eq!(directory_name("https://github.com/owner/repo/").as_deref(), Some("repo"));
        assert_eq!(directory_name("https://github.com/owner/repo.git").as_deref(), Some("repo"));
        assert_eq!(directory_name("git@github.com:owner/repo.git").as_deref(), Some("repo"));
        assert_eq!(directory_name("https://github.com/"), None);
        assert_eq!(directory_name("https://github.com/owner/.."), None);
    }

    #[test]
    fn test_address_suffix_is_stable() {
        let first = address_suffix(ADDRESS);
        assert_eq!(first.len(), SUFFIX_LEN);
        assert_eq!(first, address_suffix(ADDRESS));
        assert_ne!(first, address_suffix("https://github.com/other/repo"));
    }

    #[test]
    fn test_vacant_root_gives_plain_name() {
        let root = tempfile::tempdir().unwrap();
        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        assert_eq!(slot, StagingSlot::Fresh(root.path().join("repo")));
    }

    #[test]
    fn test_empty_directory_is_vacant() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("repo")).unwrap();
        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        assert_eq!(slot, StagingSlot::Fresh(root.path().join("repo")));
    }

    #[test]
    fn test_owned_directory_is_reused() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("repo");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("kb.scs"), "a -> b;;").unwrap();
        write_marker(&dir, ADDRESS).unwrap();

        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        assert_eq!(slot, StagingSlot::Reuse(dir));
    }

    #[test]
    fn test_foreign_directory_gets_hashed_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("repo");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("unrelated.txt"), "keep me").unwrap();

        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        let expected = root.path().join(format!("repo-{}", address_suffix(ADDRESS)));
        assert_eq!(slot, StagingSlot::Fresh(expected));
        assert_eq!(fs::read_to_string(dir.join("unrelated.txt")).unwrap(), "keep me");
    }

    #[test]
    fn test_directory_owned_by_other_address_is_foreign() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("repo");
        fs::create_dir(&dir).unwrap();
        write_marker(&dir, "https://github.com/someone-else/repo").unwrap();

        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        assert!(matches!(slot, StagingSlot::Fresh(path) if path != dir));
    }

    #[test]
    fn test_both_candidates_taken_is_a_conflict() {
        let root = tempfile::tempdir().unwrap();
        for name in ["repo".to_string(), format!("repo-{}", address_suffix(ADDRESS))] {
            let dir = root.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("file"), "x").unwrap();
        }

        let err = select_staging_dir(root.path(), "repo", ADDRESS).unwrap_err();
        assert!(matches!(err, Error::StagingConflict { .. }));
    }

    #[test]
    fn test_plain_file_is_foreign() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("repo"), "not a directory").unwrap();
        let slot = select_staging_dir(root.path(), "repo", ADDRESS).unwrap();
        assert_ne!(slot.path(), root.path().join("repo"));
    }

    #[test]
    fn test_lock_can_be_reacquired_after_drop() {
        let root = tempfile::tempdir().unwrap();
        let lock = StagingLock::acquire(root.path(), "repo").unwrap();
        assert!(lock.path().ends_with(".locks/repo.lock"));
        drop(lock);
        let again = StagingLock::acquire(root.path(), "repo").unwrap();
        assert!(again.path().exists());
    }
}
