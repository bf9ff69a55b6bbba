use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::relocator::error::{Result, ToolError};
use crate::relocator::scan::DirectoryEntry;

/// Result of a relocation attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// The directory now lives at the contained path.
    Moved(PathBuf),
    /// Something already occupies the target; the source was left untouched.
    DestinationExists(PathBuf),
}

/// Moves `entry` to `destination_root/<entry name>`, creating the root when
/// needed. Never overwrites an existing target.
pub fn relocate(entry: &DirectoryEntry, destination_root: &Path) -> Result<Relocation> {
    let target = destination_root.join(&entry.name);

    if let Some(parent) = target.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| ToolError::Destination {
            path: parent.to_path_buf(),
            source,
        })?;
        info!(path = %parent.display(), "created destination parent folder");
    }

    if fs::symlink_metadata(&target).is_ok() {
        return Ok(Relocation::DestinationExists(target));
    }

    move_directory(&entry.path, &target).map_err(|source| ToolError::MoveFailure {
        from: entry.path.clone(),
        to: target.clone(),
        source,
    })?;
    Ok(Relocation::Moved(target))
}

/// Renames `from` to `to`, copying then deleting when they sit on different
/// devices.
pub fn move_directory(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy_then_remove(from, to)
        }
        Err(err) => Err(err),
    }
}

/// Copies `from` to `to`, then deletes `from`. A failed copy removes the
/// partial target. A failed removal leaves a complete target next to a
/// partially deleted source, which is logged for manual reconciliation.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(err) = copy_tree(from, to) {
        if to.exists()
            && let Err(cleanup) = fs::remove_dir_all(to)
        {
            warn!(path = %to.display(), error = %cleanup, "failed to remove partial copy");
        }
        return Err(err);
    }

    fs::remove_dir_all(from).inspect_err(|err| {
        warn!(
            source = %from.display(),
            target = %to.display(),
            error = %err,
            "copy is complete but source removal is incomplete, reconcile manually"
        );
    })
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    fs::copy(link, target).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry_at(source: &Path, name: &str) -> DirectoryEntry {
        let path = source.join(name);
        fs::create_dir_all(&path).expect("source directory");
        fs::write(path.join("scan.dcm"), b"pixels").expect("payload written");
        let (id, label) = name.split_once('-').expect("delimited name");
        DirectoryEntry {
            name: name.to_string(),
            path,
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn creates_missing_destination_root() {
        let temp_dir = tempdir().expect("temporary directory");
        let entry = entry_at(&temp_dir.path().join("source"), "UA01-Zhang");
        let destination = temp_dir.path().join("nested").join("out");

        let outcome = relocate(&entry, &destination).expect("relocated");

        let target = destination.join("UA01-Zhang");
        assert_eq!(outcome, Relocation::Moved(target.clone()));
        assert!(target.join("scan.dcm").is_file());
        assert!(!entry.path.exists());
    }

    #[test]
    fn existing_target_is_never_overwritten() {
        let temp_dir = tempdir().expect("temporary directory");
        let entry = entry_at(&temp_dir.path().join("source"), "UA01-Zhang");
        let destination = temp_dir.path().join("out");
        fs::create_dir_all(destination.join("UA01-Zhang")).expect("existing target");

        let outcome = relocate(&entry, &destination).expect("skip is not an error");

        assert!(matches!(outcome, Relocation::DestinationExists(_)));
        assert!(entry.path.join("scan.dcm").is_file());
    }

    #[test]
    fn blocked_destination_root_is_a_destination_error() {
        let temp_dir = tempdir().expect("temporary directory");
        let entry = entry_at(&temp_dir.path().join("source"), "UA01-Zhang");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"file").expect("blocking file");

        let error = relocate(&entry, &blocker.join("out")).expect_err("cannot create under a file");

        assert!(matches!(error, ToolError::Destination { .. }));
        assert!(entry.path.exists());
    }

    #[test]
    fn copy_then_remove_moves_the_whole_tree() {
        let temp_dir = tempdir().expect("temporary directory");
        let from = temp_dir.path().join("UA01-Zhang");
        fs::create_dir_all(from.join("series")).expect("nested dir");
        fs::write(from.join("series").join("a.dcm"), b"a").expect("nested file");

        let to = temp_dir.path().join("out").join("UA01-Zhang");
        fs::create_dir_all(to.parent().expect("parent")).expect("destination root");
        copy_then_remove(&from, &to).expect("copied and removed");

        assert!(!from.exists());
        assert_eq!(fs::read(to.join("series").join("a.dcm")).expect("copied file"), b"a");
    }

    #[test]
    fn failed_copy_leaves_no_partial_target() {
        let temp_dir = tempdir().expect("temporary directory");
        let to = temp_dir.path().join("UA01-Zhang");

        let error = copy_then_remove(&temp_dir.path().join("vanished"), &to);

        assert!(error.is_err());
        assert!(!to.exists());
    }

    #[test]
    fn copy_tree_preserves_nested_content() {
        let temp_dir = tempdir().expect("temporary directory");
        let from = temp_dir.path().join("from");
        fs::create_dir_all(from.join("series").join("1")).expect("nested dirs");
        fs::write(from.join("series").join("1").join("a.dcm"), b"a").expect("nested file");

        let to = temp_dir.path().join("to");
        copy_tree(&from, &to).expect("copied");

        assert_eq!(
            fs::read(to.join("series").join("1").join("a.dcm")).expect("copied file"),
            b"a"
        );
    }
}
