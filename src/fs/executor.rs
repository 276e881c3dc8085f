// src/fs/executor.rs
//! Filesystem command execution.
//!
//! The platform rename and copy primitives overwrite silently, so
//! destination collisions are checked explicitly before any data moves,
//! and a destination that resolves to the source itself is rejected.
//! Directory operations mirror recursively, subdirectories before the
//! files at each level; a per-file conflict stops the walk and leaves the
//! entries already written in place.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::fs::drives::{self, DriveInfo};
use crate::fs::entry::{mode_string, FileEntry};

/// An open file ready to stream back to the caller.
#[derive(Debug)]
pub struct FileContent {
    pub file: fs::File,
    pub file_name: String,
    pub media_type: String,
    pub length: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemExecutor;

impl FileSystemExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Open a regular file for reading, with its inferred media type.
    pub async fn get(&self, path: &Path) -> Result<FileContent> {
        let metadata = fs::metadata(path).await.map_err(|_| missing_file(path))?;
        if !metadata.is_file() {
            return Err(missing_file(path));
        }

        let file = fs::File::open(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        debug!(path = %path.display(), media_type, "opened file");
        Ok(FileContent {
            file,
            file_name,
            media_type,
            length: metadata.len(),
        })
    }

    /// Immediate children of a directory, sorted by name. A child whose
    /// metadata cannot be read is skipped instead of failing the listing.
    pub async fn list(&self, path: &Path) -> Result<Vec<FileEntry>> {
        let metadata = fs::metadata(path).await.map_err(|_| missing_dir(path))?;
        if !metadata.is_dir() {
            return Err(missing_dir(path));
        }

        let mut entries = Vec::new();
        let mut dir_stream = fs::read_dir(path).await?;
        while let Some(entry) = dir_stream.next_entry().await? {
            match describe(&entry).await {
                Ok(described) => entries.push(described),
                Err(err) => {
                    warn!(path = %entry.path().display(), %err, "skipping unreadable entry");
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Copy a file or a directory tree.
    pub async fn copy(&self, source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
        let metadata = fs::metadata(source).await.map_err(|_| missing_path(source))?;
        if metadata.is_dir() {
            copy_tree(source, dest, overwrite).await
        } else {
            copy_file(source, dest, overwrite).await
        }
    }

    /// Move a file or a directory tree. Directories are mirrored with
    /// per-file moves; each source directory is pruned once emptied.
    pub async fn move_path(&self, source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
        let metadata = fs::metadata(source).await.map_err(|_| missing_path(source))?;
        if metadata.is_dir() {
            move_tree(source, dest, overwrite).await
        } else {
            move_file(source, dest, overwrite).await
        }
    }

    /// Remove a file or a directory tree. A missing path is not an error.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "delete of a missing path is a no-op");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(path).await?;
        } else {
            fs::remove_file(path).await?;
        }
        Ok(())
    }

    /// Snapshot of every mounted volume.
    pub fn drives(&self) -> Vec<DriveInfo> {
        drives::snapshot()
    }
}

async fn describe(entry: &fs::DirEntry) -> std::io::Result<FileEntry> {
    let name = entry.file_name().to_string_lossy().into_owned();
    let metadata = entry.metadata().await?;
    let last_write_time_utc = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let length = metadata.is_file().then(|| metadata.len());
    Ok(FileEntry {
        mode: mode_string(&name, &metadata, metadata.is_symlink()),
        name,
        last_write_time_utc,
        length,
    })
}

/// Destination rules shared by per-file copy and move: an existing
/// directory always collides, an existing file collides unless
/// `overwrite` is set.
async fn check_collision(dest: &Path, overwrite: bool) -> Result<()> {
    match fs::symlink_metadata(dest).await {
        Ok(existing) if existing.is_dir() => Err(dest_exists(dest)),
        Ok(_) if !overwrite => Err(dest_exists(dest)),
        _ => Ok(()),
    }
}

/// Whether the two paths resolve to the same existing entry. `fs::copy`
/// truncates its destination before reading the source, so a destination
/// aliasing the source would wipe the data; both paths are canonicalized
/// so spellings like `dir/../f` are caught as well.
async fn same_file(source: &Path, dest: &Path) -> Result<bool> {
    let resolved_source = fs::canonicalize(source).await?;
    match fs::canonicalize(dest).await {
        Ok(resolved_dest) => Ok(resolved_source == resolved_dest),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

async fn copy_file(source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    check_collision(dest, overwrite).await?;
    if same_file(source, dest).await? {
        return Err(same_path(dest));
    }
    fs::copy(source, dest).await?;
    Ok(())
}

async fn move_file(source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    check_collision(dest, overwrite).await?;
    if same_file(source, dest).await? {
        return Err(same_path(dest));
    }
    if overwrite && fs::symlink_metadata(dest).await.is_ok() {
        fs::remove_file(dest).await?;
    }
    fs::rename(source, dest).await?;
    Ok(())
}

async fn copy_tree(source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    fs::create_dir_all(dest).await?;
    let (dirs, files) = children(source).await?;
    for (name, child) in dirs {
        let target = dest.join(&name);
        Box::pin(copy_tree(&child, &target, overwrite)).await?;
    }
    for (name, child) in files {
        copy_file(&child, &dest.join(name), overwrite).await?;
    }
    Ok(())
}

async fn move_tree(source: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    // The source directory is pruned at the end, so moving a tree onto
    // itself would delete it.
    if same_file(source, dest).await? {
        return Err(same_path(dest));
    }
    fs::create_dir_all(dest).await?;
    let (dirs, files) = children(source).await?;
    for (name, child) in dirs {
        let target = dest.join(&name);
        Box::pin(move_tree(&child, &target, overwrite)).await?;
    }
    for (name, child) in files {
        move_file(&child, &dest.join(name), overwrite).await?;
    }
    // Contents are gone; drop the emptied source directory itself.
    fs::remove_dir(source).await?;
    Ok(())
}

/// Children of a directory split into subdirectories and everything else,
/// both name-sorted so walks are deterministic.
async fn children(path: &Path) -> Result<(Vec<(OsString, PathBuf)>, Vec<(OsString, PathBuf)>)> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    let mut dir_stream = fs::read_dir(path).await?;
    while let Some(entry) = dir_stream.next_entry().await? {
        let item = (entry.file_name(), entry.path());
        if entry.file_type().await?.is_dir() {
            dirs.push(item);
        } else {
            files.push(item);
        }
    }
    dirs.sort();
    files.sort();
    Ok((dirs, files))
}

fn missing_file(path: &Path) -> AgentError {
    AgentError::NotFound(format!("Could not find a file {}.", path.display()))
}

fn missing_dir(path: &Path) -> AgentError {
    AgentError::NotFound(format!("Could not find a directory {}.", path.display()))
}

fn missing_path(path: &Path) -> AgentError {
    AgentError::NotFound(format!("Could not find a file or a directory {}.", path.display()))
}

fn dest_exists(path: &Path) -> AgentError {
    AgentError::AlreadyExists(format!(
        "The destination path {} already exists.",
        path.display()
    ))
}

fn same_path(path: &Path) -> AgentError {
    AgentError::Io(std::io::Error::new(
        ErrorKind::InvalidInput,
        format!(
            "The destination path {} is the same as the source path.",
            path.display()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn get_streams_the_on_disk_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        tokio::fs::write(&file, b"# heading\nbody\n").await.unwrap();
        let executor = FileSystemExecutor::new();

        let mut content = executor.get(&file).await.unwrap();
        let mut read_back = Vec::new();
        content.file.read_to_end(&mut read_back).await.unwrap();
        assert_eq!(read_back, b"# heading\nbody\n");
        assert_eq!(content.media_type, "text/markdown");
    }

    #[tokio::test]
    async fn get_of_a_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.get(dir.path()).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().starts_with("Could not find a file "));
    }

    #[tokio::test]
    async fn list_of_a_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        tokio::fs::write(&file, b"x").await.unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.list(&file).await.unwrap_err();
        assert!(err.to_string().starts_with("Could not find a directory "));

        let err = executor.list(&dir.path().join("ghost")).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn media_type_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blob.qqq");
        tokio::fs::write(&file, b"data").await.unwrap();
        let executor = FileSystemExecutor::new();

        let content = executor.get(&file).await.unwrap();
        assert_eq!(content.media_type, "application/octet-stream");
        assert_eq!(content.file_name, "blob.qqq");
        assert_eq!(content.length, 4);
    }

    #[tokio::test]
    async fn collisions_name_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("taken.txt");
        tokio::fs::write(&dest, b"x").await.unwrap();

        let err = check_collision(&dest, false).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert!(err.to_string().contains("taken.txt"));
        assert!(check_collision(&dest, true).await.is_ok());
    }

    #[tokio::test]
    async fn a_directory_destination_collides_even_with_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("holder");
        tokio::fs::create_dir(&dest).await.unwrap();

        let err = check_collision(&dest, true).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn delete_of_a_missing_path_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let executor = FileSystemExecutor::new();

        executor.delete(&dir.path().join("ghost")).await.unwrap();
    }

    #[tokio::test]
    async fn copying_twice_without_overwrite_fails_the_second_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        tokio::fs::write(&source, b"payload").await.unwrap();
        let executor = FileSystemExecutor::new();

        executor.copy(&source, &dest, false).await.unwrap();
        let err = executor.copy(&source, &dest, false).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"payload");

        tokio::fs::write(&source, b"replacement").await.unwrap();
        executor.copy(&source, &dest, true).await.unwrap();
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"replacement");
    }

    #[tokio::test]
    async fn copying_a_file_onto_itself_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("sub")).await.unwrap();
        let file = dir.path().join("keep.txt");
        tokio::fs::write(&file, b"irreplaceable").await.unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.copy(&file, &file, true).await.unwrap_err();
        assert_eq!(err.code(), "IO");
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"irreplaceable");

        // A different spelling of the same file is still the same file.
        let alias = dir.path().join("sub/../keep.txt");
        let err = executor.copy(&file, &alias, true).await.unwrap_err();
        assert_eq!(err.code(), "IO");

        // Without overwrite the collision rule already rejects it.
        let err = executor.copy(&file, &file, false).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"irreplaceable");
    }

    #[tokio::test]
    async fn moving_a_file_onto_itself_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("keep.txt");
        tokio::fs::write(&file, b"irreplaceable").await.unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.move_path(&file, &file, true).await.unwrap_err();
        assert_eq!(err.code(), "IO");
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"irreplaceable");
    }

    #[tokio::test]
    async fn moving_a_directory_onto_itself_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        tokio::fs::create_dir(&tree).await.unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.move_path(&tree, &tree, true).await.unwrap_err();
        assert_eq!(err.code(), "IO");
        assert!(tree.exists());
    }

    #[tokio::test]
    async fn directory_copies_mirror_nested_trees() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tree");
        tokio::fs::create_dir_all(source.join("subdir")).await.unwrap();
        tokio::fs::write(source.join("1.txt"), b"one").await.unwrap();
        tokio::fs::write(source.join("subdir/2.txt"), b"two").await.unwrap();
        let dest = dir.path().join("mirror");
        let executor = FileSystemExecutor::new();

        executor.copy(&source, &dest, false).await.unwrap();

        assert_eq!(tokio::fs::read(dest.join("1.txt")).await.unwrap(), b"one");
        assert_eq!(
            tokio::fs::read(dest.join("subdir/2.txt")).await.unwrap(),
            b"two"
        );
        assert!(source.join("1.txt").exists());
    }

    #[tokio::test]
    async fn a_conflict_mid_walk_leaves_earlier_copies_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        tokio::fs::create_dir(&source).await.unwrap();
        tokio::fs::write(source.join("a.txt"), b"a").await.unwrap();
        tokio::fs::write(source.join("b.txt"), b"b").await.unwrap();
        let dest = dir.path().join("dst");
        tokio::fs::create_dir(&dest).await.unwrap();
        tokio::fs::write(dest.join("b.txt"), b"taken").await.unwrap();
        let executor = FileSystemExecutor::new();

        let err = executor.copy(&source, &dest, false).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_EXISTS");
        // a.txt walks before b.txt, so it landed before the conflict and
        // stays in place; the collision target is untouched.
        assert_eq!(tokio::fs::read(dest.join("a.txt")).await.unwrap(), b"a");
        assert_eq!(tokio::fs::read(dest.join("b.txt")).await.unwrap(), b"taken");
    }

    #[tokio::test]
    async fn a_moved_file_is_gone_from_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("keep.log");
        let dest = dir.path().join("moved.log");
        tokio::fs::write(&source, b"contents").await.unwrap();
        let executor = FileSystemExecutor::new();

        executor.move_path(&source, &dest, false).await.unwrap();

        let err = executor.get(&source).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"contents");
    }

    #[tokio::test]
    async fn moving_a_missing_source_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ghost.txt");
        let executor = FileSystemExecutor::new();

        let err = executor
            .move_path(&source, &dir.path().join("out.txt"), false)
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Could not find a file or a directory "));
        assert!(err.to_string().contains("ghost.txt"));
    }

    #[tokio::test]
    async fn moving_a_directory_prunes_the_emptied_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        tokio::fs::create_dir_all(source.join("nested")).await.unwrap();
        tokio::fs::write(source.join("keep.txt"), b"k").await.unwrap();
        tokio::fs::write(source.join("nested/inner.txt"), b"i").await.unwrap();
        let dest = dir.path().join("dst");
        let executor = FileSystemExecutor::new();

        executor.move_path(&source, &dest, false).await.unwrap();

        assert!(!source.exists());
        assert_eq!(tokio::fs::read(dest.join("keep.txt")).await.unwrap(), b"k");
        assert_eq!(
            tokio::fs::read(dest.join("nested/inner.txt")).await.unwrap(),
            b"i"
        );
    }

    #[tokio::test]
    async fn listing_reports_children_sorted_with_modes() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("work")).await.unwrap();
        tokio::fs::write(dir.path().join("b.txt"), b"bb").await.unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"a").await.unwrap();
        let executor = FileSystemExecutor::new();

        let entries = executor.list(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "work"]);
        assert_eq!(entries[0].length, Some(1));
        assert_eq!(entries[2].length, None);
        assert!(entries[2].mode.starts_with('d'));
    }
}
