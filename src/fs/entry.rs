// src/fs/entry.rs
//! Directory listing entries.

use std::fs::Metadata;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immediate child of a listed directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    /// Attribute summary in fixed order: directory, archive, read-only,
    /// hidden, system, reparse point. Unset positions hold `-`.
    pub mode: String,
    pub last_write_time_utc: DateTime<Utc>,
    /// Length in bytes; absent for directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

#[cfg(windows)]
pub fn mode_string(_name: &str, metadata: &Metadata, is_symlink: bool) -> String {
    use std::os::windows::fs::MetadataExt;

    const READONLY: u32 = 0x0001;
    const HIDDEN: u32 = 0x0002;
    const SYSTEM: u32 = 0x0004;
    const ARCHIVE: u32 = 0x0020;

    let attributes = metadata.file_attributes();
    let mut mode = String::with_capacity(6);
    mode.push(if metadata.is_dir() { 'd' } else { '-' });
    mode.push(if attributes & ARCHIVE != 0 { 'a' } else { '-' });
    mode.push(if attributes & READONLY != 0 { 'r' } else { '-' });
    mode.push(if attributes & HIDDEN != 0 { 'h' } else { '-' });
    mode.push(if attributes & SYSTEM != 0 { 's' } else { '-' });
    mode.push(if is_symlink { 'l' } else { '-' });
    mode
}

/// Unix has no archive or system attribute; hidden means a dot name.
#[cfg(not(windows))]
pub fn mode_string(name: &str, metadata: &Metadata, is_symlink: bool) -> String {
    let mut mode = String::with_capacity(6);
    mode.push(if metadata.is_dir() { 'd' } else { '-' });
    mode.push('-');
    mode.push(if metadata.permissions().readonly() { 'r' } else { '-' });
    mode.push(if name.starts_with('.') { 'h' } else { '-' });
    mode.push('-');
    mode.push(if is_symlink { 'l' } else { '-' });
    mode
}
