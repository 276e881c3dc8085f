// src/fs/mod.rs
//! Filesystem inspection and manipulation.

pub mod drives;
pub mod entry;
pub mod executor;

pub use drives::DriveInfo;
pub use entry::FileEntry;
pub use executor::{FileContent, FileSystemExecutor};
