// src/fs/drives.rs
//! Mounted volume inventory.

use std::fs;

use serde::{Deserialize, Serialize};
use sysinfo::{Disk, Disks};
use tracing::debug;

/// One mounted volume. Every field has a zero default so a volume whose
/// probes fail still shows up instead of hiding the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInfo {
    pub name: String,
    pub drive_type: String,
    pub drive_format: String,
    pub volume_label: String,
    pub root_directory: String,
    pub total_size: u64,
    pub total_free_space: u64,
    pub available_free_space: u64,
    pub is_ready: bool,
}

/// Snapshot of every mounted volume.
pub fn snapshot() -> Vec<DriveInfo> {
    let disks = Disks::new_with_refreshed_list();
    debug!(count = disks.list().len(), "enumerated mounted volumes");
    disks.list().iter().map(describe).collect()
}

fn describe(disk: &Disk) -> DriveInfo {
    let mount = disk.mount_point();
    DriveInfo {
        name: mount.display().to_string(),
        drive_type: if disk.is_removable() { "Removable" } else { "Fixed" }.to_string(),
        drive_format: disk.file_system().to_string_lossy().into_owned(),
        volume_label: disk.name().to_string_lossy().into_owned(),
        root_directory: mount.display().to_string(),
        total_size: disk.total_space(),
        total_free_space: disk.available_space(),
        available_free_space: disk.available_space(),
        is_ready: fs::metadata(mount).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_volumes_serialize_with_zero_values() {
        let json = serde_json::to_value(DriveInfo::default()).unwrap();
        assert_eq!(json["totalSize"], 0);
        assert_eq!(json["isReady"], false);
        assert_eq!(json["volumeLabel"], "");
    }

    #[test]
    fn snapshot_fields_mirror_the_mount_point() {
        for drive in snapshot() {
            assert_eq!(drive.name, drive.root_directory);
            assert!(!drive.drive_type.is_empty());
        }
    }
}
