// src/listing/stats.rs
use super::DirectoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderStats {
    pub folder_count: usize,
    pub file_count: usize,
    pub total_size_bytes: u64,
    pub hidden_count: usize,
    pub total_count: usize,
}

impl FolderStats {
    /// Aggregate over the full, unfiltered entry set.
    pub fn from_entries(entries: &[DirectoryEntry]) -> Self {
        entries.iter().fold(FolderStats::default(), |mut stats, entry| {
            if entry.is_dir {
                stats.folder_count += 1;
            } else {
                stats.file_count += 1;
                stats.total_size_bytes += entry.size_bytes;
            }
            if entry.is_hidden() {
                stats.hidden_count += 1;
            }
            stats.total_count += 1;
            stats
        })
    }

    /// `None` for an empty folder, where no summary is shown.
    pub fn summarize(entries: &[DirectoryEntry]) -> Option<Self> {
        (!entries.is_empty()).then(|| Self::from_entries(entries))
    }
}
