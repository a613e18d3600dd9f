use std::hash::{Hash, Hasher};

/// Snapshot of a file's identity on disk: a hash of its bytes plus the
/// last-modified timestamp. Captured on load and successful save, compared
/// on demand to spot edits made behind the editor's back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModificationRecord {
    hash: u64,
    modified: Option<std::time::SystemTime>,
}

impl ModificationRecord {
    /// Reads the file's current state. A missing file hashes like an empty
    /// one with no timestamp, so a record captured before the first save
    /// still compares cleanly once the file appears with the same bytes
    /// written.
    #[must_use]
    pub fn capture(path: &std::path::Path) -> Self {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok();

        let hash = match crate::mmap::read_file_bytes(path) {
            Ok(bytes) => hash_bytes(&bytes),
            Err(_) => hash_bytes(&[]),
        };

        Self { hash, modified }
    }

    /// Whether the file on disk still matches this record.
    #[must_use]
    pub fn matches_disk(&self, path: &std::path::Path) -> bool {
        *self == Self::capture(path)
    }
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
