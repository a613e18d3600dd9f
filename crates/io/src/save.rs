use std::io::Write;

/// Writes `contents` to `path` by staging a temporary file and atomically
/// renaming it over the destination. The destination is left untouched on
/// any failure.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or
/// if the final rename fails.
pub fn atomic_write(path: &std::path::Path, contents: &[u8]) -> std::io::Result<()> {
    // The temp file must live in the *same directory* as the target file.
    // This is strictly required for atomic renames; if the temp file is in
    // /tmp but the target is on a different filesystem, the rename fails.
    let parent_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent_dir)?;

    staged.write_all(contents)?;

    // Ensure all bytes are physically flushed before the rename makes them
    // the file's contents.
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        atomic_write(&target, b"hello\n").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"hello\n");
    }

    #[test]
    fn test_atomic_write_replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        std::fs::write(&target, b"old contents").unwrap();

        atomic_write(&target, b"new").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_atomic_write_failure_leaves_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("out.txt");

        assert!(atomic_write(&target, b"x").is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        atomic_write(&target, b"data").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.txt")]);
    }
}
