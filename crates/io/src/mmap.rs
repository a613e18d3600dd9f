#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    ///   Zero-length files cannot be mapped; use [`read_file_text`] for the
    ///   general read path.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Caller only gets immutable &[u8]
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Whether file is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of mapped file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Reads a whole file through a memory map.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or mapped.
pub fn read_file_bytes(path: impl AsRef<std::path::Path>) -> std::io::Result<Vec<u8>> {
    let path = path.as_ref();

    // mmap of a zero-length file fails at the OS level, so short-circuit.
    if std::fs::metadata(path)?.len() == 0 {
        return Ok(Vec::new());
    }

    Ok(MmapFile::open(path)?.as_slice().to_vec())
}

/// Reads a whole file as text. Invalid UTF-8 is replaced rather than
/// rejected, matching what an editor should do with a slightly mangled
/// file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or mapped.
pub fn read_file_text(path: impl AsRef<std::path::Path>) -> std::io::Result<String> {
    Ok(String::from_utf8_lossy(&read_file_bytes(path)?).into_owned())
}
