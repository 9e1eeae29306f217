use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the encoded image for each loop iteration.
pub trait ImageSource: Send {
    fn read(&mut self) -> Result<Vec<u8>, std::io::Error>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Re-reads one file from disk on every call, picking up any replacement.
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileImageSource {
    fn read(&mut self) -> Result<Vec<u8>, std::io::Error> {
        fs::read(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_current_file_content_each_time() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faces.jpg");
        fs::write(&path, b"first").unwrap();
        let mut source = FileImageSource::new(&path);

        assert_eq!(source.read().unwrap(), b"first");
        fs::write(&path, b"second").unwrap();
        assert_eq!(source.read().unwrap(), b"second");
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let mut source = FileImageSource::new(tmp.path().join("missing.jpg"));
        assert!(source.read().is_err());
        assert!(source.describe().ends_with("missing.jpg"));
    }
}
