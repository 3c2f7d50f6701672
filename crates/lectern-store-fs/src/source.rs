//! Raw document bytes from the local filesystem.

use std::fs;
use std::io;
use std::path::Path;

use lectern_core::dispatch::DocumentSource;

/// [`DocumentSource`] over `std::fs`.
#[derive(Debug, Default)]
pub struct FsDocumentSource;

impl FsDocumentSource {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSource for FsDocumentSource {
    type Error = io::Error;

    fn read_bytes(&mut self, path: &Path) -> Result<Vec<u8>, io::Error> {
        fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn reads_raw_bytes_without_interpreting_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, b"\xB5\xDA\xD2\xBB").unwrap();

        let mut source = FsDocumentSource::new();
        assert_eq!(source.read_bytes(&path).unwrap(), b"\xB5\xDA\xD2\xBB");
    }

    #[test]
    fn missing_files_surface_the_io_error() {
        let mut source = FsDocumentSource::new();
        assert!(source.read_bytes(Path::new("/no/such/doc.txt")).is_err());
    }
}
