use crate::error::FinsheetError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

/// A reader over a spreadsheet package, either on disk or already in memory
pub(crate) enum SourceReader {
    /// Local file reader
    Local(BufReader<File>),
    /// In-memory buffer (uploads, test fixtures)
    Memory(Cursor<Vec<u8>>),
}

impl SourceReader {
    /// Opens a local file for reading
    ///
    /// # Arguments
    /// * `path` - Path to the file
    ///
    /// # Returns
    /// * `Result<SourceReader, FinsheetError>` - Reader for the file content
    pub(crate) fn open(path: &Path) -> Result<SourceReader, FinsheetError> {
        let file = File::open(path)?;
        Ok(SourceReader::Local(BufReader::new(file)))
    }

    /// Wraps bytes that are already loaded
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> SourceReader {
        SourceReader::Memory(Cursor::new(bytes))
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::Local(reader) => reader.read(buf),
            SourceReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::Local(reader) => reader.seek(pos),
            SourceReader::Memory(reader) => reader.seek(pos),
        }
    }
}
