//! Append-only byte buffer that moves to a temporary file once it grows
//! past a threshold

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, trace, warn};
use streamsheet_core::{Part, PartSource};
use tempfile::NamedTempFile;

/// Default in-memory threshold: 16 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 24;

/// Worksheet bytes, held in memory and optionally continued in a
/// temporary file.
///
/// The file holds everything migrated by earlier [`SpillBuffer::sync`]
/// calls; the memory segment holds what came after. The file is removed
/// when the buffer is closed or dropped.
pub struct SpillBuffer {
    memory: Vec<u8>,
    file: Option<NamedTempFile>,
    chunk_size: usize,
    temp_dir: Option<PathBuf>,
    spilled: u64,
}

impl SpillBuffer {
    pub fn new(chunk_size: usize, temp_dir: Option<PathBuf>) -> Self {
        Self {
            memory: Vec::new(),
            file: None,
            chunk_size,
            temp_dir,
            spilled: 0,
        }
    }

    /// Append bytes to the memory segment
    pub fn write(&mut self, bytes: &[u8]) {
        self.memory.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Total bytes written so far
    pub fn len(&self) -> u64 {
        self.spilled + self.memory.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once a backing file exists
    pub fn is_spilled(&self) -> bool {
        self.file.is_some()
    }

    /// Move the memory segment to the backing file if it reached the
    /// threshold. When the temporary file cannot be created or written the
    /// bytes stay in memory and the next sync tries again.
    pub fn sync(&mut self) -> io::Result<()> {
        if self.memory.len() < self.chunk_size {
            return Ok(());
        }
        if self.file.is_none() {
            match self.create_file() {
                Ok(file) => {
                    debug!("spilling worksheet buffer to {}", file.path().display());
                    self.file = Some(file);
                }
                Err(err) => {
                    warn!("cannot create temporary file, keeping worksheet in memory: {}", err);
                    return Ok(());
                }
            }
        }
        if let Err(err) = self.migrate() {
            warn!("cannot write temporary file, keeping worksheet in memory: {}", err);
            self.rollback();
        }
        Ok(())
    }

    /// A reader over everything written so far. With a backing file the
    /// memory segment is migrated first and an independent file handle is
    /// returned; otherwise the reader borrows the memory segment.
    pub fn reader(&mut self) -> io::Result<SpillReader<'_>> {
        if self.file.is_none() {
            return Ok(SpillReader::Memory(Cursor::new(&self.memory)));
        }
        self.migrate()?;
        match &self.file {
            Some(file) => {
                let mut handle = file.reopen()?;
                handle.seek(SeekFrom::Start(0))?;
                Ok(SpillReader::File(handle))
            }
            None => Ok(SpillReader::Memory(Cursor::new(&self.memory))),
        }
    }

    /// Discard the contents and remove the backing file
    pub fn close(&mut self) -> io::Result<()> {
        self.memory = Vec::new();
        self.spilled = 0;
        match self.file.take() {
            Some(file) => file.close(),
            None => Ok(()),
        }
    }

    /// Commit every outstanding byte and turn the buffer into a package part
    pub fn into_part(mut self) -> io::Result<Part> {
        match self.file.take() {
            None => Ok(Part::Bytes(std::mem::take(&mut self.memory))),
            Some(mut file) => {
                let len = self.spilled + self.memory.len() as u64;
                append_at(&mut file, self.spilled, &self.memory)?;
                file.as_file().set_len(len)?;
                self.memory = Vec::new();
                Ok(Part::Source(Box::new(SpilledPart { file, len })))
            }
        }
    }

    fn create_file(&self) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("streamsheet-").suffix(".xml");
        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    fn migrate(&mut self) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        if self.memory.is_empty() {
            return Ok(());
        }
        append_at(file, self.spilled, &self.memory)?;
        self.spilled += self.memory.len() as u64;
        trace!(
            "migrated {} bytes, {} bytes on disk",
            self.memory.len(),
            self.spilled
        );
        self.memory.clear();
        Ok(())
    }

    /// Cut the backing file back to its committed length after a failed
    /// migration. A file that holds nothing yet is dropped if it cannot be
    /// truncated; otherwise the stale tail is overwritten by the next
    /// migration, which starts at the committed offset.
    fn rollback(&mut self) {
        let Some(file) = self.file.as_ref() else {
            return;
        };
        let truncated = file.as_file().set_len(self.spilled);
        if let Err(err) = truncated {
            debug!("cannot truncate temporary file: {}", err);
            if self.spilled == 0 {
                self.file = None;
            }
        }
    }
}

/// Write `bytes` at `offset`, replacing anything a failed write left there
fn append_at<W: Write + Seek>(out: &mut W, offset: u64, bytes: &[u8]) -> io::Result<()> {
    out.seek(SeekFrom::Start(offset))?;
    out.write_all(bytes)?;
    out.flush()
}

impl fmt::Debug for SpillBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpillBuffer")
            .field("memory", &self.memory.len())
            .field("spilled", &self.spilled)
            .field("file", &self.file.as_ref().map(|file| file.path().to_path_buf()))
            .finish()
    }
}

/// Reader returned by [`SpillBuffer::reader`]
pub enum SpillReader<'a> {
    Memory(Cursor<&'a Vec<u8>>),
    File(File),
}

impl Read for SpillReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SpillReader::Memory(cursor) => cursor.read(buf),
            SpillReader::File(file) => file.read(buf),
        }
    }
}

impl Seek for SpillReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            SpillReader::Memory(cursor) => cursor.seek(pos),
            SpillReader::File(file) => file.seek(pos),
        }
    }
}

/// A finished worksheet that lives in a temporary file. The file is removed
/// when the part is dropped.
#[derive(Debug)]
struct SpilledPart {
    file: NamedTempFile,
    len: u64,
}

impl PartSource for SpilledPart {
    fn write_to(&self, out: &mut dyn Write) -> io::Result<u64> {
        let mut reader = self.file.reopen()?;
        io::copy(&mut reader, out)
    }

    fn len(&self) -> u64 {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn read_all(buffer: &mut SpillBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        buffer.reader().unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_small_buffer_stays_in_memory() {
        let mut buffer = SpillBuffer::new(1024, None);
        buffer.write_str("<row/>");
        buffer.sync().unwrap();
        assert!(!buffer.is_spilled());
        assert_eq!(read_all(&mut buffer), b"<row/>");
    }

    #[test]
    fn test_promotes_past_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = SpillBuffer::new(8, Some(dir.path().to_path_buf()));
        buffer.write_str("0123456789");
        buffer.sync().unwrap();
        assert!(buffer.is_spilled());
        buffer.write_str("abc");
        assert_eq!(buffer.len(), 13);
        assert_eq!(read_all(&mut buffer), b"0123456789abc");

        // Reading did not disturb appends
        buffer.write_str("def");
        assert_eq!(read_all(&mut buffer), b"0123456789abcdef");
    }

    #[test]
    fn test_unusable_temp_dir_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut buffer = SpillBuffer::new(4, Some(missing));
        buffer.write_str("0123456789");
        buffer.sync().unwrap();
        assert!(!buffer.is_spilled());
        assert_eq!(read_all(&mut buffer), b"0123456789");
    }

    #[test]
    fn test_close_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = SpillBuffer::new(1, Some(dir.path().to_path_buf()));
        buffer.write_str("xy");
        buffer.sync().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        buffer.close().unwrap();
        buffer.close().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_into_part_matches_memory_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut spilled = SpillBuffer::new(3, Some(dir.path().to_path_buf()));
        let mut memory = SpillBuffer::new(DEFAULT_CHUNK_SIZE, None);
        for chunk in ["<a>", "text", "</a>"] {
            spilled.write_str(chunk);
            spilled.sync().unwrap();
            memory.write_str(chunk);
            memory.sync().unwrap();
        }
        let spilled = spilled.into_part().unwrap();
        let memory = memory.into_part().unwrap();
        assert!(matches!(spilled, Part::Source(_)));
        assert_eq!(spilled.len(), 11);
        assert_eq!(spilled.to_vec().unwrap(), memory.to_vec().unwrap());
    }

    /// Accepts `capacity` bytes, then fails every write
    struct ShortDisk {
        inner: Cursor<Vec<u8>>,
        capacity: u64,
    }

    impl Write for ShortDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.inner.position()) as usize;
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = room.min(buf.len());
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for ShortDisk {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_append_at_overwrites_partial_write() {
        let mut disk = ShortDisk {
            inner: Cursor::new(Vec::new()),
            capacity: 6,
        };
        append_at(&mut disk, 0, b"<a>").unwrap();
        assert!(append_at(&mut disk, 3, b"text</a>").is_err());
        assert_eq!(disk.inner.get_ref().as_slice(), b"<a>tex");

        disk.capacity = 64;
        append_at(&mut disk, 3, b"text</a>").unwrap();
        assert_eq!(disk.inner.get_ref().as_slice(), b"<a>text</a>");
    }

    #[test]
    fn test_write_failure_keeps_bytes_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = SpillBuffer::new(8, Some(dir.path().to_path_buf()));
        buffer.write_str("0123456789");
        buffer.sync().unwrap();
        let path = buffer.file.as_ref().unwrap().path().to_path_buf();

        // A read-only handle makes every write to the backing file fail
        *buffer.file.as_mut().unwrap().as_file_mut() = File::open(&path).unwrap();
        buffer.write_str("abcdefghij");
        buffer.sync().unwrap();
        assert!(buffer.is_spilled());
        assert_eq!(buffer.len(), 20);
        assert_eq!(buffer.memory, b"abcdefghij");

        // Leftovers of an interrupted write past the committed length
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"abc")
            .unwrap();

        *buffer.file.as_mut().unwrap().as_file_mut() =
            std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        buffer.write_str("klmnopqr");
        buffer.sync().unwrap();
        assert!(buffer.memory.is_empty());
        assert_eq!(read_all(&mut buffer), b"0123456789abcdefghijklmnopqr");

        let part = buffer.into_part().unwrap();
        assert_eq!(part.to_vec().unwrap(), b"0123456789abcdefghijklmnopqr");
    }

    proptest! {
        #[test]
        fn prop_reader_sees_every_byte(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..32),
            chunk_size in 1usize..256,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let mut buffer = SpillBuffer::new(chunk_size, Some(dir.path().to_path_buf()));
            let mut expected = Vec::new();
            for chunk in &chunks {
                buffer.write(chunk);
                buffer.sync().unwrap();
                expected.extend_from_slice(chunk);
            }
            prop_assert_eq!(buffer.len(), expected.len() as u64);
            prop_assert_eq!(read_all(&mut buffer), expected);
        }
    }
}
