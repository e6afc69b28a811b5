//! EventIO file access

use crate::core::header::{parse_sync, ObjectHeader};
use crate::core::object::EventIoObject;
use crate::core::reader::ObjectReader;
use crate::error::{EventIoError, Result};
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Deepest level whose sub-objects are still scanned
pub const MAX_NESTING_DEPTH: u32 = 256;

/// Anything the file can be read from
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Check for the gzip magic bytes
pub fn is_gzip<P: AsRef<Path>>(path: P) -> Result<bool> {
    let mut magic = [0u8; 2];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Check for a sync marker at the start of the (decompressed) file
pub fn is_eventio<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let mut sync = [0u8; 4];
    let file = File::open(path)?;
    if is_gzip(path)? {
        // a corrupt gzip stream is just not an EventIO file
        return Ok(match MultiGzDecoder::new(file).read_exact(&mut sync) {
            Ok(()) => parse_sync(sync).is_ok(),
            Err(e) => {
                debug!("Could not decompress {}: {}", path.display(), e);
                false
            }
        });
    }
    match BufReader::new(file).read_exact(&mut sync) {
        Ok(()) => Ok(parse_sync(sync).is_ok()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// An opened EventIO file with its scanned object tree
pub struct EventIoFile {
    path: String,
    source: Box<dyn ReadSeek>,
    size: u64,
    objects: Vec<EventIoObject>,
}

impl EventIoFile {
    /// Open a plain or gzip compressed EventIO file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening new file {}", path.display());

        if !is_eventio(path)? {
            return Err(EventIoError::NotEventIo(path.display().to_string()));
        }

        let source: Box<dyn ReadSeek> = if is_gzip(path)? {
            info!("Found gzipped file");
            let mut data = Vec::new();
            MultiGzDecoder::new(File::open(path)?).read_to_end(&mut data)?;
            Box::new(Cursor::new(data))
        } else {
            info!("Found uncompressed file");
            Box::new(BufReader::new(File::open(path)?))
        };

        Self::from_source(path.display().to_string(), source)
    }

    /// Read an EventIO stream from any seekable reader
    pub fn from_reader<R: Read + Seek + 'static>(reader: R) -> Result<Self> {
        Self::from_source("<reader>".to_string(), Box::new(reader))
    }

    fn from_source(path: String, mut source: Box<dyn ReadSeek>) -> Result<Self> {
        let size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut sync = [0u8; 4];
        if source.read_exact(&mut sync).is_err() || parse_sync(sync).is_err() {
            return Err(EventIoError::NotEventIo(path));
        }

        let objects = scan_objects(&mut source, 0, size, None)?;
        info!("File contains {} top level objects", objects.len());

        Ok(Self {
            path,
            source,
            size,
            objects,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size of the (decompressed) stream in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of top-level objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&EventIoObject> {
        self.objects.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventIoObject> {
        self.objects.iter()
    }

    pub fn objects(&self) -> &[EventIoObject] {
        &self.objects
    }

    /// Read `size` bytes starting at `first_byte`, then restore the stream
    /// position
    pub fn read_from_position(&mut self, first_byte: u64, size: usize) -> Result<Vec<u8>> {
        let position = self.source.stream_position()?;
        self.source.seek(SeekFrom::Start(first_byte))?;

        let mut data = vec![0u8; size];
        let result = self.source.read_exact(&mut data);
        self.source.seek(SeekFrom::Start(position))?;

        match result {
            Ok(()) => Ok(data),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(EventIoError::UnexpectedEnd {
                needed: size,
                available: self.size.saturating_sub(first_byte) as usize,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// The complete data field of an object
    pub fn read_data(&mut self, object: &EventIoObject) -> Result<Vec<u8>> {
        self.read_from_position(object.header.data_offset, object.header.length as usize)
    }

    /// A cursor over the data field of an object
    pub fn reader(&mut self, object: &EventIoObject) -> Result<ObjectReader> {
        self.read_data(object).map(ObjectReader::new)
    }
}

impl<'a> IntoIterator for &'a EventIoFile {
    type Item = &'a EventIoObject;
    type IntoIter = std::slice::Iter<'a, EventIoObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl fmt::Debug for EventIoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventIoFile")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("objects", &self.objects.len())
            .finish()
    }
}

impl fmt::Display for EventIoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EventIoFile(path={}, objects=[", self.path)?;
        if self.objects.len() <= 8 {
            for object in &self.objects {
                writeln!(f, "  {}", object)?;
            }
        } else {
            for object in &self.objects[..4] {
                writeln!(f, "  {}", object)?;
            }
            writeln!(f, "  ...")?;
            for object in &self.objects[self.objects.len() - 4..] {
                writeln!(f, "  {}", object)?;
            }
        }
        write!(f, "])")
    }
}

/// Scan the headers in `[start, end)` and build the object tree
///
/// Top-level scans pass `parent = None`. A header that cannot be read, or an
/// object that runs past `end`, ends the scan with a truncation warning.
/// Containers deeper than [`MAX_NESTING_DEPTH`] are kept without children.
fn scan_objects(
    source: &mut Box<dyn ReadSeek>,
    start: u64,
    end: u64,
    parent: Option<&ObjectHeader>,
) -> Result<Vec<EventIoObject>> {
    let mut objects = Vec::new();
    let mut position = start;

    while position < end {
        source.seek(SeekFrom::Start(position))?;

        let header = match ObjectHeader::read(source, position, parent) {
            Ok(header) => header,
            Err(EventIoError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                warn!("File seems to be truncated: incomplete header at byte {}", position);
                break;
            }
            Err(EventIoError::InvalidSync(sync)) => {
                warn!(
                    "File seems to be truncated: invalid sync {:02x?} at byte {}",
                    sync, position
                );
                break;
            }
            Err(e) => return Err(e),
        };

        if header.data_end() > end {
            warn!(
                "File seems to be truncated: object of type {} at byte {} needs {} bytes, {} available",
                header.object_type,
                position,
                header.length,
                end.saturating_sub(header.data_offset)
            );
            break;
        }

        debug!(
            "Found header of type {} at byte {} (level {})",
            header.object_type, position, header.level
        );

        let children = if header.only_sub_objects && header.level >= MAX_NESTING_DEPTH {
            warn!(
                "Object of type {} at byte {} is nested {} levels deep, not scanning its sub-objects",
                header.object_type, position, header.level
            );
            Vec::new()
        } else if header.only_sub_objects {
            scan_objects(source, header.data_offset, header.data_end(), Some(&header))?
        } else {
            Vec::new()
        };

        let next = header.data_end();
        objects.push(EventIoObject::new(header, position, children));
        position = next;
    }

    Ok(objects)
}
