//! Archive format detection.
//!
//! This module classifies a source by inspecting its leading bytes (magic
//! signatures) rather than trusting file extensions. The set of recognized
//! formats is closed: zip, gzip-compressed tar, and plain tar.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::Result;

/// Detected source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// ZIP archive.
    Zip,
    /// gzip stream (a gzip-compressed tar archive in this crate's usage).
    Gzip,
    /// Plain (uncompressed) TAR archive.
    Tar,
    /// Unknown or unrecognized content.
    Unknown,
}

impl SourceFormat {
    /// Returns a human-readable name for this format, used in error
    /// messages.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Zip => "zip",
            SourceFormat::Gzip => "gzip",
            SourceFormat::Tar => "tar",
            SourceFormat::Unknown => "unrecognized data",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// ZIP local file header: 'P' 'K' 0x03 0x04.
const ZIP_LOCAL_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// ZIP end-of-central-directory record, the first record of an empty zip.
const ZIP_EMPTY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// gzip member header: 0x1F 0x8B.
const GZIP_SIGNATURE: [u8; 2] = [0x1F, 0x8B];

/// TAR `ustar` signature at offset 257 (shared by POSIX and GNU headers).
const TAR_USTAR_SIGNATURE: &[u8] = b"ustar";

/// Offset of the `ustar` signature within a tar header block.
const TAR_USTAR_OFFSET: u64 = 257;

/// Detects the source format from a reader by examining magic bytes.
///
/// The reader's position is restored before returning, so detection can be
/// chained with a subsequent read of the same stream.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use treepack::{SourceFormat, detect_format};
///
/// let mut gz = Cursor::new([0x1F, 0x8B, 0x08, 0x00]);
/// assert_eq!(detect_format(&mut gz).unwrap(), SourceFormat::Gzip);
/// ```
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<SourceFormat> {
    let start = reader.stream_position()?;

    let mut head = [0u8; 4];
    let read = read_up_to(reader, &mut head)?;

    if read >= ZIP_LOCAL_SIGNATURE.len()
        && (head == ZIP_LOCAL_SIGNATURE || head == ZIP_EMPTY_SIGNATURE)
    {
        reader.seek(SeekFrom::Start(start))?;
        return Ok(SourceFormat::Zip);
    }

    if read >= GZIP_SIGNATURE.len() && head[..2] == GZIP_SIGNATURE {
        reader.seek(SeekFrom::Start(start))?;
        return Ok(SourceFormat::Gzip);
    }

    // TAR has no leading magic; probe the `ustar` signature at offset 257.
    reader.seek(SeekFrom::Start(start + TAR_USTAR_OFFSET))?;
    let mut magic = [0u8; 5];
    let read = read_up_to(reader, &mut magic)?;
    reader.seek(SeekFrom::Start(start))?;

    if read == magic.len() && magic == *TAR_USTAR_SIGNATURE {
        return Ok(SourceFormat::Tar);
    }

    Ok(SourceFormat::Unknown)
}

/// Detects the format of a file on disk.
pub fn detect_path(path: impl AsRef<Path>) -> Result<SourceFormat> {
    let mut file = File::open(path.as_ref())?;
    detect_format(&mut file)
}

/// Reads as many bytes as the source can provide, up to the buffer size.
///
/// A short count means end-of-stream, never a transient short read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
