//! Package stream format.
//!
//! A package is written as one gzip stream holding a sequence of records.
//! Each record is an 8-byte little-endian length followed by that many bytes
//! of `bincode` payload. The first record is the [`CompilationDescriptor`],
//! every following record is a [`FileRecord`]. There is no record count: a
//! reader consumes records until the stream ends cleanly between two records.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use capsule_common::constants::{INDEX_FILE_EXT, MAX_RECORD_BYTES, RECORD_PREFIX_LEN};
use capsule_common::error::{CapsuleError, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::unit::{CompilationDescriptor, FileRecord, Package};

/// Writes `package` to `writer` as a compressed record stream.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_to<W: Write>(package: &Package, writer: W) -> Result<()> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    write_record(&mut encoder, &package.descriptor)?;
    for file in &package.files {
        write_record(&mut encoder, file)?;
    }
    let _ = encoder.finish().map_err(|e| stream_error("<package stream>", e))?;
    tracing::debug!(
        target = %package.descriptor.target,
        files = package.files.len(),
        "package written"
    );
    Ok(())
}

/// Reads a package with the default record size limit.
///
/// # Errors
///
/// Returns an error if the stream is malformed, truncated, or a record
/// exceeds [`MAX_RECORD_BYTES`].
pub fn read_from<R: Read>(reader: R) -> Result<Package> {
    read_from_with_limit(reader, MAX_RECORD_BYTES)
}

/// Reads a package, rejecting any record larger than `limit` bytes.
///
/// # Errors
///
/// Returns an error if the stream is malformed, truncated, empty, or a record
/// exceeds `limit`.
pub fn read_from_with_limit<R: Read>(reader: R, limit: u64) -> Result<Package> {
    let mut decoder = BufReader::new(GzDecoder::new(reader));
    let descriptor: CompilationDescriptor =
        read_record(&mut decoder, limit)?.ok_or_else(|| CapsuleError::Truncated {
            message: "stream holds no compilation descriptor".into(),
        })?;
    let mut files = Vec::new();
    while let Some(file) = read_record::<_, FileRecord>(&mut decoder, limit)? {
        files.push(file);
    }
    Ok(Package { descriptor, files })
}

/// Writes `package` to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_to_file(package: &Package, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CapsuleError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|e| CapsuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_to(package, std::io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), "package saved");
    Ok(())
}

/// Reads a package from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its content is malformed.
pub fn read_from_file(path: &Path) -> Result<Package> {
    let file = std::fs::File::open(path).map_err(|e| CapsuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_from(file)
}

/// Returns `<root>/<basename>.kindex`.
#[must_use]
pub fn index_filename(root: &Path, basename: &str) -> PathBuf {
    root.join(format!("{basename}{INDEX_FILE_EXT}"))
}

fn write_record<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let payload = bincode::serialize(value)?;
    let len = payload.len() as u64;
    writer
        .write_all(&len.to_le_bytes())
        .and_then(|()| writer.write_all(&payload))
        .map_err(|e| stream_error("<package stream>", e))
}

fn read_record<R: Read, T: DeserializeOwned>(reader: &mut R, limit: u64) -> Result<Option<T>> {
    let mut prefix = [0u8; RECORD_PREFIX_LEN];
    let filled = read_full(reader, &mut prefix)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < RECORD_PREFIX_LEN {
        return Err(CapsuleError::Truncated {
            message: format!("record length cut off after {filled} bytes"),
        });
    }
    let len = u64::from_le_bytes(prefix);
    if len > limit {
        return Err(CapsuleError::RecordTooLarge { size: len, limit });
    }
    let mut payload = Vec::new();
    let read = reader
        .by_ref()
        .take(len)
        .read_to_end(&mut payload)
        .map_err(|e| stream_error("<package stream>", e))?;
    if (read as u64) < len {
        return Err(CapsuleError::Truncated {
            message: format!("record payload has {read} of {len} bytes"),
        });
    }
    Ok(Some(bincode::deserialize(&payload)?))
}

/// Fills `buf` as far as the stream allows, returning the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(stream_error("<package stream>", e)),
        }
    }
    Ok(filled)
}

fn stream_error(what: &str, source: std::io::Error) -> CapsuleError {
    CapsuleError::Io {
        path: PathBuf::from(what),
        source,
    }
}
