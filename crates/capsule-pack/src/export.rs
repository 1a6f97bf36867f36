//! Tar snapshots of a package.
//!
//! The archive holds `unit.json` with the pretty-printed descriptor and one
//! `files/<path>` entry per record. Plain `.tar` or gzip-compressed
//! `.tar.gz` / `.tgz` is chosen from the output extension.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use capsule_common::error::{CapsuleError, Result};

use crate::unit::Package;

/// Name of the descriptor entry in an exported archive.
pub const DESCRIPTOR_ENTRY: &str = "unit.json";

/// Directory holding file records in an exported archive.
pub const FILES_DIR: &str = "files";

/// Writes `package` as a tar archive at `path`. Returns the number of
/// entries written, including the descriptor.
///
/// # Errors
///
/// Returns an error if the archive cannot be created or written.
pub fn export_tar(package: &Package, path: &Path) -> Result<usize> {
    tracing::info!(
        target = %package.descriptor.target,
        archive = %path.display(),
        "exporting package"
    );
    let file = std::fs::File::create(path).map_err(|e| CapsuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let io_err = |e| CapsuleError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let entries = if is_gzip_archive(path) {
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let entries = append_package(&mut builder, package).map_err(io_err)?;
        let encoder = builder.into_inner().map_err(io_err)?;
        let _ = encoder.finish().map_err(io_err)?;
        entries
    } else {
        let mut builder = tar::Builder::new(file);
        let entries = append_package(&mut builder, package).map_err(io_err)?;
        builder.finish().map_err(io_err)?;
        entries
    };

    tracing::info!(entries, "package exported");
    Ok(entries)
}

fn append_package<W: Write>(
    builder: &mut tar::Builder<W>,
    package: &Package,
) -> std::io::Result<usize> {
    let descriptor = serde_json::to_vec_pretty(&package.descriptor)?;
    append_bytes(builder, Path::new(DESCRIPTOR_ENTRY), &descriptor)?;

    let mut entries = 1;
    for record in &package.files {
        let name = Path::new(FILES_DIR).join(sanitize(record.info.path.as_str()));
        append_bytes(builder, &name, &record.content)?;
        entries += 1;
    }
    Ok(entries)
}

fn append_bytes<W: Write>(
    builder: &mut tar::Builder<W>,
    name: &Path,
    data: &[u8],
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, data)
}

/// Keeps only normal components so every entry stays under `files/`.
fn sanitize(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Determines whether the archive is gzip-compressed based on extension.
fn is_gzip_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz"))
}
