//! Release archives
//!
//! Packs a build output directory into a single archive whose entries sit
//! under one top-level folder named after the package. Windows-facing
//! targets get `.zip`; Linux gets `.tar.gz`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// Archive container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip` with deflate
    Zip,
    /// `.tar.gz`
    TarGz,
}

impl ArchiveFormat {
    /// File extension including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }
}

/// Pack `source_dir` into `dest` with every entry under `root_name/`
///
/// Returns the number of files written. An existing `dest` is replaced.
pub fn create_archive(
    source_dir: &Path,
    root_name: &str,
    dest: &Path,
    format: ArchiveFormat,
) -> Result<usize, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::SourceMissing {
            path: source_dir.to_path_buf(),
        });
    }

    let write_err = |e: &dyn std::fmt::Display| ArchiveError::WriteFailed {
        path: dest.to_path_buf(),
        error: e.to_string(),
    };

    let entries = collect_entries(source_dir, root_name).map_err(|e| write_err(&e))?;
    let file = File::create(dest).map_err(|e| write_err(&e))?;
    let writer = BufWriter::new(file);

    let result = match format {
        ArchiveFormat::Zip => write_zip(writer, &entries),
        ArchiveFormat::TarGz => write_tar_gz(writer, &entries),
    };

    if let Err(e) = result {
        let _ = std::fs::remove_file(dest);
        return Err(write_err(&e));
    }

    tracing::debug!("Wrote {} entries to {}", entries.len(), dest.display());
    Ok(entries.iter().filter(|e| !e.is_dir).count())
}

struct Entry {
    source: PathBuf,
    name: String,
    is_dir: bool,
}

fn collect_entries(source_dir: &Path, root_name: &str) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(io::Error::other)?;

        let mut name = root_name.to_string();
        for component in relative.components() {
            name.push('/');
            name.push_str(&component.as_os_str().to_string_lossy());
        }

        entries.push(Entry {
            source: entry.path().to_path_buf(),
            name,
            is_dir: entry.file_type().is_dir(),
        });
    }
    Ok(entries)
}

fn write_zip<W: Write + io::Seek>(writer: W, entries: &[Entry]) -> io::Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if entry.is_dir {
            zip.add_directory(format!("{}/", entry.name), options)
                .map_err(io::Error::other)?;
        } else {
            let options = options.unix_permissions(file_mode(&entry.source)?);
            zip.start_file(entry.name.as_str(), options)
                .map_err(io::Error::other)?;
            let mut source = File::open(&entry.source)?;
            io::copy(&mut source, &mut zip)?;
        }
    }

    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Permission bits carried into zip entries so `.app` executables stay runnable
#[cfg(unix)]
fn file_mode(path: &Path) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> io::Result<u32> {
    Ok(0o644)
}

fn write_tar_gz<W: Write>(writer: W, entries: &[Entry]) -> io::Result<()> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        if entry.is_dir {
            builder.append_dir(&entry.name, &entry.source)?;
        } else {
            builder.append_path_with_name(&entry.source, &entry.name)?;
        }
    }

    builder.into_inner()?.finish()?.flush()
}
