//! Archive construction.
//!
//! The writer walks a source path into an ordered stream of entries and
//! emits them as a tar archive: [`write_tar`] to any byte sink, or
//! [`compress`] to produce a gzip-compressed tar file on disk.
//!
//! A single-file source yields exactly one entry named by the file's base
//! name. A directory source is enumerated recursively, parents before
//! children, siblings in the order the filesystem lists them (no global
//! sort). Empty directories are emitted as explicit entries so extraction
//! recreates them. Symlinks are stored with their raw target and never
//! followed or read.
//!
//! A trailing separator on a directory source changes the naming scheme:
//!
//! - `bundle` → the directory itself is the first entry (`bundle`) and
//!   prefixes every descendant (`bundle/app.py`, …).
//! - `bundle/` → only the contents are named (`app.py`, …), with the root
//!   emitted as `.`.
//!
//! Any filesystem error aborts the whole operation; whatever was already
//! written to the output is the caller's to discard.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

use crate::entry::{Entry, EntryKind};
use crate::xattrs::PAX_XATTR_PREFIX;
use crate::{Error, Result};

/// Writes a gzip-compressed tar archive of `src` to a new file at `dest`.
///
/// # Example
///
/// ```rust,no_run
/// treepack::compress("./bundle/", "/tmp/bundle.tgz")?;
/// # Ok::<(), treepack::Error>(())
/// ```
pub fn compress(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let out = File::create(dest.as_ref())?;
    let encoder = GzEncoder::new(BufWriter::new(out), Compression::default());
    let encoder = write_entries(src.as_ref(), encoder)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    Ok(())
}

/// Writes an uncompressed tar stream of `src` to an arbitrary byte sink.
///
/// Useful for piping an archive somewhere without touching disk:
///
/// ```rust,no_run
/// let mut buf = Vec::new();
/// treepack::write_tar("./bundle", &mut buf)?;
/// # Ok::<(), treepack::Error>(())
/// ```
pub fn write_tar<W: Write>(src: impl AsRef<Path>, out: W) -> Result<()> {
    write_entries(src.as_ref(), out)?;
    Ok(())
}

/// Walks `src` and appends its entries to a tar stream over `out`,
/// returning the sink once the trailing archive blocks are written.
fn write_entries<W: Write>(src: &Path, out: W) -> Result<W> {
    // Stat before the builder exists: its Drop impl finalizes the archive,
    // and a source that was never readable should leave the sink untouched.
    let meta = src.symlink_metadata()?;

    let mut builder = tar::Builder::new(out);
    if meta.is_dir() {
        let contents_only = has_trailing_separator(src);
        let root_name = match src.file_name() {
            Some(base) if !contents_only => PathBuf::from(base),
            _ => PathBuf::from("."),
        };

        for dirent in WalkDir::new(src).follow_links(false) {
            let dirent = dirent?;
            let relative = dirent
                .path()
                .strip_prefix(src)
                .map_err(|_| Error::Io(io::Error::other("walk left the source root")))?;

            let name = if relative.as_os_str().is_empty() {
                if contents_only {
                    PathBuf::from(".")
                } else {
                    root_name.clone()
                }
            } else if contents_only {
                relative.to_path_buf()
            } else {
                root_name.join(relative)
            };

            append_entry(&mut builder, dirent.path(), &name)?;
        }
    } else {
        let name = src
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::Io(io::Error::other("source path has no base name")))?;
        append_entry(&mut builder, src, &name)?;
    }

    Ok(builder.into_inner()?)
}

/// Appends one filesystem object to the tar stream under the given archive
/// name, preceded by PAX records for any extended attributes it carries.
fn append_entry<W: Write>(builder: &mut tar::Builder<W>, path: &Path, name: &Path) -> Result<()> {
    let meta = path.symlink_metadata()?;
    let entry = Entry::from_path(path, name.to_string_lossy().into_owned())?;

    if !entry.xattrs.is_empty() {
        let records: Vec<(String, &[u8])> = entry
            .xattrs
            .iter()
            .map(|(attr, value)| (format!("{PAX_XATTR_PREFIX}{attr}"), value.as_slice()))
            .collect();
        builder.append_pax_extensions(records.iter().map(|(key, value)| (key.as_str(), *value)))?;
    }

    let mut header = tar::Header::new_gnu();
    header.set_metadata(&meta);

    match entry.kind {
        EntryKind::Directory => {
            header.set_size(0);
            builder.append_data(&mut header, name, io::empty())?;
        }
        EntryKind::Symlink => {
            let target = entry.link_target.as_deref().unwrap_or_default();
            header.set_size(0);
            builder.append_link(&mut header, name, target)?;
        }
        EntryKind::File => {
            let file = File::open(path)?;
            builder.append_data(&mut header, name, file)?;
        }
    }

    Ok(())
}

/// Whether the caller spelled the source path with a trailing separator
/// ("archive the contents" rather than "archive the directory").
fn has_trailing_separator(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().ends_with(['/', '\\'])
}
