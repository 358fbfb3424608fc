//! Tar-based archive reader, for plain and gzip-compressed tar sources.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use flate2::read::GzDecoder;

use crate::entry::{Entry, EntryKind};
use crate::format::{self, SourceFormat};
use crate::secure_join::secure_join;
use crate::xattrs::{self, PAX_XATTR_PREFIX};
use crate::{Error, Result};

/// Extracts the tar archive at `src` into `dest`, transparently unwrapping
/// a gzip container when the content prefix says so.
pub(crate) fn extract_file(src: &Path, dest: &Path) -> Result<()> {
    let file = BufReader::new(File::open(src)?);
    match format::detect_path(src)? {
        SourceFormat::Gzip => extract_stream(GzDecoder::new(file), dest),
        SourceFormat::Tar => extract_stream(file, dest),
        detected => Err(Error::UnsupportedFormat {
            path: src.to_path_buf(),
            detected,
        }),
    }
}

/// Decodes a tar entry stream and materializes each entry under `dest`.
///
/// Entries are handled strictly in stream order. Extended attributes found
/// in PAX records are collected per entry and applied through the bridge
/// once every entry is on disk.
fn extract_stream<R: Read>(reader: R, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    let mut archive = tar::Archive::new(reader);
    let mut pending_attrs: Vec<(PathBuf, BTreeMap<String, Vec<u8>>)> = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;

        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header.mode()?;
        let mtime = header.mtime()?;
        let size = header.size()?;

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_symlink() {
            EntryKind::Symlink
        } else if entry_type.is_file() {
            EntryKind::File
        } else {
            log::debug!("skipping tar entry of type {:?}", entry_type);
            continue;
        };

        let name = entry
            .path()?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();

        let link_target = if kind == EntryKind::Symlink {
            entry
                .link_name()?
                .map(|target| target.to_string_lossy().into_owned())
        } else {
            None
        };

        let mut attrs = BTreeMap::new();
        if let Some(extensions) = entry.pax_extensions()? {
            for extension in extensions {
                let extension = extension?;
                if let Ok(key) = extension.key() {
                    if let Some(attr) = key.strip_prefix(PAX_XATTR_PREFIX) {
                        attrs.insert(attr.to_string(), extension.value_bytes().to_vec());
                    }
                }
            }
        }

        let target = secure_join(dest, &name)?;

        let model = Entry {
            name,
            kind,
            mode,
            link_target,
            size,
            xattrs: attrs,
        };
        model.materialize(&target, &mut entry)?;

        if model.kind == EntryKind::File && mtime != 0 {
            filetime::set_file_mtime(&target, FileTime::from_unix_time(mtime as i64, 0))?;
        }

        if !model.xattrs.is_empty() {
            pending_attrs.push((target, model.xattrs));
        }
    }

    for (path, attrs) in &pending_attrs {
        xattrs::apply(path, attrs)?;
    }

    Ok(())
}
