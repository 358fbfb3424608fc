//! Zip-based archive reader.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::entry::{Entry, EntryKind};
use crate::format::{self, SourceFormat};
use crate::secure_join::secure_join;
use crate::{Error, Result};

/// File-type mask within a zip entry's stored unix mode.
const S_IFMT: u32 = 0o170000;
/// Symlink file type.
const S_IFLNK: u32 = 0o120000;
/// Directory file type.
const S_IFDIR: u32 = 0o040000;

/// Fallback modes for archives produced without unix attributes.
const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extracts the zip archive at `src` into `dest`.
///
/// Entries are read from the central directory. Classification and mode
/// come from each entry's stored unix attributes where present; a symlink's
/// payload is its decompressed content read as the link target text.
pub(crate) fn extract_file(src: &Path, dest: &Path) -> Result<()> {
    match format::detect_path(src)? {
        SourceFormat::Zip => {}
        detected => {
            return Err(Error::UnsupportedFormat {
                path: src.to_path_buf(),
                detected,
            });
        }
    }

    std::fs::create_dir_all(dest)?;

    let mut archive = ZipArchive::new(BufReader::new(File::open(src)?))?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;

        let raw_name = file.name().to_string();
        let unix_mode = file.unix_mode();

        let is_symlink = unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK);
        let is_dir = file.is_dir() || unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFDIR);

        let kind = if is_dir {
            EntryKind::Directory
        } else if is_symlink {
            EntryKind::Symlink
        } else {
            EntryKind::File
        };

        let mode = unix_mode
            .map(|mode| mode & 0o7777)
            .filter(|permissions| *permissions != 0)
            .unwrap_or(match kind {
                EntryKind::Directory => DEFAULT_DIR_MODE,
                _ => DEFAULT_FILE_MODE,
            });

        let link_target = if kind == EntryKind::Symlink {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        let name = raw_name.trim_end_matches('/').to_string();
        let target = secure_join(dest, &name)?;

        let entry = Entry {
            name,
            kind,
            mode,
            link_target,
            size: file.size(),
            xattrs: BTreeMap::new(),
        };
        entry.materialize(&target, &mut file)?;
    }

    Ok(())
}
