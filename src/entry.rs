//! The archive entry model.
//!
//! An [`Entry`] is the normalized representation of one archive member:
//! its relative name, what kind of filesystem object it describes, its
//! permission bits, and, depending on the kind, a symlink target or a
//! content size plus extended attributes.
//!
//! Entries are transient: they exist in memory only for the duration of one
//! write or one read pass. The module provides exactly two conversions and
//! no other behavior: [`Entry::from_path`] builds an entry from a live
//! filesystem object, and [`Entry::materialize`] turns an entry plus a byte
//! source back into a filesystem object at an already-validated path.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::{Result, xattrs};

/// The kind of filesystem object an archive entry describes.
///
/// The set is closed: anything else found in an archive (hard links, fifos,
/// device nodes) is not representable and gets skipped by the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file with byte content.
    File,
    /// A directory; emitted explicitly even when empty.
    Directory,
    /// A symbolic link carrying its raw, unresolved target string.
    Symlink,
}

/// One archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Slash-separated relative path within the archive. Never begins with
    /// `/` and never contains a `..` segment once resolved for extraction.
    pub name: String,
    /// What kind of filesystem object this entry describes.
    pub kind: EntryKind,
    /// Permission bits, platform-native semantics.
    pub mode: u32,
    /// Raw link target; populated only when `kind` is [`EntryKind::Symlink`].
    pub link_target: Option<String>,
    /// Content length in bytes; meaningful only for regular files.
    pub size: u64,
    /// Extended attributes by name; empty unless the source platform
    /// provides them.
    pub xattrs: BTreeMap<String, Vec<u8>>,
}

impl Entry {
    /// Builds an entry from a live filesystem object.
    ///
    /// The object is inspected with `lstat` semantics: a symlink becomes a
    /// symlink entry carrying its raw target, never the target's content.
    /// Extended attributes are captured for files and directories on
    /// platforms that have them.
    pub fn from_path(path: &Path, name: impl Into<String>) -> Result<Self> {
        let meta = path.symlink_metadata()?;
        let file_type = meta.file_type();

        if file_type.is_symlink() {
            let target = fs::read_link(path)?;
            return Ok(Self {
                name: name.into(),
                kind: EntryKind::Symlink,
                mode: mode_of(&meta),
                link_target: Some(target.to_string_lossy().into_owned()),
                size: 0,
                xattrs: BTreeMap::new(),
            });
        }

        if file_type.is_dir() {
            return Ok(Self {
                name: name.into(),
                kind: EntryKind::Directory,
                mode: mode_of(&meta),
                link_target: None,
                size: 0,
                xattrs: xattrs::capture(path)?,
            });
        }

        Ok(Self {
            name: name.into(),
            kind: EntryKind::File,
            mode: mode_of(&meta),
            link_target: None,
            size: meta.len(),
            xattrs: xattrs::capture(path)?,
        })
    }

    /// Returns true for directory entries.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns true for regular-file entries.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns true for symlink entries.
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Creates the filesystem object this entry describes at `target`.
    ///
    /// `target` must already have been validated against the destination
    /// root; this method performs no path checks of its own.
    ///
    /// - Directories are created along with missing intermediates, and the
    ///   stored mode is applied to the directory itself even when it
    ///   already existed.
    /// - Files get missing parent directories created with the default
    ///   creation mode, then their content streamed from `content` and the
    ///   stored mode applied.
    /// - Symlinks are created with the raw stored target, replacing a stale
    ///   non-directory object already at that path. The target is written
    ///   verbatim and never resolved or validated.
    pub fn materialize(&self, target: &Path, content: &mut dyn Read) -> Result<()> {
        match self.kind {
            EntryKind::Directory => {
                fs::create_dir_all(target)?;
                set_mode(target, self.mode)?;
            }
            EntryKind::File => {
                ensure_parent(target)?;
                let mut file = fs::File::create(target)?;
                io::copy(content, &mut file)?;
                drop(file);
                set_mode(target, self.mode)?;
            }
            EntryKind::Symlink => {
                ensure_parent(target)?;
                let link_target = self.link_target.as_deref().unwrap_or_default();
                if let Ok(existing) = target.symlink_metadata() {
                    if !existing.is_dir() {
                        fs::remove_file(target)?;
                    }
                }
                create_symlink(target, link_target)?;
            }
        }
        Ok(())
    }
}

/// Creates any missing parent directories with the default creation mode.
fn ensure_parent(target: &Path) -> io::Result<()> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.is_dir() {
        0o755
    } else if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Creates a symbolic link at `link` pointing at `target`.
#[cfg(unix)]
fn create_symlink(link: &Path, target: &str) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Creates a symbolic link at `link` pointing at `target`.
#[cfg(windows)]
fn create_symlink(link: &Path, target: &str) -> io::Result<()> {
    // Windows distinguishes file and directory symlinks; pick based on what
    // the target currently resolves to, defaulting to a file link.
    let resolved = link.parent().map(|p| p.join(target));
    if let Some(ref p) = resolved {
        if p.is_dir() {
            return std::os::windows::fs::symlink_dir(target, link);
        }
    }
    std::os::windows::fs::symlink_file(target, link)
}

/// Creates a symbolic link at `link` pointing at `target`.
#[cfg(not(any(unix, windows)))]
fn create_symlink(_link: &Path, _target: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
