//! Secure joining of untrusted archive names onto a trusted root.
//!
//! Archive entry names are attacker-controlled. Joining them naively onto a
//! destination directory is the classic path-traversal vulnerability: a name
//! like `../../etc/passwd`, an absolute name, or a name routed through a
//! symlink that an earlier entry planted inside the destination can all land
//! a write outside the tree being extracted.
//!
//! [`secure_join`] resolves a name component by component against the live
//! filesystem, following symlinks that already exist along the way, and
//! refuses any result that is not contained in the root. The resolution is
//! re-derived for every entry, with nothing cached between calls: the
//! filesystem state changes as extraction proceeds, and an earlier entry must
//! never be trusted as an intermediate component without re-validation.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Upper bound on symlink resolutions during one join.
///
/// Keeps a link cycle planted inside the destination from spinning forever;
/// the bound mirrors the kernel's own ELOOP limit order of magnitude.
const MAX_LINK_DEPTH: u32 = 32;

/// Resolves an untrusted relative `name` against a trusted `root`
/// directory, returning an absolute path guaranteed to be contained in
/// `root`.
///
/// `root` must exist; it is canonicalized before resolution so containment
/// checks are immune to symlinks above it. The name's components are then
/// walked one at a time:
///
/// - `.` components are ignored.
/// - `..` components step up one level and fail with
///   [`Error::PathEscape`] when they would climb past `root`.
/// - A component that lands on an existing symlink is resolved: a relative
///   target has its components spliced into the remaining work, an absolute
///   target fails with [`Error::PathEscape`], and a chain deeper than a
///   fixed bound of resolutions in one join also fails.
///
/// An absolute `name` fails outright. An empty name resolves to `root`
/// itself.
///
/// # Example
///
/// ```rust
/// use treepack::secure_join;
///
/// let dir = tempfile::tempdir().unwrap();
/// let inside = secure_join(dir.path(), "bundle/app/config.yml").unwrap();
/// assert!(inside.starts_with(dir.path().canonicalize().unwrap()));
///
/// assert!(secure_join(dir.path(), "../../etc/passwd").is_err());
/// ```
pub fn secure_join(root: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let root = root.as_ref().canonicalize()?;

    let escape = |root: &Path| Error::PathEscape {
        name: name.to_string(),
        root: root.to_path_buf(),
    };

    let mut queue = VecDeque::new();
    if !enqueue_back(Path::new(name), &mut queue) {
        return Err(escape(&root));
    }

    let mut resolved = root.clone();
    let mut links_followed = 0u32;

    while let Some(part) = queue.pop_front() {
        if part == ".." {
            if resolved == root {
                return Err(escape(&root));
            }
            resolved.pop();
            continue;
        }

        let candidate = resolved.join(&part);
        let is_symlink = candidate
            .symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        if is_symlink {
            links_followed += 1;
            if links_followed > MAX_LINK_DEPTH {
                return Err(escape(&root));
            }
            let target = fs::read_link(&candidate)?;
            // The target resolves relative to the link's parent, so the
            // current position stays put and the target's components take
            // the front of the queue.
            if !enqueue_front(&target, &mut queue) {
                return Err(escape(&root));
            }
        } else {
            resolved = candidate;
        }
    }

    // The component rules above maintain containment; this is the contract.
    if !resolved.starts_with(&root) {
        return Err(escape(&root));
    }

    Ok(resolved)
}

/// Appends a path's components to the back of the work queue.
///
/// Returns false when the path is absolute (a root or prefix component).
fn enqueue_back(path: &Path, queue: &mut VecDeque<OsString>) -> bool {
    for component in path.components() {
        match component {
            Component::Normal(part) => queue.push_back(part.to_os_string()),
            Component::ParentDir => queue.push_back(OsString::from("..")),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// Splices a path's components onto the front of the work queue, keeping
/// their order.
///
/// Returns false when the path is absolute.
fn enqueue_front(path: &Path, queue: &mut VecDeque<OsString>) -> bool {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::ParentDir => parts.push(OsString::from("..")),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    for part in parts.into_iter().rev() {
        queue.push_front(part);
    }
    true
}
