//! Extended-attribute bridge.
//!
//! All platform conditionality around extended attributes lives in this one
//! module; the writer and the readers call [`capture`] and [`apply`] without
//! caring whether the host can actually store attributes.
//!
//! On unix, attributes ride in tar archives as PAX extension records keyed
//! with the [`PAX_XATTR_PREFIX`] convention (`SCHILY.xattr.<name>`), the
//! scheme GNU tar and star use. On other platforms both operations are
//! no-ops, so archives carrying attributes still extract cleanly.
//!
//! Two failure classes are tolerated when applying an attribute: the
//! filesystem not supporting attributes at all, and permission being denied
//! for a particular attribute (common for anything outside the `user.`
//! namespace when running unprivileged). Tolerated failures are logged at
//! warn level and skipped; everything else is fatal.

use std::collections::BTreeMap;
use std::path::Path;

use crate::Result;

/// PAX extended-header key prefix under which tar archives carry extended
/// attributes.
pub const PAX_XATTR_PREFIX: &str = "SCHILY.xattr.";

/// Reads the extended attributes of a filesystem object.
///
/// Returns an empty map when the object has none, when the filesystem does
/// not support attributes, or when listing them is denied.
#[cfg(unix)]
pub fn capture(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut attrs = BTreeMap::new();

    let names = match xattr::list(path) {
        Ok(names) => names,
        Err(e) if tolerated(&e) => return Ok(attrs),
        Err(e) => return Err(e.into()),
    };

    for name in names {
        let Some(name) = name.to_str().map(str::to_owned) else {
            log::debug!(
                "skipping non-UTF-8 extended attribute name on {}",
                path.display()
            );
            continue;
        };
        match xattr::get(path, &name) {
            Ok(Some(value)) => {
                attrs.insert(name, value);
            }
            // Raced away or unreadable between list and get.
            Ok(None) => {}
            Err(e) if tolerated(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(attrs)
}

/// Reads the extended attributes of a filesystem object.
///
/// This platform stores none; always returns an empty map.
#[cfg(not(unix))]
pub fn capture(_path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    Ok(BTreeMap::new())
}

/// Applies stored extended attributes to an extracted filesystem object.
///
/// Attributes the filesystem rejects as unsupported or permission-denied
/// are skipped with a warning; any other failure aborts with
/// [`Error::Xattr`](crate::Error::Xattr).
#[cfg(unix)]
pub fn apply(path: &Path, attrs: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    for (name, value) in attrs {
        match xattr::set(path, name, value) {
            Ok(()) => {}
            Err(e) if tolerated(&e) => {
                log::warn!(
                    "skipping extended attribute '{}' on {}: {}",
                    name,
                    path.display(),
                    e
                );
            }
            Err(e) => {
                return Err(crate::Error::Xattr {
                    path: path.to_path_buf(),
                    name: name.clone(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}

/// Applies stored extended attributes to an extracted filesystem object.
///
/// This platform cannot store them; the attributes are dropped.
#[cfg(not(unix))]
pub fn apply(_path: &Path, _attrs: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    Ok(())
}

/// ENOTSUP and EPERM, as mapped by the standard library.
#[cfg(unix)]
fn tolerated(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::Unsupported | std::io::ErrorKind::PermissionDenied
    )
}
