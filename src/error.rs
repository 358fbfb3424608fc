//! Error types for archive construction and extraction.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when packing or unpacking archives, along with a convenient
//! [`Result<T>`] type alias.
//!
//! All fallible operations in this crate return `Result<T, Error>`. Errors
//! abort the current operation and are returned to the caller; there is no
//! partial-success reporting and no retry. Callers are responsible for
//! discarding partially written output (an incomplete archive file or a
//! partially populated destination directory) after a failure.
//!
//! ```rust,no_run
//! use treepack::{Error, Result, extract};
//!
//! fn unpack(archive: &str, dest: &str) -> Result<()> {
//!     match extract(archive, dest) {
//!         Ok(()) => Ok(()),
//!         Err(Error::PathEscape { name, .. }) => {
//!             eprintln!("refusing hostile archive entry: {}", name);
//!             Err(Error::PathEscape { name, root: dest.into() })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

use crate::format::SourceFormat;

/// A specialized `Result` type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for archive construction and extraction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error from an underlying filesystem or stream operation.
    ///
    /// This wraps [`std::io::Error`] unchanged, so callers can still match
    /// on [`std::io::ErrorKind`] (e.g. `NotFound` for a missing source
    /// path).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source's content does not match the format a reader expects.
    ///
    /// Returned both by the auto-detecting extractor when no known format
    /// matches, and by a format-specific extractor handed a source of a
    /// different type.
    #[error("{} is not a supported archive: detected {detected}", .path.display())]
    UnsupportedFormat {
        /// The source file that was inspected.
        path: PathBuf,
        /// What the content prefix actually looked like.
        detected: SourceFormat,
    },

    /// An archive entry's name resolved outside the destination root.
    ///
    /// Extraction aborts immediately without materializing the offending
    /// entry or any subsequent ones.
    #[error("entry '{name}' escapes the extraction root {}", .root.display())]
    PathEscape {
        /// The entry name as stored in the archive.
        name: String,
        /// The destination root the name was resolved against.
        root: PathBuf,
    },

    /// Setting an extended attribute failed fatally.
    ///
    /// Attribute failures reported as unsupported-by-the-filesystem or
    /// permission-denied are tolerated (logged and skipped); anything else
    /// surfaces as this variant.
    #[error("failed to set extended attribute '{name}' on {}: {source}", .path.display())]
    Xattr {
        /// The file the attribute was being applied to.
        path: PathBuf,
        /// The attribute name.
        name: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(e) => Error::Io(e),
            None => Error::Io(io::Error::other("filesystem loop detected during walk")),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_io_error_kind_preserved() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_format_names_detected_type() {
        let err = Error::UnsupportedFormat {
            path: PathBuf::from("bundle.tgz"),
            detected: SourceFormat::Gzip,
        };
        let msg = err.to_string();
        assert!(msg.contains("bundle.tgz"));
        assert!(msg.contains("gzip"));
    }

    #[test]
    fn test_path_escape_display() {
        let err = Error::PathEscape {
            name: "../../etc/passwd".to_string(),
            root: PathBuf::from("/tmp/dest"),
        };
        let msg = err.to_string();
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("/tmp/dest"));
    }

    #[test]
    fn test_walkdir_error_converts_to_io() {
        let err = walkdir::WalkDir::new("/definitely/not/a/real/path/at/all")
            .into_iter()
            .next()
            .unwrap()
            .unwrap_err();
        let err: Error = err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
