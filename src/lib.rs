//! # treepack
//!
//! Pack a file or directory tree into a portable archive, and reconstruct
//! trees from archives without letting a hostile archive write outside the
//! destination directory. Built as a building block for deployment tooling
//! that ships application bundles between machines.
//!
//! ## Quick Start
//!
//! ### Packing a tree
//!
//! ```rust,no_run
//! use treepack::{compress, write_tar, Result};
//!
//! fn main() -> Result<()> {
//!     // Gzip-compressed tar file on disk. The trailing slash archives the
//!     // directory's *contents*; without it, "bundle" itself becomes the
//!     // top-level entry.
//!     compress("./bundle/", "/tmp/bundle.tgz")?;
//!
//!     // Plain tar stream to any writer, no disk involved.
//!     let mut buf = Vec::new();
//!     write_tar("./bundle", &mut buf)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting an archive
//!
//! ```rust,no_run
//! use treepack::{extract, Extractor, Result};
//!
//! fn main() -> Result<()> {
//!     // Auto-detects zip, gzip-compressed tar, or plain tar.
//!     extract("/tmp/bundle.tgz", "/srv/app")?;
//!
//!     // Or force a specific reader.
//!     Extractor::Zip.extract("/tmp/bundle.zip", "/srv/app")?;
//!     Ok(())
//! }
//! ```
//!
//! ## What survives a round-trip
//!
//! Relative paths, file contents, permission bits, empty directories,
//! symlink targets (stored raw, never followed), file modification times,
//! and, on platforms that have them, extended attributes, carried in tar
//! archives as `SCHILY.xattr.` PAX records.
//!
//! ## Safety
//!
//! Every entry name read from an archive is resolved through
//! [`secure_join`] before anything touches the filesystem. Names that are
//! absolute, climb above the destination with `..`, or route through a
//! symlink escaping the destination fail with [`Error::PathEscape`] and
//! abort the extraction. The resolution is re-derived for every entry
//! against live filesystem state, so a symlink materialized by an earlier
//! entry cannot redirect a later one outside the root.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Errors abort the operation and surface
//! unchanged; cleanup of partial output is the caller's responsibility.
//!
//! ## Concurrency
//!
//! All operations are synchronous and single-threaded; entries are
//! processed strictly sequentially. Extracting concurrently into the same
//! destination is not supported; serialize such calls externally.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod entry;
pub mod error;
pub mod format;
pub mod read;
pub mod secure_join;
pub mod write;
pub mod xattrs;

pub use entry::{Entry, EntryKind};
pub use error::{Error, Result};

// Re-export the operational API at the crate root for convenience.
pub use format::{SourceFormat, detect_format, detect_path};
pub use read::{Extractor, extract};
pub use secure_join::secure_join;
pub use write::{compress, write_tar};
