//! Archive extraction.
//!
//! Extraction consumes an archive entry stream and reconstructs filesystem
//! objects under a destination root. Every entry name is resolved through
//! [`secure_join`](crate::secure_join) before anything is created, so a
//! hostile archive cannot write outside the destination; the first invalid
//! entry aborts the whole extraction.
//!
//! The supported container formats form a small closed set, dispatched
//! through one [`Extractor`] contract. [`Extractor::Auto`] (or the
//! crate-level [`extract`]) sniffs the source's content prefix and picks
//! the matching reader; [`Extractor::Tar`] and [`Extractor::Zip`] force a
//! specific reader, which still verifies the content prefix and fails with
//! [`Error::UnsupportedFormat`](crate::Error::UnsupportedFormat) on a
//! mismatch.

mod tar;
mod zip;

use std::path::Path;

use crate::format::{self, SourceFormat};
use crate::{Error, Result};

/// Selects which archive reader handles a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Extractor {
    /// Sniff the source's leading bytes and dispatch to the matching
    /// reader.
    #[default]
    Auto,
    /// Treat the source as a tar archive, plain or gzip-compressed.
    Tar,
    /// Treat the source as a zip archive.
    Zip,
}

impl Extractor {
    /// Extracts the archive at `src` into the directory `dest`.
    ///
    /// The destination is created if missing. Entries are processed
    /// strictly sequentially; each entry's filesystem side effects complete
    /// before the next entry is read. On error the destination may hold a
    /// partial tree, which is the caller's to clean up.
    pub fn extract(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        let src = src.as_ref();
        let dest = dest.as_ref();

        match self {
            Extractor::Auto => match format::detect_path(src)? {
                SourceFormat::Zip => zip::extract_file(src, dest),
                SourceFormat::Gzip | SourceFormat::Tar => tar::extract_file(src, dest),
                detected => Err(Error::UnsupportedFormat {
                    path: src.to_path_buf(),
                    detected,
                }),
            },
            Extractor::Tar => tar::extract_file(src, dest),
            Extractor::Zip => zip::extract_file(src, dest),
        }
    }
}

/// Extracts the archive at `src` into the directory `dest`, auto-detecting
/// the format (zip, gzip-compressed tar, or plain tar).
///
/// Shorthand for [`Extractor::Auto.extract(src, dest)`](Extractor::extract).
///
/// # Example
///
/// ```rust,no_run
/// treepack::extract("/tmp/bundle.tgz", "/srv/app")?;
/// # Ok::<(), treepack::Error>(())
/// ```
pub fn extract(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    Extractor::Auto.extract(src, dest)
}
