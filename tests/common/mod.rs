//! Shared test utilities for integration tests.
//!
//! Archive fixtures are described with a declarative [`ArchiveFile`] list
//! and rendered to tar, tgz, or zip files, so the same fixture can drive
//! every reader. Crafting helpers for hostile entries (names the normal
//! builders would refuse) live here too.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

/// One member of a fixture archive.
#[derive(Clone)]
pub struct ArchiveFile {
    pub name: &'static str,
    pub body: &'static str,
    pub link: &'static str,
    pub mode: u32,
    pub dir: bool,
}

impl ArchiveFile {
    /// A directory entry; trailing slash in `name` optional.
    pub fn dir(name: &'static str) -> Self {
        Self {
            name,
            body: "",
            link: "",
            mode: 0o755,
            dir: true,
        }
    }

    /// A regular file with the default mode.
    pub fn file(name: &'static str, body: &'static str) -> Self {
        Self {
            name,
            body,
            link: "",
            mode: 0o644,
            dir: false,
        }
    }

    /// A regular file with an explicit mode.
    pub fn file_with_mode(name: &'static str, body: &'static str, mode: u32) -> Self {
        Self {
            name,
            body,
            link: "",
            mode,
            dir: false,
        }
    }

    /// A symlink entry pointing at `target`.
    pub fn symlink(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            body: "",
            link: target,
            mode: 0o777,
            dir: false,
        }
    }
}

/// Renders the fixture list as an uncompressed tar stream.
pub fn tar_bytes(files: &[ArchiveFile]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut builder = tar::Builder::new(&mut bytes);
        for file in files {
            append_tar_entry(&mut builder, file);
        }
        builder.finish().unwrap();
    }
    bytes
}

fn append_tar_entry<W: Write>(builder: &mut tar::Builder<W>, file: &ArchiveFile) {
    let mut header = tar::Header::new_gnu();
    header.set_mode(file.mode);
    header.set_mtime(0);

    if file.dir {
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_path(file.name).unwrap();
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();
    } else if !file.link.is_empty() {
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        header.set_path(file.name).unwrap();
        header.set_link_name(file.link).unwrap();
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();
    } else {
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(file.body.len() as u64);
        header.set_path(file.name).unwrap();
        header.set_cksum();
        builder.append(&header, file.body.as_bytes()).unwrap();
    }
}

/// Writes the fixture list to `path` as a plain tar archive.
pub fn create_tar_archive(path: &Path, files: &[ArchiveFile]) {
    std::fs::write(path, tar_bytes(files)).unwrap();
}

/// Writes the fixture list to `path` as a gzip-compressed tar archive.
pub fn create_targz_archive(path: &Path, files: &[ArchiveFile]) {
    let out = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(out, Compression::default());
    encoder.write_all(&tar_bytes(files)).unwrap();
    encoder.finish().unwrap();
}

/// Writes the fixture list to `path` as a zip archive.
pub fn create_zip_archive(path: &Path, files: &[ArchiveFile]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for file in files {
        let options = SimpleFileOptions::default().unix_permissions(file.mode);
        if file.dir {
            writer
                .add_directory(file.name.trim_end_matches('/'), options)
                .unwrap();
        } else if !file.link.is_empty() {
            writer.add_symlink(file.name, file.link, options).unwrap();
        } else {
            writer.start_file(file.name, options).unwrap();
            writer.write_all(file.body.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Appends a regular-file entry with a raw, unvalidated name.
///
/// `Header::set_path` refuses some hostile names; writing the name bytes
/// straight into the GNU header bypasses that, which is exactly what a
/// malicious archive would contain.
pub fn append_raw_name_entry<W: Write>(builder: &mut tar::Builder<W>, name: &str, body: &str) {
    let mut header = tar::Header::new_gnu();
    {
        let gnu = header.as_gnu_mut().unwrap();
        gnu.name[..name.len()].copy_from_slice(name.as_bytes());
    }
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_size(body.len() as u64);
    header.set_cksum();
    builder.append(&header, body.as_bytes()).unwrap();
}

/// Builds a tar archive whose only entry carries a raw, unvalidated name.
pub fn create_raw_name_tar(path: &Path, name: &str, body: &str) {
    let mut bytes = Vec::new();
    {
        let mut builder = tar::Builder::new(&mut bytes);
        append_raw_name_entry(&mut builder, name, body);
        builder.finish().unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Collects every path under `root`, relative and slash-separated, sorted.
///
/// The root itself is not included.
pub fn collect_relative_paths(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.path() != root)
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    paths.sort();
    paths
}

/// Reads a file to a string, panicking with the path on failure.
pub fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

/// A scratch directory pair: a source tree to pack and a destination to
/// extract into.
pub struct Scratch {
    pub tempdir: tempfile::TempDir,
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        let tempdir = tempfile::tempdir().unwrap();
        let src = tempdir.path().join("src");
        let dest = tempdir.path().join("dest");
        std::fs::create_dir(&src).unwrap();
        std::fs::create_dir(&dest).unwrap();
        Self { tempdir, src, dest }
    }

    /// Path for an archive file inside the scratch area.
    pub fn archive(&self, name: &str) -> PathBuf {
        self.tempdir.path().join(name)
    }
}
