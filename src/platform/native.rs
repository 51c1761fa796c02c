//! Native filesystem platform (not available on WASM).
//!
//! Paths given on the command line or dropped onto a native window become a
//! drop payload: directories are walked through [`NativeDir`], files are read
//! with `std::fs`.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use web_time::SystemTime;

use super::{
    DirEntry, DirectoryHandle, DirectoryReader, DropItem, DropPayload, Entry, FileHandle,
    PickerInput,
};
use crate::error::IntakeError;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// A file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFile {
    path: PathBuf,
    size: u64,
    modified: Option<SystemTime>,
}

impl NativeFile {
    /// Stat a file (following symlinks).
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            path,
        })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileHandle for NativeFile {
    fn name(&self) -> String {
        display_name(&self.path)
    }

    fn size(&self) -> u64 {
        self.size
    }

    // The filesystem declares no media type; classification falls back to the extension
    fn media_type(&self) -> Option<String> {
        None
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.modified
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, IntakeError> {
        fs::read(&self.path).map_err(|e| IntakeError::read(self.name(), e))
    }
}

/// A directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDir {
    path: PathBuf,
    batch_size: usize,
}

impl NativeDir {
    /// Directory whose reader hands out `batch_size` children per read.
    pub fn new(path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryHandle for NativeDir {
    type File = NativeFile;
    type Reader = NativeDirReader;

    fn name(&self) -> String {
        display_name(&self.path)
    }

    fn create_reader(&self) -> NativeDirReader {
        NativeDirReader {
            dir: self.clone(),
            listing: None,
            finished: false,
        }
    }
}

/// Batched reader over a [`NativeDir`]. The listing is opened on first read.
#[derive(Debug)]
pub struct NativeDirReader {
    dir: NativeDir,
    listing: Option<fs::ReadDir>,
    finished: bool,
}

impl NativeDirReader {
    fn next_entry(&mut self) -> Option<std::io::Result<fs::DirEntry>> {
        let entry = self.listing.as_mut()?.next();
        if entry.is_none() {
            self.finished = true;
        }
        entry
    }
}

impl DirectoryReader for NativeDirReader {
    type Dir = NativeDir;

    async fn read_entries(&mut self) -> Result<Vec<DirEntry<NativeDir>>, IntakeError> {
        if self.finished {
            return Ok(Vec::new());
        }
        if self.listing.is_none() {
            let listing = fs::read_dir(&self.dir.path)
                .map_err(|e| IntakeError::directory_read(self.dir.name(), e))?;
            self.listing = Some(listing);
        }

        let mut batch = Vec::with_capacity(self.dir.batch_size);
        while batch.len() < self.dir.batch_size {
            let Some(entry) = self.next_entry() else {
                break;
            };
            let found = entry.and_then(|entry| Ok((entry.path(), entry.file_type()?)));
            let (path, file_type) = match found {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {:?}: {}", self.dir.path, e);
                    continue;
                }
            };

            // Linked folders are not descended into: a link back to an
            // ancestor would otherwise revisit the same files forever
            if file_type.is_symlink() && path.is_dir() {
                log::debug!("Skipping linked folder {:?}", path);
                continue;
            }

            // Linked files are followed
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => {
                    batch.push(Entry::Directory(NativeDir::new(path, self.dir.batch_size)));
                }
                Ok(metadata) => batch.push(Entry::File(NativeFile {
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                    path,
                })),
                Err(e) => log::warn!("Skipping {:?}: {}", path, e),
            }
        }

        Ok(batch)
    }
}

/// Build a drop payload from paths, the way a native window reports a drop.
///
/// Directories and files both appear in the item view; only files appear in
/// the plain file list. Paths that cannot be stat'ed become unknown items.
pub fn payload_from_paths(paths: &[PathBuf], batch_size: usize) -> DropPayload<NativeDir> {
    let mut items = Vec::with_capacity(paths.len());
    let mut files = Vec::new();

    for path in paths {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                items.push(DropItem::Entry(Entry::Directory(NativeDir::new(
                    path.clone(),
                    batch_size,
                ))));
            }
            Ok(metadata) => {
                let file = NativeFile {
                    path: path.clone(),
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                };
                files.push(file.clone());
                items.push(DropItem::Entry(Entry::File(file)));
            }
            Err(e) => {
                log::warn!("Cannot access {:?}: {}", path, e);
                items.push(DropItem::Unknown);
            }
        }
    }

    DropPayload::new(items, files)
}

/// A file picker selection made of paths.
///
/// Pickers only return flat files, so directories are left out.
#[derive(Debug, Default)]
pub struct PathSelection {
    files: RefCell<Vec<NativeFile>>,
}

impl PathSelection {
    /// Select the given paths, skipping directories and unreadable paths.
    pub fn new(paths: &[PathBuf]) -> Self {
        let files = paths
            .iter()
            .filter_map(|path| match NativeFile::open(path) {
                Ok(_) if path.is_dir() => {
                    log::warn!("Skipping folder {:?}: pickers select files only", path);
                    None
                }
                Ok(file) => Some(file),
                Err(e) => {
                    log::warn!("Cannot access {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        Self {
            files: RefCell::new(files),
        }
    }
}

impl PickerInput for PathSelection {
    type File = NativeFile;

    fn selected_files(&self) -> Vec<NativeFile> {
        self.files.borrow().clone()
    }

    fn clear(&self) {
        self.files.borrow_mut().clear();
    }
}
