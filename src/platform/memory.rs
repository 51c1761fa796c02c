//! In-memory platform: files and directory trees held as byte buffers.
//!
//! Used wherever file contents are already in memory (embedding hosts,
//! tests). Directories hand out their children in fixed-size batches so they
//! behave like the browser's entry reader.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use web_time::SystemTime;

use super::{DirEntry, DirectoryHandle, DirectoryReader, Entry, FileHandle, PickerInput};
use crate::error::IntakeError;

/// Default number of children a [`MemoryDir`] hands out per batch.
pub const MEMORY_BATCH_SIZE: usize = 4;

/// A file held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryFile {
    name: String,
    media_type: Option<String>,
    last_modified: Option<SystemTime>,
    data: Vec<u8>,
    declared_size: Option<u64>,
    read_error: Option<String>,
}

impl MemoryFile {
    /// Create a file from its name and contents.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            last_modified: None,
            data: data.into(),
            declared_size: None,
            read_error: None,
        }
    }

    /// A file whose metadata is known but whose contents cannot be read.
    pub fn unreadable(name: impl Into<String>, size: u64, message: impl Into<String>) -> Self {
        Self {
            declared_size: Some(size),
            read_error: Some(message.into()),
            ..Self::new(name, Vec::new())
        }
    }

    /// Set the declared media type (empty strings count as absent).
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        self.media_type = (!media_type.is_empty()).then_some(media_type);
        self
    }

    /// Set the last modification time.
    pub fn with_last_modified(mut self, time: SystemTime) -> Self {
        self.last_modified = Some(time);
        self
    }

    /// File contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size())
            .finish()
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> u64 {
        self.declared_size.unwrap_or(self.data.len() as u64)
    }

    fn media_type(&self) -> Option<String> {
        self.media_type.clone()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, IntakeError> {
        match &self.read_error {
            Some(message) => Err(IntakeError::read(&self.name, message)),
            None => Ok(self.data.clone()),
        }
    }
}

/// A directory tree held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDir {
    name: String,
    entries: Vec<Entry<MemoryFile, MemoryDir>>,
    batch_size: usize,
    read_error: Option<String>,
}

impl MemoryDir {
    /// Create an empty directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            batch_size: MEMORY_BATCH_SIZE,
            read_error: None,
        }
    }

    /// A directory whose listing fails.
    pub fn unreadable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            read_error: Some(message.into()),
            ..Self::new(name)
        }
    }

    /// Add a file.
    pub fn with_file(mut self, file: MemoryFile) -> Self {
        self.entries.push(Entry::File(file));
        self
    }

    /// Add a subdirectory.
    pub fn with_dir(mut self, dir: MemoryDir) -> Self {
        self.entries.push(Entry::Directory(dir));
        self
    }

    /// Change how many children each read hands out (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl DirectoryHandle for MemoryDir {
    type File = MemoryFile;
    type Reader = MemoryDirReader;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn create_reader(&self) -> MemoryDirReader {
        MemoryDirReader {
            name: self.name.clone(),
            remaining: self.entries.iter().cloned().collect(),
            batch_size: self.batch_size,
            read_error: self.read_error.clone(),
        }
    }
}

/// Batched reader over a [`MemoryDir`].
#[derive(Debug)]
pub struct MemoryDirReader {
    name: String,
    remaining: VecDeque<Entry<MemoryFile, MemoryDir>>,
    batch_size: usize,
    read_error: Option<String>,
}

impl DirectoryReader for MemoryDirReader {
    type Dir = MemoryDir;

    async fn read_entries(&mut self) -> Result<Vec<DirEntry<MemoryDir>>, IntakeError> {
        if let Some(message) = &self.read_error {
            return Err(IntakeError::directory_read(&self.name, message));
        }
        let count = self.batch_size.min(self.remaining.len());
        Ok(self.remaining.drain(..count).collect())
    }
}

/// A file picker selection held in memory.
#[derive(Debug, Default)]
pub struct MemoryPicker {
    files: RefCell<Vec<MemoryFile>>,
    clears: Cell<usize>,
}

impl MemoryPicker {
    /// Picker with the given files selected.
    pub fn new(files: Vec<MemoryFile>) -> Self {
        Self {
            files: RefCell::new(files),
            clears: Cell::new(0),
        }
    }

    /// How many times the picker has been reset.
    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }
}

impl PickerInput for MemoryPicker {
    type File = MemoryFile;

    fn selected_files(&self) -> Vec<MemoryFile> {
        self.files.borrow().clone()
    }

    fn clear(&self) {
        self.files.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_drains_in_batches_until_empty() {
        let mut dir = MemoryDir::new("span-12").with_batch_size(2);
        for i in 0..5 {
            dir = dir.with_file(MemoryFile::new(format!("IMG_{i}.jpg"), vec![0u8; 10]));
        }

        let mut reader = dir.create_reader();
        let sizes: Vec<usize> = (0..4)
            .map(|_| pollster::block_on(reader.read_entries()).unwrap().len())
            .collect();

        assert_eq!(sizes, vec![2, 2, 1, 0]);
    }

    #[test]
    fn test_unreadable_file_reports_read_error() {
        let file = MemoryFile::unreadable("IMG_9.jpg", 5000, "permission denied");

        assert_eq!(file.size(), 5000);
        let err = pollster::block_on(file.read_bytes()).unwrap_err();
        assert!(matches!(err, IntakeError::Read { .. }));
    }

    #[test]
    fn test_empty_media_type_is_absent() {
        let file = MemoryFile::new("a.png", vec![1u8, 2, 3]).with_media_type("");
        assert_eq!(file.media_type(), None);
    }

    #[test]
    fn test_picker_clear_resets_selection() {
        let picker = MemoryPicker::new(vec![MemoryFile::new("a.png", vec![0u8; 10])]);
        assert_eq!(picker.selected_files().len(), 1);

        picker.clear();
        assert!(picker.selected_files().is_empty());
        assert_eq!(picker.clear_count(), 1);
    }
}
