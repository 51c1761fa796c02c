//! Platform capabilities the intake pipeline runs against.
//!
//! Each platform (browser, native filesystem, in-memory) supplies file handles,
//! directory handles that hand out their children in batches, and a drop
//! payload that may or may not carry the richer entry view.

use std::future::Future;

use web_time::SystemTime;

use crate::error::IntakeError;

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// A flat file offered to the pipeline.
pub trait FileHandle {
    /// File name as reported by the platform (may include a relative path).
    fn name(&self) -> String;

    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Declared media type, if the platform supplies a non-empty one.
    fn media_type(&self) -> Option<String>;

    /// Last modification time, if known.
    fn last_modified(&self) -> Option<SystemTime>;

    /// Read the whole file into memory.
    fn read_bytes(&self) -> impl Future<Output = Result<Vec<u8>, IntakeError>>;
}

/// A child of a directory: either a file or another directory.
#[derive(Debug, Clone)]
pub enum Entry<F, D> {
    /// A file entry
    File(F),
    /// A directory entry
    Directory(D),
}

/// Entry type produced by reading directory `D`.
pub type DirEntry<D> = Entry<<D as DirectoryHandle>::File, D>;

/// A directory whose children can be enumerated.
pub trait DirectoryHandle: Sized {
    /// File handle type found inside this directory.
    type File: FileHandle;

    /// Reader that enumerates this directory's children.
    type Reader: DirectoryReader<Dir = Self>;

    /// Directory name.
    fn name(&self) -> String;

    /// Start enumerating the directory's children.
    fn create_reader(&self) -> Self::Reader;
}

/// Batched enumeration of one directory.
///
/// A single call is not guaranteed to return every child. Callers keep asking
/// until an empty batch comes back.
pub trait DirectoryReader {
    /// Directory type this reader enumerates.
    type Dir: DirectoryHandle;

    /// Read the next batch of children. An empty batch means exhaustion.
    fn read_entries(
        &mut self,
    ) -> impl Future<Output = Result<Vec<DirEntry<Self::Dir>>, IntakeError>>;
}

/// One item of a drop payload.
pub enum DropItem<D: DirectoryHandle> {
    /// The platform exposed the richer entry view for this item
    Entry(DirEntry<D>),
    /// Only the plain file view is available
    File(D::File),
    /// Not a file (dragged text, links, ...)
    Unknown,
}

/// Everything a single drop delivers.
pub struct DropPayload<D: DirectoryHandle> {
    /// Item view, `None` when the platform has no item list at all
    pub items: Option<Vec<DropItem<D>>>,
    /// Plain file list, always available (top-level files only)
    pub files: Vec<D::File>,
}

impl<D: DirectoryHandle> DropPayload<D> {
    /// Payload with both the item view and the plain file list.
    pub fn new(items: Vec<DropItem<D>>, files: Vec<D::File>) -> Self {
        Self {
            items: Some(items),
            files,
        }
    }

    /// Payload from a platform that only exposes the plain file list.
    pub fn files_only(files: Vec<D::File>) -> Self {
        Self { items: None, files }
    }
}

/// A file picker whose selection the pipeline consumes.
pub trait PickerInput {
    /// File handle type the picker yields.
    type File: FileHandle;

    /// Files currently selected, in selection order.
    fn selected_files(&self) -> Vec<Self::File>;

    /// Reset the picker so the same files can be chosen again.
    fn clear(&self);
}
