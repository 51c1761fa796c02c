//! Views over a drop payload.
//!
//! Browsers expose dropped content two ways: an item list that can reveal
//! directories, and a plain file list that is always present but flat. Each
//! view is a provider; the coordinator picks one per intake.

use crate::platform::{DirectoryHandle, DropItem, Entry};

/// A unit of work handed to the coordinator.
pub enum Source<D: DirectoryHandle> {
    /// A file to classify
    File(D::File),
    /// A directory to walk
    Directory(D),
}

/// One way of turning a payload into sources.
pub trait IntakeProvider<D: DirectoryHandle> {
    /// Short name used in log messages.
    fn label(&self) -> &'static str;

    /// The sources this view yields, in payload order.
    fn into_sources(self) -> Vec<Source<D>>;
}

/// Rich view: items that may expose directory entries.
pub struct RichItemsProvider<D: DirectoryHandle> {
    items: Vec<DropItem<D>>,
}

impl<D: DirectoryHandle> RichItemsProvider<D> {
    /// Provider over a payload's item list.
    pub fn new(items: Vec<DropItem<D>>) -> Self {
        Self { items }
    }
}

impl<D: DirectoryHandle> IntakeProvider<D> for RichItemsProvider<D> {
    fn label(&self) -> &'static str {
        "items"
    }

    fn into_sources(self) -> Vec<Source<D>> {
        self.items
            .into_iter()
            .filter_map(|item| match item {
                DropItem::Entry(Entry::Directory(dir)) => Some(Source::Directory(dir)),
                DropItem::Entry(Entry::File(file)) | DropItem::File(file) => {
                    Some(Source::File(file))
                }
                DropItem::Unknown => {
                    log::debug!("Ignoring non-file drop item");
                    None
                }
            })
            .collect()
    }
}

/// Flat view: plain files only, as file pickers and older browsers provide.
pub struct FlatFilesProvider<F> {
    files: Vec<F>,
}

impl<F> FlatFilesProvider<F> {
    /// Provider over a plain file list.
    pub fn new(files: Vec<F>) -> Self {
        Self { files }
    }
}

impl<D: DirectoryHandle> IntakeProvider<D> for FlatFilesProvider<D::File> {
    fn label(&self) -> &'static str {
        "files"
    }

    fn into_sources(self) -> Vec<Source<D>> {
        self.files.into_iter().map(Source::File).collect()
    }
}
