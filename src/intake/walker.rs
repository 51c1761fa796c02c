//! Recursive directory traversal.

use super::classifier::{Classification, Classifier, RejectReason};
use super::image::ExtractedImage;
use super::report::IntakeReport;
use crate::platform::{DirectoryHandle, DirectoryReader, Entry, FileHandle};

/// Drains a directory tree into a flat list of images.
///
/// Traversal uses an explicit worklist rather than recursion, so depth is
/// bounded only by the tree itself. Every directory's reader is asked for
/// batches until it returns an empty one.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryWalker<'a> {
    classifier: &'a Classifier,
}

impl<'a> DirectoryWalker<'a> {
    /// Walker that keeps files the classifier accepts as images.
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier }
    }

    /// Walk `root` depth-first and collect every image at any depth.
    ///
    /// Non-image files are recorded as rejected. A directory whose listing
    /// fails is recorded as a failure; its siblings are still walked.
    pub async fn walk<D: DirectoryHandle>(&self, root: D) -> IntakeReport {
        let mut report = IntakeReport::default();
        let mut pending = vec![root];
        let mut visited = 0usize;

        while let Some(dir) = pending.pop() {
            visited += 1;
            let dir_name = dir.name();
            log::debug!("Processing directory: {}", dir_name);

            let mut reader = dir.create_reader();
            let mut subdirs = Vec::new();

            loop {
                let batch = match reader.read_entries().await {
                    Ok(batch) => batch,
                    Err(e) => {
                        report.fail(&dir_name, e);
                        break;
                    }
                };
                if batch.is_empty() {
                    break;
                }

                for entry in batch {
                    match entry {
                        Entry::File(file) => self.take_file(file, &mut report).await,
                        Entry::Directory(subdir) => subdirs.push(subdir),
                    }
                }
            }

            // Reversed so children are popped in listing order
            pending.extend(subdirs.into_iter().rev());
        }

        log::info!(
            "Walked {} directories: {} images, {} skipped",
            visited,
            report.images.len(),
            report.rejected.len()
        );
        report
    }

    async fn take_file<F: FileHandle>(&self, file: F, report: &mut IntakeReport) {
        let name = file.name();
        match self.classifier.classify_file(&file) {
            Classification::Image => match ExtractedImage::from_file(&file).await {
                Ok(image) => {
                    log::debug!("Found image '{}' ({} bytes)", image.name, image.size());
                    report.images.push(image);
                }
                Err(e) => report.fail(name, e),
            },
            Classification::Archive => report.reject(name, RejectReason::ArchiveInFolder),
            Classification::Rejected(reason) => report.reject(name, reason),
        }
    }
}
