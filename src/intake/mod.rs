//! The file intake pipeline.
//!
//! A drop or picker selection is turned into a flat list of images:
//!
//! - [`classifier`] decides whether a file is an image, a ZIP archive or junk
//! - [`archive`] expands ZIP archives held in memory
//! - [`walker`] drains dropped folders, at any depth
//! - [`coordinator`] runs the above over a whole payload and hands the result
//!   to the consumer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lep_intake::config::IntakeConfig;
//! use lep_intake::intake::Dropzone;
//!
//! let dropzone = Dropzone::new(&IntakeConfig::default(), |images| upload(images));
//! let outcome = dropzone.handle_drop(payload).await;
//! ```

pub mod archive;
pub mod classifier;
pub mod coordinator;
pub mod image;
pub mod provider;
pub mod report;
pub mod walker;

#[cfg(test)]
mod tests;

pub use archive::{ArchiveContents, expand_zip_bytes};
pub use classifier::{Classification, Classifier, RejectReason};
pub use coordinator::{Dropzone, FilesCallback, IntakeCoordinator};
pub use image::ExtractedImage;
pub use provider::{FlatFilesProvider, IntakeProvider, RichItemsProvider, Source};
pub use report::{Failure, IntakeOutcome, IntakeReport, IntakeSummary, Rejection};
pub use walker::DirectoryWalker;
