//! Per-intake bookkeeping: what was accepted, skipped, and what failed.

use super::archive::ArchiveContents;
use super::classifier::RejectReason;
use super::image::ExtractedImage;
use crate::error::IntakeError;

/// A file left out of the result, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Name of the file
    pub name: String,
    /// Why it was left out
    pub reason: RejectReason,
}

/// An item that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Name of the file, archive or directory
    pub name: String,
    /// What went wrong
    pub error: IntakeError,
}

/// Everything one intake produced.
#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Accepted images, in processing order
    pub images: Vec<ExtractedImage>,
    /// Files silently left out
    pub rejected: Vec<Rejection>,
    /// Contained failures (unreadable files, corrupt archives or members)
    pub failures: Vec<Failure>,
}

impl IntakeReport {
    /// Record a rejected file.
    pub fn reject(&mut self, name: impl Into<String>, reason: RejectReason) {
        let name = name.into();
        log::trace!("Skipping '{}': {}", name, reason);
        self.rejected.push(Rejection { name, reason });
    }

    /// Record a contained failure.
    pub fn fail(&mut self, name: impl Into<String>, error: IntakeError) {
        let name = name.into();
        log::error!("{}", error);
        self.failures.push(Failure { name, error });
    }

    /// Fold an expanded archive into this report.
    pub fn absorb_archive(&mut self, archive: &str, contents: ArchiveContents) {
        self.images.extend(contents.images);
        self.failures
            .extend(contents.failures.into_iter().map(|error| Failure {
                name: archive.to_string(),
                error,
            }));
    }

    /// Append another report's contents.
    pub fn merge(&mut self, other: IntakeReport) {
        self.images.extend(other.images);
        self.rejected.extend(other.rejected);
        self.failures.extend(other.failures);
    }

    /// Split into the image list and a summary of the rest.
    pub fn into_parts(self) -> (Vec<ExtractedImage>, IntakeSummary) {
        let summary = IntakeSummary {
            images: self.images.len(),
            rejected: self.rejected,
            failures: self.failures,
        };
        (self.images, summary)
    }
}

/// What remains of a report once its images have been handed off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeSummary {
    /// Number of images delivered
    pub images: usize,
    /// Files silently left out
    pub rejected: Vec<Rejection>,
    /// Contained failures
    pub failures: Vec<Failure>,
}

/// How a drop or selection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Images were found and handed to the callback
    Delivered(IntakeSummary),
    /// Nothing usable was found; the callback did not fire
    Empty(IntakeSummary),
    /// Another intake was still running; nothing was processed
    Busy,
}

impl IntakeOutcome {
    /// Summary of the intake, unless it was turned away.
    pub fn summary(&self) -> Option<&IntakeSummary> {
        match self {
            IntakeOutcome::Delivered(summary) | IntakeOutcome::Empty(summary) => Some(summary),
            IntakeOutcome::Busy => None,
        }
    }

    /// Number of images delivered to the callback.
    pub fn delivered(&self) -> usize {
        match self {
            IntakeOutcome::Delivered(summary) => summary.images,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ExtractedImage {
        ExtractedImage::from_bytes(name, vec![0u8; 16], None)
    }

    #[test]
    fn test_archive_failures_are_attributed_to_the_archive() {
        let mut report = IntakeReport::default();
        report.absorb_archive(
            "span-2.zip",
            ArchiveContents {
                images: vec![image("IMG_01.jpg")],
                failures: vec![IntakeError::member_extract("span-2.zip", "IMG_02.jpg", "bad crc")],
            },
        );

        assert_eq!(report.images.len(), 1);
        assert_eq!(report.failures[0].name, "span-2.zip");
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut first = IntakeReport::default();
        first.images.push(image("a.jpg"));
        first.reject("notes.txt", RejectReason::Unrecognized);

        let mut second = IntakeReport::default();
        second.images.push(image("b.jpg"));
        second.fail("c.jpg", IntakeError::read("c.jpg", "gone"));

        first.merge(second);
        let (images, summary) = first.into_parts();

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(summary.images, 2);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.failures.len(), 1);
    }

    #[test]
    fn test_outcome_accessors() {
        let summary = IntakeSummary {
            images: 3,
            ..IntakeSummary::default()
        };

        assert_eq!(IntakeOutcome::Delivered(summary.clone()).delivered(), 3);
        assert_eq!(IntakeOutcome::Empty(IntakeSummary::default()).delivered(), 0);
        assert_eq!(IntakeOutcome::Busy.summary(), None);
        assert_eq!(
            IntakeOutcome::Delivered(summary.clone()).summary(),
            Some(&summary)
        );
    }
}
