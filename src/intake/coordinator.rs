//! Intake coordination: drops and picker selections in, image lists out.

use std::cell::Cell;
use std::fmt;

use super::archive::expand_zip_bytes;
use super::classifier::{Classification, Classifier};
use super::image::ExtractedImage;
use super::provider::{FlatFilesProvider, IntakeProvider, RichItemsProvider, Source};
use super::report::{IntakeOutcome, IntakeReport};
use super::walker::DirectoryWalker;
use crate::config::IntakeConfig;
use crate::platform::{DirectoryHandle, DropPayload, FileHandle, PickerInput};

/// Runs the classifier, archive expander and directory walker over a payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeCoordinator {
    classifier: Classifier,
}

impl IntakeCoordinator {
    /// Coordinator using the given classifier.
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Coordinator using the configured thresholds.
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(Classifier::from_config(config))
    }

    /// Process a drop.
    ///
    /// The item view is used when the payload carries one; if it yields no
    /// images at all, the plain file list is processed instead.
    pub async fn intake_drop<D: DirectoryHandle>(&self, payload: DropPayload<D>) -> IntakeReport {
        let DropPayload { items, files } = payload;

        let Some(items) = items.filter(|items| !items.is_empty()) else {
            return self.run::<D, _>(FlatFilesProvider::new(files)).await;
        };

        let report = self.run::<D, _>(RichItemsProvider::new(items)).await;
        if !report.images.is_empty() || files.is_empty() {
            return report;
        }

        log::info!(
            "Item view produced no images, retrying with {} plain files",
            files.len()
        );
        self.run::<D, _>(FlatFilesProvider::new(files)).await
    }

    /// Process a file picker selection, keeping selection order.
    pub async fn intake_selection<F: FileHandle>(&self, files: Vec<F>) -> IntakeReport {
        let mut report = IntakeReport::default();
        for file in files {
            self.take_file(file, &mut report).await;
        }
        report
    }

    async fn run<D, P>(&self, provider: P) -> IntakeReport
    where
        D: DirectoryHandle,
        P: IntakeProvider<D>,
    {
        let label = provider.label();
        let sources = provider.into_sources();
        log::debug!("Processing {} sources from the {} view", sources.len(), label);

        let mut report = IntakeReport::default();
        for source in sources {
            match source {
                Source::Directory(dir) => {
                    log::info!("Processing directory: {}", dir.name());
                    let walked = DirectoryWalker::new(&self.classifier).walk(dir).await;
                    report.merge(walked);
                }
                Source::File(file) => self.take_file(file, &mut report).await,
            }
        }
        report
    }

    /// Classify one top-level file and act on the result.
    async fn take_file<F: FileHandle>(&self, file: F, report: &mut IntakeReport) {
        let name = file.name();
        match self.classifier.classify_file(&file) {
            Classification::Archive => {
                let data = match file.read_bytes().await {
                    Ok(data) => data,
                    Err(e) => {
                        report.fail(name, e);
                        return;
                    }
                };
                match expand_zip_bytes(&name, &data) {
                    Ok(contents) => report.absorb_archive(&name, contents),
                    Err(e) => report.fail(name, e),
                }
            }
            Classification::Image => match ExtractedImage::from_file(&file).await {
                Ok(image) => report.images.push(image),
                Err(e) => report.fail(name, e),
            },
            Classification::Rejected(reason) => report.reject(name, reason),
        }
    }
}

/// Callback receiving the images of one completed intake.
pub type FilesCallback = Box<dyn Fn(Vec<ExtractedImage>)>;

/// Clears the in-flight flag when an intake finishes, however it finishes.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A drop target plus file picker feeding one consumer.
///
/// The callback fires once per intake with the flat image list, and only when
/// that list is non-empty. Intakes do not overlap: one started while another
/// is still running is turned away with [`IntakeOutcome::Busy`].
pub struct Dropzone<D: DirectoryHandle> {
    coordinator: IntakeCoordinator,
    on_files: FilesCallback,
    in_flight: Cell<bool>,
    _platform: std::marker::PhantomData<fn(D)>,
}

impl<D: DirectoryHandle> Dropzone<D> {
    /// Dropzone with the given settings and consumer.
    pub fn new(config: &IntakeConfig, on_files: impl Fn(Vec<ExtractedImage>) + 'static) -> Self {
        Self {
            coordinator: IntakeCoordinator::from_config(config),
            on_files: Box::new(on_files),
            in_flight: Cell::new(false),
            _platform: std::marker::PhantomData,
        }
    }

    /// Whether an intake is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Handle a drop.
    pub async fn handle_drop(&self, payload: DropPayload<D>) -> IntakeOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log::warn!("Drop ignored: previous intake still running");
            return IntakeOutcome::Busy;
        };

        let report = self.coordinator.intake_drop(payload).await;
        self.deliver(report, "drop")
    }

    /// Handle a file picker selection. The picker is cleared on every path,
    /// so the same files can be selected again.
    pub async fn handle_selection<P>(&self, input: &P) -> IntakeOutcome
    where
        P: PickerInput<File = D::File>,
    {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log::warn!("Selection ignored: previous intake still running");
            input.clear();
            return IntakeOutcome::Busy;
        };

        let files = input.selected_files();
        let report = self.coordinator.intake_selection(files).await;
        let outcome = self.deliver(report, "selection");
        input.clear();
        outcome
    }

    fn deliver(&self, report: IntakeReport, source: &str) -> IntakeOutcome {
        let (images, summary) = report.into_parts();
        if images.is_empty() {
            log::warn!(
                "No valid image files in {} ({} skipped, {} failed)",
                source,
                summary.rejected.len(),
                summary.failures.len()
            );
            return IntakeOutcome::Empty(summary);
        }

        log::info!("Extracted {} image files from {}", images.len(), source);
        (self.on_files)(images);
        IntakeOutcome::Delivered(summary)
    }
}

impl<D: DirectoryHandle> fmt::Debug for Dropzone<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropzone")
            .field("coordinator", &self.coordinator)
            .field("in_flight", &self.in_flight.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::platform::memory::{MemoryDir, MemoryFile, MemoryPicker};

    type Received = Rc<RefCell<Vec<Vec<ExtractedImage>>>>;

    fn recording_dropzone() -> (Dropzone<MemoryDir>, Received) {
        let received: Received = Rc::default();
        let sink = received.clone();
        let dropzone = Dropzone::new(&IntakeConfig::default(), move |images| {
            sink.borrow_mut().push(images)
        });
        (dropzone, received)
    }

    #[test]
    fn test_in_flight_guard_releases() {
        let flag = Cell::new(false);
        {
            let _guard = InFlight::acquire(&flag).unwrap();
            assert!(flag.get());
            assert!(InFlight::acquire(&flag).is_none());
        }
        assert!(!flag.get());
        assert!(InFlight::acquire(&flag).is_some());
    }

    #[test]
    fn test_busy_dropzone_turns_intake_away() {
        let (dropzone, received) = recording_dropzone();
        let picker = MemoryPicker::new(vec![MemoryFile::new("a.png", vec![0u8; 2000])]);

        dropzone.in_flight.set(true);
        let outcome = pollster::block_on(dropzone.handle_selection(&picker));

        assert_eq!(outcome, IntakeOutcome::Busy);
        assert!(received.borrow().is_empty());
        assert_eq!(picker.clear_count(), 1);

        let payload = DropPayload::<MemoryDir>::files_only(vec![MemoryFile::new(
            "a.png",
            vec![0u8; 2000],
        )]);
        assert_eq!(pollster::block_on(dropzone.handle_drop(payload)), IntakeOutcome::Busy);
        assert!(dropzone.is_busy());
    }

    #[test]
    fn test_flag_cleared_after_each_intake() {
        let (dropzone, received) = recording_dropzone();
        let payload = DropPayload::<MemoryDir>::files_only(vec![MemoryFile::new(
            "a.png",
            vec![0u8; 2000],
        )]);

        let outcome = pollster::block_on(dropzone.handle_drop(payload));

        assert_eq!(outcome.delivered(), 1);
        assert!(!dropzone.is_busy());
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn test_fallback_not_used_when_items_found_images() {
        let coordinator = IntakeCoordinator::default();
        let photo = MemoryFile::new("photo.png", vec![0u8; 2000]);
        let payload = DropPayload::<MemoryDir>::new(
            vec![crate::platform::DropItem::Entry(crate::platform::Entry::File(photo.clone()))],
            vec![photo],
        );

        let report = pollster::block_on(coordinator.intake_drop(payload));

        // Classified once, not once per view
        assert_eq!(report.images.len(), 1);
    }
}
