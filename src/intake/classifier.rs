//! File classification: image, archive, or junk.

use std::fmt;

use crate::config::IntakeConfig;
use crate::constants::{
    IMAGE_EXTENSIONS, IMAGE_MEDIA_TYPES, METADATA_DIR, METADATA_PREFIX, ZIP_EXTENSION,
    ZIP_MEDIA_TYPES,
};
use crate::platform::FileHandle;

/// Why a file was left out of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// macOS sidecar file (`._` prefix)
    MetadataFile,
    /// Smaller than the configured minimum
    Undersized {
        /// Declared size in bytes
        size: u64,
        /// Minimum accepted size in bytes
        minimum: u64,
    },
    /// Neither a supported image nor a ZIP archive
    Unrecognized,
    /// ZIP archive found inside a dropped folder (folders are scanned for images only)
    ArchiveInFolder,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MetadataFile => write!(f, "macOS metadata file"),
            RejectReason::Undersized { size, minimum } => {
                write!(f, "too small ({} bytes, minimum {})", size, minimum)
            }
            RejectReason::Unrecognized => write!(f, "not a supported image or ZIP archive"),
            RejectReason::ArchiveInFolder => write!(f, "archive inside a folder"),
        }
    }
}

/// Result of classifying one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Usable image
    Image,
    /// ZIP archive to expand
    Archive,
    /// Left out, with the reason
    Rejected(RejectReason),
}

/// Strip any directory components (`/` or `\`) from a path.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lowercase extension of the base name, without the dot.
pub fn extension(name: &str) -> Option<String> {
    let base = base_name(name);
    let (_, ext) = base.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Whether the base name carries the macOS sidecar prefix.
pub fn is_metadata_name(name: &str) -> bool {
    base_name(name).starts_with(METADATA_PREFIX)
}

/// Whether any component of an archive path marks macOS metadata.
pub fn is_metadata_path(path: &str) -> bool {
    path.split(['/', '\\'])
        .any(|segment| segment.starts_with(METADATA_PREFIX) || segment == METADATA_DIR)
}

/// Media type for an image file name, from its extension alone.
pub fn image_media_type_for(name: &str) -> Option<&'static str> {
    let ext = extension(name)?;
    IMAGE_EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, media_type)| *media_type)
}

/// Whether a file name has a supported image extension.
pub fn is_image_name(name: &str) -> bool {
    image_media_type_for(name).is_some()
}

/// Whether a file name has a ZIP extension.
pub fn is_zip_name(name: &str) -> bool {
    extension(name).is_some_and(|ext| ext == ZIP_EXTENSION)
}

fn normalized(media_type: &str) -> String {
    media_type.trim().to_ascii_lowercase()
}

/// Whether a declared media type is one of the accepted image types.
pub fn is_image_media_type(media_type: &str) -> bool {
    IMAGE_MEDIA_TYPES.contains(&normalized(media_type).as_str())
}

/// Whether a declared media type denotes a ZIP archive.
pub fn is_zip_media_type(media_type: &str) -> bool {
    ZIP_MEDIA_TYPES.contains(&normalized(media_type).as_str())
}

/// Decides what each candidate file is. Pure and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    min_file_size: u64,
}

impl Classifier {
    /// Classifier rejecting images below `min_file_size` bytes.
    pub fn new(min_file_size: u64) -> Self {
        Self { min_file_size }
    }

    /// Classifier using the configured thresholds.
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(config.min_file_size)
    }

    /// Minimum accepted image size in bytes.
    pub fn min_file_size(&self) -> u64 {
        self.min_file_size
    }

    /// Classify a file from its name, declared size and declared media type.
    ///
    /// Order matters: sidecar files are rejected before anything else, archives
    /// are never size-checked, and a recognized image media type wins over the
    /// extension.
    pub fn classify(&self, name: &str, size: u64, media_type: Option<&str>) -> Classification {
        if is_metadata_name(name) {
            return Classification::Rejected(RejectReason::MetadataFile);
        }

        let media_type = media_type.filter(|t| !t.trim().is_empty());

        if media_type.is_some_and(is_zip_media_type) || is_zip_name(name) {
            return Classification::Archive;
        }

        if size < self.min_file_size {
            return Classification::Rejected(RejectReason::Undersized {
                size,
                minimum: self.min_file_size,
            });
        }

        if media_type.is_some_and(is_image_media_type) || is_image_name(name) {
            return Classification::Image;
        }

        Classification::Rejected(RejectReason::Unrecognized)
    }

    /// Classify a platform file handle.
    pub fn classify_file<F: FileHandle>(&self, file: &F) -> Classification {
        let media_type = file.media_type();
        self.classify(&file.name(), file.size(), media_type.as_deref())
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&IntakeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str, size: u64, media_type: Option<&str>) -> Classification {
        Classifier::default().classify(name, size, media_type)
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("photos/sub/IMG_01.JPG"), "IMG_01.JPG");
        assert_eq!(base_name("C:\\survey\\IMG_02.jpg"), "IMG_02.jpg");
        assert_eq!(base_name("IMG_03.png"), "IMG_03.png");
    }

    #[test]
    fn test_metadata_prefix_always_rejected() {
        for (name, size, media_type) in [
            ("._IMG_01.jpg", 50_000, Some("image/jpeg")),
            ("._archive.zip", 50_000, Some("application/zip")),
            ("._tiny.png", 10, None),
            ("folder/._IMG_02.png", 5000, None),
        ] {
            assert_eq!(
                classify(name, size, media_type),
                Classification::Rejected(RejectReason::MetadataFile),
                "{name} should be rejected as metadata"
            );
        }
    }

    #[test]
    fn test_undersized_rejected_regardless_of_type() {
        assert_eq!(
            classify("photo.png", 500, Some("image/png")),
            Classification::Rejected(RejectReason::Undersized {
                size: 500,
                minimum: 1000
            })
        );
        assert!(matches!(
            classify("notes.txt", 10, None),
            Classification::Rejected(RejectReason::Undersized { .. })
        ));
        assert_eq!(classify("photo.png", 1000, None), Classification::Image);
    }

    #[test]
    fn test_archives_are_never_size_checked() {
        assert_eq!(classify("survey.zip", 22, None), Classification::Archive);
        assert_eq!(
            classify("download", 5000, Some("application/x-zip-compressed")),
            Classification::Archive
        );
        assert_eq!(classify("SURVEY.ZIP", 5000, Some("")), Classification::Archive);
    }

    #[test]
    fn test_media_type_wins_then_extension_fallback() {
        assert_eq!(
            classify("capture", 5000, Some("IMAGE/WEBP")),
            Classification::Image
        );
        assert_eq!(
            classify("IMG_01.TIFF", 5000, Some("application/octet-stream")),
            Classification::Image
        );
        assert_eq!(classify("IMG_01.JPEG", 5000, None), Classification::Image);
        assert_eq!(
            classify("report.pdf", 5000, Some("application/pdf")),
            Classification::Rejected(RejectReason::Unrecognized)
        );
        assert_eq!(
            classify("zipfile.txt", 5000, None),
            Classification::Rejected(RejectReason::Unrecognized)
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = Classifier::default();
        for (name, size) in [("a.png", 2000), ("._b.jpg", 2000), ("c.zip", 10), ("d", 9)] {
            assert_eq!(
                classifier.classify(name, size, None),
                classifier.classify(name, size, None)
            );
        }
    }

    #[test]
    fn test_metadata_paths() {
        assert!(is_metadata_path("._b.jpg"));
        assert!(is_metadata_path("photos/._b.jpg"));
        assert!(is_metadata_path("__MACOSX/photos/b.jpg"));
        assert!(is_metadata_path("photos/._cache/b.jpg"));
        assert!(!is_metadata_path("photos/sub/IMG_01.JPG"));
        assert!(!is_metadata_path("photos/my._b.jpg"));
    }

    #[test]
    fn test_media_type_table() {
        assert_eq!(image_media_type_for("a.PNG"), Some("image/png"));
        assert_eq!(image_media_type_for("a.jpg"), Some("image/jpeg"));
        assert_eq!(image_media_type_for("a.tif"), Some("image/tiff"));
        assert_eq!(image_media_type_for("dir.png/readme"), None);
        assert_eq!(image_media_type_for("noext"), None);
    }

    #[test]
    fn test_configured_threshold() {
        let classifier = Classifier::new(0);
        assert_eq!(classifier.classify("tiny.png", 1, None), Classification::Image);
    }
}
