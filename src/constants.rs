//! Fixed intake constants: allow-lists, MIME tables and thresholds.

/// Filename prefix macOS uses for resource-fork sidecar files.
pub const METADATA_PREFIX: &str = "._";

/// Directory macOS archivers put sidecar files into.
pub const METADATA_DIR: &str = "__MACOSX";

/// Files smaller than this are treated as placeholders or corrupt uploads.
pub const DEFAULT_MIN_FILE_SIZE: u64 = 1000;

/// Number of entries the native directory reader hands out per batch.
pub const DEFAULT_DIRECTORY_BATCH_SIZE: usize = 100;

/// Image media types accepted as-is when a platform declares them.
pub const IMAGE_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Media types browsers report for ZIP archives.
pub const ZIP_MEDIA_TYPES: &[&str] = &["application/zip", "application/x-zip-compressed"];

/// Image extensions (lowercase, without dots) and the media type each maps to.
pub const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
];

/// ZIP archive extension (lowercase, without dot).
pub const ZIP_EXTENSION: &str = "zip";

/// Fallback media type for extracted images whose extension is not in the table.
pub const FALLBACK_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// `accept` attribute for file picker inputs.
pub const PICKER_ACCEPT: &str = "image/*,.zip,application/zip,application/x-zip-compressed";

/// Format hint shown next to the drop target.
pub const FORMAT_HINT: &str = "png, jpeg, jpg, gif, webp, bmp, tiff, zip";
