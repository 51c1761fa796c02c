//! Extracted images: the pipeline's output unit.

use std::fmt;

use web_time::SystemTime;

use super::classifier::{base_name, image_media_type_for, is_image_media_type};
use crate::constants::FALLBACK_IMAGE_MEDIA_TYPE;
use crate::error::IntakeError;
use crate::platform::FileHandle;

/// A classified, ready-to-upload image held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// Base file name (no directory components)
    pub name: String,
    /// MIME-style media type
    pub media_type: String,
    /// Modification time from the source, or the time of extraction
    pub last_modified: SystemTime,
    /// File contents
    pub data: Vec<u8>,
}

impl ExtractedImage {
    /// Build an image from a name and contents, inferring the media type
    /// from the extension.
    pub fn from_bytes(name: &str, data: Vec<u8>, last_modified: Option<SystemTime>) -> Self {
        let name = base_name(name).to_string();
        let media_type = image_media_type_for(&name)
            .unwrap_or(FALLBACK_IMAGE_MEDIA_TYPE)
            .to_string();
        Self {
            name,
            media_type,
            last_modified: last_modified.unwrap_or_else(SystemTime::now),
            data,
        }
    }

    /// Read a platform file that classified as an image.
    ///
    /// A declared image media type is kept as-is; otherwise the type comes
    /// from the extension.
    pub async fn from_file<F: FileHandle>(file: &F) -> Result<Self, IntakeError> {
        let data = file.read_bytes().await?;
        let mut image = Self::from_bytes(&file.name(), data, file.last_modified());
        if let Some(declared) = file.media_type().filter(|t| is_image_media_type(t)) {
            image.media_type = declared.trim().to_ascii_lowercase();
        }
        Ok(image)
    }

    /// Size of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// File contents.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for ExtractedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedImage")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size())
            .field("last_modified", &self.last_modified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::platform::memory::MemoryFile;

    #[test]
    fn test_from_bytes_strips_path_and_infers_type() {
        let image = ExtractedImage::from_bytes("photos/sub/IMG_01.PNG", vec![1, 2, 3], None);

        assert_eq!(image.name, "IMG_01.PNG");
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.size(), 3);
    }

    #[test]
    fn test_from_file_keeps_declared_image_type() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let file = MemoryFile::new("IMG_01.jpg", vec![7u8; 2000])
            .with_media_type("image/jpg")
            .with_last_modified(time);

        let image = pollster::block_on(ExtractedImage::from_file(&file)).unwrap();

        assert_eq!(image.media_type, "image/jpg");
        assert_eq!(image.last_modified, time);
        assert_eq!(image.bytes(), file.data());
    }

    #[test]
    fn test_from_file_replaces_unusable_declared_type() {
        let file = MemoryFile::new("IMG_01.webp", vec![7u8; 2000])
            .with_media_type("application/octet-stream");

        let image = pollster::block_on(ExtractedImage::from_file(&file)).unwrap();
        assert_eq!(image.media_type, "image/webp");
    }
}
