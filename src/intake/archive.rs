//! ZIP archive expansion.
//!
//! Opens an archive held in memory and turns every image member into an
//! [`ExtractedImage`]. Folders, macOS metadata and non-image members are
//! skipped silently; a member that fails to decompress is recorded and
//! skipped without affecting the others.
//!
//! Members are extracted one after another: the archive is already fully in
//! memory, so there is no I/O to overlap.

use std::io::{Cursor, Read, Seek};
use std::time::Duration;

use web_time::SystemTime;
use zip::ZipArchive;

use super::classifier::{is_image_name, is_metadata_path};
use super::image::ExtractedImage;
use crate::error::IntakeError;

/// Upper bound on the buffer reserved up front for one member.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Images extracted from one archive, plus the members that failed.
#[derive(Debug, Default)]
pub struct ArchiveContents {
    /// Extracted images, in archive order
    pub images: Vec<ExtractedImage>,
    /// One `MemberExtract` error per member that could not be decompressed
    pub failures: Vec<IntakeError>,
}

/// Convert a ZIP (DOS) timestamp to a system time, reading it as UTC.
fn zip_time_to_system_time(time: zip::DateTime) -> Option<SystemTime> {
    let naive = chrono::NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )?
    .and_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )?;
    let seconds = u64::try_from(naive.and_utc().timestamp()).ok()?;
    Some(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds))
}

/// Extract images from a ZIP archive reader.
///
/// Accepts any `Read + Seek` source.
fn extract_images_from_archive<R: Read + Seek>(
    reader: R,
    archive_name: &str,
) -> Result<ArchiveContents, IntakeError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| IntakeError::archive_corrupt(archive_name, e))?;

    let mut contents = ArchiveContents::default();
    let extracted_at = SystemTime::now();

    log::debug!("ZIP '{}' contains {} entries", archive_name, archive.len());

    for i in 0..archive.len() {
        let mut member = match archive.by_index(i) {
            Ok(member) => member,
            Err(e) => {
                let error = IntakeError::member_extract(archive_name, format!("entry #{}", i), e);
                log::error!("{}", error);
                contents.failures.push(error);
                continue;
            }
        };

        let path = member.name().to_string();

        if member.is_dir() {
            log::trace!("Skipping directory: {}", path);
            continue;
        }

        if is_metadata_path(&path) {
            log::trace!("Skipping macOS metadata file: {}", path);
            continue;
        }

        if !is_image_name(&path) {
            log::trace!("Skipping non-image: {}", path);
            continue;
        }

        let mut data = Vec::with_capacity(member.size().min(MAX_PREALLOCATION) as usize);
        if let Err(e) = member.read_to_end(&mut data) {
            let error = IntakeError::member_extract(archive_name, &path, e);
            log::error!("{}", error);
            contents.failures.push(error);
            continue;
        }

        let last_modified = member
            .last_modified()
            .and_then(zip_time_to_system_time)
            .unwrap_or(extracted_at);
        let image = ExtractedImage::from_bytes(&path, data, Some(last_modified));

        log::debug!(
            "Extracted image '{}' from '{}' ({} bytes)",
            image.name,
            path,
            image.size()
        );
        contents.images.push(image);
    }

    log::info!(
        "Extracted {} images from ZIP '{}' ({} failed)",
        contents.images.len(),
        archive_name,
        contents.failures.len()
    );

    Ok(contents)
}

/// Extract images from a ZIP archive held in memory.
///
/// Fails with [`IntakeError::ArchiveCorrupt`] only when the container itself
/// cannot be opened; an archive without images yields an empty result.
pub fn expand_zip_bytes(
    archive_name: &str,
    zip_data: &[u8],
) -> Result<ArchiveContents, IntakeError> {
    log::info!(
        "Extracting images from ZIP '{}' ({} bytes)",
        archive_name,
        zip_data.len()
    );

    extract_images_from_archive(Cursor::new(zip_data), archive_name)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;

    /// Build a stored (uncompressed) ZIP from `(path, contents)` pairs.
    /// Paths ending in `/` become directory entries.
    pub(crate) fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, data) in members {
            if path.ends_with('/') {
                writer.add_directory(*path, options).unwrap();
            } else {
                writer.start_file(*path, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    /// Flip one byte inside the first occurrence of `needle` so the member's
    /// checksum no longer matches.
    pub(crate) fn corrupt_member(zip: &mut [u8], needle: &[u8]) {
        let start = zip
            .windows(needle.len())
            .position(|window| window == needle)
            .expect("member data present");
        zip[start] ^= 0xFF;
    }

    #[test]
    fn test_extracts_images_and_strips_paths() {
        let zip = build_zip(&[
            ("photos/", b""),
            ("photos/sub/", b""),
            ("photos/sub/IMG_01.JPG", b"jpeg bytes"),
            ("tower.png", b"png bytes"),
        ]);

        let contents = expand_zip_bytes("survey.zip", &zip).unwrap();
        let names: Vec<&str> = contents.images.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["IMG_01.JPG", "tower.png"]);
        assert_eq!(contents.images[0].media_type, "image/jpeg");
        assert_eq!(contents.images[0].bytes(), b"jpeg bytes");
        assert_eq!(contents.images[1].media_type, "image/png");
        assert!(contents.failures.is_empty());
    }

    #[test]
    fn test_skips_metadata_and_non_images() {
        let zip = build_zip(&[
            ("a.jpg", b"a"),
            ("._b.jpg", b"b"),
            ("__MACOSX/photos/._a.jpg", b"c"),
            ("photos/._c.png", b"d"),
            ("notes.txt", b"e"),
        ]);

        let contents = expand_zip_bytes("survey.zip", &zip).unwrap();

        assert_eq!(contents.images.len(), 1);
        assert_eq!(contents.images[0].name, "a.jpg");
    }

    #[test]
    fn test_archive_without_images_is_empty_not_error() {
        let zip = build_zip(&[("readme.txt", b"hello"), ("data/", b""), ("data/x.csv", b"1,2")]);

        let contents = expand_zip_bytes("docs.zip", &zip).unwrap();

        assert!(contents.images.is_empty());
        assert!(contents.failures.is_empty());
    }

    #[test]
    fn test_corrupt_member_is_isolated() {
        let mut zip = build_zip(&[
            ("IMG_01.jpg", b"first image payload"),
            ("IMG_02.jpg", b"CORRUPTED MEMBER PAYLOAD"),
            ("IMG_03.png", b"third image payload"),
            ("IMG_04.bmp", b"fourth image payload"),
        ]);
        corrupt_member(&mut zip, b"CORRUPTED MEMBER PAYLOAD");

        let contents = expand_zip_bytes("survey.zip", &zip).unwrap();
        let names: Vec<&str> = contents.images.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["IMG_01.jpg", "IMG_03.png", "IMG_04.bmp"]);
        assert_eq!(contents.failures.len(), 1);
        assert!(matches!(
            &contents.failures[0],
            IntakeError::MemberExtract { member, .. } if member == "IMG_02.jpg"
        ));
    }

    #[test]
    fn test_unparseable_archive_is_corrupt() {
        let err = expand_zip_bytes("broken.zip", b"this is not a zip archive at all").unwrap_err();
        assert!(matches!(
            err,
            IntakeError::ArchiveCorrupt { archive, .. } if archive == "broken.zip"
        ));
    }

    #[test]
    fn test_member_timestamp_is_preserved() {
        let stamp = zip::DateTime::from_date_and_time(2024, 5, 17, 10, 30, 0).unwrap();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(stamp);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("IMG_01.jpg", options).unwrap();
        writer.write_all(b"image").unwrap();
        let zip = writer.finish().unwrap().into_inner();

        let contents = expand_zip_bytes("survey.zip", &zip).unwrap();

        // 2024-05-17T10:30:00Z
        let expected = SystemTime::UNIX_EPOCH + Duration::from_secs(1_715_941_800);
        assert_eq!(contents.images[0].last_modified, expected);
    }

    #[test]
    fn test_deflated_members_are_decompressed() {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let payload = vec![42u8; 10_000];
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("span/IMG_05.tiff", options).unwrap();
        writer.write_all(&payload).unwrap();
        let zip = writer.finish().unwrap().into_inner();

        let contents = expand_zip_bytes("survey.zip", &zip).unwrap();

        assert_eq!(contents.images[0].name, "IMG_05.tiff");
        assert_eq!(contents.images[0].media_type, "image/tiff");
        assert_eq!(contents.images[0].data, payload);
    }
}
