//! Error types for intake operations.

use thiserror::Error;

/// Errors that can occur while turning a drop or selection into images.
///
/// None of these abort an intake on their own: the coordinator records them
/// per item and carries on with the rest of the payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// The ZIP container itself could not be opened
    #[error("Failed to unpack ZIP archive '{archive}': {message}")]
    ArchiveCorrupt {
        /// Name of the archive
        archive: String,
        /// Description of the container error
        message: String,
    },

    /// A single archive member could not be decompressed
    #[error("Failed to extract '{member}' from ZIP archive '{archive}': {message}")]
    MemberExtract {
        /// Name of the archive
        archive: String,
        /// Full path of the member inside the archive
        member: String,
        /// Description of the decompression error
        message: String,
    },

    /// A file's contents could not be read from the platform
    #[error("Failed to read '{name}': {message}")]
    Read {
        /// Name of the file
        name: String,
        /// Description of the read error
        message: String,
    },

    /// A batch of directory entries could not be read
    #[error("Failed to read directory '{name}': {message}")]
    DirectoryRead {
        /// Name of the directory
        name: String,
        /// Description of the read error
        message: String,
    },
}

impl IntakeError {
    /// Create an archive corruption error.
    pub fn archive_corrupt(archive: impl Into<String>, message: impl ToString) -> Self {
        Self::ArchiveCorrupt {
            archive: archive.into(),
            message: message.to_string(),
        }
    }

    /// Create a member extraction error.
    pub fn member_extract(
        archive: impl Into<String>,
        member: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::MemberExtract {
            archive: archive.into(),
            member: member.into(),
            message: message.to_string(),
        }
    }

    /// Create a file read error.
    pub fn read(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Read {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a directory read error.
    pub fn directory_read(name: impl Into<String>, message: impl ToString) -> Self {
        Self::DirectoryRead {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
