//! Error types for locating and editing the version stack.

use thiserror::Error;

use crate::arw::DirectoryId;

/// Errors raised while walking or editing an ARW container.
#[derive(Debug, Error)]
pub enum Error {
    /// Open/read/write/seek/resize failed, including short reads.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A tag the walk depends on is absent from its directory.
    #[error("tag 0x{tag:04x} missing from {directory}")]
    MissingTag { tag: u16, directory: DirectoryId },

    /// A resolved pointer failed a sanity bound.
    #[error("failed to parse this file: {0}")]
    Corrupt(Corruption),

    /// The file does not record a version stack.
    #[error("this file doesn't have version stack")]
    NotPresent,
}

/// Sanity bounds a version stack pointer can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Corruption {
    /// The payload would start inside or before its own pointer field.
    #[error("version stack start 0x{start:08x} precedes the end of its pointer at 0x{pointer_offset:08x}")]
    PointerBeforeStorage { start: u32, pointer_offset: u64 },

    /// Nothing lies between the payload start and end of file.
    #[error("version stack start 0x{start:08x} is not before end of file 0x{end:08x}")]
    EmptyPayload { start: u32, end: u64 },

    /// The payload start lies beyond end of file.
    #[error("version stack start 0x{start:08x} is past end of file 0x{end:08x}")]
    PointerPastEnd { start: u32, end: u64 },

    /// The file is too long for its end to be recorded in a 32-bit pointer.
    #[error("file length {len} does not fit a 32-bit version stack pointer")]
    FileTooLarge { len: u64 },
}

impl From<Corruption> for Error {
    fn from(c: Corruption) -> Self {
        Error::Corrupt(c)
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
