//! Version stack editing: remove, store (extract) and restore (re-attach).
//!
//! The version stack is the trailing region `[start, EOF)` of the file, where
//! `start` is read from the pointer field found by the resolver. A zero
//! pointer means no stack is recorded.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::{debug, info};

use crate::arw::resolver::resolve_version_stack_offset;
use crate::arw::store::{stream_len, ByteStore};
use crate::arw::tiff::Endian;
use crate::error::{Corruption, Error, Result};

/// Width of the pointer field.
pub const POINTER_LEN: u64 = 4;

/// The pointer field's location and current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStackState {
    pub pointer_offset: u64,
    /// Recorded start of the payload; 0 when absent.
    pub start: u32,
}

impl VersionStackState {
    pub fn is_present(&self) -> bool {
        self.start != 0
    }

    /// The payload must begin strictly after its own pointer field.
    fn payload_floor(&self) -> u64 {
        self.pointer_offset + POINTER_LEN
    }

    /// Start of a recorded, plausibly placed payload.
    fn payload_start(&self) -> Result<u64> {
        if !self.is_present() {
            return Err(Error::NotPresent);
        }
        self.checked_start()
    }

    fn checked_start(&self) -> Result<u64> {
        let start = u64::from(self.start);
        if start < self.payload_floor() {
            return Err(Corruption::PointerBeforeStorage {
                start: self.start,
                pointer_offset: self.pointer_offset,
            }
            .into());
        }
        Ok(start)
    }
}

/// Resolve the pointer field and read its value. Leaves the stream right
/// after the pointer.
pub fn locate<R: Read + Seek + ?Sized>(r: &mut R, endian: Endian) -> Result<VersionStackState> {
    let pointer_offset = resolve_version_stack_offset(r, endian)?;
    r.seek(SeekFrom::Start(pointer_offset))?;
    let start = endian.read_u32(r)?;
    debug!(pointer_offset, start, "read version stack pointer");
    Ok(VersionStackState {
        pointer_offset,
        start,
    })
}

/// Clear the pointer and truncate the file at the old payload start.
/// Returns the number of bytes discarded.
pub fn remove_version_stack<S: ByteStore + ?Sized>(store: &mut S, endian: Endian) -> Result<u64> {
    let state = locate(store, endian)?;
    let start = state.payload_start()?;
    let len = store.byte_len()?;
    if start > len {
        return Err(Corruption::PointerPastEnd {
            start: state.start,
            end: len,
        }
        .into());
    }

    store.seek(SeekFrom::Start(state.pointer_offset))?;
    endian.write_u32(store, 0)?;
    store.flush()?;
    store.set_byte_len(start)?;

    let removed = len - start;
    info!(pointer_offset = state.pointer_offset, start, removed, "removed version stack");
    Ok(removed)
}

/// Copy `[start, EOF)` verbatim into `sink`. The source is not modified.
/// Returns the number of bytes copied.
pub fn store_version_stack<R, W>(source: &mut R, sink: &mut W, endian: Endian) -> Result<u64>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    let state = locate(source, endian)?;
    let start = state.payload_start()?;
    let end = stream_len(source)?;
    if start >= end {
        return Err(Corruption::EmptyPayload {
            start: state.start,
            end,
        }
        .into());
    }

    let want = end - start;
    source.seek(SeekFrom::Start(start))?;
    let mut payload = Read::take(&mut *source, want);
    let copied = io::copy(&mut payload, sink)?;
    if copied != want {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("version stack truncated: copied {copied} of {want} bytes"),
        )
        .into());
    }
    sink.flush()?;

    info!(pointer_offset = state.pointer_offset, start, bytes = copied, "stored version stack");
    Ok(copied)
}

/// Append `blob` as the version stack.
///
/// With no stack recorded, the pointer is set to the current end of file and
/// the blob lands there. With a valid pointer, the blob overwrites from the
/// recorded start. Either way the file ends right after the blob. Returns the
/// new file length.
pub fn restore_version_stack<S, B>(store: &mut S, blob: &mut B, endian: Endian) -> Result<u64>
where
    S: ByteStore + ?Sized,
    B: Read + ?Sized,
{
    let state = locate(store, endian)?;
    let cursor = if state.is_present() {
        state.checked_start()?
    } else {
        let len = store.byte_len()?;
        let start = u32::try_from(len).map_err(|_| Corruption::FileTooLarge { len })?;
        store.seek(SeekFrom::Start(state.pointer_offset))?;
        endian.write_u32(store, start)?;
        len
    };

    store.seek(SeekFrom::Start(cursor))?;
    let appended = io::copy(blob, store)?;
    store.flush()?;
    let new_len = cursor + appended;
    store.set_byte_len(new_len)?;

    info!(
        pointer_offset = state.pointer_offset,
        start = cursor,
        bytes = appended,
        "restored version stack"
    );
    Ok(new_len)
}
