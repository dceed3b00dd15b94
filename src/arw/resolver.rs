//! Walks the header and the three chained directories that lead to the
//! version stack pointer.
//!
//! Layout followed:
//! - header: two u32 words, then IFD0
//! - u32 right after IFD0: absolute offset of IFD1
//! - IFD0 tag 0xC634 (DNGPrivateData): absolute offset of the private directory
//! - private directory tag 0x7241: its value field holds the version stack start

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::debug;

use crate::arw::tiff::{decode_directory, Endian, TagDirectory, TagEntry};
use crate::error::{Error, Result};

/// DNGPrivateData: in ARW files, the offset of the maker's private directory.
pub const TAG_DNG_PRIVATE_DATA: u16 = 0xC634;
/// Private directory entry whose value field is the version stack pointer.
pub const TAG_VERSION_STACK: u16 = 0x7241;

/// Which directory of the walk a tag was expected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DirectoryId {
    Ifd0,
    Private,
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectoryId::Ifd0 => "IFD0",
            DirectoryId::Private => "private directory",
        })
    }
}

/// The two fixed header words. Read and kept for tracing, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ContainerHeader {
    pub magic: u32,
    pub reserved: u32,
}

/// Everything decoded on the way to the version stack pointer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DirectoryWalk {
    pub header: ContainerHeader,
    pub ifd0: TagDirectory,
    /// Absolute position of the IFD1 link word (right after IFD0).
    pub ifd1_link_offset: u64,
    pub ifd1_offset: u32,
    pub ifd1: TagDirectory,
    pub private_offset: u32,
    pub private: TagDirectory,
    /// Absolute position of the 32-bit version stack start pointer.
    pub pointer_offset: u64,
}

impl DirectoryWalk {
    /// The private directory entry holding the pointer.
    pub fn version_stack_entry(&self) -> Option<&TagEntry> {
        self.private.get(TAG_VERSION_STACK)
    }
}

fn require(dir: &TagDirectory, tag: u16, directory: DirectoryId) -> Result<&TagEntry> {
    dir.get(tag).ok_or(Error::MissingTag { tag, directory })
}

/// Decode the full walk. The stream position is restored afterwards, whether
/// or not the walk succeeded; the contents are never written.
pub fn walk_directories<R: Read + Seek + ?Sized>(r: &mut R, endian: Endian) -> Result<DirectoryWalk> {
    let pos = r.stream_position()?;
    let walk = walk_from_start(r, endian);
    let restored = r.seek(SeekFrom::Start(pos));
    let walk = walk?;
    restored?;
    Ok(walk)
}

fn walk_from_start<R: Read + Seek + ?Sized>(r: &mut R, endian: Endian) -> Result<DirectoryWalk> {
    r.seek(SeekFrom::Start(0))?;
    let header = ContainerHeader {
        magic: endian.read_u32(r)?,
        reserved: endian.read_u32(r)?,
    };

    let ifd0 = decode_directory(r, endian)?;
    let ifd1_link_offset = r.stream_position()?;
    let ifd1_offset = endian.read_u32(r)?;

    r.seek(SeekFrom::Start(u64::from(ifd1_offset)))?;
    let ifd1 = decode_directory(r, endian)?;

    let private_offset = require(&ifd0, TAG_DNG_PRIVATE_DATA, DirectoryId::Ifd0)?.value;
    r.seek(SeekFrom::Start(u64::from(private_offset)))?;
    let private = decode_directory(r, endian)?;

    let pointer_offset =
        require(&private, TAG_VERSION_STACK, DirectoryId::Private)?.value_field_offset();

    debug!(
        ifd0_entries = ifd0.count,
        ifd1_offset,
        ifd1_entries = ifd1.count,
        private_offset,
        private_entries = private.count,
        pointer_offset,
        "resolved version stack pointer"
    );

    Ok(DirectoryWalk {
        header,
        ifd0,
        ifd1_link_offset,
        ifd1_offset,
        ifd1,
        private_offset,
        private,
        pointer_offset,
    })
}

/// Absolute offset of the 32-bit field holding the version stack start.
/// Side-effect free on the stream position.
pub fn resolve_version_stack_offset<R: Read + Seek + ?Sized>(
    r: &mut R,
    endian: Endian,
) -> Result<u64> {
    Ok(walk_directories(r, endian)?.pointer_offset)
}
