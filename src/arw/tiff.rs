//! Minimal TIFF-style tag directory reader for ARW containers.
//! Reads go through the stream position; nothing here allocates beyond the
//! decoded directory itself.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Little-endian byte order marker.
pub const TIFF_LITTLE: [u8; 2] = *b"II";
/// Big-endian byte order marker.
pub const TIFF_BIG: [u8; 2] = *b"MM";

/// RATIONAL: two LONGs stored out of line, always 8 bytes of data.
pub const TYPE_RATIONAL: u16 = 5;

/// Size of the fixed header (two 32-bit words) preceding IFD0.
pub const HEADER_LEN: u64 = 8;
/// Size of a directory's entry count prefix.
pub const DIRECTORY_COUNT_LEN: u64 = 2;
/// Size of one directory entry in bytes.
pub const ENTRY_LEN: u64 = 12;
/// Distance from the start of an entry to its value field (name + type + size).
pub const VALUE_FIELD_OFFSET: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Byte order from a TIFF byte-order mark (`II` or `MM`).
    pub fn detect(marker: [u8; 2]) -> Option<Self> {
        match marker {
            TIFF_LITTLE => Some(Endian::Little),
            TIFF_BIG => Some(Endian::Big),
            _ => None,
        }
    }

    #[inline]
    pub fn read_u16<R: Read + ?Sized>(self, r: &mut R) -> io::Result<u16> {
        match self {
            Endian::Little => r.read_u16::<LittleEndian>(),
            Endian::Big => r.read_u16::<BigEndian>(),
        }
    }

    #[inline]
    pub fn read_u32<R: Read + ?Sized>(self, r: &mut R) -> io::Result<u32> {
        match self {
            Endian::Little => r.read_u32::<LittleEndian>(),
            Endian::Big => r.read_u32::<BigEndian>(),
        }
    }

    #[inline]
    pub fn write_u32<W: Write + ?Sized>(self, w: &mut W, v: u32) -> io::Result<()> {
        match self {
            Endian::Little => w.write_u32::<LittleEndian>(v),
            Endian::Big => w.write_u32::<BigEndian>(v),
        }
    }
}

/// Peek at the byte-order mark at the start of the stream. Position is restored.
pub fn sniff_endian<R: Read + Seek + ?Sized>(r: &mut R) -> io::Result<Option<Endian>> {
    let pos = r.stream_position()?;
    r.seek(SeekFrom::Start(0))?;
    let mut marker = [0u8; 2];
    let read = r.read_exact(&mut marker);
    r.seek(SeekFrom::Start(pos))?;
    match read {
        Ok(()) => Ok(Endian::detect(marker)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// One 12-byte directory entry plus the absolute position it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TagEntry {
    pub name: u16,
    pub field_type: u16,
    pub size: u32,
    /// Inline data or an absolute offset, depending on the tag.
    pub value: u32,
    pub offset: u64,
}

impl TagEntry {
    /// Absolute position of this entry's `value` field.
    #[inline]
    pub fn value_field_offset(&self) -> u64 {
        self.offset + VALUE_FIELD_OFFSET
    }

    /// Byte range worth showing for this entry's data, as `(offset, len)`.
    ///
    /// RATIONAL values always occupy 8 bytes out of line; other values live
    /// out of line only when they do not fit the 4-byte value field.
    pub fn data_extent(&self) -> Option<(u64, u64)> {
        if self.field_type == TYPE_RATIONAL {
            Some((u64::from(self.value), 8))
        } else if self.size > 4 {
            Some((u64::from(self.value), u64::from(self.size)))
        } else {
            None
        }
    }
}

/// A decoded tag directory.
///
/// `records` holds every entry in on-disk order, duplicates included. Lookup
/// by name sees the last occurrence.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TagDirectory {
    /// Absolute position of the count prefix.
    pub offset: u64,
    pub count: u16,
    records: Vec<TagEntry>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_name: IndexMap<u16, usize>,
}

impl TagDirectory {
    pub fn get(&self, name: u16) -> Option<&TagEntry> {
        self.by_name.get(&name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: u16) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Every entry as stored on disk.
    pub fn records(&self) -> &[TagEntry] {
        &self.records
    }

    /// Number of distinct tag names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Position immediately after the last entry.
    pub fn end(&self) -> u64 {
        self.offset + DIRECTORY_COUNT_LEN + u64::from(self.count) * ENTRY_LEN
    }
}

/// Decode the directory at the current position: a u16 count followed by
/// `count` entries of `name:u16, type:u16, size:u32, value:u32`.
///
/// Consumes exactly `2 + 12 * count` bytes and leaves the stream right after
/// the last entry. Unknown types and empty directories are data, not errors.
pub fn decode_directory<R: Read + Seek + ?Sized>(
    r: &mut R,
    endian: Endian,
) -> io::Result<TagDirectory> {
    let offset = r.stream_position()?;
    let count = endian.read_u16(r)?;
    let mut records = Vec::with_capacity(usize::from(count));
    let mut by_name = IndexMap::with_capacity(usize::from(count));
    let mut entry_offset = offset + DIRECTORY_COUNT_LEN;
    for i in 0..usize::from(count) {
        let entry = TagEntry {
            name: endian.read_u16(r)?,
            field_type: endian.read_u16(r)?,
            size: endian.read_u32(r)?,
            value: endian.read_u32(r)?,
            offset: entry_offset,
        };
        entry_offset += ENTRY_LEN;
        by_name.insert(entry.name, i);
        records.push(entry);
    }
    Ok(TagDirectory {
        offset,
        count,
        records,
        by_name,
    })
}
