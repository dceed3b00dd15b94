//! Human-readable dump of the directory walk: every word read, with its
//! address, and every tag entry followed by a hex/ASCII view of its data.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::arw::{walk_directories, DirectoryWalk, TagDirectory, TagEntry};
use crate::config::{Config, MAX_DUMP_WIDTH};
use crate::error::Result;

/// Walk the container and print it to `out`. The walk is returned so callers
/// can report on it further. The source position is left unchanged.
pub fn trace<R, W>(source: &mut R, out: &mut W, config: &Config) -> Result<DirectoryWalk>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    let walk = walk_directories(source, config.endian)?;
    render_walk(source, out, &walk, config)?;
    Ok(walk)
}

/// Print an already decoded walk, reading tag data from `source` for the dumps.
pub fn render_walk<R, W>(
    source: &mut R,
    out: &mut W,
    walk: &DirectoryWalk,
    config: &Config,
) -> Result<()>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "{:08x}: {:08x}", 0, walk.header.magic)?;
    writeln!(out, "{:08x}: {:08x}", 4, walk.header.reserved)?;
    render_directory(source, out, &walk.ifd0, config)?;
    writeln!(out, "{:08x}: {:08x}", walk.ifd1_link_offset, walk.ifd1_offset)?;
    render_directory(source, out, &walk.ifd1, config)?;
    render_directory(source, out, &walk.private, config)?;

    let bytes = read_at(source, walk.pointer_offset, 4)?;
    match <[u8; 4]>::try_from(bytes.as_slice()) {
        Ok(raw) => {
            let start = config.endian.read_u32(&mut &raw[..])?;
            writeln!(
                out,
                "version stack pointer at {:08x}: {:08x}",
                walk.pointer_offset, start
            )?;
        }
        Err(_) => writeln!(
            out,
            "version stack pointer at {:08x}: <past end of file>",
            walk.pointer_offset
        )?,
    }
    Ok(())
}

fn render_directory<R, W>(
    source: &mut R,
    out: &mut W,
    dir: &TagDirectory,
    config: &Config,
) -> Result<()>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "{:08x}: {:04x}", dir.offset, dir.count)?;
    for entry in dir.records() {
        render_entry(source, out, entry, config)?;
    }
    Ok(())
}

fn render_entry<R, W>(source: &mut R, out: &mut W, entry: &TagEntry, config: &Config) -> Result<()>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    write!(
        out,
        "{:08x}: {:04x} {:04x} {:08x} {:08x} |",
        entry.offset, entry.name, entry.field_type, entry.size, entry.value
    )?;
    let (offset, size) = entry.data_extent().unwrap_or((0, 0));
    let shown = size.min(config.dump_width as u64);
    let bytes = if shown > 0 {
        read_at(source, offset, shown)?
    } else {
        Vec::new()
    };
    write_dump(out, &bytes, size, config.dump_width)?;
    writeln!(out)?;
    Ok(())
}

/// Hex column padded to `width`, a separator, then the printable bytes.
/// `size` is the full data length; anything beyond `width` is elided.
/// `width` is capped at [`MAX_DUMP_WIDTH`].
pub fn write_dump<W: Write + ?Sized>(
    out: &mut W,
    bytes: &[u8],
    size: u64,
    width: usize,
) -> std::io::Result<()> {
    let width = width.min(MAX_DUMP_WIDTH);
    for i in 0..width {
        match bytes.get(i) {
            Some(b) => write!(out, "{b:02x} ")?,
            None => write!(out, "   ")?,
        }
    }
    let elided = size > width as u64;
    out.write_all(if elided { b"... | " } else { b"    | " })?;
    for &b in bytes.iter().take(width) {
        let c = if (0x20..=0x7f).contains(&b) { b as char } else { ' ' };
        write!(out, "{c}")?;
    }
    if elided {
        out.write_all(b"...")?;
    }
    Ok(())
}

/// Up to `len` bytes at `offset`; fewer near end of file. Position is restored.
fn read_at<R: Read + Seek + ?Sized>(source: &mut R, offset: u64, len: u64) -> Result<Vec<u8>> {
    let pos = source.stream_position()?;
    source.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    let read = Read::take(&mut *source, len).read_to_end(&mut buf);
    source.seek(SeekFrom::Start(pos))?;
    read?;
    Ok(buf)
}
