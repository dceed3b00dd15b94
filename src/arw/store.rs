//! Random-access byte store the directory walk and the editor operate on.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Length of a seekable stream. The position is left where it was.
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> io::Result<u64> {
    let pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if pos != len {
        stream.seek(SeekFrom::Start(pos))?;
    }
    Ok(len)
}

/// A stateful, seekable, resizable byte container.
///
/// Reads and writes happen at the current position and advance it. Resizing
/// never moves the position.
pub trait ByteStore: Read + Write + Seek {
    /// Current length in bytes.
    fn byte_len(&mut self) -> io::Result<u64> {
        stream_len(self)
    }

    /// Truncate to, or zero-extend up to, exactly `len` bytes.
    fn set_byte_len(&mut self, len: u64) -> io::Result<()>;
}

impl ByteStore for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl ByteStore for Cursor<Vec<u8>> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "length exceeds address space")
        })?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    fn byte_len(&mut self) -> io::Result<u64> {
        (**self).byte_len()
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        (**self).set_byte_len(len)
    }
}
