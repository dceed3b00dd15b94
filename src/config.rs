//! Explicit settings threaded into the walk and the tracer.

use crate::arw::Endian;

/// Default number of bytes shown per hex dump.
pub const DEFAULT_DUMP_WIDTH: usize = 0x20;
/// Upper bound on bytes shown per hex dump.
pub const MAX_DUMP_WIDTH: usize = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Byte order of every fixed-width field in the container.
    pub endian: Endian,
    /// Maximum bytes shown per tag data dump when tracing.
    pub dump_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            dump_width: DEFAULT_DUMP_WIDTH,
        }
    }
}

impl Config {
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Clamped to [`MAX_DUMP_WIDTH`].
    pub fn with_dump_width(mut self, dump_width: usize) -> Self {
        self.dump_width = dump_width.min(MAX_DUMP_WIDTH);
        self
    }
}
