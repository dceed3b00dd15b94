//! ARW (Sony raw) container access: tag directory decoding, version stack
//! pointer resolution, and version stack editing.
//!
//! Only the directory skeleton leading to the version stack pointer is
//! decoded; image data and EXIF semantics are left alone.

mod resolver;
mod store;
mod tiff;
mod version_stack;

pub use resolver::{
    resolve_version_stack_offset, walk_directories, ContainerHeader, DirectoryId, DirectoryWalk,
    TAG_DNG_PRIVATE_DATA, TAG_VERSION_STACK,
};
pub use store::{stream_len, ByteStore};
pub use tiff::{
    decode_directory, sniff_endian, Endian, TagDirectory, TagEntry, DIRECTORY_COUNT_LEN,
    ENTRY_LEN, HEADER_LEN, TIFF_BIG, TIFF_LITTLE, TYPE_RATIONAL, VALUE_FIELD_OFFSET,
};
pub use version_stack::{
    locate, remove_version_stack, restore_version_stack, store_version_stack, VersionStackState,
    POINTER_LEN,
};
