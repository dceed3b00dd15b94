//! # arwtool
//!
//! Library to inspect and edit the *version stack* embedded in Sony ARW raw
//! files: a trailing block of edit-history metadata whose start is recorded in
//! a 32-bit pointer buried three tag directories deep.
//!
//! ## Container walk
//!
//! - Header: two u32 words (kept, not interpreted), then IFD0.
//! - The u32 following IFD0 is the absolute offset of IFD1.
//! - IFD0 tag `0xC634` (DNGPrivateData) holds the offset of the private directory.
//! - Private directory tag `0x7241`: its value field *is* the version stack pointer.
//!
//! A pointer of `0` means no version stack; otherwise the stack runs from the
//! pointer's value to end of file.
//!
//! ## Operations
//!
//! - [`remove_version_stack`]: clear the pointer and truncate the file at the old start.
//! - [`store_version_stack`]: copy the stack bytes out, leaving the file untouched.
//! - [`restore_version_stack`]: re-attach a stored stack, at the recorded start or at end of file.
//! - [`trace()`](trace::trace): print the directory walk with hex dumps.
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::{File, OpenOptions};
//! use arwtool::{remove_version_stack, restore_version_stack, store_version_stack, Endian};
//!
//! let mut raw = OpenOptions::new().read(true).write(true).open("photo.arw")?;
//! let mut saved = File::create("photo.vstack")?;
//! store_version_stack(&mut raw, &mut saved, Endian::Little)?;
//! remove_version_stack(&mut raw, Endian::Little)?;
//!
//! let mut saved = File::open("photo.vstack")?;
//! restore_version_stack(&mut raw, &mut saved, Endian::Little)?;
//! # Ok::<(), arwtool::Error>(())
//! ```
//!
//! Every call decodes the directories afresh, so operations can be chained on
//! the same file.

mod config;
mod error;
pub mod arw;
pub mod trace;

pub use arw::{
    decode_directory, locate, remove_version_stack, resolve_version_stack_offset,
    restore_version_stack, sniff_endian, store_version_stack, walk_directories, ByteStore,
    DirectoryId, DirectoryWalk, Endian, TagDirectory, TagEntry, VersionStackState,
};
pub use config::{Config, DEFAULT_DUMP_WIDTH, MAX_DUMP_WIDTH};
pub use error::{Corruption, Error, Result};
