//! Synthetic ARW containers for the integration tests.
//!
//! Compact layout (little-endian unless asked otherwise):
//!
//! ```text
//! 0x00  header: 0x002a4949, 0x00000008
//! 0x08  IFD0: count + extra tags + [0xc634 -> private]
//!       u32 link -> IFD1
//!       IFD1: count + ifd1 tags
//!       private: count + [0x7241 value = version stack start]
//!       padding up to body_len
//!       version stack payload (optional)
//! ```

#![allow(dead_code)]

use arwtool::arw::{TAG_DNG_PRIVATE_DATA, TAG_VERSION_STACK};
use arwtool::Endian;

pub struct Fixture {
    pub bytes: Vec<u8>,
    pub ifd1_offset: u32,
    pub private_offset: u32,
    pub pointer_offset: u64,
}

#[derive(Clone)]
pub struct FixtureBuilder {
    endian: Endian,
    body_len: usize,
    ifd0_extra: Vec<(u16, u16, u32, u32)>,
    ifd1: Vec<(u16, u16, u32, u32)>,
    private_extra: Vec<(u16, u16, u32, u32)>,
    with_private_tag: bool,
    with_version_tag: bool,
    pointer_override: Option<u32>,
    version_stack: Option<Vec<u8>>,
}

impl Default for FixtureBuilder {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            body_len: 0,
            ifd0_extra: Vec::new(),
            ifd1: Vec::new(),
            private_extra: Vec::new(),
            with_private_tag: true,
            with_version_tag: true,
            pointer_override: None,
            version_stack: None,
        }
    }
}

pub fn put_u16(endian: Endian, b: &mut Vec<u8>, v: u16) {
    match endian {
        Endian::Little => b.extend_from_slice(&v.to_le_bytes()),
        Endian::Big => b.extend_from_slice(&v.to_be_bytes()),
    }
}

pub fn put_u32(endian: Endian, b: &mut Vec<u8>, v: u32) {
    match endian {
        Endian::Little => b.extend_from_slice(&v.to_le_bytes()),
        Endian::Big => b.extend_from_slice(&v.to_be_bytes()),
    }
}

pub fn put_entry(endian: Endian, b: &mut Vec<u8>, (name, typ, size, value): (u16, u16, u32, u32)) {
    put_u16(endian, b, name);
    put_u16(endian, b, typ);
    put_u32(endian, b, size);
    put_u32(endian, b, value);
}

pub fn u32_at(endian: Endian, b: &[u8], offset: u64) -> u32 {
    let o = offset as usize;
    let raw = [b[o], b[o + 1], b[o + 2], b[o + 3]];
    match endian {
        Endian::Little => u32::from_le_bytes(raw),
        Endian::Big => u32::from_be_bytes(raw),
    }
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Length of everything before the version stack. Never shorter than the directories.
    pub fn body_len(mut self, len: usize) -> Self {
        self.body_len = len;
        self
    }

    pub fn ifd0_tag(mut self, name: u16, typ: u16, size: u32, value: u32) -> Self {
        self.ifd0_extra.push((name, typ, size, value));
        self
    }

    pub fn ifd1_tag(mut self, name: u16, typ: u16, size: u32, value: u32) -> Self {
        self.ifd1.push((name, typ, size, value));
        self
    }

    pub fn private_tag(mut self, name: u16, typ: u16, size: u32, value: u32) -> Self {
        self.private_extra.push((name, typ, size, value));
        self
    }

    pub fn without_private_tag(mut self) -> Self {
        self.with_private_tag = false;
        self
    }

    pub fn without_version_tag(mut self) -> Self {
        self.with_version_tag = false;
        self
    }

    /// Store this raw pointer value instead of the computed one.
    pub fn pointer(mut self, value: u32) -> Self {
        self.pointer_override = Some(value);
        self
    }

    pub fn version_stack(mut self, payload: &[u8]) -> Self {
        self.version_stack = Some(payload.to_vec());
        self
    }

    pub fn build(self) -> Fixture {
        let e = self.endian;
        let marker: &[u8; 2] = match e {
            Endian::Little => b"II",
            Endian::Big => b"MM",
        };

        let ifd0_count = self.ifd0_extra.len() + usize::from(self.with_private_tag);
        let ifd0_len = 2 + 12 * ifd0_count;
        let ifd1_offset = 8 + ifd0_len + 4;
        let ifd1_len = 2 + 12 * self.ifd1.len();
        let private_offset = ifd1_offset + ifd1_len;
        let private_count = self.private_extra.len() + usize::from(self.with_version_tag);
        let private_len = 2 + 12 * private_count;
        let dirs_end = private_offset + private_len;
        let body_len = self.body_len.max(dirs_end);

        let start = match (&self.pointer_override, &self.version_stack) {
            (Some(v), _) => *v,
            (None, Some(_)) => body_len as u32,
            (None, None) => 0,
        };

        let mut b = Vec::with_capacity(body_len);
        b.extend_from_slice(marker);
        match e {
            Endian::Little => b.extend_from_slice(&[0x2a, 0x00]),
            Endian::Big => b.extend_from_slice(&[0x00, 0x2a]),
        }
        put_u32(e, &mut b, 8);

        put_u16(e, &mut b, ifd0_count as u16);
        for &t in &self.ifd0_extra {
            put_entry(e, &mut b, t);
        }
        if self.with_private_tag {
            put_entry(e, &mut b, (TAG_DNG_PRIVATE_DATA, 1, 4, private_offset as u32));
        }
        put_u32(e, &mut b, ifd1_offset as u32);

        assert_eq!(b.len(), ifd1_offset);
        put_u16(e, &mut b, self.ifd1.len() as u16);
        for &t in &self.ifd1 {
            put_entry(e, &mut b, t);
        }

        assert_eq!(b.len(), private_offset);
        put_u16(e, &mut b, private_count as u16);
        for &t in &self.private_extra {
            put_entry(e, &mut b, t);
        }
        let pointer_offset = (b.len() + 8) as u64;
        if self.with_version_tag {
            put_entry(e, &mut b, (TAG_VERSION_STACK, 4, 1, start));
        }

        // Image-ish filler so truncation mistakes show up as byte differences.
        let mut i = b.len();
        while b.len() < body_len {
            b.push((i * 7 % 251) as u8);
            i += 1;
        }
        if let Some(payload) = &self.version_stack {
            b.extend_from_slice(payload);
        }

        Fixture {
            bytes: b,
            ifd1_offset: ifd1_offset as u32,
            private_offset: private_offset as u32,
            pointer_offset,
        }
    }
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}
