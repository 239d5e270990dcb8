/* Tag file header and checksum. */

use crate::endian::Be;
use crate::error::{TagError, TagResult};
use crate::layout::{Layout, LayoutReader, LayoutWriter, Padding};
use crate::tag::{TagClass, TagString};

const CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB88320 } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// CRC-32 (IEEE 802.3).
pub fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(!0u32, |crc, b| {
        CRC_TABLE[((crc ^ u32::from(*b)) & 0xFF) as usize] ^ (crc >> 8)
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagFileHeader {
    pub tag_id_unused: Be<u32>,
    pub tag_name_unused: TagString,
    pub class: Be<u32>,
    pub crc32: Be<u32>,
    pub header_size: Be<u32>,
    pub padding: Padding<8>,
    pub version: Be<u16>,
    pub something_255: Be<u16>,
    pub blam: Be<u32>,
}

impl TagFileHeader {
    pub const BLAM: u32 = 0x626C616D;

    pub fn new(class: TagClass) -> Self {
        Self {
            tag_id_unused: Be::new(0),
            tag_name_unused: TagString::default(),
            class: Be::new(class.0),
            crc32: Be::new(0),
            header_size: Be::new(Self::SIZE as u32),
            padding: Padding::default(),
            version: Be::new(class.version().unwrap_or(1)),
            something_255: Be::new(255),
            blam: Be::new(Self::BLAM),
        }
    }

    /// Prepend a header for `class` to `data`, checksumming `data`.
    pub fn wrap(class: TagClass, data: &[u8]) -> Vec<u8> {
        let mut header = Self::new(class);
        header.crc32 = Be::new(crc32(data));
        let mut out = header.to_bytes();
        out.extend_from_slice(data);
        out
    }

    /// Check a whole tag file and return the data following the header.
    pub fn validate(file: &[u8], expected: Option<TagClass>) -> TagResult<&[u8]> {
        if file.len() < Self::SIZE {
            return Err(TagError::out_of_bounds(format!(
                "tag file is {} bytes, smaller than its header",
                file.len()
            )));
        }
        let header = Self::decode(file);
        if header.blam.get() != Self::BLAM {
            return Err(TagError::invalid("tag file header is missing blam"));
        }
        if header.header_size.get() as usize != Self::SIZE {
            return Err(TagError::invalid(format!(
                "tag file header size is {:#x}, expected {:#x}",
                header.header_size.get(),
                Self::SIZE
            )));
        }
        let class = TagClass(header.class.get());
        if let Some(expected) = expected {
            if class != expected {
                return Err(TagError::invalid(format!(
                    "tag file is a {class} tag, expected {expected}"
                )));
            }
        }
        let body = &file[Self::SIZE..];
        let actual = crc32(body);
        if header.crc32.get() != actual {
            return Err(TagError::invalid(format!(
                "tag file checksum mismatch ({:#010x} != {:#010x})",
                header.crc32.get(),
                actual
            )));
        }
        Ok(body)
    }
}

impl Layout for TagFileHeader {
    const SIZE: usize = 0x40;

    fn decode(bytes: &[u8]) -> Self {
        let mut r = LayoutReader::new(bytes);
        Self {
            tag_id_unused: r.next(),
            tag_name_unused: r.next(),
            class: r.next(),
            crc32: r.next(),
            header_size: r.next(),
            padding: r.next(),
            version: r.next(),
            something_255: r.next(),
            blam: r.next(),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        let mut w = LayoutWriter::new(out);
        w.put(&self.tag_id_unused);
        w.put(&self.tag_name_unused);
        w.put(&self.class);
        w.put(&self.crc32);
        w.put(&self.header_size);
        w.put(&self.padding);
        w.put(&self.version);
        w.put(&self.something_255);
        w.put(&self.blam);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_reference_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn wrap_then_validate() {
        let weapon = TagClass::new(*b"weap");
        let file = TagFileHeader::wrap(weapon, b"body");
        assert_eq!(file.len(), 0x44);
        assert_eq!(&file[0x3C..0x40], b"blam");
        assert_eq!(&file[0x24..0x28], b"weap");
        assert_eq!(TagFileHeader::validate(&file, Some(weapon)).unwrap(), b"body");
    }

    #[test]
    fn validate_rejects_damage() {
        let weapon = TagClass::new(*b"weap");
        let mut file = TagFileHeader::wrap(weapon, b"body");
        assert!(TagFileHeader::validate(&file, Some(TagClass::new(*b"vehi"))).is_err());
        assert!(TagFileHeader::validate(&file[..0x20], None).is_err());
        let last = file.len() - 1;
        file[last] ^= 1;
        assert!(matches!(
            TagFileHeader::validate(&file, None),
            Err(TagError::InvalidTagData(_))
        ));
    }
}
