//! Firmware codec: the inner little-endian payload of a [`crate::blob::Blob`].
//! Owns the section list and the two-level CRC tree that authenticates it
//! (§4.4).

use crate::crc::crc32;
use crate::error::Error;
use crate::section::{GenericSection, Section, SectionHeader, SECTION_HEADER_SIZE};
use crate::stream::{Endian, SliceStream, VecStream};

/// Size of the firmware header block.
pub const HEADER_SIZE: usize = 0x1000;
/// Size of the sub-CRC page immediately following the header.
pub const SUBCRC_PAGE_SIZE: usize = 0x4000;
/// Byte range of the header actually covered by `headerCRC`.
const HEADER_CRC_COVERED: usize = 0xFFC;
/// Chunk size both the sub-CRC page and the section region are divided by.
const CHUNK_SIZE: usize = 0x1000;
/// Number of `u32` slots in the sub-CRC page.
const SUBCRC_SLOT_COUNT: usize = SUBCRC_PAGE_SIZE / 4;
/// Number of super-CRCs, each covering one 4 KiB window of the sub-CRC page.
const SUPERCRC_COUNT: usize = 4;

const INDX_NAME: [u8; 4] = *b"INDX";

/// The firmware's top-level `kind` tag. Values outside the two known
/// constants decode without error; they are not semantically interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareKind {
    Drc,
    Drh,
    Other(u32),
}

impl FirmwareKind {
    pub const DRC_VALUE: u32 = 0x0101_0000;
    pub const DRH_VALUE: u32 = 0x0001_0000;

    pub fn from_u32(value: u32) -> FirmwareKind {
        match value {
            Self::DRC_VALUE => FirmwareKind::Drc,
            Self::DRH_VALUE => FirmwareKind::Drh,
            other => FirmwareKind::Other(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            FirmwareKind::Drc => Self::DRC_VALUE,
            FirmwareKind::Drh => Self::DRH_VALUE,
            FirmwareKind::Other(v) => v,
        }
    }
}

/// The decoded graph: a `kind` tag and an ordered section list whose first
/// entry is always the index (`INDX`).
#[derive(Debug, Clone, PartialEq)]
pub struct Firmware {
    pub kind: FirmwareKind,
    pub sections: Vec<Section>,
}

impl Firmware {
    pub fn new(kind: FirmwareKind, sections: Vec<Section>) -> Firmware {
        Firmware { kind, sections }
    }

    /// First section with a matching 4-byte name. Names are compared
    /// byte-for-byte; there is no length-mismatch special case because the
    /// name is always exactly 4 bytes on both sides.
    pub fn get_section(&self, name: &[u8; 4]) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == *name)
    }

    pub fn get_section_mut(&mut self, name: &[u8; 4]) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name() == *name)
    }

    fn verify_crc_tree(data: &[u8]) -> Result<(), Error> {
        if data.len() < HEADER_SIZE + SUBCRC_PAGE_SIZE {
            return Err(Error::DecodeFailed("firmware shorter than header+subcrc page".into()));
        }
        let header = &data[..HEADER_SIZE];
        let stored_header_crc = u32::from_le_bytes(
            header[HEADER_CRC_COVERED..HEADER_CRC_COVERED + 4]
                .try_into()
                .unwrap(),
        );
        if crc32(&header[..HEADER_CRC_COVERED]) != stored_header_crc {
            return Err(Error::HeaderCrcMismatch);
        }

        let subcrc_page = &data[HEADER_SIZE..HEADER_SIZE + SUBCRC_PAGE_SIZE];
        for i in 0..SUPERCRC_COUNT {
            let window = &subcrc_page[i * CHUNK_SIZE..(i + 1) * CHUNK_SIZE];
            let stored_super_crc =
                u32::from_le_bytes(header[4 + i * 4..4 + i * 4 + 4].try_into().unwrap());
            if crc32(window) != stored_super_crc {
                return Err(Error::SuperCrcMismatch { index: i });
            }
        }

        let section_region = &data[HEADER_SIZE + SUBCRC_PAGE_SIZE..];
        let num_chunks = section_region.len().div_ceil(CHUNK_SIZE);
        for i in 0..num_chunks {
            let start = i * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(section_region.len());
            let chunk = &section_region[start..end];
            let stored_sub_crc =
                u32::from_le_bytes(subcrc_page[i * 4..i * 4 + 4].try_into().unwrap());
            if crc32(chunk) != stored_sub_crc {
                return Err(Error::SubCrcMismatch { index: i });
            }
        }

        Ok(())
    }

    pub fn decode(data: &[u8]) -> Result<Firmware, Error> {
        Self::verify_crc_tree(data)?;

        let kind = FirmwareKind::from_u32(u32::from_le_bytes(data[0..4].try_into().unwrap()));
        let section_region = &data[HEADER_SIZE + SUBCRC_PAGE_SIZE..];

        if section_region.len() < SECTION_HEADER_SIZE {
            return Err(Error::BadIndex("section region too short for INDX header".into()));
        }
        let mut cursor = SliceStream::new(section_region, Endian::Little);
        let indx_header = SectionHeader::decode(&mut cursor);
        if indx_header.name != INDX_NAME || indx_header.offset != 0 {
            return Err(Error::BadIndex("first section is not INDX at offset 0".into()));
        }
        if indx_header.size == 0 || indx_header.size as usize % SECTION_HEADER_SIZE != 0 {
            return Err(Error::BadIndex("INDX size is not a multiple of the header size".into()));
        }
        let n = indx_header.size as usize / SECTION_HEADER_SIZE;

        let mut cursor = SliceStream::new(section_region, Endian::Little);
        let mut headers = Vec::with_capacity(n);
        for _ in 0..n {
            headers.push(SectionHeader::decode(&mut cursor));
        }
        if let Some(err) = Error::from_stream(&cursor, "section header table") {
            return Err(err);
        }

        let mut sections = Vec::with_capacity(n);
        for header in &headers {
            let start = header.offset as usize;
            let end = start
                .checked_add(header.size as usize)
                .ok_or_else(|| Error::DecodeFailed("section payload offset overflow".into()))?;
            let payload = section_region
                .get(start..end)
                .ok_or_else(|| Error::DecodeFailed("section payload out of range".into()))?;
            sections.push(Section::decode(header.name, header.version, payload)?);
        }

        Ok(Firmware { kind, sections })
    }

    /// Rebuilds the section region from the current section list: packs
    /// every non-index section's bytes back to back, then derives a fresh
    /// `N`-entry header table (INDX's name/version are kept, its stored
    /// payload bytes are not — see §4.4).
    fn pack_sections(&self) -> Vec<u8> {
        let n = self.sections.len();
        let table_size = n * SECTION_HEADER_SIZE;

        let (indx_name, indx_version) = match self.sections.first() {
            Some(s) => (s.name(), s.version()),
            None => (INDX_NAME, 0),
        };

        let mut headers = Vec::with_capacity(n);
        headers.push(SectionHeader {
            offset: 0,
            size: table_size as u32,
            name: indx_name,
            version: indx_version,
        });

        let mut pool = Vec::new();
        for section in self.sections.iter().skip(1) {
            let payload = section.payload_bytes();
            let offset = table_size + pool.len();
            headers.push(SectionHeader {
                offset: offset as u32,
                size: payload.len() as u32,
                name: section.name(),
                version: section.version(),
            });
            pool.extend_from_slice(&payload);
        }

        let mut region = VecStream::new(Endian::Little);
        for header in &headers {
            header.encode(&mut region);
        }
        let mut region = region.into_inner();
        region.extend_from_slice(&pool);
        region
    }

    pub fn encode(&self) -> Vec<u8> {
        let section_region = self.pack_sections();

        let mut subcrc_page = vec![0u8; SUBCRC_PAGE_SIZE];
        let num_chunks = section_region.len().div_ceil(CHUNK_SIZE).min(SUBCRC_SLOT_COUNT);
        for i in 0..num_chunks {
            let start = i * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(section_region.len());
            let crc = crc32(&section_region[start..end]);
            subcrc_page[i * 4..i * 4 + 4].copy_from_slice(&crc.to_le_bytes());
        }

        let mut header = vec![0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&self.kind.to_u32().to_le_bytes());
        for i in 0..SUPERCRC_COUNT {
            let window = &subcrc_page[i * CHUNK_SIZE..(i + 1) * CHUNK_SIZE];
            let crc = crc32(window);
            header[4 + i * 4..4 + i * 4 + 4].copy_from_slice(&crc.to_le_bytes());
        }
        let header_crc = crc32(&header[..HEADER_CRC_COVERED]);
        header[HEADER_CRC_COVERED..HEADER_CRC_COVERED + 4].copy_from_slice(&header_crc.to_le_bytes());

        let mut out = Vec::with_capacity(HEADER_SIZE + SUBCRC_PAGE_SIZE + section_region.len());
        out.extend_from_slice(&header);
        out.extend_from_slice(&subcrc_page);
        out.extend_from_slice(&section_region);
        out
    }
}

impl GenericSection {
    /// Convenience constructor for a fresh `INDX` placeholder; its payload
    /// is never consulted by [`Firmware::encode`].
    pub fn new_indx(version: u32) -> GenericSection {
        GenericSection::new(INDX_NAME, version, Vec::new())
    }
}
