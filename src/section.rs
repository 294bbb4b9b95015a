//! Section model: the common 16-byte on-disk header every section starts
//! with, and the two concrete section bodies — an opaque byte blob
//! (`GenericSection`) and a typed resource table (`ResourceSection`) — that
//! a [`crate::firmware::Firmware`] dispatches between by name (§3, §4.4).

use crate::error::Error;
use crate::resource::{Resource, DESCRIPTOR_SIZE};
use crate::stream::{Endian, SliceStream, Stream, StreamIo, VecStream};

/// On-disk byte size of a [`SectionHeader`].
pub const SECTION_HEADER_SIZE: usize = 16;

/// Section name that dispatches to [`ResourceSection`] instead of
/// [`GenericSection`]. Every other name, including `INDX` itself, decodes
/// as generic.
pub const RESOURCE_SECTION_NAME: [u8; 4] = *b"IMG_";

/// The 16-byte record every section has, one back-to-back entry per
/// section at the start of the section region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub offset: u32,
    pub size: u32,
    pub name: [u8; 4],
    pub version: u32,
}

impl SectionHeader {
    pub fn decode<S: Stream + ?Sized>(stream: &mut S) -> SectionHeader {
        let offset = stream.read_u32();
        let size = stream.read_u32();
        let name = stream.read_array::<4>();
        let version = stream.read_u32();
        SectionHeader {
            offset,
            size,
            name,
            version,
        }
    }

    pub fn encode<S: Stream + ?Sized>(&self, stream: &mut S) {
        stream.write_u32(self.offset);
        stream.write_u32(self.size);
        stream.write_array(&self.name);
        stream.write_u32(self.version);
    }
}

/// An opaque byte-region section. `size` on emit is always `data.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSection {
    pub name: [u8; 4],
    pub version: u32,
    pub data: Vec<u8>,
}

impl GenericSection {
    pub fn new(name: [u8; 4], version: u32, data: Vec<u8>) -> Self {
        GenericSection {
            name,
            version,
            data,
        }
    }

    /// Overwrites `data[offset..offset+bytes.len()]`. No-op if the write
    /// would run past the end of the section's payload.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        let Some(end) = offset.checked_add(bytes.len()) else {
            return;
        };
        if end > self.data.len() {
            return;
        }
        self.data[offset..end].copy_from_slice(bytes);
    }

    pub fn write_u16_at(&mut self, offset: usize, value: u16) {
        self.write_at(offset, &value.to_le_bytes());
    }

    pub fn write_u32_at(&mut self, offset: usize, value: u32) {
        self.write_at(offset, &value.to_le_bytes());
    }

    pub fn write_u64_at(&mut self, offset: usize, value: u64) {
        self.write_at(offset, &value.to_le_bytes());
    }
}

/// A named, versioned table of [`Resource`] entries: a descriptor table
/// followed by a shared payload pool (§4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSection {
    pub name: [u8; 4],
    pub version: u32,
    pub resources: Vec<Resource>,
}

impl ResourceSection {
    pub fn new(name: [u8; 4], version: u32, resources: Vec<Resource>) -> Self {
        ResourceSection {
            name,
            version,
            resources,
        }
    }

    /// First resource with a matching id, in insertion order.
    pub fn get(&self, id: u16) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id)
    }

    pub fn get_bitmap(&self, id: u16) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id && r.is_bitmap())
    }

    pub fn get_sound(&self, id: u16) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id && r.is_sound())
    }

    fn decode_resources(payload: &[u8]) -> Result<Vec<Resource>, Error> {
        let mut s = SliceStream::new(payload, Endian::Little);
        let count = s.read_u32() as usize;
        let pool_start = 4 + count * DESCRIPTOR_SIZE;

        struct RawDescriptor {
            kind: u16,
            id: u16,
            offset: u32,
            size: u32,
            trailer: [u8; 12],
        }

        let mut raw = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = s.read_u16();
            let id = s.read_u16();
            let offset = s.read_u32();
            let size = s.read_u32();
            let trailer = s.read_array::<12>();
            raw.push(RawDescriptor {
                kind,
                id,
                offset,
                size,
                trailer,
            });
        }
        if let Some(err) = Error::from_stream(&s, "resource descriptor table") {
            return Err(err);
        }

        let mut resources = Vec::with_capacity(count);
        for d in raw {
            // The reference decoder seeks into the pool and immediately
            // reads without checking the seek's return value; a zero-size
            // resource sitting exactly at the pool's end therefore still
            // round-trips even though the seek nominally "fails" (§4.1).
            s.set_position(pool_start as u64 + d.offset as u64);
            let payload = s.read_vec(d.size as usize);
            resources.push(Resource::from_raw(d.kind, d.id, d.trailer, payload));
        }
        if let Some(err) = Error::from_stream(&s, "resource payload pool") {
            return Err(err);
        }

        Ok(resources)
    }

    pub fn decode(name: [u8; 4], version: u32, payload: &[u8]) -> Result<ResourceSection, Error> {
        let resources = Self::decode_resources(payload)?;
        Ok(ResourceSection {
            name,
            version,
            resources,
        })
    }

    /// Serializes the descriptor table and payload pool: `count` (4 B),
    /// `count` 24-byte descriptors, then each resource's payload
    /// back-to-back in insertion order.
    pub fn encode(&self) -> Vec<u8> {
        let mut pool = Vec::new();
        let mut descriptors = Vec::with_capacity(self.resources.len());
        for r in &self.resources {
            let offset = pool.len() as u32;
            pool.extend_from_slice(r.data());
            descriptors.push((r.kind_code(), r.id(), offset, r.data().len() as u32, r.encode_trailer()));
        }

        let mut out = VecStream::new(Endian::Little);
        out.write_u32(self.resources.len() as u32);
        for (kind, id, offset, size, trailer) in descriptors {
            out.write_u16(kind);
            out.write_u16(id);
            out.write_u32(offset);
            out.write_u32(size);
            out.write_array(&trailer);
        }
        out.write(&pool);
        out.into_inner()
    }
}

/// A section is either a typed resource table or an opaque byte blob,
/// chosen purely by name on decode: `IMG_` is a resource section,
/// everything else — including `INDX` — is generic.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Resource(ResourceSection),
    Generic(GenericSection),
}

impl Section {
    pub fn name(&self) -> [u8; 4] {
        match self {
            Section::Resource(s) => s.name,
            Section::Generic(s) => s.name,
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Section::Resource(s) => s.version,
            Section::Generic(s) => s.version,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericSection> {
        match self {
            Section::Generic(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_generic_mut(&mut self) -> Option<&mut GenericSection> {
        match self {
            Section::Generic(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceSection> {
        match self {
            Section::Resource(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_resource_mut(&mut self) -> Option<&mut ResourceSection> {
        match self {
            Section::Resource(s) => Some(s),
            _ => None,
        }
    }

    pub fn decode(name: [u8; 4], version: u32, payload: &[u8]) -> Result<Section, Error> {
        if name == RESOURCE_SECTION_NAME {
            Ok(Section::Resource(ResourceSection::decode(
                name, version, payload,
            )?))
        } else {
            Ok(Section::Generic(GenericSection::new(
                name,
                version,
                payload.to_vec(),
            )))
        }
    }

    pub fn payload_bytes(&self) -> Vec<u8> {
        match self {
            Section::Resource(s) => s.encode(),
            Section::Generic(s) => s.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_header_round_trips() {
        let header = SectionHeader {
            offset: 0x20,
            size: 100,
            name: *b"GEN_",
            version: 2,
        };
        let mut s = VecStream::new(Endian::Little);
        header.encode(&mut s);
        let bytes = s.into_inner();
        assert_eq!(bytes.len(), SECTION_HEADER_SIZE);

        let mut r = SliceStream::new(&bytes, Endian::Little);
        assert_eq!(SectionHeader::decode(&mut r), header);
    }

    #[test]
    fn indx_name_decodes_as_generic_not_resource() {
        let section = Section::decode(*b"INDX", 1, &[]).unwrap();
        assert!(matches!(section, Section::Generic(_)));
    }

    #[test]
    fn img_name_dispatches_to_resource_section() {
        let payload = ResourceSection::new(*b"IMG_", 1, vec![]).encode();
        let section = Section::decode(*b"IMG_", 1, &payload).unwrap();
        assert!(matches!(section, Section::Resource(_)));
    }

    #[test]
    fn generic_write_at_is_noop_past_end() {
        let mut g = GenericSection::new(*b"GEN_", 1, vec![0u8; 4]);
        g.write_at(3, &[1, 2]);
        assert_eq!(g.data, vec![0, 0, 0, 0]);
    }

    #[test]
    fn generic_write_u32_at_is_little_endian() {
        let mut g = GenericSection::new(*b"GEN_", 1, vec![0u8; 4]);
        g.write_u32_at(0, 0x0102_0304);
        assert_eq!(g.data, vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn resource_section_round_trip_matches_spec_scenario() {
        let mut bitmap_data = vec![0u8; 1024];
        bitmap_data.extend_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let resources = vec![
            Resource::Bitmap {
                id: 0x2001,
                format: 0x10,
                width: 4,
                height: 2,
                data: bitmap_data,
            },
            Resource::Sound {
                id: 0x0001,
                format: 1,
                bits: 16,
                channels: 2,
                frequency: 48000,
                data: b"ABCD".to_vec(),
            },
            Resource::Opaque {
                kind: 0x2,
                id: 0x3000,
                parameters: [0xEE; 12],
                data: vec![],
            },
        ];
        let section = ResourceSection::new(*b"IMG_", 1, resources);
        let bytes = section.encode();
        assert_eq!(bytes.len(), 4 + 3 * DESCRIPTOR_SIZE + (1024 + 8) + 4);

        let decoded = ResourceSection::decode(*b"IMG_", 1, &bytes).unwrap();
        assert_eq!(decoded.resources, section.resources);
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn truncated_resource_payload_pool_reports_read_short() {
        let resources = vec![Resource::Opaque {
            kind: 2,
            id: 5,
            parameters: [0; 12],
            data: vec![1, 2, 3, 4],
        }];
        let mut bytes = ResourceSection::new(*b"IMG_", 1, resources).encode();
        let truncated = bytes.len() - 2;
        bytes.truncate(truncated);

        assert!(matches!(
            ResourceSection::decode(*b"IMG_", 1, &bytes),
            Err(Error::ReadShort { .. })
        ));
    }

    #[test]
    fn resource_lookup_returns_first_match_in_insertion_order() {
        let resources = vec![
            Resource::Opaque {
                kind: 2,
                id: 5,
                parameters: [0; 12],
                data: vec![1],
            },
            Resource::Opaque {
                kind: 2,
                id: 5,
                parameters: [0; 12],
                data: vec![2],
            },
        ];
        let section = ResourceSection::new(*b"IMG_", 1, resources);
        assert_eq!(section.get(5).unwrap().data(), &[1]);
        assert!(section.get(9).is_none());
    }
}
