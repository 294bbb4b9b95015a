//! Codec for the display accessory's firmware container: outer blob
//! header, CRC-tree-authenticated firmware payload, section index, and the
//! typed resource-section sub-format nested inside `IMG_` sections.

pub mod blob;
pub mod cli;
pub mod conf;
pub mod crc;
pub mod error;
pub mod firmware;
pub mod resource;
pub mod section;
pub mod stream;

pub use blob::Blob;
pub use error::Error;
pub use firmware::{Firmware, FirmwareKind};
pub use resource::Resource;
pub use section::{GenericSection, ResourceSection, Section, SectionHeader};
