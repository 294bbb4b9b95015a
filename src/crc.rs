//! CRC-32 over arbitrary byte ranges.
//!
//! The container's integrity tree (§4.4) is built entirely from one
//! parameterization: reflected CRC-32 with polynomial `0xEDB88320`, initial
//! value `0xFFFFFFFF` and final XOR `0xFFFFFFFF`. That is the standard
//! CRC-32/ISO-HDLC variant (the one zlib, gzip and PNG use), so we lean on
//! the `crc` crate's named parameter table instead of hand-rolling one.

// Absolute path: our own module is also named `crc`, which would otherwise
// shadow the extern crate of the same name.
use ::crc::{Crc, CRC_32_ISO_HDLC};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Computes the CRC-32 of `bytes` using the container's fixed parameters.
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(crc32(b""), 0x0000_0000);
    }

    #[test]
    fn check_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn stable_and_consistent_with_incremental_digest() {
        let buf = [0xFFu8; 0x1000];

        let oneshot = crc32(&buf);
        assert_eq!(oneshot, crc32(&buf), "same input must hash identically");

        let mut digest = CRC32.digest();
        digest.update(&buf);
        assert_eq!(digest.finalize(), oneshot);
    }
}
