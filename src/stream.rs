//! Byte-stream cursor abstraction with explicit endianness and a sticky
//! error, mirroring the three concrete stream kinds the original firmware
//! tooling works with: a growable in-memory buffer, a read-only borrowed
//! view, and a read-only file.
//!
//! Unlike a plain `std::io::Read + Seek`, every operation here reports
//! failure by returning zero/false and latching an error on the stream
//! itself rather than via `Result`. Callers check [`Stream::error`] after a
//! logical group of reads, the same way the firmware/blob decoders do.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fs::File;
use std::io::Read;

/// Endianness selector for typed primitive I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// The stream's sticky error state. Once set by a failed transfer it is
/// never cleared by the stream itself; subsequent operations are no-ops
/// that preserve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    Ok,
    OpenFailed,
    ReadFailed,
    WriteFailed,
}

impl StreamError {
    pub fn is_ok(self) -> bool {
        matches!(self, StreamError::Ok)
    }
}

/// Common capability set satisfied by all three stream variants.
pub trait Stream {
    /// Reads up to `buf.len()` bytes, returning the number actually
    /// transferred. A short transfer sets a sticky [`StreamError::ReadFailed`].
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Writes `buf.len()` bytes, returning the number actually transferred.
    /// A short transfer sets a sticky [`StreamError::WriteFailed`].
    fn write(&mut self, buf: &[u8]) -> usize;

    fn position(&self) -> u64;

    /// Absolute seek. Returns `false` without necessarily moving the
    /// cursor when `position` is out of range; see the module docs on the
    /// read-only/growable variants for the exact boundary behavior.
    fn set_position(&mut self, position: u64) -> bool;

    fn remaining(&self) -> u64;

    fn error(&self) -> StreamError;

    /// When the last transfer set a short-transfer error, the number of
    /// bytes requested versus the number actually transferred. `None` once
    /// no short transfer has occurred yet (including on `OpenFailed`,
    /// which never attempts a transfer).
    fn short_transfer(&self) -> Option<(usize, usize)>;

    fn endianness(&self) -> Endian;
    fn set_endianness(&mut self, endian: Endian);

    /// Signed relative seek; a negative delta that would move the cursor
    /// below zero is rejected.
    fn skip(&mut self, delta: i64) -> bool {
        let next = self.position() as i64 + delta;
        if next < 0 {
            return false;
        }
        self.set_position(next as u64)
    }
}

/// Typed primitive reads/writes built on top of [`Stream::read`]/[`Stream::write`],
/// byte-swapping per call when the stream's endianness differs from the
/// value's natural wire order.
pub trait StreamIo: Stream {
    fn read_u8(&mut self) -> u8 {
        let mut b = [0u8; 1];
        self.read(&mut b);
        b[0]
    }
    fn read_i8(&mut self) -> i8 {
        self.read_u8() as i8
    }
    fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }

    fn read_u16(&mut self) -> u16 {
        let mut b = [0u8; 2];
        self.read(&mut b);
        match self.endianness() {
            Endian::Little => LittleEndian::read_u16(&b),
            Endian::Big => BigEndian::read_u16(&b),
        }
    }
    fn read_i16(&mut self) -> i16 {
        self.read_u16() as i16
    }

    fn read_u32(&mut self) -> u32 {
        let mut b = [0u8; 4];
        self.read(&mut b);
        match self.endianness() {
            Endian::Little => LittleEndian::read_u32(&b),
            Endian::Big => BigEndian::read_u32(&b),
        }
    }
    fn read_i32(&mut self) -> i32 {
        self.read_u32() as i32
    }

    fn read_u64(&mut self) -> u64 {
        let mut b = [0u8; 8];
        self.read(&mut b);
        match self.endianness() {
            Endian::Little => LittleEndian::read_u64(&b),
            Endian::Big => BigEndian::read_u64(&b),
        }
    }
    fn read_i64(&mut self) -> i64 {
        self.read_u64() as i64
    }

    fn read_f32(&mut self) -> f32 {
        f32::from_bits(self.read_u32())
    }
    fn read_f64(&mut self) -> f64 {
        f64::from_bits(self.read_u64())
    }

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut b = [0u8; N];
        self.read(&mut b);
        b
    }

    fn read_vec(&mut self, len: usize) -> Vec<u8> {
        let mut b = vec![0u8; len];
        self.read(&mut b);
        b
    }

    fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }
    fn write_i8(&mut self, v: i8) {
        self.write_u8(v as u8);
    }
    fn write_bool(&mut self, v: bool) {
        self.write_u8(v as u8);
    }

    fn write_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        match self.endianness() {
            Endian::Little => LittleEndian::write_u16(&mut b, v),
            Endian::Big => BigEndian::write_u16(&mut b, v),
        }
        self.write(&b);
    }
    fn write_i16(&mut self, v: i16) {
        self.write_u16(v as u16);
    }

    fn write_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        match self.endianness() {
            Endian::Little => LittleEndian::write_u32(&mut b, v),
            Endian::Big => BigEndian::write_u32(&mut b, v),
        }
        self.write(&b);
    }
    fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    fn write_u64(&mut self, v: u64) {
        let mut b = [0u8; 8];
        match self.endianness() {
            Endian::Little => LittleEndian::write_u64(&mut b, v),
            Endian::Big => BigEndian::write_u64(&mut b, v),
        }
        self.write(&b);
    }
    fn write_i64(&mut self, v: i64) {
        self.write_u64(v as u64);
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }
    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_array<const N: usize>(&mut self, v: &[u8; N]) {
        self.write(v);
    }
}

impl<T: Stream + ?Sized> StreamIo for T {}

/// Read/write cursor over an owned, growable `Vec<u8>`. Writes past the
/// current end extend the buffer with zero fill, per the growable-vector
/// contract in §4.1.
pub struct VecStream {
    buf: Vec<u8>,
    pos: usize,
    endian: Endian,
    error: StreamError,
    short: Option<(usize, usize)>,
}

impl VecStream {
    pub fn new(endian: Endian) -> Self {
        VecStream {
            buf: Vec::new(),
            pos: 0,
            endian,
            error: StreamError::Ok,
            short: None,
        }
    }

    pub fn with_data(buf: Vec<u8>, endian: Endian) -> Self {
        VecStream {
            buf,
            pos: 0,
            endian,
            error: StreamError::Ok,
            short: None,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn get_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Stream for VecStream {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if !self.error.is_ok() {
            return 0;
        }
        let avail = self.buf.len().saturating_sub(self.pos);
        let n = buf.len().min(avail);
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        if n < buf.len() {
            self.error = StreamError::ReadFailed;
            self.short = Some((buf.len(), n));
        }
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if !self.error.is_ok() {
            return 0;
        }
        let end = self.pos + buf.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        buf.len()
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn set_position(&mut self, position: u64) -> bool {
        // Mirrors the reference VectorStream: `position >= len` is rejected,
        // so seeking to exactly one-past-the-end always fails (see §4.1).
        if position as usize >= self.buf.len() {
            return false;
        }
        self.pos = position as usize;
        true
    }

    fn remaining(&self) -> u64 {
        (self.buf.len() - self.pos) as u64
    }

    fn error(&self) -> StreamError {
        self.error
    }

    fn short_transfer(&self) -> Option<(usize, usize)> {
        self.short
    }

    fn endianness(&self) -> Endian {
        self.endian
    }

    fn set_endianness(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

/// Read-only cursor over a borrowed, contiguous byte slice.
pub struct SliceStream<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
    error: StreamError,
    short: Option<(usize, usize)>,
}

impl<'a> SliceStream<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        SliceStream {
            data,
            pos: 0,
            endian,
            error: StreamError::Ok,
            short: None,
        }
    }
}

impl Stream for SliceStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if !self.error.is_ok() {
            return 0;
        }
        let avail = self.data.len().saturating_sub(self.pos);
        let n = buf.len().min(avail);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        if n < buf.len() {
            self.error = StreamError::ReadFailed;
            self.short = Some((buf.len(), n));
        }
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        self.error = StreamError::WriteFailed;
        self.short = Some((buf.len(), 0));
        0
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn set_position(&mut self, position: u64) -> bool {
        if position as usize >= self.data.len() {
            return false;
        }
        self.pos = position as usize;
        true
    }

    fn remaining(&self) -> u64 {
        (self.data.len() - self.pos.min(self.data.len())) as u64
    }

    fn error(&self) -> StreamError {
        self.error
    }

    fn short_transfer(&self) -> Option<(usize, usize)> {
        self.short
    }

    fn endianness(&self) -> Endian {
        self.endian
    }

    fn set_endianness(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

/// Read-only cursor over a file opened by path. Writes are unsupported and
/// always fail, matching the reference `FileStream` (its `Write` is
/// currently a no-op that reports `WRITE_FAILED`).
pub struct FileStream {
    file: Option<File>,
    pos: u64,
    size: u64,
    endian: Endian,
    error: StreamError,
    short: Option<(usize, usize)>,
}

impl FileStream {
    pub fn open(path: impl AsRef<std::path::Path>, endian: Endian) -> Self {
        match File::open(path) {
            Ok(file) => {
                let size = file.metadata().map(|m| m.len()).unwrap_or(0);
                FileStream {
                    file: Some(file),
                    pos: 0,
                    size,
                    endian,
                    error: StreamError::Ok,
                    short: None,
                }
            }
            Err(_) => FileStream {
                file: None,
                pos: 0,
                size: 0,
                endian,
                error: StreamError::OpenFailed,
                short: None,
            },
        }
    }
}

impl Stream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if !self.error.is_ok() {
            return 0;
        }
        let Some(file) = self.file.as_mut() else {
            self.error = StreamError::OpenFailed;
            return 0;
        };
        use std::io::{Seek, SeekFrom};
        if file.seek(SeekFrom::Start(self.pos)).is_err() {
            self.error = StreamError::ReadFailed;
            return 0;
        }
        let mut n = 0;
        while n < buf.len() {
            match file.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(read) => n += read,
                Err(_) => break,
            }
        }
        self.pos += n as u64;
        if n < buf.len() {
            self.error = StreamError::ReadFailed;
            self.short = Some((buf.len(), n));
        }
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        self.error = StreamError::WriteFailed;
        self.short = Some((buf.len(), 0));
        0
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn set_position(&mut self, position: u64) -> bool {
        if position >= self.size {
            return false;
        }
        self.pos = position;
        true
    }

    fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.pos)
    }

    fn error(&self) -> StreamError {
        self.error
    }

    fn short_transfer(&self) -> Option<(usize, usize)> {
        self.short
    }

    fn endianness(&self) -> Endian {
        self.endian
    }

    fn set_endianness(&mut self, endian: Endian) {
        self.endian = endian;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_stream_grows_on_write_past_end() {
        let mut s = VecStream::new(Endian::Little);
        s.write_u32(0xDEAD_BEEF);
        assert_eq!(s.position(), 4);
        assert_eq!(s.into_inner(), vec![0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn endianness_swap_is_per_primitive() {
        let mut s = VecStream::new(Endian::Big);
        s.write_u32(0x0102_0304);
        s.set_endianness(Endian::Little);
        s.write_u32(0x0102_0304);
        assert_eq!(
            s.into_inner(),
            vec![0x01, 0x02, 0x03, 0x04, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn short_read_sets_sticky_error() {
        let data = [1u8, 2, 3];
        let mut s = SliceStream::new(&data, Endian::Little);
        let mut buf = [0u8; 8];
        let n = s.read(&mut buf);
        assert_eq!(n, 3);
        assert_eq!(s.error(), StreamError::ReadFailed);

        // Further reads are no-ops that preserve the sticky error.
        let n2 = s.read(&mut buf);
        assert_eq!(n2, 0);
        assert_eq!(s.error(), StreamError::ReadFailed);
    }

    #[test]
    fn slice_stream_rejects_writes() {
        let data = [0u8; 4];
        let mut s = SliceStream::new(&data, Endian::Little);
        assert_eq!(s.write(&[1, 2]), 0);
        assert_eq!(s.error(), StreamError::WriteFailed);
        assert_eq!(s.short_transfer(), Some((2, 0)));
    }

    #[test]
    fn short_transfer_reports_requested_vs_actual() {
        let data = [1u8, 2, 3];
        let mut s = SliceStream::new(&data, Endian::Little);
        let mut buf = [0u8; 8];
        s.read(&mut buf);
        assert_eq!(s.short_transfer(), Some((8, 3)));
    }

    #[test]
    fn file_stream_open_on_missing_path_sets_open_failed() {
        let s = FileStream::open("/nonexistent/path/does-not-exist.bin", Endian::Little);
        assert_eq!(s.error(), StreamError::OpenFailed);
        assert_eq!(s.short_transfer(), None);
    }

    #[test]
    fn set_position_rejects_one_past_end() {
        let mut s = VecStream::with_data(vec![1, 2, 3, 4], Endian::Little);
        assert!(s.set_position(3));
        assert!(!s.set_position(4));
    }

    #[test]
    fn skip_below_zero_fails() {
        let mut s = VecStream::with_data(vec![1, 2, 3], Endian::Little);
        s.set_position(1);
        assert!(!s.skip(-5));
        assert_eq!(s.position(), 1);
    }
}
