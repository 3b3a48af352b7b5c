//! Packing of fixed-width unsigned fields into bytes, most significant bit
//! first.
//!
//! RLC headers are not byte-aligned internally: a field may start in the
//! middle of one byte and end in the middle of the next. [`BitWriter`] packs
//! fields contiguously with no per-field padding, and only pads with zero bits
//! once, at the very end of the stream. [`BitReader`] reads them back in the
//! same order.

use {
    bytes::{BufMut, Bytes, BytesMut},
    derive_more::{Display, Error},
};

/// Largest width of a single field, in bits.
pub const MAX_FIELD_WIDTH: u32 = u32::BITS;

/// Attempted to write a value into a field which is too narrow to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("value {value} does not fit in a {width}-bit field")]
pub struct FieldOverflow {
    /// Value which was attempted to be written.
    pub value: u32,
    /// Width of the field in bits.
    pub width: u32,
}

/// Attempted to read a field which extends past the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("input truncated - needed {width} bits, {remaining} remaining")]
pub struct TruncatedInput {
    /// Width of the field which was attempted to be read.
    pub width: u32,
    /// Number of bits left in the input.
    pub remaining: usize,
}

/// Accumulates fixed-width fields into a byte buffer.
///
/// Use a fresh writer for each message, and call [`BitWriter::finish`] once all
/// fields have been written.
///
/// # Examples
///
/// ```
/// # use rlc_am::bits::BitWriter;
/// let mut writer = BitWriter::new();
/// writer.write_bits(0b0000, 4).unwrap();
/// writer.write_bits(8, 10).unwrap();
/// writer.write_bit(false);
/// assert_eq!(15, writer.bit_len());
/// assert_eq!(&[0x00, 0x20], &writer.finish()[..]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    buf: BytesMut,
    // bits of the partial byte, aligned to the MSB
    pending: u8,
    // number of bits used in `pending`, always in `0..8`
    pending_len: u32,
}

impl BitWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer which can hold `bytes` bytes without
    /// reallocating.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Total number of bits written so far, not including padding.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 + self.pending_len as usize
    }

    /// Appends the low `width` bits of `value`, most significant bit first.
    ///
    /// # Errors
    ///
    /// Errors if `value` does not fit in `width` bits. Nothing is written in
    /// this case.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=32`.
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<(), FieldOverflow> {
        assert!(
            (1..=MAX_FIELD_WIDTH).contains(&width),
            "field width must be in 1..={MAX_FIELD_WIDTH}, was {width}"
        );
        if width < MAX_FIELD_WIDTH && value >> width != 0 {
            return Err(FieldOverflow { value, width });
        }

        let mut left = width;
        while left > 0 {
            let free = 8 - self.pending_len;
            let take = free.min(left);
            // top `take` bits of the `left` bits still to be written
            let chunk = (value >> (left - take)) & ((1 << take) - 1);
            #[expect(clippy::cast_possible_truncation, reason = "`chunk` fits in 8 bits")]
            let chunk = chunk as u8;
            self.pending |= chunk << (free - take);
            self.pending_len += take;
            left -= take;

            if self.pending_len == 8 {
                self.buf.put_u8(self.pending);
                self.pending = 0;
                self.pending_len = 0;
            }
        }
        Ok(())
    }

    /// Appends a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u32::from(bit), 1)
            .unwrap_or_else(|_| unreachable!("a bool always fits in 1 bit"));
    }

    /// Pads the partially written byte with zero bits, and returns all bytes
    /// written.
    #[must_use]
    pub fn finish(mut self) -> Bytes {
        if self.pending_len > 0 {
            self.buf.put_u8(self.pending);
        }
        self.buf.freeze()
    }
}

/// Reads fixed-width fields, most significant bit first, from a byte slice.
///
/// # Examples
///
/// ```
/// # use rlc_am::bits::BitReader;
/// let mut reader = BitReader::new(&[0x00, 0x20]);
/// assert_eq!(0, reader.read_bits(4).unwrap());
/// assert_eq!(8, reader.read_bits(10).unwrap());
/// assert!(!reader.read_bit().unwrap());
/// assert_eq!(1, reader.bits_remaining());
/// assert_eq!(2, reader.bytes_consumed());
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bits read so far.
    #[must_use]
    pub const fn bits_read(&self) -> usize {
        self.pos
    }

    /// Number of bits left before the end of the input.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.buf.len() * 8 - self.pos
    }

    /// Number of bytes which the bits read so far span, including the
    /// remainder of a partially read byte.
    #[must_use]
    pub const fn bytes_consumed(&self) -> usize {
        self.pos.div_ceil(8)
    }

    /// Consumes and returns the next `width` bits, most significant bit first.
    ///
    /// # Errors
    ///
    /// Errors if there are less than `width` bits left. The read position is
    /// not advanced in this case.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=32`.
    pub fn read_bits(&mut self, width: u32) -> Result<u32, TruncatedInput> {
        assert!(
            (1..=MAX_FIELD_WIDTH).contains(&width),
            "field width must be in 1..={MAX_FIELD_WIDTH}, was {width}"
        );
        let remaining = self.bits_remaining();
        if (width as usize) > remaining {
            return Err(TruncatedInput { width, remaining });
        }

        let mut value = 0u32;
        let mut left = width;
        while left > 0 {
            let byte = self.buf[self.pos / 8];
            #[expect(clippy::cast_possible_truncation, reason = "always in `0..8`")]
            let offset = (self.pos % 8) as u32;
            let avail = 8 - offset;
            let take = avail.min(left);
            let chunk = (u32::from(byte) >> (avail - take)) & ((1 << take) - 1);
            value = (value << take) | chunk;
            self.pos += take as usize;
            left -= take;
        }
        Ok(value)
    }

    /// Consumes and returns the next bit.
    ///
    /// # Errors
    ///
    /// Errors if there are no bits left.
    pub fn read_bit(&mut self) -> Result<bool, TruncatedInput> {
        self.read_bits(1).map(|bit| bit != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_byte_aligned() {
        let mut w = BitWriter::new();
        w.write_bits(0xab, 8).unwrap();
        w.write_bits(0xcdef, 16).unwrap();
        assert_eq!(24, w.bit_len());
        assert_eq!(&[0xab, 0xcd, 0xef], &w.finish()[..]);
    }

    #[test]
    fn write_across_boundaries() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3).unwrap();
        w.write_bits(0b1_1111_1111, 9).unwrap();
        w.write_bits(0b0110, 4).unwrap();
        // 101 11111 | 1111 0110
        assert_eq!(&[0b1011_1111, 0b1111_0110], &w.finish()[..]);
    }

    #[test]
    fn finish_pads_with_zeroes() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        assert_eq!(&[0b1000_0000], &w.finish()[..]);

        let mut w = BitWriter::new();
        w.write_bits(0x7f, 7).unwrap();
        assert_eq!(&[0b1111_1110], &w.finish()[..]);
    }

    #[test]
    fn finish_empty() {
        assert!(BitWriter::new().finish().is_empty());
    }

    #[test]
    fn write_full_width() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        w.write_bits(u32::MAX, 32).unwrap();
        assert_eq!(&[0xff, 0xff, 0xff, 0xff, 0x80], &w.finish()[..]);
    }

    #[test]
    fn overflow_writes_nothing() {
        let mut w = BitWriter::new();
        w.write_bits(0b11, 2).unwrap();
        assert_eq!(
            Err(FieldOverflow {
                value: 1024,
                width: 10
            }),
            w.write_bits(1024, 10)
        );
        assert_eq!(2, w.bit_len());
        assert_eq!(&[0b1100_0000], &w.finish()[..]);
    }

    #[test]
    #[should_panic = "field width"]
    fn zero_width_panics() {
        _ = BitWriter::new().write_bits(0, 0);
    }

    #[test]
    fn read_across_boundaries() {
        let mut r = BitReader::new(&[0b1011_1111, 0b1111_0110]);
        assert_eq!(0b101, r.read_bits(3).unwrap());
        assert_eq!(0b1_1111_1111, r.read_bits(9).unwrap());
        assert_eq!(0b0110, r.read_bits(4).unwrap());
        assert_eq!(0, r.bits_remaining());
        assert_eq!(16, r.bits_read());
    }

    #[test]
    fn read_full_width() {
        let mut r = BitReader::new(&[0xff, 0xff, 0xff, 0xff, 0x80]);
        assert!(r.read_bit().unwrap());
        assert_eq!(u32::MAX, r.read_bits(32).unwrap());
        assert_eq!(7, r.bits_remaining());
    }

    #[test]
    fn read_past_end() {
        let mut r = BitReader::new(&[0xff]);
        assert_eq!(0b11111, r.read_bits(5).unwrap());
        assert_eq!(
            Err(TruncatedInput {
                width: 4,
                remaining: 3
            }),
            r.read_bits(4)
        );
        // position is not advanced by a failed read
        assert_eq!(0b111, r.read_bits(3).unwrap());
        assert!(r.read_bit().is_err());
    }

    #[test]
    fn read_empty() {
        let mut r = BitReader::new(&[]);
        assert_eq!(0, r.bits_remaining());
        assert_eq!(
            Err(TruncatedInput {
                width: 1,
                remaining: 0
            }),
            r.read_bit()
        );
    }

    #[test]
    fn bytes_consumed_rounds_up() {
        let mut r = BitReader::new(&[0, 0, 0]);
        assert_eq!(0, r.bytes_consumed());
        r.read_bits(1).unwrap();
        assert_eq!(1, r.bytes_consumed());
        r.read_bits(7).unwrap();
        assert_eq!(1, r.bytes_consumed());
        r.read_bits(2).unwrap();
        assert_eq!(2, r.bytes_consumed());
    }

    #[test]
    fn mixed_widths_read_back() {
        let fields = [(1, 1), (5, 3), (1023, 10), (0, 1), (77, 7), (3, 2), (0xfff, 12)];
        let mut w = BitWriter::new();
        for (value, width) in fields {
            w.write_bits(value, width).unwrap();
        }
        let bit_len = w.bit_len();
        let bytes = w.finish();
        assert_eq!(bit_len.div_ceil(8), bytes.len());

        let mut r = BitReader::new(&bytes);
        for (value, width) in fields {
            assert_eq!(value, r.read_bits(width).unwrap());
        }
        assert_eq!(bytes.len() * 8 - bit_len, r.bits_remaining());
    }
}
