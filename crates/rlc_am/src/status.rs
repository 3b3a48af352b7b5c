//! RLC AM STATUS PDU, used by a receiver to report which PDUs it has and has
//! not received.
//!
//! # Wire format
//!
//! All fields are packed most significant bit first, with no alignment
//! between fields. The header is padded with zero bits to a byte boundary
//! after the final `E1` bit.
//!
//! ```text
//! | D/C | CPT | ACK_SN  | E1 | NACK_SN | E1 | ... | NACK_SN | E1 | padding |
//! |  1  |  3  |   10    | 1  |   10    | 1  |     |   10    | 1  |  0..=7  |
//!   0     0                1                 1               0
//! ```
//!
//! - `D/C` (data/control) is always 0, since this is a control PDU.
//! - `CPT` (control PDU type) is always 0, marking a STATUS PDU.
//! - `ACK_SN` is the cumulative acknowledgement: all PDUs before it, except
//!   those listed as NACKs, have been received.
//! - each `E1` bit is 1 if another `NACK_SN` follows it, and 0 if the list
//!   ends there.
//!
//! For example, `ACK_SN = 8` and no NACKs encodes as:
//!
//! ```text
//! 0000 0000001000 0 0
//! ^^^^ ^^^^^^^^^^ ^ ^ padding
//! |    |          | E1
//! |    | ACK_SN
//! | D/C, CPT
//!
//! = 00000000 00100000
//! = 0x00     0x20
//! ```

use {
    crate::{
        bits::{BitReader, BitWriter, FieldOverflow, TruncatedInput},
        seq::SequenceNumber,
    },
    alloc::collections::VecDeque,
    bytes::Bytes,
    core::fmt,
    derive_more::{Display, Error, From},
};

/// Width of the `D/C` field.
const DC_BITS: u32 = 1;

/// Width of the `CPT` field.
const CPT_BITS: u32 = 3;

/// `D/C` value of a control PDU.
const DC_CONTROL: u32 = 0;

/// `CPT` value of a STATUS PDU.
const CPT_STATUS: u32 = 0;

/// Number of bits that a STATUS PDU with no NACKs takes up, before padding.
pub const FIXED_BITS: usize = (DC_BITS + CPT_BITS + SequenceNumber::BITS + 1) as usize;

/// Number of bits that each NACK adds to a STATUS PDU.
pub const BITS_PER_NACK: usize = (SequenceNumber::BITS + 1) as usize;

/// Minimum number of bytes a STATUS PDU takes up on the wire.
pub const MIN_ENCODE_LEN: usize = FIXED_BITS.div_ceil(8);

/// Acknowledgement report of an RLC AM receiver.
///
/// NACKs are kept in the order they were pushed, which is the order they are
/// sent on the wire. Duplicates are kept as-is.
///
/// # Examples
///
/// ```
/// use rlc_am::{seq::SequenceNumber, status::StatusPdu};
///
/// let sn = SequenceNumber::new;
/// let pdu = StatusPdu::new(sn(8)).with_nacks([sn(3), sn(5)]);
/// let bytes = pdu.encode().unwrap();
/// assert_eq!(&[0x00, 0x22, 0x01, 0xc0, 0x50], &bytes[..]);
///
/// let (mut decoded, len) = StatusPdu::decode(&bytes).unwrap();
/// assert_eq!(5, len);
/// assert_eq!(sn(8), decoded.ack_sn());
/// assert_eq!(Some(sn(3)), decoded.pop_nack());
/// assert_eq!(Some(sn(5)), decoded.pop_nack());
/// assert_eq!(None, decoded.pop_nack());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusPdu {
    ack_sn: SequenceNumber,
    nacks: VecDeque<SequenceNumber>,
}

/// Failed to decode a [`StatusPdu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum DecodeError {
    /// Input ended before the end of the header.
    #[display("truncated STATUS PDU")]
    Truncated(TruncatedInput),
    /// Header does not describe a STATUS PDU.
    #[display("not a STATUS PDU - D/C = {dc}, CPT = {cpt}")]
    #[from(ignore)]
    InvalidHeader {
        /// Value of the `D/C` field, 1 for a data PDU.
        dc: u8,
        /// Value of the `CPT` field.
        cpt: u8,
    },
}

impl StatusPdu {
    /// Creates a report with the given cumulative acknowledgement and no NACKs.
    #[must_use]
    pub const fn new(ack_sn: SequenceNumber) -> Self {
        Self {
            ack_sn,
            nacks: VecDeque::new(),
        }
    }

    /// Appends all `nacks` to this report, in order.
    #[must_use]
    pub fn with_nacks(mut self, nacks: impl IntoIterator<Item = SequenceNumber>) -> Self {
        self.nacks.extend(nacks);
        self
    }

    /// Gets the cumulative acknowledgement.
    #[must_use]
    pub const fn ack_sn(&self) -> SequenceNumber {
        self.ack_sn
    }

    /// Sets the cumulative acknowledgement.
    pub fn set_ack_sn(&mut self, ack_sn: SequenceNumber) {
        self.ack_sn = ack_sn;
    }

    /// Appends a NACK to the end of the list.
    pub fn push_nack(&mut self, nack_sn: SequenceNumber) {
        self.nacks.push_back(nack_sn);
    }

    /// Removes and returns the NACK at the front of the list.
    ///
    /// Once all NACKs have been popped, this returns [`None`], and keeps doing
    /// so on every further call.
    pub fn pop_nack(&mut self) -> Option<SequenceNumber> {
        self.nacks.pop_front()
    }

    /// Iterates over the NACKs left in the list, without removing them.
    pub fn nacks(&self) -> impl ExactSizeIterator<Item = SequenceNumber> + '_ {
        self.nacks.iter().copied()
    }

    /// Number of NACKs left in the list.
    #[must_use]
    pub fn num_nacks(&self) -> usize {
        self.nacks.len()
    }

    /// Number of bits this report takes up on the wire, before padding.
    #[must_use]
    pub fn encode_bits(&self) -> usize {
        FIXED_BITS + BITS_PER_NACK * self.nacks.len()
    }

    /// Number of bytes this report takes up on the wire.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlc_am::{seq::SequenceNumber, status::StatusPdu};
    ///
    /// let sn = SequenceNumber::new;
    /// assert_eq!(2, StatusPdu::new(sn(0)).encode_len());
    /// // 15 + 11 = 26 bits
    /// assert_eq!(4, StatusPdu::new(sn(0)).with_nacks([sn(1)]).encode_len());
    /// // 15 + 22 = 37 bits
    /// assert_eq!(5, StatusPdu::new(sn(0)).with_nacks([sn(1), sn(2)]).encode_len());
    /// ```
    #[must_use]
    pub fn encode_len(&self) -> usize {
        self.encode_bits().div_ceil(8)
    }

    /// Encodes this report into its wire format.
    ///
    /// # Errors
    ///
    /// Errors if a field does not fit in its width. This cannot happen for a
    /// well-formed [`SequenceNumber`].
    pub fn encode(&self) -> Result<Bytes, FieldOverflow> {
        let mut writer = BitWriter::with_capacity(self.encode_len());
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }

    /// Writes the fields of this report into `writer`, without padding.
    ///
    /// # Errors
    ///
    /// See [`StatusPdu::encode`].
    pub fn encode_into(&self, writer: &mut BitWriter) -> Result<(), FieldOverflow> {
        writer.write_bits(DC_CONTROL, DC_BITS)?;
        writer.write_bits(CPT_STATUS, CPT_BITS)?;
        writer.write_bits(u32::from(self.ack_sn), SequenceNumber::BITS)?;
        for &nack_sn in &self.nacks {
            writer.write_bit(true);
            writer.write_bits(u32::from(nack_sn), SequenceNumber::BITS)?;
        }
        writer.write_bit(false);
        Ok(())
    }

    /// Decodes a report from the front of `buf`.
    ///
    /// On success, returns the report and the number of bytes from the front
    /// of `buf` that the report takes up, including padding. Any bytes after
    /// that are left unread.
    ///
    /// Padding bits are not checked.
    ///
    /// # Errors
    ///
    /// Errors if the header is not a STATUS PDU, or if `buf` ends before the
    /// end of the NACK list.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = BitReader::new(buf);
        let pdu = Self::decode_from(&mut reader)?;
        Ok((pdu, reader.bytes_consumed()))
    }

    /// Reads the fields of a report from `reader`.
    ///
    /// The reader is left positioned directly after the final `E1` bit.
    ///
    /// # Errors
    ///
    /// See [`StatusPdu::decode`].
    pub fn decode_from(reader: &mut BitReader) -> Result<Self, DecodeError> {
        let dc = reader.read_bits(DC_BITS)?;
        let cpt = reader.read_bits(CPT_BITS)?;
        if dc != DC_CONTROL || cpt != CPT_STATUS {
            #[expect(clippy::cast_possible_truncation, reason = "fields are 1 and 3 bits")]
            return Err(DecodeError::InvalidHeader {
                dc: dc as u8,
                cpt: cpt as u8,
            });
        }

        let mut pdu = Self::new(read_sn(reader)?);
        while reader.read_bit()? {
            pdu.push_nack(read_sn(reader)?);
        }
        Ok(pdu)
    }
}

fn read_sn(reader: &mut BitReader) -> Result<SequenceNumber, TruncatedInput> {
    #[expect(clippy::cast_possible_truncation, reason = "field is 10 bits")]
    let raw = reader.read_bits(SequenceNumber::BITS)? as u16;
    Ok(SequenceNumber::new(raw))
}

impl fmt::Display for StatusPdu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "STATUS ack_sn={} nacks=[", self.ack_sn)?;
        for (index, nack_sn) in self.nacks.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{nack_sn}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloc::vec::Vec};

    fn sn(n: u16) -> SequenceNumber {
        SequenceNumber::new(n)
    }

    fn round_trip(pdu: &StatusPdu) {
        let bytes = pdu.encode().unwrap();
        assert_eq!(pdu.encode_len(), bytes.len());

        let (decoded, len) = StatusPdu::decode(&bytes).unwrap();
        assert_eq!(bytes.len(), len);
        assert_eq!(*pdu, decoded);
    }

    #[test]
    fn wire_vectors() {
        let cases: &[(u16, &[u16], &[u8])] = &[
            (8, &[], &[0x00, 0x20]),
            (0, &[], &[0x00, 0x00]),
            (1023, &[], &[0x0f, 0xfc]),
            (8, &[3], &[0x00, 0x22, 0x01, 0x80]),
            (8, &[3, 5], &[0x00, 0x22, 0x01, 0xc0, 0x50]),
            (100, &[7], &[0x01, 0x92, 0x03, 0x80]),
            (1023, &[0, 1023, 512], &[0x0f, 0xfe, 0x00, 0x7f, 0xfc, 0x00]),
        ];

        for &(ack_sn, nacks, expected) in cases {
            let pdu = StatusPdu::new(sn(ack_sn)).with_nacks(nacks.iter().copied().map(sn));
            let bytes = pdu.encode().unwrap();
            assert_eq!(expected, &bytes[..], "encoding {pdu}");

            let (decoded, len) = StatusPdu::decode(expected).unwrap();
            assert_eq!(expected.len(), len);
            assert_eq!(pdu, decoded);
        }
    }

    #[test]
    fn empty_list_is_two_bytes() {
        let pdu = StatusPdu::new(sn(512));
        assert_eq!(FIXED_BITS, pdu.encode_bits());
        assert_eq!(2, pdu.encode().unwrap().len());
    }

    #[test]
    fn every_ack_sn() {
        for n in 0..SequenceNumber::MODULUS {
            round_trip(&StatusPdu::new(sn(n)));
        }
    }

    #[test]
    fn every_nack_sn() {
        for n in 0..SequenceNumber::MODULUS {
            round_trip(&StatusPdu::new(sn(1023 - n)).with_nacks([sn(n), sn(n ^ 0x2aa)]));
        }
    }

    #[test]
    fn length_law() {
        for len in 0..64 {
            let pdu = StatusPdu::new(sn(1)).with_nacks((0..len).map(|n| sn(n * 37)));
            let expected = (15 + 11 * usize::from(len)).div_ceil(8);
            assert_eq!(expected, pdu.encode_len());
            assert_eq!(expected, pdu.encode().unwrap().len());
            round_trip(&pdu);
        }
    }

    #[test]
    fn duplicates_are_kept() {
        let pdu = StatusPdu::new(sn(10)).with_nacks([sn(4), sn(4), sn(2), sn(4)]);
        round_trip(&pdu);
        let (decoded, _) = StatusPdu::decode(&pdu.encode().unwrap()).unwrap();
        assert_eq!(
            [sn(4), sn(4), sn(2), sn(4)].as_slice(),
            decoded.nacks().collect::<Vec<_>>()
        );
    }

    #[test]
    fn pop_until_exhausted() {
        let mut pdu = StatusPdu::new(sn(0)).with_nacks([sn(1), sn(2)]);
        assert_eq!(2, pdu.num_nacks());
        assert_eq!(Some(sn(1)), pdu.pop_nack());
        assert_eq!(Some(sn(2)), pdu.pop_nack());

        let drained = pdu.clone();
        for _ in 0..3 {
            assert_eq!(None, pdu.pop_nack());
            assert_eq!(drained, pdu);
        }
        assert_eq!(0, pdu.num_nacks());
    }

    #[test]
    fn trailing_bytes_are_left() {
        let (pdu, len) = StatusPdu::decode(&[0x00, 0x20, 0xde, 0xad]).unwrap();
        assert_eq!(2, len);
        assert_eq!(StatusPdu::new(sn(8)), pdu);
    }

    #[test]
    fn padding_is_ignored() {
        // same as `00 20`, but with the padding bit set
        let (pdu, len) = StatusPdu::decode(&[0x00, 0x21]).unwrap();
        assert_eq!(2, len);
        assert_eq!(StatusPdu::new(sn(8)), pdu);
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            StatusPdu::decode(&[]),
            Err(DecodeError::Truncated(TruncatedInput { remaining: 0, .. }))
        ));
        assert!(matches!(
            StatusPdu::decode(&[0x00]),
            Err(DecodeError::Truncated(_))
        ));
    }

    #[test]
    fn truncated_mid_list() {
        let bytes = StatusPdu::new(sn(8))
            .with_nacks([sn(3), sn(5)])
            .encode()
            .unwrap();
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    StatusPdu::decode(&bytes[..len]),
                    Err(DecodeError::Truncated(_))
                ),
                "decoding {len} bytes"
            );
        }
    }

    #[test]
    fn data_pdu_rejected() {
        assert_eq!(
            Err(DecodeError::InvalidHeader { dc: 1, cpt: 0 }),
            StatusPdu::decode(&[0x80, 0x20])
        );
    }

    #[test]
    fn unknown_cpt_rejected() {
        // CPT = 0b001
        assert_eq!(
            Err(DecodeError::InvalidHeader { dc: 0, cpt: 1 }),
            StatusPdu::decode(&[0x10, 0x20])
        );
        // CPT = 0b111
        assert_eq!(
            Err(DecodeError::InvalidHeader { dc: 0, cpt: 7 }),
            StatusPdu::decode(&[0x70, 0x00, 0x00])
        );
    }

    #[test]
    fn display() {
        let pdu = StatusPdu::new(sn(8)).with_nacks([sn(3), sn(5)]);
        assert_eq!("STATUS ack_sn=8 nacks=[3, 5]", pdu.to_string());
        assert_eq!("STATUS ack_sn=0 nacks=[]", StatusPdu::default().to_string());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let pdu = StatusPdu::new(sn(1023)).with_nacks([sn(0), sn(512), sn(512), sn(7)]);
        let bytes = bincode::serialize(&pdu).unwrap();
        assert_eq!(pdu, bincode::deserialize::<StatusPdu>(&bytes).unwrap());

        let empty = StatusPdu::default();
        let bytes = bincode::serialize(&empty).unwrap();
        assert_eq!(empty, bincode::deserialize::<StatusPdu>(&bytes).unwrap());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_reduces_out_of_range() {
        // same layout as a `(u16, Vec<u16>)`
        let bytes = bincode::serialize(&(1032u16, Vec::from([3u16, 2053]))).unwrap();
        let pdu = bincode::deserialize::<StatusPdu>(&bytes).unwrap();
        assert_eq!(StatusPdu::new(sn(8)).with_nacks([sn(3), sn(5)]), pdu);
    }

    #[cfg(feature = "arbitrary")]
    #[test]
    fn arbitrary_in_range() {
        use arbitrary::{Arbitrary, Unstructured};

        let data: Vec<u8> = (0..=255).collect();
        let pdu = StatusPdu::arbitrary_take_rest(Unstructured::new(&data)).unwrap();
        assert!(pdu.ack_sn().value() < SequenceNumber::MODULUS);
        assert!(pdu.nacks().all(|nack| nack.value() < SequenceNumber::MODULUS));
        round_trip(&pdu);
    }
}
