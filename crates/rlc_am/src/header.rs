//! Attaching [`StatusPdu`] headers to, and detaching them from, a [`Packet`].

use {
    crate::{
        bits::FieldOverflow,
        status::{DecodeError, StatusPdu},
    },
    log::{debug, trace},
    rlc_io::Packet,
};

/// Encodes `pdu` and prepends it to the front of `packet`.
///
/// # Errors
///
/// See [`StatusPdu::encode`]. The packet is left unchanged on error.
///
/// # Examples
///
/// ```
/// use rlc_am::{header, seq::SequenceNumber, status::StatusPdu};
/// use rlc_io::Packet;
///
/// let mut packet = Packet::new();
/// header::attach_to(&mut packet, &StatusPdu::new(SequenceNumber::new(8))).unwrap();
/// assert_eq!(&[0x00, 0x20], packet.as_slice());
///
/// let pdu = header::detach_from(&mut packet).unwrap();
/// assert_eq!(SequenceNumber::new(8), pdu.ack_sn());
/// assert!(packet.is_empty());
/// ```
pub fn attach_to(packet: &mut Packet, pdu: &StatusPdu) -> Result<(), FieldOverflow> {
    let header = pdu.encode()?;
    packet.prepend_bytes(&header);
    Ok(())
}

/// Decodes a [`StatusPdu`] from the front of `packet`, and removes exactly the
/// bytes it took up.
///
/// Whatever comes after the header in `packet` is left untouched.
///
/// # Errors
///
/// See [`StatusPdu::decode`]. Nothing is removed from the packet on error.
pub fn detach_from(packet: &mut Packet) -> Result<StatusPdu, DecodeError> {
    let (pdu, len) = StatusPdu::decode(packet.as_slice()).inspect_err(|err| {
        debug!("rejected STATUS header: {err}");
        trace!("rejected packet contents: [{}]", packet.hex());
    })?;
    packet
        .remove_bytes_from_front(len)
        .unwrap_or_else(|err| unreachable!("decoded header must lie within the packet: {err}"));
    Ok(pdu)
}
