//! Owned byte buffer of a single packet.

use {
    bytes::{BufMut, Bytes, BytesMut},
    core::fmt,
    derive_more::{Display, Error},
};

/// Raw byte contents of a single packet, with headers stacked at the front.
///
/// Protocol layers add their header to an outgoing packet with
/// [`Packet::prepend_bytes`], so the outermost header always sits at the
/// front of the buffer. On the receiving side, each layer strips its header
/// off again with [`Packet::remove_bytes_from_front`], leaving the rest of the
/// packet (the payload, from that layer's point of view) untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Packet {
    buf: BytesMut,
}

/// Attempted to remove more bytes from the front of a [`Packet`] than it
/// contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("packet too short - requested {requested} / {len} bytes")]
pub struct PacketTooShort {
    /// Number of bytes which were requested.
    pub requested: usize,
    /// Number of bytes the packet contained.
    pub len: usize,
}

impl Packet {
    /// Creates an empty packet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a packet which contains only the given payload.
    #[must_use]
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        let payload: Bytes = payload.into();
        Self {
            buf: BytesMut::from(&payload[..]),
        }
    }

    /// Number of bytes in this packet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Gets if this packet has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrows the entire contents of this packet.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Inserts `header` before the existing contents of this packet.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlc_io::{Packet, bytes::Bytes};
    ///
    /// let mut packet = Packet::from_payload(Bytes::from_static(&[3, 4]));
    /// packet.prepend_bytes(&[1, 2]);
    /// assert_eq!(&[1, 2, 3, 4], packet.as_slice());
    /// ```
    pub fn prepend_bytes(&mut self, header: &[u8]) {
        if header.is_empty() {
            return;
        }

        let mut buf = BytesMut::with_capacity(header.len() + self.buf.len());
        buf.put_slice(header);
        buf.put_slice(&self.buf);
        self.buf = buf;
    }

    /// Removes exactly `count` bytes from the front of this packet, returning
    /// them.
    ///
    /// # Errors
    ///
    /// Errors if the packet has less than `count` bytes. In this case, the
    /// packet is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlc_io::{Packet, PacketTooShort, bytes::Bytes};
    ///
    /// let mut packet = Packet::from_payload(Bytes::from_static(&[1, 2, 3]));
    /// assert_eq!(&[1], &packet.remove_bytes_from_front(1).unwrap()[..]);
    /// assert_eq!(
    ///     Err(PacketTooShort { requested: 5, len: 2 }),
    ///     packet.remove_bytes_from_front(5),
    /// );
    /// assert_eq!(&[2, 3], packet.as_slice());
    /// ```
    pub fn remove_bytes_from_front(&mut self, count: usize) -> Result<Bytes, PacketTooShort> {
        let len = self.buf.len();
        if count > len {
            return Err(PacketTooShort {
                requested: count,
                len,
            });
        }
        Ok(self.buf.split_to(count).freeze())
    }

    /// Copies out the entire contents of this packet.
    ///
    /// Intended for inspection and logging. The packet itself is unchanged.
    #[must_use]
    pub fn copy_all_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Displays the contents of this packet as space-separated hex octets,
    /// i.e. `00 20 ff`.
    #[must_use]
    pub fn hex(&self) -> Hex<'_> {
        Hex(&self.buf)
    }

    /// Displays the contents of this packet as a string of bits, most
    /// significant bit of each byte first, i.e. `0000000000100000`.
    #[must_use]
    pub fn bin(&self) -> Bin<'_> {
        Bin(&self.buf)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Packet").field(&format_args!("[{}]", self.hex())).finish()
    }
}

impl From<Bytes> for Packet {
    fn from(value: Bytes) -> Self {
        Self::from_payload(value)
    }
}

impl From<BytesMut> for Packet {
    fn from(value: BytesMut) -> Self {
        Self { buf: value }
    }
}

/// Displays a byte slice as space-separated hex octets.
///
/// See [`Packet::hex`].
#[derive(Debug, Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Displays a byte slice as a string of bits.
///
/// See [`Packet::bin`].
#[derive(Debug, Clone, Copy)]
pub struct Bin<'a>(pub &'a [u8]);

impl fmt::Display for Bin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:08b}")?;
        }
        Ok(())
    }
}
