//! See [`SequenceNumber`].

use core::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// 10-bit sequence number of an RLC AM PDU, wrapping around at
/// [`SequenceNumber::MODULUS`].
///
/// The stored value is always reduced modulo [`SequenceNumber::MODULUS`], and
/// all arithmetic on this type wraps around in the same space.
///
/// [`Ord`] on this type compares the raw residues, so `1023 > 0`. To order
/// sequence numbers relative to the lower edge of a receive or transmit
/// window, use [`SequenceNumber::cmp_from`], or [`SequenceNumber::dist_to`]
/// for the shortest signed distance around the circle.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u16", into = "u16"))]
pub struct SequenceNumber(u16);

impl SequenceNumber {
    /// Number of bits a sequence number takes up on the wire.
    pub const BITS: u32 = 10;

    /// Size of the sequence number space.
    pub const MODULUS: u16 = 1 << Self::BITS;

    /// Largest sequence number.
    pub const MAX: Self = Self(Self::MODULUS - 1);

    /// Creates a sequence number from a raw number, reducing it modulo
    /// [`SequenceNumber::MODULUS`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use rlc_am::seq::SequenceNumber;
    /// assert_eq!(8, SequenceNumber::new(8).value());
    /// assert_eq!(1023, SequenceNumber::new(1023).value());
    /// assert_eq!(0, SequenceNumber::new(1024).value());
    /// assert_eq!(1, SequenceNumber::new(1025).value());
    /// ```
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw % Self::MODULUS)
    }

    /// Gets the raw value of this sequence number, in
    /// `0..SequenceNumber::MODULUS`.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Gets the sequence number directly after this one, wrapping around.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rlc_am::seq::SequenceNumber;
    /// assert_eq!(SequenceNumber::new(1), SequenceNumber::new(0).next());
    /// assert_eq!(SequenceNumber::new(0), SequenceNumber::MAX.next());
    /// ```
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    /// Gets the signed distance from `self` to `rhs`, taking the shortest path
    /// around the sequence number circle.
    ///
    /// This is effectively `rhs - self`, but taking wraparound into account.
    /// The result is always in `-512..512`.
    ///
    /// ```text
    ///     1022   1023    0      1      2
    /// ... --|------|------|------|------|-- ...
    ///       ^             ^      ^      ^
    ///       |             +------+------+ 0.dist_to(2) = 2
    ///       |                    |        2.dist_to(0) = -2
    ///       +--------------------+ 1022.dist_to(1) = 3
    ///                              1.dist_to(1022) = -3
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// # use rlc_am::seq::SequenceNumber;
    /// let sn = SequenceNumber::new;
    /// assert_eq!(0, sn(5).dist_to(sn(5)));
    /// assert_eq!(2, sn(0).dist_to(sn(2)));
    /// assert_eq!(-2, sn(2).dist_to(sn(0)));
    /// assert_eq!(3, sn(1022).dist_to(sn(1)));
    /// assert_eq!(-3, sn(1).dist_to(sn(1022)));
    /// assert_eq!(-512, sn(0).dist_to(sn(512)));
    /// ```
    #[must_use]
    #[expect(clippy::cast_possible_wrap, reason = "values are below `MODULUS`")]
    pub const fn dist_to(self, rhs: Self) -> i16 {
        let forward = rhs.wrapping_sub(self).0;
        if forward < Self::MODULUS / 2 {
            forward as i16
        } else {
            forward as i16 - Self::MODULUS as i16
        }
    }

    const fn wrapping_sub(self, rhs: Self) -> Self {
        Self::new(self.0 + Self::MODULUS - rhs.0)
    }

    /// Compares `self` to `other` as offsets from `base`.
    ///
    /// `base` is usually the lower edge of an ARQ window: every sequence
    /// number in the window is at or after `base`, even if its raw value has
    /// wrapped around below it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rlc_am::seq::SequenceNumber;
    /// # use core::cmp::Ordering;
    /// let sn = SequenceNumber::new;
    /// assert_eq!(Ordering::Less, sn(1000).cmp_from(sn(3), sn(990)));
    /// assert_eq!(Ordering::Greater, sn(1000).cmp_from(sn(3), sn(0)));
    /// assert_eq!(Ordering::Equal, sn(7).cmp_from(sn(7), sn(500)));
    /// ```
    #[must_use]
    pub fn cmp_from(self, other: Self, base: Self) -> Ordering {
        (self - base).cmp(&(other - base))
    }
}

impl fmt::Debug for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("SequenceNumber").field(&self.0).finish()
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u16> for SequenceNumber {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<SequenceNumber> for u16 {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

impl From<SequenceNumber> for u32 {
    fn from(value: SequenceNumber) -> Self {
        Self::from(value.0)
    }
}

impl Add for SequenceNumber {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Add<u16> for SequenceNumber {
    type Output = Self;

    fn add(self, rhs: u16) -> Self::Output {
        self + Self::new(rhs)
    }
}

impl AddAssign for SequenceNumber {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl AddAssign<u16> for SequenceNumber {
    fn add_assign(&mut self, rhs: u16) {
        *self = *self + rhs;
    }
}

impl Sub for SequenceNumber {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.wrapping_sub(rhs)
    }
}

impl Sub<u16> for SequenceNumber {
    type Output = Self;

    fn sub(self, rhs: u16) -> Self::Output {
        self - Self::new(rhs)
    }
}

impl SubAssign for SequenceNumber {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl SubAssign<u16> for SequenceNumber {
    fn sub_assign(&mut self, rhs: u16) {
        *self = *self - rhs;
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for SequenceNumber {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        u.int_in_range(0..=Self::MAX.0).map(Self)
    }

    fn size_hint(depth: usize) -> (usize, Option<usize>) {
        <u16 as arbitrary::Arbitrary>::size_hint(depth)
    }
}
