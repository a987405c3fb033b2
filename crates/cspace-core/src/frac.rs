//! Fixed-point concrete color fractions
//!
//! Concrete colors are exchanged as 16-bit fractions where `FRAC_1`
//! represents full intensity. The scale leaves headroom below `i16::MAX`
//! so that sums of two fractions can be formed without overflow.

/// Fixed-point value representing 1.0
pub const FRAC_1: i16 = 0x7ff8;

/// Fixed-point fraction in `[0, FRAC_1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Frac(pub i16);

impl Frac {
    /// Zero intensity
    pub const ZERO: Self = Self(0);
    /// Full intensity
    pub const ONE: Self = Self(FRAC_1);

    /// Map a unit value into the fixed-point range, clamping to `[0, 1]`
    #[inline]
    pub fn from_unit(v: f32) -> Self {
        if v.is_nan() || v <= 0.0 {
            Self::ZERO
        } else if v >= 1.0 {
            Self::ONE
        } else {
            Self((v * FRAC_1 as f32 + 0.5) as i16)
        }
    }

    /// Convert back to a unit float
    #[inline]
    pub fn to_unit(self) -> f32 {
        self.0 as f32 / FRAC_1 as f32
    }

    /// `1 - self`
    #[inline]
    pub fn invert(self) -> Self {
        Self(FRAC_1 - self.0)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}
