//! Client, concrete and device color values

use smallvec::SmallVec;

use crate::frac::Frac;

/// Maximum number of components in a client color or device colorant set
pub const MAX_COMPONENTS: usize = 64;

/// Bitmask over device colorant indices
pub type ComponentMask = u64;

/// Threshold below which a client component counts as zero for overprint
pub const NONZERO_TOLERANCE: f32 = 0.5 / 255.0;

/// Mask with the low `n` bits set
#[inline]
pub fn mask_of(n: usize) -> ComponentMask {
    if n >= 64 { !0 } else { (1u64 << n) - 1 }
}

/// Application-supplied color in the numeric domain of its color space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientColor {
    pub values: SmallVec<[f32; 8]>,
}

impl ClientColor {
    pub fn new(values: &[f32]) -> Self {
        Self {
            values: SmallVec::from_slice(values),
        }
    }

    /// `n` components all set to `v`
    pub fn splat(n: usize, v: f32) -> Self {
        Self {
            values: SmallVec::from_elem(v, n),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Bit-exact comparison, used by the tint cache
    pub fn bit_eq(&self, other: &[f32]) -> bool {
        self.values.len() == other.len()
            && self
                .values
                .iter()
                .zip(other)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Device-independent intensities in fixed point
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConcreteColor(pub SmallVec<[Frac; 8]>);

impl ConcreteColor {
    pub fn from_unit(values: &[f32]) -> Self {
        Self(values.iter().map(|&v| Frac::from_unit(v)).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Frac] {
        &self.0
    }

    pub fn to_unit(&self) -> SmallVec<[f32; 8]> {
        self.0.iter().map(|f| f.to_unit()).collect()
    }
}

/// Final device color value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceValue {
    /// Nothing has been mapped yet
    #[default]
    Unset,
    /// Paints nothing (Separation "None")
    Null,
    /// One fraction per device colorant
    Pure(SmallVec<[Frac; 8]>),
}

/// A device color plus the client color it was produced from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceColor {
    pub value: DeviceValue,
    /// Snapshot of the client color that produced this value
    pub ccolor: Option<ClientColor>,
    /// Identity of the color space the snapshot belongs to
    pub ccolor_space: Option<u64>,
}

impl DeviceColor {
    pub fn pure(values: SmallVec<[Frac; 8]>) -> Self {
        Self {
            value: DeviceValue::Pure(values),
            ..Default::default()
        }
    }

    pub fn null() -> Self {
        Self {
            value: DeviceValue::Null,
            ..Default::default()
        }
    }

    pub fn components(&self) -> Option<&[Frac]> {
        match &self.value {
            DeviceValue::Pure(v) => Some(v),
            _ => None,
        }
    }

    /// Record the client color for later overprint inspection
    pub fn snapshot(&mut self, pc: &ClientColor, space_id: u64) {
        self.ccolor = Some(pc.clone());
        self.ccolor_space = Some(space_id);
    }

    /// Mask of device colorants carrying a non-zero value
    pub fn nonzero_comps(&self) -> ComponentMask {
        match &self.value {
            DeviceValue::Pure(v) => v
                .iter()
                .take(MAX_COMPONENTS)
                .enumerate()
                .filter(|(_, f)| !f.is_zero())
                .fold(0, |m, (i, _)| m | (1u64 << i)),
            _ => 0,
        }
    }
}
