//! CIE-based spaces (A, ABC, DEF, DEFG)
//!
//! Legacy CIE spaces are converted through a synthesized ICC equivalent.
//! Client values are first rescaled from their declared ranges into `[0, 1]`.

use std::sync::Arc;

use crate::color::ClientColor;
use crate::manager::IccManager;
use crate::pcs::D50;
use crate::profile::IccProfile;
use crate::{Error, Result};

use super::SpaceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CieKind {
    A,
    Abc,
    Def,
    Defg,
}

impl CieKind {
    pub fn num_components(self) -> usize {
        match self {
            Self::A => 1,
            Self::Abc | Self::Def => 3,
            Self::Defg => 4,
        }
    }

    pub(super) fn space_type(self) -> SpaceType {
        match self {
            Self::A => SpaceType::CieA,
            Self::Abc => SpaceType::CieAbc,
            Self::Def => SpaceType::CieDef,
            Self::Defg => SpaceType::CieDefg,
        }
    }

    pub(crate) fn from_space_type(t: SpaceType) -> Option<Self> {
        match t {
            SpaceType::CieA => Some(Self::A),
            SpaceType::CieAbc => Some(Self::Abc),
            SpaceType::CieDef => Some(Self::Def),
            SpaceType::CieDefg => Some(Self::Defg),
            _ => None,
        }
    }
}

/// Parameters of a CIE-based space
#[derive(Debug, Clone, PartialEq)]
pub struct CieParams {
    pub kind: CieKind,
    /// Range of each component
    pub ranges: Vec<(f32, f32)>,
    pub white_point: [f32; 3],
    /// ABC to XYZ matrix, column per component
    pub matrix: Option<[[f32; 3]; 3]>,
    /// Components are L*a*b* rather than ABC
    pub lab: bool,
}

impl CieParams {
    /// Unit ranges, D50 white, no matrix
    pub fn new(kind: CieKind) -> Self {
        Self {
            kind,
            ranges: vec![(0.0, 1.0); kind.num_components()],
            white_point: D50,
            matrix: None,
            lab: false,
        }
    }

    /// CIEBasedABC space holding L*a*b* values
    pub fn lab(white_point: [f32; 3]) -> Self {
        Self {
            kind: CieKind::Abc,
            ranges: vec![(0.0, 100.0), (-128.0, 127.0), (-128.0, 127.0)],
            white_point,
            matrix: None,
            lab: true,
        }
    }

    pub fn with_ranges(mut self, ranges: Vec<(f32, f32)>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_white_point(mut self, white: [f32; 3]) -> Self {
        self.white_point = white;
        self
    }

    pub fn with_matrix(mut self, matrix: [[f32; 3]; 3]) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.ranges.len() != self.kind.num_components() {
            return Err(Error::range(format!(
                "{:?} needs {} ranges, got {}",
                self.kind,
                self.kind.num_components(),
                self.ranges.len()
            )));
        }
        if self.ranges.iter().any(|(lo, hi)| !(lo < hi)) {
            return Err(Error::range("empty CIE range"));
        }
        if !(self.white_point[1] > 0.0) || self.white_point.iter().any(|w| *w < 0.0) {
            return Err(Error::range("invalid white point"));
        }
        if self.lab && self.kind != CieKind::Abc {
            return Err(Error::range("only CIEBasedABC spaces can hold Lab"));
        }
        Ok(())
    }

    fn unit_ranges(&self) -> bool {
        self.ranges.iter().all(|&(lo, hi)| lo == 0.0 && hi == 1.0)
    }

    pub(super) fn initial_color(&self) -> ClientColor {
        ClientColor {
            values: self.ranges.iter().map(|&(lo, hi)| 0f32.clamp(lo, hi)).collect(),
        }
    }

    pub(super) fn restrict(&self, pc: &mut ClientColor) {
        for (v, &(lo, hi)) in pc.values.iter_mut().zip(&self.ranges) {
            *v = if v.is_nan() { lo } else { v.clamp(lo, hi) };
        }
    }

    /// Rescale into `[0, 1]`. Returns false when the ranges already are unit ranges.
    pub(crate) fn rescale(&self, pc: &mut ClientColor) -> bool {
        if self.unit_ranges() {
            return false;
        }
        for (v, &(lo, hi)) in pc.values.iter_mut().zip(&self.ranges) {
            *v = ((*v - lo) / (hi - lo)).clamp(0.0, 1.0);
        }
        true
    }

    pub(super) fn equivalent_profile(&self, manager: &IccManager) -> Arc<IccProfile> {
        match self.kind {
            CieKind::A => Arc::new(IccProfile::cie_a(self.white_point)),
            CieKind::Abc if self.lab => manager.lab(),
            CieKind::Abc => {
                let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
                Arc::new(IccProfile::cie_abc(
                    self.matrix.unwrap_or(identity),
                    self.white_point,
                ))
            }
            CieKind::Def => manager.default_rgb(),
            CieKind::Defg => manager.default_cmyk(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(CieParams::new(CieKind::Def).validate().is_ok());
        let bad = CieParams::new(CieKind::A).with_ranges(vec![(0.0, 1.0); 2]);
        assert!(bad.validate().is_err());
        let bad = CieParams::new(CieKind::A).with_white_point([1.0, 0.0, 1.0]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_rescale() {
        let lab = CieParams::lab(D50);
        let mut pc = ClientColor::new(&[50.0, -128.0, 127.0]);
        assert!(lab.rescale(&mut pc));
        assert_eq!(pc.as_slice(), &[0.5, 0.0, 1.0]);

        let unit = CieParams::new(CieKind::Def);
        let mut pc = ClientColor::new(&[0.25, 0.5, 0.75]);
        assert!(!unit.rescale(&mut pc));
        assert_eq!(pc.as_slice(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_initial_color_inside_range() {
        let p = CieParams::new(CieKind::A).with_ranges(vec![(0.2, 0.8)]);
        assert_eq!(p.initial_color().as_slice(), &[0.2]);
    }
}
