//! Output device interface

use std::fmt::Debug;
use std::sync::Arc;

use crate::convert::{
    cmyk_to_gray, cmyk_to_rgb, gray_to_cmyk, gray_to_rgb, rgb_to_cmyk, rgb_to_gray,
};
use crate::frac::Frac;
use crate::gstate::GraphicsState;
use crate::overprint::OverprintParams;
use crate::profile::DeviceProfile;
use crate::space::ColorSpace;
use crate::Result;

/// Polarity of a color model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Additive,
    Subtractive,
    Unknown,
}

/// Native process color model of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessModel {
    Gray,
    Rgb,
    #[default]
    Cmyk,
}

impl ProcessModel {
    pub fn polarity(&self) -> Polarity {
        match self {
            Self::Gray | Self::Rgb => Polarity::Additive,
            Self::Cmyk => Polarity::Subtractive,
        }
    }

    pub fn colorant_names(&self) -> &'static [&'static str] {
        match self {
            Self::Gray => &["Gray"],
            Self::Rgb => &["Red", "Green", "Blue"],
            Self::Cmyk => &["Cyan", "Magenta", "Yellow", "Black"],
        }
    }

    pub fn num_components(&self) -> usize {
        self.colorant_names().len()
    }

    /// Map a gray value into the process components at the start of `out`
    pub fn map_gray(&self, gray: Frac, out: &mut [Frac]) {
        match self {
            Self::Gray => out[0] = gray,
            Self::Rgb => out[..3].copy_from_slice(&gray_to_rgb(gray)),
            Self::Cmyk => out[..4].copy_from_slice(&gray_to_cmyk(gray)),
        }
    }

    pub fn map_rgb(&self, rgb: [Frac; 3], out: &mut [Frac]) {
        match self {
            Self::Gray => out[0] = rgb_to_gray(rgb),
            Self::Rgb => out[..3].copy_from_slice(&rgb),
            Self::Cmyk => out[..4].copy_from_slice(&rgb_to_cmyk(rgb)),
        }
    }

    pub fn map_cmyk(&self, cmyk: [Frac; 4], out: &mut [Frac]) {
        match self {
            Self::Gray => out[0] = cmyk_to_gray(cmyk),
            Self::Rgb => out[..3].copy_from_slice(&cmyk_to_rgb(cmyk)),
            Self::Cmyk => out[..4].copy_from_slice(&cmyk),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorInfo {
    pub polarity: Polarity,
    /// Colorants currently produced by the device
    pub num_components: usize,
    /// Upper bound on colorant indices
    pub max_components: usize,
    pub process_model: ProcessModel,
}

/// Result of looking up a colorant by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorantLookup {
    /// Device colorant index
    Index(usize),
    /// Recognized, but the device does not image it
    Ignored,
    /// Not a colorant of this device
    Unknown,
}

/// Capability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecOp {
    SupportsDeviceN,
    IsPdf14Device,
    SupportsAdditiveSpots,
}

/// An output device as seen by the color pipeline
pub trait Device: Send + Sync + Debug {
    fn color_info(&self) -> ColorInfo;

    fn colorant_index(&self, name: &str) -> ColorantLookup;

    /// Device-level mapping of process colors into `out`, which holds
    /// `num_components` zeroed entries
    fn map_gray(&self, gray: Frac, out: &mut [Frac]) {
        self.color_info().process_model.map_gray(gray, out)
    }

    fn map_rgb(&self, rgb: [Frac; 3], out: &mut [Frac]) {
        self.color_info().process_model.map_rgb(rgb, out)
    }

    fn map_cmyk(&self, cmyk: [Frac; 4], out: &mut [Frac]) {
        self.color_info().process_model.map_cmyk(cmyk, out)
    }

    fn profile(&self) -> Result<DeviceProfile>;

    fn spec_op(&self, _op: SpecOp) -> bool {
        false
    }

    /// Called after a Separation, DeviceN or ICC space is installed
    fn update_spot_equivalent_colors(
        &self,
        _gs: &GraphicsState,
        _space: &Arc<ColorSpace>,
    ) -> Result<()> {
        Ok(())
    }

    /// Receives the overprint record for the next paint operation
    fn update_overprint(&self, _params: &OverprintParams) -> Result<()> {
        Ok(())
    }

    /// CMYK equivalent of a spot colorant, once captured
    fn spot_equivalent(&self, _colorant: usize) -> Option<[Frac; 4]> {
        None
    }
}

/// Device indices of Cyan, Magenta, Yellow and Black, if all are present
pub fn cmyk_colorant_indices(dev: &dyn Device) -> Option<[usize; 4]> {
    let mut out = [0; 4];
    for (slot, name) in out.iter_mut().zip(["Cyan", "Magenta", "Yellow", "Black"]) {
        match dev.colorant_index(name) {
            ColorantLookup::Index(i) => *slot = i,
            _ => return None,
        }
    }
    Some(out)
}
