//! A configurable process-plus-spots separation device
//!
//! Images a Gray, RGB or CMYK process model followed by an ordered list of
//! spot separations. It keeps an equivalent-CMYK table for its spots and
//! remembers the last overprint record it was sent.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::color::MAX_COMPONENTS;
use crate::device::{ColorInfo, ColorantLookup, Device, ProcessModel, SpecOp};
use crate::equivalent::{EquivalentCmykColors, update_spot_equivalent_cmyk_colors};
use crate::frac::Frac;
use crate::gstate::GraphicsState;
use crate::overprint::OverprintParams;
use crate::profile::{DeviceProfile, IccProfile, SpotNames};
use crate::space::ColorSpace;
use crate::transform::RenderingIntent;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SeparationDeviceConfig {
    pub process_model: ProcessModel,
    /// Spot separations, imaged after the process colorants
    pub spot_names: Vec<String>,
    pub supports_devicen: bool,
    pub is_pdf14: bool,
    pub supports_additive_spots: bool,
    /// Defaults to the built-in profile for the process model
    pub output_profile: Option<Arc<IccProfile>>,
    /// Spot names declared by the output profile
    pub profile_spot_names: Option<Vec<String>>,
    pub max_components: usize,
    pub intent: RenderingIntent,
}

impl SeparationDeviceConfig {
    pub fn new(process_model: ProcessModel) -> Self {
        Self {
            process_model,
            spot_names: Vec::new(),
            supports_devicen: process_model == ProcessModel::Cmyk,
            is_pdf14: false,
            supports_additive_spots: false,
            output_profile: None,
            profile_spot_names: None,
            max_components: MAX_COMPONENTS,
            intent: RenderingIntent::default(),
        }
    }

    pub fn with_spots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spot_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_devicen_support(mut self, on: bool) -> Self {
        self.supports_devicen = on;
        self
    }

    pub fn with_pdf14(mut self, on: bool) -> Self {
        self.is_pdf14 = on;
        self
    }

    pub fn with_additive_spots(mut self, on: bool) -> Self {
        self.supports_additive_spots = on;
        self
    }

    pub fn with_output_profile(mut self, profile: Arc<IccProfile>) -> Self {
        self.output_profile = Some(profile);
        self
    }

    pub fn with_profile_spot_names(mut self, names: Vec<String>) -> Self {
        self.profile_spot_names = Some(names);
        self
    }

    pub fn with_max_components(mut self, max: usize) -> Self {
        self.max_components = max;
        self
    }
}

#[derive(Debug)]
pub struct SeparationDevice {
    config: SeparationDeviceConfig,
    profile: DeviceProfile,
    equivalents: Mutex<EquivalentCmykColors>,
    last_overprint: Mutex<Option<OverprintParams>>,
}

impl SeparationDevice {
    pub fn new(config: SeparationDeviceConfig) -> Result<Self> {
        let total = config.process_model.num_components() + config.spot_names.len();
        if total > MAX_COMPONENTS {
            return Err(Error::Device(format!(
                "{} colorants exceed the limit of {}",
                total, MAX_COMPONENTS
            )));
        }
        let output = match &config.output_profile {
            Some(p) => p.clone(),
            None => Arc::new(match config.process_model {
                ProcessModel::Gray => IccProfile::default_gray(),
                ProcessModel::Rgb => IccProfile::default_rgb(),
                ProcessModel::Cmyk => IccProfile::default_cmyk(),
            }),
        };
        let mut profile = DeviceProfile::new(output).with_intent(config.intent);
        if let Some(names) = &config.profile_spot_names {
            profile = profile.with_spot_names(Arc::new(SpotNames::new(names.clone())));
        }
        Ok(Self {
            equivalents: Mutex::new(EquivalentCmykColors::new(config.spot_names.len())),
            last_overprint: Mutex::new(None),
            profile,
            config,
        })
    }

    pub fn config(&self) -> &SeparationDeviceConfig {
        &self.config
    }

    /// Snapshot of the equivalent-CMYK table
    pub fn equivalent_colors(&self) -> EquivalentCmykColors {
        self.equivalents.lock().clone()
    }

    /// Equivalent of a spot by name
    pub fn equivalent_for(&self, name: &str) -> Option<[Frac; 4]> {
        let i = self.config.spot_names.iter().position(|n| n == name)?;
        self.equivalents.lock().get(i)
    }

    pub fn last_overprint(&self) -> Option<OverprintParams> {
        *self.last_overprint.lock()
    }

    fn num_process(&self) -> usize {
        self.config.process_model.num_components()
    }
}

impl Device for SeparationDevice {
    fn color_info(&self) -> ColorInfo {
        ColorInfo {
            polarity: self.config.process_model.polarity(),
            num_components: self.num_process() + self.config.spot_names.len(),
            max_components: self.config.max_components,
            process_model: self.config.process_model,
        }
    }

    fn colorant_index(&self, name: &str) -> ColorantLookup {
        let process = self.config.process_model.colorant_names();
        if let Some(i) = process.iter().position(|n| *n == name) {
            return ColorantLookup::Index(i);
        }
        match self.config.spot_names.iter().position(|n| n == name) {
            Some(i) if process.len() + i < self.config.max_components => {
                ColorantLookup::Index(process.len() + i)
            }
            Some(_) => ColorantLookup::Ignored,
            None => ColorantLookup::Unknown,
        }
    }

    fn profile(&self) -> Result<DeviceProfile> {
        Ok(self.profile.clone())
    }

    fn spec_op(&self, op: SpecOp) -> bool {
        match op {
            SpecOp::SupportsDeviceN => self.config.supports_devicen,
            SpecOp::IsPdf14Device => self.config.is_pdf14,
            SpecOp::SupportsAdditiveSpots => self.config.supports_additive_spots,
        }
    }

    fn update_spot_equivalent_colors(&self, gs: &GraphicsState, space: &Arc<ColorSpace>) -> Result<()> {
        update_spot_equivalent_cmyk_colors(gs, space, &self.config.spot_names, &self.equivalents)
    }

    fn update_overprint(&self, params: &OverprintParams) -> Result<()> {
        *self.last_overprint.lock() = Some(*params);
        Ok(())
    }

    fn spot_equivalent(&self, colorant: usize) -> Option<[Frac; 4]> {
        let spot = colorant.checked_sub(self.num_process())?;
        self.equivalents.lock().get(spot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> SeparationDevice {
        SeparationDevice::new(
            SeparationDeviceConfig::new(ProcessModel::Cmyk).with_spots(["Orange", "Green"]),
        )
        .unwrap()
    }

    #[test]
    fn test_colorant_lookup() {
        let d = device();
        assert_eq!(d.colorant_index("Black"), ColorantLookup::Index(3));
        assert_eq!(d.colorant_index("Green"), ColorantLookup::Index(5));
        assert_eq!(d.colorant_index("Violet"), ColorantLookup::Unknown);
        assert_eq!(d.color_info().num_components, 6);
    }

    #[test]
    fn test_spots_beyond_limit_are_ignored() {
        let d = SeparationDevice::new(
            SeparationDeviceConfig::new(ProcessModel::Cmyk)
                .with_spots(["Orange", "Green"])
                .with_max_components(5),
        )
        .unwrap();
        assert_eq!(d.colorant_index("Orange"), ColorantLookup::Index(4));
        assert_eq!(d.colorant_index("Green"), ColorantLookup::Ignored);
    }

    #[test]
    fn test_capabilities() {
        let d = SeparationDevice::new(
            SeparationDeviceConfig::new(ProcessModel::Rgb).with_pdf14(true),
        )
        .unwrap();
        assert!(!d.spec_op(SpecOp::SupportsDeviceN));
        assert!(d.spec_op(SpecOp::IsPdf14Device));
        assert!(d.profile().unwrap().output.data_space() == crate::profile::DataSpace::Rgb);
    }
}
