//! Equivalent CMYK colors for spot colorants
//!
//! To preview a spot colorant on a composite device, the color space that
//! names it is remapped once at full tint through its alternate space on a
//! throwaway device. That device's mapping procedures record the resulting
//! CMYK instead of producing a device color.

use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::cmap::ColorMapProcs;
use crate::color::{ClientColor, DeviceColor};
use crate::convert::{gray_to_cmyk, rgb_to_cmyk};
use crate::device::{ColorInfo, ColorantLookup, Device, SpecOp};
use crate::frac::Frac;
use crate::gstate::GraphicsState;
use crate::profile::{DataSpace, DeviceProfile};
use crate::space::{ColorSpace, SpaceType};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquivalentColor {
    pub valid: bool,
    pub cmyk: [Frac; 4],
}

/// One entry per device spot colorant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalentCmykColors {
    pub all_valid: bool,
    pub colors: Vec<EquivalentColor>,
}

impl EquivalentCmykColors {
    pub fn new(num_spots: usize) -> Self {
        Self {
            all_valid: num_spots == 0,
            colors: vec![EquivalentColor::default(); num_spots],
        }
    }

    pub fn get(&self, spot: usize) -> Option<[Frac; 4]> {
        self.colors
            .get(spot)
            .filter(|c| c.valid)
            .map(|c| c.cmyk)
    }

    fn set(&mut self, spot: usize, cmyk: [Frac; 4]) {
        if let Some(c) = self.colors.get_mut(spot) {
            *c = EquivalentColor { valid: true, cmyk };
        }
        self.all_valid = self.colors.iter().all(|c| c.valid);
    }
}

/// Mapping procedures that record CMYK into a slot
#[derive(Debug, Clone, Default)]
pub struct CaptureProcs {
    slot: Arc<Mutex<Option<[Frac; 4]>>>,
}

impl CaptureProcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<[Frac; 4]> {
        self.slot.lock().take()
    }

    fn record(&self, cmyk: [Frac; 4]) {
        *self.slot.lock() = Some(cmyk);
    }
}

impl ColorMapProcs for CaptureProcs {
    fn map_gray(&self, gray: Frac, _gs: &GraphicsState, _dc: &mut DeviceColor) -> Result<()> {
        self.record(gray_to_cmyk(gray));
        Ok(())
    }

    fn map_rgb(&self, rgb: [Frac; 3], _gs: &GraphicsState, _dc: &mut DeviceColor) -> Result<()> {
        self.record(rgb_to_cmyk(rgb));
        Ok(())
    }

    fn map_cmyk(&self, cmyk: [Frac; 4], _gs: &GraphicsState, _dc: &mut DeviceColor) -> Result<()> {
        self.record(cmyk);
        Ok(())
    }

    fn map_separation(&self, _tint: Frac, _gs: &GraphicsState, _dc: &mut DeviceColor) -> Result<()> {
        // Capture always routes through the alternate space
        warn!("separation mapping reached during equivalent color capture");
        Ok(())
    }

    fn map_devicen(&self, values: &[Frac], _gs: &GraphicsState, _dc: &mut DeviceColor) -> Result<()> {
        let mut cmyk = [Frac::ZERO; 4];
        for (c, v) in cmyk.iter_mut().zip(values) {
            *c = *v;
        }
        self.record(cmyk);
        Ok(())
    }

    fn is_capture(&self) -> bool {
        true
    }
}

/// Stand-in device with the real device's color info
#[derive(Debug)]
struct CaptureDevice {
    info: ColorInfo,
    profile: DeviceProfile,
}

impl Device for CaptureDevice {
    fn color_info(&self) -> ColorInfo {
        self.info
    }

    fn colorant_index(&self, _name: &str) -> ColorantLookup {
        ColorantLookup::Unknown
    }

    fn profile(&self) -> Result<DeviceProfile> {
        Ok(self.profile.clone())
    }
}

/// Remap `pc` in a copy of `space` forced onto its alternate and return the CMYK result
pub fn capture_equivalent_cmyk(
    gs: &GraphicsState,
    space: &ColorSpace,
    pc: &ClientColor,
) -> Result<[Frac; 4]> {
    let clone = Arc::new(space.duplicate());
    if let Some(reg) = clone.registry() {
        reg.set_use_alt(true);
    }
    let real = gs.device().profile()?;
    let output = if real.output.data_space() == DataSpace::NChannel {
        gs.icc_manager().default_cmyk()
    } else {
        real.output.clone()
    };
    let procs = Arc::new(CaptureProcs::new());
    let device: Arc<dyn Device> = Arc::new(CaptureDevice {
        info: gs.device().color_info(),
        profile: DeviceProfile::new(output).with_intent(real.intent),
    });
    let cmap: Arc<dyn ColorMapProcs> = procs.clone();
    let mut temp = gs.clone();
    temp.device = device;
    temp.cmap = cmap;
    temp.component_map
        .force_alternate(clone.id(), clone.num_components());
    clone.remap(pc, &temp)?;
    procs
        .take()
        .ok_or_else(|| Error::Device("capture produced no color".into()))
}

fn unit_color(n: usize, hot: usize) -> ClientColor {
    let mut pc = ClientColor::splat(n, 0.0);
    if let Some(v) = pc.values.get_mut(hot) {
        *v = 1.0;
    }
    pc
}

/// Capture equivalents for the device spot colorants that `space` names.
/// Entries that fail to capture stay invalid and are retried on a later install.
pub fn update_spot_equivalent_cmyk_colors(
    gs: &GraphicsState,
    space: &Arc<ColorSpace>,
    spot_names: &[String],
    table: &Mutex<EquivalentCmykColors>,
) -> Result<()> {
    let pending: SmallVec<[(usize, String); 8]> = {
        let t = table.lock();
        if t.all_valid {
            return Ok(());
        }
        spot_names
            .iter()
            .enumerate()
            .filter(|(i, _)| t.colors.get(*i).is_some_and(|c| !c.valid))
            .map(|(i, n)| (i, n.clone()))
            .collect()
    };
    let dev = gs.device();
    let mut jobs: SmallVec<[(usize, ClientColor); 8]> = SmallVec::new();
    match space.space_type() {
        SpaceType::Separation => {
            let name = space.colorant_names().and_then(|n| n.first());
            for (i, spot) in &pending {
                if Some(spot) == name {
                    jobs.push((*i, ClientColor::new(&[1.0])));
                }
            }
        }
        SpaceType::DeviceN => {
            let names = space.colorant_names().unwrap_or(&[]);
            if names.iter().any(|n| n == "None") {
                if dev.spec_op(SpecOp::SupportsDeviceN) {
                    warn!(
                        id = space.id(),
                        "DeviceN space with None colorants, separation preview may be inaccurate"
                    );
                }
                return Ok(());
            }
            for (i, spot) in &pending {
                if let Some(j) = names.iter().position(|n| n == spot) {
                    jobs.push((*i, unit_color(names.len(), j)));
                }
            }
        }
        SpaceType::IccBased => {
            let Some(spots) = dev.profile()?.spot_names else {
                return Ok(());
            };
            for (i, spot) in &pending {
                if let Some(j) = spots.index_of(spot).filter(|&j| j < space.num_components()) {
                    jobs.push((*i, unit_color(space.num_components(), j)));
                }
            }
        }
        _ => {}
    }
    for (i, pc) in jobs {
        match capture_equivalent_cmyk(gs, space, &pc) {
            Ok(cmyk) => {
                debug!(spot = %spot_names[i], ?cmyk, "captured equivalent CMYK");
                table.lock().set(i, cmyk);
            }
            Err(e) => debug!(spot = %spot_names[i], error = %e, "equivalent capture failed"),
        }
    }
    if table.lock().all_valid {
        if let Some(spots) = dev.profile()?.spot_names {
            spots.set_equiv_cmyk(true);
        }
    }
    Ok(())
}
