//! DeviceGray, DeviceRGB and DeviceCMYK

use crate::color::{ConcreteColor, DeviceColor};
use crate::frac::Frac;
use crate::gstate::GraphicsState;
use crate::Result;

use super::{ColorSpace, Family, remap_through_profile};

/// Attach the manager's default profile unless one is already present
pub(super) fn install(space: &ColorSpace, gs: &GraphicsState) {
    let mut icc = space.icc.write();
    if icc.is_some() {
        return;
    }
    let manager = gs.icc_manager();
    *icc = match space.family {
        Family::DeviceGray => Some(manager.default_gray()),
        Family::DeviceRgb => Some(manager.default_rgb()),
        Family::DeviceCmyk => Some(manager.default_cmyk()),
        _ => None,
    };
}

pub(super) fn remap_concrete(
    space: &ColorSpace,
    conc: &ConcreteColor,
    gs: &GraphicsState,
) -> Result<DeviceColor> {
    if let Some(profile) = space.icc_profile() {
        return remap_through_profile(&profile, &conc.to_unit(), gs);
    }
    let c = |i: usize| conc.0.get(i).copied().unwrap_or(Frac::ZERO);
    let procs = gs.cmap_procs();
    let mut dc = DeviceColor::default();
    match space.family {
        Family::DeviceGray => procs.map_gray(c(0), gs, &mut dc)?,
        Family::DeviceRgb => procs.map_rgb([c(0), c(1), c(2)], gs, &mut dc)?,
        _ => procs.map_cmyk([c(0), c(1), c(2), c(3)], gs, &mut dc)?,
    }
    Ok(dc)
}
