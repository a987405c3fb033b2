//! ICC-based spaces

use std::sync::Arc;

use tracing::debug;

use crate::color::{ClientColor, DeviceColor};
use crate::gstate::GraphicsState;
use crate::overprint::{set_cmyk_overprint, set_spot_colors_overprint};
use crate::profile::DataSpace;
use crate::Result;

use super::ColorSpace;

/// Lab in native units to the normalized `[0, 1]` form
pub(crate) fn normalize_lab(pc: &mut ClientColor) {
    if pc.len() >= 3 {
        pc.values[0] /= 100.0;
        pc.values[1] = (pc.values[1] + 128.0) / 255.0;
        pc.values[2] = (pc.values[2] + 128.0) / 255.0;
    }
}

pub(super) fn initial_color(space: &ColorSpace) -> ClientColor {
    let mut pc = ClientColor::splat(space.num_components(), 0.0);
    if space.icc_profile().is_some_and(|p| p.is_cmyk()) {
        pc.values[3] = 1.0;
    }
    pc
}

pub(super) fn restrict(space: &ColorSpace, pc: &mut ClientColor) {
    let Some(profile) = space.icc_profile() else {
        return;
    };
    for (i, v) in pc.values.iter_mut().enumerate() {
        let (lo, hi) = profile.range(i);
        *v = if v.is_nan() { lo } else { v.clamp(lo, hi) };
    }
}

pub(super) fn remap(space: &Arc<ColorSpace>, pc: &ClientColor, gs: &GraphicsState) -> Result<DeviceColor> {
    if space.is_lab() {
        let mut normalized = pc.clone();
        normalize_lab(&mut normalized);
        let mut dc = space.remap_default(&normalized, gs)?;
        dc.snapshot(pc, space.id);
        Ok(dc)
    } else {
        space.remap_default(pc, gs)
    }
}

/// Let the device capture equivalents when its output profile names spots
pub(super) fn install(space: &Arc<ColorSpace>, gs: &mut GraphicsState) -> Result<()> {
    let dev = gs.device().clone();
    if dev.profile()?.spot_names.is_some() {
        debug!(id = space.id, "ICC space installed on a device with spot names");
        dev.update_spot_equivalent_colors(gs, space)?;
    }
    Ok(())
}

pub(super) fn set_overprint(space: &ColorSpace, gs: &mut GraphicsState) -> Result<()> {
    match space.icc_profile() {
        Some(p) if p.data_space() == DataSpace::Cmyk => {
            set_cmyk_overprint(gs, space.id, Some(&p))
        }
        _ => set_spot_colors_overprint(gs),
    }
}
