//! Overprint resolution
//!
//! Computes which device colorants a paint operation draws. Colorants not
//! in `drawn_comps` keep their previous value when `retain_any_comps` is set.

use std::sync::Arc;

use tracing::trace;

use crate::color::{ComponentMask, NONZERO_TOLERANCE, mask_of};
use crate::device::cmyk_colorant_indices;
use crate::gstate::GraphicsState;
use crate::profile::IccProfile;
use crate::Result;

/// Record pushed to the device compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverprintParams {
    pub retain_any_comps: bool,
    pub drawn_comps: ComponentMask,
    pub is_fill_color: bool,
    pub effective_opm: u8,
}

fn push(gs: &mut GraphicsState, params: OverprintParams) -> Result<()> {
    trace!(?params, "overprint update");
    gs.effective_opm = params.effective_opm;
    let dev = gs.device.clone();
    dev.update_overprint(&params)?;
    gs.overprint = Some(params);
    Ok(())
}

/// Every colorant is drawn
pub fn set_no_overprint(gs: &mut GraphicsState) -> Result<()> {
    let params = OverprintParams {
        retain_any_comps: false,
        drawn_comps: mask_of(gs.device.color_info().num_components),
        is_fill_color: gs.is_fill,
        effective_opm: 0,
    };
    push(gs, params)
}

/// Process colorants are drawn; spot colorants are retained when overprint is on
pub fn set_spot_colors_overprint(gs: &mut GraphicsState) -> Result<()> {
    let info = gs.device.color_info();
    let retain = gs.overprint_enabled();
    let drawn = if retain {
        mask_of(info.process_model.num_components())
    } else {
        mask_of(info.num_components)
    };
    push(
        gs,
        OverprintParams {
            retain_any_comps: retain,
            drawn_comps: drawn,
            is_fill_color: gs.is_fill,
            effective_opm: 0,
        },
    )
}

/// Overprint for DeviceN/Separation colorants mapped natively
pub fn set_colorant_overprint(gs: &mut GraphicsState, retain: bool, drawn: ComponentMask) -> Result<()> {
    push(
        gs,
        OverprintParams {
            retain_any_comps: retain,
            drawn_comps: if retain { drawn } else { 0 },
            is_fill_color: gs.is_fill,
            effective_opm: 0,
        },
    )
}

/// DeviceCMYK rule. With overprint mode 1 on a CMYK-like device, only
/// non-zero process components are drawn, provided the source profile is
/// the device's own.
pub fn set_cmyk_overprint(
    gs: &mut GraphicsState,
    space_id: u64,
    space_profile: Option<&Arc<IccProfile>>,
) -> Result<()> {
    if !gs.overprint_enabled() || gs.options.overprint_mode != 1 {
        return set_spot_colors_overprint(gs);
    }
    let dev = gs.device.clone();
    let Some(indices) = cmyk_colorant_indices(dev.as_ref()) else {
        return set_spot_colors_overprint(gs);
    };
    let mut drawn = indices
        .iter()
        .filter(|&&i| i < 64)
        .fold(0u64, |m, &i| m | (1 << i));
    let output = dev.profile()?.output;
    let source = space_profile
        .cloned()
        .unwrap_or_else(|| gs.icc.default_cmyk());
    if source.same_as(&output) {
        let dc = &gs.device_color;
        match (&dc.ccolor, dc.ccolor_space) {
            (Some(cc), Some(id)) if id == space_id && cc.len() >= 4 => {
                for (k, &i) in indices.iter().enumerate() {
                    if cc.values[k] < NONZERO_TOLERANCE && i < 64 {
                        drawn &= !(1u64 << i);
                    }
                }
            }
            _ => drawn &= dc.nonzero_comps(),
        }
    } else {
        trace!("source and device profiles differ, mode 1 refinement skipped");
    }
    push(
        gs,
        OverprintParams {
            retain_any_comps: true,
            drawn_comps: drawn,
            is_fill_color: gs.is_fill,
            effective_opm: 1,
        },
    )
}
