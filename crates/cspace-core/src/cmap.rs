//! Graphics-state color mapping procedures
//!
//! The last step of remapping: concrete process or colorant values become
//! a device color. The table is swappable so equivalent-color capture can
//! intercept the result instead of producing a device color.

use std::fmt::Debug;

use smallvec::SmallVec;

use crate::color::{DeviceColor, DeviceValue};
use crate::device::{Device, Polarity, cmyk_colorant_indices};
use crate::frac::Frac;
use crate::component_map::SepType;
use crate::gstate::GraphicsState;
use crate::Result;

pub trait ColorMapProcs: Send + Sync + Debug {
    fn map_gray(&self, gray: Frac, gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()>;

    fn map_rgb(&self, rgb: [Frac; 3], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()>;

    fn map_cmyk(&self, cmyk: [Frac; 4], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()>;

    fn map_rgb_alpha(
        &self,
        rgb: [Frac; 3],
        _alpha: Frac,
        gs: &GraphicsState,
        dc: &mut DeviceColor,
    ) -> Result<()> {
        self.map_rgb(rgb, gs, dc)
    }

    fn map_separation(&self, tint: Frac, gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()>;

    /// Colorant values through the current component map
    fn map_devicen(&self, values: &[Frac], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()>;

    fn is_capture(&self) -> bool {
        false
    }
}

/// Writes device colorant values
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultColorMapProcs;

fn blank(dev: &dyn Device) -> SmallVec<[Frac; 8]> {
    SmallVec::from_elem(Frac::ZERO, dev.color_info().num_components)
}

fn encode(dev: &dyn Device, tint: Frac) -> Frac {
    match dev.color_info().polarity {
        Polarity::Additive => tint.invert(),
        _ => tint,
    }
}

/// Fold captured spot equivalents into the process colorants
fn fold_spot_equivalents(dev: &dyn Device, out: &mut [Frac]) {
    let Some(cmyk) = cmyk_colorant_indices(dev) else {
        return;
    };
    let process = dev.color_info().process_model.num_components();
    let mut keep = cmyk.map(|i| 1.0 - out.get(i).map_or(0.0, |f| f.to_unit()));
    let mut folded = false;
    for idx in process..out.len() {
        let tint = out[idx];
        if tint.is_zero() {
            continue;
        }
        if let Some(eq) = dev.spot_equivalent(idx) {
            for (k, e) in keep.iter_mut().zip(eq) {
                *k *= 1.0 - tint.to_unit() * e.to_unit();
            }
            out[idx] = Frac::ZERO;
            folded = true;
        }
    }
    if folded {
        for (k, &i) in keep.iter().zip(&cmyk) {
            if let Some(slot) = out.get_mut(i) {
                *slot = Frac::from_unit(1.0 - k);
            }
        }
    }
}

fn spots_resolved(dev: &dyn Device) -> bool {
    dev.profile()
        .ok()
        .and_then(|p| p.spot_names)
        .is_some_and(|s| s.equiv_cmyk_set())
}

impl ColorMapProcs for DefaultColorMapProcs {
    fn map_gray(&self, gray: Frac, gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()> {
        let mut out = blank(gs.device().as_ref());
        gs.device().map_gray(gray, &mut out);
        dc.value = DeviceValue::Pure(out);
        Ok(())
    }

    fn map_rgb(&self, rgb: [Frac; 3], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()> {
        let mut out = blank(gs.device().as_ref());
        gs.device().map_rgb(rgb, &mut out);
        dc.value = DeviceValue::Pure(out);
        Ok(())
    }

    fn map_cmyk(&self, cmyk: [Frac; 4], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()> {
        let mut out = blank(gs.device().as_ref());
        gs.device().map_cmyk(cmyk, &mut out);
        dc.value = DeviceValue::Pure(out);
        Ok(())
    }

    fn map_separation(&self, tint: Frac, gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()> {
        let dev = gs.device();
        let map = gs.component_map();
        let mut out = blank(dev.as_ref());
        match map.sep_type {
            SepType::None => {
                *dc = DeviceColor::null();
                return Ok(());
            }
            SepType::All => {
                for v in out.iter_mut() {
                    *v = encode(dev.as_ref(), tint);
                }
            }
            SepType::Other => {
                if let Some(Some(i)) = map.color_map.first() {
                    if let Some(slot) = out.get_mut(*i) {
                        *slot = encode(dev.as_ref(), tint);
                    }
                }
            }
        }
        dc.value = DeviceValue::Pure(out);
        Ok(())
    }

    /// Entry point for hosts that drive the mapping procedures themselves.
    /// Internal remaps write device colors directly, so folding resolved spot
    /// equivalents into the process colorants only happens on this path.
    fn map_devicen(&self, values: &[Frac], gs: &GraphicsState, dc: &mut DeviceColor) -> Result<()> {
        let dev = gs.device();
        let mut out = blank(dev.as_ref());
        for (v, slot) in values.iter().zip(&gs.component_map().color_map) {
            if let Some(i) = slot {
                if let Some(o) = out.get_mut(*i) {
                    *o = encode(dev.as_ref(), *v);
                }
            }
        }
        if dev.color_info().polarity != Polarity::Additive && spots_resolved(dev.as_ref()) {
            fold_spot_equivalents(dev.as_ref(), &mut out);
        }
        dc.value = DeviceValue::Pure(out);
        Ok(())
    }
}
