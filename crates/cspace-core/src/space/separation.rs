//! Separation spaces: one named colorant with a tint transform into an
//! alternate space

use std::sync::Arc;

use tracing::debug;

use crate::color::{ClientColor, ConcreteColor, DeviceColor};
use crate::component_map::SepType;
use crate::frac::Frac;
use crate::gstate::GraphicsState;
use crate::overprint::{set_colorant_overprint, set_no_overprint};
use crate::registry::{ColorantRegistry, classify};
use crate::Result;

use super::{ColorSpace, direct_device_color};

#[derive(Debug, Clone)]
pub struct Separation {
    pub(crate) registry: ColorantRegistry,
    pub(crate) sep_type: SepType,
}

impl Separation {
    pub(super) fn new(registry: ColorantRegistry, name: &str) -> Self {
        Self {
            registry,
            sep_type: SepType::from_name(name),
        }
    }

    pub fn sep_type(&self) -> SepType {
        self.sep_type
    }

    pub fn name(&self) -> &str {
        self.registry.names().first().map_or("", |s| s.as_str())
    }

    fn named_supported(&self, gs: &GraphicsState) -> bool {
        self.sep_type == SepType::Other
            && gs
                .icc_manager()
                .named()
                .is_some_and(|t| t.supports(self.registry.names()))
    }

    pub(super) fn concretize(
        &self,
        space: &ColorSpace,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<ConcreteColor> {
        if space.uses_alternate(gs) {
            space.concretize_alternate(&self.registry, pc, gs)
        } else {
            Ok(ConcreteColor::from_unit(&pc.values[..1.min(pc.len())]))
        }
    }

    pub(super) fn remap_concrete(
        &self,
        space: &ColorSpace,
        conc: &ConcreteColor,
        gs: &GraphicsState,
    ) -> Result<DeviceColor> {
        if space.uses_alternate(gs) {
            return space.require_base()?.remap_concrete(conc, gs);
        }
        let tint = conc.0.first().copied().unwrap_or(Frac::ZERO);
        let mut dc = DeviceColor::default();
        gs.cmap_procs().map_separation(tint, gs, &mut dc)?;
        Ok(dc)
    }

    pub(super) fn remap(
        &self,
        space: &Arc<ColorSpace>,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<DeviceColor> {
        let mut dc = if self.sep_type == SepType::None {
            DeviceColor::null()
        } else if let Some(dc) = remap_named(&self.registry, pc, gs)? {
            dc
        } else {
            return space.remap_default(pc, gs);
        };
        dc.snapshot(pc, space.id);
        Ok(dc)
    }

    pub(super) fn install(&self, space: &Arc<ColorSpace>, gs: &mut GraphicsState) -> Result<()> {
        let named = self.named_supported(gs);
        let dev = gs.device().clone();
        gs.component_map
            .check_separation_name(space.id, self.name(), self.sep_type, dev.as_ref(), named);
        if gs.icc_manager().named().is_some() {
            self.registry.set_named_supported(named);
        }
        if self.sep_type == SepType::Other {
            let c = classify(self.registry.names());
            self.registry.set_classification(c);
            gs.component_map.classification = Some(c);
        }
        let use_alt = gs.component_map.use_alternate;
        self.registry.set_use_alt(use_alt);
        debug!(
            id = space.id,
            name = self.name(),
            use_alt,
            colorant = ?gs.component_map.color_map.first(),
            "installed Separation"
        );
        if use_alt {
            space.require_base()?.install(gs)?;
        }
        dev.update_spot_equivalent_colors(gs, space)
    }

    pub(super) fn set_overprint(&self, space: &ColorSpace, gs: &mut GraphicsState) -> Result<()> {
        let dev = gs.device().clone();
        let named = self.registry.named_supported();
        gs.component_map
            .check_separation_name(space.id, self.name(), self.sep_type, dev.as_ref(), named);
        gs.component_map.classification = self.registry.classification();
        if gs.component_map.use_alternate {
            return set_no_overprint(gs);
        }
        let retain = gs.overprint_enabled() && self.sep_type != SepType::All;
        let drawn = if self.sep_type == SepType::None {
            0
        } else {
            gs.component_map.drawn_mask()
        };
        set_colorant_overprint(gs, retain, drawn)
    }
}

/// Named-color replacement for Separation and DeviceN remaps
pub(super) fn remap_named(
    reg: &ColorantRegistry,
    pc: &ClientColor,
    gs: &GraphicsState,
) -> Result<Option<DeviceColor>> {
    let Some(table) = gs.icc_manager().named() else {
        return Ok(None);
    };
    if !reg.named_supported() {
        return Ok(None);
    }
    let profile = gs.device().profile()?;
    let values = table.transform(reg.names(), pc.as_slice(), &profile)?;
    let fracs: smallvec::SmallVec<[Frac; 8]> = values.iter().map(|&v| Frac::from_unit(v)).collect();
    let procs = gs.cmap_procs();
    if procs.is_capture() {
        let mut dc = DeviceColor::default();
        procs.map_devicen(&fracs, gs, &mut dc)?;
        Ok(Some(dc))
    } else {
        Ok(Some(direct_device_color(&fracs, gs)))
    }
}
