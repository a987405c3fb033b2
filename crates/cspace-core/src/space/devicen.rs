//! DeviceN spaces: an ordered list of named colorants

use std::sync::Arc;

use tracing::debug;

use crate::color::{ClientColor, ConcreteColor, DeviceColor};
use crate::component_map::NameCheck;
use crate::gstate::GraphicsState;
use crate::overprint::{set_cmyk_overprint, set_colorant_overprint, set_no_overprint};
use crate::registry::{ColorantRegistry, classify};
use crate::Result;

use super::separation::remap_named;
use super::{ColorSpace, SpaceType};

#[derive(Debug, Clone)]
pub struct DeviceN {
    pub(crate) registry: ColorantRegistry,
}

/// Reorder a client color into the channel order of an N-channel profile
pub(crate) fn permute(pc: &ClientColor, permutation: Option<&[usize]>) -> ClientColor {
    match permutation {
        Some(p) => ClientColor {
            values: p
                .iter()
                .map(|&i| pc.values.get(i).copied().unwrap_or(0.0))
                .collect(),
        },
        None => pc.clone(),
    }
}

/// The N-channel ICC base installed in place of the alternate, if any
fn nclr_base(space: &ColorSpace) -> Option<Arc<ColorSpace>> {
    let profile = space.icc_profile()?;
    let base = space.base_space()?;
    let matches = base.space_type() == SpaceType::IccBased
        && base.icc_profile().is_some_and(|p| p.same_as(&profile));
    matches.then_some(base)
}

impl DeviceN {
    pub fn names(&self) -> &[String] {
        self.registry.names()
    }

    pub(super) fn concretize(
        &self,
        space: &ColorSpace,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<ConcreteColor> {
        if !space.uses_alternate(gs) {
            let n = self.registry.len().min(pc.len());
            return Ok(ConcreteColor::from_unit(&pc.values[..n]));
        }
        if let Some(base) = nclr_base(space) {
            let permuted = permute(pc, self.registry.permutation().as_deref());
            return base.concretize(&permuted, gs);
        }
        space.concretize_alternate(&self.registry, pc, gs)
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
        let mut dc = DeviceColor::default();
        let procs = gs.cmap_procs();
        match gs.device().profile()?.spot_names {
            Some(spots) => {
                // Colorants go straight to the device; spot equivalents must not fold them again
                let saved = spots.equiv_cmyk_set();
                spots.set_equiv_cmyk(false);
                let result = procs.map_devicen(conc.as_slice(), gs, &mut dc);
                spots.set_equiv_cmyk(saved);
                result?;
            }
            None => procs.map_devicen(conc.as_slice(), gs, &mut dc)?,
        }
        Ok(dc)
    }

    pub(super) fn remap(
        &self,
        space: &Arc<ColorSpace>,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<DeviceColor> {
        if let Some(base) = nclr_base(space).filter(|_| space.uses_alternate(gs)) {
            let permuted = permute(pc, self.registry.permutation().as_deref());
            let mut dc = base.remap(&permuted, gs)?;
            dc.snapshot(pc, space.id);
            return Ok(dc);
        }
        match remap_named(&self.registry, pc, gs)? {
            Some(mut dc) => {
                dc.snapshot(pc, space.id);
                Ok(dc)
            }
            None => space.remap_default(pc, gs),
        }
    }

    pub(super) fn install(&self, space: &Arc<ColorSpace>, gs: &mut GraphicsState) -> Result<()> {
        let names = self.registry.names();
        let dev = gs.device().clone();
        let named_table = gs.icc_manager().named().cloned();
        let named = named_table.as_ref().is_some_and(|t| t.supports(names));
        let check = gs
            .component_map
            .check_devicen_names(space.id, names, dev.as_ref(), named);
        if check == NameCheck::AllNone {
            self.registry.set_all_none(true);
        }
        if named_table.is_some() {
            self.registry.set_named_supported(named);
        }
        let classification = classify(names);
        self.registry.set_classification(classification);
        gs.component_map.classification = Some(classification);
        if named {
            self.registry.set_use_alt(false);
            debug!(id = space.id, ?classification, "installed DeviceN through named colors");
            return Ok(());
        }

        if gs.icc_manager().has_devicen_profiles() {
            let found = gs.icc_manager().find_devicen_profile(names);
            let (profile, permutation) = match found {
                Some(m) => (Some(m.profile), m.permutation),
                None => (None, None),
            };
            *space.icc.write() = profile;
            self.registry.set_permutation(permutation);
        }

        let use_alt = gs.component_map.use_alternate;
        self.registry.set_use_alt(use_alt);
        debug!(
            id = space.id,
            colorants = names.len(),
            use_alt,
            ?classification,
            nclr = space.icc_profile().is_some(),
            "installed DeviceN"
        );
        if use_alt {
            match space.icc_profile() {
                None => space.require_base()?.install(gs)?,
                Some(profile) => {
                    let nclr = ColorSpace::new_icc(profile, None)?;
                    *space.base.write() = Some(nclr);
                    self.registry.invalidate_cache();
                }
            }
        }
        dev.update_spot_equivalent_colors(gs, space)
    }

    pub(super) fn set_overprint(&self, space: &ColorSpace, gs: &mut GraphicsState) -> Result<()> {
        let dev = gs.device().clone();
        let named = self.registry.named_supported();
        gs.component_map
            .check_devicen_names(space.id, self.registry.names(), dev.as_ref(), named);
        gs.component_map.classification = self.registry.classification();
        if gs.component_map.use_alternate {
            let base = space.require_base()?;
            return if base.space_type() == SpaceType::DeviceCmyk {
                set_cmyk_overprint(gs, base.id, base.icc_profile().as_ref())
            } else {
                set_no_overprint(gs)
            };
        }
        let retain = gs.overprint_enabled();
        let drawn = gs.component_map.drawn_mask();
        set_colorant_overprint(gs, retain, drawn)
    }
}
