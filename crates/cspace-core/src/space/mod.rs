//! Color spaces
//!
//! A `ColorSpace` is shared through `Arc` and never changes shape after
//! construction. Composite families own a reference to their base space;
//! the graph is acyclic because a base must exist before the space that
//! refers to it. Installation, concretization and remapping dispatch on the
//! closed `Family` enum.

mod cie;
mod devicen;
mod icc;
mod indexed;
mod process;
mod separation;

pub use cie::{CieKind, CieParams};
pub use indexed::Indexed;
pub use separation::Separation;
pub use devicen::DeviceN;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::cmap::ColorMapProcs;
use crate::color::{ClientColor, ConcreteColor, DeviceColor};
use crate::device::Polarity;
use crate::frac::Frac;
use crate::function::TintTransform;
use crate::gstate::GraphicsState;
use crate::profile::{DataSpace, IccProfile};
use crate::registry::{Classification, ColorantRegistry};
use crate::transform::{IccLink, convert};
use crate::{Error, Result};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity. Only uniqueness matters.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Family index, also the serialization tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceType {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CieDefg,
    CieDef,
    CieAbc,
    CieA,
    Separation,
    DeviceN,
    Indexed,
    Pattern,
    IccBased,
}

impl SpaceType {
    pub fn tag(self) -> u32 {
        match self {
            Self::DeviceGray => 0,
            Self::DeviceRgb => 1,
            Self::DeviceCmyk => 2,
            Self::CieDefg => 3,
            Self::CieDef => 4,
            Self::CieAbc => 5,
            Self::CieA => 6,
            Self::Separation => 7,
            Self::DeviceN => 8,
            Self::Indexed => 9,
            Self::Pattern => 10,
            Self::IccBased => 11,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            0 => Self::DeviceGray,
            1 => Self::DeviceRgb,
            2 => Self::DeviceCmyk,
            3 => Self::CieDefg,
            4 => Self::CieDef,
            5 => Self::CieAbc,
            6 => Self::CieA,
            7 => Self::Separation,
            8 => Self::DeviceN,
            9 => Self::Indexed,
            10 => Self::Pattern,
            11 => Self::IccBased,
            _ => return None,
        })
    }

    /// Whether a space of this type may serve as a Separation/DeviceN alternate
    pub fn can_be_alternate(self) -> bool {
        !matches!(
            self,
            Self::Separation | Self::DeviceN | Self::Indexed | Self::Pattern
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Family {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    Separation(Separation),
    DeviceN(DeviceN),
    Indexed(Indexed),
    IccBased,
    Cie(CieParams),
    Pattern,
}

#[derive(Debug)]
pub struct ColorSpace {
    id: u64,
    family: Family,
    base: RwLock<Option<Arc<ColorSpace>>>,
    icc: RwLock<Option<Arc<IccProfile>>>,
    icc_equivalent: RwLock<Option<Arc<ColorSpace>>>,
}

impl ColorSpace {
    fn build(family: Family, base: Option<Arc<ColorSpace>>, icc: Option<Arc<IccProfile>>) -> Self {
        Self {
            id: next_id(),
            family,
            base: RwLock::new(base),
            icc: RwLock::new(icc),
            icc_equivalent: RwLock::new(None),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn space_type(&self) -> SpaceType {
        match &self.family {
            Family::DeviceGray => SpaceType::DeviceGray,
            Family::DeviceRgb => SpaceType::DeviceRgb,
            Family::DeviceCmyk => SpaceType::DeviceCmyk,
            Family::Separation(_) => SpaceType::Separation,
            Family::DeviceN(_) => SpaceType::DeviceN,
            Family::Indexed(_) => SpaceType::Indexed,
            Family::IccBased => SpaceType::IccBased,
            Family::Cie(p) => p.kind.space_type(),
            Family::Pattern => SpaceType::Pattern,
        }
    }

    pub fn num_components(&self) -> usize {
        match &self.family {
            Family::DeviceGray => 1,
            Family::DeviceRgb => 3,
            Family::DeviceCmyk => 4,
            Family::Separation(_) => 1,
            Family::DeviceN(d) => d.registry.len(),
            Family::Indexed(_) => 1,
            Family::IccBased => self.icc_profile().map_or(0, |p| p.num_comps()),
            Family::Cie(p) => p.kind.num_components(),
            Family::Pattern => self.base_space().map_or(0, |b| b.num_components()),
        }
    }

    pub fn base_space(&self) -> Option<Arc<ColorSpace>> {
        self.base.read().clone()
    }

    pub fn icc_profile(&self) -> Option<Arc<IccProfile>> {
        self.icc.read().clone()
    }

    /// ICC space standing in for a CIE space, once one has been synthesized
    pub fn icc_equivalent(&self) -> Option<Arc<ColorSpace>> {
        self.icc_equivalent.read().clone()
    }

    pub(crate) fn family(&self) -> &Family {
        &self.family
    }

    /// Colorant data for Separation and DeviceN spaces
    pub fn registry(&self) -> Option<&ColorantRegistry> {
        match &self.family {
            Family::Separation(s) => Some(&s.registry),
            Family::DeviceN(d) => Some(&d.registry),
            _ => None,
        }
    }

    pub fn cie_params(&self) -> Option<&CieParams> {
        match &self.family {
            Family::Cie(p) => Some(p),
            _ => None,
        }
    }

    pub fn indexed(&self) -> Option<&Indexed> {
        match &self.family {
            Family::Indexed(ix) => Some(ix),
            _ => None,
        }
    }

    pub fn separation_type(&self) -> Option<crate::component_map::SepType> {
        match &self.family {
            Family::Separation(s) => Some(s.sep_type()),
            _ => None,
        }
    }

    pub fn colorant_names(&self) -> Option<&[String]> {
        self.registry().map(|r| r.names())
    }

    pub fn classification(&self) -> Option<Classification> {
        self.registry().and_then(|r| r.classification())
    }

    pub fn polarity(&self) -> Polarity {
        match &self.family {
            Family::DeviceGray | Family::DeviceRgb => Polarity::Additive,
            Family::DeviceCmyk => Polarity::Subtractive,
            // DeviceN stays subtractive even over an additive alternate
            Family::Separation(_) | Family::DeviceN(_) => Polarity::Subtractive,
            Family::Indexed(_) => self.base_space().map_or(Polarity::Unknown, |b| b.polarity()),
            Family::IccBased => match self.icc_profile().map(|p| p.data_space()) {
                Some(DataSpace::Cmyk | DataSpace::NChannel) => Polarity::Subtractive,
                Some(_) => Polarity::Additive,
                None => Polarity::Unknown,
            },
            Family::Cie(p) if p.kind == CieKind::Defg => Polarity::Subtractive,
            Family::Cie(_) => Polarity::Additive,
            Family::Pattern => Polarity::Unknown,
        }
    }

    pub fn initial_color(&self) -> ClientColor {
        match &self.family {
            Family::DeviceCmyk => ClientColor::new(&[0.0, 0.0, 0.0, 1.0]),
            Family::Separation(_) | Family::DeviceN(_) => {
                ClientColor::splat(self.num_components(), 1.0)
            }
            Family::IccBased => icc::initial_color(self),
            Family::Cie(p) => p.initial_color(),
            _ => ClientColor::splat(self.num_components(), 0.0),
        }
    }

    /// Clamp every component into its legal domain
    pub fn restrict(&self, pc: &mut ClientColor) {
        let n = self.num_components();
        pc.values.resize(n, 0.0);
        match &self.family {
            Family::Indexed(ix) => ix.restrict(pc),
            Family::IccBased => icc::restrict(self, pc),
            Family::Cie(p) => p.restrict(pc),
            Family::Pattern => {
                if let Some(base) = self.base_space() {
                    base.restrict(pc);
                }
            }
            _ => {
                for v in pc.values.iter_mut() {
                    *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
                }
            }
        }
    }

    /// Whether this Separation/DeviceN space currently routes through its alternate
    pub fn uses_alternate(&self, gs: &GraphicsState) -> bool {
        match self.registry() {
            Some(reg) => gs.component_map.uses_alternate(self.id, reg.use_alt()),
            None => false,
        }
    }

    /// The space whose `remap_concrete` consumes this space's concrete colors
    pub fn concrete_space(self: &Arc<Self>, gs: &GraphicsState) -> Result<Arc<ColorSpace>> {
        match &self.family {
            Family::Separation(_) | Family::DeviceN(_) => {
                if self.uses_alternate(gs) {
                    self.require_base()?.concrete_space(gs)
                } else {
                    Ok(self.clone())
                }
            }
            Family::Indexed(_) => self.require_base()?.concrete_space(gs),
            Family::Cie(_) => self.cie_equivalent(gs).concrete_space(gs),
            Family::Pattern => Err(Error::Undefined("pattern spaces have no concrete space".into())),
            _ => Ok(self.clone()),
        }
    }

    /// Client color to device-independent concrete fractions
    pub fn concretize(&self, pc: &ClientColor, gs: &GraphicsState) -> Result<ConcreteColor> {
        match &self.family {
            Family::DeviceGray | Family::DeviceRgb | Family::DeviceCmyk | Family::IccBased => {
                Ok(ConcreteColor::from_unit(&pc.values[..pc.len().min(self.num_components())]))
            }
            Family::Separation(s) => s.concretize(self, pc, gs),
            Family::DeviceN(d) => d.concretize(self, pc, gs),
            Family::Indexed(ix) => ix.concretize(self, pc, gs),
            Family::Cie(p) => {
                let mut values = pc.clone();
                p.rescale(&mut values);
                self.cie_equivalent(gs).concretize(&values, gs)
            }
            Family::Pattern => Err(Error::range("pattern colors cannot be concretized")),
        }
    }

    /// Concrete fractions to a device color
    pub fn remap_concrete(&self, conc: &ConcreteColor, gs: &GraphicsState) -> Result<DeviceColor> {
        match &self.family {
            Family::DeviceGray | Family::DeviceRgb | Family::DeviceCmyk => {
                process::remap_concrete(self, conc, gs)
            }
            Family::IccBased => {
                let profile = self
                    .icc_profile()
                    .ok_or_else(|| Error::Profile("ICC space without profile".into()))?;
                remap_through_profile(&profile, &conc.to_unit(), gs)
            }
            Family::Separation(s) => s.remap_concrete(self, conc, gs),
            Family::DeviceN(d) => d.remap_concrete(self, conc, gs),
            Family::Indexed(_) => self.require_base()?.remap_concrete(conc, gs),
            Family::Cie(_) => self.cie_equivalent(gs).remap_concrete(conc, gs),
            Family::Pattern => Err(Error::range("pattern colors cannot be remapped")),
        }
    }

    /// Client color to device color, recording the client color in the result
    pub fn remap(self: &Arc<Self>, pc: &ClientColor, gs: &GraphicsState) -> Result<DeviceColor> {
        match &self.family {
            Family::Separation(s) => s.remap(self, pc, gs),
            Family::DeviceN(d) => d.remap(self, pc, gs),
            Family::IccBased => icc::remap(self, pc, gs),
            Family::Pattern => {
                let mut dc = DeviceColor::default();
                dc.snapshot(pc, self.id);
                Ok(dc)
            }
            _ => self.remap_default(pc, gs),
        }
    }

    pub(crate) fn remap_default(self: &Arc<Self>, pc: &ClientColor, gs: &GraphicsState) -> Result<DeviceColor> {
        let conc = self.concretize(pc, gs)?;
        let concrete = self.concrete_space(gs)?;
        let mut dc = concrete.remap_concrete(&conc, gs)?;
        dc.snapshot(pc, self.id);
        Ok(dc)
    }

    /// Make this the active paint space: rebuild the component map and
    /// attach profiles
    pub fn install(self: &Arc<Self>, gs: &mut GraphicsState) -> Result<()> {
        match &self.family {
            Family::DeviceGray | Family::DeviceRgb | Family::DeviceCmyk => {
                process::install(self, gs);
                Ok(())
            }
            Family::Separation(s) => s.install(self, gs),
            Family::DeviceN(d) => d.install(self, gs),
            Family::Indexed(_) => self.require_base()?.install(gs),
            Family::IccBased => icc::install(self, gs),
            Family::Cie(_) => {
                self.cie_equivalent(gs);
                Ok(())
            }
            Family::Pattern => match self.base_space() {
                Some(base) => base.install(gs),
                None => Ok(()),
            },
        }
    }

    /// Compute and push the overprint record for painting in this space
    pub fn set_overprint(self: &Arc<Self>, gs: &mut GraphicsState) -> Result<()> {
        use crate::overprint::{set_cmyk_overprint, set_spot_colors_overprint};
        match &self.family {
            Family::DeviceCmyk => set_cmyk_overprint(gs, self.id, self.icc_profile().as_ref()),
            Family::Separation(s) => s.set_overprint(self, gs),
            Family::DeviceN(d) => d.set_overprint(self, gs),
            Family::IccBased => icc::set_overprint(self, gs),
            Family::Indexed(_) => self.require_base()?.set_overprint(gs),
            _ => set_spot_colors_overprint(gs),
        }
    }

    /// Replace the tint transform of a Separation or DeviceN space
    pub fn set_tint_transform(&self, t: TintTransform) -> Result<()> {
        let reg = self
            .registry()
            .ok_or_else(|| Error::range("only Separation and DeviceN spaces have tint transforms"))?;
        let base = self.require_base()?;
        reg.set_transform(t, base.num_components())
    }

    /// Bind a Separation space to one colorant of this DeviceN space
    pub fn attach_colorant(&self, name: &str, target: Arc<ColorSpace>) -> Result<()> {
        let Family::DeviceN(d) = &self.family else {
            return Err(Error::range("colorants can only be attached to DeviceN spaces"));
        };
        if target.space_type() != SpaceType::Separation {
            return Err(Error::range("attached colorant spaces must be Separation spaces"));
        }
        if !d.registry.names().iter().any(|n| n == name) {
            return Err(Error::range(format!("{} is not a colorant of this space", name)));
        }
        d.registry.attach(name, target);
        Ok(())
    }

    /// Copy with the same identity. Used to route a clone through its
    /// alternate without touching the original.
    pub fn duplicate(&self) -> ColorSpace {
        Self {
            id: self.id,
            family: self.family.clone(),
            base: RwLock::new(self.base_space()),
            icc: RwLock::new(self.icc_profile()),
            icc_equivalent: RwLock::new(self.icc_equivalent.read().clone()),
        }
    }

    /// Release owned references. Runs on drop; repeated calls do nothing.
    pub fn finalize(&self) {
        let base = self.base.write().take();
        let icc = self.icc.write().take();
        let equivalent = self.icc_equivalent.write().take();
        if let Some(reg) = self.registry() {
            reg.finalize();
        }
        if base.is_some() || icc.is_some() || equivalent.is_some() {
            trace!(id = self.id, "color space finalized");
        }
    }

    fn require_base(&self) -> Result<Arc<ColorSpace>> {
        self.base_space()
            .ok_or_else(|| Error::Undefined(format!("{:?} space has no base", self.space_type())))
    }

    fn is_lab(&self) -> bool {
        matches!(self.family, Family::IccBased) && self.icc_profile().is_some_and(|p| p.is_lab())
    }

    /// ICC equivalent of a CIE space, created on first use
    pub(crate) fn cie_equivalent(&self, gs: &GraphicsState) -> Arc<ColorSpace> {
        if let Some(eq) = self.icc_equivalent.read().clone() {
            return eq;
        }
        let mut slot = self.icc_equivalent.write();
        if let Some(eq) = slot.clone() {
            return eq;
        }
        let profile = match &self.family {
            Family::Cie(p) => p.equivalent_profile(gs.icc_manager()),
            _ => gs.icc_manager().default_rgb(),
        };
        let eq = Arc::new(ColorSpace::build(Family::IccBased, None, Some(profile)));
        trace!(id = self.id, equivalent = eq.id, "created ICC equivalent");
        *slot = Some(eq.clone());
        eq
    }

    /// Alternate-space concretization shared by Separation and DeviceN
    pub(crate) fn concretize_alternate(
        &self,
        reg: &ColorantRegistry,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<ConcreteColor> {
        if let Some(hit) = reg.cached(pc) {
            trace!(id = self.id, "tint cache hit");
            return Ok(hit);
        }
        let base = self.require_base()?;
        let mut alt = reg.evaluate(pc, base.num_components())?;
        base.restrict(&mut alt);
        let mut target = base.clone();
        let mut rescaled = false;
        if let Family::Cie(p) = &base.family {
            rescaled = p.rescale(&mut alt);
            target = base.cie_equivalent(gs);
        }
        if !rescaled && target.is_lab() {
            icc::normalize_lab(&mut alt);
        }
        let conc = target.concretize(&alt, gs)?;
        reg.store(pc, &conc);
        Ok(conc)
    }
}

impl Drop for ColorSpace {
    fn drop(&mut self) {
        self.finalize();
    }
}

/// Convert normalized values from `profile` to the device output profile
/// and hand the result to the mapping procedures
pub(crate) fn remap_through_profile(
    profile: &Arc<IccProfile>,
    values: &[f32],
    gs: &GraphicsState,
) -> Result<DeviceColor> {
    let dev_profile = gs.device().profile()?;
    let link = IccLink::new(profile.clone(), dev_profile.output.clone(), gs.options().intent)?;
    let out = convert(&link, values)?;
    let procs: &dyn ColorMapProcs = gs.cmap_procs().as_ref();
    let mut dc = DeviceColor::default();
    let f = |i: usize| Frac::from_unit(out.get(i).copied().unwrap_or(0.0));
    match dev_profile.output.data_space() {
        DataSpace::Gray => procs.map_gray(f(0), gs, &mut dc)?,
        DataSpace::Rgb => procs.map_rgb([f(0), f(1), f(2)], gs, &mut dc)?,
        DataSpace::Cmyk => procs.map_cmyk([f(0), f(1), f(2), f(3)], gs, &mut dc)?,
        _ => {
            let fracs: smallvec::SmallVec<[Frac; 8]> = out.iter().map(|&v| Frac::from_unit(v)).collect();
            if procs.is_capture() {
                procs.map_devicen(&fracs, gs, &mut dc)?;
            } else {
                dc = direct_device_color(&fracs, gs);
            }
        }
    }
    Ok(dc)
}

/// Device color whose first colorants are `values`, zero beyond
pub(crate) fn direct_device_color(values: &[Frac], gs: &GraphicsState) -> DeviceColor {
    let n = gs.device().color_info().num_components;
    let mut out: smallvec::SmallVec<[Frac; 8]> = smallvec::SmallVec::from_elem(Frac::ZERO, n);
    for (o, v) in out.iter_mut().zip(values) {
        *o = *v;
    }
    DeviceColor::pure(out)
}

impl ColorSpace {
    pub fn device_gray() -> Arc<Self> {
        Arc::new(Self::build(Family::DeviceGray, None, None))
    }

    pub fn device_rgb() -> Arc<Self> {
        Arc::new(Self::build(Family::DeviceRgb, None, None))
    }

    pub fn device_cmyk() -> Arc<Self> {
        Arc::new(Self::build(Family::DeviceCmyk, None, None))
    }

    /// Separation space over `alternate`
    pub fn new_separation(
        name: &str,
        alternate: Arc<ColorSpace>,
        transform: Option<TintTransform>,
    ) -> Result<Arc<Self>> {
        check_alternate(&alternate)?;
        let registry = ColorantRegistry::new(&[name])?;
        if let Some(t) = transform {
            registry.set_transform(t, alternate.num_components())?;
        }
        let sep = Separation::new(registry, name);
        Ok(Arc::new(Self::build(Family::Separation(sep), Some(alternate), None)))
    }

    /// DeviceN space over `alternate`
    pub fn new_devicen(
        names: &[&str],
        alternate: Arc<ColorSpace>,
        transform: Option<TintTransform>,
    ) -> Result<Arc<Self>> {
        check_alternate(&alternate)?;
        let registry = ColorantRegistry::new(names)?;
        if let Some(t) = transform {
            registry.set_transform(t, alternate.num_components())?;
        }
        Ok(Arc::new(Self::build(
            Family::DeviceN(DeviceN { registry }),
            Some(alternate),
            None,
        )))
    }

    /// Indexed space with `hival + 1` entries of `base.num_components()` bytes
    pub fn new_indexed(base: Arc<ColorSpace>, hival: u32, table: &[u8]) -> Result<Arc<Self>> {
        let ix = Indexed::new(&base, hival, table)?;
        Ok(Arc::new(Self::build(Family::Indexed(ix), Some(base), None)))
    }

    /// ICC-based space with an optional alternate
    pub fn new_icc(profile: Arc<IccProfile>, alternate: Option<Arc<ColorSpace>>) -> Result<Arc<Self>> {
        if profile.num_comps() == 0 {
            return Err(Error::range("ICC profile without components"));
        }
        if let Some(alt) = &alternate {
            if alt.num_components() != profile.num_comps() {
                return Err(Error::range(format!(
                    "alternate has {} components, profile {}",
                    alt.num_components(),
                    profile.num_comps()
                )));
            }
        }
        Ok(Arc::new(Self::build(Family::IccBased, alternate, Some(profile))))
    }

    pub fn new_cie(params: CieParams) -> Result<Arc<Self>> {
        params.validate()?;
        Ok(Arc::new(Self::build(Family::Cie(params), None, None)))
    }

    /// Pattern space; `base` is the underlying space of uncolored patterns
    pub fn new_pattern(base: Option<Arc<ColorSpace>>) -> Result<Arc<Self>> {
        if base.as_ref().is_some_and(|b| b.space_type() == SpaceType::Pattern) {
            return Err(Error::range("pattern over pattern"));
        }
        Ok(Arc::new(Self::build(Family::Pattern, base, None)))
    }
}

fn check_alternate(alt: &ColorSpace) -> Result<()> {
    if alt.space_type().can_be_alternate() {
        Ok(())
    } else {
        Err(Error::range(format!(
            "{:?} cannot be an alternate space",
            alt.space_type()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique() {
        let a = ColorSpace::device_rgb();
        let b = ColorSpace::device_rgb();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.duplicate().id(), a.id());
    }

    #[test]
    fn test_tags_roundtrip() {
        for tag in 0..12 {
            assert_eq!(SpaceType::from_tag(tag).map(|t| t.tag()), Some(tag));
        }
        assert_eq!(SpaceType::from_tag(12), None);
    }

    #[test]
    fn test_alternate_rules() {
        let cmyk = ColorSpace::device_cmyk();
        let sep = ColorSpace::new_separation("Orange", cmyk.clone(), None).unwrap();
        assert!(matches!(
            ColorSpace::new_devicen(&["A"], sep, None),
            Err(Error::RangeCheck(_))
        ));
        let bad = TintTransform::callback(1, 3, |_, _| Ok(()));
        assert!(ColorSpace::new_separation("Orange", cmyk, Some(bad)).is_err());
    }

    #[test]
    fn test_polarity() {
        let cmyk = ColorSpace::device_cmyk();
        let rgb = ColorSpace::device_rgb();
        let devn = ColorSpace::new_devicen(&["A", "B"], rgb.clone(), None).unwrap();
        assert_eq!(rgb.polarity(), Polarity::Additive);
        assert_eq!(cmyk.polarity(), Polarity::Subtractive);
        assert_eq!(devn.polarity(), Polarity::Subtractive);
    }

    #[test]
    fn test_initial_colors() {
        let cmyk = ColorSpace::device_cmyk();
        assert_eq!(cmyk.initial_color().as_slice(), &[0.0, 0.0, 0.0, 1.0]);
        let devn = ColorSpace::new_devicen(&["A", "B"], cmyk, None).unwrap();
        assert_eq!(devn.initial_color().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_restrict_clamps() {
        let rgb = ColorSpace::device_rgb();
        let mut pc = ClientColor::new(&[-1.0, 0.5, 3.0]);
        rgb.restrict(&mut pc);
        assert_eq!(pc.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let cmyk = ColorSpace::device_cmyk();
        let sep = ColorSpace::new_separation("Orange", cmyk.clone(), None).unwrap();
        assert_eq!(Arc::strong_count(&cmyk), 2);
        sep.finalize();
        assert_eq!(Arc::strong_count(&cmyk), 1);
        sep.finalize();
        assert_eq!(Arc::strong_count(&cmyk), 1);
        drop(sep);
        assert_eq!(Arc::strong_count(&cmyk), 1);
    }

    #[test]
    fn test_attach_colorant() {
        let cmyk = ColorSpace::device_cmyk();
        let devn = ColorSpace::new_devicen(&["Orange", "Green"], cmyk.clone(), None).unwrap();
        let sep = ColorSpace::new_separation("Orange", cmyk.clone(), None).unwrap();
        devn.attach_colorant("Orange", sep.clone()).unwrap();
        assert!(devn.attach_colorant("Violet", sep.clone()).is_err());
        assert!(devn.attach_colorant("Green", cmyk.clone()).is_err());
        assert_eq!(Arc::strong_count(&sep), 2);
        devn.finalize();
        assert_eq!(Arc::strong_count(&sep), 1);
    }
}
