//! Per-install colorant to device-index mapping
//!
//! The map is rebuilt from scratch every time a Separation or DeviceN
//! space is installed or its overprint state is recomputed. It is tagged
//! with the identity of the space it was built for.

use smallvec::SmallVec;
use tracing::debug;

use crate::device::{ColorantLookup, Device, Polarity, SpecOp};
use crate::registry::Classification;

/// Kind of Separation colorant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SepType {
    /// "None": paints nothing
    None,
    /// "All": paints every device colorant
    All,
    /// A named colorant
    #[default]
    Other,
}

impl SepType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "None" => Self::None,
            "All" => Self::All,
            _ => Self::Other,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::Other => 2,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::All),
            2 => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorComponentMap {
    pub num_components: usize,
    pub num_colorants: usize,
    /// Identity of the space this map was built for
    pub space_id: Option<u64>,
    /// Device colorant per logical component; `None` if not native
    pub color_map: SmallVec<[Option<usize>; 8]>,
    pub use_alternate: bool,
    pub sep_type: SepType,
    pub classification: Option<Classification>,
}

/// Outcome of matching colorant names against a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck {
    Mapped,
    /// Every colorant was "None"
    AllNone,
}

impl ColorComponentMap {
    fn reset(&mut self, space_id: u64, num_components: usize, dev: &dyn Device) {
        self.num_components = num_components;
        self.num_colorants = dev.color_info().num_components;
        self.space_id = Some(space_id);
        self.color_map.clear();
        self.color_map.resize(num_components, None);
        self.use_alternate = false;
        self.sep_type = SepType::Other;
        self.classification = None;
    }

    /// Whether `space_id` should route through its alternate space.
    /// Falls back to the space's own flag when the map was built for a
    /// different space.
    pub fn uses_alternate(&self, space_id: u64, own_flag: bool) -> bool {
        if self.space_id == Some(space_id) {
            self.use_alternate
        } else {
            debug!(space_id, map_space = ?self.space_id, "color space id mismatch");
            own_flag
        }
    }

    /// Point the map at a space and force the alternate route
    pub fn force_alternate(&mut self, space_id: u64, num_components: usize) {
        self.num_components = num_components;
        self.space_id = Some(space_id);
        self.color_map.clear();
        self.color_map.resize(num_components, None);
        self.use_alternate = true;
    }

    /// Identity map over the first `n` device colorants
    pub fn identity(space_id: u64, n: usize, num_colorants: usize) -> Self {
        Self {
            num_components: n,
            num_colorants,
            space_id: Some(space_id),
            color_map: (0..n).map(Some).collect(),
            ..Default::default()
        }
    }

    /// Mask of mapped device colorants
    pub fn drawn_mask(&self) -> u64 {
        self.color_map
            .iter()
            .flatten()
            .filter(|&&i| i < 64)
            .fold(0, |m, &i| m | (1u64 << i))
    }

    /// Rebuild the map for a DeviceN colorant list
    pub fn check_devicen_names(
        &mut self,
        space_id: u64,
        names: &[String],
        dev: &dyn Device,
        named_supported: bool,
    ) -> NameCheck {
        self.reset(space_id, names.len(), dev);
        if named_supported {
            return NameCheck::Mapped;
        }
        let info = dev.color_info();
        if info.polarity == Polarity::Additive
            && (!dev.spec_op(SpecOp::SupportsDeviceN)
                || (!dev.spec_op(SpecOp::IsPdf14Device)
                    && !dev.spec_op(SpecOp::SupportsAdditiveSpots)))
        {
            self.use_alternate = true;
            return NameCheck::Mapped;
        }
        let mut non_match = false;
        let mut none_count = 0;
        for (slot, name) in self.color_map.iter_mut().zip(names) {
            match dev.colorant_index(name) {
                ColorantLookup::Index(i) => *slot = Some(i),
                ColorantLookup::Ignored => *slot = None,
                ColorantLookup::Unknown if name == "None" => {
                    *slot = None;
                    none_count += 1;
                }
                ColorantLookup::Unknown => non_match = true,
            }
        }
        self.use_alternate = non_match;
        if none_count == names.len() {
            NameCheck::AllNone
        } else {
            NameCheck::Mapped
        }
    }

    /// Rebuild the map for a single Separation colorant
    pub fn check_separation_name(
        &mut self,
        space_id: u64,
        name: &str,
        sep_type: SepType,
        dev: &dyn Device,
        named_supported: bool,
    ) {
        self.reset(space_id, 1, dev);
        self.sep_type = sep_type;
        if sep_type != SepType::Other || named_supported {
            return;
        }
        let info = dev.color_info();
        if !(dev.spec_op(SpecOp::SupportsDeviceN) && dev.spec_op(SpecOp::IsPdf14Device))
            && info.polarity == Polarity::Additive
        {
            self.use_alternate = true;
            return;
        }
        match dev.colorant_index(name) {
            ColorantLookup::Index(i) if i < info.max_components => {
                self.color_map[0] = Some(i);
            }
            _ => self.use_alternate = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ColorInfo, ProcessModel};
    use crate::frac::Frac;
    use crate::profile::{DeviceProfile, IccProfile};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Dev {
        model: ProcessModel,
        spots: Vec<&'static str>,
        devn: bool,
    }

    impl Device for Dev {
        fn color_info(&self) -> ColorInfo {
            ColorInfo {
                polarity: self.model.polarity(),
                num_components: self.model.num_components() + self.spots.len(),
                max_components: 64,
                process_model: self.model,
            }
        }
        fn colorant_index(&self, name: &str) -> ColorantLookup {
            let process = self.model.colorant_names();
            if let Some(i) = process.iter().position(|n| *n == name) {
                return ColorantLookup::Index(i);
            }
            match self.spots.iter().position(|n| *n == name) {
                Some(i) => ColorantLookup::Index(process.len() + i),
                None if name == "Ignored" => ColorantLookup::Ignored,
                None => ColorantLookup::Unknown,
            }
        }
        fn map_gray(&self, _gray: Frac, _out: &mut [Frac]) {}
        fn profile(&self) -> crate::Result<DeviceProfile> {
            Ok(DeviceProfile::new(Arc::new(IccProfile::default_cmyk())))
        }
        fn spec_op(&self, op: SpecOp) -> bool {
            op == SpecOp::SupportsDeviceN && self.devn
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn cmyk_dev() -> Dev {
        Dev {
            model: ProcessModel::Cmyk,
            spots: vec!["Orange"],
            devn: true,
        }
    }

    #[test]
    fn test_native_mapping() {
        let mut map = ColorComponentMap::default();
        let r = map.check_devicen_names(7, &names(&["Orange", "Cyan", "None"]), &cmyk_dev(), false);
        assert_eq!(r, NameCheck::Mapped);
        assert!(!map.use_alternate);
        assert_eq!(map.color_map.as_slice(), &[Some(4), Some(0), None]);
        assert_eq!(map.space_id, Some(7));
        assert_eq!(map.drawn_mask(), 0b10001);
    }

    #[test]
    fn test_unknown_name_forces_alternate() {
        let mut map = ColorComponentMap::default();
        map.check_devicen_names(1, &names(&["Orange", "Violet"]), &cmyk_dev(), false);
        assert!(map.use_alternate);
    }

    #[test]
    fn test_ignored_is_not_a_mismatch() {
        let mut map = ColorComponentMap::default();
        map.check_devicen_names(1, &names(&["Ignored", "Cyan"]), &cmyk_dev(), false);
        assert!(!map.use_alternate);
        assert_eq!(map.color_map[0], None);
    }

    #[test]
    fn test_all_none() {
        let mut map = ColorComponentMap::default();
        let r = map.check_devicen_names(1, &names(&["None", "None"]), &cmyk_dev(), false);
        assert_eq!(r, NameCheck::AllNone);
        assert!(!map.use_alternate);
    }

    #[test]
    fn test_additive_device_uses_alternate() {
        let dev = Dev {
            model: ProcessModel::Rgb,
            spots: vec!["Orange"],
            devn: true,
        };
        let mut map = ColorComponentMap::default();
        map.check_devicen_names(1, &names(&["Orange"]), &dev, false);
        assert!(map.use_alternate);
        map.check_separation_name(2, "Orange", SepType::Other, &dev, false);
        assert!(map.use_alternate);
        map.check_separation_name(2, "All", SepType::All, &dev, false);
        assert!(!map.use_alternate);
    }

    #[test]
    fn test_named_support_short_circuits() {
        let mut map = ColorComponentMap::default();
        map.check_devicen_names(1, &names(&["Violet"]), &cmyk_dev(), true);
        assert!(!map.use_alternate);
    }

    #[test]
    fn test_uses_alternate_falls_back_on_mismatch() {
        let mut map = ColorComponentMap::default();
        map.force_alternate(3, 1);
        assert!(map.uses_alternate(3, false));
        assert!(!map.uses_alternate(4, false));
    }
}
