//! Named-color replacement
//!
//! A table of colorant names with Lab values. When every colorant of a
//! space is known, the device color is computed from the table instead of
//! the tint transform.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::pcs::LAB_WHITE;
use crate::profile::{DeviceProfile, IccProfile};
use crate::registry::is_process_name;
use crate::transform::{IccLink, convert};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct NamedColorTable {
    entries: Vec<(String, [f32; 3])>,
    lab: Option<Arc<IccProfile>>,
}

impl NamedColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named color with its Lab value
    pub fn with_color(mut self, name: impl Into<String>, lab: [f32; 3]) -> Self {
        let name = name.into();
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, lab));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<[f32; 3]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, lab)| *lab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every colorant other than "None"/"All" is in the table and
    /// at least one of them is a spot colorant
    pub fn supports(&self, names: &[String]) -> bool {
        let mut spots = 0;
        for name in names {
            if name == "None" || name == "All" {
                continue;
            }
            if self.lookup(name).is_none() {
                return false;
            }
            if !is_process_name(name) {
                spots += 1;
            }
        }
        spots > 0
    }

    /// Blend the named Lab values by tint over white and convert to the
    /// device output profile. The result has one value per output channel.
    pub fn transform(
        &self,
        names: &[String],
        tints: &[f32],
        profile: &DeviceProfile,
    ) -> Result<SmallVec<[f32; 8]>> {
        let mut lab = LAB_WHITE;
        for (name, &tint) in names.iter().zip(tints) {
            if name == "None" {
                continue;
            }
            let named = self
                .lookup(name)
                .ok_or_else(|| Error::Undefined(format!("named color {}", name)))?;
            let t = tint.clamp(0.0, 1.0);
            for (v, n) in lab.iter_mut().zip(named) {
                *v = n * t + *v * (1.0 - t);
            }
        }
        let src = self
            .lab
            .clone()
            .unwrap_or_else(|| Arc::new(IccProfile::lab()));
        let link = IccLink::new(src, profile.output.clone(), profile.intent)?;
        let normalized = [
            lab[0] / 100.0,
            (lab[1] + 128.0) / 255.0,
            (lab[2] + 128.0) / 255.0,
        ];
        convert(&link, &normalized)
    }

    pub(crate) fn with_lab_profile(mut self, lab: Arc<IccProfile>) -> Self {
        self.lab = Some(lab);
        self
    }
}
