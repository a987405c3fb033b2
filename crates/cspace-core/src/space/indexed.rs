//! Indexed spaces: a lookup table into a base space

use crate::color::{ClientColor, ConcreteColor};
use crate::gstate::GraphicsState;
use crate::{Error, Result};

use super::{ColorSpace, Family, SpaceType};

/// Largest permitted `hival`
pub const MAX_HIVAL: u32 = 4095;

#[derive(Debug, Clone)]
pub struct Indexed {
    hival: u32,
    table: Vec<u8>,
    base_comps: usize,
}

impl Indexed {
    pub(super) fn new(base: &ColorSpace, hival: u32, table: &[u8]) -> Result<Self> {
        if matches!(base.space_type(), SpaceType::Indexed | SpaceType::Pattern) {
            return Err(Error::range(format!(
                "{:?} cannot be the base of an Indexed space",
                base.space_type()
            )));
        }
        if hival > MAX_HIVAL {
            return Err(Error::range(format!("hival {} exceeds {}", hival, MAX_HIVAL)));
        }
        let base_comps = base.num_components();
        let expected = (hival as usize + 1) * base_comps;
        if table.len() != expected {
            return Err(Error::range(format!(
                "lookup table has {} bytes, expected {}",
                table.len(),
                expected
            )));
        }
        let mut owned = Vec::new();
        owned.try_reserve_exact(table.len())?;
        owned.extend_from_slice(table);
        Ok(Self {
            hival,
            table: owned,
            base_comps,
        })
    }

    pub fn hival(&self) -> u32 {
        self.hival
    }

    pub fn table(&self) -> &[u8] {
        &self.table
    }

    pub(super) fn restrict(&self, pc: &mut ClientColor) {
        if let Some(v) = pc.values.first_mut() {
            *v = if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, self.hival as f32).floor()
            };
        }
    }

    /// Base-space client color for entry `index`
    pub fn lookup(&self, base: &ColorSpace, index: usize) -> ClientColor {
        let index = index.min(self.hival as usize);
        let entry = &self.table[index * self.base_comps..(index + 1) * self.base_comps];
        let values = entry.iter().enumerate().map(|(i, &b)| {
            let unit = b as f32 / 255.0;
            match base.family() {
                Family::Cie(p) => {
                    let (lo, hi) = p.ranges[i];
                    lo + unit * (hi - lo)
                }
                _ => unit,
            }
        });
        ClientColor {
            values: values.collect(),
        }
    }

    pub(super) fn concretize(
        &self,
        space: &ColorSpace,
        pc: &ClientColor,
        gs: &GraphicsState,
    ) -> Result<ConcreteColor> {
        let base = space.require_base()?;
        let index = pc.values.first().copied().unwrap_or(0.0).max(0.0) as usize;
        let color = self.lookup(&base, index);
        base.concretize(&color, gs)
    }
}
