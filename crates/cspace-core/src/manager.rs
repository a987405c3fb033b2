//! Profile manager
//!
//! Holds the default process profiles, the Lab profile, registered
//! N-channel profiles and the optional named-color table.

use std::sync::Arc;

use tracing::debug;

use crate::named::NamedColorTable;
use crate::profile::{DataSpace, IccProfile};
use crate::{Error, Result};

/// An N-channel profile matching a colorant set
#[derive(Debug, Clone)]
pub struct DeviceNProfileMatch {
    pub profile: Arc<IccProfile>,
    /// `permutation[j]` is the space colorant feeding profile channel `j`;
    /// `None` when the orders agree
    pub permutation: Option<Vec<usize>>,
}

#[derive(Debug, Clone)]
pub struct IccManager {
    default_gray: Arc<IccProfile>,
    default_rgb: Arc<IccProfile>,
    default_cmyk: Arc<IccProfile>,
    lab: Arc<IccProfile>,
    devicen: Vec<Arc<IccProfile>>,
    named: Option<Arc<NamedColorTable>>,
}

impl Default for IccManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IccManager {
    pub fn new() -> Self {
        Self {
            default_gray: Arc::new(IccProfile::default_gray()),
            default_rgb: Arc::new(IccProfile::default_rgb()),
            default_cmyk: Arc::new(IccProfile::default_cmyk()),
            lab: Arc::new(IccProfile::lab()),
            devicen: Vec::new(),
            named: None,
        }
    }

    pub fn with_default_gray(mut self, p: Arc<IccProfile>) -> Result<Self> {
        expect_space(&p, DataSpace::Gray)?;
        self.default_gray = p;
        Ok(self)
    }

    pub fn with_default_rgb(mut self, p: Arc<IccProfile>) -> Result<Self> {
        expect_space(&p, DataSpace::Rgb)?;
        self.default_rgb = p;
        Ok(self)
    }

    pub fn with_default_cmyk(mut self, p: Arc<IccProfile>) -> Result<Self> {
        expect_space(&p, DataSpace::Cmyk)?;
        self.default_cmyk = p;
        Ok(self)
    }

    pub fn with_lab(mut self, p: Arc<IccProfile>) -> Result<Self> {
        expect_space(&p, DataSpace::Lab)?;
        self.lab = p;
        Ok(self)
    }

    /// Register an N-channel profile for DeviceN spaces
    pub fn with_devicen_profile(mut self, p: Arc<IccProfile>) -> Result<Self> {
        if p.colorants().is_none() {
            return Err(Error::Profile(
                "DeviceN profiles must declare colorant names".into(),
            ));
        }
        self.devicen.push(p);
        Ok(self)
    }

    pub fn with_named_colors(mut self, table: NamedColorTable) -> Self {
        self.named = Some(Arc::new(table.with_lab_profile(self.lab.clone())));
        self
    }

    pub fn default_gray(&self) -> Arc<IccProfile> {
        self.default_gray.clone()
    }

    pub fn default_rgb(&self) -> Arc<IccProfile> {
        self.default_rgb.clone()
    }

    pub fn default_cmyk(&self) -> Arc<IccProfile> {
        self.default_cmyk.clone()
    }

    pub fn lab(&self) -> Arc<IccProfile> {
        self.lab.clone()
    }

    pub fn named(&self) -> Option<&Arc<NamedColorTable>> {
        self.named.as_ref()
    }

    pub fn has_devicen_profiles(&self) -> bool {
        !self.devicen.is_empty()
    }

    /// Find a registered N-channel profile with exactly this colorant set
    pub fn find_devicen_profile(&self, names: &[String]) -> Option<DeviceNProfileMatch> {
        for profile in &self.devicen {
            let Some(colorants) = profile.colorants() else {
                continue;
            };
            if colorants.len() != names.len() {
                continue;
            }
            let permutation: Option<Vec<usize>> = colorants
                .iter()
                .map(|c| names.iter().position(|n| n == c))
                .collect();
            let Some(permutation) = permutation else {
                continue;
            };
            let identity = permutation.iter().enumerate().all(|(j, &i)| i == j);
            debug!(profile = profile.description(), identity, "matched DeviceN profile");
            return Some(DeviceNProfileMatch {
                profile: profile.clone(),
                permutation: (!identity).then_some(permutation),
            });
        }
        None
    }
}

fn expect_space(p: &IccProfile, space: DataSpace) -> Result<()> {
    if p.data_space() == space {
        Ok(())
    } else {
        Err(Error::Profile(format!(
            "expected a {:?} profile, got {:?}",
            space,
            p.data_space()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nclr(names: &[&str]) -> Arc<IccProfile> {
        Arc::new(
            IccProfile::nchannel(
                names.iter().map(|s| s.to_string()).collect(),
                vec![[0.0, 0.0, 0.0, 1.0]; names.len()],
            )
            .unwrap(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_devicen_identity() {
        let m = IccManager::new()
            .with_devicen_profile(nclr(&["Orange", "Green"]))
            .unwrap();
        let found = m.find_devicen_profile(&names(&["Orange", "Green"])).unwrap();
        assert!(found.permutation.is_none());
    }

    #[test]
    fn test_find_devicen_permuted() {
        let m = IccManager::new()
            .with_devicen_profile(nclr(&["Orange", "Green", "Violet"]))
            .unwrap();
        let found = m
            .find_devicen_profile(&names(&["Violet", "Orange", "Green"]))
            .unwrap();
        assert_eq!(found.permutation, Some(vec![1, 2, 0]));
        assert!(m.find_devicen_profile(&names(&["Orange", "Green"])).is_none());
    }

    #[test]
    fn test_default_profile_kind_checked() {
        let rgb = Arc::new(IccProfile::default_rgb());
        assert!(IccManager::new().with_default_cmyk(rgb).is_err());
    }
}
