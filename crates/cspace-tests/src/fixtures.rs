//! Device fixtures
//!
//! Devices are described in JSON so scenarios can name them instead of
//! spelling out a configuration each time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use cspace_core::{
    Device, GraphicsState, IccManager, PaintOptions, ProcessModel, SeparationDevice,
    SeparationDeviceConfig,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Gray,
    Rgb,
    Cmyk,
}

impl From<ModelName> for ProcessModel {
    fn from(m: ModelName) -> Self {
        match m {
            ModelName::Gray => ProcessModel::Gray,
            ModelName::Rgb => ProcessModel::Rgb,
            ModelName::Cmyk => ProcessModel::Cmyk,
        }
    }
}

/// One entry of `fixtures/devices.json`
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceFixture {
    pub name: String,
    pub process_model: ModelName,
    #[serde(default)]
    pub spots: Vec<String>,
    /// Defaults to true for CMYK devices
    #[serde(default)]
    pub supports_devicen: Option<bool>,
    #[serde(default)]
    pub pdf14: bool,
    #[serde(default)]
    pub additive_spots: bool,
    #[serde(default)]
    pub max_components: Option<usize>,
    #[serde(default)]
    pub profile_spot_names: Option<Vec<String>>,
}

impl DeviceFixture {
    pub fn config(&self) -> SeparationDeviceConfig {
        let mut config = SeparationDeviceConfig::new(self.process_model.into())
            .with_spots(self.spots.iter().cloned())
            .with_pdf14(self.pdf14)
            .with_additive_spots(self.additive_spots);
        if let Some(on) = self.supports_devicen {
            config = config.with_devicen_support(on);
        }
        if let Some(max) = self.max_components {
            config = config.with_max_components(max);
        }
        if let Some(names) = &self.profile_spot_names {
            config = config.with_profile_spot_names(names.clone());
        }
        config
    }
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub fn load_devices() -> Result<Vec<DeviceFixture>> {
    let path = fixtures_dir().join("devices.json");
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let devices = serde_json::from_str(&text).context("parsing device fixtures")?;
    Ok(devices)
}

/// Build the named fixture device
pub fn device(name: &str) -> Result<Arc<SeparationDevice>> {
    let fixture = load_devices()?
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| anyhow!("no device fixture named {}", name))?;
    Ok(Arc::new(SeparationDevice::new(fixture.config())?))
}

/// Graphics state painting on `device` with the default ICC manager
pub fn gstate(device: &Arc<SeparationDevice>, options: PaintOptions) -> GraphicsState {
    gstate_with(device, IccManager::new(), options)
}

pub fn gstate_with(
    device: &Arc<SeparationDevice>,
    icc: IccManager,
    options: PaintOptions,
) -> GraphicsState {
    let dev: Arc<dyn Device> = device.clone();
    GraphicsState::new(dev, Arc::new(icc)).with_options(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fixtures_build() {
        for fixture in load_devices().unwrap() {
            SeparationDevice::new(fixture.config())
                .unwrap_or_else(|e| panic!("{}: {}", fixture.name, e));
        }
    }

    #[test]
    fn test_devicen_support_default() {
        let devices = load_devices().unwrap();
        let rgb = devices.iter().find(|d| d.name == "rgb").unwrap();
        assert!(!rgb.config().supports_devicen);
        let cmyk = devices.iter().find(|d| d.name == "cmyk").unwrap();
        assert!(cmyk.config().supports_devicen);
    }
}
