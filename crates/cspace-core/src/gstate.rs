//! Graphics state and paint options
//!
//! The graphics state carries everything the color pipeline reads while
//! painting. Saving the state is a `clone`; restoring drops the copy.

use std::sync::Arc;

use tracing::debug;

use crate::cmap::{ColorMapProcs, DefaultColorMapProcs};
use crate::color::{ClientColor, DeviceColor};
use crate::component_map::ColorComponentMap;
use crate::device::Device;
use crate::manager::IccManager;
use crate::overprint::OverprintParams;
use crate::space::ColorSpace;
use crate::transform::RenderingIntent;
use crate::Result;

/// Paint-time options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintOptions {
    /// Overprint for fills
    pub overprint: bool,
    /// Overprint for strokes
    pub stroke_overprint: bool,
    /// Overprint mode (0 or 1)
    pub overprint_mode: u8,
    pub intent: RenderingIntent,
    pub black_point_compensation: bool,
}

impl PaintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fill overprint
    pub fn with_overprint(mut self, on: bool) -> Self {
        self.overprint = on;
        self
    }

    pub fn with_stroke_overprint(mut self, on: bool) -> Self {
        self.stroke_overprint = on;
        self
    }

    pub fn with_overprint_mode(mut self, mode: u8) -> Self {
        self.overprint_mode = mode;
        self
    }

    pub fn with_intent(mut self, intent: RenderingIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_bpc(mut self) -> Self {
        self.black_point_compensation = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub(crate) device: Arc<dyn Device>,
    pub(crate) icc: Arc<IccManager>,
    pub(crate) cmap: Arc<dyn ColorMapProcs>,
    pub(crate) space: Option<Arc<ColorSpace>>,
    pub(crate) client_color: ClientColor,
    pub(crate) device_color: DeviceColor,
    pub(crate) component_map: ColorComponentMap,
    pub(crate) options: PaintOptions,
    pub(crate) is_fill: bool,
    pub(crate) effective_opm: u8,
    pub(crate) overprint: Option<OverprintParams>,
}

impl GraphicsState {
    pub fn new(device: Arc<dyn Device>, icc: Arc<IccManager>) -> Self {
        Self {
            device,
            icc,
            cmap: Arc::new(DefaultColorMapProcs),
            space: None,
            client_color: ClientColor::default(),
            device_color: DeviceColor::default(),
            component_map: ColorComponentMap::default(),
            options: PaintOptions::default(),
            is_fill: true,
            effective_opm: 0,
            overprint: None,
        }
    }

    pub fn with_options(mut self, options: PaintOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cmap_procs(mut self, procs: Arc<dyn ColorMapProcs>) -> Self {
        self.cmap = procs;
        self
    }

    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }

    pub fn icc_manager(&self) -> &Arc<IccManager> {
        &self.icc
    }

    pub fn cmap_procs(&self) -> &Arc<dyn ColorMapProcs> {
        &self.cmap
    }

    pub fn color_space(&self) -> Option<&Arc<ColorSpace>> {
        self.space.as_ref()
    }

    pub fn client_color(&self) -> &ClientColor {
        &self.client_color
    }

    pub fn device_color(&self) -> &DeviceColor {
        &self.device_color
    }

    pub fn component_map(&self) -> &ColorComponentMap {
        &self.component_map
    }

    pub fn options(&self) -> &PaintOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PaintOptions) {
        self.options = options;
    }

    /// Select fill (true) or stroke (false) as the current paint
    pub fn set_fill(&mut self, fill: bool) {
        self.is_fill = fill;
    }

    pub fn is_fill(&self) -> bool {
        self.is_fill
    }

    /// Overprint setting for the current paint
    pub fn overprint_enabled(&self) -> bool {
        if self.is_fill {
            self.options.overprint
        } else {
            self.options.stroke_overprint
        }
    }

    pub fn effective_overprint_mode(&self) -> u8 {
        self.effective_opm
    }

    /// Last record pushed to the device
    pub fn overprint_params(&self) -> Option<&OverprintParams> {
        self.overprint.as_ref()
    }

    /// Install `space` with its initial color. On failure the previous
    /// space, color and component map are kept.
    pub fn set_color_space(&mut self, space: Arc<ColorSpace>) -> Result<()> {
        let saved = (
            self.space.clone(),
            self.client_color.clone(),
            self.device_color.clone(),
            self.component_map.clone(),
        );
        let result = self.try_set_color_space(space);
        if let Err(e) = &result {
            debug!(error = %e, "setcolorspace failed, previous space restored");
            (
                self.space,
                self.client_color,
                self.device_color,
                self.component_map,
            ) = saved;
        }
        result
    }

    fn try_set_color_space(&mut self, space: Arc<ColorSpace>) -> Result<()> {
        space.install(self)?;
        let pc = space.initial_color();
        self.device_color = space.remap(&pc, self)?;
        self.client_color = pc;
        self.space = Some(space.clone());
        space.set_overprint(self)
    }

    /// Set the current color in the current space
    pub fn set_color(&mut self, values: &[f32]) -> Result<()> {
        let space = self
            .space
            .clone()
            .ok_or_else(|| crate::Error::Undefined("no current color space".into()))?;
        let mut pc = ClientColor::new(values);
        space.restrict(&mut pc);
        self.device_color = space.remap(&pc, self)?;
        self.client_color = pc;
        if self.overprint_enabled() && self.options.overprint_mode == 1 {
            space.set_overprint(self)?;
        }
        Ok(())
    }

    /// Concretize a color in the current space without changing state
    pub fn concretize(&self, values: &[f32]) -> Result<crate::color::ConcreteColor> {
        let space = self
            .space
            .as_ref()
            .ok_or_else(|| crate::Error::Undefined("no current color space".into()))?;
        let mut pc = ClientColor::new(values);
        space.restrict(&mut pc);
        space.concretize(&pc, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let o = PaintOptions::new()
            .with_overprint(true)
            .with_overprint_mode(1)
            .with_intent(RenderingIntent::Saturation)
            .with_bpc();
        assert!(o.overprint);
        assert!(!o.stroke_overprint);
        assert_eq!(o.overprint_mode, 1);
        assert_eq!(o.intent, RenderingIntent::Saturation);
        assert!(o.black_point_compensation);
    }
}
