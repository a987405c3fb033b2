//! # cspace-core - color space concretization for page renderers
//!
//! Takes a color expressed in a document color space (device, CIE, ICC,
//! Indexed, Separation, DeviceN, Pattern) and turns it into the component
//! values an output device actually images.
//!
//! ## Pipeline
//!
//! - **Install**: `GraphicsState::set_color_space` decides whether a
//!   Separation/DeviceN space is imaged natively or through its alternate,
//!   builds the component map and captures spot equivalents.
//! - **Concretize**: client color to fixed-point components of the
//!   concrete space, running tint transforms (cached) where needed.
//! - **Remap**: concrete color to device color through the ICC link and the
//!   gstate's color-mapping procedures.
//! - **Overprint**: decides which device components a paint operation
//!   retains and pushes that record to the device.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cspace_core::{
//!     ColorSpace, Device, GraphicsState, IccManager, PaintOptions, ProcessModel,
//!     SeparationDevice, SeparationDeviceConfig,
//! };
//!
//! let device: Arc<dyn Device> = Arc::new(
//!     SeparationDevice::new(SeparationDeviceConfig::new(ProcessModel::Cmyk).with_spots(["Orange"]))
//!         .unwrap(),
//! );
//! let mut gs = GraphicsState::new(device, Arc::new(IccManager::new()))
//!     .with_options(PaintOptions::new().with_overprint(true).with_overprint_mode(1));
//!
//! let orange = ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), None).unwrap();
//! gs.set_color_space(orange).unwrap();
//! gs.set_color(&[0.75]).unwrap();
//! println!("{:?}", gs.device_color());
//! ```

pub mod cmap;
pub mod color;
pub mod component_map;
pub mod convert;
pub mod device;
pub mod devn;
pub mod equivalent;
pub mod error;
pub mod frac;
pub mod function;
pub mod gstate;
pub mod manager;
pub mod named;
pub mod overprint;
pub mod pcs;
pub mod profile;
pub mod registry;
pub mod serialize;
pub mod space;
pub mod transform;

pub use cmap::{ColorMapProcs, DefaultColorMapProcs};
pub use color::{ClientColor, ComponentMask, ConcreteColor, DeviceColor, DeviceValue, MAX_COMPONENTS};
pub use component_map::{ColorComponentMap, SepType};
pub use device::{ColorInfo, ColorantLookup, Device, Polarity, ProcessModel, SpecOp};
pub use devn::{SeparationDevice, SeparationDeviceConfig};
pub use equivalent::{EquivalentCmykColors, EquivalentColor, capture_equivalent_cmyk};
pub use error::{Error, Result};
pub use frac::{FRAC_1, Frac};
pub use function::{ExponentialFunction, Function, SampledFunction, TintTransform};
pub use gstate::{GraphicsState, PaintOptions};
pub use manager::{DeviceNProfileMatch, IccManager};
pub use named::NamedColorTable;
pub use overprint::OverprintParams;
pub use profile::{DataSpace, DeviceProfile, IccProfile, SpotNames};
pub use registry::{Classification, ColorantRegistry};
pub use space::{CieKind, CieParams, ColorSpace, SpaceType};
pub use transform::{IccLink, RenderingIntent};

/// Version of cspace-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
