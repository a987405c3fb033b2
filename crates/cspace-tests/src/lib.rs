//! # cspace-tests
//!
//! Scenario and property testing for cspace-core.
//!
//! This crate provides:
//! - Output device fixtures described in `fixtures/devices.json`
//! - Tint transforms that count their evaluations
//! - Graphics-state builders and seeded random client colors
//!
//! ## Test Categories
//!
//! 1. **End to end**: install, concretize and remap for every family
//! 2. **Equivalent capture**: spot CMYK equivalents and their folding
//! 3. **Overprint**: drawn/retained components per family and mode
//! 4. **Serialization**: wire layout and round trips
//! 5. **Properties**: randomized invariants with fixed seeds

pub mod fixtures;
pub mod patterns;
pub mod tints;

pub use fixtures::{DeviceFixture, device, gstate, load_devices};
pub use tints::{CountingTint, linear_cmyk};
