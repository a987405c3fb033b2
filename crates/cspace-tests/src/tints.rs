//! Tint transforms for scenarios

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cspace_core::{ExponentialFunction, Function, TintTransform};

/// Wraps a per-input CMYK ramp in a callback that counts its calls
#[derive(Debug, Clone, Default)]
pub struct CountingTint {
    calls: Arc<AtomicUsize>,
}

impl CountingTint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `inputs` colorants over CMYK: each input adds `ramp[i] * tint`, clamped
    pub fn transform(&self, ramps: Vec<[f32; 4]>) -> TintTransform {
        let calls = self.calls.clone();
        let inputs = ramps.len();
        TintTransform::callback(inputs, 4, move |input, out| {
            calls.fetch_add(1, Ordering::SeqCst);
            out[..4].fill(0.0);
            for (t, ramp) in input.iter().zip(&ramps) {
                for (o, r) in out.iter_mut().zip(ramp) {
                    *o = (*o + t * r).min(1.0);
                }
            }
            Ok(())
        })
    }
}

/// Single-input data function `t -> t * cmyk`
pub fn linear_cmyk(cmyk: [f32; 4]) -> TintTransform {
    let f = ExponentialFunction::new((0.0, 1.0), vec![0.0; 4], cmyk.to_vec(), 1.0, None)
        .unwrap_or_else(|e| panic!("linear tint: {}", e));
    TintTransform::function(Function::Exponential(f))
}
