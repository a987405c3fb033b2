//! Tint transform functions
//!
//! Data-driven functions (sampled and exponential) can be serialized with
//! their color space. Native callbacks cannot.

use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

const MAX_SAMPLED_INPUTS: usize = 16;

/// Every bound finite and ordered
fn check_bounds(what: &str, bounds: &[(f32, f32)]) -> Result<()> {
    match bounds
        .iter()
        .find(|(lo, hi)| !(lo.is_finite() && hi.is_finite() && lo <= hi))
    {
        Some((lo, hi)) => Err(Error::range(format!("{} bound [{}, {}]", what, lo, hi))),
        None => Ok(()),
    }
}

/// Sampled function: multilinear interpolation over a sample grid
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFunction {
    domain: Vec<(f32, f32)>,
    range: Vec<(f32, f32)>,
    size: Vec<usize>,
    /// Normalized samples, first input dimension varying fastest
    samples: Vec<f32>,
}

impl SampledFunction {
    pub fn new(
        domain: Vec<(f32, f32)>,
        range: Vec<(f32, f32)>,
        size: Vec<usize>,
        samples: Vec<f32>,
    ) -> Result<Self> {
        let m = domain.len();
        let n = range.len();
        if m == 0 || n == 0 || size.len() != m {
            return Err(Error::range(format!(
                "sampled function shape: {} inputs, {} outputs, {} sizes",
                m,
                n,
                size.len()
            )));
        }
        if m > MAX_SAMPLED_INPUTS {
            return Err(Error::range(format!("sampled function with {} inputs", m)));
        }
        check_bounds("sampled domain", &domain)?;
        check_bounds("sampled range", &range)?;
        if size.iter().any(|&s| s == 0) {
            return Err(Error::range("sampled function with empty dimension"));
        }
        let expected = size
            .iter()
            .try_fold(n, |acc, &s| acc.checked_mul(s))
            .ok_or_else(|| Error::range("sample table too large"))?;
        if samples.len() != expected {
            return Err(Error::range(format!(
                "sampled function expects {} samples, got {}",
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            domain,
            range,
            size,
            samples,
        })
    }

    pub fn domain(&self) -> &[(f32, f32)] {
        &self.domain
    }

    pub fn range(&self) -> &[(f32, f32)] {
        &self.range
    }

    pub fn size(&self) -> &[usize] {
        &self.size
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    fn evaluate(&self, input: &[f32], output: &mut [f32]) {
        let m = self.domain.len();
        let n = self.range.len();
        // Grid position and fraction per input dimension
        let mut base = [0usize; MAX_SAMPLED_INPUTS];
        let mut frac = [0f32; MAX_SAMPLED_INPUTS];
        for i in 0..m {
            let (d0, d1) = self.domain[i];
            let x = input[i].clamp(d0.min(d1), d0.max(d1));
            let span = self.size[i] - 1;
            let e = if d1 != d0 {
                (x - d0) / (d1 - d0) * span as f32
            } else {
                0.0
            };
            let e = e.clamp(0.0, span as f32);
            let b = (e.floor() as usize).min(span.saturating_sub(1));
            base[i] = b;
            frac[i] = if span == 0 { 0.0 } else { e - b as f32 };
        }
        for o in output.iter_mut().take(n) {
            *o = 0.0;
        }
        for corner in 0..(1usize << m) {
            let mut weight = 1.0;
            let mut offset = 0;
            let mut stride = 1;
            for i in 0..m {
                let hi = (corner >> i) & 1 == 1;
                let idx = if hi && self.size[i] > 1 { base[i] + 1 } else { base[i] };
                weight *= if hi { frac[i] } else { 1.0 - frac[i] };
                offset += idx * stride;
                stride *= self.size[i];
            }
            if weight == 0.0 {
                continue;
            }
            for (j, o) in output.iter_mut().take(n).enumerate() {
                *o += weight * self.samples[offset * n + j];
            }
        }
        for (o, &(r0, r1)) in output.iter_mut().zip(&self.range) {
            *o = (r0 + *o * (r1 - r0)).clamp(r0.min(r1), r0.max(r1));
        }
    }
}

/// Exponential interpolation function: `C0 + x^N (C1 - C0)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialFunction {
    domain: (f32, f32),
    c0: Vec<f32>,
    c1: Vec<f32>,
    exponent: f32,
    range: Option<Vec<(f32, f32)>>,
}

impl ExponentialFunction {
    pub fn new(
        domain: (f32, f32),
        c0: Vec<f32>,
        c1: Vec<f32>,
        exponent: f32,
        range: Option<Vec<(f32, f32)>>,
    ) -> Result<Self> {
        if c0.is_empty() || c0.len() != c1.len() {
            return Err(Error::range("exponential function C0/C1 length mismatch"));
        }
        check_bounds("exponential domain", &[domain])?;
        if let Some(r) = &range {
            if r.len() != c0.len() {
                return Err(Error::range("exponential function range length mismatch"));
            }
            check_bounds("exponential range", r)?;
        }
        Ok(Self {
            domain,
            c0,
            c1,
            exponent,
            range,
        })
    }

    pub fn domain(&self) -> (f32, f32) {
        self.domain
    }

    pub fn c0(&self) -> &[f32] {
        &self.c0
    }

    pub fn c1(&self) -> &[f32] {
        &self.c1
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    pub fn range(&self) -> Option<&[(f32, f32)]> {
        self.range.as_deref()
    }

    fn evaluate(&self, input: &[f32], output: &mut [f32]) {
        let (d0, d1) = self.domain;
        let x = input[0].clamp(d0.min(d1), d0.max(d1));
        let xn = if self.exponent == 1.0 { x } else { x.powf(self.exponent) };
        for (j, o) in output.iter_mut().take(self.c0.len()).enumerate() {
            let mut v = self.c0[j] + xn * (self.c1[j] - self.c0[j]);
            if let Some(r) = &self.range {
                v = v.clamp(r[j].0.min(r[j].1), r[j].0.max(r[j].1));
            }
            *o = v;
        }
    }
}

/// Data-driven function
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Sampled(SampledFunction),
    Exponential(ExponentialFunction),
}

impl Function {
    pub fn inputs(&self) -> usize {
        match self {
            Self::Sampled(f) => f.domain.len(),
            Self::Exponential(_) => 1,
        }
    }

    pub fn outputs(&self) -> usize {
        match self {
            Self::Sampled(f) => f.range.len(),
            Self::Exponential(f) => f.c0.len(),
        }
    }

    pub fn evaluate(&self, input: &[f32], output: &mut [f32]) -> Result<()> {
        if input.len() < self.inputs() || output.len() < self.outputs() {
            return Err(Error::range("function operand size"));
        }
        match self {
            Self::Sampled(f) => f.evaluate(input, output),
            Self::Exponential(f) => f.evaluate(input, output),
        }
        Ok(())
    }
}

type CallbackFn = dyn Fn(&[f32], &mut [f32]) -> Result<()> + Send + Sync;

/// Tint transform attached to a Separation or DeviceN space
#[derive(Clone)]
pub enum TintTransform {
    /// Serializable data function
    Function(Arc<Function>),
    /// Arbitrary native code
    Callback {
        inputs: usize,
        outputs: usize,
        f: Arc<CallbackFn>,
    },
}

impl TintTransform {
    pub fn function(f: Function) -> Self {
        Self::Function(Arc::new(f))
    }

    pub fn callback<F>(inputs: usize, outputs: usize, f: F) -> Self
    where
        F: Fn(&[f32], &mut [f32]) -> Result<()> + Send + Sync + 'static,
    {
        Self::Callback {
            inputs,
            outputs,
            f: Arc::new(f),
        }
    }

    pub fn inputs(&self) -> usize {
        match self {
            Self::Function(f) => f.inputs(),
            Self::Callback { inputs, .. } => *inputs,
        }
    }

    pub fn outputs(&self) -> usize {
        match self {
            Self::Function(f) => f.outputs(),
            Self::Callback { outputs, .. } => *outputs,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(f) => Some(f),
            Self::Callback { .. } => None,
        }
    }

    pub fn evaluate(&self, input: &[f32], output: &mut [f32]) -> Result<()> {
        match self {
            Self::Function(f) => f.evaluate(input, output),
            Self::Callback { f, .. } => f(input, output),
        }
    }
}

impl fmt::Debug for TintTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(func) => f.debug_tuple("Function").field(func).finish(),
            Self::Callback { inputs, outputs, .. } => f
                .debug_struct("Callback")
                .field("inputs", inputs)
                .field("outputs", outputs)
                .finish_non_exhaustive(),
        }
    }
}
