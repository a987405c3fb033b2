//! Colorant data shared by Separation and DeviceN spaces
//!
//! A registry owns the colorant names, the tint transform with its
//! one-entry evaluation cache, and the attachment list that binds
//! Separation spaces to named colorants after construction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::color::{ClientColor, ConcreteColor, MAX_COMPONENTS};
use crate::function::TintTransform;
use crate::space::ColorSpace;
use crate::{Error, Result};

/// Process-color classification of a colorant set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    PureCmyk,
    PureRgb,
    PureSpot,
    Mixed,
}

pub(crate) const CMYK_NAMES: [&str; 4] = ["Cyan", "Magenta", "Yellow", "Black"];
pub(crate) const RGB_NAMES: [&str; 3] = ["Red", "Green", "Blue"];

pub(crate) fn is_process_name(name: &str) -> bool {
    CMYK_NAMES.contains(&name) || RGB_NAMES.contains(&name)
}

/// Classify colorant names. Names are compared exactly; "None" colorants
/// are not counted toward any class.
pub fn classify(names: &[String]) -> Classification {
    let (mut cmyk, mut rgb, mut spot) = (0, 0, 0);
    for name in names {
        match name.as_str() {
            "None" => {}
            n if CMYK_NAMES.contains(&n) => cmyk += 1,
            n if RGB_NAMES.contains(&n) => rgb += 1,
            _ => spot += 1,
        }
    }
    match (cmyk, rgb, spot) {
        (c, 0, 0) if c > 0 => Classification::PureCmyk,
        (0, r, 0) if r > 0 => Classification::PureRgb,
        (0, 0, s) if s > 0 => Classification::PureSpot,
        _ => Classification::Mixed,
    }
}

/// A Separation space bound to one colorant of a DeviceN space
#[derive(Debug, Clone)]
pub struct ColorantAttachment {
    pub name: String,
    pub space: Arc<ColorSpace>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    input: SmallVec<[f32; 8]>,
    output: ConcreteColor,
}

#[derive(Debug, Clone, Default)]
struct TintState {
    transform: Option<TintTransform>,
    cache: Option<CacheEntry>,
}

#[derive(Debug)]
pub struct ColorantRegistry {
    names: Vec<String>,
    tint: Mutex<TintState>,
    attachments: Mutex<Vec<ColorantAttachment>>,
    permutation: Mutex<Option<Vec<usize>>>,
    use_alt: AtomicBool,
    all_none: AtomicBool,
    named_supported: AtomicBool,
    classification: Mutex<Option<Classification>>,
}

impl ColorantRegistry {
    pub(crate) fn new(names: &[&str]) -> Result<Self> {
        if names.is_empty() || names.len() > MAX_COMPONENTS {
            return Err(Error::range(format!("{} colorants", names.len())));
        }
        let mut owned = Vec::new();
        owned.try_reserve_exact(names.len())?;
        for name in names {
            let mut s = String::new();
            s.try_reserve_exact(name.len())?;
            s.push_str(name);
            owned.push(s);
        }
        Ok(Self {
            names: owned,
            tint: Mutex::new(TintState::default()),
            attachments: Mutex::new(Vec::new()),
            permutation: Mutex::new(None),
            use_alt: AtomicBool::new(false),
            all_none: AtomicBool::new(false),
            named_supported: AtomicBool::new(false),
            classification: Mutex::new(None),
        })
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn transform(&self) -> Option<TintTransform> {
        self.tint.lock().transform.clone()
    }

    /// Replace the tint transform after checking its arity. Clears the cache.
    pub(crate) fn set_transform(&self, t: TintTransform, base_comps: usize) -> Result<()> {
        if t.inputs() != self.names.len() || t.outputs() != base_comps {
            return Err(Error::range(format!(
                "tint transform {}->{} does not fit {} colorants over {} base components",
                t.inputs(),
                t.outputs(),
                self.names.len(),
                base_comps
            )));
        }
        let mut tint = self.tint.lock();
        tint.transform = Some(t);
        tint.cache = None;
        Ok(())
    }

    /// Cached concrete color for exactly this input
    pub(crate) fn cached(&self, pc: &ClientColor) -> Option<ConcreteColor> {
        let tint = self.tint.lock();
        tint.cache
            .as_ref()
            .filter(|c| pc.bit_eq(&c.input))
            .map(|c| c.output.clone())
    }

    pub(crate) fn store(&self, pc: &ClientColor, output: &ConcreteColor) {
        self.tint.lock().cache = Some(CacheEntry {
            input: pc.values.clone(),
            output: output.clone(),
        });
    }

    pub(crate) fn invalidate_cache(&self) {
        self.tint.lock().cache = None;
    }

    /// Run the tint transform into `out_comps` values
    pub(crate) fn evaluate(&self, pc: &ClientColor, out_comps: usize) -> Result<ClientColor> {
        let transform = self
            .transform()
            .ok_or_else(|| Error::Undefined("no tint transform".into()))?;
        let mut out = ClientColor::splat(out_comps.max(transform.outputs()), 0.0);
        transform.evaluate(pc.as_slice(), &mut out.values)?;
        out.values.truncate(out_comps);
        Ok(out)
    }

    pub fn attach(&self, name: &str, space: Arc<ColorSpace>) {
        let mut list = self.attachments.lock();
        list.retain(|a| a.name != name);
        list.push(ColorantAttachment {
            name: name.to_string(),
            space,
        });
    }

    pub fn attachments(&self) -> Vec<ColorantAttachment> {
        self.attachments.lock().clone()
    }

    pub fn attachment(&self, name: &str) -> Option<Arc<ColorSpace>> {
        self.attachments
            .lock()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.space.clone())
    }

    pub fn permutation(&self) -> Option<Vec<usize>> {
        self.permutation.lock().clone()
    }

    pub(crate) fn set_permutation(&self, p: Option<Vec<usize>>) {
        *self.permutation.lock() = p;
    }

    pub fn use_alt(&self) -> bool {
        self.use_alt.load(Ordering::Acquire)
    }

    pub(crate) fn set_use_alt(&self, v: bool) {
        self.use_alt.store(v, Ordering::Release);
    }

    pub fn all_none(&self) -> bool {
        self.all_none.load(Ordering::Acquire)
    }

    pub(crate) fn set_all_none(&self, v: bool) {
        self.all_none.store(v, Ordering::Release);
    }

    pub fn named_supported(&self) -> bool {
        self.named_supported.load(Ordering::Acquire)
    }

    pub(crate) fn set_named_supported(&self, v: bool) {
        self.named_supported.store(v, Ordering::Release);
    }

    pub fn classification(&self) -> Option<Classification> {
        *self.classification.lock()
    }

    pub(crate) fn set_classification(&self, c: Classification) {
        *self.classification.lock() = Some(c);
    }

    /// Release the transform and attachments. Safe to call repeatedly.
    pub(crate) fn finalize(&self) {
        let mut tint = self.tint.lock();
        tint.transform = None;
        tint.cache = None;
        drop(tint);
        self.attachments.lock().clear();
        *self.permutation.lock() = None;
    }
}

impl Clone for ColorantRegistry {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            tint: Mutex::new(self.tint.lock().clone()),
            attachments: Mutex::new(self.attachments()),
            permutation: Mutex::new(self.permutation()),
            use_alt: AtomicBool::new(self.use_alt()),
            all_none: AtomicBool::new(self.all_none()),
            named_supported: AtomicBool::new(self.named_supported()),
            classification: Mutex::new(self.classification()),
        }
    }
}
