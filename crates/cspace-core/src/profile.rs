//! ICC profile handles
//!
//! Profiles are immutable once built and shared through `Arc` between
//! color spaces, the profile manager and device profile bundles. Parsed
//! profiles are backed by moxcms; built-in defaults and profiles synthesized
//! for CIE spaces and N-channel output carry their own conversion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::transform::RenderingIntent;
use crate::{Error, Result};

/// Data color space of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSpace {
    Gray,
    Rgb,
    Cmyk,
    Lab,
    Xyz,
    /// N-channel (NCLR) colorants
    NChannel,
}

impl DataSpace {
    /// Channel count for fixed-arity spaces
    pub fn channels(&self) -> Option<usize> {
        match self {
            Self::Gray => Some(1),
            Self::Rgb | Self::Lab | Self::Xyz => Some(3),
            Self::Cmyk => Some(4),
            Self::NChannel => None,
        }
    }

    fn from_moxcms(cs: moxcms::DataColorSpace) -> Result<Self> {
        match cs {
            moxcms::DataColorSpace::Gray => Ok(Self::Gray),
            moxcms::DataColorSpace::Rgb => Ok(Self::Rgb),
            moxcms::DataColorSpace::Cmyk => Ok(Self::Cmyk),
            moxcms::DataColorSpace::Lab => Ok(Self::Lab),
            moxcms::DataColorSpace::Xyz => Ok(Self::Xyz),
            other => Err(Error::Profile(format!(
                "unsupported profile data color space {:?}",
                other
            ))),
        }
    }
}

/// How values of a profile reach the connection space
#[derive(Debug)]
pub(crate) enum ProfileHandle {
    /// Parsed ICC data
    Cms(Box<moxcms::ColorProfile>),
    /// Built-in process defaults using the standard conversions
    Standard,
    /// Lab with components normalized into `[0, 1]`
    Lab,
    /// Single-component CIE space: `A` scales the white point
    CieA { white: [f32; 3] },
    /// Three-component CIE space: `ABC` through a matrix to XYZ
    CieAbc {
        matrix: [[f32; 3]; 3],
        white: [f32; 3],
    },
    /// Colorants with CMYK equivalents, mixed multiplicatively
    NChannel { equivalents: Vec<[f32; 4]> },
}

/// A shared color profile
#[derive(Debug)]
pub struct IccProfile {
    data_space: DataSpace,
    num_comps: usize,
    hash: [u8; 16],
    raw: Option<Vec<u8>>,
    colorants: Option<Vec<String>>,
    description: String,
    pub(crate) handle: ProfileHandle,
}

impl IccProfile {
    /// Parse an ICC profile
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let inner = moxcms::ColorProfile::new_from_slice(data)
            .map_err(|e| Error::Profile(format!("{:?}", e)))?;
        let data_space = DataSpace::from_moxcms(inner.color_space)?;
        let num_comps = data_space.channels().unwrap_or(0);
        Ok(Self {
            data_space,
            num_comps,
            hash: md5::compute(data).0,
            raw: Some(data.to_vec()),
            colorants: None,
            description: format!("icc {:?}", data_space),
            handle: ProfileHandle::Cms(Box::new(inner)),
        })
    }

    fn synthesized(data_space: DataSpace, num_comps: usize, description: String, handle: ProfileHandle) -> Self {
        Self {
            data_space,
            num_comps,
            hash: md5::compute(description.as_bytes()).0,
            raw: None,
            colorants: None,
            description,
            handle,
        }
    }

    pub fn default_gray() -> Self {
        Self::synthesized(DataSpace::Gray, 1, "default gray".into(), ProfileHandle::Standard)
    }

    pub fn default_rgb() -> Self {
        Self::synthesized(DataSpace::Rgb, 3, "default rgb".into(), ProfileHandle::Standard)
    }

    pub fn default_cmyk() -> Self {
        Self::synthesized(DataSpace::Cmyk, 4, "default cmyk".into(), ProfileHandle::Standard)
    }

    pub fn lab() -> Self {
        Self::synthesized(DataSpace::Lab, 3, "lab d50".into(), ProfileHandle::Lab)
    }

    /// Equivalent of a CIEBasedA space
    pub fn cie_a(white: [f32; 3]) -> Self {
        let description = format!("cie a {:?}", white);
        Self::synthesized(DataSpace::Gray, 1, description, ProfileHandle::CieA { white })
    }

    /// Equivalent of a CIEBasedABC space
    pub fn cie_abc(matrix: [[f32; 3]; 3], white: [f32; 3]) -> Self {
        let description = format!("cie abc {:?} {:?}", matrix, white);
        Self::synthesized(
            DataSpace::Rgb,
            3,
            description,
            ProfileHandle::CieAbc { matrix, white },
        )
    }

    /// N-channel profile with one CMYK equivalent per colorant
    pub fn nchannel(colorants: Vec<String>, equivalents: Vec<[f32; 4]>) -> Result<Self> {
        if colorants.is_empty() || colorants.len() != equivalents.len() {
            return Err(Error::range(format!(
                "n-channel profile needs one equivalent per colorant ({} names, {} equivalents)",
                colorants.len(),
                equivalents.len()
            )));
        }
        let description = format!("nclr {:?} {:?}", colorants, equivalents);
        let mut p = Self::synthesized(
            DataSpace::NChannel,
            colorants.len(),
            description,
            ProfileHandle::NChannel { equivalents },
        );
        p.colorants = Some(colorants);
        Ok(p)
    }

    #[inline]
    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    #[inline]
    pub fn num_comps(&self) -> usize {
        self.num_comps
    }

    /// Identity hash: MD5 of the profile bytes or of the synthesized description
    #[inline]
    pub fn hash(&self) -> [u8; 16] {
        self.hash
    }

    #[inline]
    pub fn is_lab(&self) -> bool {
        self.data_space == DataSpace::Lab
    }

    pub fn is_cmyk(&self) -> bool {
        self.data_space == DataSpace::Cmyk
    }

    /// Raw profile bytes, absent for synthesized profiles
    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    pub fn colorants(&self) -> Option<&[String]> {
        self.colorants.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Legal input range of component `i`
    pub fn range(&self, i: usize) -> (f32, f32) {
        match (self.data_space, i) {
            (DataSpace::Lab, 0) => (0.0, 100.0),
            (DataSpace::Lab, _) => (-128.0, 127.0),
            _ => (0.0, 1.0),
        }
    }

    pub fn same_as(&self, other: &IccProfile) -> bool {
        self.hash == other.hash
    }
}

/// Spot colorant names declared by a device output profile
#[derive(Debug, Default)]
pub struct SpotNames {
    pub names: Vec<String>,
    equiv_cmyk_set: AtomicBool,
}

impl SpotNames {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            equiv_cmyk_set: AtomicBool::new(false),
        }
    }

    /// Whether the device has resolved CMYK equivalents for these names
    pub fn equiv_cmyk_set(&self) -> bool {
        self.equiv_cmyk_set.load(Ordering::Acquire)
    }

    pub fn set_equiv_cmyk(&self, set: bool) {
        self.equiv_cmyk_set.store(set, Ordering::Release);
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Output profile bundle reported by a device
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub output: Arc<IccProfile>,
    pub spot_names: Option<Arc<SpotNames>>,
    pub intent: RenderingIntent,
}

impl DeviceProfile {
    pub fn new(output: Arc<IccProfile>) -> Self {
        Self {
            output,
            spot_names: None,
            intent: RenderingIntent::default(),
        }
    }

    pub fn with_spot_names(mut self, names: Arc<SpotNames>) -> Self {
        self.spot_names = Some(names);
        self
    }

    pub fn with_intent(mut self, intent: RenderingIntent) -> Self {
        self.intent = intent;
        self
    }
}
