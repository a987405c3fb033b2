//! Profile-to-profile color links
//!
//! A link converts normalized component values from one profile to
//! another. Parsed profiles with process data spaces go through moxcms;
//! everything else travels through the standard conversions or the D50
//! connection space.

use std::sync::Arc;

use moxcms::TransformExecutor;
use smallvec::SmallVec;

use crate::convert::{unit_cmyk_to_rgb, unit_rgb_to_cmyk, unit_rgb_to_gray};
use crate::pcs::{D50, adapt_to_d50, lab_to_xyz, srgb_to_xyz, xyz_to_lab, xyz_to_srgb};
use crate::profile::{DataSpace, IccProfile, ProfileHandle};
use crate::{Error, Result};

/// Rendering intent for color transformations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    /// Perceptual rendering intent - best for photographic images
    #[default]
    Perceptual,
    /// Relative colorimetric - preserves in-gamut colors, clips out-of-gamut
    RelativeColorimetric,
    /// Saturation - maintains saturation, may shift hue
    Saturation,
    /// Absolute colorimetric - preserves white point
    AbsoluteColorimetric,
}

impl From<RenderingIntent> for moxcms::RenderingIntent {
    fn from(intent: RenderingIntent) -> Self {
        match intent {
            RenderingIntent::Perceptual => moxcms::RenderingIntent::Perceptual,
            RenderingIntent::RelativeColorimetric => moxcms::RenderingIntent::RelativeColorimetric,
            RenderingIntent::Saturation => moxcms::RenderingIntent::Saturation,
            RenderingIntent::AbsoluteColorimetric => moxcms::RenderingIntent::AbsoluteColorimetric,
        }
    }
}

impl RenderingIntent {
    /// Convert from ICC rendering intent value
    pub fn from_icc(value: u32) -> Self {
        match value {
            1 => Self::RelativeColorimetric,
            2 => Self::Saturation,
            3 => Self::AbsoluteColorimetric,
            _ => Self::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Identity,
    Cms,
    Standard,
}

/// Intermediate value on the standard path
enum Connection {
    Gray(f32),
    Rgb([f32; 3]),
    Cmyk([f32; 4]),
    Xyz([f32; 3]),
}

/// A conversion between two profiles
#[derive(Debug, Clone)]
pub struct IccLink {
    src: Arc<IccProfile>,
    dst: Arc<IccProfile>,
    intent: RenderingIntent,
    kind: LinkKind,
}

fn cms_layout(space: DataSpace) -> Option<moxcms::Layout> {
    match space {
        DataSpace::Gray => Some(moxcms::Layout::Gray),
        DataSpace::Rgb => Some(moxcms::Layout::Rgb),
        DataSpace::Cmyk => Some(moxcms::Layout::Rgba),
        _ => None,
    }
}

impl IccLink {
    /// Build a link from `src` to `dst`
    pub fn new(src: Arc<IccProfile>, dst: Arc<IccProfile>, intent: RenderingIntent) -> Result<Self> {
        let kind = if src.same_as(&dst) {
            LinkKind::Identity
        } else {
            match (&src.handle, &dst.handle) {
                (ProfileHandle::Cms(_), ProfileHandle::Cms(_))
                    if cms_layout(src.data_space()).is_some()
                        && cms_layout(dst.data_space()).is_some() =>
                {
                    LinkKind::Cms
                }
                _ => LinkKind::Standard,
            }
        };
        if dst.data_space() == DataSpace::Xyz && kind == LinkKind::Standard {
            return Err(Error::Transform("XYZ output profiles are not supported".into()));
        }
        Ok(Self {
            src,
            dst,
            intent,
            kind,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.kind == LinkKind::Identity
    }

    pub fn src(&self) -> &Arc<IccProfile> {
        &self.src
    }

    pub fn dst(&self) -> &Arc<IccProfile> {
        &self.dst
    }

    /// Convert one color. `input` holds `src.num_comps()` normalized values,
    /// `output` receives `dst.num_comps()` values.
    pub fn transform(&self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let n_in = self.src.num_comps();
        let n_out = self.dst.num_comps();
        if input.len() < n_in || output.len() < n_out {
            return Err(Error::Transform(format!(
                "buffer sizes {}/{} do not fit link {}->{}",
                input.len(),
                output.len(),
                n_in,
                n_out
            )));
        }
        match self.kind {
            LinkKind::Identity => {
                output[..n_out].copy_from_slice(&input[..n_out.min(n_in)]);
                Ok(())
            }
            LinkKind::Cms => self.transform_cms(&input[..n_in], &mut output[..n_out]),
            LinkKind::Standard => {
                let conn = self.to_connection(&input[..n_in]);
                self.from_connection(conn, &mut output[..n_out]);
                Ok(())
            }
        }
    }

    fn transform_cms(&self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let (ProfileHandle::Cms(src), ProfileHandle::Cms(dst)) = (&self.src.handle, &self.dst.handle)
        else {
            return Err(Error::Transform("link is not CMS backed".into()));
        };
        let (Some(src_layout), Some(dst_layout)) = (
            cms_layout(self.src.data_space()),
            cms_layout(self.dst.data_space()),
        ) else {
            return Err(Error::Transform("unsupported layout".into()));
        };
        let options = moxcms::TransformOptions {
            rendering_intent: self.intent.into(),
            ..Default::default()
        };
        let executor = src
            .create_transform_f32(src_layout, dst, dst_layout, options)
            .map_err(|e| Error::Transform(format!("{:?}", e)))?;
        executor
            .transform(input, output)
            .map_err(|e| Error::Transform(format!("{:?}", e)))
    }

    fn to_connection(&self, v: &[f32]) -> Connection {
        match &self.src.handle {
            ProfileHandle::Lab => Connection::Xyz(lab_to_xyz(
                [v[0] * 100.0, v[1] * 255.0 - 128.0, v[2] * 255.0 - 128.0],
                D50,
            )),
            ProfileHandle::CieA { white } => {
                Connection::Xyz(adapt_to_d50([white[0] * v[0], white[1] * v[0], white[2] * v[0]], *white))
            }
            ProfileHandle::CieAbc { matrix, white } => {
                let mut xyz = [0.0; 3];
                for (i, x) in xyz.iter_mut().enumerate() {
                    *x = matrix[0][i] * v[0] + matrix[1][i] * v[1] + matrix[2][i] * v[2];
                }
                Connection::Xyz(adapt_to_d50(xyz, *white))
            }
            ProfileHandle::NChannel { equivalents } => {
                let mut keep = [1.0f32; 4];
                for (t, eq) in v.iter().zip(equivalents) {
                    for (k, e) in keep.iter_mut().zip(eq) {
                        *k *= 1.0 - t.clamp(0.0, 1.0) * e;
                    }
                }
                Connection::Cmyk(keep.map(|k| 1.0 - k))
            }
            ProfileHandle::Cms(_) | ProfileHandle::Standard => match self.src.data_space() {
                DataSpace::Gray => Connection::Gray(v[0]),
                DataSpace::Rgb => Connection::Rgb([v[0], v[1], v[2]]),
                DataSpace::Cmyk => Connection::Cmyk([v[0], v[1], v[2], v[3]]),
                DataSpace::Lab => Connection::Xyz(lab_to_xyz([v[0], v[1], v[2]], D50)),
                DataSpace::Xyz => Connection::Xyz([v[0], v[1], v[2]]),
                DataSpace::NChannel => Connection::Gray(1.0),
            },
        }
    }

    fn from_connection(&self, conn: Connection, out: &mut [f32]) {
        match self.dst.data_space() {
            DataSpace::Gray => {
                out[0] = match conn {
                    Connection::Gray(g) => g,
                    Connection::Rgb(rgb) => unit_rgb_to_gray(rgb),
                    Connection::Cmyk(cmyk) => unit_rgb_to_gray(unit_cmyk_to_rgb(cmyk)),
                    Connection::Xyz(xyz) => unit_rgb_to_gray(xyz_to_srgb(xyz)),
                }
            }
            DataSpace::Rgb => {
                let rgb = match conn {
                    Connection::Gray(g) => [g; 3],
                    Connection::Rgb(rgb) => rgb,
                    Connection::Cmyk(cmyk) => unit_cmyk_to_rgb(cmyk),
                    Connection::Xyz(xyz) => xyz_to_srgb(xyz),
                };
                out[..3].copy_from_slice(&rgb);
            }
            DataSpace::Cmyk => {
                out[..4].copy_from_slice(&connection_to_cmyk(conn));
            }
            DataSpace::Lab => {
                let xyz = match conn {
                    Connection::Xyz(xyz) => xyz,
                    Connection::Gray(g) => srgb_to_xyz([g; 3]),
                    Connection::Rgb(rgb) => srgb_to_xyz(rgb),
                    Connection::Cmyk(cmyk) => srgb_to_xyz(unit_cmyk_to_rgb(cmyk)),
                };
                let lab = xyz_to_lab(xyz, D50);
                if matches!(self.dst.handle, ProfileHandle::Lab) {
                    out[0] = lab[0] / 100.0;
                    out[1] = (lab[1] + 128.0) / 255.0;
                    out[2] = (lab[2] + 128.0) / 255.0;
                } else {
                    out[..3].copy_from_slice(&lab);
                }
            }
            DataSpace::NChannel => {
                let cmyk = connection_to_cmyk(conn);
                let names = self.dst.colorants().unwrap_or(&[]);
                for (o, name) in out.iter_mut().zip(names.iter()) {
                    *o = match name.as_str() {
                        "Cyan" => cmyk[0],
                        "Magenta" => cmyk[1],
                        "Yellow" => cmyk[2],
                        "Black" => cmyk[3],
                        _ => 0.0,
                    };
                }
            }
            DataSpace::Xyz => {}
        }
    }
}

fn connection_to_cmyk(conn: Connection) -> [f32; 4] {
    match conn {
        Connection::Gray(g) => [0.0, 0.0, 0.0, 1.0 - g],
        Connection::Rgb(rgb) => unit_rgb_to_cmyk(rgb),
        Connection::Cmyk(cmyk) => cmyk,
        Connection::Xyz(xyz) => unit_rgb_to_cmyk(xyz_to_srgb(xyz)),
    }
}

/// Convert `input` through a link and return the output channels
pub fn convert(link: &IccLink, input: &[f32]) -> Result<SmallVec<[f32; 8]>> {
    let mut out: SmallVec<[f32; 8]> = SmallVec::from_elem(0.0, link.dst().num_comps());
    link.transform(input, &mut out)?;
    Ok(out)
}
