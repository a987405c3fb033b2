//! Binary serialization of color spaces
//!
//! Little-endian `u32` integers and `f32` floats. A space starts with its
//! family tag; composite spaces recurse into their base. Tint transforms
//! are written as data functions, so native callbacks and synthesized ICC
//! profiles cannot be serialized.

use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{LE, ReadBytesExt, WriteBytesExt};

use crate::component_map::SepType;
use crate::function::{ExponentialFunction, Function, SampledFunction, TintTransform};
use crate::profile::IccProfile;
use crate::space::{CieKind, CieParams, ColorSpace, Family, SpaceType};
use crate::{Error, Result};

const FN_SAMPLED: u32 = 0;
const FN_EXPONENTIAL: u32 = 2;
/// Written in place of a tint transform when the space has none
const FN_NONE: u32 = u32::MAX;

/// Composite spaces nest at most this deep
const MAX_DEPTH: usize = 8;
const MAX_NAME_LEN: usize = 1 << 16;
const MAX_BLOB_LEN: usize = 1 << 26;

impl ColorSpace {
    /// Write this space and everything it depends on to `sink`
    pub fn serialize<W: Write>(&self, sink: &mut W) -> Result<()> {
        let tag = self.space_type().tag();
        match self.family() {
            Family::DeviceGray | Family::DeviceRgb | Family::DeviceCmyk => {
                sink.write_u32::<LE>(tag)?;
            }
            Family::Separation(sep) => {
                sink.write_u32::<LE>(tag)?;
                sink.write_u32::<LE>(1)?;
                write_name(sink, sep.name())?;
                self.require_base_for_write()?.serialize(sink)?;
                write_transform(sink, sep.registry.transform().as_ref())?;
                sink.write_u32::<LE>(sep.sep_type().tag())?;
            }
            Family::DeviceN(dn) => {
                sink.write_u32::<LE>(tag)?;
                sink.write_u32::<LE>(dn.registry.len() as u32)?;
                for name in dn.registry.names() {
                    write_name(sink, name)?;
                }
                self.require_base_for_write()?.serialize(sink)?;
                write_transform(sink, dn.registry.transform().as_ref())?;
            }
            Family::Indexed(ix) => {
                sink.write_u32::<LE>(tag)?;
                self.require_base_for_write()?.serialize(sink)?;
                sink.write_u32::<LE>(ix.hival())?;
                write_blob(sink, ix.table())?;
            }
            Family::IccBased => {
                let profile = self
                    .icc_profile()
                    .ok_or_else(|| Error::Undefined("ICC space without a profile".into()))?;
                let raw = profile.raw().ok_or_else(|| {
                    Error::Unimplemented(format!(
                        "profile '{}' has no serialized form",
                        profile.description()
                    ))
                })?;
                sink.write_u32::<LE>(tag)?;
                write_blob(sink, raw)?;
                match self.base_space() {
                    Some(alt) => {
                        sink.write_u32::<LE>(1)?;
                        alt.serialize(sink)?;
                    }
                    None => sink.write_u32::<LE>(0)?,
                }
            }
            Family::Cie(params) => {
                sink.write_u32::<LE>(tag)?;
                write_cie(sink, params)?;
            }
            Family::Pattern => {
                return Err(Error::Unimplemented("pattern spaces are not serializable".into()));
            }
        }
        Ok(())
    }

    /// Read a space previously written by [`ColorSpace::serialize`]
    pub fn deserialize<R: Read>(source: &mut R) -> Result<Arc<ColorSpace>> {
        read_space(source, 0)
    }

    fn require_base_for_write(&self) -> Result<Arc<ColorSpace>> {
        self.base_space()
            .ok_or_else(|| Error::Undefined(format!("{:?} space without a base", self.space_type())))
    }
}

fn read_space<R: Read>(src: &mut R, depth: usize) -> Result<Arc<ColorSpace>> {
    if depth > MAX_DEPTH {
        return Err(Error::range("color spaces nested too deeply"));
    }
    let tag = src.read_u32::<LE>()?;
    let ty = SpaceType::from_tag(tag)
        .ok_or_else(|| Error::range(format!("unknown color space tag {}", tag)))?;
    match ty {
        SpaceType::DeviceGray => Ok(ColorSpace::device_gray()),
        SpaceType::DeviceRgb => Ok(ColorSpace::device_rgb()),
        SpaceType::DeviceCmyk => Ok(ColorSpace::device_cmyk()),
        SpaceType::Separation => {
            let n = src.read_u32::<LE>()?;
            if n != 1 {
                return Err(Error::range(format!("separation with {} components", n)));
            }
            let name = read_name(src)?;
            let base = read_space(src, depth + 1)?;
            let transform = read_transform(src)?;
            let sep_tag = src.read_u32::<LE>()?;
            if SepType::from_tag(sep_tag) != Some(SepType::from_name(&name)) {
                return Err(Error::range(format!(
                    "separation type {} does not match '{}'",
                    sep_tag, name
                )));
            }
            ColorSpace::new_separation(&name, base, transform)
        }
        SpaceType::DeviceN => {
            let n = src.read_u32::<LE>()? as usize;
            if n == 0 || n > crate::color::MAX_COMPONENTS {
                return Err(Error::range(format!("DeviceN with {} components", n)));
            }
            let mut names = Vec::new();
            names.try_reserve_exact(n)?;
            for _ in 0..n {
                names.push(read_name(src)?);
            }
            let base = read_space(src, depth + 1)?;
            let transform = read_transform(src)?;
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            ColorSpace::new_devicen(&refs, base, transform)
        }
        SpaceType::Indexed => {
            let base = read_space(src, depth + 1)?;
            let hival = src.read_u32::<LE>()?;
            let table = read_blob(src)?;
            ColorSpace::new_indexed(base, hival, &table)
        }
        SpaceType::IccBased => {
            let bytes = read_blob(src)?;
            let profile = Arc::new(IccProfile::from_bytes(&bytes)?);
            let alternate = match src.read_u32::<LE>()? {
                0 => None,
                _ => Some(read_space(src, depth + 1)?),
            };
            ColorSpace::new_icc(profile, alternate)
        }
        SpaceType::CieA | SpaceType::CieAbc | SpaceType::CieDef | SpaceType::CieDefg => {
            let kind = CieKind::from_space_type(ty)
                .ok_or_else(|| Error::range(format!("{:?} is not CIE-based", ty)))?;
            ColorSpace::new_cie(read_cie(src, kind)?)
        }
        SpaceType::Pattern => Err(Error::Unimplemented(
            "pattern spaces are not serializable".into(),
        )),
    }
}

fn write_name<W: Write>(sink: &mut W, name: &str) -> Result<()> {
    if name.as_bytes().contains(&0) {
        return Err(Error::range("colorant name contains NUL"));
    }
    sink.write_all(name.as_bytes())?;
    sink.write_u8(0)?;
    Ok(())
}

fn read_name<R: Read>(src: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        match src.read_u8()? {
            0 => break,
            b => {
                if bytes.len() >= MAX_NAME_LEN {
                    return Err(Error::range("unterminated colorant name"));
                }
                bytes.try_reserve(1)?;
                bytes.push(b);
            }
        }
    }
    String::from_utf8(bytes).map_err(|e| Error::range(format!("colorant name: {}", e)))
}

fn write_blob<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    sink.write_u32::<LE>(len_u32(bytes.len())?)?;
    sink.write_all(bytes)?;
    Ok(())
}

fn read_blob<R: Read>(src: &mut R) -> Result<Vec<u8>> {
    let len = src.read_u32::<LE>()? as usize;
    if len > MAX_BLOB_LEN {
        return Err(Error::range(format!("{} byte block is too large", len)));
    }
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(len)?;
    bytes.resize(len, 0);
    src.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::range(format!("length {} does not fit u32", len)))
}

fn write_pairs<W: Write>(sink: &mut W, pairs: &[(f32, f32)]) -> Result<()> {
    for &(lo, hi) in pairs {
        sink.write_f32::<LE>(lo)?;
        sink.write_f32::<LE>(hi)?;
    }
    Ok(())
}

fn read_pairs<R: Read>(src: &mut R, n: usize) -> Result<Vec<(f32, f32)>> {
    let mut out = Vec::new();
    out.try_reserve_exact(n)?;
    for _ in 0..n {
        let lo = src.read_f32::<LE>()?;
        let hi = src.read_f32::<LE>()?;
        out.push((lo, hi));
    }
    Ok(out)
}

fn read_floats<R: Read>(src: &mut R, n: usize) -> Result<Vec<f32>> {
    let mut out = Vec::new();
    out.try_reserve_exact(n)?;
    for _ in 0..n {
        out.push(src.read_f32::<LE>()?);
    }
    Ok(out)
}

fn write_cie<W: Write>(sink: &mut W, params: &CieParams) -> Result<()> {
    sink.write_u32::<LE>(params.kind.num_components() as u32)?;
    write_pairs(sink, &params.ranges)?;
    for w in params.white_point {
        sink.write_f32::<LE>(w)?;
    }
    match &params.matrix {
        Some(m) => {
            sink.write_u32::<LE>(1)?;
            for v in m.iter().flatten() {
                sink.write_f32::<LE>(*v)?;
            }
        }
        None => sink.write_u32::<LE>(0)?,
    }
    sink.write_u32::<LE>(params.lab as u32)?;
    Ok(())
}

fn read_cie<R: Read>(src: &mut R, kind: CieKind) -> Result<CieParams> {
    let n = src.read_u32::<LE>()? as usize;
    if n != kind.num_components() {
        return Err(Error::range(format!(
            "{:?} with {} components",
            kind, n
        )));
    }
    let ranges = read_pairs(src, n)?;
    let mut white = [0f32; 3];
    for w in white.iter_mut() {
        *w = src.read_f32::<LE>()?;
    }
    let matrix = match src.read_u32::<LE>()? {
        0 => None,
        _ => {
            let mut m = [[0f32; 3]; 3];
            for v in m.iter_mut().flatten() {
                *v = src.read_f32::<LE>()?;
            }
            Some(m)
        }
    };
    let lab = src.read_u32::<LE>()? != 0;
    Ok(CieParams {
        kind,
        ranges,
        white_point: white,
        matrix,
        lab,
    })
}

fn write_transform<W: Write>(sink: &mut W, t: Option<&TintTransform>) -> Result<()> {
    let Some(t) = t else {
        sink.write_u32::<LE>(FN_NONE)?;
        return Ok(());
    };
    let f = t.as_function().ok_or_else(|| {
        Error::Unimplemented("native tint transforms cannot be serialized".into())
    })?;
    match f {
        Function::Sampled(s) => {
            sink.write_u32::<LE>(FN_SAMPLED)?;
            sink.write_u32::<LE>(len_u32(s.domain().len())?)?;
            sink.write_u32::<LE>(len_u32(s.range().len())?)?;
            write_pairs(sink, s.domain())?;
            write_pairs(sink, s.range())?;
            for &size in s.size() {
                sink.write_u32::<LE>(len_u32(size)?)?;
            }
            sink.write_u32::<LE>(len_u32(s.samples().len())?)?;
            for &v in s.samples() {
                sink.write_f32::<LE>(v)?;
            }
        }
        Function::Exponential(e) => {
            sink.write_u32::<LE>(FN_EXPONENTIAL)?;
            sink.write_u32::<LE>(len_u32(e.c0().len())?)?;
            write_pairs(sink, &[e.domain()])?;
            for &v in e.c0().iter().chain(e.c1()) {
                sink.write_f32::<LE>(v)?;
            }
            sink.write_f32::<LE>(e.exponent())?;
            match e.range() {
                Some(r) => {
                    sink.write_u32::<LE>(1)?;
                    write_pairs(sink, r)?;
                }
                None => sink.write_u32::<LE>(0)?,
            }
        }
    }
    Ok(())
}

fn read_transform<R: Read>(src: &mut R) -> Result<Option<TintTransform>> {
    let f = match src.read_u32::<LE>()? {
        FN_NONE => return Ok(None),
        FN_SAMPLED => {
            let m = read_count(src)?;
            let n = read_count(src)?;
            let domain = read_pairs(src, m)?;
            let range = read_pairs(src, n)?;
            let mut size = Vec::new();
            size.try_reserve_exact(m)?;
            for _ in 0..m {
                size.push(src.read_u32::<LE>()? as usize);
            }
            let count = src.read_u32::<LE>()? as usize;
            if count > MAX_BLOB_LEN {
                return Err(Error::range(format!("{} samples", count)));
            }
            let samples = read_floats(src, count)?;
            Function::Sampled(SampledFunction::new(domain, range, size, samples)?)
        }
        FN_EXPONENTIAL => {
            let n = read_count(src)?;
            let domain = read_pairs(src, 1)?;
            let c0 = read_floats(src, n)?;
            let c1 = read_floats(src, n)?;
            let exponent = src.read_f32::<LE>()?;
            let range = match src.read_u32::<LE>()? {
                0 => None,
                _ => Some(read_pairs(src, n)?),
            };
            Function::Exponential(ExponentialFunction::new(domain[0], c0, c1, exponent, range)?)
        }
        other => return Err(Error::range(format!("unknown function type {}", other))),
    };
    Ok(Some(TintTransform::function(f)))
}

fn read_count<R: Read>(src: &mut R) -> Result<usize> {
    let n = src.read_u32::<LE>()? as usize;
    if n == 0 || n > crate::color::MAX_COMPONENTS {
        return Err(Error::range(format!("function arity {}", n)));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tint() -> TintTransform {
        TintTransform::function(Function::Exponential(
            ExponentialFunction::new((0.0, 1.0), vec![0.0; 4], vec![0.0, 0.5, 1.0, 0.0], 1.0, None)
                .unwrap(),
        ))
    }

    #[test]
    fn test_device_space_is_tag_only() {
        let mut buf = Vec::new();
        ColorSpace::device_cmyk().serialize(&mut buf).unwrap();
        assert_eq!(buf, 2u32.to_le_bytes());
    }

    #[test]
    fn test_separation_layout() {
        let cs = ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), Some(tint())).unwrap();
        let mut buf = Vec::new();
        cs.serialize(&mut buf).unwrap();
        assert_eq!(&buf[0..4], &7u32.to_le_bytes());
        assert_eq!(&buf[4..8], &1u32.to_le_bytes());
        assert_eq!(&buf[8..15], b"Orange\0");
        assert_eq!(&buf[15..19], &2u32.to_le_bytes());
        assert_eq!(&buf[19..23], &FN_EXPONENTIAL.to_le_bytes());
        assert_eq!(&buf[buf.len() - 4..], &SepType::Other.tag().to_le_bytes());

        let back = ColorSpace::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(back.space_type(), SpaceType::Separation);
        assert_eq!(back.colorant_names().unwrap(), ["Orange".to_string()]);
        assert!(back.registry().unwrap().transform().is_some());
    }

    #[test]
    fn test_callback_is_unimplemented() {
        let t = TintTransform::callback(1, 1, |i, o| {
            o[0] = i[0];
            Ok(())
        });
        let cs = ColorSpace::new_separation("Spot", ColorSpace::device_gray(), Some(t)).unwrap();
        let err = cs.serialize(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Unimplemented(_)));
    }

    #[test]
    fn test_missing_transform_uses_sentinel() {
        let cs = ColorSpace::new_devicen(&["A", "B"], ColorSpace::device_gray(), None).unwrap();
        let mut buf = Vec::new();
        cs.serialize(&mut buf).unwrap();
        assert_eq!(&buf[buf.len() - 4..], &FN_NONE.to_le_bytes());
        let back = ColorSpace::deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(back.num_components(), 2);
        assert!(back.registry().unwrap().transform().is_none());
    }

    #[test]
    fn test_truncated_input_is_io_error() {
        let cs = ColorSpace::new_indexed(ColorSpace::device_rgb(), 1, &[0, 0, 0, 255, 255, 255]).unwrap();
        let mut buf = Vec::new();
        cs.serialize(&mut buf).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(matches!(
            ColorSpace::deserialize(&mut buf.as_slice()),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_synthesized_profile_is_unimplemented() {
        let cs = ColorSpace::new_icc(Arc::new(IccProfile::default_rgb()), None).unwrap();
        assert!(matches!(
            cs.serialize(&mut Vec::new()),
            Err(Error::Unimplemented(_))
        ));
    }
}
