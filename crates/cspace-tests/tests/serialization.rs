//! Serialized color spaces

use cspace_core::{
    CieKind, CieParams, ColorSpace, Error, ExponentialFunction, Function, SampledFunction, SepType,
    SpaceType, TintTransform,
};
use cspace_tests::{CountingTint, linear_cmyk};

fn round_trip(space: &ColorSpace) -> std::sync::Arc<ColorSpace> {
    let mut buf = Vec::new();
    space.serialize(&mut buf).unwrap();
    let mut src = buf.as_slice();
    let back = ColorSpace::deserialize(&mut src).unwrap();
    assert!(src.is_empty(), "{} trailing bytes", src.len());
    back
}

fn sampled_two_to_four() -> TintTransform {
    // 2x2 grid: first input drives cyan, second drives yellow
    let samples = vec![
        0.0, 0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        1.0, 0.0, 1.0, 0.0,
    ];
    let f = SampledFunction::new(
        vec![(0.0, 1.0); 2],
        vec![(0.0, 1.0); 4],
        vec![2, 2],
        samples,
    )
    .unwrap();
    TintTransform::function(Function::Sampled(f))
}

#[test]
fn test_device_spaces() {
    for space in [
        ColorSpace::device_gray(),
        ColorSpace::device_rgb(),
        ColorSpace::device_cmyk(),
    ] {
        let back = round_trip(&space);
        assert_eq!(back.space_type(), space.space_type());
        assert_ne!(back.id(), space.id());
    }
}

#[test]
fn test_devicen_with_sampled_function() {
    let space = ColorSpace::new_devicen(&["Orange", "Green"], ColorSpace::device_cmyk(), Some(sampled_two_to_four()))
        .unwrap();
    let back = round_trip(&space);
    assert_eq!(back.space_type(), SpaceType::DeviceN);
    assert_eq!(back.colorant_names(), space.colorant_names());
    assert_eq!(back.base_space().unwrap().space_type(), SpaceType::DeviceCmyk);
    let original = space.registry().unwrap().transform().unwrap();
    let restored = back.registry().unwrap().transform().unwrap();
    assert_eq!(restored.as_function(), original.as_function());
}

#[test]
fn test_separation_keeps_type() {
    for (name, sep_type) in [("None", SepType::None), ("All", SepType::All), ("Orange", SepType::Other)] {
        let space = ColorSpace::new_separation(name, ColorSpace::device_cmyk(), Some(linear_cmyk([0.0, 0.6, 1.0, 0.0])))
            .unwrap();
        let back = round_trip(&space);
        assert_eq!(back.separation_type(), Some(sep_type));
        assert_eq!(back.colorant_names().unwrap(), [name.to_string()]);
    }
}

#[test]
fn test_empty_colorant_name() {
    let space = ColorSpace::new_separation("", ColorSpace::device_gray(), None).unwrap();
    let back = round_trip(&space);
    assert_eq!(back.colorant_names().unwrap(), [String::new()]);
}

#[test]
fn test_indexed_over_separation() {
    let sep = ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), Some(linear_cmyk([0.0, 0.6, 1.0, 0.0])))
        .unwrap();
    let table: Vec<u8> = (0..=255).collect();
    let space = ColorSpace::new_indexed(sep, 255, &table).unwrap();
    let back = round_trip(&space);
    let ix = back.indexed().unwrap();
    assert_eq!(ix.hival(), 255);
    assert_eq!(ix.table(), table.as_slice());
    assert_eq!(back.base_space().unwrap().space_type(), SpaceType::Separation);
}

#[test]
fn test_cie_parameters() {
    let params = CieParams::new(CieKind::Abc)
        .with_ranges(vec![(0.0, 2.0), (-1.0, 1.0), (0.0, 0.5)])
        .with_white_point([0.9505, 1.0, 1.089])
        .with_matrix([[0.4124, 0.2126, 0.0193], [0.3576, 0.7152, 0.1192], [0.1805, 0.0722, 0.9505]]);
    let space = ColorSpace::new_cie(params.clone()).unwrap();
    let back = round_trip(&space);
    assert_eq!(back.space_type(), SpaceType::CieAbc);
    assert_eq!(back.cie_params(), Some(&params));
}

#[test]
fn test_exponential_with_range() {
    let f = ExponentialFunction::new(
        (0.0, 1.0),
        vec![0.0, 0.0, 0.0, 0.0],
        vec![0.2, 0.4, 0.6, 0.8],
        2.2,
        Some(vec![(0.0, 1.0); 4]),
    )
    .unwrap();
    let space = ColorSpace::new_separation(
        "Spot",
        ColorSpace::device_cmyk(),
        Some(TintTransform::function(Function::Exponential(f.clone()))),
    )
    .unwrap();
    let back = round_trip(&space);
    let restored = back.registry().unwrap().transform().unwrap();
    assert_eq!(restored.as_function(), Some(&Function::Exponential(f)));
}

#[test]
fn test_unserializable_spaces() {
    let callback = CountingTint::new().transform(vec![[0.0, 0.0, 0.0, 1.0]]);
    let sep = ColorSpace::new_separation("Spot", ColorSpace::device_cmyk(), Some(callback)).unwrap();
    assert!(matches!(sep.serialize(&mut Vec::new()), Err(Error::Unimplemented(_))));

    let pattern = ColorSpace::new_pattern(None).unwrap();
    assert!(matches!(pattern.serialize(&mut Vec::new()), Err(Error::Unimplemented(_))));

    // The failure surfaces from inside the base space
    let mut buf = Vec::new();
    let indexed = ColorSpace::new_indexed(sep, 0, &[0]).unwrap();
    assert!(indexed.serialize(&mut buf).is_err());
}

#[test]
fn test_rejects_unknown_tag() {
    let bytes = 99u32.to_le_bytes();
    assert!(matches!(
        ColorSpace::deserialize(&mut bytes.as_slice()),
        Err(Error::RangeCheck(_))
    ));
}

#[test]
fn test_rejects_mismatched_separation_type() {
    let space = ColorSpace::new_separation("None", ColorSpace::device_gray(), None).unwrap();
    let mut buf = Vec::new();
    space.serialize(&mut buf).unwrap();
    let n = buf.len();
    buf[n - 4..].copy_from_slice(&SepType::Other.tag().to_le_bytes());
    assert!(ColorSpace::deserialize(&mut buf.as_slice()).is_err());
}

#[test]
fn test_rejects_nan_function_range() {
    let f = ExponentialFunction::new(
        (0.0, 1.0),
        vec![0.0; 4],
        vec![0.0, 0.6, 1.0, 0.0],
        1.0,
        Some(vec![(0.0, 1.0); 4]),
    )
    .unwrap();
    let space = ColorSpace::new_separation(
        "Orange",
        ColorSpace::device_cmyk(),
        Some(TintTransform::function(Function::Exponential(f))),
    )
    .unwrap();
    let mut buf = Vec::new();
    space.serialize(&mut buf).unwrap();

    // Four range pairs sit just before the trailing separation type
    let n = buf.len();
    for chunk in buf[n - 4 - 32..n - 4].chunks_mut(4) {
        chunk.copy_from_slice(&f32::NAN.to_le_bytes());
    }
    assert!(matches!(
        ColorSpace::deserialize(&mut buf.as_slice()),
        Err(Error::RangeCheck(_))
    ));
}
