//! End-to-end remapping
//!
//! Installs a space in a graphics state painting on a fixture device, sets
//! a color, and checks the device components that come out.

use std::sync::Arc;

use cspace_core::{
    CieKind, CieParams, Classification, ColorSpace, ConcreteColor, DeviceValue, Error, Frac,
    IccManager, IccProfile, NamedColorTable, PaintOptions, TintTransform, pcs::D50,
};
use cspace_tests::fixtures::gstate_with;
use cspace_tests::{CountingTint, device, gstate, linear_cmyk};

/// Compare device components with unit values, allowing a few fixed-point steps
fn assert_components(actual: Option<&[Frac]>, expected: &[f32], tolerance: f32) {
    let actual = actual.expect("device color has components");
    assert_eq!(actual.len(), expected.len(), "component count: {:?}", actual);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a.to_unit() - e).abs() <= tolerance,
            "component {}: got {}, expected {} ({:?})",
            i,
            a.to_unit(),
            e,
            actual
        );
    }
}

const STEP: f32 = 2.0 / 32760.0;

#[test]
fn test_device_cmyk_passes_through() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let cmyk = ColorSpace::device_cmyk();
    gs.set_color_space(cmyk.clone()).unwrap();
    assert_components(gs.device_color().components(), &[0.0, 0.0, 0.0, 1.0], STEP);

    gs.set_color(&[0.2, 0.4, 0.6, 0.1]).unwrap();
    assert_components(gs.device_color().components(), &[0.2, 0.4, 0.6, 0.1], STEP);
    assert_eq!(gs.device_color().ccolor_space, Some(cmyk.id()));
    assert_eq!(
        gs.device_color().ccolor.as_ref().map(|c| c.as_slice().to_vec()),
        Some(vec![0.2, 0.4, 0.6, 0.1])
    );
    // Installing attaches the default profile
    assert!(cmyk.icc_profile().is_some());
}

#[test]
fn test_device_rgb_on_cmyk_device() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    gs.set_color_space(ColorSpace::device_rgb()).unwrap();
    gs.set_color(&[1.0, 0.0, 0.0]).unwrap();
    assert_components(gs.device_color().components(), &[0.0, 1.0, 1.0, 0.0], STEP);
}

#[test]
fn test_device_gray_on_rgb_device_leaves_spots_clear() {
    let dev = device("rgb").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    gs.set_color_space(ColorSpace::device_gray()).unwrap();
    gs.set_color(&[0.5]).unwrap();
    assert_components(gs.device_color().components(), &[0.5, 0.5, 0.5, 0.0], STEP);
}

#[test]
fn test_native_separation_paints_its_colorant() {
    let dev = device("cmyk_orange_green").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let orange =
        ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), Some(linear_cmyk([0.0, 0.6, 1.0, 0.0])))
            .unwrap();
    gs.set_color_space(orange.clone()).unwrap();
    assert!(!orange.uses_alternate(&gs));
    assert_eq!(gs.component_map().color_map.as_slice(), &[Some(4)]);
    assert_eq!(orange.classification(), Some(Classification::PureSpot));

    gs.set_color(&[0.75]).unwrap();
    assert_components(
        gs.device_color().components(),
        &[0.0, 0.0, 0.0, 0.0, 0.75, 0.0],
        STEP,
    );
}

#[test]
fn test_unknown_separation_uses_tint_transform() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let orange =
        ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), Some(linear_cmyk([0.0, 0.6, 1.0, 0.0])))
            .unwrap();
    gs.set_color_space(orange.clone()).unwrap();
    assert!(orange.uses_alternate(&gs));
    assert_eq!(
        orange.concrete_space(&gs).unwrap().space_type(),
        cspace_core::SpaceType::DeviceCmyk
    );

    gs.set_color(&[0.5]).unwrap();
    assert_components(gs.device_color().components(), &[0.0, 0.3, 0.5, 0.0], STEP);
    // The client color is recorded against the Separation, not its base
    assert_eq!(gs.device_color().ccolor_space, Some(orange.id()));
}

#[test]
fn test_tint_cache_reuses_last_result() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let tint = CountingTint::new();
    let orange = ColorSpace::new_separation(
        "Orange",
        ColorSpace::device_cmyk(),
        Some(tint.transform(vec![[0.0, 0.6, 1.0, 0.0]])),
    )
    .unwrap();
    gs.set_color_space(orange).unwrap();
    let start = tint.calls();

    let first = gs.concretize(&[0.5]).unwrap();
    let again = gs.concretize(&[0.5]).unwrap();
    assert_eq!(first, again);
    assert_eq!(tint.calls(), start + 1);

    gs.concretize(&[0.25]).unwrap();
    gs.concretize(&[0.25]).unwrap();
    assert_eq!(tint.calls(), start + 2);

    // One entry only: going back misses
    gs.concretize(&[0.5]).unwrap();
    assert_eq!(tint.calls(), start + 3);
}

#[test]
fn test_separation_none_paints_nothing() {
    let dev = device("cmyk_orange_green").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let none = ColorSpace::new_separation("None", ColorSpace::device_cmyk(), None).unwrap();
    gs.set_color_space(none).unwrap();
    gs.set_color(&[1.0]).unwrap();
    assert_eq!(gs.device_color().value, DeviceValue::Null);
}

#[test]
fn test_separation_all_paints_every_component() {
    let dev = device("cmyk_orange_green").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let all = ColorSpace::new_separation("All", ColorSpace::device_cmyk(), None).unwrap();
    gs.set_color_space(all).unwrap();
    gs.set_color(&[0.5]).unwrap();
    assert_components(gs.device_color().components(), &[0.5; 6], STEP);
}

#[test]
fn test_native_devicen_follows_component_map() {
    let dev = device("cmyk_orange_green").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let space =
        ColorSpace::new_devicen(&["Orange", "Cyan", "None"], ColorSpace::device_cmyk(), None).unwrap();
    gs.set_color_space(space.clone()).unwrap();
    assert!(!space.uses_alternate(&gs));
    assert_eq!(space.classification(), Some(Classification::Mixed));

    gs.set_color(&[0.5, 0.25, 1.0]).unwrap();
    assert_components(
        gs.device_color().components(),
        &[0.25, 0.0, 0.0, 0.0, 0.5, 0.0],
        STEP,
    );
}

#[test]
fn test_devicen_with_ignored_colorant_stays_native() {
    let dev = device("cmyk_limited").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let space = ColorSpace::new_devicen(&["Orange", "Green"], ColorSpace::device_cmyk(), None).unwrap();
    gs.set_color_space(space.clone()).unwrap();
    assert!(!space.uses_alternate(&gs));
    assert_eq!(gs.component_map().color_map.as_slice(), &[Some(4), None]);
}

#[test]
fn test_devicen_profile_skips_tint_transform() {
    let dev = device("cmyk").unwrap();
    let nclr = IccProfile::nchannel(
        vec!["Green".into(), "Orange".into()],
        vec![[0.8, 0.0, 0.9, 0.0], [0.0, 0.6, 1.0, 0.0]],
    )
    .unwrap();
    let icc = IccManager::new().with_devicen_profile(Arc::new(nclr)).unwrap();
    let mut gs = gstate_with(&dev, icc, PaintOptions::new());

    let tint = CountingTint::new();
    let transform = tint.transform(vec![[0.0, 0.6, 1.0, 0.0], [0.8, 0.0, 0.9, 0.0]]);
    let space =
        ColorSpace::new_devicen(&["Orange", "Green"], ColorSpace::device_cmyk(), Some(transform)).unwrap();
    gs.set_color_space(space.clone()).unwrap();

    assert!(space.uses_alternate(&gs));
    assert_eq!(space.registry().unwrap().permutation(), Some(vec![1, 0]));
    assert_eq!(
        space.base_space().unwrap().space_type(),
        cspace_core::SpaceType::IccBased
    );

    gs.set_color(&[1.0, 0.0]).unwrap();
    assert_components(gs.device_color().components(), &[0.0, 0.6, 1.0, 0.0], 0.001);
    gs.set_color(&[0.0, 1.0]).unwrap();
    assert_components(gs.device_color().components(), &[0.8, 0.0, 0.9, 0.0], 0.001);
    assert_eq!(tint.calls(), 0);
}

#[test]
fn test_indexed_looks_up_base_color() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let space = ColorSpace::new_indexed(ColorSpace::device_rgb(), 1, &[255, 0, 0, 0, 0, 255]).unwrap();
    gs.set_color_space(space).unwrap();

    gs.set_color(&[0.4]).unwrap();
    assert_components(gs.device_color().components(), &[0.0, 1.0, 1.0, 0.0], STEP);
    assert_eq!(gs.client_color().as_slice(), &[0.0]);

    gs.set_color(&[7.0]).unwrap();
    assert_components(gs.device_color().components(), &[1.0, 1.0, 0.0, 0.0], STEP);
    assert_eq!(gs.client_color().as_slice(), &[1.0]);
}

#[test]
fn test_cie_lab_white_is_paper_white() {
    let dev = device("gray").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let lab = ColorSpace::new_cie(CieParams::lab(D50)).unwrap();
    gs.set_color_space(lab).unwrap();
    gs.set_color(&[100.0, 0.0, 0.0]).unwrap();
    assert_components(gs.device_color().components(), &[1.0], 0.02);
}

#[test]
fn test_pattern_cannot_be_concretized() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    gs.set_color_space(ColorSpace::new_pattern(None).unwrap()).unwrap();
    assert!(matches!(gs.concretize(&[]), Err(Error::RangeCheck(_))));
    assert_eq!(gs.device_color().value, DeviceValue::Unset);
}

#[test]
fn test_failed_install_keeps_previous_space() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let cmyk = ColorSpace::device_cmyk();
    gs.set_color_space(cmyk.clone()).unwrap();
    gs.set_color(&[0.1, 0.2, 0.3, 0.4]).unwrap();

    // Routed through the alternate, but there is no tint transform to run
    let broken = ColorSpace::new_separation("Orange", ColorSpace::device_cmyk(), None).unwrap();
    assert!(gs.set_color_space(broken).is_err());
    assert_eq!(gs.color_space().map(|s| s.id()), Some(cmyk.id()));
    assert_eq!(gs.client_color().as_slice(), &[0.1, 0.2, 0.3, 0.4]);
}

/// One tint driving L* from 0 to 100 with neutral a* and b*
fn tint_to_lightness() -> TintTransform {
    TintTransform::callback(1, 3, |input, output| {
        output[0] = 100.0 * input[0];
        output[1] = 0.0;
        output[2] = 0.0;
        Ok(())
    })
}

#[test]
fn test_devicen_over_cie_lab_uses_one_equivalent() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let lab = ColorSpace::new_cie(CieParams::lab(D50)).unwrap();
    let space = ColorSpace::new_devicen(&["Violet"], lab.clone(), Some(tint_to_lightness())).unwrap();
    gs.set_color_space(space.clone()).unwrap();
    assert!(space.uses_alternate(&gs));

    let equivalent = lab.icc_equivalent().expect("equivalent created on install");
    assert!(equivalent.icc_profile().unwrap().is_lab());

    let half = gs.concretize(&[0.5]).unwrap();
    let full = gs.concretize(&[1.0]).unwrap();
    assert!(Arc::ptr_eq(&lab.icc_equivalent().unwrap(), &equivalent));

    // Same fractions as concretizing the Lab values in the CIE space itself
    let mut direct = gstate(&dev, PaintOptions::new());
    direct.set_color_space(lab.clone()).unwrap();
    assert_eq!(half, direct.concretize(&[50.0, 0.0, 0.0]).unwrap());
    assert_eq!(full, direct.concretize(&[100.0, 0.0, 0.0]).unwrap());
    assert_eq!(full.as_slice()[0], Frac::ONE);
    assert!(Arc::ptr_eq(&lab.icc_equivalent().unwrap(), &equivalent));
}

#[test]
fn test_devicen_over_cie_def_rescales_into_default_rgb() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let def = ColorSpace::new_cie(CieParams::new(CieKind::Def).with_ranges(vec![(0.0, 2.0); 3])).unwrap();
    let tint = TintTransform::callback(1, 3, |input, output| {
        output[0] = input[0];
        output[1] = 0.5 * input[0];
        output[2] = 2.0 * input[0];
        Ok(())
    });
    let space = ColorSpace::new_devicen(&["Violet"], def.clone(), Some(tint)).unwrap();
    gs.set_color_space(space).unwrap();

    let conc = gs.concretize(&[1.0]).unwrap();
    assert_eq!(conc, ConcreteColor::from_unit(&[0.5, 0.25, 1.0]));
    let equivalent = def.icc_equivalent().unwrap();
    assert!(equivalent.icc_profile().unwrap().same_as(&gs.icc_manager().default_rgb()));

    gs.concretize(&[0.25]).unwrap();
    assert!(Arc::ptr_eq(&def.icc_equivalent().unwrap(), &equivalent));
}

#[test]
fn test_devicen_over_icc_lab_normalizes_lab() {
    let dev = device("cmyk").unwrap();
    let mut gs = gstate(&dev, PaintOptions::new());
    let lab = ColorSpace::new_icc(Arc::new(IccProfile::lab()), None).unwrap();
    let tint = TintTransform::callback(1, 3, |input, output| {
        output[0] = 50.0 * input[0];
        output[1] = 0.0;
        output[2] = 127.0 * input[0];
        Ok(())
    });
    let space = ColorSpace::new_devicen(&["Violet"], lab, Some(tint)).unwrap();
    gs.set_color_space(space).unwrap();

    let conc = gs.concretize(&[1.0]).unwrap();
    let a = (0.0f32 + 128.0) / 255.0;
    let b = (127.0f32 + 128.0) / 255.0;
    assert_eq!(conc, ConcreteColor::from_unit(&[0.5, a, b]));
    assert_eq!(conc.as_slice()[2], Frac::ONE);
}

#[test]
fn test_named_devicen_ignores_devicen_profiles() {
    let dev = device("cmyk").unwrap();
    let nclr = IccProfile::nchannel(vec!["Orange".into()], vec![[0.0, 0.6, 1.0, 0.0]]).unwrap();
    let icc = IccManager::new()
        .with_devicen_profile(Arc::new(nclr))
        .unwrap()
        .with_named_colors(NamedColorTable::new().with_color("Orange", [65.0, 45.0, 75.0]));
    let mut gs = gstate_with(&dev, icc, PaintOptions::new());

    let tint = CountingTint::new();
    let space = ColorSpace::new_devicen(
        &["Orange"],
        ColorSpace::device_cmyk(),
        Some(tint.transform(vec![[0.0, 0.6, 1.0, 0.0]])),
    )
    .unwrap();
    gs.set_color_space(space.clone()).unwrap();

    assert!(!space.uses_alternate(&gs));
    assert!(space.registry().unwrap().named_supported());
    assert!(space.icc_profile().is_none());
    assert_eq!(space.base_space().unwrap().space_type(), cspace_core::SpaceType::DeviceCmyk);

    gs.set_color(&[0.5]).unwrap();
    assert_eq!(gs.device_color().components().map(|c| c.len()), Some(4));
    assert_eq!(tint.calls(), 0);
}
