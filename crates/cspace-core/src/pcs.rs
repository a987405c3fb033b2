//! Profile connection space math
//!
//! CIE L*a*b* and XYZ relative to the D50 ICC illuminant, and the path
//! from XYZ to display sRGB used by synthesized profiles.

/// D50 reference white (ICC PCS)
pub const D50: [f32; 3] = [0.9642, 1.0, 0.8251];

const EPSILON: f32 = 216.0 / 24389.0;
const KAPPA: f32 = 24389.0 / 27.0;

/// Bradford-adapted XYZ(D50) to linear sRGB
const XYZ_D50_TO_SRGB: [[f32; 3]; 3] = [
    [3.1338561, -1.6168667, -0.4906146],
    [-0.9787684, 1.9161415, 0.0334540],
    [0.0719453, -0.2289914, 1.4052427],
];

/// Linear sRGB to XYZ(D50)
const SRGB_TO_XYZ_D50: [[f32; 3]; 3] = [
    [0.4360747, 0.3850649, 0.1430804],
    [0.2225045, 0.7168786, 0.0606169],
    [0.0139322, 0.0971045, 0.7141733],
];

/// Lab white
pub const LAB_WHITE: [f32; 3] = [100.0, 0.0, 0.0];

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    let t3 = t * t * t;
    if t3 > EPSILON { t3 } else { (116.0 * t - 16.0) / KAPPA }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// Lab to XYZ against `white`
pub fn lab_to_xyz(lab: [f32; 3], white: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = fy + lab[1] / 500.0;
    let fz = fy - lab[2] / 200.0;
    [
        white[0] * lab_f_inv(fx),
        white[1] * lab_f_inv(fy),
        white[2] * lab_f_inv(fz),
    ]
}

/// XYZ to Lab against `white`
pub fn xyz_to_lab(xyz: [f32; 3], white: [f32; 3]) -> [f32; 3] {
    let fx = lab_f(xyz[0] / white[0]);
    let fy = lab_f(xyz[1] / white[1]);
    let fz = lab_f(xyz[2] / white[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

#[inline]
fn srgb_encode(v: f32) -> f32 {
    let v = v.clamp(0.0, 1.0);
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// XYZ (D50) to gamma-encoded sRGB, clamped to `[0, 1]`
pub fn xyz_to_srgb(xyz: [f32; 3]) -> [f32; 3] {
    let m = &XYZ_D50_TO_SRGB;
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(m) {
        *o = srgb_encode(row[0] * xyz[0] + row[1] * xyz[1] + row[2] * xyz[2]);
    }
    out
}

#[inline]
fn srgb_decode(v: f32) -> f32 {
    let v = v.clamp(0.0, 1.0);
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Gamma-encoded sRGB to XYZ (D50)
pub fn srgb_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    let lin = rgb.map(srgb_decode);
    let m = &SRGB_TO_XYZ_D50;
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(m) {
        *o = row[0] * lin[0] + row[1] * lin[1] + row[2] * lin[2];
    }
    out
}

/// Scale XYZ from `white` to D50 (von Kries on XYZ)
pub fn adapt_to_d50(xyz: [f32; 3], white: [f32; 3]) -> [f32; 3] {
    let mut out = xyz;
    for i in 0..3 {
        if white[i] > 0.0 {
            out[i] = xyz[i] * D50[i] / white[i];
        }
    }
    out
}
