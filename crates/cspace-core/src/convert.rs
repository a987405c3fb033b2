//! Standard process color conversions
//!
//! These are the fixed conversions device spaces fall back to when no
//! profile transform is available, and that equivalent-color capture uses
//! to express gray and RGB results as CMYK.

use crate::frac::{FRAC_1, Frac};

pub fn gray_to_cmyk(g: Frac) -> [Frac; 4] {
    [Frac::ZERO, Frac::ZERO, Frac::ZERO, g.invert()]
}

pub fn gray_to_rgb(g: Frac) -> [Frac; 3] {
    [g, g, g]
}

/// Black generation takes the common component, undercolor removal subtracts it
pub fn rgb_to_cmyk(rgb: [Frac; 3]) -> [Frac; 4] {
    let c = FRAC_1 - rgb[0].0;
    let m = FRAC_1 - rgb[1].0;
    let y = FRAC_1 - rgb[2].0;
    let k = c.min(m).min(y);
    [Frac(c - k), Frac(m - k), Frac(y - k), Frac(k)]
}

pub fn rgb_to_gray(rgb: [Frac; 3]) -> Frac {
    let v = rgb[0].0 as i32 * 30 + rgb[1].0 as i32 * 59 + rgb[2].0 as i32 * 11;
    Frac(((v + 50) / 100) as i16)
}

pub fn cmyk_to_rgb(cmyk: [Frac; 4]) -> [Frac; 3] {
    let k = cmyk[3].0 as i32;
    let f = |c: Frac| Frac((FRAC_1 as i32 - (c.0 as i32 + k).min(FRAC_1 as i32)) as i16);
    [f(cmyk[0]), f(cmyk[1]), f(cmyk[2])]
}

pub fn cmyk_to_gray(cmyk: [Frac; 4]) -> Frac {
    let v = cmyk[0].0 as i32 * 30 + cmyk[1].0 as i32 * 59 + cmyk[2].0 as i32 * 11;
    let not_gray = ((v + 50) / 100 + cmyk[3].0 as i32).min(FRAC_1 as i32);
    Frac((FRAC_1 as i32 - not_gray) as i16)
}

/// Float helpers for the CMM path
pub fn unit_rgb_to_cmyk(rgb: [f32; 3]) -> [f32; 4] {
    let c = 1.0 - rgb[0];
    let m = 1.0 - rgb[1];
    let y = 1.0 - rgb[2];
    let k = c.min(m).min(y);
    [c - k, m - k, y - k, k]
}

pub fn unit_cmyk_to_rgb(cmyk: [f32; 4]) -> [f32; 3] {
    [
        1.0 - (cmyk[0] + cmyk[3]).min(1.0),
        1.0 - (cmyk[1] + cmyk[3]).min(1.0),
        1.0 - (cmyk[2] + cmyk[3]).min(1.0),
    ]
}

pub fn unit_rgb_to_gray(rgb: [f32; 3]) -> f32 {
    rgb[0] * 0.30 + rgb[1] * 0.59 + rgb[2] * 0.11
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_to_cmyk() {
        assert_eq!(gray_to_cmyk(Frac::ONE), [Frac::ZERO; 4]);
        assert_eq!(gray_to_cmyk(Frac::ZERO)[3], Frac::ONE);
    }

    #[test]
    fn test_rgb_to_cmyk_removes_undercolor() {
        let red = rgb_to_cmyk([Frac::ONE, Frac::ZERO, Frac::ZERO]);
        assert_eq!(red, [Frac::ZERO, Frac::ONE, Frac::ONE, Frac::ZERO]);
        let black = rgb_to_cmyk([Frac::ZERO; 3]);
        assert_eq!(black, [Frac::ZERO, Frac::ZERO, Frac::ZERO, Frac::ONE]);
    }

    #[test]
    fn test_cmyk_to_rgb() {
        let rgb = cmyk_to_rgb([Frac::ONE, Frac::ZERO, Frac::ZERO, Frac::ZERO]);
        assert_eq!(rgb, [Frac::ZERO, Frac::ONE, Frac::ONE]);
        assert_eq!(cmyk_to_gray([Frac::ZERO; 4]), Frac::ONE);
    }

    #[test]
    fn test_rgb_to_gray_white() {
        assert_eq!(rgb_to_gray([Frac::ONE; 3]), Frac::ONE);
    }
}
