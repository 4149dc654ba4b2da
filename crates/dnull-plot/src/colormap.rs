// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Colour Maps
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named colour maps and value normalisation for cell plots.

use dnull_types::error::{FusionError, FusionResult};
use plotters::style::RGBColor;

/// Viridis sampled at 0, 1/4, 1/2, 3/4, 1.
const VIRIDIS_STOPS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    #[default]
    Viridis,
    /// Blue at the minimum, white at the midpoint, red at the maximum.
    BlueWhiteRed,
    /// White at the minimum, black at the maximum.
    Greys,
}

impl ColorMap {
    pub fn from_name(name: &str) -> FusionResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "viridis" => Ok(ColorMap::Viridis),
            "bwr" | "blue-white-red" => Ok(ColorMap::BlueWhiteRed),
            "greys" | "grays" => Ok(ColorMap::Greys),
            other => Err(FusionError::ConfigError(format!(
                "unknown colour map '{other}'"
            ))),
        }
    }

    /// Colour at `x` in [0, 1]; values outside are clamped.
    pub fn color(self, x: f64) -> RGBColor {
        let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            ColorMap::Viridis => {
                let scaled = x * (VIRIDIS_STOPS.len() - 1) as f64;
                let i = (scaled.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
                let t = scaled - i as f64;
                let (a, b) = (VIRIDIS_STOPS[i], VIRIDIS_STOPS[i + 1]);
                let lerp = |p: u8, q: u8| (p as f64 + t * (q as f64 - p as f64)).round() as u8;
                RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
            }
            ColorMap::BlueWhiteRed => {
                let r = (255.0 * (2.0 * x).min(1.0)) as u8;
                let b = (255.0 * (2.0 * (1.0 - x)).min(1.0)) as u8;
                let g = (255.0 * (1.0 - 2.0 * (x - 0.5).abs())).clamp(0.0, 255.0) as u8;
                RGBColor(r, g, b)
            }
            ColorMap::Greys => {
                let v = (255.0 * (1.0 - x)).round() as u8;
                RGBColor(v, v, v)
            }
        }
    }
}

/// Maps data values to [0, 1], linearly or in log10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Lower bound in display units (log10 of the value when `log`).
    pub lo: f64,
    pub hi: f64,
    pub log: bool,
}

impl Normalization {
    /// Range over the finite values (positive ones when `log`).
    /// Falls back to [0, 1] when no value qualifies.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I, log: bool) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in values {
            if let Some(d) = display_value(v, log) {
                lo = lo.min(d);
                hi = hi.max(d);
            }
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        Normalization { lo, hi, log }
    }

    /// Position of `v` in [0, 1], or `None` if it cannot be shown.
    pub fn position(&self, v: f64) -> Option<f64> {
        let d = display_value(v, self.log)?;
        let span = self.hi - self.lo;
        if span.abs() < 1e-300 {
            return Some(0.5);
        }
        Some(((d - self.lo) / span).clamp(0.0, 1.0))
    }
}

fn display_value(v: f64, log: bool) -> Option<f64> {
    if !v.is_finite() {
        return None;
    }
    if log {
        if v <= 0.0 {
            return None;
        }
        return Some(v.log10());
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_maps() {
        assert_eq!(ColorMap::from_name("viridis").unwrap(), ColorMap::Viridis);
        assert_eq!(ColorMap::from_name("BWR").unwrap(), ColorMap::BlueWhiteRed);
        assert_eq!(ColorMap::from_name("greys").unwrap(), ColorMap::Greys);
        assert!(ColorMap::from_name("jet").is_err());
    }

    #[test]
    fn test_map_endpoints() {
        assert_eq!(ColorMap::Viridis.color(0.0), RGBColor(68, 1, 84));
        assert_eq!(ColorMap::Viridis.color(1.0), RGBColor(253, 231, 37));
        assert_eq!(ColorMap::BlueWhiteRed.color(0.0), RGBColor(0, 0, 255));
        assert_eq!(ColorMap::BlueWhiteRed.color(0.5), RGBColor(255, 255, 255));
        assert_eq!(ColorMap::BlueWhiteRed.color(1.0), RGBColor(255, 0, 0));
        assert_eq!(ColorMap::Greys.color(0.0), RGBColor(255, 255, 255));
        assert_eq!(ColorMap::Greys.color(2.0), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_linear_normalization() {
        let norm = Normalization::from_values([2.0, 4.0, f64::NAN, 6.0], false);
        assert_eq!((norm.lo, norm.hi), (2.0, 6.0));
        assert_eq!(norm.position(4.0), Some(0.5));
        assert_eq!(norm.position(10.0), Some(1.0));
        assert_eq!(norm.position(f64::INFINITY), None);
    }

    #[test]
    fn test_log_normalization_skips_non_positive() {
        let norm = Normalization::from_values([-1.0, 0.0, 10.0, 1000.0], true);
        assert!((norm.lo - 1.0).abs() < 1e-12);
        assert!((norm.hi - 3.0).abs() < 1e-12);
        assert_eq!(norm.position(0.0), None);
        assert!((norm.position(100.0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_ranges() {
        let flat = Normalization::from_values([3.0, 3.0], false);
        assert_eq!(flat.position(3.0), Some(0.5));
        let empty = Normalization::from_values([-2.0], true);
        assert_eq!((empty.lo, empty.hi), (0.0, 1.0));
    }
}
