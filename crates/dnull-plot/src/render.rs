// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Mesh Field Rendering
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Colour-mapped plot of one value per cell on a quadrilateral mesh.
//!
//! The field must be shaped to the mesh it is drawn on, guard cells
//! included. After a conversion, pass the full-domain mesh corners.

use std::path::Path;

use dnull_types::error::{FusionError, FusionResult};
use dnull_types::state::MeshCorners;
use log::{debug, warn};
use ndarray::Array2;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::colormap::{ColorMap, Normalization};

/// Colour-bar resolution.
const BAR_STEPS: usize = 64;

/// Share of the drawing width given to the mesh; the rest holds the bar.
const PLOT_WIDTH_PERCENT: u32 = 85;

#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Same metres per pixel in R and Z.
    pub equal_aspect: bool,
    pub title: String,
    /// Flush the drawing area once drawn. File output is always flushed.
    pub show_immediately: bool,
    /// Viridis when unset.
    pub color_map: Option<ColorMap>,
    /// log10 colour scale; non-positive cells are left unfilled.
    pub log_scale: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            equal_aspect: false,
            title: "Edge plasma data".to_string(),
            show_immediately: true,
            color_map: None,
            log_scale: false,
        }
    }
}

fn render_error<E: std::fmt::Display>(err: E) -> FusionError {
    FusionError::Render(err.to_string())
}

/// `((r_min, r_max), (z_min, z_max))` over every cell corner.
pub fn mesh_bounds(mesh: &MeshCorners) -> ((f64, f64), (f64, f64)) {
    let (nx, ny) = mesh.cells();
    let mut r = (f64::INFINITY, f64::NEG_INFINITY);
    let mut z = (f64::INFINITY, f64::NEG_INFINITY);
    for ix in 0..nx {
        for iy in 0..ny {
            for (rc, zc) in mesh.polygon(ix, iy) {
                if rc.is_finite() && zc.is_finite() {
                    r = (r.0.min(rc), r.1.max(rc));
                    z = (z.0.min(zc), z.1.max(zc));
                }
            }
        }
    }
    (widen(r), widen(z))
}

/// Empty or zero-width ranges become drawable.
fn widen(range: (f64, f64)) -> (f64, f64) {
    if !range.0.is_finite() || !range.1.is_finite() {
        return (0.0, 1.0);
    }
    if (range.1 - range.0).abs() < 1e-12 {
        return (range.0 - 0.5, range.1 + 0.5);
    }
    range
}

/// Grow the narrower range about its centre so one metre spans the same
/// number of pixels on both axes.
pub fn equal_aspect_ranges(
    r: (f64, f64),
    z: (f64, f64),
    pixels: (u32, u32),
) -> ((f64, f64), (f64, f64)) {
    let (w, h) = (pixels.0.max(1) as f64, pixels.1.max(1) as f64);
    let scale = ((r.1 - r.0) / w).max((z.1 - z.0) / h);
    let grow = |range: (f64, f64), span: f64| {
        let mid = 0.5 * (range.0 + range.1);
        (mid - 0.5 * span, mid + 0.5 * span)
    };
    (grow(r, scale * w), grow(z, scale * h))
}

/// Fill every cell polygon with its colour. Cells whose value cannot be
/// shown are skipped; returns how many were drawn.
pub fn draw_cells<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    field: &Array2<f64>,
    mesh: &MeshCorners,
    norm: &Normalization,
    color_map: ColorMap,
) -> FusionResult<usize> {
    let (nx, ny) = mesh.cells();
    let mut cells = Vec::with_capacity(nx * ny);
    for ix in 0..nx {
        for iy in 0..ny {
            if let Some(x) = norm.position(field[[ix, iy]]) {
                cells.push((mesh.polygon(ix, iy), color_map.color(x)));
            }
        }
    }
    let drawn = cells.len();
    chart
        .draw_series(
            cells
                .into_iter()
                .map(|(poly, color)| Polygon::new(poly.to_vec(), color.filled())),
        )
        .map_err(render_error)?;
    Ok(drawn)
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    norm: &Normalization,
    color_map: ColorMap,
) -> FusionResult<()> {
    let (lo, hi) = if (norm.hi - norm.lo).abs() < 1e-300 {
        (norm.lo - 0.5, norm.hi + 0.5)
    } else {
        (norm.lo, norm.hi)
    };
    let mut bar = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(render_error)?;
    bar.configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .y_desc(if norm.log { "log10(value)" } else { "value" })
        .draw()
        .map_err(render_error)?;

    let step = (hi - lo) / BAR_STEPS as f64;
    bar.draw_series((0..BAR_STEPS).map(|k| {
        let y0 = lo + k as f64 * step;
        let x = (k as f64 + 0.5) / BAR_STEPS as f64;
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], color_map.color(x).filled())
    }))
    .map_err(render_error)?;
    Ok(())
}

/// Plot `field` on `mesh` into an existing drawing area.
///
/// Returns the colour normalisation used, so callers can label or reuse it.
pub fn plot_field_on<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    field: &Array2<f64>,
    mesh: &MeshCorners,
    options: &PlotOptions,
) -> FusionResult<Normalization> {
    let (nx, ny) = mesh.cells();
    if field.dim() != (nx, ny) {
        return Err(FusionError::Shape {
            field: "plotted field".into(),
            expected: vec![nx, ny],
            found: field.shape().to_vec(),
        });
    }

    let color_map = options.color_map.unwrap_or_default();
    let norm = Normalization::from_values(field.iter().copied(), options.log_scale);

    let width = area.dim_in_pixel().0;
    let (plot_area, bar_area) = area.split_horizontally(width * PLOT_WIDTH_PERCENT / 100);

    let (mut r, mut z) = mesh_bounds(mesh);
    if options.equal_aspect {
        // Pixel budget after margins and label areas
        let (pw, ph) = plot_area.dim_in_pixel();
        let inner = (pw.saturating_sub(90), ph.saturating_sub(100));
        (r, z) = equal_aspect_ranges(r, z, inner);
    }

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(20).x_label_area_size(40).y_label_area_size(50);
    if !options.title.is_empty() {
        builder.caption(&options.title, ("sans-serif", 20));
    }
    let mut chart = builder
        .build_cartesian_2d(r.0..r.1, z.0..z.1)
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_desc("R [m]")
        .y_desc("Z [m]")
        .draw()
        .map_err(render_error)?;

    let drawn = draw_cells(&mut chart, field, mesh, &norm, color_map)?;
    if drawn < nx * ny {
        warn!(
            "{} of {} cells not drawn (non-finite{})",
            nx * ny - drawn,
            nx * ny,
            if options.log_scale { " or non-positive" } else { "" }
        );
    }
    draw_color_bar(&bar_area, &norm, color_map)?;
    debug!("plotted {drawn} cells, range [{}, {}]", norm.lo, norm.hi);

    if options.show_immediately {
        area.present().map_err(render_error)?;
    }
    Ok(norm)
}

/// Plot `field` on `mesh` into a new PNG file.
pub fn plot_field_png<P: AsRef<Path>>(
    path: P,
    size: (u32, u32),
    field: &Array2<f64>,
    mesh: &MeshCorners,
    options: &PlotOptions,
) -> FusionResult<Normalization> {
    let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;
    let norm = plot_field_on(&root, field, mesh, options)?;
    root.present().map_err(render_error)?;
    Ok(norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_bounds_cover_corners() {
        let mesh = MeshCorners::rectilinear(4, 3, 1.0, 2.0, -0.5, 0.7);
        let (r, z) = mesh_bounds(&mesh);
        assert!((r.0 - 1.0).abs() < 1e-12 && (r.1 - 2.0).abs() < 1e-12);
        assert!((z.0 + 0.5).abs() < 1e-12 && (z.1 - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_equal_aspect_widens_narrow_axis() {
        // 1 m by 4 m into a square: R must grow to 4 m
        let (r, z) = equal_aspect_ranges((1.0, 2.0), (-2.0, 2.0), (400, 400));
        assert!((r.1 - r.0 - 4.0).abs() < 1e-12);
        assert!((0.5 * (r.0 + r.1) - 1.5).abs() < 1e-12);
        assert!((z.0 + 2.0).abs() < 1e-12 && (z.1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mesh = MeshCorners::rectilinear(4, 3, 1.0, 2.0, -0.5, 0.5);
        let field = Array2::<f64>::zeros((3, 4));
        let mut buf = vec![0u8; 64 * 64 * 3];
        let root = BitMapBackend::with_buffer(&mut buf, (64, 64)).into_drawing_area();
        let err = plot_field_on(&root, &field, &mesh, &PlotOptions::default()).unwrap_err();
        assert!(matches!(err, FusionError::Shape { .. }));
    }

    #[test]
    fn test_draw_cells_fills_buffer() {
        let mesh = MeshCorners::rectilinear(4, 4, 0.0, 1.0, 0.0, 1.0);
        let field = Array2::from_shape_fn((4, 4), |(i, j)| (i * 4 + j) as f64);
        let norm = Normalization::from_values(field.iter().copied(), false);
        let mut buf = vec![255u8; 32 * 32 * 3];
        let drawn = {
            let root = BitMapBackend::with_buffer(&mut buf, (32, 32)).into_drawing_area();
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(0.0..1.0, 0.0..1.0)
                .unwrap();
            let drawn = draw_cells(&mut chart, &field, &mesh, &norm, ColorMap::Greys).unwrap();
            root.present().unwrap();
            drawn
        };
        assert_eq!(drawn, 16);
        // Greys maps the maximum to black
        assert!(buf.chunks(3).any(|px| px[0] < 32 && px[1] < 32 && px[2] < 32));
    }

    #[test]
    fn test_draw_cells_skips_non_positive_in_log_scale() {
        let mesh = MeshCorners::rectilinear(2, 2, 0.0, 1.0, 0.0, 1.0);
        let field = Array2::from_shape_vec((2, 2), vec![-1.0, 0.0, 10.0, 100.0]).unwrap();
        let norm = Normalization::from_values(field.iter().copied(), true);
        let mut buf = vec![255u8; 16 * 16 * 3];
        let root = BitMapBackend::with_buffer(&mut buf, (16, 16)).into_drawing_area();
        let mut chart = ChartBuilder::on(&root)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)
            .unwrap();
        let drawn = draw_cells(&mut chart, &field, &mesh, &norm, ColorMap::Viridis).unwrap();
        assert_eq!(drawn, 2);
    }
}
