// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Up-Down Reflection of Half-Domain Fields
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reflection primitives turning a bottom-half field into a double-null one.
//!
//! Both reflectors double the poloidal axis and keep every trailing axis.
//! The lower legs are copied verbatim and the upper legs are mirrored in
//! between, so the two core cuts meet at the midplane.
//!
//! The parallel flow lives on upper cell faces. Its mirrored segments are
//! shifted down by one row and change sign, since reversing the poloidal
//! direction reverses the flow.

use dnull_types::error::{FusionError, FusionResult};
use dnull_types::state::{PlasmaField, Staggering};
use ndarray::{s, Array, Array3, ArrayBase, ArrayD, Axis, Data, Dimension, Ix3, Slice};

use crate::layout::IndexLayout;

fn rows(start: usize, end: usize) -> Slice {
    Slice::from(start..end)
}

fn rows_reversed(start: usize, end: usize) -> Slice {
    Slice::from(start..end).step_by(-1)
}

/// Check that `lower` is a half-domain array: `[nx + 2, ny + 2, ...]`.
pub fn check_half_shape<S, D>(
    field: &str,
    lower: &ArrayBase<S, D>,
    layout: &IndexLayout,
) -> FusionResult<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let found = lower.shape().to_vec();
    let mut expected = found.clone();
    if expected.len() < 2 {
        expected = vec![layout.half_extent(), layout.radial_extent()];
    } else {
        expected[0] = layout.half_extent();
        expected[1] = layout.radial_extent();
    }
    if found != expected {
        return Err(FusionError::Shape {
            field: field.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Reflect a cell-centred half-domain field.
///
/// Rows of the result, in write order:
/// 1. `[0, hi)` lower inner leg, copied.
/// 2. `[hi-1, 2hi-2)` upper inner leg, mirrored. Overwrites the guard row
///    `hi-1` shared with the lower leg.
/// 3. `[fi+ho-1, end)` lower outer leg, copied from `[hi+1, end)`.
/// 4. `[fi, fi+ho-1)` upper outer leg, mirrored from `[hi+1, end)`.
pub fn reflect_centered<S, D>(lower: &ArrayBase<S, D>, layout: &IndexLayout) -> FusionResult<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    check_half_shape("cell-centred field", lower, layout)?;

    let hi = layout.half_inner;
    let ho = layout.half_outer;
    let fi = layout.full_inner;
    let pol = Axis(0);

    let mut dim = lower.raw_dim();
    dim[0] = layout.full_extent();
    let mut full = Array::<f64, D>::zeros(dim);

    full.slice_axis_mut(pol, rows(0, hi))
        .assign(&lower.slice_axis(pol, rows(0, hi)));
    full.slice_axis_mut(pol, rows(hi - 1, 2 * hi - 2))
        .assign(&lower.slice_axis(pol, rows_reversed(0, hi - 1)));
    full.slice_axis_mut(pol, Slice::from(fi + ho - 1..))
        .assign(&lower.slice_axis(pol, Slice::from(hi + 1..)));
    full.slice_axis_mut(pol, rows(fi, fi + ho - 1))
        .assign(&lower.slice_axis(pol, Slice::from(hi + 1..).step_by(-1)));

    Ok(full)
}

/// Reflect the staggered parallel flow `[poloidal, radial, species]`.
///
/// Same construction as [`reflect_centered`] with the mirrored segments
/// starting one row lower and negated. Row `2hi-3` has no source face and
/// takes the value of row `2hi-4`.
pub fn reflect_staggered<S>(lower_flow: &ArrayBase<S, Ix3>, layout: &IndexLayout) -> FusionResult<Array3<f64>>
where
    S: Data<Elem = f64>,
{
    check_half_shape("parallel flow", lower_flow, layout)?;

    let hi = layout.half_inner;
    let ho = layout.half_outer;
    let fi = layout.full_inner;
    let pol = Axis(0);
    let (_, ny, nsp) = lower_flow.dim();

    let mut full = Array3::<f64>::zeros((layout.full_extent(), ny, nsp));

    full.slice_axis_mut(pol, rows(0, hi))
        .assign(&lower_flow.slice_axis(pol, rows(0, hi)));
    {
        let mut upper_inner = full.slice_axis_mut(pol, rows(hi - 2, 2 * hi - 3));
        upper_inner.assign(&lower_flow.slice_axis(pol, rows_reversed(0, hi - 1)));
        upper_inner.mapv_inplace(|v| -v);
    }
    full.slice_axis_mut(pol, Slice::from(fi + ho - 1..))
        .assign(&lower_flow.slice_axis(pol, Slice::from(hi + 1..)));
    {
        let mut upper_outer = full.slice_axis_mut(pol, rows(fi - 1, fi + ho - 2));
        upper_outer.assign(&lower_flow.slice_axis(pol, Slice::from(hi + 1..).step_by(-1)));
        upper_outer.mapv_inplace(|v| -v);
    }

    // Upper inner core-boundary face
    let (neighbour, mut face) =
        full.multi_slice_mut((s![2 * hi - 4, .., ..], s![2 * hi - 3, .., ..]));
    face.assign(&neighbour);

    Ok(full)
}

/// Reflect a named field, choosing the reflector from its staggering.
pub fn reflect_field(
    field: PlasmaField,
    lower: &ArrayD<f64>,
    layout: &IndexLayout,
) -> FusionResult<ArrayD<f64>> {
    let shape_error = |found: &[usize]| FusionError::Shape {
        field: field.name().to_string(),
        expected: vec![layout.half_extent(), layout.radial_extent()],
        found: found.to_vec(),
    };
    check_half_shape(field.name(), lower, layout)?;
    match field.staggering() {
        Staggering::CellCentred => reflect_centered(lower, layout),
        Staggering::UpperFace => {
            let flow = lower
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|_| shape_error(lower.shape()))?;
            Ok(reflect_staggered(&flow, layout)?.into_dyn())
        }
    }
}
