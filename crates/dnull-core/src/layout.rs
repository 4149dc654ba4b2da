// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Double-Null Index Layout
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Poloidal index boundaries shared by every reflection.
//!
//! The half domain is numbered inner target → inner core cut, then
//! outer core cut → outer target. The double null is numbered lower inner
//! target → upper inner target, then upper outer target → lower outer
//! target.

use dnull_types::error::{FusionError, FusionResult};
use dnull_types::state::GridMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLayout {
    /// Poloidal cells of the half domain, guard cells excluded.
    pub half_nx: usize,
    /// Radial cells, guard cells excluded.
    pub half_ny: usize,
    /// Rows of the inner half (leg + core + one guard cell).
    pub half_inner: usize,
    /// Rows of the outer half (leg + core + one guard cell).
    pub half_outer: usize,
    pub full_inner: usize,
    pub full_outer: usize,
}

impl IndexLayout {
    pub fn new(
        half_nx: usize,
        half_ny: usize,
        half_inner: usize,
        half_outer: usize,
    ) -> FusionResult<Self> {
        if half_nx == 0 || half_ny == 0 {
            return Err(FusionError::Layout(format!(
                "domain sizes must be positive: nx={half_nx}, ny={half_ny}"
            )));
        }
        // The staggered repair reads row 2*half_inner - 4.
        if half_inner < 2 || half_outer < 2 {
            return Err(FusionError::Layout(format!(
                "each half needs at least one cell plus its guard: inner={half_inner}, outer={half_outer}"
            )));
        }
        if half_inner + half_outer != half_nx + 2 {
            return Err(FusionError::Layout(format!(
                "inner ({half_inner}) + outer ({half_outer}) rows must equal nx + 2 = {}",
                half_nx + 2
            )));
        }
        Ok(IndexLayout {
            half_nx,
            half_ny,
            half_inner,
            half_outer,
            full_inner: 2 * half_inner - 2,
            full_outer: 2 * half_outer - 2,
        })
    }

    /// Layout of the half-domain grid currently held by the solver.
    pub fn from_grid(grid: &GridMetadata) -> FusionResult<Self> {
        Self::new(
            grid.nx,
            grid.ny,
            grid.inner_leg + grid.inner_core + 1,
            grid.outer_leg + grid.outer_core + 1,
        )
    }

    /// Poloidal rows of a half-domain array.
    pub fn half_extent(&self) -> usize {
        self.half_nx + 2
    }

    /// Poloidal rows of a full-domain array.
    pub fn full_extent(&self) -> usize {
        2 * self.half_nx
    }

    /// Radial columns of both half- and full-domain arrays.
    pub fn radial_extent(&self) -> usize {
        self.half_ny + 2
    }

    /// `nx` of the regenerated double-null grid.
    pub fn full_nx(&self) -> usize {
        self.full_extent() - 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let layout = IndexLayout::new(7, 4, 4, 5).unwrap();
        assert_eq!(layout.full_inner, 6);
        assert_eq!(layout.full_outer, 8);
        assert_eq!(layout.half_extent(), 9);
        assert_eq!(layout.full_extent(), 14);
        assert_eq!(layout.full_nx(), 12);
        assert_eq!(layout.radial_extent(), 6);
    }

    #[test]
    fn test_from_grid_counts_guard_cell() {
        let grid = GridMetadata {
            nx: 7,
            ny: 4,
            inner_leg: 2,
            inner_core: 1,
            outer_leg: 2,
            outer_core: 2,
            n_ion_species: 1,
            n_flow_species: 1,
            n_gas_species: 1,
        };
        let layout = IndexLayout::from_grid(&grid).unwrap();
        assert_eq!(layout, IndexLayout::new(7, 4, 4, 5).unwrap());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = IndexLayout::new(30, 10, 12, 20).unwrap();
        let b = IndexLayout::new(30, 10, 12, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_rejects_invalid_inputs() {
        assert!(IndexLayout::new(0, 4, 1, 1).is_err());
        assert!(IndexLayout::new(7, 0, 4, 5).is_err());
        assert!(IndexLayout::new(7, 4, 1, 8).is_err());
        assert!(IndexLayout::new(7, 4, 8, 1).is_err());
        assert!(IndexLayout::new(7, 4, 4, 4).is_err());
    }
}
