// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FusionError, FusionResult};

/// Grid-size metadata of an edge-plasma mesh.
///
/// `nx`/`ny` exclude guard cells; stored arrays are `[nx + 2, ny + 2, ...]`.
/// Poloidal ordering runs inner target → inner core cut, then outer core
/// cut → outer target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMetadata {
    pub nx: usize,
    pub ny: usize,
    /// Poloidal cells in the inner divertor leg.
    pub inner_leg: usize,
    /// Poloidal cells in the inner core region.
    pub inner_core: usize,
    /// Poloidal cells in the outer divertor leg.
    pub outer_leg: usize,
    /// Poloidal cells in the outer core region.
    pub outer_core: usize,
    /// Ion species count (trailing axis of density-like fields).
    pub n_ion_species: usize,
    /// Species carried by the parallel flow; `<= n_ion_species`.
    pub n_flow_species: usize,
    /// Neutral gas species count.
    pub n_gas_species: usize,
}

impl GridMetadata {
    /// Poloidal extent of stored arrays, guard cells included.
    pub fn poloidal_extent(&self) -> usize {
        self.nx + 2
    }

    /// Radial extent of stored arrays, guard cells included.
    pub fn radial_extent(&self) -> usize {
        self.ny + 2
    }
}

/// Numerical switches the conversion resets before regenerating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverControls {
    /// Poloidal cells omitted when the grid is split; 0 disables the split.
    pub grid_split_override: usize,
    pub fixed_left_boundary: bool,
    /// Solver may assume up-down symmetry of the solution.
    pub updown_symmetric: bool,
    /// Nonlinear convergence tolerance.
    pub tolerance: f64,
}

impl Default for SolverControls {
    fn default() -> Self {
        SolverControls {
            grid_split_override: 0,
            fixed_left_boundary: false,
            updown_symmetric: false,
            tolerance: 1e-8,
        }
    }
}

/// Physics model switches that change what the conversion touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicsModels {
    /// Impurities follow a prescribed fraction of the ion density.
    pub fixed_impurity_fraction: bool,
    /// Core boundary has a fixed power rather than a fixed temperature.
    pub fixed_core_power: bool,
}

/// Power crossing the core boundary [W].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorePower {
    pub electron: f64,
    pub ion: f64,
}

impl CorePower {
    pub fn scaled(&self, factor: f64) -> Self {
        CorePower {
            electron: self.electron * factor,
            ion: self.ion * factor,
        }
    }
}

/// Where on a cell a field is stored along the poloidal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staggering {
    CellCentred,
    /// Value `i` sits on the face between cells `i` and `i + 1`.
    UpperFace,
}

/// Named plasma fields the conversion reads and rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlasmaField {
    IonDensity,
    ElectronTemperature,
    IonTemperature,
    NeutralDensity,
    Potential,
    ElectronHeatDiffusivity,
    IonHeatDiffusivity,
    ParticleDiffusivity,
    ImpurityFraction,
    ParallelFlow,
}

impl PlasmaField {
    pub const ALL: [PlasmaField; 10] = [
        PlasmaField::IonDensity,
        PlasmaField::ElectronTemperature,
        PlasmaField::IonTemperature,
        PlasmaField::NeutralDensity,
        PlasmaField::Potential,
        PlasmaField::ElectronHeatDiffusivity,
        PlasmaField::IonHeatDiffusivity,
        PlasmaField::ParticleDiffusivity,
        PlasmaField::ImpurityFraction,
        PlasmaField::ParallelFlow,
    ];

    pub fn staggering(self) -> Staggering {
        match self {
            PlasmaField::ParallelFlow => Staggering::UpperFace,
            _ => Staggering::CellCentred,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlasmaField::IonDensity => "ion_density",
            PlasmaField::ElectronTemperature => "electron_temperature",
            PlasmaField::IonTemperature => "ion_temperature",
            PlasmaField::NeutralDensity => "neutral_density",
            PlasmaField::Potential => "potential",
            PlasmaField::ElectronHeatDiffusivity => "electron_heat_diffusivity",
            PlasmaField::IonHeatDiffusivity => "ion_heat_diffusivity",
            PlasmaField::ParticleDiffusivity => "particle_diffusivity",
            PlasmaField::ImpurityFraction => "impurity_fraction",
            PlasmaField::ParallelFlow => "parallel_flow",
        }
    }

    pub fn from_name(name: &str) -> FusionResult<Self> {
        PlasmaField::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| FusionError::UnknownField(name.to_string()))
    }
}

impl fmt::Display for PlasmaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Corner coordinates of every mesh cell.
/// `r[[ix, iy, k]]`, `z[[ix, iy, k]]`: k = 0 is the centre, 1..=4 the corners
/// (lower-left, lower-right, upper-left, upper-right in cell index space).
#[derive(Debug, Clone)]
pub struct MeshCorners {
    pub r: Array3<f64>,
    pub z: Array3<f64>,
}

impl MeshCorners {
    pub fn new(r: Array3<f64>, z: Array3<f64>) -> FusionResult<Self> {
        if r.dim() != z.dim() {
            return Err(FusionError::Shape {
                field: "mesh_z".into(),
                expected: r.shape().to_vec(),
                found: z.shape().to_vec(),
            });
        }
        if r.dim().2 != 5 {
            return Err(FusionError::Shape {
                field: "mesh_r".into(),
                expected: vec![r.dim().0, r.dim().1, 5],
                found: r.shape().to_vec(),
            });
        }
        Ok(MeshCorners { r, z })
    }

    /// Rectilinear mesh spanning `[r_min, r_max] × [z_min, z_max]`.
    pub fn rectilinear(nx: usize, ny: usize, r_min: f64, r_max: f64, z_min: f64, z_max: f64) -> Self {
        let dr = (r_max - r_min) / nx.max(1) as f64;
        let dz = (z_max - z_min) / ny.max(1) as f64;
        let mut r = Array3::zeros((nx, ny, 5));
        let mut z = Array3::zeros((nx, ny, 5));
        for ix in 0..nx {
            for iy in 0..ny {
                let r0 = r_min + ix as f64 * dr;
                let z0 = z_min + iy as f64 * dz;
                let corners = [
                    (r0 + 0.5 * dr, z0 + 0.5 * dz),
                    (r0, z0),
                    (r0 + dr, z0),
                    (r0, z0 + dz),
                    (r0 + dr, z0 + dz),
                ];
                for (k, (rc, zc)) in corners.into_iter().enumerate() {
                    r[[ix, iy, k]] = rc;
                    z[[ix, iy, k]] = zc;
                }
            }
        }
        MeshCorners { r, z }
    }

    /// `(poloidal, radial)` cell counts, guard cells included.
    pub fn cells(&self) -> (usize, usize) {
        let (nx, ny, _) = self.r.dim();
        (nx, ny)
    }

    /// Corners of one cell traced around its perimeter.
    pub fn polygon(&self, ix: usize, iy: usize) -> [(f64, f64); 4] {
        [1, 2, 4, 3].map(|k| (self.r[[ix, iy, k]], self.z[[ix, iy, k]]))
    }
}
