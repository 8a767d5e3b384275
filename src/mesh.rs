//! The shared structured mesh.
//!
//! A profile is one-dimensional, so the zone is a "ribbon": the station
//! positions along I, extruded one cell wide across J and K. Node arrays are
//! stored K-major, then J, then I, the ordering every backend writes.

use crate::config::{RIBBON_WIDTH, ZONE_NAME};
use crate::error::MeshError;

/// Bumps stations that repeat their predecessor so no segment has zero
/// length. The n-th repeat in a run moves by `n * fudge`.
pub fn adjust_positions(x: &[f64], fudge: f64) -> Vec<f64> {
    let mut adjusted = Vec::with_capacity(x.len());
    let mut run = 0.0;
    for (i, &value) in x.iter().enumerate() {
        if i > 0 && value == x[i - 1] {
            run += 1.0;
        } else {
            run = 0.0;
        }
        adjusted.push(value + run * fudge);
    }
    adjusted
}

// Cell counts along I, J and K
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDims {
    pub ni: usize,
    pub nj: usize,
    pub nk: usize,
}

impl CellDims {
    pub fn nodes(&self) -> [usize; 3] {
        [self.ni + 1, self.nj + 1, self.nk + 1]
    }

    pub fn cell_count(&self) -> usize {
        self.ni * self.nj * self.nk
    }

    pub fn node_count(&self) -> usize {
        let [i, j, k] = self.nodes();
        i * j * k
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredZone {
    pub name: String,
    pub dims: CellDims,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl StructuredZone {
    pub fn ribbon(positions: &[f64]) -> Result<Self, MeshError> {
        Self::extrude(positions, 1, 1, RIBBON_WIDTH)
    }

    /// Extrudes `positions` across `nj` by `nk` cells of a `width` square
    /// centred on zero.
    pub fn extrude(
        positions: &[f64],
        nj: usize,
        nk: usize,
        width: f64,
    ) -> Result<Self, MeshError> {
        if positions.len() < 2 {
            return Err(MeshError::TooFewStations(positions.len()));
        }
        let dims = CellDims {
            ni: positions.len() - 1,
            nj: nj.max(1),
            nk: nk.max(1),
        };
        let dy = width / dims.nj as f64;
        let dz = width / dims.nk as f64;
        let origin = -width / 2.0;

        let n = dims.node_count();
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut z = Vec::with_capacity(n);
        for k in 0..=dims.nk {
            for j in 0..=dims.nj {
                for &xi in positions {
                    x.push(xi);
                    y.push(origin + j as f64 * dy);
                    z.push(origin + k as f64 * dz);
                }
            }
        }

        Ok(StructuredZone {
            name: ZONE_NAME.to_string(),
            dims,
            x,
            y,
            z,
        })
    }
}

/// Cell-centred midpoint averages of a nodal profile, repeated for every
/// J/K cell layer.
pub fn cell_average(values: &[f64], dims: CellDims) -> Result<Vec<f64>, MeshError> {
    if values.len() != dims.ni + 1 {
        return Err(MeshError::LengthMismatch {
            expected: dims.ni + 1,
            found: values.len(),
        });
    }
    let layer: Vec<f64> = values.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    let mut cells = Vec::with_capacity(dims.cell_count());
    for _ in 0..dims.nj * dims.nk {
        cells.extend_from_slice(&layer);
    }
    Ok(cells)
}
