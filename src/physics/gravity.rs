//! Gravity calculation for rocket physics.
//!
//! Computes the gravitational acceleration of all bodies of a field. The same
//! function drives the integrator and the heatmap sampling, so the picture
//! and the flight never disagree.

use bevy::math::DVec2;
use wide::{f64x4, Select};

use crate::body::{Body, BodyId};
use crate::config::{FlightConfig, PlayArea};

/// A set of bodies under one gravitational constant.
#[derive(Clone, Debug, PartialEq)]
pub struct GravityField {
    bodies: Vec<Body>,
    gravity: f64,
    epsilon: f64,
}

impl GravityField {
    /// Create a field from a body set.
    ///
    /// Bodies are renumbered so that every body's id is its index.
    pub fn new(bodies: Vec<Body>, gravity: f64) -> Self {
        let bodies = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| body.with_id(BodyId(i)))
            .collect();
        Self {
            bodies,
            gravity,
            epsilon: 1.0,
        }
    }

    /// Create a field using the gravitational constant and singularity
    /// distance of `config`.
    pub fn from_config(bodies: Vec<Body>, config: &FlightConfig) -> Self {
        Self::new(bodies, config.gravity).with_epsilon(config.field_epsilon)
    }

    /// Distance below which a body contributes nothing.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Compute gravitational acceleration at a given position and time.
    ///
    /// # Arguments
    /// * `pos` - Position in meters
    /// * `time` - Simulation time in seconds
    /// * `excluded` - Body whose contribution is skipped (the launch body
    ///   while the rocket still touches it)
    ///
    /// # Returns
    /// Acceleration vector in m/s²
    #[inline]
    pub fn acceleration(&self, pos: DVec2, time: f64, excluded: Option<BodyId>) -> DVec2 {
        let epsilon_sq = self.epsilon * self.epsilon;
        let mut acc = DVec2::ZERO;

        for body in &self.bodies {
            if Some(body.id()) == excluded {
                continue;
            }
            let delta = body.position_at(time) - pos;
            let r_squared = delta.length_squared();

            // Coincident points would blow up; such a body simply does not pull.
            if r_squared < epsilon_sq || r_squared == 0.0 {
                continue;
            }
            let r = r_squared.sqrt();
            // a = GM/r² toward the body, delta/r is the unit vector
            acc += delta * (self.gravity * body.mass() / (r_squared * r));
        }

        acc
    }

    /// Acceleration from every body, for callers outside a flight.
    #[inline]
    pub fn acceleration_at(&self, pos: DVec2, time: f64) -> DVec2 {
        self.acceleration(pos, time, None)
    }

    /// First body, in ascending id order, that contains `pos` at `time`.
    pub fn containing_body(&self, pos: DVec2, time: f64) -> Option<&Body> {
        self.bodies.iter().find(|body| body.contains(pos, time))
    }

    /// Sample the field at the cell centers of a `rows` × `cols` grid laid
    /// over the bounding box of `area`.
    ///
    /// Evaluates four cells of a row at once.
    pub fn sample_grid(&self, area: &PlayArea, rows: usize, cols: usize, time: f64) -> GravityGrid {
        let origin = area.origin();
        let size = area.size();
        let cell_size = if rows == 0 || cols == 0 {
            DVec2::ZERO
        } else {
            DVec2::new(size.x / cols as f64, size.y / rows as f64)
        };

        let sources: Vec<(DVec2, f64)> = self
            .bodies
            .iter()
            .map(|body| (body.position_at(time), self.gravity * body.mass()))
            .collect();
        let epsilon_sq = f64x4::splat(self.epsilon * self.epsilon);
        let zero = f64x4::ZERO;

        let mut vectors = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let y = origin.y + (row as f64 + 0.5) * cell_size.y;
            let py = f64x4::splat(y);

            for chunk_start in (0..cols).step_by(4) {
                let mut xs = [0.0; 4];
                for (lane, x) in xs.iter_mut().enumerate() {
                    *x = origin.x + ((chunk_start + lane) as f64 + 0.5) * cell_size.x;
                }
                let px = f64x4::new(xs);

                let mut ax = zero;
                let mut ay = zero;
                for &(body_pos, gm) in &sources {
                    let dx = f64x4::splat(body_pos.x) - px;
                    let dy = f64x4::splat(body_pos.y) - py;
                    let r_squared = dx * dx + dy * dy;
                    let r = r_squared.sqrt();
                    let near = r_squared.simd_lt(epsilon_sq) | r_squared.simd_eq(zero);
                    let factor = near.select(zero, f64x4::splat(gm) / (r_squared * r));
                    ax += dx * factor;
                    ay += dy * factor;
                }

                let ax = ax.to_array();
                let ay = ay.to_array();
                let lanes = (cols - chunk_start).min(4);
                for lane in 0..lanes {
                    vectors.push(DVec2::new(ax[lane], ay[lane]));
                }
            }
        }

        let magnitudes = vectors.iter().map(|v| v.length()).collect();
        GravityGrid {
            rows,
            cols,
            origin,
            cell_size,
            time,
            vectors,
            magnitudes,
        }
    }
}

/// Gravity vectors sampled on a regular grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GravityGrid {
    pub rows: usize,
    pub cols: usize,
    /// Lower-left corner of the sampled area
    pub origin: DVec2,
    /// Width and height of one cell
    pub cell_size: DVec2,
    /// Simulation time of the sample
    pub time: f64,
    vectors: Vec<DVec2>,
    magnitudes: Vec<f64>,
}

impl GravityGrid {
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// Acceleration vector of a cell.
    pub fn vector(&self, row: usize, col: usize) -> Option<DVec2> {
        self.index(row, col).map(|i| self.vectors[i])
    }

    /// Acceleration magnitude of a cell.
    pub fn magnitude(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).map(|i| self.magnitudes[i])
    }

    /// Center of a cell in world coordinates.
    pub fn cell_center(&self, row: usize, col: usize) -> DVec2 {
        self.origin
            + DVec2::new(
                (col as f64 + 0.5) * self.cell_size.x,
                (row as f64 + 0.5) * self.cell_size.y,
            )
    }

    /// Strongest acceleration on the grid, for normalizing a heatmap.
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }

    pub fn vectors(&self) -> &[DVec2] {
        &self.vectors
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }
}
