//! Sample weighting for the propagation filler.
//!
//! Both fill strategies gather known pixels inside a circular window and
//! average them. They differ only in how each sample is weighted and in the
//! order boundary pixels are visited, which is what [`SampleWeighting`]
//! captures:
//!
//! - [`InverseSquare`]: `w = 1 / (1 + d²)`, row-major order.
//! - [`EdgeBiased`]: the inverse-square weight scaled by
//!   `1 + 3 * |sample_dir · edge_dir|`, where `edge_dir` runs perpendicular
//!   to the local luminance gradient. Boundary pixels are visited most
//!   confident first.

use crate::boundary::FillState;
use crate::buffer::luminance;

/// Gradient magnitudes below this are treated as flat.
const FLAT_GRADIENT: f32 = 1e-3;

/// Extra weight given to samples lying exactly along the edge direction.
const EDGE_BOOST: f32 = 3.0;

/// Edge direction used where the local gradient is flat.
const DEFAULT_EDGE_DIR: (f32, f32) = (1.0, 0.0);

/// Axis-aligned neighbor offsets used for gradient estimation.
const NEIGHBORS_4: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Weighting function plugged into the propagation loop.
pub trait SampleWeighting {
    /// Whether boundary pixels must be visited in descending confidence order.
    fn ranks_by_confidence(&self) -> bool {
        false
    }

    /// Prepare for filling the pixel at `(x, y)`.
    ///
    /// Called once per boundary pixel, before any [`weight`](Self::weight)
    /// call for that pixel.
    fn orient(&mut self, _pixels: &[u8], _state: &FillState, _x: usize, _y: usize) {}

    /// Weight of a known sample at offset `(dx, dy)` from the pixel being filled.
    fn weight(&self, dx: i32, dy: i32, dist_sq: f32) -> f32;
}

/// Inverse-square distance falloff with no directional bias.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseSquare;

impl SampleWeighting for InverseSquare {
    #[inline]
    fn weight(&self, _dx: i32, _dy: i32, dist_sq: f32) -> f32 {
        1.0 / (1.0 + dist_sq)
    }
}

/// Inverse-square falloff biased toward samples along the local edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeBiased {
    edge_dir: (f32, f32),
}

impl Default for EdgeBiased {
    fn default() -> Self {
        Self {
            edge_dir: DEFAULT_EDGE_DIR,
        }
    }
}

impl EdgeBiased {
    /// Unit edge direction chosen by the last [`orient`](SampleWeighting::orient).
    #[must_use]
    pub fn edge_dir(&self) -> (f32, f32) {
        self.edge_dir
    }
}

impl SampleWeighting for EdgeBiased {
    fn ranks_by_confidence(&self) -> bool {
        true
    }

    fn orient(&mut self, pixels: &[u8], state: &FillState, x: usize, y: usize) {
        self.edge_dir = GradientEstimate::at(pixels, state, x, y).edge_direction();
    }

    #[inline]
    fn weight(&self, dx: i32, dy: i32, dist_sq: f32) -> f32 {
        let base = 1.0 / (1.0 + dist_sq);
        if dist_sq <= 0.0 {
            return base;
        }
        let dist = dist_sq.sqrt();
        #[allow(clippy::cast_precision_loss)]
        let (ux, uy) = (dx as f32 / dist, dy as f32 / dist);
        let alignment = ux * self.edge_dir.0 + uy * self.edge_dir.1;
        base * (1.0 + EDGE_BOOST * alignment.abs())
    }
}

/// Directional luminance gradient around one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientEstimate {
    /// Horizontal component.
    pub gx: f32,
    /// Vertical component.
    pub gy: f32,
}

impl GradientEstimate {
    /// Sum `(dx, dy) * (luminance - mean)` over the known up/down/left/right
    /// neighbors of `(x, y)`, where `mean` is their average luminance.
    ///
    /// Centering makes a single known neighbor, or several of equal
    /// brightness, read as flat instead of as a slope toward the unknown side.
    /// With all four neighbors known it equals the plain central difference.
    #[must_use]
    pub fn at(pixels: &[u8], state: &FillState, x: usize, y: usize) -> Self {
        let mut samples = [(0.0_f32, 0.0_f32, 0.0_f32); 4];
        let mut count = 0;

        for &(dx, dy) in &NEIGHBORS_4 {
            let nx = x.wrapping_add_signed(dx);
            let ny = y.wrapping_add_signed(dy);
            if nx >= state.width() || ny >= state.height() {
                continue;
            }
            let idx = state.index(nx, ny);
            if !state.is_known(idx) {
                continue;
            }
            let p = &pixels[idx * 4..idx * 4 + 3];
            #[allow(clippy::cast_precision_loss)]
            {
                samples[count] = (dx as f32, dy as f32, luminance(p[0], p[1], p[2]));
            }
            count += 1;
        }

        let known = &samples[..count];
        if known.is_empty() {
            return Self { gx: 0.0, gy: 0.0 };
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = known.iter().map(|&(_, _, lum)| lum).sum::<f32>() / count as f32;

        let (gx, gy) = known.iter().fold((0.0, 0.0), |(gx, gy), &(dx, dy, lum)| {
            (gx + dx * (lum - mean), gy + dy * (lum - mean))
        });
        Self { gx, gy }
    }

    /// Gradient magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.gx.hypot(self.gy)
    }

    /// Unit vector perpendicular to the gradient, `(-gy, gx) / |g|`.
    ///
    /// Flat gradients yield `(1, 0)`.
    #[must_use]
    pub fn edge_direction(&self) -> (f32, f32) {
        let mag = self.magnitude();
        if mag < FLAT_GRADIENT {
            return DEFAULT_EDGE_DIR;
        }
        (-self.gy / mag, self.gx / mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Mask, PixelBuffer};

    #[test]
    fn inverse_square_falls_off_with_distance() {
        let w = InverseSquare;
        assert!((w.weight(0, 1, 1.0) - 0.5).abs() < 1e-6);
        assert!((w.weight(3, 4, 25.0) - 1.0 / 26.0).abs() < 1e-6);
        assert!(!w.ranks_by_confidence());
    }

    #[test]
    fn flat_gradient_uses_default_direction() {
        let g = GradientEstimate { gx: 0.0, gy: 0.0 };
        assert_eq!(g.edge_direction(), (1.0, 0.0));
        let tiny = GradientEstimate { gx: 1e-5, gy: -1e-5 };
        assert_eq!(tiny.edge_direction(), (1.0, 0.0));
    }

    #[test]
    fn edge_direction_is_perpendicular_unit_vector() {
        let g = GradientEstimate { gx: 3.0, gy: 4.0 };
        let (ex, ey) = g.edge_direction();
        assert!((ex.hypot(ey) - 1.0).abs() < 1e-6);
        assert!((ex * g.gx + ey * g.gy).abs() < 1e-5);
    }

    #[test]
    fn edge_bias_prefers_aligned_samples() {
        let w = EdgeBiased::default();
        // edge runs horizontally: (1, 0)
        let along = w.weight(2, 0, 4.0);
        let across = w.weight(0, 2, 4.0);
        assert!((along - 4.0 / 5.0).abs() < 1e-6);
        assert!((across - 1.0 / 5.0).abs() < 1e-6);
    }

    #[test]
    fn gradient_only_reads_known_axis_neighbors() {
        // white pixel to the right of (1, 1), everything else black
        let mut buf = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        buf.set_pixel(2, 1, [255, 255, 255, 255]);
        let mut mask = Mask::empty(3, 3);
        mask.set(1, 1, true);
        let state = FillState::from_mask(&mask);

        let g = GradientEstimate::at(buf.channels(), &state, 1, 1);
        assert!((g.gx - 255.0).abs() < 1e-3);
        assert!(g.gy.abs() < 1e-6);

        // mark the white neighbor unknown and the gradient disappears
        mask.set(2, 1, true);
        let state = FillState::from_mask(&mask);
        let g = GradientEstimate::at(buf.channels(), &state, 1, 1);
        assert!(g.magnitude() < 1e-6);
    }

    #[test]
    fn lone_known_neighbor_reads_as_flat() {
        // only the white pixel above (1, 1) is known: no slope can be measured
        let buf = PixelBuffer::filled(3, 3, [255, 255, 255, 255]);
        let mut mask = Mask::new(3, 3, vec![1; 9]).unwrap();
        mask.set(1, 0, false);
        let state = FillState::from_mask(&mask);

        let g = GradientEstimate::at(buf.channels(), &state, 1, 1);
        assert!(g.magnitude() < 1e-3, "{g:?}");
        assert_eq!(g.edge_direction(), (1.0, 0.0));
    }

    #[test]
    fn equal_neighbors_on_two_sides_read_as_flat() {
        let buf = PixelBuffer::filled(3, 3, [90, 90, 90, 255]);
        let mut mask = Mask::new(3, 3, vec![1; 9]).unwrap();
        mask.set(1, 0, false);
        mask.set(0, 1, false);
        let state = FillState::from_mask(&mask);

        let g = GradientEstimate::at(buf.channels(), &state, 1, 1);
        assert!(g.magnitude() < 1e-3, "{g:?}");
    }

    #[test]
    fn orient_turns_edge_along_vertical_boundary() {
        let mut buf = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        buf.set_pixel(2, 1, [255, 255, 255, 255]);
        let mut mask = Mask::empty(3, 3);
        mask.set(1, 1, true);
        let state = FillState::from_mask(&mask);

        let mut w = EdgeBiased::default();
        w.orient(buf.channels(), &state, 1, 1);
        let (ex, ey) = w.edge_dir();
        // horizontal gradient, so the edge runs vertically
        assert!(ex.abs() < 1e-6);
        assert!((ey.abs() - 1.0).abs() < 1e-6);
        assert!(w.weight(0, 1, 1.0) > w.weight(1, 0, 1.0));
    }
}
