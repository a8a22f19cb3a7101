//! Layer-by-layer propagation of known colors into the masked region.
//!
//! Each pass scans the current boundary, fills every boundary pixel with a
//! weighted average of the known pixels inside a circular window, and marks
//! it known. The window grows with every pass. Pixels filled earlier in a
//! pass already count as known samples for the rest of that pass.

use crate::boundary::{BoundaryScanner, FillState};
use crate::sampler::SampleWeighting;

/// Window radius as a function of the pass number: `base + growth * pass`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSchedule {
    /// Radius of the first pass.
    pub base: f32,
    /// Added per pass.
    pub growth: f32,
}

impl RadiusSchedule {
    /// Radius for pass `iteration` (zero-based).
    #[must_use]
    pub fn radius(&self, iteration: u32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let it = iteration as f32;
        self.base + self.growth * it
    }
}

/// Outcome of a propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Passes that filled at least one boundary layer.
    pub passes: u32,
    /// Pixels assigned a color.
    pub filled: usize,
    /// True if the loop stopped because the boundary ran empty.
    pub converged: bool,
}

/// Running weighted RGB sum that resolves to an opaque pixel.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Accumulator {
    r: f32,
    g: f32,
    b: f32,
    total: f32,
}

impl Accumulator {
    #[inline]
    pub(crate) fn add(&mut self, px: &[u8], weight: f32) {
        self.r += f32::from(px[0]) * weight;
        self.g += f32::from(px[1]) * weight;
        self.b += f32::from(px[2]) * weight;
        self.total += weight;
    }

    /// Weighted mean with alpha forced to 255, or `None` if nothing was added.
    pub(crate) fn resolve(&self) -> Option<[u8; 4]> {
        if self.total <= 0.0 {
            return None;
        }
        let channel = |sum: f32| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                (sum / self.total).round().clamp(0.0, 255.0) as u8
            }
        };
        Some([channel(self.r), channel(self.g), channel(self.b), 255])
    }
}

/// Fill boundary layers of `state` until the boundary is empty or
/// `max_iterations` passes have run.
///
/// `pixels` is the working RGBA copy; `state` flips to known for every pixel
/// written.
pub fn propagate<W: SampleWeighting>(
    pixels: &mut [u8],
    state: &mut FillState,
    weighting: &mut W,
    max_iterations: u32,
    schedule: RadiusSchedule,
) -> PropagationStats {
    let mut scanner = BoundaryScanner::new();
    let mut stats = PropagationStats::default();
    let ranked = weighting.ranks_by_confidence();
    let (width, height) = (state.width(), state.height());

    for iteration in 0..max_iterations {
        let boundary = scanner.scan(state, ranked);
        if boundary.is_empty() {
            stats.converged = true;
            break;
        }
        if ranked {
            boundary.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        }

        let radius = schedule.radius(iteration);
        let radius_sq = radius * radius;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let reach = radius.floor().max(0.0) as usize;

        tracing::trace!(iteration, boundary = boundary.len(), radius, "propagation pass");

        for candidate in &*boundary {
            let (x, y) = (candidate.x as usize, candidate.y as usize);
            let idx = state.index(x, y);
            if !state.is_pending(idx) {
                continue;
            }

            weighting.orient(pixels, state, x, y);

            let mut acc = Accumulator::default();
            for ny in y.saturating_sub(reach)..=(y + reach).min(height - 1) {
                for nx in x.saturating_sub(reach)..=(x + reach).min(width - 1) {
                    let nidx = state.index(nx, ny);
                    if !state.is_known(nidx) {
                        continue;
                    }
                    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                    let (dx, dy) = (nx as i32 - x as i32, ny as i32 - y as i32);
                    #[allow(clippy::cast_precision_loss)]
                    let dist_sq = (dx * dx + dy * dy) as f32;
                    if dist_sq > radius_sq {
                        continue;
                    }
                    acc.add(&pixels[nidx * 4..nidx * 4 + 3], weighting.weight(dx, dy, dist_sq));
                }
            }

            if let Some(rgba) = acc.resolve() {
                pixels[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
                state.mark_known(idx);
                stats.filled += 1;
            }
        }

        stats.passes += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Mask, PixelBuffer};
    use crate::sampler::{EdgeBiased, InverseSquare};

    const PLAIN: RadiusSchedule = RadiusSchedule {
        base: 5.0,
        growth: 2.0,
    };

    fn centered_square(size: u32, side: u32) -> Mask {
        let start = (size - side) / 2;
        let mut mask = Mask::empty(size, size);
        for y in start..start + side {
            for x in start..start + side {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn radius_schedule_grows_linearly() {
        assert!((PLAIN.radius(0) - 5.0).abs() < f32::EPSILON);
        assert!((PLAIN.radius(3) - 11.0).abs() < f32::EPSILON);
        let fractional = RadiusSchedule {
            base: 7.0,
            growth: 0.8,
        };
        assert!((fractional.radius(5) - 11.0).abs() < 1e-5);
    }

    #[test]
    fn accumulator_rounds_and_forces_opacity() {
        let mut acc = Accumulator::default();
        assert!(acc.resolve().is_none());
        acc.add(&[10, 20, 31], 1.0);
        acc.add(&[11, 20, 30], 1.0);
        assert_eq!(acc.resolve(), Some([11, 20, 31, 255]));
    }

    #[test]
    fn each_pass_peels_one_layer() {
        let mask = centered_square(30, 6);
        let mut pixels = PixelBuffer::filled(30, 30, [40, 80, 120, 255]).into_channels();
        let mut state = FillState::from_mask(&mask);

        let stats = propagate(&mut pixels, &mut state, &mut InverseSquare, 1, PLAIN);
        assert_eq!(stats.passes, 1);
        // the boundary is fixed when the pass starts: exactly the outer ring
        assert_eq!(stats.filled, 20);
        assert!(!stats.converged);
    }

    #[test]
    fn plain_fill_converges_and_stops_early() {
        let mask = centered_square(30, 6);
        let mut pixels = PixelBuffer::filled(30, 30, [40, 80, 120, 255]).into_channels();
        let mut state = FillState::from_mask(&mask);

        let stats = propagate(&mut pixels, &mut state, &mut InverseSquare, 8, PLAIN);
        assert!(stats.converged);
        assert!(stats.passes < 8);
        assert_eq!(stats.filled, 36);
        assert_eq!(state.pending_count(), 0);
        for px in pixels.chunks_exact(4) {
            assert_eq!(px, [40, 80, 120, 255]);
        }
    }

    #[test]
    fn edge_biased_fill_converges_on_flat_color() {
        let mask = centered_square(40, 10);
        let mut pixels = PixelBuffer::filled(40, 40, [200, 10, 10, 255]).into_channels();
        let mut state = FillState::from_mask(&mask);
        let schedule = RadiusSchedule {
            base: 7.0,
            growth: 0.8,
        };

        let stats = propagate(&mut pixels, &mut state, &mut EdgeBiased::default(), 16, schedule);
        assert!(stats.converged);
        assert_eq!(state.pending_count(), 0);
        for px in pixels.chunks_exact(4) {
            assert_eq!(px, [200, 10, 10, 255]);
        }
    }

    /// Inverse-square weights with switchable confidence ranking.
    struct Ranked(bool);

    impl SampleWeighting for Ranked {
        fn ranks_by_confidence(&self) -> bool {
            self.0
        }

        fn weight(&self, dx: i32, dy: i32, dist_sq: f32) -> f32 {
            InverseSquare.weight(dx, dy, dist_sq)
        }
    }

    #[test]
    fn most_confident_pixel_fills_first() {
        // black left column, white elsewhere; (2, 1) sees more known pixels
        // than (1, 1) but comes later in row-major order
        let mut buf = PixelBuffer::filled(6, 3, [255, 255, 255, 255]);
        for y in 0..3 {
            buf.set_pixel(0, y, [0, 0, 0, 255]);
        }
        let mut mask = Mask::empty(6, 3);
        mask.set(1, 1, true);
        mask.set(2, 1, true);
        let schedule = RadiusSchedule {
            base: 1.5,
            growth: 0.0,
        };

        let run = |ranked: bool| {
            let mut pixels = buf.clone().into_channels();
            let mut state = FillState::from_mask(&mask);
            let stats = propagate(&mut pixels, &mut state, &mut Ranked(ranked), 1, schedule);
            assert_eq!(stats.filled, 2);
            let out = PixelBuffer::new(6, 3, pixels).unwrap();
            (out.pixel(1, 1)[0], out.pixel(2, 1)[0])
        };

        // ranked: (2, 1) only sees white, then (1, 1) sees the filled (2, 1)
        assert_eq!(run(true), (166, 255));
        // row-major: (1, 1) goes first and darkens (2, 1)
        assert_eq!(run(false), (150, 239));
    }

    #[test]
    fn zero_iterations_touch_nothing() {
        let mask = centered_square(20, 4);
        let mut pixels = PixelBuffer::filled(20, 20, [1, 2, 3, 4]).into_channels();
        let before = pixels.clone();
        let mut state = FillState::from_mask(&mask);
        let stats = propagate(&mut pixels, &mut state, &mut InverseSquare, 0, PLAIN);
        assert_eq!(stats, PropagationStats::default());
        assert_eq!(pixels, before);
    }
}
