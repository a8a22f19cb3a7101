//! Final unconditional pass that gives every remaining masked pixel a color.
//!
//! Propagation can stop with pixels left over: the pass cap was reached, or
//! the pending pixels have no path to known data (the 1-pixel image border is
//! never propagated into). This pass resolves all of them at once with a
//! Gaussian average over known pixels in a square window, so the engine
//! always terminates with a fully defined image.

use crate::boundary::FillState;
use crate::propagation::Accumulator;

/// Color used when the image contains no known pixel at all.
pub const NEUTRAL_GRAY: [u8; 4] = [128, 128, 128, 255];

/// Counts from one fallback run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackStats {
    /// Pixels resolved from known pixels inside their window.
    pub windowed: usize,
    /// Pixels with no known pixel in reach, given the global known mean
    /// (or [`NEUTRAL_GRAY`] when nothing is known).
    pub global: usize,
}

impl FallbackStats {
    /// Total pixels resolved.
    #[must_use]
    pub fn total(&self) -> usize {
        self.windowed + self.global
    }
}

/// Resolve every pixel still pending in `state`.
///
/// Only pixels known before this call are sampled, so the result does not
/// depend on visiting order. `stride` thins the window to every n-th offset
/// on both axes.
pub fn smooth_remaining(
    pixels: &mut [u8],
    state: &mut FillState,
    radius: u32,
    stride: u32,
) -> FallbackStats {
    let pending: Vec<usize> = state.pending().collect();
    let mut stats = FallbackStats::default();
    if pending.is_empty() {
        return stats;
    }

    let (width, height) = (state.width(), state.height());
    #[allow(clippy::cast_possible_wrap)]
    let r = radius as i32;
    let step = stride.max(1) as usize;
    #[allow(clippy::cast_precision_loss)]
    let two_sigma_sq = 2.0 * (radius.max(1) as f32).powi(2);
    let mut global: Option<[u8; 4]> = None;

    for &idx in &pending {
        let (x, y) = (idx % width, idx / width);
        let mut acc = Accumulator::default();

        for dy in (-r..=r).step_by(step) {
            let Some(ny) = y.checked_add_signed(dy as isize).filter(|&v| v < height) else {
                continue;
            };
            for dx in (-r..=r).step_by(step) {
                let Some(nx) = x.checked_add_signed(dx as isize).filter(|&v| v < width) else {
                    continue;
                };
                let nidx = state.index(nx, ny);
                if !state.is_known(nidx) {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let dist_sq = (dx * dx + dy * dy) as f32;
                acc.add(&pixels[nidx * 4..nidx * 4 + 3], (-dist_sq / two_sigma_sq).exp());
            }
        }

        let rgba = if let Some(rgba) = acc.resolve() {
            stats.windowed += 1;
            rgba
        } else {
            stats.global += 1;
            *global.get_or_insert_with(|| known_mean(pixels, state))
        };
        pixels[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
    }

    for idx in pending {
        state.mark_known(idx);
    }

    stats
}

/// Unweighted mean of all known pixels, or [`NEUTRAL_GRAY`] if there are none.
fn known_mean(pixels: &[u8], state: &FillState) -> [u8; 4] {
    let mut acc = Accumulator::default();
    for (idx, px) in pixels.chunks_exact(4).enumerate() {
        if state.is_known(idx) {
            acc.add(px, 1.0);
        }
    }
    acc.resolve().unwrap_or(NEUTRAL_GRAY)
}
