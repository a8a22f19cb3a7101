//! Boundary scanning over the working fill state.
//!
//! A boundary pixel is a pixel still waiting to be filled that touches at
//! least one known pixel in its 8-neighborhood. The outermost 1-pixel frame
//! of the image is never scanned, so neighbor lookups never leave the image.

use crate::buffer::Mask;

/// Side length of the window used to score confidence.
const CONFIDENCE_WINDOW: usize = 5;

/// 8-connected neighbor offsets.
const NEIGHBORS_8: [(isize, isize); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Working copy of the mask for one invocation.
///
/// A cell holds `1` while its pixel awaits a synthesized color and flips to
/// `0` exactly once, when the pixel is written.
#[derive(Debug, Clone)]
pub struct FillState {
    width: usize,
    height: usize,
    flags: Vec<u8>,
}

impl FillState {
    /// Start from a copy of the caller's mask.
    #[must_use]
    pub fn from_mask(mask: &Mask) -> Self {
        Self {
            width: mask.width() as usize,
            height: mask.height() as usize,
            flags: mask.flags().to_vec(),
        }
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat index of `(x, y)`.
    #[inline]
    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// True if the pixel at `idx` still needs a color.
    #[inline]
    #[must_use]
    pub fn is_pending(&self, idx: usize) -> bool {
        self.flags[idx] == 1
    }

    /// True if the pixel at `idx` holds original or synthesized content.
    #[inline]
    #[must_use]
    pub fn is_known(&self, idx: usize) -> bool {
        self.flags[idx] == 0
    }

    /// Record that the pixel at `idx` received its color.
    #[inline]
    pub fn mark_known(&mut self, idx: usize) {
        debug_assert!(self.flags[idx] == 1, "pixel {idx} filled twice");
        self.flags[idx] = 0;
    }

    /// Number of pixels still waiting for a color.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f == 1).count()
    }

    /// Flat indices of every pending pixel, in row-major order.
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| (f == 1).then_some(i))
    }

    /// Known pixels in the 5x5 window centered on `(x, y)`, clipped to the image.
    #[must_use]
    pub fn confidence(&self, x: usize, y: usize) -> u32 {
        let half = CONFIDENCE_WINDOW / 2;
        let x0 = x.saturating_sub(half);
        let y0 = y.saturating_sub(half);
        let x1 = (x + half + 1).min(self.width);
        let y1 = (y + half + 1).min(self.height);

        let mut known = 0;
        for wy in y0..y1 {
            let row = wy * self.width;
            known += self.flags[row + x0..row + x1]
                .iter()
                .filter(|&&f| f == 0)
                .count();
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            known as u32
        }
    }

    fn touches_known(&self, x: usize, y: usize) -> bool {
        NEIGHBORS_8.iter().any(|&(dx, dy)| {
            let nx = x.wrapping_add_signed(dx);
            let ny = y.wrapping_add_signed(dy);
            self.flags[ny * self.width + nx] == 0
        })
    }
}

/// A pending pixel that touches known content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryCandidate {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Known pixels in the surrounding 5x5 window (0 when not requested).
    pub confidence: u32,
}

/// Finds boundary pixels, reusing one candidate list across iterations.
#[derive(Debug, Default)]
pub struct BoundaryScanner {
    candidates: Vec<BoundaryCandidate>,
}

impl BoundaryScanner {
    /// Create a scanner with no preallocated storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the current boundary of `state` in row-major order.
    ///
    /// When `with_confidence` is false every candidate carries confidence 0.
    /// An empty result means no pending pixel can be reached from known data.
    pub fn scan(&mut self, state: &FillState, with_confidence: bool) -> &mut [BoundaryCandidate] {
        self.candidates.clear();
        if state.width < 3 || state.height < 3 {
            return &mut self.candidates;
        }

        for y in 1..state.height - 1 {
            for x in 1..state.width - 1 {
                if !state.is_pending(state.index(x, y)) || !state.touches_known(x, y) {
                    continue;
                }
                let confidence = if with_confidence {
                    state.confidence(x, y)
                } else {
                    0
                };
                #[allow(clippy::cast_possible_truncation)]
                self.candidates.push(BoundaryCandidate {
                    x: x as u32,
                    y: y as u32,
                    confidence,
                });
            }
        }

        &mut self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: u32, x0: u32, y0: u32, side: u32) -> Mask {
        let mut mask = Mask::empty(size, size);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn single_pixel_is_its_own_boundary() {
        let state = FillState::from_mask(&square_mask(5, 2, 2, 1));
        let mut scanner = BoundaryScanner::new();
        let found = scanner.scan(&state, true);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].x, found[0].y), (2, 2));
        // 25 window cells, one of them is the pending pixel itself
        assert_eq!(found[0].confidence, 24);
    }

    #[test]
    fn boundary_is_outer_ring_of_square() {
        let state = FillState::from_mask(&square_mask(20, 5, 5, 6));
        let mut scanner = BoundaryScanner::new();
        let found = scanner.scan(&state, false);
        // 6x6 square minus its 4x4 interior
        assert_eq!(found.len(), 36 - 16);
        assert!(found.iter().all(|c| c.confidence == 0));
        assert!(found
            .iter()
            .all(|c| c.x == 5 || c.x == 10 || c.y == 5 || c.y == 10));
    }

    #[test]
    fn border_pixels_are_never_candidates() {
        let mut mask = Mask::empty(6, 6);
        mask.set(0, 3, true);
        mask.set(5, 5, true);
        let state = FillState::from_mask(&mask);
        let mut scanner = BoundaryScanner::new();
        assert!(scanner.scan(&state, false).is_empty());
    }

    #[test]
    fn fully_masked_image_has_no_boundary() {
        let mut mask = Mask::empty(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                mask.set(x, y, true);
            }
        }
        let state = FillState::from_mask(&mask);
        let mut scanner = BoundaryScanner::new();
        assert!(scanner.scan(&state, true).is_empty());
    }

    #[test]
    fn confidence_is_clipped_at_image_edge() {
        let state = FillState::from_mask(&Mask::empty(10, 10));
        assert_eq!(state.confidence(0, 0), 9);
        assert_eq!(state.confidence(1, 1), 16);
        assert_eq!(state.confidence(5, 5), 25);
    }

    #[test]
    fn mark_known_shrinks_pending() {
        let mut state = FillState::from_mask(&square_mask(10, 3, 3, 2));
        assert_eq!(state.pending_count(), 4);
        let idx = state.index(3, 3);
        state.mark_known(idx);
        assert_eq!(state.pending_count(), 3);
        assert!(state.is_known(idx));
    }

    #[test]
    fn tiny_images_scan_empty() {
        let mut mask = Mask::empty(2, 2);
        mask.set(1, 1, true);
        let state = FillState::from_mask(&mask);
        assert!(BoundaryScanner::new().scan(&state, false).is_empty());
    }
}
