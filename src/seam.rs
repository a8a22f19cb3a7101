//! Seam smoothing between synthesized and original content.

use crate::buffer::Mask;
use crate::propagation::Accumulator;

const NEIGHBORS_4: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Re-blend every originally masked pixel that touches original content.
///
/// Each seam pixel becomes a Gaussian average (`exp(-d² / 2r²)`, circular
/// window of `radius`) of the completed image. Reads come from a snapshot
/// taken before the pass, so blended pixels never feed into each other.
/// Returns the number of pixels blended.
pub fn blend_seams(pixels: &mut [u8], mask: &Mask, radius: u32) -> usize {
    if radius == 0 {
        return 0;
    }
    let snapshot = pixels.to_vec();
    let (width, height) = (mask.width() as usize, mask.height() as usize);
    let flags = mask.flags();

    #[allow(clippy::cast_possible_wrap)]
    let r = radius as isize;
    #[allow(clippy::cast_precision_loss)]
    let (radius_sq, two_sigma_sq) = {
        let rf = radius as f32;
        (rf * rf, 2.0 * rf * rf)
    };

    let mut blended = 0;
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if flags[idx] != 1 || !on_seam(flags, width, height, x, y) {
                continue;
            }

            let mut acc = Accumulator::default();
            for dy in -r..=r {
                let Some(ny) = y.checked_add_signed(dy).filter(|&v| v < height) else {
                    continue;
                };
                for dx in -r..=r {
                    let Some(nx) = x.checked_add_signed(dx).filter(|&v| v < width) else {
                        continue;
                    };
                    #[allow(clippy::cast_precision_loss)]
                    let dist_sq = (dx * dx + dy * dy) as f32;
                    if dist_sq > radius_sq {
                        continue;
                    }
                    let nidx = (ny * width + nx) * 4;
                    acc.add(&snapshot[nidx..nidx + 3], (-dist_sq / two_sigma_sq).exp());
                }
            }

            if let Some(rgba) = acc.resolve() {
                pixels[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
                blended += 1;
            }
        }
    }

    blended
}

fn on_seam(flags: &[u8], width: usize, height: usize, x: usize, y: usize) -> bool {
    NEIGHBORS_4.iter().any(|&(dx, dy)| {
        match (x.checked_add_signed(dx), y.checked_add_signed(dy)) {
            (Some(nx), Some(ny)) if nx < width && ny < height => flags[ny * width + nx] == 0,
            _ => false,
        }
    })
}
