//! Connected-region extraction from a binarized mask.
//!
//! A region is an 8-connected component of foreground (255) pixels,
//! measured by pixel count. Regions below the minimum area are treated
//! as noise.

use super::mask::Mask;

/// Returns the pixel areas of all 8-connected foreground regions.
pub fn region_areas(mask: &Mask) -> Vec<usize> {
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    let data = mask.data();

    let mut visited = vec![false; data.len()];
    let mut areas = Vec::new();
    let mut stack = Vec::new();

    for start in 0..data.len() {
        if visited[start] || data[start] != 255 {
            continue;
        }

        // Flood fill one component.
        let mut area = 0usize;
        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            area += 1;
            let x = idx % w;
            let y = idx / w;

            for dy in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for dx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = dy * w + dx;
                    if !visited[n] && data[n] == 255 {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        areas.push(area);
    }

    areas
}

/// True iff any foreground region strictly exceeds `min_area` pixels.
pub fn any_region_larger_than(mask: &Mask, min_area: u32) -> bool {
    // Early out per component would not help: region_areas already
    // visits each pixel at most once.
    region_areas(mask)
        .iter()
        .any(|&a| a > min_area as usize)
}
