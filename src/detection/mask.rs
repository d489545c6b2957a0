//! Foreground mask buffer and post-processing filters.
//!
//! The raw per-pixel foreground mask is noisy: isolated flickering
//! pixels and shadow speckle. Smoothing, binarization, and dilation
//! turn it into solid regions that survive area measurement.

/// Single-channel image buffer holding a foreground mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Creates an all-zero (all-background) mask.
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Creates a mask from an existing buffer.
    ///
    /// Panics if the buffer length does not match the dimensions; masks
    /// are only built internally from model output or in tests.
    pub fn from_data(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(data.len(), (width as usize) * (height as usize));
        Self {
            data,
            width,
            height,
        }
    }

    /// Returns the mask pixels, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the mask pixels mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the mask width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the mask height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Smooths the mask with a separable binomial kernel of the given
    /// odd side length (an approximation of a Gaussian).
    pub fn blur(&mut self, kernel: u32) {
        let weights = binomial_weights(kernel);
        if weights.len() <= 1 {
            return;
        }

        self.data = convolve_pass(&self.data, self.width as usize, self.height as usize, &weights, true);
        self.data = convolve_pass(&self.data, self.width as usize, self.height as usize, &weights, false);
    }

    /// Binarizes the mask: strictly above `threshold` becomes 255,
    /// everything else 0. Shadow pixels (127) fall below the default
    /// threshold of 200 and are discarded here.
    pub fn threshold(&mut self, threshold: u8) {
        for v in &mut self.data {
            *v = if *v > threshold { 255 } else { 0 };
        }
    }

    /// Expands foreground regions with a 3x3 maximum filter, applied
    /// `iterations` times. Merges fragments of a single moving object
    /// into one region.
    pub fn dilate(&mut self, iterations: u32) {
        let w = self.width as usize;
        let h = self.height as usize;

        for _ in 0..iterations {
            let src = self.data.clone();
            for y in 0..h {
                for x in 0..w {
                    let mut max = 0u8;
                    for dy in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                        for dx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                            max = max.max(src[dy * w + dx]);
                        }
                    }
                    self.data[y * w + x] = max;
                }
            }
        }
    }

    /// Counts pixels at exactly 255.
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == 255).count()
    }
}

/// Row of Pascal's triangle with `kernel` entries, used as separable
/// smoothing weights. `kernel = 5` gives [1, 4, 6, 4, 1].
fn binomial_weights(kernel: u32) -> Vec<u32> {
    let k = kernel.max(1) as usize;
    let mut row = vec![1u32];
    for _ in 1..k {
        let mut next = vec![1u32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

/// One separable convolution pass with edge clamping.
fn convolve_pass(src: &[u8], w: usize, h: usize, weights: &[u32], horizontal: bool) -> Vec<u8> {
    let radius = weights.len() / 2;
    let sum: u32 = weights.iter().sum();
    let mut out = vec![0u8; src.len()];

    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u32;
            for (k, &weight) in weights.iter().enumerate() {
                let offset = k as isize - radius as isize;
                let (sx, sy) = if horizontal {
                    ((x as isize + offset).clamp(0, w as isize - 1) as usize, y)
                } else {
                    (x, (y as isize + offset).clamp(0, h as isize - 1) as usize)
                };
                acc += weight * u32::from(src[sy * w + sx]);
            }
            out[y * w + x] = (acc / sum) as u8;
        }
    }

    out
}

/// Downscales a grayscale buffer with nearest-neighbor sampling.
///
/// Returns the source unchanged when dimensions already match.
pub fn downscale(src: &[u8], sw: u32, sh: u32, dw: u32, dh: u32) -> Vec<u8> {
    if sw == dw && sh == dh {
        return src.to_vec();
    }

    let (sw, sh, dw, dh) = (sw as usize, sh as usize, dw as usize, dh as usize);
    let mut out = vec![0u8; dw * dh];
    for y in 0..dh {
        let sy = y * sh / dh;
        for x in 0..dw {
            let sx = x * sw / dw;
            out[y * dw + x] = src[sy * sw + sx];
        }
    }
    out
}
