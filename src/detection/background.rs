//! Running Gaussian background model.
//!
//! Maintains a per-pixel mean and variance of the observed scene and
//! classifies pixels that deviate strongly as foreground. The model is
//! updated on every frame, so it is a stateful filter: frames must be
//! applied in strict temporal order.

use super::mask::Mask;

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for shadow pixels. Sits below the binarization
/// threshold, so shadows are dropped before region extraction.
pub const SHADOW: u8 = 127;

/// Initial per-pixel variance before any observations.
const INITIAL_VARIANCE: f64 = 225.0; // std dev 15
/// Variance floor; prevents a perfectly static pixel from flagging
/// every one-count flicker as foreground.
const MIN_VARIANCE: f64 = 4.0;
const MAX_VARIANCE: f64 = 5.0 * INITIAL_VARIANCE;

/// Lower bound on the intensity ratio for a pixel to qualify as
/// shadow: darker than the background, but not by more than half.
const SHADOW_RATIO: f64 = 0.5;

/// Per-pixel running mean/variance scene model.
pub struct BackgroundModel {
    mean: Vec<f64>,
    variance: Vec<f64>,
    width: u32,
    height: u32,
    history: u32,
    var_threshold: f64,
    detect_shadows: bool,
    frames_seen: u64,
}

impl BackgroundModel {
    /// Creates an empty model for the given analysis resolution.
    pub fn new(
        width: u32,
        height: u32,
        history: u32,
        var_threshold: f64,
        detect_shadows: bool,
    ) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            mean: vec![0.0; len],
            variance: vec![INITIAL_VARIANCE; len],
            width,
            height,
            history: history.max(1),
            var_threshold,
            detect_shadows,
            frames_seen: 0,
        }
    }

    /// Classifies a frame against the model and folds it in.
    ///
    /// Returns a foreground mask: [`FOREGROUND`] where a pixel deviates
    /// beyond the variance threshold, [`SHADOW`] where it looks like a
    /// darkened version of the background, 0 elsewhere. The learning
    /// rate ramps down as 1/n until the history window is full, then
    /// stays at 1/history.
    pub fn apply(&mut self, pixels: &[u8]) -> Mask {
        debug_assert_eq!(pixels.len(), self.mean.len());

        self.frames_seen += 1;
        let alpha = 1.0 / (self.frames_seen.min(u64::from(self.history)) as f64);

        let mut mask = Mask::zeroed(self.width, self.height);
        let first_frame = self.frames_seen == 1;

        for (i, &p) in pixels.iter().enumerate() {
            let value = f64::from(p);

            if first_frame {
                self.mean[i] = value;
                continue;
            }

            let mean = self.mean[i];
            let variance = self.variance[i];
            let diff = value - mean;
            let dist2 = diff * diff;

            if dist2 > self.var_threshold * variance {
                mask.data_mut()[i] = if self.detect_shadows && Self::is_shadow(value, mean) {
                    SHADOW
                } else {
                    FOREGROUND
                };
            }

            self.mean[i] = mean + alpha * diff;
            self.variance[i] =
                (variance + alpha * (dist2 - variance)).clamp(MIN_VARIANCE, MAX_VARIANCE);
        }

        mask
    }

    fn is_shadow(value: f64, mean: f64) -> bool {
        mean > 0.0 && value < mean && value >= SHADOW_RATIO * mean
    }

    /// Number of frames folded into the model so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// True once the history window has been filled.
    pub fn is_settled(&self) -> bool {
        self.frames_seen >= u64::from(self.history)
    }

    /// Discards the learned scene.
    pub fn reset(&mut self) {
        self.mean.fill(0.0);
        self.variance.fill(INITIAL_VARIANCE);
        self.frames_seen = 0;
    }
}

impl std::fmt::Debug for BackgroundModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundModel")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("history", &self.history)
            .field("frames_seen", &self.frames_seen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(w: u32, h: u32) -> BackgroundModel {
        BackgroundModel::new(w, h, 50, 25.0, true)
    }

    #[test]
    fn test_first_frame_initializes_silently() {
        let mut m = model(8, 8);
        let mask = m.apply(&vec![100u8; 64]);
        assert!(mask.data().iter().all(|&v| v == 0));
        assert_eq!(m.frames_seen(), 1);
    }

    #[test]
    fn test_static_scene_stays_background() {
        let mut m = model(8, 8);
        let scene = vec![100u8; 64];
        for _ in 0..60 {
            let mask = m.apply(&scene);
            assert!(mask.data().iter().all(|&v| v == 0));
        }
        assert!(m.is_settled());
    }

    #[test]
    fn test_sudden_bright_pixel_is_foreground() {
        let mut m = model(8, 8);
        let scene = vec![100u8; 64];
        for _ in 0..30 {
            m.apply(&scene);
        }

        let mut changed = scene.clone();
        changed[10] = 255;
        let mask = m.apply(&changed);
        assert_eq!(mask.data()[10], FOREGROUND);
        assert_eq!(mask.data()[11], 0);
    }

    #[test]
    fn test_darkened_pixel_is_shadow() {
        let mut m = model(8, 8);
        let scene = vec![200u8; 64];
        for _ in 0..30 {
            m.apply(&scene);
        }

        let mut shaded = scene.clone();
        shaded[5] = 120; // 60% of background: darker, but within ratio
        let mask = m.apply(&shaded);
        assert_eq!(mask.data()[5], SHADOW);
    }

    #[test]
    fn test_shadow_detection_disabled() {
        let mut m = BackgroundModel::new(8, 8, 50, 25.0, false);
        let scene = vec![200u8; 64];
        for _ in 0..30 {
            m.apply(&scene);
        }

        let mut shaded = scene.clone();
        shaded[5] = 120;
        let mask = m.apply(&shaded);
        assert_eq!(mask.data()[5], FOREGROUND);
    }

    #[test]
    fn test_model_adapts_to_new_scene() {
        let mut m = BackgroundModel::new(4, 4, 10, 25.0, true);
        for _ in 0..20 {
            m.apply(&vec![50u8; 16]);
        }

        // A persistent change is foreground at first, background once
        // the model has absorbed it.
        let new_scene = vec![250u8; 16];
        let mask = m.apply(&new_scene);
        assert!(mask.data().iter().all(|&v| v == FOREGROUND));

        for _ in 0..100 {
            m.apply(&new_scene);
        }
        let mask = m.apply(&new_scene);
        assert!(mask.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_reset_forgets_scene() {
        let mut m = model(4, 4);
        for _ in 0..20 {
            m.apply(&vec![50u8; 16]);
        }
        m.reset();
        assert_eq!(m.frames_seen(), 0);

        // First frame after reset re-initializes without flagging.
        let mask = m.apply(&vec![250u8; 16]);
        assert!(mask.data().iter().all(|&v| v == 0));
    }
}
