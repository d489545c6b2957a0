//! Per-frame motion classification.
//!
//! This module turns a frame into a single boolean: is motion present?
//! The pipeline mirrors a classic background-subtraction chain:
//! downscale, per-pixel background model, smooth, binarize, dilate,
//! extract connected regions, and compare the largest against a
//! minimum area.
//!
//! Classification is stateful (the background model learns the scene),
//! so frames from one stream must pass through a single classifier in
//! strict arrival order.

mod background;
mod config;
mod mask;
mod regions;

pub use background::BackgroundModel;
pub use config::{ConfigError, DetectionConfig};
pub use mask::Mask;

use crate::source::Frame;

/// Trait for motion classification implementations.
///
/// The watch loop and the alarm machine depend only on this trait,
/// never on the image-processing pipeline behind it.
pub trait MotionClassifier {
    /// Classifies a frame, returning true iff motion is present.
    ///
    /// Stateful: each call both consults and updates internal scene
    /// state, so calls must happen in frame order.
    fn classify(&mut self, frame: &Frame) -> bool;
}

/// Background-subtraction motion detector.
pub struct MotionDetector {
    config: DetectionConfig,
    model: BackgroundModel,
}

impl MotionDetector {
    /// Creates a detector with a fresh background model.
    pub fn new(config: DetectionConfig) -> Self {
        let model = BackgroundModel::new(
            config.width,
            config.height,
            config.history,
            config.var_threshold,
            config.detect_shadows,
        );
        Self { config, model }
    }

    /// Discards the learned scene, e.g. after a stream reconnect.
    pub fn reset(&mut self) {
        self.model.reset();
    }
}

impl MotionClassifier for MotionDetector {
    fn classify(&mut self, frame: &Frame) -> bool {
        let scaled = mask::downscale(
            frame.pixels(),
            frame.width(),
            frame.height(),
            self.config.width,
            self.config.height,
        );

        let mut fg = self.model.apply(&scaled);
        fg.blur(self.config.blur_kernel);
        fg.threshold(self.config.mask_threshold);
        fg.dilate(self.config.dilate_iterations);

        let motion = regions::any_region_larger_than(&fg, self.config.min_area);

        tracing::trace!(
            sequence = frame.sequence(),
            foreground = fg.foreground_count(),
            motion,
            "Frame classified"
        );

        motion
    }
}

/// Mock classifier that replays a scripted signal sequence.
///
/// Lets the watch loop and alarm machine be tested without any image
/// processing. Once the script drains, every frame classifies as no
/// motion.
#[derive(Debug, Default)]
pub struct MockClassifier {
    signals: std::collections::VecDeque<bool>,
}

impl MockClassifier {
    /// Creates a classifier that replays the given signals in order.
    pub fn with_signals(signals: impl IntoIterator<Item = bool>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
        }
    }
}

impl MotionClassifier for MockClassifier {
    fn classify(&mut self, _frame: &Frame) -> bool {
        self.signals.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DetectionConfig {
        DetectionConfig {
            width: 64,
            height: 48,
            history: 20,
            min_area: 40,
            ..DetectionConfig::default()
        }
    }

    fn flat_frame(value: u8, seq: u64) -> Frame {
        Frame::new(vec![value; 64 * 48], 64, 48, seq)
    }

    fn frame_with_block(value: u8, seq: u64) -> Frame {
        let mut pixels = vec![value; 64 * 48];
        // 16x16 block, area 256 after downscale-identity
        for y in 10..26 {
            for x in 20..36 {
                pixels[y * 64 + x] = 255;
            }
        }
        Frame::new(pixels, 64, 48, seq)
    }

    #[test]
    fn test_static_scene_never_motion() {
        let mut detector = MotionDetector::new(test_config());
        for i in 0..40 {
            assert!(!detector.classify(&flat_frame(100, i)));
        }
    }

    #[test]
    fn test_large_block_trips_motion() {
        let mut detector = MotionDetector::new(test_config());
        for i in 0..30 {
            detector.classify(&flat_frame(100, i));
        }
        assert!(detector.classify(&frame_with_block(100, 30)));
    }

    #[test]
    fn test_small_change_below_min_area() {
        let mut config = test_config();
        config.min_area = 2000; // larger than any region the block makes
        let mut detector = MotionDetector::new(config);
        for i in 0..30 {
            detector.classify(&flat_frame(100, i));
        }
        assert!(!detector.classify(&frame_with_block(100, 30)));
    }

    #[test]
    fn test_downscales_larger_frames() {
        let mut detector = MotionDetector::new(test_config());
        // Source at 128x96, analysis at 64x48.
        for i in 0..30 {
            let frame = Frame::new(vec![100u8; 128 * 96], 128, 96, i);
            detector.classify(&frame);
        }

        let mut pixels = vec![100u8; 128 * 96];
        for y in 20..52 {
            for x in 40..72 {
                pixels[y * 128 + x] = 255;
            }
        }
        assert!(detector.classify(&Frame::new(pixels, 128, 96, 30)));
    }

    #[test]
    fn test_reset_relearns() {
        let mut detector = MotionDetector::new(test_config());
        for i in 0..30 {
            detector.classify(&flat_frame(100, i));
        }

        detector.reset();

        // First frame after reset primes the model, no motion even for
        // a completely different scene.
        assert!(!detector.classify(&flat_frame(250, 30)));
    }

    #[test]
    fn test_mock_classifier_replays_then_falls_quiet() {
        let mut mock = MockClassifier::with_signals([true, false, true]);
        let frame = flat_frame(0, 0);

        assert!(mock.classify(&frame));
        assert!(!mock.classify(&frame));
        assert!(mock.classify(&frame));
        assert!(!mock.classify(&frame)); // drained
    }
}
