//! Three-stage denoising animation for the "how it works" step.
//!
//! No real diffusion happens here. Stage 0 is pure noise, stage 1 is the
//! sticker blurred under a partially transparent noise layer, stage 2 is the
//! sticker itself.

use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use rand::Rng;

/// Opacity of the noise layer in the middle stage.
pub const NOISE_OPACITY: f32 = 0.6;
const BLUR_SIGMA: f32 = 3.0;

pub const LAST_STAGE: u8 = 2;

/// Title and description of a stage.
pub struct Caption {
    pub title: &'static str,
    pub body: &'static str,
}

const CAPTIONS: [Caption; 3] = [
    Caption {
        title: "1. Start from noise",
        body: "Every image begins as random static. The model has not drawn anything yet.",
    },
    Caption {
        title: "2. Remove the noise, step by step",
        body: "Guided by your prompt, the model predicts which parts are noise and removes a little at a time. Shapes start to appear.",
    },
    Caption {
        title: "3. The finished sticker",
        body: "After many small denoising steps the noise is gone and only the picture your prompt described remains.",
    },
];

#[derive(Debug, Clone, Default)]
pub struct DiffusionDemo {
    stage: u8,
    revision: u64,
}

impl DiffusionDemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.stage == LAST_STAGE
    }

    /// Advance one stage, stopping at the last.
    pub fn next(&mut self) {
        self.stage = (self.stage + 1).min(LAST_STAGE);
    }

    pub fn restart(&mut self) {
        self.stage = 0;
    }

    /// Reset to stage 0 if the source image changed since the last call.
    /// Returns `true` when a reset happened.
    pub fn sync_revision(&mut self, revision: u64) -> bool {
        if self.revision == revision {
            return false;
        }
        self.revision = revision;
        self.restart();
        true
    }

    pub fn caption(&self) -> &'static Caption {
        &CAPTIONS[self.stage as usize]
    }

    /// Render the current stage at `width` x `height` pixels.
    pub fn render_frame<R: Rng + ?Sized>(
        &self,
        source: &RgbaImage,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> RgbaImage {
        let (width, height) = (width.max(1), height.max(1));
        match self.stage {
            0 => noise(width, height, rng),
            1 => {
                let mut blurred = imageops::blur(&fit(source, width, height), BLUR_SIGMA);
                let overlay = noise(width, height, rng);
                blend(&mut blurred, &overlay, NOISE_OPACITY);
                blurred
            }
            _ => fit(source, width, height),
        }
    }
}

fn fit(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if source.dimensions() == (width, height) {
        return source.clone();
    }
    imageops::resize(source, width, height, FilterType::Triangle)
}

/// Uniform random grayscale field.
pub fn noise<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, _| {
        let v: u8 = rng.gen();
        Rgba([v, v, v, 0xFF])
    })
}

/// Alpha-composite `top` over `base` at a fixed opacity.
fn blend(base: &mut RgbaImage, top: &RgbaImage, opacity: f32) {
    for (dst, src) in base.pixels_mut().zip(top.pixels()) {
        for c in 0..3 {
            let mixed = src[c] as f32 * opacity + dst[c] as f32 * (1.0 - opacity);
            dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = 0xFF;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sticker::placeholder_pixels;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_next_clamps_at_last_stage() {
        let mut demo = DiffusionDemo::new();
        for _ in 0..5 {
            demo.next();
        }
        assert_eq!(demo.stage(), 2);
        assert!(demo.is_finished());

        demo.restart();
        assert_eq!(demo.stage(), 0);
    }

    #[test]
    fn test_revision_change_resets_stage() {
        let mut demo = DiffusionDemo::new();
        demo.next();
        demo.next();
        assert!(!demo.sync_revision(0));
        assert_eq!(demo.stage(), 2);

        assert!(demo.sync_revision(3));
        assert_eq!(demo.stage(), 0);
        assert!(!demo.sync_revision(3));
    }

    #[test]
    fn test_captions_follow_stage() {
        let mut demo = DiffusionDemo::new();
        assert!(demo.caption().title.contains("noise"));
        demo.next();
        demo.next();
        assert!(demo.caption().title.contains("finished"));
    }

    #[test]
    fn test_noise_frame_is_grayscale() {
        let mut rng = StdRng::seed_from_u64(7);
        let demo = DiffusionDemo::new();
        let frame = demo.render_frame(&placeholder_pixels(32), 20, 10, &mut rng);
        assert_eq!(frame.dimensions(), (20, 10));
        assert!(frame.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let a = noise(8, 8, &mut StdRng::seed_from_u64(42));
        let b = noise(8, 8, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_final_stage_matches_source() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut demo = DiffusionDemo::new();
        demo.next();
        demo.next();
        let source = placeholder_pixels(16);
        let frame = demo.render_frame(&source, 16, 16, &mut rng);
        assert_eq!(frame, source);
    }

    #[test]
    fn test_middle_stage_mixes_noise() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut demo = DiffusionDemo::new();
        demo.next();
        let source = RgbaImage::from_pixel(12, 12, Rgba([255, 0, 0, 255]));
        let frame = demo.render_frame(&source, 12, 12, &mut rng);
        assert_eq!(frame.dimensions(), (12, 12));
        assert_ne!(frame, source);
        // Green only comes from the noise layer
        assert!(frame.pixels().any(|p| p[1] > 0));
    }

    #[test]
    fn test_blend_full_opacity_takes_top() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let top = RgbaImage::from_pixel(2, 2, Rgba([200, 200, 200, 255]));
        blend(&mut base, &top, 1.0);
        assert!(base.pixels().all(|p| p[0] == 200));
    }
}
