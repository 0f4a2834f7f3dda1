use clubhead_core::{FrameView, PixelFormat, PoseLandmarks};
use clubhead_detector::{ClubHeadDetector, DetectionResult};
use image::DynamicImage;

use crate::ClubheadError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Borrow an `image::GrayImage` as a detector frame.
pub fn gray_frame(img: &image::GrayImage) -> Result<FrameView<'_>, ClubheadError> {
    let (w, h) = img.dimensions();
    Ok(FrameView::new(
        w as usize,
        h as usize,
        PixelFormat::Gray8,
        img.as_raw(),
    )?)
}

pub fn rgb_frame(img: &image::RgbImage) -> Result<FrameView<'_>, ClubheadError> {
    let (w, h) = img.dimensions();
    Ok(FrameView::new(
        w as usize,
        h as usize,
        PixelFormat::Rgb8,
        img.as_raw(),
    )?)
}

pub fn rgba_frame(img: &image::RgbaImage) -> Result<FrameView<'_>, ClubheadError> {
    let (w, h) = img.dimensions();
    Ok(FrameView::new(
        w as usize,
        h as usize,
        PixelFormat::Rgba8,
        img.as_raw(),
    )?)
}

/// Run the detector on any decoded image.
///
/// 8-bit gray, RGB and RGBA buffers are used in place; other layouts are
/// converted to RGBA first.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(detector, img, pose),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_image(
    detector: &mut ClubHeadDetector,
    img: &DynamicImage,
    pose: &PoseLandmarks,
    wrist_separation: f32,
) -> Result<DetectionResult, ClubheadError> {
    let result = match img {
        DynamicImage::ImageLuma8(g) => detector.detect(&gray_frame(g)?, pose, wrist_separation)?,
        DynamicImage::ImageRgb8(rgb) => detector.detect(&rgb_frame(rgb)?, pose, wrist_separation)?,
        DynamicImage::ImageRgba8(rgba) => {
            detector.detect(&rgba_frame(rgba)?, pose, wrist_separation)?
        }
        other => {
            let rgba = other.to_rgba8();
            detector.detect(&rgba_frame(&rgba)?, pose, wrist_separation)?
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhead_detector::{DetectionMethod, DetectorParams};

    fn detector(w: usize, h: usize) -> ClubHeadDetector {
        let mut det = ClubHeadDetector::new(DetectorParams::default()).expect("detector");
        det.init(w, h).expect("init");
        det
    }

    #[test]
    fn frames_keep_their_layout() {
        let gray = image::GrayImage::new(8, 6);
        let frame = gray_frame(&gray).expect("frame");
        assert_eq!(frame.format(), PixelFormat::Gray8);
        assert_eq!((frame.width(), frame.height()), (8, 6));

        let rgba = image::RgbaImage::new(8, 6);
        assert_eq!(rgba_frame(&rgba).expect("frame").data().len(), 8 * 6 * 4);
    }

    #[test]
    fn all_layouts_run_through_the_detector() {
        let images = [
            DynamicImage::new_luma8(64, 48),
            DynamicImage::new_rgb8(64, 48),
            DynamicImage::new_rgba8(64, 48),
            DynamicImage::new_rgb16(64, 48),
        ];
        for img in &images {
            let mut det = detector(64, 48);
            let r = detect_image(&mut det, img, &PoseLandmarks::default(), 0.0).expect("detect");
            assert_eq!(r.method, DetectionMethod::PoseFallback);
        }
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let mut det = detector(32, 32);
        let img = DynamicImage::new_luma8(64, 48);
        assert!(matches!(
            detect_image(&mut det, &img, &PoseLandmarks::default(), 0.0),
            Err(ClubheadError::Detect(_))
        ));
    }
}
