//! ROI extraction and local contrast normalization.

use clubhead_core::{GrayImage, Roi};

use crate::params::PreprocessParams;

/// Crop `roi` out of the grayscale frame and stretch its contrast.
pub fn preprocess_roi(gray: &GrayImage, roi: &Roi, params: &PreprocessParams) -> GrayImage {
    let mut patch = gray.crop(roi);
    normalize_contrast(&mut patch, params.min_dynamic_range);
    patch
}

/// Linearly stretch intensities to the full `[0, 255]` range.
///
/// Images whose range is below `min_dynamic_range` carry no usable structure
/// and are flattened to zero so that they produce no gradients.
pub fn normalize_contrast(img: &mut GrayImage, min_dynamic_range: u8) {
    let Some((lo, hi)) = img
        .data
        .iter()
        .fold(None, |acc: Option<(u8, u8)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    else {
        return;
    };

    let range = hi - lo;
    if range < min_dynamic_range.max(1) {
        img.data.fill(0);
        return;
    }

    let scale = 255.0 / range as f32;
    for v in &mut img.data {
        *v = ((*v - lo) as f32 * scale).round().min(255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_to_full_range() {
        let mut img = GrayImage::from_raw(2, 2, vec![100, 110, 120, 150]).expect("img");
        normalize_contrast(&mut img, 8);
        assert_eq!(img.data, vec![0, 51, 102, 255]);
    }

    #[test]
    fn flat_roi_becomes_zero() {
        let mut img = GrayImage::from_raw(3, 1, vec![90, 93, 91]).expect("img");
        normalize_contrast(&mut img, 8);
        assert_eq!(img.data, vec![0, 0, 0]);
    }

    #[test]
    fn crops_before_normalizing() {
        let mut gray = GrayImage::new(8, 8);
        gray.set(5, 5, 40);
        gray.set(0, 0, 255);
        let roi = Roi {
            x: 4,
            y: 4,
            w: 3,
            h: 3,
        };
        let patch = preprocess_roi(&gray, &roi, &PreprocessParams::default());
        assert_eq!((patch.width, patch.height), (3, 3));
        assert_eq!(patch.get(1, 1), Some(255));
        assert_eq!(patch.get(0, 0), Some(0));
    }
}
