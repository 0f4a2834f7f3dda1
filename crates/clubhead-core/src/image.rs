use serde::{Deserialize, Serialize};

use crate::Roi;

/// Errors raised when wrapping a raw pixel buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },
}

/// Interleaved 8-bit pixel layouts accepted as frame input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    #[default]
    Rgba8,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Borrowed raw video frame, row-major and tightly packed.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Wrap a pixel buffer, checking that its length matches the dimensions.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or(FrameError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Rec.601 luma of the pixel at `(x, y)`, or `None` outside the frame.
    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ch = self.format.channels();
        let i = (y * self.width + x) * ch;
        let px = self.data.get(i..i + ch)?;
        Some(match self.format {
            PixelFormat::Gray8 => px[0],
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => rgb_to_luma(px[0], px[1], px[2]),
        })
    }
}

#[inline]
fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert a whole frame to an owned 8-bit grayscale image.
pub fn to_grayscale(frame: &FrameView<'_>) -> GrayImage {
    let ch = frame.format.channels();
    let data = match frame.format {
        PixelFormat::Gray8 => frame.data.to_vec(),
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => frame
            .data
            .chunks_exact(ch)
            .map(|px| rgb_to_luma(px[0], px[1], px[2]))
            .collect(),
    };
    GrayImage {
        width: frame.width,
        height: frame.height,
        data,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.data.get(y as usize * self.width + x as usize).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        if data.len() != width * height {
            return Err(FrameError::BufferLength {
                expected: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Bounds-checked read; out-of-range coordinates yield `None`.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        self.view().get(x, y)
    }

    /// Bounds-checked write; out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = v;
        }
    }

    /// Copy the part of the image covered by `roi`, clipped to the image.
    pub fn crop(&self, roi: &Roi) -> GrayImage {
        let x0 = roi.x.min(self.width);
        let y0 = roi.y.min(self.height);
        let x1 = roi.right().min(self.width);
        let y1 = roi.bottom().min(self.height);
        let w = x1.saturating_sub(x0);
        let h = y1.saturating_sub(y0);
        let mut data = Vec::with_capacity(w * h);
        for y in y0..y1 {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + x0..row + x1]);
        }
        GrayImage {
            width: w,
            height: h,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_view_rejects_bad_buffers() {
        let buf = vec![0u8; 10];
        assert_eq!(
            FrameView::new(0, 4, PixelFormat::Gray8, &buf).unwrap_err(),
            FrameError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert_eq!(
            FrameView::new(2, 2, PixelFormat::Rgb8, &buf).unwrap_err(),
            FrameError::BufferLength {
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn rgba_frame_converts_to_luma() {
        // white, red, green, blue
        let buf = [
            255, 255, 255, 255, 255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255,
        ];
        let frame = FrameView::new(2, 2, PixelFormat::Rgba8, &buf).expect("frame");
        let gray = to_grayscale(&frame);
        assert_eq!(gray.data, vec![255, 76, 150, 29]);
        assert_eq!(frame.luma(1, 0), Some(76));
        assert_eq!(frame.luma(2, 0), None);
    }

    #[test]
    fn crop_clips_to_image() {
        let mut img = GrayImage::new(4, 3);
        img.set(3, 2, 9);
        img.set(10, 10, 1);
        let roi = Roi {
            x: 2,
            y: 1,
            w: 5,
            h: 5,
        };
        let c = img.crop(&roi);
        assert_eq!((c.width, c.height), (2, 2));
        assert_eq!(c.get(1, 1), Some(9));
        assert_eq!(c.get(-1, 0), None);
        assert_eq!(c.get(2, 0), None);
    }
}
