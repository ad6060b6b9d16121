//! Video frame types and pixel conversions

use image::RgbImage;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Convert to a grayscale frame
    pub fn to_grayscale(&self) -> GrayFrame {
        let mut gray = Vec::with_capacity((self.width * self.height) as usize);
        for pixel in self.data.chunks(3) {
            // Luminance formula: 0.299*R + 0.587*G + 0.114*B
            let y = (pixel[0] as f32 * 0.299
                + pixel[1] as f32 * 0.587
                + pixel[2] as f32 * 0.114) as u8;
            gray.push(y);
        }
        GrayFrame {
            data: gray,
            width: self.width,
            height: self.height,
        }
    }

    /// View the frame as an `image::RgbImage` for drawing.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

/// Single-channel grayscale frame, fed to the detectors
#[derive(Debug, Clone)]
pub struct GrayFrame {
    /// Luminance data (width * height)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
}

impl GrayFrame {
    /// Create a grayscale frame from raw luminance data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Get luminance at (x, y)
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Crop a sub-region of the frame
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<GrayFrame> {
        if w == 0 || h == 0 || x + w > self.width || y + h > self.height {
            return None;
        }

        let mut cropped = Vec::with_capacity((w * h) as usize);
        for row in y..(y + h) {
            let start = (row * self.width + x) as usize;
            cropped.extend_from_slice(&self.data[start..start + w as usize]);
        }

        Some(GrayFrame {
            data: cropped,
            width: w,
            height: h,
        })
    }
}

/// Decode a packed YUYV 4:2:2 buffer to RGB24.
///
/// Each 4-byte group carries two pixels sharing one chroma pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in yuyv.chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        push_yuv(&mut rgb, y0, u, v);
        push_yuv(&mut rgb, y1, u, v);
    }
    rgb
}

// BT.601 full-range conversion
fn push_yuv(out: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    out.push(r);
    out.push(g);
    out.push(b);
}
