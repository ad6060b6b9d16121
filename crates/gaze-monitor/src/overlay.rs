//! Display overlay
//!
//! Annotates a frame with the detected face and eye regions for the live
//! view. Strictly a side path: best-effort, clipped to the canvas, and
//! never an input to the control loop.

use camera_capture::VideoFrame;
use detection::Region;
use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const FACE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const EYE_COLOR: Rgb<u8> = Rgb([0, 128, 255]);

/// Draw hollow markers for the face and eye regions.
///
/// Returns `None` when the frame buffer does not match its dimensions;
/// regions outside the canvas are clipped by the drawing routine.
pub fn annotate(frame: &VideoFrame, face: Option<&Region>, eyes: &[Region]) -> Option<VideoFrame> {
    let mut canvas = frame.to_rgb_image()?;

    if let Some(region) = face {
        draw_region(&mut canvas, region, FACE_COLOR);
    }
    for region in eyes {
        draw_region(&mut canvas, region, EYE_COLOR);
    }

    Some(VideoFrame::new(
        canvas.into_raw(),
        frame.width,
        frame.height,
        frame.timestamp_ns,
        frame.sequence,
    ))
}

fn draw_region(canvas: &mut image::RgbImage, region: &Region, color: Rgb<u8>) {
    if region.width == 0 || region.height == 0 {
        return;
    }
    let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.width, region.height);
    draw_hollow_rect_mut(canvas, rect, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame::new(vec![0; (width * height * 3) as usize], width, height, 7, 3)
    }

    #[test]
    fn marks_face_and_eyes() {
        let frame = black_frame(32, 32);
        let face = Region::new(4, 4, 20, 20);
        let eyes = [Region::new(8, 10, 4, 4), Region::new(16, 10, 4, 4)];

        let annotated = annotate(&frame, Some(&face), &eyes).unwrap();
        assert_eq!(annotated.get_pixel(4, 4), Some([0, 255, 0]));
        assert_eq!(annotated.get_pixel(8, 10), Some([0, 128, 255]));
        assert_eq!((annotated.timestamp_ns, annotated.sequence), (7, 3));
    }

    #[test]
    fn out_of_canvas_region_is_harmless() {
        let frame = black_frame(16, 16);
        let wild = Region::new(12, 12, 100, 100);
        assert!(annotate(&frame, Some(&wild), &[]).is_some());
    }

    #[test]
    fn mismatched_buffer_yields_none() {
        let broken = VideoFrame::new(vec![0; 5], 16, 16, 0, 0);
        assert!(annotate(&broken, None, &[]).is_none());
    }

    #[test]
    fn no_regions_leaves_frame_unchanged() {
        let frame = black_frame(8, 8);
        let annotated = annotate(&frame, None, &[]).unwrap();
        assert_eq!(annotated.data, frame.data);
    }
}
