//! Headless canvas that records what would have been drawn.
//!
//! Useful to run the engine without a window (servers, tooling) and to
//! inspect its output in tests.

use std::cell::Cell;
use std::rc::Rc;

use macroquad::math::{Affine2, Rect, Vec2};

use crate::render::{AtlasImage, Canvas};

/// Image stand-in for [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedImage {
    /// Reported in [`DrawOp::Image`].
    pub name: String,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl RecordedImage {
    /// Stand-in image of the given size.
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        RecordedImage {
            name: name.into(),
            width,
            height,
        }
    }
}

impl AtlasImage for RecordedImage {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }
}

/// One call made on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// [`Canvas::clear`].
    Clear,
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::translate`].
    Translate(Vec2),
    /// [`Canvas::rotate`].
    Rotate(f32),
    /// [`Canvas::scale`].
    Scale(Vec2),
    /// [`Canvas::set_alpha`].
    SetAlpha(f32),
    /// [`Canvas::draw_image`].
    Image {
        /// [`RecordedImage::name`] of the atlas.
        image: String,
        /// Atlas rectangle.
        src: Rect,
        /// Destination rectangle.
        dest: Rect,
        /// Transform in effect when the image was drawn.
        transform: Affine2,
        /// Alpha in effect when the image was drawn.
        alpha: f32,
    },
    /// [`Canvas::draw_canvas`].
    Canvas {
        /// [`RecordingCanvas::id`] of the source surface.
        source: u32,
        /// Rectangle of the source surface.
        src: Rect,
        /// Destination rectangle.
        dest: Rect,
        /// Transform in effect when the surface was drawn.
        transform: Affine2,
        /// Alpha in effect when the surface was drawn.
        alpha: f32,
    },
}

/// [`Canvas`] keeping a log of [`DrawOp`]s.
#[derive(Debug)]
pub struct RecordingCanvas {
    id: u32,
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
    transform: Affine2,
    alpha: f32,
    stack: Vec<(Affine2, f32)>,
    next_id: Rc<Cell<u32>>,
}

impl RecordingCanvas {
    /// Visible target of the given size. Off-screen surfaces made from it share its id counter.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_id(0, width, height, Rc::new(Cell::new(1)))
    }

    fn with_id(id: u32, width: f32, height: f32, next_id: Rc<Cell<u32>>) -> Self {
        RecordingCanvas {
            id,
            width,
            height,
            ops: Vec::new(),
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            stack: Vec::new(),
            next_id,
        }
    }

    /// Identifies this surface in [`DrawOp::Canvas`] entries.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Calls recorded so far.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Change the size, like resizing a window.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Number of recorded clears.
    pub fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear)).count()
    }

    /// Number of recorded image draws.
    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    type Image = RecordedImage;

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn offscreen(&mut self, width: u32, height: u32) -> Self {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Self::with_id(id, width as f32, height as f32, Rc::clone(&self.next_id))
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn save(&mut self) {
        self.stack.push((self.transform, self.alpha));
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.stack.pop() {
            self.transform = transform;
            self.alpha = alpha;
        }
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        let v = Vec2::new(x, y);
        self.transform = self.transform * Affine2::from_translation(v);
        self.ops.push(DrawOp::Translate(v));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, x: f32, y: f32) {
        let v = Vec2::new(x, y);
        self.transform = self.transform * Affine2::from_scale(v);
        self.ops.push(DrawOp::Scale(v));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.ops.push(DrawOp::SetAlpha(alpha));
    }

    fn draw_image(&mut self, image: &RecordedImage, src: Rect, dest: Rect) {
        self.ops.push(DrawOp::Image {
            image: image.name.clone(),
            src,
            dest,
            transform: self.transform,
            alpha: self.alpha,
        });
    }

    fn draw_canvas(&mut self, source: &Self, src: Rect, dest: Rect) {
        self.ops.push(DrawOp::Canvas {
            source: source.id,
            src,
            dest,
            transform: self.transform,
            alpha: self.alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_surfaces_get_fresh_ids() {
        let mut screen = RecordingCanvas::new(320.0, 240.0);
        let a = screen.offscreen(64, 64);
        let b = screen.offscreen(64, 64);
        assert_eq!(screen.id(), 0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.width(), 64.0);
    }

    #[test]
    fn restore_pops_transform_and_alpha() {
        let mut c = RecordingCanvas::new(10.0, 10.0);
        let img = RecordedImage::new("a", 1.0, 1.0);
        c.save();
        c.translate(5.0, 0.0);
        c.set_alpha(0.5);
        c.restore();
        c.draw_image(&img, Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.0, 0.0, 1.0, 1.0));
        match c.ops().last() {
            Some(DrawOp::Image {
                transform, alpha, ..
            }) => {
                assert_eq!(*transform, Affine2::IDENTITY);
                assert_eq!(*alpha, 1.0);
            }
            other => panic!("expected image op, got {other:?}"),
        }
    }
}
