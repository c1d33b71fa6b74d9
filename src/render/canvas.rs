use macroquad::math::Rect;

/// A decoded atlas bitmap. Only its size matters to the engine.
pub trait AtlasImage {
    /// Width in pixels.
    fn width(&self) -> f32;
    /// Height in pixels.
    fn height(&self) -> f32;
}

/// A 2D drawing target with a save/restore transform stack.
///
/// The same type serves as the visible target and as the off-screen
/// surfaces the engine caches layers on; [`Canvas::offscreen`] creates the
/// latter from the former. Transforms compose in call order: a `translate`
/// followed by a `rotate` rotates around the translated origin.
pub trait Canvas: Sized {
    /// Bitmap handle tilesets are cut from.
    type Image: AtlasImage;

    /// Width of the drawable area in pixels.
    fn width(&self) -> f32;
    /// Height of the drawable area in pixels.
    fn height(&self) -> f32;

    /// New transparent surface of the same backend.
    fn offscreen(&mut self, width: u32, height: u32) -> Self;

    /// Clear every pixel to transparent, ignoring the current transform.
    fn clear(&mut self);

    /// Push transform and alpha.
    fn save(&mut self);
    /// Pop transform and alpha. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Move the origin by `(x, y)`.
    fn translate(&mut self, x: f32, y: f32);
    /// Rotate by `radians`, clockwise in the y-down pixel space.
    fn rotate(&mut self, radians: f32);
    /// Scale both axes. Negative factors mirror.
    fn scale(&mut self, x: f32, y: f32);

    /// Alpha applied to every following draw until `restore`.
    fn set_alpha(&mut self, alpha: f32);

    /// Draw `src` of `image` into `dst`, under the current transform.
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dst: Rect);

    /// Draw `src` of another surface into `dst`, under the current transform.
    fn draw_canvas(&mut self, source: &Self, src: Rect, dst: Rect);

    /// Called before a run of draws onto this target. Backends that have to
    /// bind a target before drawing can do it once here.
    fn begin_batch(&mut self) {}

    /// Closes a [`Canvas::begin_batch`].
    fn end_batch(&mut self) {}
}
