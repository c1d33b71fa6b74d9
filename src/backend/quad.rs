//! Macroquad drawing backend and asset preloading.

use std::path::Path;

use anyhow::Context;
use macroquad::file::load_string;
use macroquad::prelude::*;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::{ImageSource, TileEngineConfig};
use crate::loader::MemoryAssets;
use crate::render::{AtlasImage, Canvas};
use crate::TileEngine;

impl AtlasImage for Texture2D {
    fn width(&self) -> f32 {
        Texture2D::width(self)
    }

    fn height(&self) -> f32 {
        Texture2D::height(self)
    }
}

/// [`Canvas`] drawing to the window or to a render target.
///
/// Transforms are tracked on the CPU and folded into the parameters of
/// `draw_texture_ex`, which covers the translate/rotate/scale combinations
/// tile blits and sprites need.
pub struct MacroquadCanvas {
    target: Option<RenderTarget>,
    size: Vec2,
    transform: Affine2,
    alpha: f32,
    stack: Vec<(Affine2, f32)>,
    batch_depth: u32,
}

impl MacroquadCanvas {
    /// The window. Its size follows the window.
    pub fn screen() -> Self {
        MacroquadCanvas {
            target: None,
            size: Vec2::ZERO,
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            stack: Vec::new(),
            batch_depth: 0,
        }
    }

    /// Backing texture of an off-screen canvas.
    pub fn texture(&self) -> Option<&Texture2D> {
        self.target.as_ref().map(|rt| &rt.texture)
    }

    /// Point macroquad's drawing at this canvas. Undone by `pop_camera_state`.
    fn bind(&self) {
        push_camera_state();
        match &self.target {
            Some(rt) => {
                let mut cam = Camera2D::from_display_rect(Rect::new(0.0, 0.0, self.size.x, self.size.y));
                cam.render_target = Some(rt.clone());
                set_camera(&cam);
            }
            None => set_default_camera(),
        }
    }

    fn bound<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.batch_depth > 0 {
            return f(self);
        }
        self.bind();
        let out = f(self);
        pop_camera_state();
        out
    }

    /// Draw `src` of `texture` into `dest` through the current transform.
    fn blit(&mut self, texture: &Texture2D, src: Rect, dest: Rect, mut flip_y: bool) {
        let linear = self.transform.matrix2;
        let origin = self.transform.translation;

        // linear = rotation(angle) * scale(sx, sy) with sx >= 0
        let sx = linear.x_axis.length();
        let angle = linear.x_axis.y.atan2(linear.x_axis.x);
        let (sin, cos) = angle.sin_cos();
        let sy = linear.y_axis.dot(vec2(-sin, cos));

        let x = dest.x * sx;
        let w = dest.w * sx;
        let mut y = dest.y * sy;
        let mut h = dest.h * sy;
        if h < 0.0 {
            y += h;
            h = -h;
            flip_y = !flip_y;
        }

        let alpha = self.alpha;
        self.bound(|_| {
            draw_texture_ex(
                texture,
                origin.x + x,
                origin.y + y,
                Color::new(1.0, 1.0, 1.0, alpha),
                DrawTextureParams {
                    dest_size: Some(vec2(w, h)),
                    source: Some(src),
                    rotation: angle,
                    flip_x: false,
                    flip_y,
                    pivot: Some(origin),
                },
            );
        });
    }
}

impl Canvas for MacroquadCanvas {
    type Image = Texture2D;

    fn width(&self) -> f32 {
        match self.target {
            Some(_) => self.size.x,
            None => screen_width(),
        }
    }

    fn height(&self) -> f32 {
        match self.target {
            Some(_) => self.size.y,
            None => screen_height(),
        }
    }

    fn offscreen(&mut self, width: u32, height: u32) -> Self {
        let rt = render_target(width, height);
        rt.texture.set_filter(FilterMode::Nearest);
        MacroquadCanvas {
            target: Some(rt),
            size: vec2(width as f32, height as f32),
            ..MacroquadCanvas::screen()
        }
    }

    fn clear(&mut self) {
        self.bound(|_| clear_background(Color::new(0.0, 0.0, 0.0, 0.0)));
    }

    fn save(&mut self) {
        self.stack.push((self.transform, self.alpha));
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.stack.pop() {
            self.transform = transform;
            self.alpha = alpha;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.transform = self.transform * Affine2::from_translation(vec2(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.transform = self.transform * Affine2::from_scale(vec2(x, y));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn draw_image(&mut self, image: &Texture2D, src: Rect, dest: Rect) {
        self.blit(image, src, dest, false);
    }

    fn draw_canvas(&mut self, source: &Self, src: Rect, dest: Rect) {
        let Some(texture) = source.texture() else {
            warn!("cannot draw the window onto another canvas");
            return;
        };
        // render targets are stored upside down
        let flipped = Rect::new(src.x, source.size.y - src.y - src.h, src.w, src.h);
        self.blit(texture, flipped, dest, true);
    }

    fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.bind();
        }
        self.batch_depth += 1;
    }

    fn end_batch(&mut self) {
        match self.batch_depth {
            0 => {}
            1 => {
                self.batch_depth = 0;
                pop_camera_state();
            }
            _ => self.batch_depth -= 1,
        }
    }
}

/// Load every tileset source and image `config` references.
///
/// Paths are resolved against `base_dir` and stored under the path written
/// in the configuration, the way [`TileEngine::new`] looks them up.
pub async fn preload_assets(
    config: &TileEngineConfig<Texture2D>,
    base_dir: &Path,
) -> anyhow::Result<MemoryAssets<Texture2D>> {
    let mut assets = MemoryAssets::new();

    for ts in &config.tilesets {
        let mut image = match &ts.image {
            Some(ImageSource::Path(p)) => Some(p.clone()),
            _ => None,
        };

        if let Some(source) = &ts.source {
            if !assets.has_data(source) {
                let path = base_dir.join(source);
                let txt = load_string(&path.to_string_lossy())
                    .await
                    .with_context(|| format!("Reading tileset source {source}"))?;
                let value: JsonValue = serde_json::from_str(&txt)
                    .with_context(|| format!("Parsing tileset source {source}"))?;
                if let Some(img) = value.get("image").and_then(JsonValue::as_str) {
                    image = Some(img.to_owned());
                }
                assets.insert_data(source.clone(), value);
            }
        }

        if let Some(img) = image {
            if !assets.has_image(&img) {
                let path = base_dir.join(&img);
                let tex = load_texture(&path.to_string_lossy())
                    .await
                    .with_context(|| format!("Loading texture {img}"))?;
                tex.set_filter(FilterMode::Nearest);
                debug!(image = %img, "texture loaded");
                assets.insert_image(img, tex);
            }
        }
    }

    Ok(assets)
}

impl TileEngine<MacroquadCanvas> {
    /// Load a JSON map and everything it references, then pre-render it for
    /// the window.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let p = Path::new(path);
        if p.extension().and_then(|e| e.to_str()) != Some("json") {
            anyhow::bail!("Map file must be a JSON file: {}", path);
        }

        let txt = load_string(path)
            .await
            .with_context(|| format!("Reading map file {}", path))?;
        let config = TileEngineConfig::from_json_str(&txt)
            .with_context(|| format!("Parsing map file {}", path))?;

        let map_dir = p.parent().unwrap_or_else(|| Path::new("./"));
        let assets = preload_assets(&config, map_dir).await?;

        let engine = TileEngine::with_context(config, &assets, MacroquadCanvas::screen())
            .with_context(|| format!("Building tile engine for {}", path))?;
        Ok(engine)
    }
}
