use std::rc::Rc;

use macroquad::math::Rect;
use tracing::{debug, trace};

use crate::config::{GidFormat, TileEngineConfig};
use crate::error::MapError;
use crate::layer::{Layer, LayerStore};
use crate::loader::{resolve_tilesets, AssetResolver};
use crate::object::{EngineId, SharedObject};
use crate::render::cache::{RenderCache, TileAtlas};
use crate::render::decode::MapGrid;
use crate::render::Canvas;
use crate::spatial::{col_from_x, row_from_y, Positioned, TilePosition, WorldRect};
use crate::tileset::TilesetRef;
use crate::view::Camera;

/// Value [`TileEngine::tile_at_layer`] returns for an unknown layer.
pub const NO_LAYER: i64 = -1;

/// A tile map drawn from pre-rendered off-screen surfaces.
///
/// Layers are composited once onto a map-sized surface; each frame only
/// copies the viewport out of it. Mutations mark the map dirty and the next
/// [`render`](Self::render) rebuilds the surface.
pub struct TileEngine<C: Canvas> {
    id: EngineId,
    width: u32,
    height: u32,
    tile_w: u32,
    tile_h: u32,
    pixel_w: u32,
    pixel_h: u32,
    tilesets: Vec<TilesetRef<C::Image>>,
    layers: LayerStore,
    gid_format: GidFormat,
    camera: Camera,
    objects: Vec<SharedObject<C>>,
    context: Option<C>,
    cache: RenderCache<C>,
    dirty: bool,
}

impl<C: Canvas> TileEngine<C> {
    /// Build the engine without a drawing target. Nothing is drawn until
    /// [`set_context`](Self::set_context) provides one.
    pub fn new(
        config: TileEngineConfig<C::Image>,
        assets: &impl AssetResolver<C::Image>,
    ) -> Result<Self, MapError> {
        let TileEngineConfig {
            width,
            height,
            tilewidth,
            tileheight,
            tilesets,
            layers,
            gid_format,
        } = config;

        if width == 0 || height == 0 {
            return Err(MapError::InvalidMap(format!(
                "map size must be positive, got {width}x{height} tiles"
            )));
        }
        if tilewidth == 0 || tileheight == 0 {
            return Err(MapError::InvalidMap(format!(
                "tile size must be positive, got {tilewidth}x{tileheight} pixels"
            )));
        }

        let (Some(pixel_w), Some(pixel_h)) =
            (width.checked_mul(tilewidth), height.checked_mul(tileheight))
        else {
            return Err(MapError::InvalidMap(format!(
                "{width}x{height} tiles of {tilewidth}x{tileheight} pixels overflow the pixel size"
            )));
        };

        let tilesets = resolve_tilesets(tilesets, tilewidth, tileheight, assets)?;

        let cells = width as usize * height as usize;
        let layers: Vec<Layer> = layers.into_iter().map(Layer::from_config).collect();
        for l in layers.iter().filter(|l| !l.data.is_empty() && l.data.len() != cells) {
            debug!(
                layer = %l.name,
                len = l.data.len(),
                expected = cells,
                "layer data does not match map size"
            );
        }

        Ok(TileEngine {
            id: EngineId::next(),
            width,
            height,
            tile_w: tilewidth,
            tile_h: tileheight,
            pixel_w,
            pixel_h,
            tilesets,
            layers: LayerStore::new(layers),
            gid_format,
            camera: Camera::default(),
            objects: Vec::new(),
            context: None,
            cache: RenderCache::new(pixel_w, pixel_h),
            dirty: false,
        })
    }

    /// Build the engine and pre-render it onto `context`.
    pub fn with_context(
        config: TileEngineConfig<C::Image>,
        assets: &impl AssetResolver<C::Image>,
        context: C,
    ) -> Result<Self, MapError> {
        let mut engine = Self::new(config, assets)?;
        engine.set_context(context);
        Ok(engine)
    }

    /// Parse a map document and build the engine from it.
    pub fn from_json_str(
        json: &str,
        assets: &impl AssetResolver<C::Image>,
    ) -> Result<Self, MapError> {
        Self::new(TileEngineConfig::from_json_str(json)?, assets)
    }

    /// Install the drawing target and pre-render every visible layer.
    pub fn set_context(&mut self, context: C) {
        self.context = Some(context);
        self.prerender();
    }

    /// Identity attached objects record as their parent.
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// The drawing target, once set.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Mutable access to the drawing target, e.g. to resize it.
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// Map width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width of one grid cell in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_w
    }

    /// Height of one grid cell in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_h
    }

    /// Map width in pixels.
    pub fn map_width(&self) -> u32 {
        self.pixel_w
    }

    /// Map height in pixels.
    pub fn map_height(&self) -> u32 {
        self.pixel_h
    }

    /// Tilesets sorted by firstgid.
    pub fn tilesets(&self) -> &[TilesetRef<C::Image>] {
        &self.tilesets
    }

    /// Layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Layer by name. With duplicate names, the last one.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Whether the next render rebuilds the map surface.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The pre-rendered map surface, once a context is set.
    pub fn map_surface(&self) -> Option<&C> {
        self.cache.map_surface()
    }

    /// The cached surface of one layer, once it has been rendered alone.
    pub fn layer_surface(&self, name: &str) -> Option<&C> {
        self.cache.layer_surface(name)
    }

    /// Split borrows of the render state.
    fn render_parts(
        &mut self,
    ) -> (
        TileAtlas<'_, C::Image>,
        &mut LayerStore,
        &mut RenderCache<C>,
        Option<&mut C>,
    ) {
        let atlas = TileAtlas {
            grid: MapGrid {
                width: self.width,
                tile_w: self.tile_w,
                tile_h: self.tile_h,
            },
            height: self.height,
            tilesets: &self.tilesets,
            format: self.gid_format,
        };
        (atlas, &mut self.layers, &mut self.cache, self.context.as_mut())
    }

    fn viewport(&self) -> (f32, f32) {
        self.context
            .as_ref()
            .map_or((0.0, 0.0), |c| (c.width(), c.height()))
    }

    /// Horizontal scroll offset in pixels.
    pub fn sx(&self) -> f32 {
        self.camera.sx()
    }

    /// Vertical scroll offset in pixels.
    pub fn sy(&self) -> f32 {
        self.camera.sy()
    }

    /// Scroll horizontally, clamped to the map against the current viewport.
    pub fn set_sx(&mut self, value: f32) {
        let (vw, _) = self.viewport();
        self.camera.set_sx(value, self.map_width() as f32, vw);
    }

    /// Scroll vertically, clamped to the map against the current viewport.
    pub fn set_sy(&mut self, value: f32) {
        let (_, vh) = self.viewport();
        self.camera.set_sy(value, self.map_height() as f32, vh);
    }

    /// Attached objects in draw order.
    pub fn objects(&self) -> &[SharedObject<C>] {
        &self.objects
    }

    /// Attach objects; they are drawn after the tiles by [`render`](Self::render).
    pub fn add(&mut self, objects: impl IntoIterator<Item = SharedObject<C>>) {
        for object in objects {
            object.borrow_mut().set_parent(Some(self.id));
            self.objects.push(object);
        }
    }

    /// Detach objects. Their parent is cleared even when they were not attached.
    pub fn remove(&mut self, objects: &[SharedObject<C>]) {
        for object in objects {
            if let Some(i) = self.objects.iter().position(|o| Rc::ptr_eq(o, object)) {
                self.objects.remove(i);
            }
            object.borrow_mut().set_parent(None);
        }
    }

    /// Replace every attached object.
    pub fn set_objects(&mut self, objects: impl IntoIterator<Item = SharedObject<C>>) {
        let current = std::mem::take(&mut self.objects);
        self.remove(&current);
        self.add(objects);
    }

    /// Index into layer data of an in-grid cell.
    fn cell_index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row as u32 >= self.height || col as u32 >= self.width {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    fn mark_dirty(&mut self, name: &str) -> Option<&mut Layer> {
        let layer = self.layers.get_mut(name)?;
        layer.dirty = true;
        self.dirty = true;
        Some(layer)
    }

    /// Write a tile index. Unknown layers and cells outside the map are ignored.
    pub fn set_tile_at_layer(&mut self, name: &str, position: TilePosition, tile: u32) {
        let (row, col) = position.to_cell(self.tile_w, self.tile_h);
        let Some(index) = self.cell_index(row, col) else {
            trace!(layer = name, row, col, "set_tile_at_layer outside map ignored");
            return;
        };
        let cells = self.width as usize * self.height as usize;
        let Some(layer) = self.mark_dirty(name) else {
            trace!(layer = name, "set_tile_at_layer on unknown layer ignored");
            return;
        };
        if layer.data.len() < cells {
            layer.data.resize(cells, 0);
        }
        layer.data[index] = tile;
    }

    /// Replace a layer's data wholesale. Unknown layers are ignored.
    pub fn set_layer(&mut self, name: &str, data: Vec<u32>) {
        match self.mark_dirty(name) {
            Some(layer) => layer.data = data,
            None => trace!(layer = name, "set_layer on unknown layer ignored"),
        }
    }

    /// Show or hide a layer in the combined surface.
    pub fn set_layer_visible(&mut self, name: &str, visible: bool) {
        if let Some(layer) = self.mark_dirty(name) {
            layer.visible = visible;
        }
    }

    /// Set a layer's opacity, clamped to `[0, 1]`.
    pub fn set_layer_opacity(&mut self, name: &str, opacity: f32) {
        if let Some(layer) = self.mark_dirty(name) {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Raw tile index at `position`, `0` outside the map and [`NO_LAYER`]
    /// when no layer has that name.
    pub fn tile_at_layer(&self, name: &str, position: TilePosition) -> i64 {
        let Some(layer) = self.layers.get(name) else {
            return NO_LAYER;
        };
        let (row, col) = position.to_cell(self.tile_w, self.tile_h);
        self.cell_index(row, col)
            .map_or(0, |index| i64::from(layer.get(index)))
    }

    /// Whether `object` overlaps any non-empty cell of the layer.
    ///
    /// Both edges are floored, so an object whose trailing edge sits exactly
    /// on a tile boundary also tests the next row/column. Cells outside the
    /// map never collide.
    pub fn layer_collides_with<P: Positioned + ?Sized>(&self, name: &str, object: &P) -> bool {
        let Some(layer) = self.layers.get(name) else {
            trace!(layer = name, "collision against unknown layer");
            return false;
        };
        let WorldRect {
            x,
            y,
            width,
            height,
        } = object.world_rect();

        // cells outside the map read as empty, so only the in-grid part is scanned
        let row = row_from_y(y, self.tile_h).max(0);
        let col = col_from_x(x, self.tile_w).max(0);
        let end_row = row_from_y(y + height, self.tile_h).min(last_cell(self.height));
        let end_col = col_from_x(x + width, self.tile_w).min(last_cell(self.width));
        if row > end_row || col > end_col {
            return false;
        }

        (row..=end_row).any(|r| {
            (col..=end_col).any(|c| {
                self.cell_index(r, c)
                    .is_some_and(|index| layer.get(index) != 0)
            })
        })
    }

    fn prerender(&mut self) {
        self.dirty = false;
        let (atlas, layers, cache, context) = self.render_parts();
        if let Some(context) = context {
            cache.prerender(context, layers, &atlas);
        }
    }

    /// Draw the visible part of the map, then the attached objects.
    pub fn render(&mut self) {
        if self.dirty {
            self.prerender();
        }
        let camera = self.camera;
        let (Some(context), Some(surface)) = (self.context.as_mut(), self.cache.map_surface())
        else {
            trace!("render skipped, no drawing context");
            return;
        };

        context.begin_batch();
        blit_viewport(context, surface, camera);

        context.save();
        if !camera.is_origin() {
            context.translate(-camera.sx(), -camera.sy());
        }
        for object in &self.objects {
            object.borrow_mut().render(context);
        }
        context.restore();
        context.end_batch();
    }

    /// Draw a single layer from its own cached surface. Attached objects are
    /// not drawn.
    pub fn render_layer(&mut self, name: &str) {
        if self.dirty {
            self.prerender();
        }
        let camera = self.camera;
        let (atlas, layers, cache, context) = self.render_parts();
        let Some(context) = context else {
            trace!(layer = name, "render_layer skipped, no drawing context");
            return;
        };
        let Some(layer) = layers.get_mut(name) else {
            trace!(layer = name, "render_layer on unknown layer ignored");
            return;
        };

        let surface = cache.refresh_layer(context, layer, &atlas);
        context.begin_batch();
        blit_viewport(context, surface, camera);
        context.end_batch();
    }
}

/// Largest in-grid row or column for a dimension of `tiles` cells.
fn last_cell(tiles: u32) -> i32 {
    i32::try_from(tiles.saturating_sub(1)).unwrap_or(i32::MAX)
}

/// Copy the camera's window of `surface` to the top-left of `context`.
fn blit_viewport<C: Canvas>(context: &mut C, surface: &C, camera: Camera) {
    let w = surface.width().min(context.width());
    let h = surface.height().min(context.height());
    context.draw_canvas(
        surface,
        Rect::new(camera.sx(), camera.sy(), w, h),
        Rect::new(0.0, 0.0, w, h),
    );
}

impl<C: Canvas> Positioned for TileEngine<C> {
    fn world_rect(&self) -> WorldRect {
        WorldRect::new(0.0, 0.0, self.map_width() as f32, self.map_height() as f32)
    }
}
