use std::collections::HashMap;

use tracing::debug;

use crate::layer::{Layer, LayerStore};
use crate::render::decode::{decode_tile, GidFormat, MapGrid};
use crate::render::Canvas;
use crate::tileset::TilesetRef;

/// Everything needed to turn layer data into blits.
pub struct TileAtlas<'a, I> {
    /// Map geometry.
    pub grid: MapGrid,
    /// Map height in tiles; cells past `grid.width * height` are ignored.
    pub height: u32,
    /// Tilesets sorted by firstgid.
    pub tilesets: &'a [TilesetRef<I>],
    /// Flag bit interpretation.
    pub format: GidFormat,
}

impl<I> TileAtlas<'_, I> {
    fn cell_count(&self) -> usize {
        self.grid.width as usize * self.height as usize
    }
}

/// Draw every non-empty tile of `layer` onto `target`, at the layer's opacity.
pub fn draw_layer<C: Canvas>(layer: &Layer, target: &mut C, atlas: &TileAtlas<'_, C::Image>) {
    target.save();
    target.set_alpha(layer.opacity);

    for (cell, &raw) in layer.data.iter().take(atlas.cell_count()).enumerate() {
        let Some(cmd) = decode_tile(raw, cell, atlas.grid, atlas.tilesets, atlas.format) else {
            continue;
        };
        let image = &atlas.tilesets[cmd.tileset_index].image;

        match cmd.transform {
            None => target.draw_image(image, cmd.src, cmd.dest),
            Some(t) => {
                target.save();
                target.translate(t.translate.x, t.translate.y);
                if t.rotate != 0.0 {
                    target.rotate(t.rotate);
                }
                if t.scale.x != 1.0 || t.scale.y != 1.0 {
                    target.scale(t.scale.x, t.scale.y);
                }
                target.draw_image(image, cmd.src, cmd.dest);
                target.restore();
            }
        }
    }

    target.restore();
}

/// Off-screen surfaces holding pre-rendered layers.
///
/// The combined surface holds every visible layer and is rebuilt as a whole;
/// each per-layer surface is created on first use and only redrawn when its
/// layer is dirty.
pub struct RenderCache<C> {
    map_surface: Option<C>,
    layer_surfaces: HashMap<String, C>,
    surface_w: u32,
    surface_h: u32,
}

impl<C: Canvas> RenderCache<C> {
    /// Empty cache whose surfaces will be `surface_w`x`surface_h` pixels.
    pub fn new(surface_w: u32, surface_h: u32) -> Self {
        RenderCache {
            map_surface: None,
            layer_surfaces: HashMap::new(),
            surface_w,
            surface_h,
        }
    }

    /// Combined surface, after the first pre-render.
    pub fn map_surface(&self) -> Option<&C> {
        self.map_surface.as_ref()
    }

    /// Surface of one layer, after it was first refreshed.
    pub fn layer_surface(&self, name: &str) -> Option<&C> {
        self.layer_surfaces.get(name)
    }

    /// Clear the combined surface and draw every visible layer onto it.
    pub fn prerender(
        &mut self,
        context: &mut C,
        layers: &LayerStore,
        atlas: &TileAtlas<'_, C::Image>,
    ) {
        let (w, h) = (self.surface_w, self.surface_h);
        let surface = self.map_surface.get_or_insert_with(|| context.offscreen(w, h));

        surface.begin_batch();
        surface.clear();
        let mut drawn = 0;
        for layer in layers.iter().filter(|l| l.is_drawable()) {
            draw_layer(layer, surface, atlas);
            drawn += 1;
        }
        surface.end_batch();

        debug!(layers = drawn, "pre-rendered map surface");
    }

    /// Surface of a single layer, drawn on first request and redrawn when
    /// the layer is dirty. Consumes the layer's dirty flag.
    pub fn refresh_layer(
        &mut self,
        context: &mut C,
        layer: &mut Layer,
        atlas: &TileAtlas<'_, C::Image>,
    ) -> &C {
        let (w, h) = (self.surface_w, self.surface_h);
        let mut created = false;
        let surface = self
            .layer_surfaces
            .entry(layer.name.clone())
            .or_insert_with(|| {
                created = true;
                context.offscreen(w, h)
            });

        if created || layer.dirty {
            surface.begin_batch();
            if !created {
                surface.clear();
            }
            draw_layer(layer, surface, atlas);
            surface.end_batch();
            debug!(layer = %layer.name, created, "refreshed layer surface");
        }
        layer.dirty = false;

        surface
    }
}
