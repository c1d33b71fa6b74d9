use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::Canvas;
use crate::spatial::Positioned;

/// Identity of a [`TileEngine`](crate::TileEngine), stored by attached
/// objects as their parent. It never keeps the engine alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        EngineId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An entity drawn on top of the map, scrolled with the camera.
pub trait GameObject<C: Canvas>: Positioned {
    /// Draw in map coordinates. Objects with nothing to draw keep the default.
    fn render(&mut self, _canvas: &mut C) {}

    /// Called with `Some` when attached to an engine, `None` when removed.
    fn set_parent(&mut self, parent: Option<EngineId>);

    /// Engine the object is attached to.
    fn parent(&self) -> Option<EngineId>;
}

/// Attached objects are shared with the game, not copied.
pub type SharedObject<C> = Rc<RefCell<dyn GameObject<C>>>;
