mod grid;

pub use grid::{col_from_x, row_from_y, Positioned, TilePosition, WorldRect};
