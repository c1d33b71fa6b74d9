pub mod quad;

pub use quad::{preload_assets, MacroquadCanvas};
