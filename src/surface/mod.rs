pub mod tiled;

pub use tiled::{RedrawOutcome, TiledSurface};
