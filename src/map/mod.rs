mod geometry;
mod layer;
mod projection;
mod renderer;
mod spatial;

pub use layer::{Layer, LayerFeature, Shape};
pub use projection::Viewport;
pub use renderer::{LayerId, MapFrame, MapSurface, RenderedLayer};
