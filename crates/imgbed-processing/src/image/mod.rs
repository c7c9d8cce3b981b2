pub mod processor;
pub mod resize;

pub use processor::RasterCodec;
pub use resize::{fit_within, select_filter};
