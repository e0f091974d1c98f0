pub mod bitmap;
pub mod photo;

pub use bitmap::*;
pub use photo::*;
