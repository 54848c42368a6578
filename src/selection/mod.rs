//! Selection primitives for click-driven particle picking.
//!
//! - **Binary masks**: claimed / free grids shared by every selection role
//! - **Flood fill**: region growing from a click inside a binarized image

pub mod flood_fill;
pub mod mask;

pub use flood_fill::{flood_fill, Connectivity, FloodFillResult};
pub use mask::BinaryMask;
