pub mod bezier;
pub mod cache;
pub mod catmull_rom;
pub mod config;
pub mod error;
pub mod geometry;
pub mod location;
pub mod polynomial;
pub mod spline;
pub mod transform;
pub mod utils;

pub mod prelude {
    pub use crate::{
        Scalar, bezier::*, cache::*, catmull_rom::*, config::*, error::*, geometry::*,
        location::*, polynomial::*, spline::*, utils::*,
    };
}

/// Scalar number type.
///
/// by default it is 32-bit float but you can change it to 64-bit float with `scalar64` feature.
#[cfg(not(feature = "scalar64"))]
pub type Scalar = f32;
#[cfg(feature = "scalar64")]
pub type Scalar = f64;
