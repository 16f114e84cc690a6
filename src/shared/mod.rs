pub mod geo;
pub mod settings;

pub use geo::*;
pub use settings::*;
