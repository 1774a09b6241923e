pub mod arrows;
pub mod registry;
pub mod shapes;
pub mod traits;

pub use registry::default_registry;
