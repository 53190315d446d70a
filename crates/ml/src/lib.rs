pub mod features;
pub mod models;

pub use features::*;
pub use models::*;
