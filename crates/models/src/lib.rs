pub mod error;
pub mod features;
pub mod fixtures;
pub mod predictions;

pub use error::*;
pub use features::*;
pub use fixtures::*;
pub use predictions::*;
