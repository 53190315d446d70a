pub mod footy_api;
pub mod pipeline;
pub mod validator;

pub use footy_api::*;
pub use pipeline::*;
pub use validator::*;
