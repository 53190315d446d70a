pub mod connection;
pub mod migrations;
pub mod repository;
pub mod schema;

pub use connection::*;
pub use repository::*;
pub use schema::*;
