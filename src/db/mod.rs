pub mod error;
pub mod interface;
pub mod model;
pub mod sqlite;
