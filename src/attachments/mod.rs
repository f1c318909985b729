pub mod error;
pub mod merger;
pub mod model;
