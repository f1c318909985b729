pub mod interface;
pub mod model;
pub mod remote;
pub mod summary;
