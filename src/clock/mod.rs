pub mod interface;
pub mod system;
