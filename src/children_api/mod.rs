pub mod controller;
pub mod handlers;
