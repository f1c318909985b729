pub mod attachments;
pub mod children_api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod pdf;
pub mod render;
pub mod search;
pub mod utils;
