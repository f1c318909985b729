pub mod csv;
pub mod html;
