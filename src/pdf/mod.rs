pub mod interface;
pub mod photo_sheet;
