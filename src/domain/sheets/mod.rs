pub mod a1_notation;
pub mod column;
pub mod spreadsheet_id;
