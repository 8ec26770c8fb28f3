pub mod api;
pub mod choice;
