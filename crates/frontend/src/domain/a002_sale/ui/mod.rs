pub mod details;
pub mod lines;
