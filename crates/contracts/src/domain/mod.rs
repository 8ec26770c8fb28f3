pub mod a001_vehicle;
pub mod a002_sale;
pub mod common;
