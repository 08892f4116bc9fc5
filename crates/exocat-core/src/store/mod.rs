pub mod catalog;
pub mod sample;
