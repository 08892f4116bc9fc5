pub mod filter;
pub mod guards;
pub mod similarity;
pub mod stats;
