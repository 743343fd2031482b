pub mod export;
pub mod types;
pub mod units;
pub mod week;
