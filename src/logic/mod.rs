pub mod charts;
pub mod expiry;
pub mod filter;
pub mod progress;
