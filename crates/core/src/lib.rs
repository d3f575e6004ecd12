#![forbid(unsafe_code)]

pub mod classifier;
pub mod model;
pub mod playlist;
pub mod quiz;
pub mod time;

pub use time::Clock;
