#![forbid(unsafe_code)]

pub mod calculator;
pub mod model;
pub mod path;
pub mod time;

pub use time::Clock;
