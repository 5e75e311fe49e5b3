#![forbid(unsafe_code)]

pub mod accumulator;
pub mod ledger;
pub mod model;
pub mod roster;
pub mod time;

pub use time::Clock;
