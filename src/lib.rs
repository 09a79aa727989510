#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod utils;
pub use utils::GROWTH_FACTOR;

mod error;
pub use error::{Error, Result};

mod statistic;
pub use statistic::{
    Moments, StatisticKind, population_stddev, population_variance, sample_stddev,
    sample_variance,
};

mod window_state;
pub use window_state::WindowState;

mod aggregate;
pub use aggregate::{AggregateState, DEFAULT_INITIAL_CAPACITY, WindowAggregate};

mod aliases;
pub use aliases::AliasTable;
