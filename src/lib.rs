pub mod batch;
pub mod browser;
pub mod calculator;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod sheet;

pub use error::{BarrettError, Result};
