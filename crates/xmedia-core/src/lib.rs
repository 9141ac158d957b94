pub mod config;
pub mod logging;

pub mod bridge;
pub mod correlate;
pub mod error;
pub mod intercept;
pub mod model;
pub mod scanner;
