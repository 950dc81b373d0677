//! reqwest-backed request execution.
mod executor;


pub use executor::{HttpExecutor, HttpExecutorFactory};
