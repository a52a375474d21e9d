mod config;
mod error;
pub mod model;
pub mod pod;

#[cfg(test)]
mod testing;

pub use config::{Config, NODE_NAME_ENV, PodConfig};
pub use error::{Error, Result};
pub use pod::{PodDiscoverer, PodGroup, PodTarget};

#[macro_use]
extern crate tracing;
