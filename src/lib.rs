pub mod cli;
pub mod config;
pub mod error;
pub mod hook;
pub mod k8s;
pub mod labels;
pub mod probe;
pub mod resolve;
pub mod seccomp;
pub mod snitch;

pub use error::{Result, SnitchError};
pub use snitch::{RunReport, Snitch};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
