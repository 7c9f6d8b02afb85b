pub mod archive;
pub mod autotier;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod git;
pub mod io;
pub mod paths;
pub mod significance;
pub mod staleness;
pub mod stats;
pub mod tag;
pub mod tier;
pub mod tokens;
pub mod validate;

pub use error::{Result, TmsError};
pub use tier::Tier;
