#![doc = "tsw-bundle: batch creation of encrypted 7-Zip archives from model description files."]

//! For every description file (`*.tsp` by default) in a workspace directory,
//! the pipeline reads its `Model=` label, stages it with the workspace's
//! auxiliary files, runs 7-Zip to produce `<label>.TSW` and removes the
//! staging directory again.
//!
//! # Usage
//! The `tsw-bundle` binary wraps [`cli::run`]. Library users build a
//! [`config::BundleConfig`] and call [`bundle::bundle_workspace`] with any
//! [`archive::Archiver`].

pub mod archive;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod label;
pub mod load_config;
pub mod scan;
pub mod staging;

pub use cli::{run, Cli, Commands};
pub use error::{BundleError, Result};
