//! Wire types and configuration shared between the console library and the
//! `parkctl` binary.
//!
//! Nothing in this crate performs network or storage I/O except
//! [`config::load_config`], which reads the configuration file.

pub mod config;
pub mod types;
