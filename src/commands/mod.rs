//! Command modules for neetcode-sync
//!
//! Each submodule handles a specific CLI subcommand.

pub mod configure;
pub mod connect;
pub mod extract;
pub mod push;
pub mod stats;
pub mod watch;
