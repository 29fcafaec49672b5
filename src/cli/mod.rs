//! CLI command handlers
//!
//! This module contains all the command handlers for the hermes CLI.
//! Each subcommand is implemented in its own module for better organization.

pub mod ack;
pub mod approve;
pub mod draft;
pub mod helpers;
pub mod send;
pub mod show;
pub mod status;
