//! `ticketdesk`: tickets, tags, and the query engine that ties them together.
//!
//! The crate is organized the way the `td` binary uses it:
//! - [`storage`] owns the `SQLite` store (entity store, query engine, lifecycle)
//! - [`model`] defines `Ticket`, `Tag`, and the status enum
//! - [`validation`] rejects malformed input before any store mutation
//! - [`config`] resolves the workspace and layered configuration
//! - [`cli`] and [`format`] implement the command-line front end

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, ErrorKind, Result, StructuredError, TicketError};
