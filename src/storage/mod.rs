//! Persistent storage for tickets and tags.
//!
//! - [`sqlite`]: the entity store (connection, transactions, CRUD)
//! - [`query`]: the ticket query engine
//! - [`lifecycle`]: completion transitions and tag associations
//! - [`schema`]: DDL and connection pragmas

pub mod lifecycle;
pub mod query;
pub mod schema;
pub mod sqlite;

pub use query::{RawTicketQuery, TicketQuery};
pub use sqlite::{
    DEFAULT_TAG_LIMIT, MAX_TAG_LIMIT, MutationContext, SqliteStorage, TagUpdate, TicketCreate,
    TicketUpdate,
};
