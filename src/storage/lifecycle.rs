//! Ticket lifecycle: the completion state machine and tag associations.
//!
//! Status and `completed_at` always change in the same `UPDATE`, inside an
//! `IMMEDIATE` transaction, so no reader sees one without the other.

use crate::error::{Result, TicketError};
use crate::model::{Status, Ticket};
use crate::storage::sqlite::{SqliteStorage, attach_tags, fetch_ticket, ticket_exists};
use tracing::debug;

impl SqliteStorage {
    /// Mark a ticket completed, stamping `completed_at` with the current time.
    ///
    /// Completing an already-completed ticket re-stamps the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent.
    pub fn complete_ticket(&mut self, id: i64) -> Result<Ticket> {
        self.mutate("complete_ticket", |tx, ctx| {
            let ts = ctx.timestamp();
            let rows = tx.execute(
                "UPDATE tickets SET status = ?1, completed_at = ?2, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![Status::Completed.as_str(), ts, id],
            )?;
            if rows == 0 {
                return Err(TicketError::TicketNotFound { id });
            }
            ctx.touched.insert(id);
            debug!(ticket_id = id, completed_at = %ts, "completed ticket");

            fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })
        })
    }

    /// Return a ticket to `pending` and clear `completed_at`.
    ///
    /// A ticket that is already pending is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent.
    pub fn uncomplete_ticket(&mut self, id: i64) -> Result<Ticket> {
        self.mutate("uncomplete_ticket", |tx, ctx| {
            let current = fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })?;
            if !current.is_completed() {
                debug!(ticket_id = id, "ticket already pending");
                return Ok(current);
            }

            tx.execute(
                "UPDATE tickets SET status = ?1, completed_at = NULL, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![Status::Pending.as_str(), ctx.timestamp(), id],
            )?;
            ctx.touched.insert(id);
            debug!(ticket_id = id, "reopened ticket");

            fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })
        })
    }

    /// Attach tags to a ticket.
    ///
    /// Tags already attached and ids that don't resolve are skipped. The
    /// ticket's `updated_at` moves only when a new association is made.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent.
    pub fn add_tags_to_ticket(&mut self, ticket_id: i64, tag_ids: &[i64]) -> Result<Ticket> {
        self.mutate("add_tags_to_ticket", |tx, ctx| {
            if !ticket_exists(tx, ticket_id)? {
                return Err(TicketError::TicketNotFound { id: ticket_id });
            }

            let inserted = attach_tags(tx, ticket_id, tag_ids, &ctx.timestamp())?;
            if inserted > 0 {
                ctx.touch(tx, ticket_id)?;
            }
            debug!(ticket_id, requested = tag_ids.len(), inserted, "attached tags");

            fetch_ticket(tx, ticket_id)?.ok_or(TicketError::TicketNotFound { id: ticket_id })
        })
    }

    /// Detach one tag from a ticket. Detaching a tag that isn't attached is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent.
    pub fn remove_tag_from_ticket(&mut self, ticket_id: i64, tag_id: i64) -> Result<Ticket> {
        self.mutate("remove_tag_from_ticket", |tx, ctx| {
            if !ticket_exists(tx, ticket_id)? {
                return Err(TicketError::TicketNotFound { id: ticket_id });
            }

            let rows = tx.execute(
                "DELETE FROM ticket_tags WHERE ticket_id = ?1 AND tag_id = ?2",
                [ticket_id, tag_id],
            )?;
            if rows > 0 {
                ctx.touch(tx, ticket_id)?;
            }
            debug!(ticket_id, tag_id, removed = rows, "detached tag");

            fetch_ticket(tx, ticket_id)?.ok_or(TicketError::TicketNotFound { id: ticket_id })
        })
    }
}
