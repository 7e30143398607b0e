//! `SQLite` storage implementation: the entity store for tickets and tags.

use crate::error::{Result, TicketError};
use crate::model::{Status, Tag, TagWithCount, Ticket};
use crate::storage::schema::apply_schema;
use crate::util::color::ColorStrategy;
use crate::util::time::{format_timestamp, now, parse_timestamp};
use crate::validation::{TagValidator, TicketValidator};
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// `SQLite` caps bound parameters per statement; chunk large id lists.
pub(crate) const SQLITE_VAR_LIMIT: usize = 900;

/// Default page size for [`SqliteStorage::list_tags`].
pub const DEFAULT_TAG_LIMIT: i64 = 100;
/// Largest page size accepted by [`SqliteStorage::list_tags`].
pub const MAX_TAG_LIMIT: i64 = 1000;

pub(crate) const TICKET_COLUMNS: &str =
    "t.id, t.title, t.description, t.status, t.created_at, t.updated_at, t.completed_at";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation.
///
/// Carries the single timestamp used for every write in the transaction and
/// the tickets whose `updated_at` has already been refreshed.
pub struct MutationContext {
    pub op_name: String,
    pub now: DateTime<Utc>,
    pub touched: BTreeSet<i64>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            now: now(),
            touched: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.now)
    }

    /// Refresh a ticket's `updated_at`, at most once per transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn touch(&mut self, tx: &Transaction<'_>, ticket_id: i64) -> Result<()> {
        if self.touched.insert(ticket_id) {
            tx.execute(
                "UPDATE tickets SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![self.timestamp(), ticket_id],
            )?;
        }
        Ok(())
    }
}

/// Input for [`SqliteStorage::create_ticket`].
#[derive(Debug, Clone, Default)]
pub struct TicketCreate {
    pub title: String,
    pub description: Option<String>,
    /// Tags to attach; ids that don't resolve are skipped.
    pub tag_ids: Vec<i64>,
}

/// Fields to update on a ticket.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Fields to update on a tag.
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TagUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

/// Register the SQL functions the query engine relies on.
///
/// `td_contains(haystack, needle)` is a Unicode case-insensitive substring
/// test. SQLite's own `LIKE` only folds ASCII letters. A NULL haystack never
/// matches.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "td_contains",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<String>(1)?;
            Ok(haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase())))
        },
    )?;
    Ok(())
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        register_functions(&conn)?;
        apply_schema(&conn)?;
        debug!(path = %path.display(), "opened ticket store");
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        register_functions(&conn)?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run a mutation inside an `IMMEDIATE` transaction.
    ///
    /// The transaction is rolled back if `f` fails, so a rejected
    /// operation leaves no partial writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot start, `f` fails, or the commit fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        tx.commit()?;
        debug!(op = %ctx.op_name, touched = ?ctx.touched, "mutation committed");

        Ok(result)
    }

    /// Run several reads against one snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or `f` fails.
    pub fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Create a tag, picking a random color when none is given.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad name or color, and
    /// `TagNameConflict` if the name is taken.
    pub fn create_tag(&mut self, name: &str, color: Option<&str>) -> Result<Tag> {
        self.create_tag_with(name, color, ColorStrategy::Random)
    }

    /// Create a tag, using `strategy` to pick a color when none is given.
    ///
    /// With [`ColorStrategy::Palette`] the palette index is the number of
    /// tags that already exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad name or color, and
    /// `TagNameConflict` if the name is taken.
    pub fn create_tag_with(
        &mut self,
        name: &str,
        color: Option<&str>,
        strategy: ColorStrategy,
    ) -> Result<Tag> {
        TagValidator::validate(Some(name), color).map_err(TicketError::from_validation_errors)?;

        self.mutate("create_tag", |tx, ctx| {
            if tag_id_by_name(tx, name)?.is_some() {
                return Err(TicketError::TagNameConflict {
                    name: name.to_string(),
                });
            }

            let color = match color {
                Some(c) => c.to_string(),
                None => {
                    let existing: i64 =
                        tx.query_row("SELECT count(*) FROM tags", [], |row| row.get(0))?;
                    strategy.pick(existing)
                }
            };

            tx.execute(
                "INSERT INTO tags (name, color, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, color, ctx.timestamp()],
            )
            .map_err(|e| conflict_or(e, name))?;
            let id = tx.last_insert_rowid();
            debug!(tag_id = id, name, color = %color, "created tag");

            fetch_tag(tx, id)?.ok_or(TicketError::TagNotFound { id })
        })
    }

    /// Update a tag's name and/or color.
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` if the tag is absent, `TagNameConflict` if the
    /// new name belongs to a different tag, or a validation error.
    pub fn update_tag(&mut self, id: i64, updates: &TagUpdate) -> Result<Tag> {
        TagValidator::validate(updates.name.as_deref(), updates.color.as_deref())
            .map_err(TicketError::from_validation_errors)?;

        self.mutate("update_tag", |tx, _ctx| {
            let current = fetch_tag(tx, id)?.ok_or(TicketError::TagNotFound { id })?;
            if updates.is_empty() {
                return Ok(current);
            }

            if let Some(ref name) = updates.name {
                if let Some(other) = tag_id_by_name(tx, name)? {
                    if other != id {
                        return Err(TicketError::TagNameConflict { name: name.clone() });
                    }
                }
            }

            let name = updates.name.as_deref().unwrap_or(&current.name);
            let color = updates.color.as_deref().unwrap_or(&current.color);
            tx.execute(
                "UPDATE tags SET name = ?1, color = ?2 WHERE id = ?3",
                rusqlite::params![name, color, id],
            )
            .map_err(|e| conflict_or(e, name))?;
            debug!(tag_id = id, name, color, "updated tag");

            fetch_tag(tx, id)?.ok_or(TicketError::TagNotFound { id })
        })
    }

    /// Delete a tag; its associations go with it.
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` if the tag is absent.
    pub fn delete_tag(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_tag", |tx, _ctx| {
            let links: i64 = tx.query_row(
                "SELECT count(*) FROM ticket_tags WHERE tag_id = ?1",
                [id],
                |row| row.get(0),
            )?;
            let rows = tx.execute("DELETE FROM tags WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(TicketError::TagNotFound { id });
            }
            debug!(tag_id = id, associations = links, "deleted tag");
            Ok(())
        })
    }

    /// Get a tag with its ticket count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_tag(&self, id: i64) -> Result<Option<TagWithCount>> {
        let row = self
            .conn
            .query_row(
                "SELECT g.id, g.name, g.color, g.created_at,
                        (SELECT count(*) FROM ticket_tags tt WHERE tt.tag_id = g.id)
                 FROM tags g WHERE g.id = ?1",
                [id],
                tag_with_count_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List tags ordered by id, each with its ticket count.
    ///
    /// `limit` is clamped to `1..=1000`; a negative `skip` counts as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tags(&self, skip: i64, limit: i64) -> Result<Vec<TagWithCount>> {
        let limit = limit.clamp(1, MAX_TAG_LIMIT);
        let skip = skip.max(0);

        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.name, g.color, g.created_at, COALESCE(c.cnt, 0)
             FROM tags g
             LEFT JOIN (
                 SELECT tag_id, count(*) AS cnt FROM ticket_tags GROUP BY tag_id
             ) c ON c.tag_id = g.id
             ORDER BY g.id
             LIMIT ?1 OFFSET ?2",
        )?;
        let tags = stmt
            .query_map([limit, skip], tag_with_count_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Count all tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_tags(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT count(*) FROM tags", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Create a ticket in the `pending` state.
    ///
    /// Tag ids that don't resolve to existing tags are skipped.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad title or description.
    pub fn create_ticket(&mut self, input: &TicketCreate) -> Result<Ticket> {
        TicketValidator::validate(Some(&input.title), input.description.as_deref())
            .map_err(TicketError::from_validation_errors)?;

        self.mutate("create_ticket", |tx, ctx| {
            let ts = ctx.timestamp();
            tx.execute(
                "INSERT INTO tickets (title, description, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![
                    input.title,
                    input.description,
                    Status::Pending.as_str(),
                    ts
                ],
            )?;
            let id = tx.last_insert_rowid();
            let attached = attach_tags(tx, id, &input.tag_ids, &ts)?;
            debug!(ticket_id = id, attached, "created ticket");

            fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })
        })
    }

    /// Update a ticket's title and/or description.
    ///
    /// Status and tags are never touched here.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent, or a validation error.
    pub fn update_ticket(&mut self, id: i64, updates: &TicketUpdate) -> Result<Ticket> {
        let description = updates.description.as_ref().and_then(Option::as_deref);
        TicketValidator::validate(updates.title.as_deref(), description)
            .map_err(TicketError::from_validation_errors)?;

        self.mutate("update_ticket", |tx, ctx| {
            let current = fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })?;
            if updates.is_empty() {
                return Ok(current);
            }

            let mut set_clauses: Vec<&str> = vec!["updated_at = ?"];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(ctx.timestamp())];

            if let Some(ref title) = updates.title {
                set_clauses.push("title = ?");
                params.push(Box::new(title.clone()));
            }
            if let Some(ref description) = updates.description {
                set_clauses.push("description = ?");
                params.push(Box::new(description.clone()));
            }
            params.push(Box::new(id));

            let sql = format!("UPDATE tickets SET {} WHERE id = ?", set_clauses.join(", "));
            let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
            tx.execute(&sql, params_refs.as_slice())?;
            ctx.touched.insert(id);
            debug!(ticket_id = id, fields = set_clauses.len() - 1, "updated ticket");

            fetch_ticket(tx, id)?.ok_or(TicketError::TicketNotFound { id })
        })
    }

    /// Delete a ticket; its associations go with it, its tags stay.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket is absent.
    pub fn delete_ticket(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_ticket", |tx, _ctx| {
            let rows = tx.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(TicketError::TicketNotFound { id });
            }
            debug!(ticket_id = id, "deleted ticket");
            Ok(())
        })
    }

    /// Get a ticket with its tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        self.read(|conn| fetch_ticket(conn, id))
    }

    /// Count all tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_all_tickets(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT count(*) FROM tickets", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
impl SqliteStorage {
    /// Execute raw SQL (for tests only).
    pub fn execute_test_sql(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

// ============================================================================
// Row helpers (shared with the query engine and lifecycle controller)
// ============================================================================

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| conversion_error(idx, format!("invalid timestamp: {raw}")))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        parse_timestamp(&raw)
            .ok_or_else(|| conversion_error(idx, format!("invalid timestamp: {raw}")))
    })
    .transpose()
}

/// Map a row selected with [`TICKET_COLUMNS`]. Tags are left empty.
pub(crate) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(3)?;
    let status = status
        .parse::<Status>()
        .map_err(|_| conversion_error(3, format!("invalid status: {status}")))?;
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        created_at: timestamp_at(row, 4)?,
        updated_at: timestamp_at(row, 5)?,
        completed_at: optional_timestamp_at(row, 6)?,
        tags: Vec::new(),
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
    })
}

fn tag_with_count_from_row(row: &Row<'_>) -> rusqlite::Result<TagWithCount> {
    Ok(TagWithCount {
        tag: tag_from_row(row)?,
        ticket_count: row.get(4)?,
    })
}

/// Turn a `UNIQUE` violation on `tags.name` into a conflict.
fn conflict_or(err: rusqlite::Error, name: &str) -> TicketError {
    if TicketError::is_unique_violation(&err) {
        TicketError::TagNameConflict {
            name: name.to_string(),
        }
    } else {
        TicketError::from_store(err)
    }
}

fn tag_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

pub(crate) fn fetch_tag(conn: &Connection, id: i64) -> Result<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, name, color, created_at FROM tags WHERE id = ?1",
            [id],
            tag_from_row,
        )
        .optional()?;
    Ok(tag)
}

pub(crate) fn ticket_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM tickets WHERE id = ?1")?
        .exists([id])?;
    Ok(exists)
}

/// Load a ticket and its tags.
pub(crate) fn fetch_ticket(conn: &Connection, id: i64) -> Result<Option<Ticket>> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets t WHERE t.id = ?1");
    let Some(mut ticket) = conn.query_row(&sql, [id], ticket_from_row).optional()? else {
        return Ok(None);
    };
    if let Some(tags) = tags_for_tickets(conn, &[id])?.remove(&id) {
        ticket.tags = tags;
    }
    Ok(Some(ticket))
}

/// Batch-load the tags for a set of tickets, ordered by tag id.
pub(crate) fn tags_for_tickets(
    conn: &Connection,
    ticket_ids: &[i64],
) -> Result<HashMap<i64, Vec<Tag>>> {
    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();

    for chunk in ticket_ids.chunks(SQLITE_VAR_LIMIT) {
        let placeholders: Vec<&str> = chunk.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT tt.ticket_id, g.id, g.name, g.color, g.created_at
             FROM ticket_tags tt
             JOIN tags g ON g.id = tt.tag_id
             WHERE tt.ticket_id IN ({})
             ORDER BY tt.ticket_id, g.id",
            placeholders.join(",")
        );
        let params: Vec<&dyn rusqlite::ToSql> =
            chunk.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                Tag {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    color: row.get(3)?,
                    created_at: timestamp_at(row, 4)?,
                },
            ))
        })?;

        for row in rows {
            let (ticket_id, tag) = row?;
            map.entry(ticket_id).or_default().push(tag);
        }
    }

    Ok(map)
}

/// Attach the existing tags among `tag_ids` to a ticket.
///
/// Unknown ids are skipped and duplicates ignored. Returns how many
/// association rows were actually inserted.
pub(crate) fn attach_tags(
    tx: &Transaction<'_>,
    ticket_id: i64,
    tag_ids: &[i64],
    timestamp: &str,
) -> Result<usize> {
    let unique: BTreeSet<i64> = tag_ids.iter().copied().collect();
    let mut inserted = 0;
    for tag_id in unique {
        let rows = tx.execute(
            "INSERT OR IGNORE INTO ticket_tags (ticket_id, tag_id, created_at)
             SELECT ?1, id, ?3 FROM tags WHERE id = ?2",
            rusqlite::params![ticket_id, tag_id, timestamp],
        )?;
        if rows == 0 && fetch_tag(tx, tag_id)?.is_none() {
            warn!(ticket_id, tag_id, "skipping unknown tag id");
        }
        inserted += rows;
    }
    Ok(inserted)
}
