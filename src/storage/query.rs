//! Ticket query engine: filtered, searched, sorted, paginated listing.
//!
//! A listing is three statements run against one read snapshot:
//! 1. `COUNT(*)` over the filtered tickets (no joins, no tag rows)
//! 2. the ordered page itself
//! 3. one batched tag lookup for the ticket ids on the page
//!
//! Both the count and the page share the same `WHERE` clause, so `total`
//! always describes the rows the page was cut from.

use crate::error::Result;
use crate::model::{SortField, SortOrder, Status, TicketPage};
use crate::storage::sqlite::{SqliteStorage, TICKET_COLUMNS, tags_for_tickets, ticket_from_row};
use crate::validation::parse_tag_ids;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use tracing::debug;

/// Filter, sort, and pagination options for [`SqliteStorage::list_tickets`].
///
/// Every field is optional; filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub status: Option<Status>,
    /// Match tickets carrying at least one of these tags.
    pub tag_ids: Vec<i64>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    /// Page size; `None` or a non-positive value returns every row.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Unparsed list parameters, as they arrive from a command line or query string.
#[derive(Debug, Clone, Default)]
pub struct RawTicketQuery {
    pub status: Option<String>,
    pub tag_ids: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RawTicketQuery {
    /// Resolve into a [`TicketQuery`].
    ///
    /// Unknown status and order values are dropped rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `tag_ids` contains a non-integer token.
    pub fn resolve(&self) -> Result<TicketQuery> {
        let tag_ids = match self.tag_ids.as_deref() {
            Some(raw) => parse_tag_ids(raw)?,
            None => Vec::new(),
        };
        Ok(TicketQuery {
            status: self.status.as_deref().and_then(Status::parse_lenient),
            tag_ids,
            search: self.search.clone(),
            sort_by: self.sort_by.as_deref().and_then(SortField::parse_lenient),
            order: self.order.as_deref().and_then(SortOrder::parse_lenient),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

impl TicketQuery {
    /// Column the listing is ordered by.
    #[must_use]
    pub fn sort_field(&self) -> SortField {
        self.sort_by.unwrap_or_default()
    }

    /// Direction the listing is ordered in.
    ///
    /// An explicit order always wins. Otherwise an explicit sort field
    /// defaults to ascending, and no sort field at all gives newest first.
    #[must_use]
    pub const fn effective_order(&self) -> SortOrder {
        match (self.sort_by, self.order) {
            (_, Some(order)) => order,
            (Some(_), None) => SortOrder::Asc,
            (None, None) => SortOrder::Desc,
        }
    }

    #[must_use]
    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|l| *l > 0)
    }

    #[must_use]
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    fn unique_tag_ids(&self) -> BTreeSet<i64> {
        self.tag_ids.iter().copied().collect()
    }

    /// Build the shared `WHERE` clause and its parameters.
    pub(crate) fn where_clause(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = self.status {
            sql.push_str(" AND t.status = ?");
            params.push(Box::new(status.as_str()));
        }

        let tag_ids = self.unique_tag_ids();
        if !tag_ids.is_empty() {
            let placeholders: Vec<&str> = tag_ids.iter().map(|_| "?").collect();
            let _ = write!(
                sql,
                " AND EXISTS (SELECT 1 FROM ticket_tags tt WHERE tt.ticket_id = t.id AND tt.tag_id IN ({}))",
                placeholders.join(",")
            );
            for id in tag_ids {
                params.push(Box::new(id));
            }
        }

        if let Some(term) = self.search_term() {
            sql.push_str(" AND (td_contains(t.title, ?) OR td_contains(t.description, ?))");
            params.push(Box::new(term.to_string()));
            params.push(Box::new(term.to_string()));
        }

        (sql, params)
    }

    /// Build the `ORDER BY` clause.
    ///
    /// Tickets without a value sort last ascending and first descending;
    /// ties break on id in the same direction.
    pub(crate) fn order_clause(&self) -> String {
        let column = self.sort_field().column();
        let order = self.effective_order();
        let nulls = match order {
            SortOrder::Asc => "NULLS LAST",
            SortOrder::Desc => "NULLS FIRST",
        };
        format!(
            " ORDER BY t.{column} {dir} {nulls}, t.id {dir}",
            dir = order.as_sql()
        )
    }

    /// Build the `LIMIT`/`OFFSET` clause and its parameters.
    pub(crate) fn page_clause(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let offset = self.effective_offset();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let sql = match self.effective_limit() {
            Some(limit) => {
                params.push(Box::new(limit));
                params.push(Box::new(offset));
                " LIMIT ? OFFSET ?"
            }
            None if offset > 0 => {
                params.push(Box::new(offset));
                " LIMIT -1 OFFSET ?"
            }
            None => "",
        };
        (sql.to_string(), params)
    }
}

fn count_matching(conn: &Connection, query: &TicketQuery) -> Result<i64> {
    let (where_sql, params) = query.where_clause();
    let sql = format!("SELECT COUNT(*) FROM tickets t{where_sql}");
    let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
    let total = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
    Ok(total)
}

fn list_matching(conn: &Connection, query: &TicketQuery) -> Result<TicketPage> {
    let total = count_matching(conn, query)?;

    let (where_sql, mut params) = query.where_clause();
    let (page_sql, page_params) = query.page_clause();
    params.extend(page_params);
    let sql = format!(
        "SELECT {TICKET_COLUMNS} FROM tickets t{where_sql}{}{page_sql}",
        query.order_clause()
    );
    debug!(sql = %sql, total, "listing tickets");

    let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
    let mut stmt = conn.prepare(&sql)?;
    let mut tickets = stmt
        .query_map(params_refs.as_slice(), ticket_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
    let mut tags = tags_for_tickets(conn, &ids)?;
    for ticket in &mut tickets {
        if let Some(ticket_tags) = tags.remove(&ticket.id) {
            ticket.tags = ticket_tags;
        }
    }

    Ok(TicketPage {
        tickets,
        total,
        limit: query.effective_limit(),
        offset: query.effective_offset(),
    })
}

impl SqliteStorage {
    /// List tickets matching `query`, with the total count before pagination.
    ///
    /// Each ticket on the page carries its full tag set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(&self, query: &TicketQuery) -> Result<TicketPage> {
        self.read(|conn| list_matching(conn, query))
    }

    /// Count tickets matching `query`'s filters; sort and pagination are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_tickets(&self, query: &TicketQuery) -> Result<i64> {
        self.read(|conn| count_matching(conn, query))
    }
}
