//! Query engine tests: filters, counts, ordering, and pagination.

mod common;

use common::{fixtures, set_ticket_column, test_db, test_db_with_dir, test_log};
use ticketdesk::model::{SortField, SortOrder, Status};
use ticketdesk::storage::{RawTicketQuery, SqliteStorage, TicketQuery};

fn list_ids(storage: &SqliteStorage, query: &TicketQuery) -> Vec<i64> {
    fixtures::ids(&storage.list_tickets(query).unwrap().tickets)
}

#[test]
fn empty_store_lists_nothing() {
    let storage = test_db();
    let page = storage.list_tickets(&TicketQuery::default()).unwrap();
    assert!(page.tickets.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, None);
}

#[test]
fn status_filter_and_total() {
    let _log = test_log("status_filter_and_total");
    let mut storage = test_db();
    let tickets = fixtures::create_tickets(&mut storage, 5, "status");
    storage.complete_ticket(tickets[0].id).unwrap();
    storage.complete_ticket(tickets[1].id).unwrap();

    let pending = storage
        .list_tickets(&TicketQuery {
            status: Some(Status::Pending),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(pending.total, 3);
    assert!(pending.tickets.iter().all(|t| t.status == Status::Pending));

    let completed = storage
        .list_tickets(&TicketQuery {
            status: Some(Status::Completed),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(completed.total, 2);
    assert!(completed.tickets.iter().all(|t| t.completed_at.is_some()));
}

#[test]
fn total_ignores_pagination() {
    let _log = test_log("total_ignores_pagination");
    let mut storage = test_db();
    fixtures::create_tickets(&mut storage, 10, "page");

    let page = storage
        .list_tickets(&TicketQuery {
            limit: Some(5),
            offset: Some(5),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(page.tickets.len(), 5);
    assert_eq!(page.total, 10);
    assert_eq!(page.limit, Some(5));
    assert_eq!(page.offset, 5);

    let past_end = storage
        .list_tickets(&TicketQuery {
            limit: Some(5),
            offset: Some(50),
            ..TicketQuery::default()
        })
        .unwrap();
    assert!(past_end.tickets.is_empty());
    assert_eq!(past_end.total, 10);
}

#[test]
fn pages_partition_the_result() {
    let mut storage = test_db();
    let created = fixtures::create_tickets(&mut storage, 7, "part");

    let mut seen = Vec::new();
    for offset in (0..7).step_by(3) {
        let query = TicketQuery {
            sort_by: Some(SortField::CreatedAt),
            order: Some(SortOrder::Asc),
            limit: Some(3),
            offset: Some(offset),
            ..TicketQuery::default()
        };
        seen.extend(list_ids(&storage, &query));
    }
    assert_eq!(seen, fixtures::ids(&created));
}

#[test]
fn offset_without_limit_and_non_positive_limit() {
    let mut storage = test_db();
    fixtures::create_tickets(&mut storage, 4, "nolimit");

    let offset_only = storage
        .list_tickets(&TicketQuery {
            offset: Some(1),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(offset_only.tickets.len(), 3);

    for limit in [0, -3] {
        let page = storage
            .list_tickets(&TicketQuery {
                limit: Some(limit),
                ..TicketQuery::default()
            })
            .unwrap();
        assert_eq!(page.tickets.len(), 4);
        assert_eq!(page.limit, None);
    }

    let negative_offset = storage
        .list_tickets(&TicketQuery {
            offset: Some(-2),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(negative_offset.offset, 0);
    assert_eq!(negative_offset.tickets.len(), 4);
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let _log = test_log("search_matches_title_or_description_case_insensitively");
    let mut storage = test_db();
    let a = storage
        .create_ticket(&fixtures::ticket("Critical outage"))
        .unwrap();
    let b = storage
        .create_ticket(&fixtures::ticket_with_description(
            "Login",
            "this is CRITICAL for launch",
        ))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("Cosmetic")).unwrap();

    let query = TicketQuery {
        search: Some("critical".into()),
        sort_by: Some(SortField::CreatedAt),
        ..TicketQuery::default()
    };
    let page = storage.list_tickets(&query).unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(fixtures::ids(&page.tickets), vec![a.id, b.id]);
}

#[test]
fn search_folds_case_beyond_ascii() {
    let _log = test_log("search_folds_case_beyond_ascii");
    let mut storage = test_db();
    let cafe = storage.create_ticket(&fixtures::ticket("Café menu")).unwrap();
    let uber = storage
        .create_ticket(&fixtures::ticket("ÜBER release"))
        .unwrap();
    let greek = storage
        .create_ticket(&fixtures::ticket_with_description(
            "Translations",
            "Ελληνικά strings missing",
        ))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("Cafe menu")).unwrap();

    let by = |term: &str| {
        list_ids(
            &storage,
            &TicketQuery {
                search: Some(term.into()),
                ..TicketQuery::default()
            },
        )
    };
    assert_eq!(by("CAFÉ"), vec![cafe.id]);
    assert_eq!(by("über"), vec![uber.id]);
    assert_eq!(by("ΕΛΛΗΝΙΚΆ"), vec![greek.id]);
    assert_eq!(
        storage
            .count_tickets(&TicketQuery {
                search: Some("über".into()),
                ..TicketQuery::default()
            })
            .unwrap(),
        1
    );
}

#[test]
fn search_treats_wildcards_literally() {
    let mut storage = test_db();
    let pct = storage
        .create_ticket(&fixtures::ticket("CPU at 100% again"))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("CPU at 1000")).unwrap();
    let under = storage
        .create_ticket(&fixtures::ticket("rename snake_case field"))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("snakeXcase")).unwrap();

    let by = |term: &str| {
        list_ids(
            &storage,
            &TicketQuery {
                search: Some(term.into()),
                ..TicketQuery::default()
            },
        )
    };
    assert_eq!(by("100%"), vec![pct.id]);
    assert_eq!(by("snake_case"), vec![under.id]);
}

#[test]
fn empty_search_is_no_filter() {
    let mut storage = test_db();
    fixtures::create_tickets(&mut storage, 3, "any");
    let page = storage
        .list_tickets(&TicketQuery {
            search: Some(String::new()),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 3);
}

#[test]
fn tag_filter_matches_any_and_never_duplicates() {
    let _log = test_log("tag_filter_matches_any_and_never_duplicates");
    let mut storage = test_db();
    let tags = fixtures::create_tags(&mut storage, &["a", "b", "c"]);
    let both = storage
        .create_ticket(&fixtures::ticket_with_tags("both", &[tags[0].id, tags[1].id]))
        .unwrap();
    let only_b = storage
        .create_ticket(&fixtures::ticket_with_tags("only b", &[tags[1].id]))
        .unwrap();
    storage
        .create_ticket(&fixtures::ticket_with_tags("only c", &[tags[2].id]))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("untagged")).unwrap();

    let page = storage
        .list_tickets(&TicketQuery {
            tag_ids: vec![tags[0].id, tags[1].id, tags[0].id],
            sort_by: Some(SortField::CreatedAt),
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(fixtures::ids(&page.tickets), vec![both.id, only_b.id]);

    // hydration returns every tag, not only the matching ones
    assert_eq!(page.tickets[0].tags.len(), 2);
}

#[test]
fn tag_filter_with_unknown_ids_matches_nothing() {
    let mut storage = test_db();
    fixtures::create_tickets(&mut storage, 2, "plain");
    let page = storage
        .list_tickets(&TicketQuery {
            tag_ids: vec![404],
            ..TicketQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn filters_combine_with_and() {
    let mut storage = test_db();
    let tags = fixtures::create_tags(&mut storage, &["ops"]);
    let hit = storage
        .create_ticket(&fixtures::ticket_with_tags("deploy fix", &[tags[0].id]))
        .unwrap();
    storage
        .create_ticket(&fixtures::ticket_with_tags("deploy docs", &[tags[0].id]))
        .unwrap();
    storage.create_ticket(&fixtures::ticket("deploy untagged")).unwrap();
    storage.complete_ticket(hit.id).unwrap();

    let query = TicketQuery {
        status: Some(Status::Completed),
        tag_ids: vec![tags[0].id],
        search: Some("DEPLOY".into()),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &query), vec![hit.id]);
    assert_eq!(storage.count_tickets(&query).unwrap(), 1);
}

#[test]
fn default_order_is_newest_first() {
    let mut storage = test_db();
    let created = fixtures::create_tickets(&mut storage, 4, "order");
    let mut expected = fixtures::ids(&created);
    expected.reverse();
    assert_eq!(list_ids(&storage, &TicketQuery::default()), expected);
}

#[test]
fn sort_by_without_order_is_ascending() {
    let mut storage = test_db();
    let created = fixtures::create_tickets(&mut storage, 4, "asc");
    let query = TicketQuery {
        sort_by: Some(SortField::CreatedAt),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &query), fixtures::ids(&created));
}

#[test]
fn sort_by_stored_timestamps() {
    let _log = test_log("sort_by_stored_timestamps");
    let (mut storage, dir) = test_db_with_dir();
    let created = fixtures::create_tickets(&mut storage, 3, "ts");
    let (a, b, c) = (created[0].id, created[1].id, created[2].id);

    set_ticket_column(&dir, a, "updated_at", Some("2025-03-01T00:00:00.000000Z"));
    set_ticket_column(&dir, b, "updated_at", Some("2025-01-01T00:00:00.000000Z"));
    set_ticket_column(&dir, c, "updated_at", Some("2025-02-01T00:00:00.000000Z"));

    let asc = TicketQuery {
        sort_by: Some(SortField::UpdatedAt),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &asc), vec![b, c, a]);

    let desc = TicketQuery {
        sort_by: Some(SortField::UpdatedAt),
        order: Some(SortOrder::Desc),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &desc), vec![a, c, b]);
}

#[test]
fn completed_at_sort_places_pending_tickets() {
    let mut storage = test_db();
    let created = fixtures::create_tickets(&mut storage, 3, "done");
    let (open, first, second) = (created[0].id, created[1].id, created[2].id);
    storage.complete_ticket(first).unwrap();
    storage.complete_ticket(second).unwrap();

    let asc = TicketQuery {
        sort_by: Some(SortField::CompletedAt),
        order: Some(SortOrder::Asc),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &asc), vec![first, second, open]);

    let desc = TicketQuery {
        sort_by: Some(SortField::CompletedAt),
        order: Some(SortOrder::Desc),
        ..TicketQuery::default()
    };
    assert_eq!(list_ids(&storage, &desc), vec![open, second, first]);
}

#[test]
fn raw_query_is_lenient() {
    let mut storage = test_db();
    let created = fixtures::create_tickets(&mut storage, 3, "raw");

    let raw = RawTicketQuery {
        status: Some("not-a-status".into()),
        sort_by: Some("priority".into()),
        order: Some("ASC".into()),
        ..RawTicketQuery::default()
    };
    let query = raw.resolve().unwrap();
    assert_eq!(query.status, None);
    assert_eq!(list_ids(&storage, &query), fixtures::ids(&created));

    let bad = RawTicketQuery {
        tag_ids: Some("1,two".into()),
        ..RawTicketQuery::default()
    };
    assert!(bad.resolve().is_err());
}
