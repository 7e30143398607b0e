//! End-to-end tests driving the `td` binary.

mod common;

use common::cli::{TdWorkspace, run_td, run_td_with_env};
use std::fs;

#[test]
fn e2e_full_ticket_lifecycle() {
    common::init_test_logging();
    let workspace = TdWorkspace::initialized();

    let tag = run_td(&workspace, ["tag", "create", "backend", "--color", "#3B82F6", "--json"], "tag_create");
    assert!(tag.status.success(), "tag create failed: {}", tag.stderr);
    let tag_id = tag.json()["id"].as_i64().expect("tag id");

    let create = run_td(
        &workspace,
        [
            "create",
            "Fix login",
            "-d",
            "Users see a 500",
            "--tag",
            &tag_id.to_string(),
            "--json",
        ],
        "create",
    );
    assert!(create.status.success(), "create failed: {}", create.stderr);
    let ticket = create.json();
    let id = ticket["id"].as_i64().expect("ticket id");
    assert_eq!(ticket["status"], "pending");
    assert_eq!(ticket["tags"][0]["name"], "backend");
    assert!(ticket["completed_at"].is_null());

    let complete = run_td(&workspace, ["complete", &id.to_string(), "--json"], "complete");
    assert!(complete.status.success(), "complete failed: {}", complete.stderr);
    let done = complete.json();
    assert_eq!(done["status"], "completed");
    assert!(done["completed_at"].is_string());

    let list = run_td(&workspace, ["list", "--status", "completed", "--json"], "list_completed");
    assert!(list.status.success());
    let page = list.json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["tickets"][0]["id"], id);

    let reopen = run_td(&workspace, ["uncomplete", &id.to_string(), "--json"], "uncomplete");
    assert!(reopen.status.success());
    assert!(reopen.json()["completed_at"].is_null());

    let delete = run_td(&workspace, ["delete", &id.to_string(), "--json"], "delete");
    assert!(delete.status.success());
    assert_eq!(delete.json()["status"], "deleted");

    let show = run_td(&workspace, ["show", &id.to_string(), "--json"], "show_deleted");
    assert_eq!(show.status.code(), Some(3));
    assert_eq!(show.error_json()["error"]["code"], "TICKET_NOT_FOUND");
    assert_eq!(show.error_json()["error"]["http_status"], 404);

    let tags = run_td(&workspace, ["tag", "list", "--json"], "tag_list");
    assert_eq!(tags.json()[0]["ticket_count"], 0);
}

#[test]
fn e2e_commands_require_init() {
    let workspace = TdWorkspace::new();
    let run = run_td(&workspace, ["list", "--json"], "list_uninitialized");
    assert!(!run.status.success());
    assert_eq!(run.error_json()["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn e2e_init_twice_needs_force() {
    let workspace = TdWorkspace::initialized();
    let again = run_td(&workspace, ["init"], "init_again");
    assert!(!again.status.success());
    assert!(again.stderr.contains("ALREADY_INITIALIZED"));

    let forced = run_td(&workspace, ["init", "--force"], "init_force");
    assert!(forced.status.success(), "{}", forced.stderr);
    assert!(workspace.root.join(".tickets/tickets.db").exists());
}

#[test]
fn e2e_duplicate_tag_is_conflict() {
    let workspace = TdWorkspace::initialized();
    let first = run_td(&workspace, ["tag", "create", "ops"], "tag_first");
    assert!(first.status.success());

    let second = run_td(&workspace, ["tag", "create", "ops", "--json"], "tag_second");
    assert_eq!(second.status.code(), Some(5));
    let err = second.error_json();
    assert_eq!(err["error"]["code"], "TAG_NAME_CONFLICT");
    assert_eq!(err["error"]["http_status"], 409);
}

#[test]
fn e2e_validation_errors() {
    let workspace = TdWorkspace::initialized();

    let bad_color = run_td(&workspace, ["tag", "create", "x", "--color", "blue", "--json"], "bad_color");
    assert_eq!(bad_color.status.code(), Some(4));
    assert_eq!(bad_color.error_json()["error"]["code"], "VALIDATION_FAILED");

    let long_title = "t".repeat(256);
    let create = run_td(&workspace, ["create", long_title.as_str(), "--json"], "long_title");
    assert_eq!(create.status.code(), Some(4));

    let bad_tags = run_td(&workspace, ["list", "--tag", "1,abc", "--json"], "bad_tag_list");
    assert_eq!(bad_tags.status.code(), Some(4));
}

#[test]
fn e2e_list_filters_and_pagination() {
    let workspace = TdWorkspace::initialized();
    let tag = run_td(&workspace, ["tag", "create", "urgent", "--json"], "tag");
    let tag_id = tag.json()["id"].as_i64().unwrap().to_string();

    for i in 0..6 {
        let title = format!("ticket {i}");
        let mut args = vec!["create", title.as_str(), "--json"];
        if i % 2 == 0 {
            args.extend(["--tag", tag_id.as_str()]);
        }
        let run = run_td(&workspace, args, &format!("create_{i}"));
        assert!(run.status.success(), "{}", run.stderr);
    }

    let tagged = run_td(&workspace, ["list", "--tag", &tag_id, "--json"], "list_tagged");
    assert_eq!(tagged.json()["total"], 3);

    let page = run_td(
        &workspace,
        ["list", "--sort-by", "created_at", "--limit", "2", "--offset", "2", "--json"],
        "list_page",
    );
    let page = page.json();
    assert_eq!(page["total"], 6);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 2);
    let titles: Vec<&str> = page["tickets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["ticket 2", "ticket 3"]);

    let search = run_td(&workspace, ["list", "--search", "TICKET 5", "--json"], "list_search");
    assert_eq!(search.json()["total"], 1);
}

#[test]
fn e2e_tag_attach_detach_and_update() {
    let workspace = TdWorkspace::initialized();
    let a = run_td(&workspace, ["tag", "create", "a", "--json"], "tag_a").json()["id"]
        .as_i64()
        .unwrap()
        .to_string();
    let b = run_td(&workspace, ["tag", "create", "b", "--json"], "tag_b").json()["id"]
        .as_i64()
        .unwrap()
        .to_string();
    let id = run_td(&workspace, ["create", "taggable", "--json"], "create").json()["id"]
        .as_i64()
        .unwrap()
        .to_string();

    let both = format!("{a},{b}");
    let attached = run_td(&workspace, ["tag", "attach", &id, &both, "--json"], "attach");
    assert!(attached.status.success(), "{}", attached.stderr);
    assert_eq!(attached.json()["tags"].as_array().unwrap().len(), 2);

    let detached = run_td(&workspace, ["tag", "detach", &id, &a, "--json"], "detach");
    assert_eq!(detached.json()["tags"][0]["name"], "b");

    let renamed = run_td(&workspace, ["tag", "update", &b, "--name", "beta", "--json"], "rename");
    assert_eq!(renamed.json()["name"], "beta");

    let shown = run_td(&workspace, ["show", &id, "--json"], "show");
    assert_eq!(shown.json()["tags"][0]["name"], "beta");

    let update = run_td(
        &workspace,
        ["update", &id, "--title", "renamed", "--description", "notes", "--json"],
        "update",
    );
    assert_eq!(update.json()["description"], "notes");
    let cleared = run_td(&workspace, ["update", &id, "--clear-description", "--json"], "clear");
    assert!(cleared.json().get("description").is_none());
    assert_eq!(cleared.json()["title"], "renamed");
}

#[test]
fn e2e_palette_colors_from_project_config() {
    let workspace = TdWorkspace::initialized();
    fs::write(
        workspace.root.join(".tickets/config.yaml"),
        "tag-colors: palette\n",
    )
    .unwrap();

    let first = run_td(&workspace, ["tag", "create", "one", "--json"], "palette_one");
    assert_eq!(first.json()["color"], "#3B82F6");
    let second = run_td(&workspace, ["tag", "create", "two", "--json"], "palette_two");
    assert_eq!(second.json()["color"], "#10B981");
}

#[test]
fn e2e_text_output_and_env_db() {
    let workspace = TdWorkspace::initialized();
    let create = run_td(&workspace, ["create", "Plain text"], "create_text");
    assert!(create.status.success());
    assert!(create.stdout.contains("#1 Plain text"), "{}", create.stdout);

    let list = run_td(&workspace, ["list"], "list_text");
    assert!(list.stdout.contains("○ #1 Plain text"));
    assert!(list.stdout.contains("Showing 1-1 of 1"));

    let alt_db = workspace.root.join("alt.db");
    let alt = run_td_with_env(
        &workspace,
        ["list", "--json"],
        [("TICKETDESK_DB", alt_db.to_string_lossy().to_string())],
        "list_alt_db",
    );
    assert!(alt.status.success(), "{}", alt.stderr);
    assert_eq!(alt.json()["total"], 0);
    assert!(alt_db.exists());
}

#[test]
fn e2e_create_warns_about_unresolved_tags() {
    let workspace = TdWorkspace::initialized();
    let tag = run_td(&workspace, ["tag", "create", "real", "--json"], "tag_real");
    let tag_id = tag.json()["id"].as_i64().unwrap();
    let tags = format!("{tag_id},999,999");

    let create = run_td(&workspace, ["create", "Half tagged", "--tag", &tags], "create_partial");
    assert!(create.status.success(), "{}", create.stderr);
    assert!(
        create.stderr.contains("1 of 2 tag IDs did not resolve"),
        "{}",
        create.stderr
    );
}

#[test]
fn e2e_version() {
    let workspace = TdWorkspace::new();
    let run = run_td(&workspace, ["version", "--json"], "version");
    assert!(run.status.success());
    assert_eq!(run.json()["version"], env!("CARGO_PKG_VERSION"));
}
