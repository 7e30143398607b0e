#![allow(dead_code)]

use ticketdesk::model::{Tag, Ticket};
use ticketdesk::storage::{SqliteStorage, TicketCreate};

pub fn ticket(title: &str) -> TicketCreate {
    TicketCreate {
        title: title.to_string(),
        ..TicketCreate::default()
    }
}

pub fn ticket_with_description(title: &str, description: &str) -> TicketCreate {
    TicketCreate {
        title: title.to_string(),
        description: Some(description.to_string()),
        tag_ids: vec![],
    }
}

pub fn ticket_with_tags(title: &str, tag_ids: &[i64]) -> TicketCreate {
    TicketCreate {
        title: title.to_string(),
        description: None,
        tag_ids: tag_ids.to_vec(),
    }
}

pub fn create_tags(storage: &mut SqliteStorage, names: &[&str]) -> Vec<Tag> {
    names
        .iter()
        .map(|name| storage.create_tag(name, None).expect("create tag"))
        .collect()
}

pub fn create_tickets(storage: &mut SqliteStorage, count: usize, prefix: &str) -> Vec<Ticket> {
    (0..count)
        .map(|i| {
            storage
                .create_ticket(&ticket(&format!("{prefix} {i}")))
                .expect("create ticket")
        })
        .collect()
}

pub fn ids(tickets: &[Ticket]) -> Vec<i64> {
    tickets.iter().map(|t| t.id).collect()
}
