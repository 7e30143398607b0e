use clap::Parser;
use std::io::{self, IsTerminal};
use ticketdesk::cli::commands;
use ticketdesk::cli::{Cli, Commands};
use ticketdesk::config;
use ticketdesk::logging::init_logging;
use ticketdesk::{StructuredError, TicketError};
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);
    let json = cli.json;

    let result = match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, json, None),
        Commands::Create(args) => commands::create::execute(args, json, &overrides),
        Commands::List(args) => commands::list::execute(args, json, &overrides),
        Commands::Show { id } => commands::show::execute(*id, json, &overrides),
        Commands::Update(args) => commands::update::execute(args, json, &overrides),
        Commands::Delete { id } => commands::delete::execute(*id, json, &overrides),
        Commands::Complete { id } => commands::complete::execute(*id, json, &overrides),
        Commands::Uncomplete { id } => {
            commands::complete::execute_uncomplete(*id, json, &overrides)
        }
        Commands::Tag { command } => commands::tag::execute(command, json, &overrides),
        Commands::Version => commands::version::execute(json),
    };

    if let Err(e) = result {
        handle_error(&e, json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &TicketError, json_mode: bool) -> ! {
    if err.is_user_recoverable() {
        debug!(error = %err, "command rejected");
    } else {
        error!(error = %err, "command failed");
    }
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        lock_timeout: cli.lock_timeout,
        no_color: cli.no_color.then_some(true),
    }
}
