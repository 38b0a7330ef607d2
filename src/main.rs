use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use prasang::utils::{format_card, get_log_path, init_file_logging, init_stderr_logging};
use prasang::{
    MatchMode, RecordQuery, RecordStore, StoreClient, StoreClientBuilder, StoreError,
    TopicNormalizer, TopicRow, TopicSelection, filter_records,
};
use tracing::info;

/// prasang - browse and filter a catalog of prasangs by text and topic
#[derive(Parser)]
#[command(name = "prasang")]
#[command(about = "Browse and filter prasangs by text search and topics")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings; each falls back to its environment variable
#[derive(Args)]
struct StoreArgs {
    /// Base URL of the record store (PRASANG_STORE_URL)
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// API key for the record store (PRASANG_STORE_KEY)
    #[arg(long, value_name = "KEY", global = true)]
    key: Option<String>,

    /// Maximum records fetched per listing (PRASANG_FETCH_LIMIT)
    #[arg(long, value_name = "N", global = true)]
    limit: Option<usize>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// List every topic as a deduplicated, sorted chip list
    Topics(TopicsCommand),
    /// List prasangs, optionally searched by text and filtered by topic
    List(ListCommand),
    /// Open the interactive browser
    Browse,
}

#[derive(Args)]
struct TopicsCommand {
    /// Also print the normalized value used for filtering
    #[arg(long)]
    values: bool,
}

#[derive(Args)]
struct ListCommand {
    /// Text to search for in prasang text and notes
    #[arg(short, long, value_name = "TEXT")]
    search: Option<String>,

    /// Topic to filter by; repeat or comma-separate for several
    #[arg(short, long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,

    /// Whether a prasang needs any or all of the selected topics
    #[arg(short, long = "match", value_enum, default_value_t = MatchMode::Any)]
    match_mode: MatchMode,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let result = run(&cli);

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs to stderr for one-shot commands and to a file for the TUI.
fn init_logging(cli: &Cli) -> Result<()> {
    match cli.command {
        Commands::Browse => {
            let path = get_log_path()?;
            init_file_logging(&path, cli.verbose)
        }
        Commands::Topics(_) | Commands::List(_) => {
            init_stderr_logging(cli.verbose);
            Ok(())
        }
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad or missing configuration; everything else, including
/// store failures, counts as internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<StoreError>())
        .any(StoreError::is_config_error)
}

fn build_store(args: &StoreArgs) -> Result<StoreClient> {
    let mut builder = StoreClientBuilder::new();
    if let Some(url) = &args.url {
        builder = builder.base_url(url);
    }
    if let Some(key) = &args.key {
        builder = builder.api_key(key);
    }
    if let Some(limit) = args.limit {
        builder = builder.fetch_limit(limit);
    }

    let client = builder
        .build()
        .context("Failed to configure record store")?;
    info!(url = client.base_url(), limit = client.fetch_limit(), "store configured");
    Ok(client)
}

fn run(cli: &Cli) -> Result<()> {
    let store = build_store(&cli.store)?;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Topics(cmd) => execute_topics(&store, cmd.values, &mut stdout),
        Commands::List(cmd) => {
            let limit = store.fetch_limit();
            execute_list(&store, cmd, limit, &mut stdout)
        }
        Commands::Browse => {
            drop(stdout);
            prasang::tui::run(Arc::new(store))
        }
    }
}

/// Prints the chip list, one label per line.
fn execute_topics(store: &dyn RecordStore, values: bool, out: &mut impl Write) -> Result<()> {
    let rows = store.list_topics().context("Failed to load topics")?;
    let chips = TopicNormalizer::build_chips(rows.iter().filter_map(TopicRow::topic));

    if chips.is_empty() {
        writeln!(out, "No topics")?;
        return Ok(());
    }

    for chip in chips {
        if values {
            writeln!(out, "{}\t{}", chip.label, chip.value)?;
        } else {
            writeln!(out, "{}", chip.label)?;
        }
    }
    Ok(())
}

/// Fetches, topic-filters and prints records as cards.
fn execute_list(
    store: &dyn RecordStore,
    cmd: &ListCommand,
    limit: usize,
    out: &mut impl Write,
) -> Result<()> {
    let query = match &cmd.search {
        Some(text) => RecordQuery::with_text(text.as_str()),
        None => RecordQuery::new(),
    };
    let selection: TopicSelection = parse_topics(&cmd.topics).into_iter().collect();

    let records = store
        .list_records(&query)
        .context("Failed to load prasangs")?;
    let visible = filter_records(&records, &selection, cmd.match_mode);

    if visible.is_empty() {
        writeln!(out, "No prasangs found")?;
    } else {
        for (i, record) in visible.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write!(out, "{}", format_card(record))?;
        }
    }

    writeln!(out)?;
    write!(out, "{} of {} fetched prasangs shown", visible.len(), records.len())?;
    if !selection.is_empty() && records.len() >= limit {
        write!(out, " (topic filter covers only the {limit} most recent)")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Splits `--topic` values on commas, trimming and dropping empties.
fn parse_topics(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
