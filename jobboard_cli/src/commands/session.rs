use anyhow::{anyhow, Result};
use clap::Args;
use jobboard_lib::validation;
use jobboard_lib::{ListSection, NavigationSurface, QueryState, SyncConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{open_session, Session};
use crate::output::{print_snapshot, print_summary, OutputFormat};

#[derive(Args)]
pub struct SessionArgs {
    /// List to browse: companies, jobs, users, payments
    pub section: String,

    /// Start from a deep-link fragment, e.g. '#companies?search=acme'
    #[arg(long)]
    pub fragment: Option<String>,
}

const HELP: &str = "\
commands:
  search <text>     commit a search (empty clears it)
  type <text>       type search text; committed after the debounce
  status <label>    filter by label, or 'status none' to clear
  sort <field>      sort by field; repeat to flip direction
  page <n>          go to page n
  size <n>          set the page size
  hash <fragment>   navigate to a fragment, e.g. #companies?search=acme
  retry             re-issue the current query
  show              print the current page
  quit              end the session";

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Type(String),
    Status(Option<String>),
    Sort(String),
    Page(u32),
    Size(u32),
    Hash(String),
    Retry,
    Show,
    Help,
    Quit,
}

/// Parses a command line, validating arguments against `section`.
pub fn parse_command(line: &str, section: &ListSection) -> Result<SessionCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "search" => SessionCommand::Search(validation::sanitize_search(rest)?),
        "type" => SessionCommand::Type(validation::sanitize_search(rest)?),
        "status" => match rest {
            "" | "none" => SessionCommand::Status(None),
            label => SessionCommand::Status(Some(validation::validate_status(section, label)?)),
        },
        "sort" if !rest.is_empty() => SessionCommand::Sort(rest.to_string()),
        "page" => SessionCommand::Page(validation::validate_page(parse_number(rest)?)?),
        "size" => SessionCommand::Size(validation::validate_page_size(parse_number(rest)?)?),
        "hash" => SessionCommand::Hash(rest.to_string()),
        "retry" => SessionCommand::Retry,
        "show" | "" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(anyhow!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

fn parse_number(input: &str) -> Result<u32> {
    input
        .parse::<u32>()
        .map_err(|_| anyhow!("expected a number, got '{}'", input))
}

pub async fn run(args: &SessionArgs, config: &SyncConfig, format: &OutputFormat) -> Result<()> {
    let section = validation::validate_section(&args.section)?;
    let query = QueryState::for_section(section)
        .with_page_size(validation::validate_page_size(config.page_size)?);
    let (mut controller, location) =
        open_session(section, config, query, args.fragment.as_deref())?;

    show(&mut controller, section, format).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line, section) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        match command {
            SessionCommand::Search(text) => controller.commit_search(&text),
            SessionCommand::Type(text) => controller.type_search(&text),
            SessionCommand::Status(label) => controller.set_status(label.as_deref()),
            SessionCommand::Sort(field) => controller.select_sort(&field),
            SessionCommand::Page(page) => controller.go_to_page(page),
            SessionCommand::Size(size) => controller.set_page_size(size),
            SessionCommand::Hash(fragment) => location.set_fragment(&fragment),
            SessionCommand::Retry => controller.retry(),
            SessionCommand::Show => {}
            SessionCommand::Help => {
                eprintln!("{}", HELP);
                continue;
            }
            SessionCommand::Quit => break,
        }
        show(&mut controller, section, format).await?;
    }

    controller.close();
    Ok(())
}

async fn show(controller: &mut Session, section: &ListSection, format: &OutputFormat) -> Result<()> {
    let snapshot = controller.settle().await;
    print_summary(snapshot);
    if let Some(e) = &snapshot.last_error {
        eprintln!("warning: showing last loaded page; {}", e);
    }
    print_snapshot(section, snapshot, format)
}
