use anyhow::{bail, Result};
use clap::Args;
use jobboard_lib::validation;
use jobboard_lib::{Phase, QueryState, SyncConfig};

use crate::commands::open_session;
use crate::output::{print_snapshot, print_summary, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// List to fetch: companies, jobs, users, payments
    pub section: String,

    /// Search text
    #[arg(long)]
    pub search: Option<String>,

    /// Filter label (e.g. pending, approved, employer, paid)
    #[arg(long)]
    pub status: Option<String>,

    /// Sort field; defaults to the list's creation date
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Flip the sort direction to ascending
    #[arg(long)]
    pub toggle_sort: bool,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page [default: JOBBOARD_PAGE_SIZE or 10]
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Start from a deep-link fragment, e.g. '#companies?search=acme'
    #[arg(long)]
    pub fragment: Option<String>,
}

/// Builds the starting query from the flags. Filters reset the page, so the
/// page is applied last.
pub fn build_query(args: &ListArgs, config: &SyncConfig) -> Result<QueryState> {
    let section = validation::validate_section(&args.section)?;
    let page = validation::validate_page(args.page)?;
    let page_size = validation::validate_page_size(args.page_size.unwrap_or(config.page_size))?;

    let mut query = QueryState::for_section(section).with_page_size(page_size);

    if let Some(search) = &args.search {
        query = query.with_search(&validation::sanitize_search(search)?);
    }

    if let Some(status) = &args.status {
        let label = validation::validate_status(section, status)?;
        query = query.with_status(Some(&label));
    }

    if let Some(field) = &args.sort_by {
        if field != query.sort_field() {
            query = query.with_sort(field);
        }
    }

    if args.toggle_sort {
        let field = query.sort_field().to_string();
        query = query.with_sort(&field);
    }

    Ok(query.with_page(page))
}

pub async fn run(args: &ListArgs, config: &SyncConfig, format: &OutputFormat) -> Result<()> {
    let section = validation::validate_section(&args.section)?;
    let query = build_query(args, config)?;

    let (mut controller, _location) =
        open_session(section, config, query, args.fragment.as_deref())?;
    let snapshot = controller.settle().await.clone();
    controller.close();

    print_summary(&snapshot);
    if let Phase::Error(reason) = snapshot.phase {
        let detail = snapshot
            .last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| reason.to_string());
        bail!("Failed to load {}: {}", section.key, detail);
    }
    print_snapshot(section, &snapshot, format)?;

    Ok(())
}
