//! CLI for the storefront data-access core.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use shop_core::catalog::{status_filter, Collection, EVENT_TYPE_FIELD, USER_ID_FIELD};
use shop_core::config;
use shop_core::context::AppContext;
use shop_core::store::Filter;

use commands::{
    run_completions, run_count, run_delete, run_get, run_list, run_probe, run_put, run_search,
    Session,
};

/// Top-level CLI for the storefront store.
#[derive(Debug, Parser)]
#[command(name = "shop")]
#[command(about = "Browse and edit storefront collections", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// At most one equality filter for `list` and `count`.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Only records with this status.
    #[arg(long, group = "filter")]
    pub status: Option<String>,
    /// Only orders placed by this user id.
    #[arg(long, value_name = "ID", group = "filter")]
    pub user: Option<String>,
    /// Only events of this type ("voucher", "flash sale").
    #[arg(long, value_name = "TYPE", group = "filter")]
    pub event_type: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Option<Filter> {
        if let Some(user) = &self.user {
            return Some(Filter::equals(USER_ID_FIELD, user.as_str()));
        }
        if let Some(kind) = &self.event_type {
            return Some(Filter::equals(EVENT_TYPE_FIELD, kind.as_str()));
        }
        status_filter(self.status.as_deref())
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show one page of a collection, newest first.
    List {
        /// users, products, orders or events.
        collection: Collection,
        #[command(flatten)]
        filter: FilterArgs,
        /// Zero-based page index.
        #[arg(long, default_value = "0", value_name = "N")]
        page: usize,
        /// Page size (defaults to `default_page_size` from config).
        #[arg(long, value_name = "L")]
        limit: Option<usize>,
    },

    /// Count records in a collection.
    Count {
        collection: Collection,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print one record as JSON.
    Get { collection: Collection, id: String },

    /// Insert or replace a record from a JSON object.
    Put {
        collection: Collection,
        id: String,
        /// Record body, e.g. '{"title":"Tea","price":4.5}'.
        json: String,
        /// Creation time in epoch milliseconds (defaults to now).
        #[arg(long, value_name = "MILLIS")]
        created_at: Option<i64>,
    },

    /// Delete a record by id.
    Delete { collection: Collection, id: String },

    /// Case-insensitive keyword search over text fields.
    Search {
        collection: Collection,
        keyword: String,
        #[arg(long, default_value = "0", value_name = "N")]
        page: usize,
        #[arg(long, value_name = "L")]
        limit: Option<usize>,
    },

    /// Check whether the network is reachable.
    Probe,

    /// Print shell completions to stdout.
    Completions { shell: Shell },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell, &mut Cli::command());
            return Ok(());
        }

        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = AppContext::from_config(cfg);

        match cli.command {
            CliCommand::List {
                collection,
                filter,
                page,
                limit,
            } => {
                let session = Session::open(&ctx).await?;
                run_list(&session, collection, filter.to_filter(), page, limit).await?;
            }
            CliCommand::Count { collection, filter } => {
                let session = Session::open(&ctx).await?;
                run_count(&session, collection, filter.to_filter()).await?;
            }
            CliCommand::Get { collection, id } => {
                run_get(&Session::open(&ctx).await?, collection, &id).await?
            }
            CliCommand::Put {
                collection,
                id,
                json,
                created_at,
            } => {
                let session = Session::open(&ctx).await?;
                run_put(&session, collection, &id, &json, created_at).await?;
            }
            CliCommand::Delete { collection, id } => {
                run_delete(&Session::open(&ctx).await?, collection, &id).await?
            }
            CliCommand::Search {
                collection,
                keyword,
                page,
                limit,
            } => {
                let session = Session::open(&ctx).await?;
                run_search(&session, collection, &keyword, page, limit).await?;
            }
            CliCommand::Probe => run_probe(&ctx).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
