//! # CLI Module
//!
//! clap-based commands for the Madi binary.
//!
//! `serve` runs the HTTP server; the remaining commands are one-shot
//! utilities that work directly against the core engine and the store,
//! no server required.

use crate::api::{self, ServerConfig};
use clap::{Args, Parser, Subcommand};
use madi_core::{resolve, EventStore, StoreError, TriggerContext, UtmBundle};
use std::path::{Path, PathBuf};

// =============================================================================
// COMMAND TREE
// =============================================================================

/// ChatMadi trigger service.
#[derive(Debug, Parser)]
#[command(name = "madi", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Resolve a trigger for a hand-built context and print it.
    Resolve(ResolveArgs),
    /// Administer the widget -> business registry.
    Widget {
        #[command(subcommand)]
        action: WidgetAction,
    },
    /// Inspect recent analytics events.
    Events(EventsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1", env = "MADI_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8787, env = "MADI_PORT")]
    pub port: u16,

    /// Path to the event database.
    #[arg(long, default_value = "madi.redb", env = "MADI_DB")]
    pub db: PathBuf,

    /// API key protecting the analytics surfaces. Unset = open.
    #[arg(long, env = "MADI_API_KEY")]
    pub api_key: Option<String>,

    /// Business to attribute events to when neither an explicit id nor a
    /// registered widget is supplied.
    #[arg(long, env = "MADI_DEFAULT_BUSINESS")]
    pub default_business: Option<String>,

    /// Allowed CORS origin; repeatable. Unset = permissive (the widget is
    /// embedded cross-origin by design).
    #[arg(long = "allowed-origin")]
    pub allowed_origins: Vec<String>,

    /// Requests per second allowed on the public surfaces.
    #[arg(long, default_value_t = 50)]
    pub rate_limit: u32,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            port: self.port,
            db: self.db,
            api_key: self.api_key,
            default_business: self.default_business,
            allowed_origins: self.allowed_origins,
            rate_limit: self.rate_limit,
        }
    }
}

#[derive(Debug, Args, Default)]
pub struct ResolveArgs {
    /// Full page URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Page path (preferred over the path in --url).
    #[arg(long)]
    pub pathname: Option<String>,

    /// Document referrer.
    #[arg(long)]
    pub referrer: Option<String>,

    /// Locale hint, e.g. en-IN.
    #[arg(long)]
    pub locale: Option<String>,

    /// Mark the visitor as seen before.
    #[arg(long)]
    pub seen: bool,

    /// Manual trigger override.
    #[arg(long)]
    pub trigger: Option<String>,

    /// Declared intent, e.g. pricing.
    #[arg(long)]
    pub intent: Option<String>,

    #[arg(long)]
    pub utm_campaign: Option<String>,

    #[arg(long)]
    pub utm_source: Option<String>,

    #[arg(long)]
    pub utm_medium: Option<String>,

    #[arg(long)]
    pub utm_term: Option<String>,

    #[arg(long)]
    pub utm_content: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    /// Build the resolver input from the flags.
    #[must_use]
    pub fn to_context(&self) -> TriggerContext {
        TriggerContext {
            url: self.url.clone(),
            pathname: self.pathname.clone(),
            referrer: self.referrer.clone(),
            locale: self.locale.clone(),
            seen: Some(self.seen),
            manual_override: self.trigger.clone(),
            intent: self.intent.clone(),
            utm: UtmBundle {
                campaign: self.utm_campaign.clone(),
                source: self.utm_source.clone(),
                medium: self.utm_medium.clone(),
                term: self.utm_term.clone(),
                content: self.utm_content.clone(),
            },
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum WidgetAction {
    /// Register a widget for a business (overwrites).
    Add {
        widget_id: String,
        business_id: String,
        #[arg(long, default_value = "madi.redb", env = "MADI_DB")]
        db: PathBuf,
    },
    /// List registered widgets.
    List {
        #[arg(long, default_value = "madi.redb", env = "MADI_DB")]
        db: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[arg(long, default_value = "madi.redb", env = "MADI_DB")]
    pub db: PathBuf,

    /// Number of events to show, newest first.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

/// CLI command failure.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Server(#[from] api::ServeError),
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run a parsed command to completion.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => Ok(api::serve(args.into_config()).await?),
        Command::Resolve(args) => cmd_resolve(&args),
        Command::Widget { action } => match action {
            WidgetAction::Add {
                widget_id,
                business_id,
                db,
            } => cmd_widget_add(&db, &widget_id, &business_id),
            WidgetAction::List { db, json } => cmd_widget_list(&db, json),
        },
        Command::Events(args) => cmd_events(&args.db, args.limit, args.json),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Resolve a trigger for the given flags and print the result.
pub fn cmd_resolve(args: &ResolveArgs) -> Result<(), CliError> {
    let ctx = args.to_context();
    let resolution = resolve(&ctx);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("code: {}", resolution.code);
        println!("type: {}", resolution.kind);
        println!("why:  {}", resolution.why);
    }

    Ok(())
}

/// Register a widget for a business.
pub fn cmd_widget_add(db: &Path, widget_id: &str, business_id: &str) -> Result<(), CliError> {
    let store = EventStore::open(db)?;
    store.register_widget(widget_id, business_id)?;
    println!("registered {widget_id} -> {business_id}");
    Ok(())
}

/// List registered widgets.
pub fn cmd_widget_list(db: &Path, json: bool) -> Result<(), CliError> {
    let store = EventStore::open(db)?;
    let widgets = store.widgets()?;

    if json {
        let rows: Vec<_> = widgets
            .iter()
            .map(|(widget, business)| {
                serde_json::json!({ "widget_id": widget, "business_id": business })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if widgets.is_empty() {
        println!("no widgets registered");
    } else {
        for (widget, business) in widgets {
            println!("{widget} -> {business}");
        }
    }

    Ok(())
}

/// Show recent analytics events, newest first.
pub fn cmd_events(db: &Path, limit: usize, json: bool) -> Result<(), CliError> {
    let store = EventStore::open(db)?;
    let events = store.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else if events.is_empty() {
        println!("no events recorded");
    } else {
        for event in events {
            println!(
                "#{} {} [{}] {} (business: {})",
                event.id,
                event.created_at_ms,
                event.kind,
                event.why.as_deref().unwrap_or(&event.code),
                event.business_id,
            );
        }
    }

    Ok(())
}
