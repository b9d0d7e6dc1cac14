//! link-router
//!
//! Routes each incoming URL to a handler application chosen by an ordered
//! rule file.
//!
//! # Architecture Overview
//!
//! ```text
//!   URL (argument / stdin line)
//!        │
//!        ▼
//!   ┌────────────┐    ┌────────────────┐    ┌──────────────┐
//!   │  dispatch  │───▶│ routing engine │───▶│ pattern cache│
//!   │            │    │  (ArcSwap'd    │    │  (compile    │
//!   │            │◀───│   RuleSet)     │    │   once)      │
//!   └─────┬──────┘    └───────▲────────┘    └──────────────┘
//!         │                   │ set_rule_set
//!         ▼                   │
//!   handler<TAB>url    ┌──────┴───────┐
//!   on stdout          │ config loader│◀── watcher (notify)
//!                      └──────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use link_router::config::loader::{self, default_config_path};
use link_router::config::validation::validate_config;
use link_router::config::{ConfigWatcher, FileSource, RuleSetSource};
use link_router::dispatch::{self, session, StdoutInvoker};
use link_router::observability::{logging, metrics};
use link_router::routing::{Clause, Resolution, RoutingEngine, RuleSet};
use link_router::{Dispatcher, HandlerId, Shutdown};

#[derive(Parser)]
#[command(name = "link-router")]
#[command(about = "Route URLs to handler applications using an ordered rule file", long_about = None)]
struct Cli {
    /// Rule file (default: $LINK_ROUTER_CONFIG or ~/.link-router/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the handler chosen for each URL
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Handler to use when neither a rule nor the rule file default applies
        #[arg(short, long, default_value = "")]
        default: String,

        /// Show which rule and clause matched
        #[arg(short, long)]
        explain: bool,
    },
    /// Load the rule file and report problems
    Check,
    /// Persist the rule file's default handler
    SetDefault { handler: String },
    /// Create an empty rule file if none exists
    Init,
    /// Dispatch argument URLs, then one URL per stdin line
    Serve {
        /// Handler to use when neither a rule nor the rule file default applies
        #[arg(short, long, default_value = "")]
        default: String,

        /// Reload the rule file when it changes
        #[arg(short, long)]
        watch: bool,

        /// Expose Prometheus metrics on this address
        #[arg(long)]
        metrics_address: Option<SocketAddr>,

        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_file.as_deref())?;

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Resolve {
            urls,
            default,
            explain,
        } => resolve(&config_path, &urls, &HandlerId::from(default), explain)?,
        Commands::Check => check(&config_path)?,
        Commands::SetDefault { handler } => {
            loader::set_default_handler(&config_path, &handler)?;
            println!("default handler set to {handler:?} in {}", config_path.display());
        }
        Commands::Init => {
            if loader::ensure_config_file(&config_path)? {
                println!("created {}", config_path.display());
            } else {
                println!("{} already exists", config_path.display());
            }
        }
        Commands::Serve {
            default,
            watch,
            metrics_address,
            urls,
        } => serve(config_path, default, watch, metrics_address, urls).await?,
    }

    Ok(())
}

fn resolve(
    config_path: &std::path::Path,
    urls: &[String],
    caller_default: &HandlerId,
    explain: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = FileSource::new(config_path).load()?;
    let engine = RoutingEngine::new(RuleSet::from_config(&config));
    let rule_set = engine.snapshot();

    for url in urls {
        let resolution = engine.resolve_in(&rule_set, url);
        let handler = resolution
            .handler()
            .clone()
            .or(rule_set.fallback())
            .or(caller_default);

        if explain {
            let reason = match &resolution {
                Resolution::Rule {
                    index,
                    clause: Clause::Literal(literal),
                    ..
                } => format!("rule #{} literal {literal:?}", index + 1),
                Resolution::Rule {
                    index,
                    clause: Clause::Regex(regex),
                    ..
                } => format!("rule #{} regex {regex:?}", index + 1),
                Resolution::Fallback(_) => "default".to_string(),
            };
            println!("{handler}\t{url}\t{reason}");
        } else {
            println!("{handler}\t{url}");
        }
    }
    Ok(())
}

fn check(config_path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = loader::load_config(config_path)?;
    let issues = validate_config(&config);

    println!(
        "{}: {} rule(s), default handler {:?}",
        config_path.display(),
        config.rules.len(),
        config.default_handler_target
    );
    for issue in &issues {
        println!("  warning: {issue}");
    }
    if issues.is_empty() {
        println!("  no problems found");
    }
    Ok(())
}

async fn serve(
    config_path: PathBuf,
    default: String,
    watch: bool,
    metrics_address: Option<SocketAddr>,
    urls: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = metrics_address {
        metrics::init_metrics(addr);
    }

    let source: Arc<dyn RuleSetSource> = Arc::new(FileSource::new(config_path.clone()));
    let dispatcher = Dispatcher::new(source, Arc::new(StdoutInvoker), default);

    // Start with an empty rule set if the file is broken; the error is
    // kept and a later successful reload replaces it.
    if let Err(e) = dispatcher.reload() {
        tracing::warn!(error = %e, "Starting without rules");
    }

    let (_watcher, updates) = if watch {
        let (watcher, updates) = ConfigWatcher::new(&config_path);
        (Some(watcher.run()?), Some(updates))
    } else {
        (None, None)
    };

    for url in urls.iter().filter(|u| dispatch::is_dispatchable(u)) {
        dispatcher.handle_url(url);
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let handled = session::run(&dispatcher, input, updates, shutdown.subscribe()).await?;

    tracing::info!(handled, "Shutdown complete");
    Ok(())
}
