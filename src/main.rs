//! ideaboard - command-line front end for the service-idea portfolio.
//!
//! Usage: ideaboard [--config PATH] <command>
//!
//! Reads the portfolio from the configured spreadsheet backend and prints
//! dashboard figures, ranking pages, searches and exports.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

use ideaboard_lib::auth;
use ideaboard_lib::automation::WebhookClient;
use ideaboard_lib::board::{Navigation, RankingBoard};
use ideaboard_lib::catalog::{self, criteria::criterion_index};
use ideaboard_lib::config::{load_config, load_config_from, AppConfig};
use ideaboard_lib::error::{PortfolioError, UserFacingError};
use ideaboard_lib::export;
use ideaboard_lib::metrics::{build_overview, top_n};
use ideaboard_lib::ranking::{FilterChange, SortKey};
use ideaboard_lib::search::{observed_clusters, quick_search};
use ideaboard_lib::services::portfolio;
use ideaboard_lib::session::ServiceEdit;
use ideaboard_lib::sheets::SheetsClient;
use ideaboard_lib::store::ServiceStore;
use ideaboard_lib::types::{NewService, Role, ServiceStatus};

#[derive(Parser)]
#[command(name = "ideaboard")]
#[command(about = "Score, rank and track service ideas")]
struct Cli {
    /// Config file (default: ~/.ideaboard/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dashboard figures as JSON
    Overview,

    /// One page of the ranking table
    Ranking {
        #[arg(long)]
        cluster: Option<String>,
        /// Classification (Altíssima, Alta, Média, Baixa)
        #[arg(long)]
        tier: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Column to sort by (total, service, revenueEstimate, alinhamento, ...)
        #[arg(long, default_value = "total")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Highest-scoring ideas
    Top {
        #[arg(long)]
        n: Option<usize>,
    },

    /// Write the full portfolio as CSV
    Export {
        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Find ideas by name
    Search { query: String },

    /// List the clusters in use and the catalog clusters
    Clusters,

    /// Register a new idea
    Add {
        #[arg(long)]
        service: String,
        #[arg(long)]
        need: String,
        #[arg(long)]
        audience: String,
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        creator: Option<String>,
    },

    /// Edit scores, revenue or status of one idea and save
    Edit {
        id: i64,
        /// Criterion score as CRITERION=VALUE (criterion id, or 1-5)
        #[arg(long = "score")]
        scores: Vec<String>,
        #[arg(long)]
        revenue: Option<f64>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete an idea
    Delete { id: i64 },

    /// Send an idea to the automation webhook
    Automate {
        id: i64,
        #[arg(long)]
        message: Option<String>,
    },

    /// Check credentials against the backend
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = UserFacingError::from(&e);
            eprintln!("Error: {}", report.message);
            eprintln!("{}", report.recovery_suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), PortfolioError> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let client = SheetsClient::new(&config.sheets)?;

    match cli.command {
        Command::Login { email, password } => {
            let session = auth::login(&client, &email, &password).await?;
            print_json(&session.user)
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let session = auth::register(&client, &name, &email, &password).await?;
            print_json(&session.user)
        }
        command => {
            let mut store = ServiceStore::new();
            portfolio::refresh(&mut store, &client).await?;
            run_with_store(command, &config, &client, &mut store).await
        }
    }
}

async fn run_with_store(
    command: Command,
    config: &AppConfig,
    client: &SheetsClient,
    store: &mut ServiceStore,
) -> Result<(), PortfolioError> {
    match command {
        Command::Overview => {
            let options = config.overview_options()?;
            let overview = build_overview(store.all(), catalog::clusters(), Utc::now(), &options);
            print_json(&overview)
        }
        Command::Ranking {
            cluster,
            tier,
            status,
            sort,
            asc,
            page,
        } => {
            let mut board = RankingBoard::new(config.ranking.page_size, Role::Editor);
            let mut proceed = |_: &str| true;
            for (field, value) in [("cluster", cluster), ("tier", tier), ("status", status)] {
                if let Some(value) = value {
                    let change = FilterChange::parse(field, &value)?;
                    board.navigate(Navigation::Filter(change), &mut proceed)?;
                }
            }
            let key: SortKey = sort.parse()?;
            if key != board.view().sort().key {
                board.navigate(Navigation::Sort(key), &mut proceed)?;
            }
            if asc {
                board.navigate(Navigation::Sort(key), &mut proceed)?;
            }
            board.navigate(Navigation::Page(page), &mut proceed)?;

            let view = board.render(store);
            println!(
                "Page {}/{} ({} matching)",
                view.page_number, view.total_pages, view.total_matches
            );
            for (offset, row) in view.rows.iter().enumerate() {
                let s = &row.row.service;
                println!(
                    "{:>3}. [{:>4}] {:<40} {:>2} {:<9} {:<24} {}",
                    view.start_index + offset + 1,
                    s.id,
                    s.service,
                    row.row.total,
                    row.row.tier,
                    s.cluster,
                    s.status
                );
            }
            Ok(())
        }
        Command::Top { n } => {
            let n = n.unwrap_or(config.ranking.top_n);
            for s in top_n(store.all(), n) {
                println!("{:>2}  {:<40} {}", s.total(), s.service, s.tier());
            }
            Ok(())
        }
        Command::Export { dir } => {
            let path = export::export_to_dir(store.all(), &dir, Utc::now().date_naive())?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Search { query } => {
            for s in quick_search(store.all(), &query) {
                println!("[{:>4}] {}", s.id, s.service);
            }
            Ok(())
        }
        Command::Clusters => {
            println!("In use:");
            for cluster in observed_clusters(store.all()) {
                println!("  {}", cluster);
            }
            println!("Catalog:");
            for cluster in catalog::clusters() {
                println!("  {} - {}", cluster.short_title, cluster.title);
            }
            Ok(())
        }
        Command::Add {
            service,
            need,
            audience,
            cluster,
            model,
            creator,
        } => {
            let draft = NewService {
                service,
                need,
                target_audience: audience,
                cluster,
                business_model: model,
                status: ServiceStatus::default(),
                creator_name: creator,
            };
            let created = portfolio::add_service(store, client, draft, None).await?;
            print_json(&created)
        }
        Command::Edit {
            id,
            scores,
            revenue,
            status,
        } => {
            let mut board = RankingBoard::new(config.ranking.page_size, Role::Editor);
            for raw in &scores {
                let (index, value) = parse_score_arg(raw)?;
                board.edit(store, id, ServiceEdit::Score { index, value })?;
            }
            if let Some(revenue) = revenue {
                board.edit(store, id, ServiceEdit::RevenueEstimate(revenue))?;
            }
            if let Some(status) = status {
                board.edit(store, id, ServiceEdit::Status(status.parse()?))?;
            }
            if !board.session().has_pending() {
                println!("No changes");
                return Ok(());
            }

            let report = board.save_all(store, client).await?;
            match report.failed.into_iter().next() {
                Some(failure) => Err(failure.error),
                None => {
                    if let Some(saved) = store.get(id) {
                        println!("Saved {} ({} - {})", saved.id, saved.total(), saved.tier());
                    }
                    Ok(())
                }
            }
        }
        Command::Delete { id } => {
            let removed = portfolio::delete_service(store, client, id, Role::Editor).await?;
            println!("Deleted {} ({})", removed.id, removed.service);
            Ok(())
        }
        Command::Automate { id, message } => {
            let service = store.get(id).ok_or(PortfolioError::NotFound(id))?;
            let webhook = WebhookClient::from_config(&config.automation)?;
            portfolio::trigger_automation(
                webhook.as_ref(),
                service,
                message.as_deref(),
                None,
                Utc::now(),
            )
            .await?;
            println!("Automation triggered for {}", service.service);
            Ok(())
        }
        Command::Login { .. } | Command::Register { .. } => Ok(()),
    }
}

/// `alinhamento=4`, `Viabilidade=2` or `1=5` (1-based position).
fn parse_score_arg(raw: &str) -> Result<(usize, i64), PortfolioError> {
    let invalid = || PortfolioError::Validation(format!("Invalid score '{}', expected CRITERION=VALUE", raw));
    let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    let index = criterion_index(key)
        .or_else(|| key.parse::<usize>().ok().and_then(|n| n.checked_sub(1)))
        .ok_or_else(invalid)?;
    let value = value.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok((index, value))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), PortfolioError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
