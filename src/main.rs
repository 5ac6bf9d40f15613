//! EDAPI command-line entry point.
//!
//! Fetches the commander profile (or loads a captured one), then either
//! inspects/exports it or runs the reconciliation pipeline against the
//! local trading database and the EDDN.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use edapi::config::AppConfig;
use edapi::export;
use edapi::pipeline::{Pipeline, RunOutcome, RunReport};
use edapi::profile::Profile;
use edapi::prompt::TerminalPrompt;
use edapi::publish::eddn::EddnPublisher;
use edapi::report;
use edapi::session::CompanionSession;
use edapi::storage::sqlite::SqliteStore;

#[derive(Debug, Parser)]
#[command(name = "edapi", version, about = "EDAPI: Elite Dangerous companion API tool")]
struct Cli {
    /// Verbose logging; EDDN uploads go to the test schemas.
    #[arg(long)]
    debug: bool,

    /// Configuration file. Missing is fine.
    #[arg(long, default_value = "config.toml", value_name = "FILE")]
    config: PathBuf,

    /// Base file name for the cookie and vars files.
    #[arg(long)]
    basename: Option<String>,

    /// Write <basename>.vars with TDFROM, TDCREDITS and TDCAPACITY.
    #[arg(long)]
    vars: bool,

    /// Read the profile from a JSON file instead of the companion service.
    #[arg(long = "import", value_name = "FILE")]
    import: Option<PathBuf>,

    /// Write the raw profile as JSON and exit.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Publish market, shipyard and outfitting to the EDDN.
    #[arg(long)]
    eddn: bool,

    /// Show the raw profile below these keys and exit.
    #[arg(long, num_args = 0.., value_name = "KEY")]
    keys: Option<Vec<String>>,

    /// With --keys, print the whole subtree instead of key names.
    #[arg(long, requires = "keys")]
    tree: bool,

    /// Upload to the EDDN under a hash of the commander name.
    #[arg(long)]
    hash: bool,

    /// Discard saved cookies and log in again.
    #[arg(long)]
    login: bool,

    /// Trading database URL, e.g. sqlite://data/TradeDangerous.db
    #[arg(long, value_name = "URL")]
    store: Option<String>,

    /// Also write the market as a .prices import file.
    #[arg(long, value_name = "FILE")]
    prices_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    if let Some(basename) = &cli.basename {
        cfg.files.basename = basename.clone();
    }
    if let Some(url) = &cli.store {
        cfg.store.database_url = Some(url.clone());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        debug = cli.debug,
        import = ?cli.import,
        "EDAPI starting"
    );

    let prompt = TerminalPrompt;

    // -- Profile -----------------------------------------------------------

    let profile = match &cli.import {
        Some(path) => {
            info!(path = %path.display(), "Loading profile from file");
            Profile::from_file(path)?
        }
        None => {
            let mut session = CompanionSession::new(&cfg.companion, cfg.files.cookie_path())?;
            if cli.login {
                session.clear_cookies()?;
            }
            session.fetch_profile(&prompt).await?
        }
    };

    // -- Inspection modes --------------------------------------------------

    if let Some(path) = &cli.export {
        export::export_profile(&profile, path)?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(keys) = &cli.keys {
        println!("{}->", keys.join("->"));
        return match export::walk_keys(profile.raw(), keys) {
            Ok(value) => {
                println!("{}", export::describe(value, cli.tree)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("key: {}", err.key);
                eprintln!("not found. Contents at previous key:");
                for key in &err.available {
                    eprintln!("  {key}");
                }
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if !profile.is_docked() {
        warn!("Commander not docked");
        eprintln!("Commander not docked. Aborting!");
        return Ok(ExitCode::from(1));
    }

    print!("{}", report::profile_summary(&profile));

    if cli.vars {
        let path = cfg.files.vars_path();
        println!("Writing {}...", path.display());
        export::write_env_file(&profile, &path)?;
    }

    // -- Pipeline ----------------------------------------------------------

    let store = match &cfg.store.database_url {
        Some(url) => Some(SqliteStore::connect(url, cfg.store.export_dir.clone()).await?),
        None => None,
    };
    let publisher = if cli.eddn {
        Some(EddnPublisher::new(
            &cfg.eddn,
            profile.commander_name()?,
            cli.hash,
            cli.debug,
        )?)
    } else {
        None
    };

    let mut pipeline = Pipeline::new(&prompt);
    if let Some(store) = &store {
        pipeline = pipeline.with_store(store);
    }
    if let Some(publisher) = &publisher {
        pipeline = pipeline.with_publisher(publisher);
    }
    if let Some(path) = &cli.prices_file {
        pipeline = pipeline.with_prices_file(path);
    }

    match pipeline.run(&profile).await? {
        RunOutcome::NotDocked => Ok(ExitCode::from(1)),
        RunOutcome::NoMarket(run) => {
            print_run(&run);
            warn!(station = %run.station, "No market in profile, skipped import");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Completed(run) => {
            print_run(&run);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_run(run: &RunReport) {
    if let Some(change) = run.station_change {
        println!("Station {}/{}: {change:?}", run.system, run.station);
    }
    if run.ship_vendors > 0 {
        println!("Updated {} ships in shipyard.", run.ship_vendors);
    }
    if run.imported > 0 {
        println!("Imported {} market lines.", run.imported);
    }
    print!("{}", report::delta_summary(&run.deltas));
    if let Some(path) = &run.prices_file {
        println!("Wrote {}", path.display());
    }
    for kind in &run.published {
        println!("Posted {kind} to EDDN.");
    }
}

/// Initialise the tracing subscriber.
///
/// Supports JSON output (set `EDAPI_LOG_JSON=1`) for log aggregation,
/// or human-readable output (default). `RUST_LOG` overrides the filter.
fn init_logging(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if debug { "edapi=debug" } else { "edapi=info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json_logging = std::env::var("EDAPI_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
