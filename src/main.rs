//! BlueBox — single-run Windows diagnostics report generator.
//!
//! Entry point: parses the command line, initialises structured logging,
//! runs the collection pipeline once and prints where the bundle landed.

use clap::Parser;

use bluebox::cli::Cli;
use bluebox::core::pipeline;
use bluebox::util::constants;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    tracing::info!(
        "{} v{} starting",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let options = cli.into_run_options();
    match pipeline::run_report(&options) {
        Ok(summary) => {
            if summary.error_count > 0 {
                tracing::warn!(
                    "Report generated with {} collection error(s); see the report footer for details",
                    summary.error_count
                );
            }
            println!("Report directory: {}", summary.paths.directory.display());
            println!("  JSON document: {}", summary.paths.json_path.display());
            println!("  HTML report:   {}", summary.paths.html_path.display());
            println!("  Zip archive:   {}", summary.paths.zip_path.display());
        }
        Err(e) => {
            tracing::error!("Run failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Initialise the stderr tracing subscriber.
///
/// The level comes from `RUST_LOG` when set and defaults to `info`;
/// `--quiet` forces `error` regardless of the environment.
fn init_logging(quiet: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer as _;

    let env_filter = if quiet {
        tracing_subscriber::EnvFilter::new("error")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(env_filter))
        .init();
}
