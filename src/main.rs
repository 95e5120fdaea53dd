use clap::Parser;
use curopt::app::{App, RunOptions};
use curopt::config::Config;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "curopt",
    version,
    about = "Curation signal allocation optimizer for The Graph"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// GRT budget to allocate. Falls back to the wallet balance.
    #[arg(long, required_unless_present = "wallet")]
    budget: Option<f64>,

    /// Wallet address; its positions shape the run and, without --budget,
    /// its balance becomes the budget.
    #[arg(long)]
    wallet: Option<String>,

    /// Use fixed increments instead of adaptive step halving.
    #[arg(long)]
    fixed_step: bool,

    /// Number of opportunity rows to print.
    #[arg(long, default_value_t = 20)]
    top: usize,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("curopt starting");

    let options = RunOptions {
        budget: cli.budget,
        wallet: cli.wallet,
        fixed_step: cli.fixed_step,
        top: cli.top,
    };

    if let Err(e) = App::run(config, options).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("curopt finished");
}
