use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use testplan_runner::prelude::*;
use testplan_runner::engine::DEFAULT_LOG_DIR;

#[derive(Parser)]
#[command(name = "testplan-runner")]
#[command(about = "Run data-driven JSON test plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a test plan JSON file
    #[arg(value_name = "PLAN")]
    plan: Option<PathBuf>,

    /// Run only the test case with this ID
    #[arg(short = 'i', long)]
    test_case_id: Option<i64>,

    /// Console detail: 0 = status only, 1 = detail on failure, 2 = always
    #[arg(short, long, default_value_t = 0)]
    debug_level: u8,

    /// Run every *.json plan in this directory instead of a single file
    #[arg(long, value_name = "DIR")]
    plans_dir: Option<PathBuf>,

    /// Directory for JSON execution logs
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "testplan_runner=debug"
    } else {
        "testplan_runner=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Runner failed");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let engine = Engine::new(builtin_registry())
        .with_reporter(ConsoleReporter::new(DebugLevel::from_u8(cli.debug_level)))
        .with_log_dir(&cli.log_dir)
        .with_test_case_filter(cli.test_case_id);

    match (&cli.plan, &cli.plans_dir) {
        (Some(plan), _) => {
            if !plan.exists() {
                anyhow::bail!("Test plan file not found: {}", plan.display());
            }

            println!("Running test plan: {}\n", plan.display());
            // Step failures are reported in the summary; only infrastructure
            // failures change the exit code.
            engine.run_plan_file(plan).await?;
            Ok(())
        }
        (None, Some(dir)) => {
            if !dir.exists() {
                anyhow::bail!("Plans directory not found: {}", dir.display());
            }

            println!("Running test plans from: {}\n", dir.display());
            run_plan_directory(dir, &engine).await?;
            Ok(())
        }
        (None, None) => {
            anyhow::bail!("Provide a test plan file or --plans-dir");
        }
    }
}
