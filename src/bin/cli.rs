//! GTU Result Harvester CLI
//!
//! Drives the result portal one enrollment number at a time; captcha answers
//! are typed by the operator at this terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use harvester::{
    error::Result,
    models::Config,
    store::{CsvStore, ResultStore},
    summary,
};

/// GTU Result Harvester
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Harvests per-student GTU exam results into a spreadsheet"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "harvester.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive harvest over a range of enrollment numbers
    #[cfg(feature = "browser")]
    Harvest {
        /// 12-digit starting enrollment number
        #[arg(long)]
        start: String,

        /// How many consecutive enrollment numbers to look up
        #[arg(long)]
        count: u64,

        /// Output table file (must end in .csv)
        #[arg(long, default_value = "gtu_results.csv")]
        output: PathBuf,

        /// Exam dropdown value to select before the run
        #[arg(long)]
        exam: Option<String>,
    },

    /// Append a fresh summary block to an existing result table
    Summary {
        /// Result table file
        #[arg(long, default_value = "gtu_results.csv")]
        output: PathBuf,
    },

    /// Validate the configuration file
    Validate,

    /// Show row counts for an existing result table
    Info {
        /// Result table file
        #[arg(long, default_value = "gtu_results.csv")]
        output: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        #[cfg(feature = "browser")]
        Command::Harvest {
            start,
            count,
            output,
            exam,
        } => {
            config.validate()?;
            harvest::run(config, &start, count, output, exam.as_deref()).await?;
        }

        Command::Summary { output } => {
            let store = CsvStore::new(output)?;
            match summary::append_summary(&store)? {
                Some(block) => {
                    log::info!(
                        "Appended summary block ({} students with current-term backlog)",
                        block.failed_students
                    );
                }
                None => {
                    log::error!(
                        "No result table at {}. Run a harvest first.",
                        store.path().display()
                    );
                    return Err(harvester::error::AppError::config("result table not found"));
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("All validations passed!");
        }

        Command::Info { output } => {
            let store = CsvStore::new(output)?;
            if !store.exists() {
                log::info!("No result table at {}", store.path().display());
                return Ok(());
            }
            let all = store.load_all(true)?;
            let data = all.iter().filter(|r| !r.is_summary()).count();
            log::info!("Result table: {}", store.path().display());
            log::info!("Data rows: {}", data);
            log::info!("Summary rows: {}", all.len() - data);
        }
    }

    Ok(())
}

#[cfg(feature = "browser")]
mod harvest {
    //! The interactive harvest command: browser, engine and prompt loop.

    use std::path::PathBuf;
    use std::sync::Arc;

    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio_util::sync::CancellationToken;

    use harvester::{
        captcha::{self, CaptchaOperator},
        driver::PortalBrowser,
        engine::HarvestEngine,
        error::Result,
        models::Config,
        sequence::EnrollmentSequence,
        store::CsvStore,
    };

    pub async fn run(
        config: Config,
        start: &str,
        count: u64,
        output: PathBuf,
        exam: Option<&str>,
    ) -> Result<()> {
        let config = Arc::new(config);
        let store = CsvStore::new(output)?;
        let sequence = EnrollmentSequence::from_start_key(start, count, config.harvest.key_width)?;

        let cancel = CancellationToken::new();
        let (gate, operator) = captcha::channel(cancel.clone());

        // Ctrl-C aborts the run cleanly, including a captcha wait in flight.
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received, aborting the run...");
                    cancel.cancel();
                }
            }
        });

        let prompt_task = tokio::spawn(prompt_loop(operator));

        log::info!("Launching browser...");
        let actor = PortalBrowser::open(&config).await?;

        let mut engine = HarvestEngine::new(
            Arc::clone(&config),
            actor,
            store.clone(),
            gate,
            cancel.clone(),
        );

        let run_result = engine.run(sequence, exam).await;
        cancel.cancel();
        prompt_task.abort();

        let report = run_result?;
        let report_path = store.path().with_extension("report.json");
        tokio::fs::write(&report_path, serde_json::to_vec_pretty(&report)?).await?;

        log::info!("Results written to {}", store.path().display());
        log::info!("Run report written to {}", report_path.display());
        Ok(())
    }

    /// Read captcha answers from stdin, one per pending challenge.
    ///
    /// The challenge image is dropped next to the terminal as a PNG; blank
    /// answers re-prompt without consuming the challenge.
    async fn prompt_loop(mut operator: CaptchaOperator) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(mut request) = operator.next_request().await {
            let image_path = std::env::temp_dir().join("gtu_captcha.png");
            match tokio::fs::write(&image_path, &request.image).await {
                Ok(()) => log::info!("Captcha image saved to {}", image_path.display()),
                Err(e) => log::warn!("Could not save captcha image: {}", e),
            }

            loop {
                println!("Captcha for {}: ", request.key);
                match lines.next_line().await {
                    Ok(Some(line)) => match request.answer(&line) {
                        Ok(()) => break,
                        Err(_) => log::warn!("Captcha answer is empty, try again"),
                    },
                    // stdin closed; the quit signal will unblock the engine
                    _ => return,
                }
            }
        }
    }

}
