use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tivo_todo::config::DEFAULT_CONFIG_PATH;
use tivo_todo::{Config, DigestError, DigestMail, DigestPipeline, Mailer, RunDates, SmtpMailer};
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "tivo-todo")]
#[command(about = "Mail a digest of new episodes airing today and tomorrow")]
struct Cli {
    /// Do everything except sending the mail
    #[arg(short = 'd', long, visible_alias = "dry-run")]
    nomail: bool,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Path to the JSON config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log per-record detail
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(e) = run(cli).await {
        error!("Run failed ({:?}): {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), DigestError> {
    let config = Config::load(&cli.config)?;

    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let dates = RunDates::new(today)
        .ok_or_else(|| DigestError::Config(format!("run date {} has no following day", today)))?;
    info!("Building digest for {} and {}", dates.today, dates.tomorrow);

    let pipeline = DigestPipeline::from_config(&config)?;
    let digest = pipeline.run(&dates).await?;
    println!("{}", digest);

    let message = DigestMail::compose(&config, &digest, &Local::now())?;
    println!("{}", String::from_utf8_lossy(&message.formatted()));

    if cli.nomail {
        info!("Not sending mail (--nomail)");
    } else {
        SmtpMailer::from_config(&config)?.send(message).await?;
    }

    info!("Done");
    Ok(())
}
