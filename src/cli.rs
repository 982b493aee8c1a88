use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::notifications::{
    parse_records, AdminLink, AdminLinkBuilder, ApplicationId, JobApplicationRecord, LogTransport,
    NotificationRenderer, NotificationService,
};
use crate::server;
use crate::telemetry::{self, LogSink};

#[derive(Parser, Debug)]
#[command(
    name = "jobs-notify",
    about = "Render and dispatch notification emails for new job applications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the staff alert for a single application
    Render(RenderArgs),
    /// Render, and optionally dispatch, every application in a CSV export
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Name shown in the summary line
    #[arg(long)]
    display_name: String,
    /// Title of the job opening
    #[arg(long)]
    job: String,
    #[arg(long)]
    salutation: Option<String>,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    cover_letter: String,
    /// Explicit admin URL; built from JOBS_ADMIN_BASE_URL when omitted
    #[arg(long)]
    admin_link: Option<String>,
    #[arg(long)]
    application_id: Option<String>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// CSV export with one application per row
    #[arg(long)]
    csv: PathBuf,
    /// Print bodies without handing them to the transport
    #[arg(long)]
    dry_run: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Render(args) => run_render(args),
        Command::Batch(args) => run_batch(args),
    }
}

fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let record = JobApplicationRecord {
        application_id: args.application_id.map(ApplicationId),
        applicant_display_name: args.display_name,
        job_opening_title: args.job,
        salutation: args.salutation,
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        cover_letter: args.cover_letter,
        submitted_at: None,
    };

    let admin_link = match args.admin_link {
        Some(link) => AdminLink(link),
        None => AdminLinkBuilder::new(config.notifications.admin_base_url).link_for_record(&record),
    };

    print!("{}", NotificationRenderer.render(&record, &admin_link));
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let file = File::open(&args.csv)?;
    let records = parse_records(file)?;
    info!(path = %args.csv.display(), records = records.len(), "loaded applications");

    let service = NotificationService::new(&config.notifications, Arc::new(LogTransport));
    let entries = service.process_batch(&records, args.dry_run);

    for entry in &entries {
        println!("Subject: {}", entry.subject);
        println!();
        print!("{}", entry.body);
        if let Some(error) = &entry.error {
            println!("Delivery failed: {error}");
        }
        println!();
    }

    Ok(())
}
