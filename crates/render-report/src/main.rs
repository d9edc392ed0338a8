use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use shared::{Completion, Config, Domain, NarrativeFormatter, OneDriveUploader, ReportMetadata, ReportMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "render-report")]
#[command(about = "Build a workshop report from a points file without the interactive form")]
struct Args {
    /// Text file with one point per line; lines that are `#` or start with `# ` are comments
    #[arg(short, long)]
    points: PathBuf,

    /// Workshop domain (number, name or slug)
    #[arg(short, long)]
    domain: String,

    /// Date of the event (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    conducted_by: Option<String>,

    #[arg(long)]
    venue: Option<String>,

    /// Report body: bullets or paragraph
    #[arg(short, long, default_value = "bullets")]
    mode: String,

    /// Directory the report is saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also upload the report to OneDrive
    #[arg(long)]
    upload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let mode = ReportMode::from_slug(&args.mode).ok_or_else(|| {
        anyhow::anyhow!("Invalid mode: {}. Use 'bullets' or 'paragraph'", args.mode)
    })?;
    let domain = Domain::parse(&args.domain)
        .ok_or_else(|| anyhow::anyhow!("Invalid domain: {}", args.domain))?;

    let today = Local::now().date_naive();
    let mut metadata = ReportMetadata::new(domain, args.date.unwrap_or(today), today);
    metadata.conducted_by = args.conducted_by;
    metadata.venue = args.venue;

    let missing = metadata.missing_fields(mode);
    if !missing.is_empty() {
        anyhow::bail!("{}", missing.join(" "));
    }

    let uploader = if args.upload {
        let uploader = OneDriveUploader::from_config(&config)?.ok_or_else(|| {
            anyhow::anyhow!("--upload needs MS_CLIENT_ID, MS_CLIENT_SECRET and MS_TENANT_ID")
        })?;
        Some(uploader)
    } else {
        None
    };

    tracing::debug!(?mode, domain = domain.name(), "rendering report");
    println!("📖 Reading points: {}", args.points.display());
    let session = shared::load_points(&args.points)?;
    println!("✓ Loaded {} points", session.len());

    println!("\n🤖 Formatting points with Groq...");
    let formatter = NarrativeFormatter::from_config(&config)?;
    let report = shared::generate_report(
        &formatter,
        &metadata,
        session.list(),
        mode,
        &config.logo_paths(),
    )
    .await
    .context("Failed to build the report document")?;

    if let Completion::Failed(e) = &report.completion {
        eprintln!("✗ Error calling Groq API: {}", e);
    }
    for failure in &report.image_failures {
        eprintln!("✗ Error adding image to document: {}", failure);
    }
    match mode {
        ReportMode::Bullets => {
            println!("✓ {} ({} bullet points)", report.title, report.bullet_count)
        }
        ReportMode::Paragraph => println!("✓ {}", report.title),
    }

    if uploader.is_some() {
        println!("\n☁️  Saving and uploading to OneDrive...");
    }
    let outcome = shared::publish(
        report.bytes,
        &report.filename,
        args.output_dir.as_deref(),
        uploader.as_ref(),
    )
    .await;

    let saved = outcome.download.is_ok();
    match outcome.download {
        Ok(download) => println!("\n✅ Report saved to: {}", download.path.display()),
        Err(e) => eprintln!("\n✗ {:#}", e),
    }
    match outcome.upload {
        Some(Ok(())) => println!("✅ File uploaded successfully!"),
        Some(Err(e)) => eprintln!("✗ {}", e),
        None => {}
    }

    if !saved {
        anyhow::bail!("Report was not saved locally");
    }
    Ok(())
}
