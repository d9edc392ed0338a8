use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use shared::{
    AddOutcome, Completion, Config, Domain, GeneratedReport, NarrativeFormatter,
    OneDriveUploader, PublishOutcome, ReportMetadata, ReportMode, ReportSession,
};
use std::io::{self as stdio, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "knowhow-report")]
#[command(about = "Collect workshop points, reword them with Groq and produce a Word report")]
struct Args {
    /// Workshop domain (number, name or slug, e.g. "Cloud Native")
    #[arg(long)]
    domain: Option<String>,

    /// Date of the event (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Who conducted the event
    #[arg(long)]
    conducted_by: Option<String>,

    /// Where the event took place
    #[arg(long)]
    venue: Option<String>,

    /// Report body: bullets or paragraph
    #[arg(short, long, default_value = "bullets")]
    mode: String,

    /// Directory the report is saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the OneDrive upload
    #[arg(long)]
    no_upload: bool,
}

/// What the user typed at the points prompt
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Point(String),
    Generate,
    Reset,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "/generate" | "/g" => Command::Generate,
            "/reset" => Command::Reset,
            "/quit" | "/q" => Command::Quit,
            _ => Command::Point(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Read one line; `None` at end of input
fn read_input(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    stdio::stdout().flush()?;

    let mut input = String::new();
    if stdio::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt_domain_selection() -> Result<Domain> {
    println!("Domain?");
    for (i, domain) in Domain::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, domain.name());
    }

    loop {
        let input = read_input(&format!("\nEnter your choice (1-{}): ", Domain::ALL.len()))?
            .ok_or_else(|| anyhow::anyhow!("No domain selected"))?;
        match Domain::parse(&input) {
            Some(domain) => return Ok(domain),
            None => println!("⚠ Invalid selection: {}", input.trim()),
        }
    }
}

fn prompt_date(today: NaiveDate) -> Result<NaiveDate> {
    loop {
        let input = read_input(&format!("Date of Event [{}]: ", today.format("%Y-%m-%d")))?
            .unwrap_or_default();
        if input.trim().is_empty() {
            return Ok(today);
        }
        match NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
            Ok(date) => return Ok(date),
            Err(_) => println!("⚠ Please use the YYYY-MM-DD format."),
        }
    }
}

/// Ask for a text field unless it was given on the command line.
/// A required field is asked again until it is non-empty.
fn prompt_field(
    label: &str,
    given: Option<String>,
    required: Option<&str>,
) -> Result<Option<String>> {
    if let Some(value) = given.filter(|v| !v.trim().is_empty()) {
        return Ok(Some(value));
    }
    loop {
        let Some(input) = read_input(label)? else {
            return Ok(None);
        };
        let value = input.trim();
        match required {
            Some(warning) if value.is_empty() => println!("⚠ {}", warning),
            _ => return Ok(Some(value.to_string()).filter(|s| !s.is_empty())),
        }
    }
}

fn show_points(session: &ReportSession) {
    for line in session.render() {
        println!("  {}", line);
    }
}

/// Handle one line at the points prompt. Returns the command for the caller to act on.
fn handle_input(session: &mut ReportSession, line: &str) -> Command {
    let command = Command::parse(line);
    match &command {
        Command::Point(text) => match session.add(text) {
            AddOutcome::Added(_) => show_points(session),
            AddOutcome::Rejected => println!("⚠ Please enter a point before adding."),
        },
        Command::Reset => {
            session.reset();
            println!("✓ Points cleared");
        }
        Command::Generate | Command::Quit => {}
    }
    command
}

/// Warnings that block generation, in the order the form reports them
fn generation_blockers(
    session: &ReportSession,
    metadata: &ReportMetadata,
    mode: ReportMode,
) -> Vec<&'static str> {
    let mut blockers = Vec::new();
    if session.is_empty() {
        blockers.push("Please add at least one point.");
    }
    blockers.extend(metadata.missing_fields(mode));
    blockers
}

fn report_publish(outcome: &PublishOutcome) {
    match &outcome.download {
        Ok(download) => println!(
            "\n📄 Download Report: {} ({})",
            download.path.display(),
            download.mime
        ),
        Err(e) => println!("\n✗ {:#}", e),
    }
    match &outcome.upload {
        Some(Ok(())) => println!("✅ File uploaded successfully!"),
        Some(Err(e)) => println!("✗ {}", e),
        None => {}
    }
}

fn report_problems(report: &GeneratedReport) {
    if let Completion::Failed(e) = &report.completion {
        println!("✗ Error calling Groq API: {}", e);
    }
    for failure in &report.image_failures {
        println!("✗ Error adding image to document: {}", failure);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(stdio::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let mode = ReportMode::from_slug(&args.mode).ok_or_else(|| {
        anyhow::anyhow!("Invalid mode: {}. Use 'bullets' or 'paragraph'", args.mode)
    })?;

    println!("Knowhow Workshop Reporting\n");

    let today = Local::now().date_naive();
    let event_date = match args.date {
        Some(date) => date,
        None => prompt_date(today)?,
    };

    let domain = if let Some(input) = args.domain {
        Domain::parse(&input)
            .ok_or_else(|| anyhow::anyhow!("Invalid domain: {}", input))?
    } else {
        prompt_domain_selection()?
    };
    println!("\n✓ Selected: {}", domain.name());

    let mut metadata = ReportMetadata::new(domain, event_date, today);
    tracing::debug!(?mode, domain = domain.name(), %event_date, "form started");
    let required = mode == ReportMode::Bullets;
    metadata.conducted_by = prompt_field(
        "Conducted By: ",
        args.conducted_by,
        required.then_some("Please enter the name of the person who conducted the event."),
    )?;
    metadata.venue = prompt_field(
        "Venue: ",
        args.venue,
        required.then_some("Please enter the venue."),
    )?;

    println!("\nBrief Points");
    println!("  Type a point and press Enter to add it.");
    println!("  /generate to build the report, /reset to clear the points, /quit to exit.\n");

    let mut session = ReportSession::new();
    loop {
        let Some(line) = read_input("Enter a point: ")? else {
            return Ok(());
        };
        match handle_input(&mut session, &line) {
            Command::Quit => return Ok(()),
            Command::Generate => {
                let blockers = generation_blockers(&session, &metadata, mode);
                if blockers.is_empty() {
                    break;
                }
                for blocker in blockers {
                    println!("⚠ {}", blocker);
                }
            }
            Command::Point(_) | Command::Reset => {}
        }
    }

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
    report_problems(&report);
    match mode {
        ReportMode::Bullets => {
            println!("✓ {} ({} bullet points)", report.title, report.bullet_count)
        }
        ReportMode::Paragraph => println!("✓ {}", report.title),
    }

    let uploader = if args.no_upload {
        None
    } else {
        let uploader = OneDriveUploader::from_config(&config)?;
        match &uploader {
            Some(_) => println!("\n☁️  Saving and uploading to OneDrive..."),
            None => println!("\n⚠ OneDrive credentials not configured, upload skipped."),
        }
        uploader
    };

    let outcome = shared::publish(
        report.bytes,
        &report.filename,
        args.output_dir.as_deref(),
        uploader.as_ref(),
    )
    .await;
    report_publish(&outcome);

    Ok(())
}
