use anyhow::{Context, Result};
use eventio::cli::commands::{EventsCommand, FileCommand, LimitCommand, PrintStructureCommand};
use eventio::cli::output::*;
use eventio::cli::{Cli, Command};
use eventio::{EventIoFile, IactFile, ReaderConfig, SimTelFile, SimTelOptions};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::from_args();

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", CROSS, style(format!("{:#}", e)).red());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = ReaderConfig::load(cli.config.as_deref())
        .context("Failed to load reader configuration")?;

    // Execute command
    match &cli.command {
        Command::PrintStructure(cmd) => print_structure(cmd, &config, cli.json),
        Command::PrintObjectInformation(cmd) => print_object_information(cmd, &config, cli.json),
        Command::History(cmd) => show_history(cmd, &config, cli.json),
        Command::Events(cmd) => list_events(cmd, &config, cli.json),
        Command::McEvents(cmd) => list_mc_events(cmd, &config, cli.json),
        Command::IactEvents(cmd) => list_iact_events(cmd, &config, cli.json),
    }
}

fn open_file(path: &Path, config: &ReaderConfig) -> Result<EventIoFile> {
    let spinner = config
        .progress
        .then(|| create_spinner(format!("Scanning {}", path.display())));

    let result = EventIoFile::open(path);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result.with_context(|| format!("Failed to open {}", path.display()))
}

fn print_structure(cmd: &PrintStructureCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let file = open_file(&cmd.file, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(file.objects())?);
        return Ok(());
    }

    let max_depth = cmd.max_depth.or(config.max_depth);
    for line in structure_lines(file.objects(), max_depth) {
        println!("{}", line);
    }
    Ok(())
}

fn print_object_information(cmd: &FileCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let file = open_file(&cmd.file, config)?;
    let rows = object_information(&file);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} {} ({} top level objects, {} bytes)",
        INFO,
        style(file.path()).bold(),
        style(file.len()).cyan(),
        file.size()
    );
    print!("{}", format_object_information(&rows));
    Ok(())
}

fn show_history(cmd: &FileCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let file = open_file(&cmd.file, config)?;
    let simtel = SimTelFile::from_file(file, SimTelOptions::from(config))
        .context("Failed to read run metadata")?;

    if json {
        println!("{}", serde_json::to_string_pretty(simtel.history())?);
        return Ok(());
    }

    if simtel.history().is_empty() {
        println!("{} No history found", WARN);
        return Ok(());
    }
    for entry in simtel.history() {
        println!("{}", format_history_entry(entry));
    }
    Ok(())
}

fn list_events(cmd: &EventsCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let mut options = SimTelOptions::from(config);
    if let Some(telescopes) = &cmd.telescopes {
        options.allowed_telescopes = Some(telescopes.iter().copied().collect());
    }
    if cmd.skip_calibration {
        options.skip_calibration = true;
    }

    let file = open_file(&cmd.file, config)?;
    let simtel = SimTelFile::from_file(file, options).context("Failed to read run metadata")?;

    let limit = cmd.limit.unwrap_or(usize::MAX);
    let mut summaries = Vec::new();
    for event in simtel.events().take(limit) {
        let event = event.context("Failed to assemble event")?;
        summaries.push(EventSummary::from(&event));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", format_event(summary));
    }
    println!("{} {} events", CHECK, style(summaries.len()).cyan());
    Ok(())
}

fn list_mc_events(cmd: &LimitCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let file = open_file(&cmd.file, config)?;
    let simtel = SimTelFile::from_file(file, SimTelOptions::from(config))
        .context("Failed to read run metadata")?;

    let limit = cmd.limit.unwrap_or(usize::MAX);
    let summaries: Vec<McEventSummary> = simtel
        .mc_events()
        .take(limit)
        .map(|event| McEventSummary::from(&event))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", format_mc_event(summary));
    }
    println!("{} {} MC events", CHECK, style(summaries.len()).cyan());
    Ok(())
}

fn list_iact_events(cmd: &LimitCommand, config: &ReaderConfig, json: bool) -> Result<()> {
    let file = open_file(&cmd.file, config)?;
    let mut iact = IactFile::from_file(file).context("Failed to read CORSIKA run metadata")?;

    let limit = cmd.limit.unwrap_or(usize::MAX);
    let events: Vec<_> = iact.events().take(limit).collect();
    let mut summaries = Vec::with_capacity(events.len());
    for event in &events {
        let header = iact
            .event_header(event)
            .with_context(|| format!("Failed to read header of event {}", event.event_id))?;
        summaries.push(IactEventSummary::new(event, &header));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if let Some(header) = iact.run_header() {
        println!(
            "{} run {} with {} telescopes, energy {} to {} GeV, slope {}",
            INFO,
            style(header.run_number).bold(),
            iact.n_telescopes(),
            header.energy_range.0,
            header.energy_range.1,
            header.energy_slope
        );
    }
    for summary in &summaries {
        println!("{}", format_iact_event(summary));
    }
    println!("{} {} events", CHECK, style(summaries.len()).cyan());
    Ok(())
}
