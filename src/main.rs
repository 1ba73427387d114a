//! Gridseek - find/replace and selection statistics for spreadsheets

mod config;
mod console;
mod error;

use error::CliError;
use gridseek_core::{Document, EditorSession, FindCommand, FindOutcome, SelectionRange};
use std::env;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!("Usage: gridseek [OPTIONS] FILE");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  FILE                      Spreadsheet file (.grd or .csv)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --search <TEXT>       List cells containing TEXT (case-insensitive)");
    eprintln!("  -r, --replace <TEXT>      Replace the first match with TEXT");
    eprintln!("  -a, --all                 With --replace, replace every match");
    eprintln!("      --stats <RANGE>       Print count/sum/average for RANGE (e.g. A1:B5)");
    eprintln!("  -o, --output <FILE>       Write the result here instead of FILE");
    eprintln!("  -c, --config <FILE>       Load config from FILE");
    eprintln!("  -i, --interactive         Read commands from stdin");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without --search or --stats, commands are read from stdin.");
    eprintln!("Set GRIDSEEK_LOG (e.g. GRIDSEEK_LOG=debug) to see log output.");
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    file: PathBuf,
    search: Option<String>,
    replace: Option<String>,
    all: bool,
    stats: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    interactive: bool,
}

impl CliArgs {
    fn is_batch(&self) -> bool {
        !self.interactive && (self.search.is_some() || self.stats.is_some())
    }
}

fn take_value(args: &[String], i: &mut usize, name: &str) -> error::Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", name)))
}

/// Parse arguments (without the program name). `Ok(None)` means help was
/// requested.
fn parse_args(args: &[String]) -> error::Result<Option<CliArgs>> {
    let mut parsed = CliArgs::default();
    let mut file: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--search" => parsed.search = Some(take_value(args, &mut i, "--search")?),
            "-r" | "--replace" => parsed.replace = Some(take_value(args, &mut i, "--replace")?),
            "-a" | "--all" => parsed.all = true,
            "--stats" => parsed.stats = Some(take_value(args, &mut i, "--stats")?),
            "-o" | "--output" => {
                parsed.output = Some(PathBuf::from(take_value(args, &mut i, "--output")?))
            }
            "-c" | "--config" => {
                parsed.config = Some(PathBuf::from(take_value(args, &mut i, "--config")?))
            }
            "-i" | "--interactive" => parsed.interactive = true,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(CliError::Usage(format!("Unknown option: {}", arg)));
            }
            arg => {
                if file.is_some() {
                    return Err(CliError::Usage(format!("Unexpected argument: {}", arg)));
                }
                file = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    parsed.file = file.ok_or_else(|| CliError::Usage("missing FILE".to_string()))?;
    if parsed.replace.is_some() && parsed.search.is_none() {
        return Err(CliError::Usage("--replace requires --search".to_string()));
    }
    if parsed.all && parsed.replace.is_none() {
        return Err(CliError::Usage("--all requires --replace".to_string()));
    }
    Ok(Some(parsed))
}

fn init_logging(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_env("GRIDSEEK_LOG")
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Search, replace and stats without a console. Returns whether the
/// document was modified.
fn run_batch(session: &mut EditorSession, args: &CliArgs) -> anyhow::Result<bool> {
    let mut modified = false;

    if let Some(term) = args.search.as_ref() {
        session.dispatch(FindCommand::ToggleVisibility);
        session.dispatch(FindCommand::SetSearchTerm(term.clone()));

        match args.replace.as_ref() {
            None => {
                for cell_ref in session.find().matches() {
                    println!("{}\t{}", cell_ref, session.document.get_cell_display(cell_ref));
                }
                eprintln!("{}", console::panel_status(session));
            }
            Some(replacement) => {
                session.dispatch(FindCommand::SetReplaceTerm(replacement.clone()));
                let command = if args.all {
                    FindCommand::ReplaceAll
                } else {
                    FindCommand::ReplaceCurrent
                };
                match session.dispatch(command) {
                    FindOutcome::Replaced { cell, .. } => {
                        println!("{}\t{}", cell, session.document.get_cell_display(&cell));
                        modified = true;
                    }
                    FindOutcome::ReplacedAll { replaced, skipped } => {
                        for cell_ref in &replaced {
                            println!("{}\t{}", cell_ref, session.document.get_cell_display(cell_ref));
                        }
                        for rejection in &skipped {
                            eprintln!("Warning: skipped {}", rejection);
                        }
                        modified = !replaced.is_empty();
                    }
                    FindOutcome::Rejected(rejection) => {
                        eprintln!("Warning: refused {}", rejection);
                    }
                    _ => eprintln!("No matches for '{}'", term),
                }
            }
        }
    }

    if let Some(range_text) = args.stats.as_ref() {
        let range = SelectionRange::parse(range_text)
            .ok_or_else(|| CliError::InvalidRange(range_text.clone()))?;
        session.select_range(range);
        let summary = session
            .aggregate()
            .ok_or_else(|| CliError::SingleCell(range_text.clone()))?;
        println!("{}", summary.status_text());
    }

    Ok(modified)
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let (config, warnings) = config::load_config(args.config.as_deref());
    init_logging(config.log_filter.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if args.is_batch() && !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }
    let document = Document::with_file(Some(args.file.clone()))?;
    let mut session = EditorSession::new(document);

    if args.is_batch() {
        let modified = run_batch(&mut session, &args)?;
        if let Some(output) = args.output.as_ref() {
            session.document.save_as(output)?;
            eprintln!("Wrote {}", output.display());
        } else if modified {
            let path = session.document.save_file()?;
            eprintln!("Wrote {}", path.display());
        }
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        console::run(
            &mut session,
            &config.keys,
            stdin.lock(),
            BufWriter::new(stdout.lock()),
        )?;
        if let Some(output) = args.output.as_ref() {
            session.document.save_as(output)?;
            eprintln!("Wrote {}", output.display());
        }
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
