//! Reads `k <key>` / `q <lo> <hi>` commands from stdin and prints how many
//! inserted keys fall inside each queried range.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use log::{error, info};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

use rangetree::{
    command::{self, CommandError, Session},
    dump,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Range-count queries over an order-statistics red-black tree
#[derive(Parser, Debug)]
#[command(name = "rangeq")]
#[command(version)]
#[command(about = "Answers range-count queries over inserted keys")]
struct Args {
    /// Check every tree invariant after each insert and stop on the first
    /// violation
    #[arg(long)]
    verify: bool,

    /// Write a Graphviz dump of the final tree to this file
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Diagnostics printed on stderr
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(
        args.log_level.into(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("logging disabled: {err}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("rangeq: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CommandError> {
    let config = command::Config {
        verify_each_insert: args.verify,
    };
    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    let mut diag = io::stderr();

    let mut session = Session::new(stdin.lock(), config);
    let result = session.run(&mut out, &mut diag);
    writeln!(out)?;
    out.flush()?;
    let stats = result?;
    info!(
        "{} inserted, {} duplicates, {} queries, {} rejected",
        stats.inserted, stats.duplicates, stats.queries, stats.rejected
    );

    if let Some(path) = &args.dot {
        let mut file = BufWriter::new(File::create(path)?);
        dump::write_dot(session.tree(), &mut file)?;
        file.flush()?;
        info!("tree written to {}", path.display());
    }
    Ok(())
}
