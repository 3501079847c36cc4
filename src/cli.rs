//! Command-line options and the stderr logger

use crate::driver::Options;
use clap::Parser as ClapParser;
use crossterm::style::Stylize;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::path::PathBuf;

/// Parse and resolve a Pym program
#[derive(ClapParser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pymc", version, about)]
pub struct Cli {
    /// Source file to compile
    #[arg(value_name = "FILE", required_unless_present = "eval", conflicts_with = "eval")]
    pub file: Option<PathBuf>,

    /// Compile SOURCE given on the command line instead of a file
    #[arg(short, long, value_name = "SOURCE")]
    pub eval: Option<String>,

    /// Print the token stream
    #[arg(long)]
    pub dump_tokens: bool,

    /// Print the syntax tree
    #[arg(long)]
    pub dump_ast: bool,

    /// Print the scope tree and symbols
    #[arg(long)]
    pub dump_scopes: bool,

    /// Stop after parsing
    #[arg(long)]
    pub no_resolve: bool,

    /// Report every syntax error instead of stopping at the first
    #[arg(long)]
    pub recover: bool,

    /// Open the interactive viewer
    #[arg(long)]
    pub tui: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            recover: self.recover,
            resolve: !self.no_resolve,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Name used for the input in messages.
    pub fn input_name(&self) -> String {
        match &self.file {
            Some(path) => path.display().to_string(),
            None => "<eval>".to_string(),
        }
    }
}

/// Writes log records to stderr as `LEVEL target: message`.
pub struct StderrLogger {
    level: LevelFilter,
    color: bool,
}

impl StderrLogger {
    pub fn new(level: LevelFilter, color: bool) -> Self {
        StderrLogger { level, color }
    }

    fn tag(&self, level: Level) -> String {
        let tag = format!("{:>5}", level);
        if !self.color {
            return tag;
        }
        match level {
            Level::Error => tag.red().bold().to_string(),
            Level::Warn => tag.yellow().to_string(),
            Level::Info => tag.green().to_string(),
            Level::Debug => tag.blue().to_string(),
            Level::Trace => tag.dark_grey().to_string(),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} {}: {}", self.tag(record.level()), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger as the global `log` backend.
pub fn init_logger(level: LevelFilter, color: bool) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger::new(level, color)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_argument() {
        let cli = Cli::try_parse_from(["pymc", "prog.pym", "--dump-ast"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("prog.pym")));
        assert!(cli.dump_ast);
        assert_eq!(cli.options(), Options::default());
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_eval_and_flags() {
        let cli = Cli::try_parse_from(["pymc", "-e", "var x = 1", "--recover", "--no-resolve", "-vv"])
            .unwrap();
        assert_eq!(cli.eval.as_deref(), Some("var x = 1"));
        assert_eq!(cli.input_name(), "<eval>");
        assert_eq!(
            cli.options(),
            Options {
                recover: true,
                resolve: false,
            }
        );
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["pymc"]).is_err());
        assert!(Cli::try_parse_from(["pymc", "a.pym", "-e", "x"]).is_err());
    }

    #[test]
    fn test_plain_tag() {
        let logger = StderrLogger::new(LevelFilter::Info, false);
        assert_eq!(logger.tag(Level::Warn), " WARN");
        assert!(logger.enabled(&Metadata::builder().level(Level::Info).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
    }
}
