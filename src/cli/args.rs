//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    bom::BomArgs, build::BuildArgs, completions::CompletionsArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "harnessviz")]
#[command(author, version, about = "Wiring harness diagrams and bills of materials")]
#[command(long_about = "Turns declarative YAML wiring harness descriptions into validated diagram graphs (GraphViz) and bills of materials.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output (repeat for debug logging)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Log level implied by -q/-v; `RUST_LOG` still overrides it
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build diagrams and BOMs from harness files
    Build(BuildArgs),

    /// Check harness files without writing anything
    Validate(ValidateArgs),

    /// Print the bill of materials
    Bom(BomArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Table output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Aligned table for the terminal
    #[default]
    Table,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["harnessviz", "-vv", "validate", "a.yml"]);
        assert_eq!(cli.global.log_level(), log::LevelFilter::Debug);

        let cli = Cli::parse_from(["harnessviz", "validate", "-q", "a.yml"]);
        assert_eq!(cli.global.log_level(), log::LevelFilter::Error);
    }
}
