use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sharpcheck")]
#[command(about = "Analyzer for a C#-like language subset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tokenize a source file and print the recognized tokens
    Tokens(AnalyzeArgs),
    /// Parse a source file against the grammar
    Syntax(AnalyzeArgs),
    /// Run the line-oriented structural checks
    Structure(AnalyzeArgs),
    /// Run the semantic checks and print the symbol table
    Semantics(AnalyzeArgs),
    /// Run every analysis stage
    Check(AnalyzeArgs),
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Input file path
    pub file: PathBuf,

    /// Directory to persist the report into
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Analyzer limits file (defaults to analyzer.toml when present)
    #[arg(long, default_value = "analyzer.toml")]
    pub config: PathBuf,
}
