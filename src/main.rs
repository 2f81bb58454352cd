mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use sharpcheck::{
    check_basic_structure, check_semantics, parse_syntax, report::write_report, tokenize,
    AnalyzerLimits, Stage,
};

use cli::{AnalyzeArgs, Cli, Commands};

fn main() -> ExitCode {
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
    {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(&cli) {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one analysis subcommand. Returns whether the input was free of
/// Error-severity diagnostics.
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let (label, args) = match &cli.command {
        Commands::Tokens(args) => ("tokens", args),
        Commands::Syntax(args) => ("syntax", args),
        Commands::Structure(args) => ("structure", args),
        Commands::Semantics(args) => ("semantics", args),
        Commands::Check(args) => ("check", args),
    };

    let limits = AnalyzerLimits::from_toml(&args.config)?;
    limits.validate()?;
    let source = fs::read_to_string(&args.file)?;

    let (body, clean) = match &cli.command {
        Commands::Tokens(_) => run_tokens(&source, &limits),
        Commands::Syntax(_) => run_syntax(&source, &limits),
        Commands::Structure(_) => run_structure(&source),
        Commands::Semantics(_) => run_semantics(&source, &limits),
        Commands::Check(_) => run_check(&source, &limits),
    };

    print!("{}", body);
    persist(args, label, &body)?;
    Ok(clean)
}

fn persist(args: &AnalyzeArgs, label: &str, body: &str) -> Result<(), std::io::Error> {
    if let Some(dir) = &args.log_dir {
        let path = write_report(dir, label, body)?;
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn run_tokens(source: &str, limits: &AnalyzerLimits) -> (String, bool) {
    let (tokens, diagnostics) = tokenize(source, limits);

    let mut body = String::from("recognized tokens:\n");
    for token in &tokens {
        body.push_str(&format!(
            "line {}: {:?} -> {}\n",
            token.line, token.kind, token.text
        ));
    }
    body.push_str(&diagnostics.render(&[Stage::Lexical]));

    (body, !diagnostics.has_errors())
}

fn run_syntax(source: &str, limits: &AnalyzerLimits) -> (String, bool) {
    let diagnostics = parse_syntax(source, limits);
    let body = diagnostics.render(&[Stage::Lexical, Stage::Syntax]);
    (body, !diagnostics.has_errors())
}

fn run_structure(source: &str) -> (String, bool) {
    let diagnostics = check_basic_structure(source);
    let body = diagnostics.render(&[Stage::Syntax, Stage::Structural]);
    (body, !diagnostics.has_errors())
}

fn run_semantics(source: &str, limits: &AnalyzerLimits) -> (String, bool) {
    let (table, diagnostics) = check_semantics(source, limits);

    let mut body = diagnostics.render(&[Stage::Semantic]);
    body.push_str("symbol table:\n");
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    for entry in entries {
        body.push_str(&format!("  {}: {}\n", entry.name, entry.declared_type));
    }

    (body, !diagnostics.has_errors())
}

fn run_check(source: &str, limits: &AnalyzerLimits) -> (String, bool) {
    let mut diagnostics = parse_syntax(source, limits);
    diagnostics.extend(check_basic_structure(source));
    let (_, semantic_diagnostics) = check_semantics(source, limits);
    diagnostics.extend(semantic_diagnostics);

    let body = diagnostics.render(&[
        Stage::Lexical,
        Stage::Syntax,
        Stage::Structural,
        Stage::Semantic,
    ]);
    (body, !diagnostics.has_errors())
}
