//! Tabula CLI - run cell scripts against a sheet

mod script;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tabula::Sheet;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Run a script of cell commands against a spreadsheet")]
struct Cli {
    /// Script file (default: stdin)
    script: Option<PathBuf>,

    /// Stop at the first failing line
    #[arg(short, long)]
    strict: bool,

    /// Render the sheet after the script has run
    #[arg(short, long, value_enum)]
    print: Option<Render>,

    /// Log engine activity to stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Render {
    /// Cell values
    Values,
    /// Cell texts as entered
    Texts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut sheet = Sheet::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let failures = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            script::run(BufReader::new(file), &mut sheet, &mut out, cli.strict)?
        }
        None => script::run(io::stdin().lock(), &mut sheet, &mut out, cli.strict)?,
    };

    let rendered = match cli.print {
        Some(Render::Values) => sheet.render_values(&mut out),
        Some(Render::Texts) => sheet.render_texts(&mut out),
        None => Ok(()),
    };
    rendered.context("Failed to write to stdout")?;
    out.flush().context("Failed to write to stdout")?;

    if failures > 0 {
        eprintln!("{} line(s) failed", failures);
    }

    Ok(())
}
