//! Cell scripts: one command per line
//!
//! ```text
//! # comments and blank lines are skipped
//! set A1 10
//! set B1 =A1*2
//! get B1
//! clear A1
//! size
//! values
//! texts
//! ```

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use tabula::{Position, Sheet};

/// A parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(Position, String),
    Get(Position),
    Clear(Position),
    Size,
    Values,
    Texts,
}

/// Parse one line; `None` for blank lines and comments
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let command = match name {
        "set" => {
            // Everything after the address, minus one separator, is cell text
            let rest = rest.trim_start();
            let (address, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Set(parse_address(address)?, text.to_string())
        }
        "get" => Command::Get(parse_address(rest.trim())?),
        "clear" => Command::Clear(parse_address(rest.trim())?),
        "size" | "values" | "texts" if !rest.trim().is_empty() => {
            bail!("'{}' takes no arguments", name)
        }
        "size" => Command::Size,
        "values" => Command::Values,
        "texts" => Command::Texts,
        _ => bail!("unknown command '{}'", name),
    };

    Ok(Some(command))
}

fn parse_address(address: &str) -> Result<Position> {
    if address.is_empty() {
        bail!("missing cell address");
    }
    let pos: Position = address.parse()?;
    Ok(pos)
}

/// Apply one command to the sheet, writing any output
pub fn execute<W: Write>(command: Command, sheet: &mut Sheet, out: &mut W) -> Result<()> {
    match command {
        Command::Set(pos, text) => sheet
            .set_cell(pos, text)
            .with_context(|| format!("cannot set {}", pos))?,
        Command::Get(pos) => match sheet.get_cell(pos)? {
            Some(view) => writeln!(
                out,
                "{}\t{}\t{}\t{}",
                pos,
                view.kind().as_str(),
                view.value(),
                view.text()
            )?,
            None => writeln!(out, "{}\tnone\t\t", pos)?,
        },
        Command::Clear(pos) => sheet.clear_cell(pos)?,
        Command::Size => writeln!(out, "{}", sheet.printable_size())?,
        Command::Values => sheet.render_values(out)?,
        Command::Texts => sheet.render_texts(out)?,
    }
    Ok(())
}

/// Run a whole script
///
/// Failing lines are reported on stderr and skipped, unless `strict` is set,
/// in which case the first failure stops the run. Returns the number of
/// failed lines.
pub fn run<R, W>(input: R, sheet: &mut Sheet, out: &mut W, strict: bool) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut failures = 0;

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", number))?;

        let result = match parse_line(&line) {
            Ok(Some(command)) => execute(command, sheet, out),
            Ok(None) => Ok(()),
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            if strict {
                return Err(err.context(format!("line {}", number)));
            }
            eprintln!("line {}: {:#}", number, err);
            failures += 1;
        }
    }

    log::info!("script done: {} cells, {} failed lines", sheet.len(), failures);
    Ok(failures)
}
