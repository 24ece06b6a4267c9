use anyhow::Result;
use std::io::Write;

use crate::resolver::ResolutionResult;

/// Render a result as a single JSON document
pub fn to_json(result: &ResolutionResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Write a result to any writer, followed by a newline
pub fn write_result<W: Write>(writer: &mut W, result: &ResolutionResult, pretty: bool) -> Result<()> {
    writeln!(writer, "{}", to_json(result, pretty)?)?;
    writer.flush()?;
    Ok(())
}

/// Print a result to standard output
pub fn print_to_console(result: &ResolutionResult, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    write_result(&mut stdout.lock(), result, pretty)
}
