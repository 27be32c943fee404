//! External kernel generator invocation.

use std::io::Write;
use std::process::Command;

use snafu::{ResultExt, ensure};
use tempfile::NamedTempFile;

use crate::error::*;

/// Matrix Market coordinate text for a structural-nonzero list, 1-indexed.
pub fn matrix_market(rows: usize, cols: usize, entries: &[(usize, usize)]) -> String {
    let mut text = String::from("%%MatrixMarket matrix coordinate real general\n%\n");
    text.push_str(&format!("{rows} {cols} {}\n", entries.len()));
    for (r, c) in entries {
        text.push_str(&format!("{} {} 1.0\n", r + 1, c + 1));
    }
    text
}

/// Write a Matrix Market file that lives as long as the returned handle.
pub fn write_matrix_market(rows: usize, cols: usize, entries: &[(usize, usize)]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("logemm-")
        .suffix(".mtx")
        .tempfile()
        .context(IoSnafu { path: std::env::temp_dir() })?;
    file.write_all(matrix_market(rows, cols, entries).as_bytes()).context(IoSnafu { path: file.path() })?;
    file.flush().context(IoSnafu { path: file.path() })?;
    Ok(file)
}

/// Run `args[0]` with the remaining arguments and wait for it.
///
/// There is no timeout; a hanging generator hangs the caller.
pub fn run_tool(args: &[String]) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        return ToolFailedSnafu { command: "", status: "empty command line", stderr: "" }.fail();
    };

    tracing::debug!(tool.command = %command, tool.args = %rest.join(" "), "spawning kernel generator");
    let output = Command::new(command).args(rest).output().context(ToolNotFoundSnafu { command })?;

    ensure!(
        output.status.success(),
        ToolFailedSnafu {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    );
    Ok(())
}
