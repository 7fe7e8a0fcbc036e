//! Command-line surface: input-file selection plus a small `clap`
//! derive surface for `--version` and an optional `--run` duration
//! override.

use clap::Parser;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(
    name = "isactr",
    version,
    about = "A discrete-event simulator for a small ACT-R-style cognitive architecture"
)]
pub struct Cli {
    /// Model source files. Non-option positional arguments; the last
    /// one given is loaded, the rest are ignored. With none given, the
    /// model is read from standard input.
    pub inputs: Vec<String>,

    /// Run the loaded model for this many additional seconds after the
    /// model source's own top-level `(RUN ...)` forms have executed.
    #[arg(long)]
    pub run: Option<f64>,
}

impl Cli {
    /// Open the last positional input path, or read standard input if
    /// none was given. Returns the raw `io::Error` so the caller can
    /// exit with the operating system's errno on open failure.
    pub fn read_source(&self) -> std::io::Result<String> {
        let mut contents = String::new();
        match self.inputs.last() {
            Some(path) => {
                std::fs::File::open(path)?.read_to_string(&mut contents)?;
            }
            None => {
                std::io::stdin().read_to_string(&mut contents)?;
            }
        }
        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
