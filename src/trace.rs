//! Trace line formatting. Each line is
//! `     {time:5.3f}   {module:22}{event}[ args…]`, written to the
//! model's output sink — not through `log`, since this is the program's
//! primary stdout output rather than a log record.

use std::io::{self, Write};

pub const PROCEDURAL: &str = "PROCEDURAL";
pub const DECLARATIVE: &str = "DECLARATIVE";
pub const GOAL: &str = "GOAL";
pub const NONE: &str = "------";

/// Format and write one trace line.
pub fn emit(out: &mut dyn Write, time: f64, module: &str, event: &str) -> io::Result<()> {
    writeln!(out, "     {:5.3}   {:<22} {}", time, module, event)
}

/// The final two lines of a run: run-final-time to one decimal, then a
/// line with the literal `47`.
pub fn emit_final(out: &mut dyn Write, final_time: f64) -> io::Result<()> {
    writeln!(out, "{:.1}", final_time)?;
    writeln!(out, "47")
}

/// `CombinedLogger` init for `log`/`simplelog` diagnostics (model
/// errors, warnings, unimplemented-feature notices) — distinct from the
/// trace stream above.
pub fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let unix_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{unix_time}.log"))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Warn,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])
        .map_err(|e| anyhow::anyhow!("failed to initialize logger: {e}"))
}
