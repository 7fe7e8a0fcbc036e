//! The `isactr` executable: wires the CLI, loader, and dispatcher
//! together. Grounded in `isactr.cpp`'s `main`/`isactr_process_stream`
//! (startup banner, argv echo, version line, final trace lines).

use clap::Parser;
use isactr::cli::Cli;
use isactr::model::Model;
use isactr::{loader, trace};

fn main() -> anyhow::Result<()> {
    trace::init_logging()?;
    let cli = Cli::parse();

    println!("Hello, humans!");
    for (i, input) in cli.inputs.iter().enumerate() {
        println!("argv[{}] = '{input}'", i + 1);
    }

    let source = match cli.read_source() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.raw_os_error().unwrap_or(1));
        }
    };

    println!("Industrial Strength isactr {}", env!("CARGO_PKG_VERSION"));

    let mut model = Model::new(Box::new(std::io::stdout()));
    loader::load(&mut model, &source);
    if let Some(duration) = cli.run {
        model.run(duration);
    }

    let mut stdout = std::io::stdout();
    trace::emit_final(&mut stdout, model.time)?;
    Ok(())
}
