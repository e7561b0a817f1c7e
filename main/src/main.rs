mod cli;
mod config;
mod driver;
mod image_io;
mod logger;

use clap::Parser;

use cli::CliOptions;
use config::Config;

fn main() {
    let cli = CliOptions::parse();
    logger::init(cli.debug_flags.as_deref().unwrap_or(""));

    if let Err(e) = run(cli) {
        log::error!("{e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: CliOptions) -> anyhow::Result<()> {
    let config = Config::from_cli(cli)?;
    let report = driver::run(&config)?;

    match report.stabilized_at {
        Some(n) => println!("Computation completed after {n} iterations"),
        None => println!("Stopped after {} iterations", report.iterations),
    }

    Ok(())
}
