use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use prcov::cli::{self, Cli};
use prcov::config::{Config, Settings};
use prcov::logging;

fn main() -> Result<()> {
    let cli_args = Cli::parse();

    logging::init(cli_args.verbose);
    if cli_args.verbose {
        println!("Verbose mode enabled");
    }

    if cli_args.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    if let Some(dir) = cli_args.generate_man_pages {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        clap_mangen::generate_to(Cli::command(), &dir)
            .with_context(|| format!("Failed to write man pages to {}", dir.display()))?;
        return Ok(());
    }

    let Some(command) = cli_args.command else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };

    let settings = Settings::new(cli_args.verbose, Config::load()?);
    cli::dispatch(command, &settings)
}
