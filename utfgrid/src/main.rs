mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Generate a UTFGrid tile pyramid from a map document
	Generate(tools::generate::Subcommand),

	/// Show the layers, extent and tile counts of a map document
	Probe(tools::probe::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	// no progress bar when silenced
	let show_progress = cli.verbose.log_level_filter() != LevelFilter::Off;
	match &cli.command {
		Commands::Generate(arguments) => tools::generate::run(arguments, show_progress),
		Commands::Probe(arguments) => tools::probe::run(arguments),
	}
}
