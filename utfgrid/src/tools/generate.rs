use anyhow::{Result, ensure};
use std::{io::Write, path::PathBuf};
use utfgrid_core::{
	GeoExtent, ZoomLevels,
	generator::{GenerationConfig, GenerationReport, generate, parse_field_list},
	map::MapDocumentOpener,
	output::TileCompression,
};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// map document (YAML) listing the layers to identify
	#[arg()]
	map: PathBuf,

	/// directory that receives the tiles as {level}/{col}/{row}.grid.json
	#[arg()]
	destination: PathBuf,

	/// zoom levels, e.g. "0-19" or "3,5-7"
	#[arg(long, short, value_name = "LEVELS", default_value = "0-19", display_order = 1)]
	levels: ZoomLevels,

	/// only generate tiles inside this extent (Web Mercator meters) instead of the map's extent
	#[arg(long, short, value_name = "xmin,ymin,xmax,ymax", allow_hyphen_values = true, display_order = 1)]
	extent: Option<GeoExtent>,

	/// only keep these attributes, comma separated
	#[arg(long, short, value_name = "a,b,...", display_order = 2)]
	fields: Option<String>,

	/// number of worker threads [default: number of processors]
	#[arg(long, short, value_name = "int", display_order = 3)]
	workers: Option<usize>,

	/// compress tiles with gzip, same as --compress gzip
	#[arg(long, short = 'z', conflicts_with = "compress", display_order = 4)]
	gzip: bool,

	/// compression of the tile files
	#[arg(long, short, value_enum, display_order = 4)]
	compress: Option<TileCompression>,

	/// replace tiles that already exist
	#[arg(long, display_order = 4)]
	overwrite: bool,
}

pub fn run(arguments: &Subcommand, show_progress: bool) -> Result<()> {
	log::info!("generate UTFGrid tiles from {:?} into {:?}", arguments.map, arguments.destination);

	let config = build_config(arguments, show_progress);
	let opener = MapDocumentOpener::new(&arguments.map);
	let report = generate(&opener, &config)?;

	print_summary(&mut std::io::stderr(), &report, show_progress)?;
	ensure!(report.is_success(), "{} of {} tiles failed", report.failed, report.tiles);

	Ok(())
}

/// Writes the report unless output is silenced; failures are still returned as an error.
fn print_summary(out: &mut impl Write, report: &GenerationReport, show: bool) -> Result<()> {
	if show {
		writeln!(out, "{report}")?;
	}
	Ok(())
}

fn build_config(arguments: &Subcommand, show_progress: bool) -> GenerationConfig {
	let mut config = GenerationConfig::new(&arguments.destination);
	config.levels = arguments.levels.clone();
	config.extent = arguments.extent;
	config.fields = arguments.fields.as_deref().map(parse_field_list);
	config.overwrite = arguments.overwrite;
	config.progress = show_progress;
	config.compression = if arguments.gzip {
		TileCompression::Gzip
	} else {
		arguments.compress.unwrap_or_default()
	};
	if let Some(workers) = arguments.workers {
		config.workers = workers;
	}
	config
}
