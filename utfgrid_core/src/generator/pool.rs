//! The worker pool.
//!
//! A probe handle validates the projection and resolves the extent before any
//! thread starts. Every worker then opens its own map handle, validates it
//! again and takes tiles from the shared [`TileQueue`] until the queue is
//! drained or the run is cancelled. A tile that fails is logged and counted;
//! a worker that cannot open a valid map cancels the whole run.

use super::{GenerationConfig, GenerationReport, ReportCounters, TileOutcome, TileQueue};
use crate::{
	TileDescriptor, TilePyramid,
	grid::{encode_cells, sample_tile},
	map::{MapHandle, MapOpener, ensure_web_mercator},
	output::TileWriter,
	progress::ProgressBar,
};
use anyhow::{Context, Result, anyhow, bail};
use std::{
	path::PathBuf,
	sync::atomic::{AtomicBool, Ordering},
	thread,
};
use utfgrid_derive::context;

/// Generates all tiles of `config.levels` covering the map's extent.
///
/// Returns the report once every worker has finished. Tiles that fail are
/// counted in [`GenerationReport::failed`] without ending the run. The run
/// itself fails when the configuration is invalid, when the map is not in Web
/// Mercator, when a worker cannot open the map or when a worker panics.
#[context("Failed to generate UTFGrid tiles into {:?}", config.destination)]
pub fn generate(opener: &dyn MapOpener, config: &GenerationConfig) -> Result<GenerationReport> {
	config.check()?;

	let pyramid = {
		let map = open_validated(opener)?;
		let extent = match config.extent {
			Some(extent) => extent,
			None => map.full_extent().context("Failed to determine the map extent")?,
		};
		log::debug!("map has {} layers, tiling {extent:?}", map.layer_count());
		TilePyramid::new(&config.levels, &extent)
	};

	for range in pyramid.level_ranges() {
		log::debug!("{range:?}");
	}
	log::info!(
		"generating {} tiles at levels {} with {} workers into {:?}",
		pyramid.count_tiles(),
		config.levels,
		config.workers,
		config.destination
	);

	let queue = TileQueue::new(pyramid);
	let progress = if config.progress {
		ProgressBar::new("tiles", queue.len())
	} else {
		ProgressBar::hidden("tiles", queue.len())
	};
	let pool = WorkerPool {
		opener,
		config,
		queue: &queue,
		writer: TileWriter::new(&config.destination, config.compression, config.overwrite),
		counters: ReportCounters::default(),
		cancelled: AtomicBool::new(false),
		progress,
	};

	let results = pool.run();
	pool.progress.finish();
	let report = pool.counters.snapshot(queue.len());

	for result in results {
		result?;
	}
	if pool.cancelled.load(Ordering::SeqCst) {
		bail!("generation was cancelled after {} tiles", report.visited());
	}
	if report.failed > 0 {
		log::warn!("{} tiles failed", report.failed);
	}
	log::info!("{report}");
	Ok(report)
}

fn open_validated(opener: &dyn MapOpener) -> Result<Box<dyn MapHandle>> {
	let map = opener.open_map().context("Failed to open map")?;
	ensure_web_mercator(map.as_ref())?;
	Ok(map)
}

struct WorkerPool<'a> {
	opener: &'a dyn MapOpener,
	config: &'a GenerationConfig,
	queue: &'a TileQueue,
	writer: TileWriter,
	counters: ReportCounters,
	cancelled: AtomicBool,
	progress: ProgressBar,
}

impl WorkerPool<'_> {
	/// Runs all workers to completion, one result per worker.
	fn run(&self) -> Vec<Result<()>> {
		thread::scope(|scope| {
			let mut handles = Vec::with_capacity(self.config.workers);
			let mut results = Vec::new();
			for index in 0..self.config.workers {
				let spawned = thread::Builder::new()
					.name(format!("worker-{index}"))
					.spawn_scoped(scope, move || self.run_worker());
				match spawned {
					Ok(handle) => handles.push(handle),
					Err(err) => {
						self.cancel();
						results.push(Err(anyhow!(err).context(format!("Failed to spawn worker {index}"))));
						break;
					}
				}
			}
			for handle in handles {
				results.push(
					handle
						.join()
						.unwrap_or_else(|_| Err(anyhow!("worker thread panicked"))),
				);
			}
			results
		})
	}

	fn run_worker(&self) -> Result<()> {
		let _active = self.queue.worker_started();
		let name = thread::current().name().unwrap_or("worker").to_string();

		let map = match open_validated(self.opener) {
			Ok(map) => map,
			Err(err) => {
				log::error!("{name}: {err:#}");
				self.cancel();
				return Err(err.context(format!("{name} could not start")));
			}
		};
		log::debug!("{name} started");

		let mut processed = 0u64;
		while !self.cancelled.load(Ordering::SeqCst) {
			let Some(tile) = self.queue.next_tile() else {
				break;
			};
			let outcome = self.process_tile(map.as_ref(), &tile);
			self.counters.record(outcome);
			self.progress.inc(1);
			processed += 1;
		}

		if self.cancelled.load(Ordering::SeqCst) {
			log::debug!("{name} stopped after {processed} tiles, the run was cancelled");
		} else {
			log::debug!("{name} finished after {processed} tiles");
		}
		Ok(())
	}

	fn process_tile(&self, map: &dyn MapHandle, tile: &TileDescriptor) -> TileOutcome {
		if !self.writer.needs_writing(tile) {
			log::debug!("{tile:?} already present, skipping");
			return TileOutcome::Skipped;
		}
		match self.render_tile(map, tile) {
			Ok(Some(path)) => {
				log::trace!("{tile:?} written to {path:?}");
				TileOutcome::Written
			}
			Ok(None) => {
				log::trace!("{tile:?} has no data");
				TileOutcome::Empty
			}
			Err(err) => {
				log::error!("{err:#}");
				TileOutcome::Failed
			}
		}
	}

	#[context("Failed to render {:?}", tile)]
	fn render_tile(&self, map: &dyn MapHandle, tile: &TileDescriptor) -> Result<Option<PathBuf>> {
		let cells = sample_tile(map, &tile.extent, self.config.fields.as_ref());
		let Some(encoded) = encode_cells(&cells)? else {
			return Ok(None);
		};
		Ok(Some(self.writer.write(tile, &encoded)?))
	}

	fn cancel(&self) {
		if !self.cancelled.swap(true, Ordering::SeqCst) {
			log::warn!("cancelling generation, {} workers still active", self.queue.active_workers());
		}
	}
}
