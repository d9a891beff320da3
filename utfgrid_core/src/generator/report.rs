use std::{
	fmt::{self, Display},
	sync::atomic::{AtomicU64, Ordering},
};

/// What happened to one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileOutcome {
	Written,
	/// The tile file already existed and overwriting was off.
	Skipped,
	/// No pixel carried data, nothing was written.
	Empty,
	Failed,
}

/// Tile counts of a finished generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
	/// Tiles in the pyramid.
	pub tiles: u64,
	pub written: u64,
	pub skipped: u64,
	pub empty: u64,
	pub failed: u64,
}

impl GenerationReport {
	/// Tiles a worker took from the queue.
	#[must_use]
	pub fn visited(&self) -> u64 {
		self.written + self.skipped + self.empty + self.failed
	}

	#[must_use]
	pub fn is_success(&self) -> bool {
		self.failed == 0
	}
}

impl Display for GenerationReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} of {} tiles visited: {} written, {} already present, {} empty, {} failed",
			self.visited(),
			self.tiles,
			self.written,
			self.skipped,
			self.empty,
			self.failed
		)
	}
}

/// Outcome counters updated concurrently by the workers.
#[derive(Debug, Default)]
pub struct ReportCounters {
	written: AtomicU64,
	skipped: AtomicU64,
	empty: AtomicU64,
	failed: AtomicU64,
}

impl ReportCounters {
	pub fn record(&self, outcome: TileOutcome) {
		let counter = match outcome {
			TileOutcome::Written => &self.written,
			TileOutcome::Skipped => &self.skipped,
			TileOutcome::Empty => &self.empty,
			TileOutcome::Failed => &self.failed,
		};
		counter.fetch_add(1, Ordering::Relaxed);
	}

	#[must_use]
	pub fn snapshot(&self, tiles: u64) -> GenerationReport {
		GenerationReport {
			tiles,
			written: self.written.load(Ordering::Relaxed),
			skipped: self.skipped.load(Ordering::Relaxed),
			empty: self.empty.load(Ordering::Relaxed),
			failed: self.failed.load(Ordering::Relaxed),
		}
	}
}
