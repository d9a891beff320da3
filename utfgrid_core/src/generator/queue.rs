use crate::{TileDescriptor, TilePyramid};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out the tiles of a pyramid, each exactly once, to any number of workers.
///
/// The queue is an index cursor over [`TilePyramid::descriptor_at`]; taking a
/// tile holds the lock only for one increment.
pub struct TileQueue {
	pyramid: TilePyramid,
	cursor: Mutex<u64>,
	active_workers: AtomicUsize,
}

impl TileQueue {
	#[must_use]
	pub fn new(pyramid: TilePyramid) -> TileQueue {
		TileQueue {
			pyramid,
			cursor: Mutex::new(0),
			active_workers: AtomicUsize::new(0),
		}
	}

	/// Takes the next tile, or `None` once every tile has been handed out.
	pub fn next_tile(&self) -> Option<TileDescriptor> {
		let mut cursor = self.cursor.lock();
		let tile = self.pyramid.descriptor_at(*cursor)?;
		*cursor += 1;
		Some(tile)
	}

	/// Total number of tiles.
	#[must_use]
	pub fn len(&self) -> u64 {
		self.pyramid.count_tiles()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pyramid.is_empty()
	}

	/// Number of tiles handed out so far.
	#[must_use]
	pub fn taken(&self) -> u64 {
		*self.cursor.lock()
	}

	/// Registers a running worker until the returned guard is dropped.
	pub fn worker_started(&self) -> ActiveWorker<'_> {
		self.active_workers.fetch_add(1, Ordering::SeqCst);
		ActiveWorker { queue: self }
	}

	#[must_use]
	pub fn active_workers(&self) -> usize {
		self.active_workers.load(Ordering::SeqCst)
	}
}

/// Keeps a worker counted as active; see [`TileQueue::worker_started`].
pub struct ActiveWorker<'a> {
	queue: &'a TileQueue,
}

impl Drop for ActiveWorker<'_> {
	fn drop(&mut self) {
		self.queue.active_workers.fetch_sub(1, Ordering::SeqCst);
	}
}
