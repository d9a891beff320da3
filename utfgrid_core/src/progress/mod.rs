//! Terminal progress bar shared by the workers of a generation run.
//!
//! ```
//! use utfgrid_core::progress::ProgressBar;
//!
//! let progress = ProgressBar::hidden("tiles", 100);
//! progress.inc(10);
//! assert_eq!(progress.position(), 10);
//! progress.finish();
//! ```

mod render;

use parking_lot::Mutex;
use render::{Snapshot, render_line};
use std::{
	io::{self, Write},
	sync::Arc,
	time::{Duration, Instant},
};

const REDRAW_INTERVAL: Duration = Duration::from_millis(500);

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	start: Instant,
	last_draw: Option<Instant>,
	visible: bool,
}

impl Inner {
	fn redraw(&mut self, force: bool) {
		if !self.visible {
			return;
		}
		if !force && self.last_draw.is_some_and(|last| last.elapsed() < REDRAW_INTERVAL) {
			return;
		}
		self.last_draw = Some(Instant::now());

		let snapshot = Snapshot {
			message: &self.message,
			pos: self.pos,
			len: self.len,
			elapsed: self.start.elapsed(),
		};
		let line = render_line(&snapshot, terminal_width());
		let mut stderr = io::stderr().lock();
		// best effort
		let _ = write!(stderr, "\r\x1b[2K{line}");
		let _ = stderr.flush();
	}
}

/// A cloneable, thread-safe progress bar drawn on stderr.
///
/// Redraws are throttled to one every 500 ms. A hidden bar keeps counting
/// but never draws.
#[derive(Clone)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
}

impl ProgressBar {
	/// A bar drawn on stderr.
	#[must_use]
	pub fn new(message: &str, len: u64) -> ProgressBar {
		let progress = ProgressBar::build(message, len, true);
		progress.inner.lock().redraw(true);
		progress
	}

	/// A bar that only counts, for tests and quiet runs.
	#[must_use]
	pub fn hidden(message: &str, len: u64) -> ProgressBar {
		ProgressBar::build(message, len, false)
	}

	fn build(message: &str, len: u64, visible: bool) -> ProgressBar {
		ProgressBar {
			inner: Arc::new(Mutex::new(Inner {
				message: message.to_string(),
				len,
				pos: 0,
				start: Instant::now(),
				last_draw: None,
				visible,
			})),
		}
	}

	pub fn inc(&self, value: u64) {
		let mut inner = self.inner.lock();
		inner.pos = inner.pos.saturating_add(value).min(inner.len);
		inner.redraw(false);
	}

	#[must_use]
	pub fn position(&self) -> u64 {
		self.inner.lock().pos
	}

	/// Draws the final state and moves to the next line.
	pub fn finish(&self) {
		let mut inner = self.inner.lock();
		inner.redraw(true);
		if inner.visible {
			let _ = io::stderr().write_all(b"\n");
		}
	}
}

fn terminal_width() -> usize {
	terminal_size::terminal_size().map_or(80, |(width, _)| usize::from(width.0).max(20))
}
