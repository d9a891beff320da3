//! Formatting of a single progress line.

use std::time::Duration;

const PARTIALS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// A snapshot of the progress state to render.
pub struct Snapshot<'a> {
	pub message: &'a str,
	pub pos: u64,
	pub len: u64,
	pub elapsed: Duration,
}

/// Renders `{message}▕{bar}▏{pos}/{len} ({percent}%) {rate} {eta}` for a
/// terminal `width` characters wide.
pub fn render_line(snapshot: &Snapshot, width: usize) -> String {
	let len = snapshot.len.max(1);
	let pos = snapshot.pos.min(len);
	let seconds = snapshot.elapsed.as_secs_f64();
	let per_sec = if seconds > 0.0 { pos as f64 / seconds } else { 0.0 };
	let eta = if pos > 0 {
		seconds * (len - pos) as f64 / pos as f64
	} else {
		0.0
	};
	let percent = (pos as f64 * 100.0 / len as f64).floor() as u64;

	let line = |bar: &str| {
		format!(
			"{}▕{bar}▏{pos}/{len} ({percent:>3}%) {:>7} {:>5}",
			snapshot.message,
			format_rate(per_sec),
			format_eta(Duration::from_secs_f64(eta))
		)
	};

	let decoration = line("").chars().count();
	let bar_width = width.saturating_sub(decoration).max(10);
	line(&make_bar(pos, len, bar_width))
}

/// A bar of `width` characters with eighth-block precision.
pub fn make_bar(pos: u64, len: u64, width: usize) -> String {
	let fraction = (pos as f64 / len.max(1) as f64).clamp(0.0, 1.0);
	let eighths = (fraction * width as f64 * 8.0).floor() as usize;
	let full = (eighths / 8).min(width);

	let mut bar = "█".repeat(full);
	if full < width {
		bar.push(PARTIALS[eighths % 8]);
		bar.push_str(&" ".repeat(width - full - 1));
	}
	bar
}

pub fn format_rate(per_sec: f64) -> String {
	if !per_sec.is_finite() {
		return String::from("--/s");
	}
	let abs = per_sec.abs();
	let number = if abs >= 1e9 {
		format!("{:.1}G", per_sec / 1e9)
	} else if abs >= 1e6 {
		format!("{:.1}M", per_sec / 1e6)
	} else if abs >= 1e3 {
		format!("{:.1}k", per_sec / 1e3)
	} else {
		format!("{per_sec:.0}")
	};
	number + "/s"
}

pub fn format_eta(duration: Duration) -> String {
	let total = duration.as_secs();
	let (days, hours, minutes, seconds) = (total / 86_400, (total % 86_400) / 3_600, (total % 3_600) / 60, total % 60);
	if total < 60 {
		format!("{seconds}s")
	} else if total < 3_600 {
		format!("{minutes:02}:{seconds:02}")
	} else if total < 86_400 {
		format!("{hours}:{minutes:02}:{seconds:02}")
	} else {
		format!("{days}d{hours:02}h")
	}
}
