//! Display formatting helpers.

/// `MM:SS`, zero-padded. Values at or past expiry render as `00:00`.
pub fn fmt_mmss(secs: u64) -> String {
	format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `HH:MM:SS` from a millisecond duration (session uptime display).
pub fn fmt_hms(ms: u64) -> String {
	let t = ms / 1000;
	format!("{:02}:{:02}:{:02}", t / 3600, (t % 3600) / 60, t % 60)
}

/// Thousands-grouped rendering for counters, e.g. `1,234,567`.
pub fn group_thousands(n: u64) -> String {
	let digits = n.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(c);
	}
	out
}
