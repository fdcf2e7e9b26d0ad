/* src/property/level.rs */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log verbosity carried by `log_level` properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
	Fatal,
}

impl LogLevel {
	pub const ALL: [LogLevel; 6] = [
		Self::Trace,
		Self::Debug,
		Self::Info,
		Self::Warn,
		Self::Error,
		Self::Fatal,
	];

	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Trace => "TRACE",
			Self::Debug => "DEBUG",
			Self::Info => "INFO",
			Self::Warn => "WARN",
			Self::Error => "ERROR",
			Self::Fatal => "FATAL",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("unknown log level: {s}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_case_insensitive() {
		assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
		assert_eq!(" ERROR ".parse::<LogLevel>(), Ok(LogLevel::Error));
		assert!("verbose".parse::<LogLevel>().is_err());
	}
}
