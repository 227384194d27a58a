//! Error taxonomy shared by the parser, the menu and the report sinks.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
	#[error("input file '{}' not found", path.display())]
	MissingFile { path: PathBuf },
	#[error("malformed record on line {line}: {reason}")]
	MalformedRecord { line: u64, reason: String },
	/// Recovered by the menu, which re-prompts without changing state.
	#[error("invalid menu choice '{0}'")]
	InvalidMenuChoice(String),
	#[error("i/o error: {0}")]
	Io(#[from] io::Error),
	#[error("failed to read delimited input: {0}")]
	Csv(#[from] csv::Error),
}
