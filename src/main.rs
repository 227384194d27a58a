//! Program entrypoint and argument parsing.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tabular_reports::menu::{FileSink, ReportSink};
use tabular_reports::parse;
use tabular_reports::process::{self, WeekSource};

#[derive(Parser)]
/// Turns reservation and electricity meter files into text reports.
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print the reservation reports for a pipe-delimited reservation file.
	Reservations {
		/// Path to the reservation file.
		file: PathBuf,
		/// Also print every parsed record before the reports.
		#[arg(long)]
		dump: bool,
	},
	/// Print weekly per-phase consumption and production tables.
	Weekly {
		#[arg(long, default_value_t = 2025)]
		year: i32,
		/// ISO week and its reading file, as WEEK=PATH. Repeat for several weeks.
		#[arg(long = "week", required = true)]
		weeks: Vec<WeekSource>,
		/// The combined tables are also written here.
		#[arg(long, default_value = "summary.txt")]
		output: PathBuf,
	},
	/// Interactive daily, monthly and yearly energy summaries.
	Energy {
		/// Path to the hourly consumption/production/temperature file.
		file: PathBuf,
		#[arg(long, default_value_t = 2025)]
		year: i32,
		/// File the last report is saved to on request.
		#[arg(long, default_value = "report.txt")]
		report_file: PathBuf,
	},
}

fn main() -> Result<()> {
	env_logger::init();
	let args = Args::parse();

	match args.command {
		Command::Reservations { file, dump } => {
			let mut input = parse::open_input(&file)?;
			let mut output = io::stdout();
			process::run_reservations(&mut input, &mut output, dump)
		}
		Command::Weekly {
			year,
			weeks,
			output,
		} => {
			let mut stdout = BufWriter::new(io::stdout());
			let summary = process::run_weekly(year, &weeks, &mut stdout)?;
			stdout.flush()?;
			FileSink::new(output).save(&summary)?;
			Ok(())
		}
		Command::Energy {
			file,
			year,
			report_file,
		} => {
			let mut data = parse::open_input(&file)?;
			let stdin = io::stdin();
			process::run_energy_menu(
				&mut data,
				year,
				stdin.lock(),
				io::stdout(),
				FileSink::new(report_file),
			)
		}
	}
}
