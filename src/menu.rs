//! Interactive report menu.
//!
//! A small state machine: `MainMenu -> ReportDisplayed -> AfterMenu -> {MainMenu | Exit}`. Only
//! the most recently generated report can be saved. Invalid input never changes the state, the
//! menu simply asks again. End of input is treated as a request to exit.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::aggregate::DailyClimate;
use crate::error::ReportError;
use crate::format;
use crate::report::{self, Report};

/// Destination for a saved report.
pub trait ReportSink {
	fn save(&mut self, report: &Report) -> Result<(), ReportError>;

	/// Where saved reports end up, for display in the menu.
	fn location(&self) -> String;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
	fn save(&mut self, report: &Report) -> Result<(), ReportError> {
		(**self).save(report)
	}

	fn location(&self) -> String {
		(**self).location()
	}
}

/// Saves reports to a fixed file, overwriting it each time.
pub struct FileSink {
	path: PathBuf,
}

impl FileSink {
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		Self { path: path.into() }
	}
}

impl ReportSink for FileSink {
	fn save(&mut self, report: &Report) -> Result<(), ReportError> {
		let file = File::create(&self.path)?;
		let mut buffered = BufWriter::new(file);
		report.write_to(&mut buffered)?;
		buffered.flush()?;
		log::info!(
			"Wrote {} report lines to '{}'",
			report.lines().len(),
			self.path.display()
		);
		Ok(())
	}

	fn location(&self) -> String {
		self.path.display().to_string()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
	DailyRange,
	Monthly,
	Yearly,
	Exit,
}

impl FromStr for MainChoice {
	type Err = ReportError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"1" => Ok(MainChoice::DailyRange),
			"2" => Ok(MainChoice::Monthly),
			"3" => Ok(MainChoice::Yearly),
			"4" => Ok(MainChoice::Exit),
			other => Err(ReportError::InvalidMenuChoice(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterChoice {
	Save,
	NewReport,
	Exit,
}

impl FromStr for AfterChoice {
	type Err = ReportError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"1" => Ok(AfterChoice::Save),
			"2" => Ok(AfterChoice::NewReport),
			"3" => Ok(AfterChoice::Exit),
			other => Err(ReportError::InvalidMenuChoice(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
	MainMenu,
	ReportDisplayed(Report),
	AfterMenu(Report),
	Exit,
}

pub struct Menu<'a, R, W, S> {
	daily: &'a DailyClimate,
	year: i32,
	input: R,
	output: W,
	sink: S,
}

impl<'a, R: BufRead, W: Write, S: ReportSink> Menu<'a, R, W, S> {
	pub fn new(daily: &'a DailyClimate, year: i32, input: R, output: W, sink: S) -> Self {
		Self {
			daily,
			year,
			input,
			output,
			sink,
		}
	}

	/// Run
	///
	/// Loop from the main menu until the user exits or input runs out.
	pub fn run(&mut self) -> Result<(), ReportError> {
		let mut state = MenuState::MainMenu;
		while state != MenuState::Exit {
			state = self.step(state)?;
		}
		Ok(())
	}

	/// Perform one transition out of `state`.
	pub fn step(&mut self, state: MenuState) -> Result<MenuState, ReportError> {
		match state {
			MenuState::MainMenu => self.main_menu(),
			MenuState::ReportDisplayed(report) => {
				writeln!(self.output)?;
				report.write_to(&mut self.output)?;
				Ok(MenuState::AfterMenu(report))
			}
			MenuState::AfterMenu(report) => self.after_menu(report),
			MenuState::Exit => Ok(MenuState::Exit),
		}
	}

	fn main_menu(&mut self) -> Result<MenuState, ReportError> {
		writeln!(self.output)?;
		writeln!(self.output, "Choose report type:")?;
		writeln!(self.output, "1) Daily summary for a date range")?;
		writeln!(self.output, "2) Monthly summary for one month")?;
		writeln!(self.output, "3) Full year {} summary", self.year)?;
		writeln!(self.output, "4) Exit the program")?;

		let answer = match self.prompt("Choice: ")? {
			Some(answer) => answer,
			None => return Ok(MenuState::Exit),
		};
		let choice = match answer.parse::<MainChoice>() {
			Ok(choice) => choice,
			Err(err) => {
				self.reject(err)?;
				return Ok(MenuState::MainMenu);
			}
		};

		let report = match choice {
			MainChoice::DailyRange => self.daily_range_report()?,
			MainChoice::Monthly => self.monthly_report()?,
			MainChoice::Yearly => Some(report::yearly_summary(self.daily, self.year)),
			MainChoice::Exit => {
				writeln!(self.output, "Goodbye!")?;
				None
			}
		};
		Ok(report.map_or(MenuState::Exit, MenuState::ReportDisplayed))
	}

	fn after_menu(&mut self, report: Report) -> Result<MenuState, ReportError> {
		writeln!(self.output)?;
		writeln!(self.output, "What would you like to do next?")?;
		writeln!(
			self.output,
			"1) Write the report to the file {}",
			self.sink.location()
		)?;
		writeln!(self.output, "2) Create a new report")?;
		writeln!(self.output, "3) Exit")?;

		let answer = match self.prompt("Choice: ")? {
			Some(answer) => answer,
			None => return Ok(MenuState::Exit),
		};
		match answer.parse::<AfterChoice>() {
			Ok(AfterChoice::Save) => {
				self.sink.save(&report)?;
				writeln!(self.output, "Saved to {}", self.sink.location())?;
				Ok(MenuState::AfterMenu(report))
			}
			Ok(AfterChoice::NewReport) => Ok(MenuState::MainMenu),
			Ok(AfterChoice::Exit) => Ok(MenuState::Exit),
			Err(err) => {
				self.reject(err)?;
				Ok(MenuState::AfterMenu(report))
			}
		}
	}

	fn daily_range_report(&mut self) -> Result<Option<Report>, ReportError> {
		let start = match self.prompt_date("Enter start date (dd.mm.yyyy): ")? {
			Some(date) => date,
			None => return Ok(None),
		};
		let end = match self.prompt_date("Enter end date (dd.mm.yyyy): ")? {
			Some(date) => date,
			None => return Ok(None),
		};
		Ok(Some(report::daily_range_summary(self.daily, start, end)))
	}

	fn monthly_report(&mut self) -> Result<Option<Report>, ReportError> {
		loop {
			let answer = match self.prompt("Enter month number (1-12): ")? {
				Some(answer) => answer,
				None => return Ok(None),
			};
			match answer.parse::<u32>() {
				Ok(month) if (1..=12).contains(&month) => {
					return Ok(Some(report::monthly_summary(self.daily, self.year, month)))
				}
				_ => {
					log::warn!("Rejected month '{}'", answer);
					writeln!(self.output, "Month must be a number from 1 to 12")?;
				}
			}
		}
	}

	fn prompt_date(&mut self, text: &str) -> Result<Option<NaiveDate>, ReportError> {
		loop {
			let answer = match self.prompt(text)? {
				Some(answer) => answer,
				None => return Ok(None),
			};
			match format::parse_date_fi(&answer) {
				Some(date) => return Ok(Some(date)),
				None => {
					log::warn!("Rejected date '{}'", answer);
					writeln!(self.output, "Invalid date, use the form dd.mm.yyyy")?;
				}
			}
		}
	}

	/// Write `text` and read one trimmed line, `None` at end of input.
	fn prompt(&mut self, text: &str) -> Result<Option<String>, ReportError> {
		write!(self.output, "{}", text)?;
		self.output.flush()?;
		let mut line = String::new();
		if self.input.read_line(&mut line)? == 0 {
			return Ok(None);
		}
		Ok(Some(line.trim().to_string()))
	}

	fn reject(&mut self, err: ReportError) -> Result<(), ReportError> {
		log::warn!("{}", err);
		writeln!(self.output, "Wrong choice!")?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::aggregate;
	use crate::parse::{read_records, RecordFormat};
	use crate::types::ClimateReading;
	use rstest::*;

	#[derive(Default)]
	struct MemorySink {
		saved: Vec<Report>,
	}

	impl ReportSink for MemorySink {
		fn save(&mut self, report: &Report) -> Result<(), ReportError> {
			self.saved.push(report.clone());
			Ok(())
		}

		fn location(&self) -> String {
			"memory.txt".to_string()
		}
	}

	#[fixture]
	fn daily() -> DailyClimate {
		let text = "timestamp;consumption;production;temperature\n\
			2025-03-01T00:00:00;1,5;0,0;-2,0\n\
			2025-03-01T01:00:00;2,5;0,5;-4,0\n\
			2025-04-02T12:00:00;1,0;3,0;3,0\n";
		let readings: Vec<ClimateReading> =
			read_records(&mut text.as_bytes(), RecordFormat::METER_READINGS).unwrap();
		aggregate::daily_climate(&readings)
	}

	/// Run a whole session, returning the console output and the saved reports.
	fn session(daily: &DailyClimate, input: &str) -> (String, Vec<Report>) {
		let mut output = Vec::new();
		let mut sink = MemorySink::default();
		Menu::new(daily, 2025, input.as_bytes(), &mut output, &mut sink)
			.run()
			.unwrap();
		(String::from_utf8(output).unwrap(), sink.saved)
	}

	#[rstest]
	#[case("9\n")]
	#[case("\n")]
	#[case("exit\n")]
	fn invalid_choice_stays_in_main_menu(daily: DailyClimate, #[case] input: &str) {
		let mut output = Vec::new();
		{
			let mut menu =
				Menu::new(&daily, 2025, input.as_bytes(), &mut output, MemorySink::default());
			let state = menu.step(MenuState::MainMenu).unwrap();
			assert_eq!(state, MenuState::MainMenu);
		}
		assert!(String::from_utf8(output).unwrap().contains("Wrong choice!"));
	}

	#[rstest]
	fn yearly_report_saved_then_exit(daily: DailyClimate) {
		let (output, saved) = session(&daily, "3\n1\n2\n4\n");
		assert!(output.contains("Report for the year 2025"));
		assert!(output.contains("Saved to memory.txt"));
		assert!(output.ends_with("Goodbye!\n"));
		assert_eq!(saved.len(), 1);
		assert_eq!(saved[0].lines()[2], "- Total consumption: 5,00 kWh");
	}

	#[rstest]
	fn only_latest_report_is_saved(daily: DailyClimate) {
		let (_, saved) = session(&daily, "3\n2\n2\n3\n1\n3\n");
		assert_eq!(saved.len(), 1);
		assert_eq!(saved[0].lines()[1], "Report for the month: March 2025");
		assert_eq!(saved[0].lines()[4], "- Average temperature: -3,00 °C");
	}

	#[rstest]
	fn bad_dates_are_asked_again(daily: DailyClimate) {
		let (output, _) = session(&daily, "1\n2025-03-01\n02.04.2025\n01.03.2025\n3\n");
		assert!(output.contains("Invalid date, use the form dd.mm.yyyy"));
		assert!(output.contains("Report for the period 01.03.2025–02.04.2025"));
		assert!(output.contains("- Total production: 3,50 kWh"));
	}

	#[rstest]
	fn bad_month_is_asked_again(daily: DailyClimate) {
		let (output, _) = session(&daily, "2\n13\nmarch\n4\n3\n");
		assert_eq!(output.matches("Month must be a number from 1 to 12").count(), 2);
		assert!(output.contains("Report for the month: April 2025"));
	}

	#[rstest]
	fn invalid_after_menu_choice_keeps_report(daily: DailyClimate) {
		let (output, saved) = session(&daily, "3\n7\n1\n3\n");
		assert!(output.contains("Wrong choice!"));
		assert_eq!(saved.len(), 1);
	}

	#[rstest]
	#[case("")]
	#[case("1\n01.03.2025\n")]
	#[case("2\n")]
	#[case("3\n")]
	fn end_of_input_exits(daily: DailyClimate, #[case] input: &str) {
		let (_, saved) = session(&daily, input);
		assert!(saved.is_empty());
	}

	#[rstest]
	fn parses_menu_choices() {
		assert_eq!("1".parse::<MainChoice>().unwrap(), MainChoice::DailyRange);
		assert_eq!(" 4 ".parse::<MainChoice>().unwrap(), MainChoice::Exit);
		assert!(matches!(
			"5".parse::<MainChoice>(),
			Err(ReportError::InvalidMenuChoice(_))
		));
		assert_eq!("2".parse::<AfterChoice>().unwrap(), AfterChoice::NewReport);
	}
}
