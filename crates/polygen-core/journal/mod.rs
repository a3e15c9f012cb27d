//! The journal is the source for configuring the generator, and for
//! tracking and reporting events that occur while a grammar is compiled.

pub mod config;
pub mod report;

pub use self::{config::Config, report::{Report, ReportType}};

use crate::types::PolygenErrorSeverity;
use std::{
  fmt::{Debug, Display},
  time::Instant,
};

/// A general structure for storing and interacting with data for
/// configuring, monitoring, and reporting purposes.
///
/// Each pipeline stage opens a report with [set_active_report]
/// (Journal::set_active_report); diagnostics accumulate in the active
/// report, and the driver refuses to advance past a stage whose report
/// holds critical errors.
#[derive(Debug)]
pub struct Journal {
  config: Config,

  reports: Vec<Report>,

  active_report: Option<Report>,

  report_sink: Report,

  create_time: Instant,
}

impl Journal {
  pub fn new(config: Option<Config>) -> Journal {
    Self {
      config:        config.unwrap_or_default(),
      reports:       Vec::new(),
      active_report: None,
      report_sink:   Default::default(),
      create_time:   Instant::now(),
    }
  }

  /// Get an immutable reference to the configuration settings.
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Sets the active report, archiving the previous one. Returns the
  /// previously active ReportType.
  pub fn set_active_report(&mut self, report_name: &str, report_type: ReportType) -> ReportType {
    let previous = self.report().report_type;

    if let Some(report) = self.active_report.take() {
      self.reports.push(report);
    }
    self.active_report = Some(Report::new(report_name.to_string(), report_type));

    previous
  }

  /// Get a mutable reference to the active report.
  pub fn report_mut(&mut self) -> &mut Report {
    self.active_report.as_mut().unwrap_or(&mut self.report_sink)
  }

  /// Get an immutable reference to the active report.
  pub fn report(&self) -> &Report {
    self.active_report.as_ref().unwrap_or(&self.report_sink)
  }

  /// Move the active report into the archive.
  pub fn flush_reports(&mut self) {
    if let Some(report) = self.active_report.take() {
      self.reports.push(report);
    }
  }

  /// True if any report, archived or active, holds an error of the given
  /// severity.
  pub fn have_errors_of_type(&self, severity: PolygenErrorSeverity) -> bool {
    self
      .reports
      .iter()
      .chain(self.active_report.iter())
      .any(|r| r.have_errors_of_type(severity))
  }

  /// Calls `closure` for each report matching `report_type`.
  pub fn get_reports<T: FnMut(&Report)>(&self, report_type: ReportType, mut closure: T) {
    for report in self.reports.iter().chain(self.active_report.iter()) {
      if report.report_type.type_matches(report_type) {
        closure(report);
      }
    }
  }

  pub fn debug_print_reports(&self, discriminant: ReportType) {
    self.get_reports(discriminant, |report| {
      eprintln!(
        "\n{:=<80}\nReport [{}] at {:?}:\n{}\n{:=<80}",
        "",
        report.name,
        report.create_time.duration_since(self.create_time),
        report.debug_string(),
        ""
      )
    });
  }

  /// Prints all errors that have been generated to stderr. Returns `true`
  /// if any of them were critical.
  pub fn dump_errors(&self) -> bool {
    self.get_reports(ReportType::Any, |report| {
      for err in report.errors() {
        eprintln!("{}", err);
      }
    });

    self.have_errors_of_type(PolygenErrorSeverity::Critical)
  }
}

#[derive(Clone, Copy)]
pub(crate) struct Timing {
  label:  &'static str,
  start:  Instant,
  end:    Instant,
  active: bool,
}

impl Timing {
  #[inline(always)]
  pub fn new(label: &'static str) -> Self {
    Timing { label, start: Instant::now(), end: Instant::now(), active: true }
  }

  #[inline(always)]
  pub fn stop(&mut self) {
    self.end = Instant::now();
    self.active = false;
  }

  #[inline(always)]
  pub fn is_active(&self) -> bool {
    self.active
  }
}

impl Debug for Timing {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}: {:?}", self.label, (self.end - self.start)))
  }
}

impl Display for Timing {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Debug::fmt(&self, f)
  }
}
