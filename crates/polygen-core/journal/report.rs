use super::Timing;
use crate::types::{PolygenError, PolygenErrorSeverity};
use std::{collections::HashMap, time::Instant};

/// Discriminates which pipeline stage a [Report](super::Report) belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportType {
  GrammarParse,
  Preprocess,
  Transform,
  Emit,
  Any,
}

impl ReportType {
  pub fn type_matches(&self, discriminant: ReportType) -> bool {
    matches!(discriminant, ReportType::Any) || *self == discriminant
  }
}

/// Diagnostics, notes, and timings accumulated by one pipeline stage.
#[derive(Debug)]
pub struct Report {
  pub name:        String,
  pub report_type: ReportType,
  pub create_time: Instant,
  notes:           Vec<(&'static str, String)>,
  errors:          Vec<PolygenError>,
  timings:         HashMap<&'static str, Timing>,
}

impl Default for Report {
  fn default() -> Self {
    Report {
      name:        Default::default(),
      report_type: ReportType::Any,
      create_time: Instant::now(),
      notes:       Default::default(),
      errors:      Default::default(),
      timings:     Default::default(),
    }
  }
}

impl Report {
  pub fn new(name: String, report_type: ReportType) -> Self {
    Report { name, report_type, ..Default::default() }
  }

  pub fn add_error(&mut self, error: PolygenError) {
    self.errors.push(error);
  }

  pub fn add_note(&mut self, label: &'static str, note: String) {
    self.notes.push((label, note));
  }

  pub fn errors(&self) -> &[PolygenError] {
    &self.errors
  }

  pub fn have_errors_of_type(&self, severity: PolygenErrorSeverity) -> bool {
    self.errors.iter().any(|e| e.get_severity() == severity)
  }

  pub fn start_timer(&mut self, label: &'static str) {
    self.timings.insert(label, Timing::new(label));
  }

  pub fn stop_timer(&mut self, label: &'static str) {
    if let Some(timing) = self.timings.get_mut(label) {
      if timing.is_active() {
        timing.stop();
      }
    }
  }

  /// Renders the report's notes, timings and errors for debug printing.
  pub fn debug_string(&self) -> String {
    let mut out = String::new();

    for (label, note) in &self.notes {
      out.push_str(&format!("{}:\n{}\n", label, note));
    }

    for (label, timing) in &self.timings {
      out.push_str(&format!("{} took {}\n", label, timing));
    }

    for error in &self.errors {
      out.push_str(&format!("{}\n", error));
    }

    out
  }
}
