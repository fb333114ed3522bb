//! Per-unit outcome records and the aggregated job report.

use std::fmt;

use super::error::UnitError;

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Exported(u64),
    Imported(u64),
    Failed(UnitError),
}

/// One report line, describing one collection or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub file_name: String,
    pub database: String,
    pub outcome: Outcome,
}

impl OutcomeRecord {
    pub fn exported(file_name: impl Into<String>, database: impl Into<String>, count: u64) -> Self {
        Self::new(file_name, database, Outcome::Exported(count))
    }

    pub fn imported(file_name: impl Into<String>, database: impl Into<String>, count: u64) -> Self {
        Self::new(file_name, database, Outcome::Imported(count))
    }

    pub fn failed(
        file_name: impl Into<String>,
        database: impl Into<String>,
        error: impl Into<UnitError>,
    ) -> Self {
        Self::new(file_name, database, Outcome::Failed(error.into()))
    }

    fn new(file_name: impl Into<String>, database: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            file_name: file_name.into(),
            database: database.into(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed(_))
    }
}

fn count_note(count: u64, verb: &str) -> String {
    match count {
        0 => format!("(0 documents {})", verb),
        1 => format!("1 document {}", verb),
        n => format!("{} documents {}", n, verb),
    }
}

impl fmt::Display for OutcomeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) ", self.file_name, self.database)?;
        match &self.outcome {
            Outcome::Exported(count) => write!(f, "✅ {}", count_note(*count, "exported")),
            Outcome::Imported(count) => write!(f, "✅ {}", count_note(*count, "imported")),
            Outcome::Failed(error) => write!(f, "❌ {}", error),
        }
    }
}

/// Ordered outcome records of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    records: Vec<OutcomeRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Records joined with newlines, in arrival order.
    pub fn text(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<OutcomeRecord> for Report {
    fn from_iter<I: IntoIterator<Item = OutcomeRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
