use chrono::{Local, NaiveDateTime};
use serde::Serialize;

mod issue;
mod model;

pub use issue::InventoryIssue;
pub use model::{Decoded, Device, Field, Inventory, Location, PortUsage, parse_vlan};

/// Display format shared by the report clock and parsed inventory timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Report generation context. The clock is injected so that identical
/// inventories render byte-identical reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    generated_at: NaiveDateTime,
}

impl ReportContext {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self { generated_at }
    }

    /// Context pinned to the local wall clock at the moment of the call.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn generated_at_label(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// One titled block of the text report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Section {
    pub id: &'static str,
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new<T: Into<String>>(id: &'static str, title: T) -> Self {
        Self {
            id,
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn push<L: Into<String>>(&mut self, line: L) {
        self.lines.push(line.into());
    }

    pub fn extend<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// Appends `placeholder` when nothing else was written.
    pub fn or_placeholder(mut self, placeholder: &str) -> Self {
        if self.lines.is_empty() {
            self.lines.push(placeholder.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
