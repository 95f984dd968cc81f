use anyhow::Result;
use netrap_sdk::{Inventory, InventoryIssue, ReportContext, Section};
use serde::Serialize;
use tracing::{debug, info};

mod format;
mod metrics;
mod normalize;
mod recommendations;
mod sections;
mod sorting;
mod thresholds;

pub use metrics::{
    AccessPointLoad, Metrics, PortTotals, ProblemDevice, SitePorts, SiteSummary, StatusTally,
    SwitchPorts, TypeStat, UptimeEntry,
};
pub use normalize::{DeviceKind, DeviceStatus, normalize_key, pretty_label};
pub use recommendations::{Recommendation, RecommendationKind};
pub use thresholds::{Severity, Thresholds};

#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub company: String,
    pub generated_at: String,
    pub last_updated: String,
    pub sections: usize,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub sections: Vec<Section>,
    pub metrics: Metrics,
    pub recommendations: Vec<Recommendation>,
    pub issues: Vec<InventoryIssue>,
}

impl Report {
    pub fn new(inventory: &Inventory, ctx: &ReportContext) -> Self {
        Self::with_thresholds(inventory, ctx, Thresholds::default())
    }

    pub fn with_thresholds(
        inventory: &Inventory,
        ctx: &ReportContext,
        thresholds: Thresholds,
    ) -> Self {
        let metrics = Metrics::collect(inventory, &thresholds);
        let recommendations = recommendations::evaluate(&metrics, &thresholds);
        let sections = sections::build_sections(&sections::SectionInput {
            metrics: &metrics,
            recommendations: &recommendations,
            thresholds: &thresholds,
        });

        let mut issues = Vec::new();
        let last_updated = last_updated_label(inventory.last_updated.as_deref(), &mut issues);
        let company = inventory
            .company
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "-".to_string());

        info!(
            devices = metrics.tally.total,
            sections = sections.len(),
            recommendations = recommendations.len(),
            "built network report"
        );

        Self {
            metadata: ReportMetadata {
                company,
                generated_at: ctx.generated_at_label(),
                last_updated,
                sections: sections.len(),
            },
            sections,
            metrics,
            recommendations,
            issues,
        }
    }

    /// Prepends issues found while decoding the inventory.
    pub fn with_issues(mut self, mut issues: Vec<InventoryIssue>) -> Self {
        issues.append(&mut self.issues);
        self.issues = issues;
        self
    }

    pub fn to_text(&self) -> Result<String> {
        render::render_text(self).map_err(Into::into)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "metadata": self.metadata,
            "metrics": self.metrics,
            "recommendations": self.recommendations,
            "issues": self.issues,
        })
    }
}

/// Renders the text report for `inventory` with the default thresholds.
pub fn render(inventory: &Inventory, ctx: &ReportContext) -> Result<String> {
    Report::new(inventory, ctx).to_text()
}

fn last_updated_label(raw: Option<&str>, issues: &mut Vec<InventoryIssue>) -> String {
    let Some(raw) = raw else {
        return "-".to_string();
    };
    match format::parse_timestamp(raw) {
        Some(parsed) => format::format_timestamp(parsed),
        None => {
            debug!(raw, "last_updated is not ISO-8601, showing raw value");
            issues.push(InventoryIssue::TimestampParseFailure {
                raw: raw.to_string(),
            });
            raw.to_string()
        }
    }
}

mod render {
    use askama::Template;
    use netrap_sdk::Section;

    use super::{Report, ReportMetadata};
    use crate::format::rule;

    #[derive(Template)]
    #[template(path = "report.txt", escape = "none")]
    struct TextReport<'a> {
        metadata: &'a ReportMetadata,
        sections: &'a [Section],
        banner: String,
        rule: String,
    }

    /// Renders the report; the result always ends in exactly one newline.
    pub fn render_text(report: &Report) -> askama::Result<String> {
        let rendered = TextReport {
            metadata: &report.metadata,
            sections: &report.sections,
            banner: rule('='),
            rule: rule('-'),
        }
        .render()?;

        let mut text = rendered.trim_end_matches('\n').to_string();
        text.push('\n');
        Ok(text)
    }
}
