use serde::Serialize;

use crate::format::{count_noun, format_percent};
use crate::metrics::Metrics;
use crate::normalize::DeviceStatus;
use crate::thresholds::{Severity, Thresholds};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    OfflineDevices,
    PortCapacity,
    Stability,
    LoadBalancing,
    VendorStandardization,
}

impl RecommendationKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RecommendationKind::OfflineDevices => "AKUT",
            RecommendationKind::PortCapacity => "KAPACITET",
            RecommendationKind::Stability => "STABILITET",
            RecommendationKind::LoadBalancing => "LASTBALANSERING",
            RecommendationKind::VendorStandardization => "STANDARDISERING",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn text(&self) -> String {
        format!("{}: {}", self.kind.prefix(), self.message)
    }
}

/// Minimum number of distinct vendors at one site before standardization
/// is suggested.
pub const VENDOR_DIVERSITY_LIMIT: usize = 3;

/// Evaluates every rule once, in a fixed order. Each rule emits at most
/// one recommendation.
pub fn evaluate(metrics: &Metrics, thresholds: &Thresholds) -> Vec<Recommendation> {
    [
        offline_devices(metrics),
        port_capacity(metrics, thresholds),
        stability(metrics, thresholds),
        load_balancing(metrics, thresholds),
        vendor_standardization(metrics),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn offline_devices(metrics: &Metrics) -> Option<Recommendation> {
    let offline = metrics.tally.offline;
    (offline > 0).then(|| {
        Recommendation::new(
            RecommendationKind::OfflineDevices,
            format!(
                "{} offline - felsök och återställ dessa omgående",
                count_noun(offline, "enhet är", "enheter är")
            ),
        )
    })
}

fn port_capacity(metrics: &Metrics, thresholds: &Thresholds) -> Option<Recommendation> {
    let site = metrics.busiest_site()?;
    (thresholds.port_severity(site.utilization) == Severity::Critical).then(|| {
        Recommendation::new(
            RecommendationKind::PortCapacity,
            format!(
                "{} har {} portanvändning på switcharna - planera utökning av portkapaciteten",
                site.site,
                format_percent(site.utilization)
            ),
        )
    })
}

fn stability(metrics: &Metrics, thresholds: &Thresholds) -> Option<Recommendation> {
    (metrics.freshly_restarted > 0).then(|| {
        Recommendation::new(
            RecommendationKind::Stability,
            format!(
                "Enheter med uptime under {} dagar har nyligen startats om - kontrollera deras stabilitet",
                thresholds.fresh_uptime_days
            ),
        )
    })
}

fn load_balancing(metrics: &Metrics, thresholds: &Thresholds) -> Option<Recommendation> {
    let top = metrics.top_access_point.as_ref()?;
    let strained = top.status == DeviceStatus::Warning || thresholds.is_overloaded(top.clients);
    strained.then(|| {
        Recommendation::new(
            RecommendationKind::LoadBalancing,
            format!(
                "{} ({}) har {} anslutna - överväg att fördela lasten på fler accesspunkter",
                top.hostname,
                top.site,
                count_noun(top.clients.max(0) as usize, "klient", "klienter")
            ),
        )
    })
}

/// Only the first qualifying site is reported.
fn vendor_standardization(metrics: &Metrics) -> Option<Recommendation> {
    let site = metrics
        .sites
        .iter()
        .find(|site| site.vendors.len() >= VENDOR_DIVERSITY_LIMIT)?;
    let vendors: Vec<&str> = site.vendors.iter().map(String::as_str).collect();
    Some(Recommendation::new(
        RecommendationKind::VendorStandardization,
        format!(
            "{} använder {} olika leverantörer ({}) - överväg att standardisera utrustningen",
            site.site,
            vendors.len(),
            vendors.join(", ")
        ),
    ))
}
