//! Report sections. Each builder registers itself with an ordinal; the
//! assembler emits them in ascending ordinal order.

use netrap_sdk::Section;
use once_cell::sync::Lazy;

use crate::format::{
    HOST_WIDTH, INDENT, IP_WIDTH, NONE_FOUND, REPORT_WIDTH, SITE_WIDTH, TYPE_WIDTH,
    VLANS_PER_LINE, count_noun, day_unit, format_percent, label_value, plural, row, whole_days,
    wrap_list, wrap_paragraph,
};
use crate::metrics::{Metrics, ProblemDevice};
use crate::recommendations::Recommendation;
use crate::sorting;
use crate::thresholds::{Severity, Thresholds};

/// Everything a section may read. Sections never see the raw inventory.
pub struct SectionInput<'a> {
    pub metrics: &'a Metrics,
    pub recommendations: &'a [Recommendation],
    pub thresholds: &'a Thresholds,
}

pub trait SectionBuilder: Send + Sync + 'static {
    fn build(&self, input: &SectionInput<'_>) -> Section;
}

/// Compile-time registry entry.
pub struct SectionRegistration {
    pub order: u16,
    pub constructor: fn() -> Box<dyn SectionBuilder>,
}

inventory::collect!(SectionRegistration);

fn boxed<B: SectionBuilder + Default>() -> Box<dyn SectionBuilder> {
    Box::new(B::default())
}

macro_rules! register_section {
    ($order:expr, $builder:ty) => {
        inventory::submit! {
            SectionRegistration {
                order: $order,
                constructor: boxed::<$builder>,
            }
        }
    };
}

static REGISTRY: Lazy<Vec<&'static SectionRegistration>> = Lazy::new(|| {
    let mut entries: Vec<_> = inventory::iter::<SectionRegistration>
        .into_iter()
        .collect();
    entries.sort_by_key(|entry| entry.order);
    entries
});

pub fn build_sections(input: &SectionInput<'_>) -> Vec<Section> {
    REGISTRY
        .iter()
        .map(|entry| (entry.constructor)().build(input))
        .collect()
}

fn none_found(depth: usize) -> String {
    format!("{}{}", INDENT.repeat(depth), NONE_FOUND)
}

fn port_flag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "⚠ KRITISKT",
        Severity::Warning => "⚠ HÖG",
        Severity::Info => "",
    }
}

fn warning_percent(thresholds: &Thresholds) -> String {
    format!("{:.0}%", thresholds.port_warning * 100.0)
}

#[derive(Default)]
struct ExecutiveSummary;

impl SectionBuilder for ExecutiveSummary {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let m = input.metrics;
        let t = input.thresholds;
        let mut section = Section::new("summary", "SAMMANFATTNING");

        section.push(label_value("Totalt antal enheter", m.tally.total));
        section.push(label_value("Online", m.tally.online));
        section.push(label_value("Offline", m.tally.offline));
        section.push(label_value("Varning", m.tally.warning));
        section.push(label_value("Antal sites", m.sites.len()));
        section.push(label_value(
            "Switchportar i bruk",
            format!(
                "{}/{} ({})",
                m.port_totals.used,
                m.port_totals.total,
                format_percent(m.port_totals.utilization())
            ),
        ));
        section.push(label_value("Unika VLAN", m.vlans.len()));

        let high_switches = m.high_utilization_switches(t).len();
        let mut alerts = Vec::new();
        if m.tally.offline > 0 {
            alerts.push(format!(
                "⚠ KRITISKT: {} offline",
                count_noun(m.tally.offline, "enhet är", "enheter är")
            ));
        }
        if m.tally.warning > 0 {
            alerts.push(format!(
                "⚠ VARNING: {} varningsstatus",
                count_noun(m.tally.warning, "enhet har", "enheter har")
            ));
        }
        if !m.low_uptime.is_empty() {
            alerts.push(format!(
                "⚠ {} låg uptime (<{} dagar)",
                count_noun(m.low_uptime.len(), "enhet har", "enheter har"),
                t.low_uptime_days
            ));
        }
        if high_switches > 0 {
            alerts.push(format!(
                "⚠ {} hög portanvändning (>={})",
                count_noun(high_switches, "switch har", "switchar har"),
                warning_percent(t)
            ));
        }

        if !alerts.is_empty() {
            section.push("");
            section.extend(alerts.into_iter().map(|alert| format!("{INDENT}{alert}")));
        }
        section
    }
}

register_section!(10, ExecutiveSummary);

#[derive(Default)]
struct ProblemDevices;

impl ProblemDevices {
    fn device_row(device: &ProblemDevice) -> String {
        let clients = match device.connected_clients {
            Some(count) => format!(" ({} {})", count, plural(count, "klient", "klienter")),
            None => String::new(),
        };
        row(format!(
            "{}{}{:<hw$} {:<iw$} {:<tw$} {}{}",
            INDENT,
            INDENT,
            device.hostname,
            device.ip_address,
            device.type_label,
            device.site,
            clients,
            hw = HOST_WIDTH,
            iw = IP_WIDTH,
            tw = TYPE_WIDTH,
        ))
    }

    fn group(section: &mut Section, label: &str, devices: &[ProblemDevice]) {
        section.push(format!("{INDENT}{label} ({}):", devices.len()));
        if devices.is_empty() {
            section.push(none_found(2));
        } else {
            section.extend(devices.iter().map(Self::device_row));
        }
    }
}

impl SectionBuilder for ProblemDevices {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let mut section = Section::new("problems", "ENHETER MED PROBLEM");

        // Offline devices keep inventory order; warnings are prioritized.
        Self::group(&mut section, "Offline", &input.metrics.offline);

        let mut warning = input.metrics.warning.clone();
        sorting::sort_problem_devices(&mut warning);
        Self::group(&mut section, "Varning", &warning);
        section
    }
}

register_section!(20, ProblemDevices);

#[derive(Default)]
struct LowUptime;

impl SectionBuilder for LowUptime {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let title = format!(
            "ENHETER MED LÅG UPTIME (<{} dagar)",
            input.thresholds.low_uptime_days
        );
        let mut section = Section::new("low_uptime", title);

        let mut entries = input.metrics.low_uptime.clone();
        sorting::sort_low_uptime(&mut entries);

        for entry in &entries {
            let flag = if entry.is_critical() { "⚠ KRITISKT" } else { "" };
            section.push(row(format!(
                "{}{:<hw$} {:>4} {:<6}{:<tw$} {:<sw$} {}",
                INDENT,
                entry.hostname,
                whole_days(entry.uptime_days),
                day_unit(entry.uptime_days),
                entry.type_label,
                entry.site,
                flag,
                hw = HOST_WIDTH,
                tw = TYPE_WIDTH,
                sw = SITE_WIDTH,
            )));
        }

        section.or_placeholder(&none_found(1))
    }
}

register_section!(30, LowUptime);

#[derive(Default)]
struct TypeStatistics;

impl SectionBuilder for TypeStatistics {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let mut section = Section::new("types", "STATISTIK PER ENHETSTYP");
        for stat in &input.metrics.types {
            section.push(format!(
                "{}{:<hw$} {:>4} st  ({} offline)",
                INDENT,
                stat.label,
                stat.count,
                stat.offline,
                hw = HOST_WIDTH,
            ));
        }
        section.or_placeholder(&none_found(1))
    }
}

register_section!(40, TypeStatistics);

#[derive(Default)]
struct SitePortUtilization;

impl SitePortUtilization {
    fn usage_row(name: &str, used: i64, total: i64, utilization: f64, flag: &str) -> String {
        row(format!(
            "{}{:<hw$} {:>5}/{:<5} {:>7}  {}",
            INDENT,
            name,
            used,
            total,
            format_percent(utilization),
            flag,
            hw = HOST_WIDTH,
        ))
    }
}

impl SectionBuilder for SitePortUtilization {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let t = input.thresholds;
        let mut section = Section::new("site_ports", "PORTANVÄNDNING PER SITE (switchar)");

        let mut sites = input.metrics.site_ports.clone();
        sorting::rank_sites(&mut sites);
        for site in &sites {
            section.push(Self::usage_row(
                &site.site,
                site.ports.used,
                site.ports.total,
                site.utilization,
                port_flag(t.port_severity(site.utilization)),
            ));
        }

        if sites.is_empty() {
            return section.or_placeholder(&none_found(1));
        }

        let totals = input.metrics.port_totals;
        section.push("");
        section.push(Self::usage_row(
            "Totalt",
            totals.used,
            totals.total,
            totals.utilization(),
            port_flag(t.port_severity(totals.utilization())),
        ));
        section
    }
}

register_section!(50, SitePortUtilization);

#[derive(Default)]
struct HighUtilizationSwitches;

impl SectionBuilder for HighUtilizationSwitches {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let t = input.thresholds;
        let title = format!(
            "SWITCHAR MED HÖG PORTANVÄNDNING (>={})",
            warning_percent(t)
        );
        let mut section = Section::new("high_utilization", title);

        let mut switches = input.metrics.high_utilization_switches(t);
        sorting::sort_switches(&mut switches);
        for switch in switches {
            let ports = format!("{}/{}", switch.used, switch.total);
            let full = if switch.is_full() { " FULLT!" } else { "" };
            section.push(row(format!(
                "{}{:<hw$} {:<sw$} {:>9} portar {:>7}  {}{}",
                INDENT,
                switch.hostname,
                switch.site,
                ports,
                format_percent(switch.utilization),
                port_flag(t.port_severity(switch.utilization)),
                full,
                hw = HOST_WIDTH,
                sw = SITE_WIDTH,
            )));
        }

        section.or_placeholder(&none_found(1))
    }
}

register_section!(60, HighUtilizationSwitches);

#[derive(Default)]
struct VlanOverview;

impl SectionBuilder for VlanOverview {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let vlans = &input.metrics.vlans;
        let mut section = Section::new("vlans", "VLAN-ÖVERSIKT");
        section.push(label_value("Antal unika VLAN", vlans.len()));
        if vlans.is_empty() {
            section.push(format!("{INDENT}Inga VLAN hittades"));
        } else {
            section.extend(wrap_list(&format!("{INDENT}VLAN-ID: "), vlans, VLANS_PER_LINE));
        }
        section
    }
}

register_section!(70, VlanOverview);

#[derive(Default)]
struct SiteStatistics;

impl SectionBuilder for SiteStatistics {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let mut section = Section::new("sites", "STATISTIK PER SITE");
        let detail = |label: &str, value: String| {
            format!("{INDENT}{INDENT}{:<16}{}", format!("{label}:"), value)
        };

        for (index, site) in input.metrics.sites.iter().enumerate() {
            if index > 0 {
                section.push("");
            }
            match site.city.as_deref() {
                Some(city) => section.push(format!("{INDENT}{} ({city})", site.site)),
                None => section.push(format!("{INDENT}{}", site.site)),
            }
            let tally = site.tally;
            section.push(detail(
                "Enheter",
                format!(
                    "{} (online: {}, offline: {}, varning: {})",
                    tally.total, tally.online, tally.offline, tally.warning
                ),
            ));
            section.push(detail(
                "Kontakt",
                site.contact.clone().unwrap_or_else(|| "-".to_string()),
            ));
            let vendors = if site.vendors.is_empty() {
                "-".to_string()
            } else {
                site.vendors.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            section.push(detail("Leverantörer", vendors));
        }

        if section.is_empty() {
            section.push(format!("{INDENT}Inga sites hittades"));
        }
        section
    }
}

register_section!(80, SiteStatistics);

#[derive(Default)]
struct AccessPointLeaderboard;

impl SectionBuilder for AccessPointLeaderboard {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let t = input.thresholds;
        let mut section = Section::new("access_points", "ACCESSPUNKTER - ANSLUTNA KLIENTER");

        let mut access_points = input.metrics.access_points.clone();
        sorting::rank_access_points(&mut access_points);
        for (rank, ap) in access_points.iter().enumerate() {
            let flag = if t.is_overloaded(ap.clients) { "⚠ ÖVERBELASTAD" } else { "" };
            section.push(row(format!(
                "{}{:>2}. {:<hw$} {:>4} {:<10}{:<sw$} {}",
                INDENT,
                rank + 1,
                ap.hostname,
                ap.clients,
                plural(ap.clients, "klient", "klienter"),
                ap.site,
                flag,
                hw = HOST_WIDTH,
                sw = SITE_WIDTH,
            )));
        }

        if section.is_empty() {
            section.push(format!("{INDENT}Inga accesspunkter hittades"));
        }
        section
    }
}

register_section!(90, AccessPointLeaderboard);

#[derive(Default)]
struct Recommendations;

impl SectionBuilder for Recommendations {
    fn build(&self, input: &SectionInput<'_>) -> Section {
        let mut section = Section::new("recommendations", "REKOMMENDATIONER");
        let bullet = format!("{INDENT}• ");
        let hanging = format!("{INDENT}  ");
        for recommendation in input.recommendations {
            section.extend(wrap_paragraph(
                &recommendation.text(),
                REPORT_WIDTH,
                &bullet,
                &hanging,
            ));
        }
        if section.is_empty() {
            section.push(format!(
                "{INDENT}Inga rekommendationer - inga åtgärder krävs just nu"
            ));
        }
        section
    }
}

register_section!(100, Recommendations);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations;
    use netrap_sdk::Inventory;
    use serde_json::json;

    fn sections(value: serde_json::Value) -> Vec<Section> {
        let inventory = Inventory::from_value(&value).inventory;
        let thresholds = Thresholds::default();
        let metrics = Metrics::collect(&inventory, &thresholds);
        let recommendations = recommendations::evaluate(&metrics, &thresholds);
        build_sections(&SectionInput {
            metrics: &metrics,
            recommendations: &recommendations,
            thresholds: &thresholds,
        })
    }

    fn section<'a>(sections: &'a [Section], id: &str) -> &'a Section {
        sections
            .iter()
            .find(|s| s.id == id)
            .unwrap_or_else(|| panic!("missing section {id}"))
    }

    #[test]
    fn registry_emits_sections_in_fixed_order() {
        let ids: Vec<&str> = sections(json!({})).iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                "summary",
                "problems",
                "low_uptime",
                "types",
                "site_ports",
                "high_utilization",
                "vlans",
                "sites",
                "access_points",
                "recommendations",
            ]
        );
    }

    #[test]
    fn empty_inventory_uses_placeholders() {
        let all = sections(json!({"company": "X", "locations": []}));
        for id in ["low_uptime", "types", "site_ports", "high_utilization"] {
            assert_eq!(section(&all, id).lines, vec![none_found(1)], "{id}");
        }
        assert!(section(&all, "vlans").lines.contains(&"  Inga VLAN hittades".to_string()));
        assert_eq!(section(&all, "sites").lines, vec!["  Inga sites hittades"]);
        assert_eq!(
            section(&all, "problems").lines,
            vec![
                "  Offline (0):".to_string(),
                none_found(2),
                "  Varning (0):".to_string(),
                none_found(2),
            ]
        );
        let summary = &section(&all, "summary").lines;
        assert!(summary.contains(&label_value("Switchportar i bruk", "0/0 (0.0%)")));
    }

    #[test]
    fn high_utilization_switch_without_full_flag() {
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "sw1", "type": "switch", "status": "online", "ports": {"used": 81, "total": 100}},
                {"hostname": "sw2", "type": "switch", "status": "online", "ports": {"used": 24, "total": 24}},
                {"hostname": "sw3", "type": "switch", "status": "online", "ports": {"used": 10, "total": 48}}
            ]}]
        }));
        let lines = &section(&all, "high_utilization").lines;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("sw2") && lines[0].ends_with("⚠ KRITISKT FULLT!"));
        assert!(lines[1].contains("sw1"));
        assert!(lines[1].contains("81/100"));
        assert!(lines[1].contains("81.0%"));
        assert!(!lines[1].contains("FULLT!"));
        assert!(lines[1].ends_with("⚠ HÖG"));
    }

    #[test]
    fn low_uptime_pluralizes_days() {
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "two", "type": "router", "status": "online", "uptime_days": 2},
                {"hostname": "one", "type": "router", "status": "online", "uptime_days": 1},
                {"hostname": "ten", "type": "router", "status": "online", "uptime_days": 10.7}
            ]}]
        }));
        let lines = &section(&all, "low_uptime").lines;
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  one") && lines[0].contains("   1 dag "));
        assert!(lines[0].ends_with("⚠ KRITISKT"));
        assert!(lines[1].starts_with("  two") && lines[1].contains("   2 dagar"));
        assert!(lines[2].starts_with("  ten") && lines[2].contains("  10 dagar"));
        assert!(!lines[2].contains("KRITISKT"));
    }

    #[test]
    fn critical_uptime_is_subset_of_low_uptime() {
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "a", "type": "router", "status": "online", "uptime_days": 0},
                {"hostname": "b", "type": "router", "status": "online", "uptime_days": 29},
                {"hostname": "c", "type": "router", "status": "online", "uptime_days": 31}
            ]}]
        }));
        let lines = &section(&all, "low_uptime").lines;
        let critical: Vec<&String> = lines.iter().filter(|l| l.contains("KRITISKT")).collect();
        assert_eq!(critical.len(), 1);
        assert!(critical[0].starts_with("  a "));
        assert!(lines.iter().all(|l| !l.starts_with("  c ")));
    }

    #[test]
    fn vlan_list_wraps_with_aligned_continuation() {
        let vlans: Vec<i64> = (1..=12).map(|n| n * 10).collect();
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "sw", "type": "switch", "status": "online", "vlans": vlans}
            ]}]
        }));
        let lines = &section(&all, "vlans").lines;
        assert_eq!(lines[0], label_value("Antal unika VLAN", 12));
        assert_eq!(lines[1], "  VLAN-ID: 10, 20, 30, 40, 50, 60, 70, 80, 90, 100,");
        assert_eq!(lines[2], "           110, 120");
    }

    #[test]
    fn warning_devices_sorted_by_type_priority() {
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "ap-1", "ip_address": "10.0.0.5", "type": "access_point", "status": "warning", "connected_clients": 1},
                {"hostname": "sw-1", "ip_address": "10.0.0.2", "type": "switch", "status": "WARNING"},
                {"hostname": "rt-1", "ip_address": "10.0.0.1", "type": "router", "status": "warning"}
            ]}]
        }));
        let lines = &section(&all, "problems").lines;
        assert_eq!(lines[2], "  Varning (3):");
        assert!(lines[3].starts_with("    rt-1"));
        assert!(lines[4].starts_with("    sw-1"));
        assert!(lines[5].starts_with("    ap-1") && lines[5].ends_with("HQ (1 klient)"));
    }

    #[test]
    fn leaderboard_flags_overloaded_access_points() {
        let all = sections(json!({
            "locations": [{"site": "HQ", "devices": [
                {"hostname": "ap-small", "type": "access_point", "status": "online", "connected_clients": 3},
                {"hostname": "ap-big", "type": "access_point", "status": "online", "connected_clients": 41},
                {"hostname": "ap-none", "type": "access_point", "status": "online"}
            ]}]
        }));
        let lines = &section(&all, "access_points").lines;
        assert!(lines[0].starts_with("   1. ap-big") && lines[0].ends_with("⚠ ÖVERBELASTAD"));
        assert!(lines[1].starts_with("   2. ap-small"));
        assert!(lines[2].starts_with("   3. ap-none") && lines[2].contains("   0 klienter"));
    }

    #[test]
    fn long_values_stay_separated_from_the_next_column() {
        let all = sections(json!({
            "locations": [{"site": "Stockholm Huvudkontor", "devices": [
                {"hostname": "sw-core-stockholm-01", "ip_address": "10.0.0.2", "type": "wireless_lan_controller", "status": "offline", "uptime_days": 2},
                {"hostname": "sw-access-02", "type": "switch", "status": "online", "ports": {"used": 12, "total": 24}}
            ]}]
        }));
        assert_eq!(
            section(&all, "problems").lines[1],
            "    sw-core-stockholm-01 10.0.0.2         Wireless Lan Controller Stockholm Huvudkontor"
        );
        assert_eq!(
            section(&all, "low_uptime").lines[0],
            "  sw-core-stockholm-01    2 dagar Wireless Lan Controller Stockholm Huvudkontor ⚠ KRITISKT"
        );
        assert_eq!(
            section(&all, "types").lines[1],
            "  Wireless Lan Controller    1 st  (1 offline)"
        );
        assert_eq!(
            section(&all, "site_ports").lines[0],
            "  Stockholm Huvudkontor    12/24      50.0%"
        );
    }

    #[test]
    fn site_ports_rank_sites_and_close_with_total() {
        let all = sections(json!({
            "locations": [
                {"site": "Lager", "devices": [{"hostname": "rt", "type": "router", "status": "online"}]},
                {"site": "HQ", "devices": [{"hostname": "sw-hq", "type": "switch", "status": "online", "ports": {"used": 30, "total": 48}}]},
                {"site": "Kontor", "devices": [{"hostname": "sw-k", "type": "switch", "status": "online", "ports": {"used": 20, "total": 24}}]}
            ]
        }));
        assert_eq!(
            section(&all, "site_ports").lines,
            vec![
                "  Kontor                20/24      83.3%  ⚠ HÖG",
                "  HQ                    30/48      62.5%",
                "  Lager                  0/0        0.0%",
                "",
                "  Totalt                50/72      69.4%",
            ]
        );
    }

    #[test]
    fn recommendations_wrap_to_report_width() {
        let all = sections(json!({
            "locations": [{"site": "Huvudkontoret", "devices": [
                {"hostname": "sw", "type": "switch", "status": "offline", "uptime_days": 1, "ports": {"used": 48, "total": 48}}
            ]}]
        }));
        let lines = &section(&all, "recommendations").lines;
        assert!(lines[0].starts_with("  • AKUT: 1 enhet är offline"));
        assert!(lines.iter().all(|l| l.chars().count() <= REPORT_WIDTH));
        assert!(lines.iter().any(|l| l.starts_with("    ")));
    }
}
