use std::collections::{BTreeMap, BTreeSet};

use netrap_sdk::{Device, Inventory, Location};
use serde::Serialize;
use tracing::debug;

use crate::format::ratio;
use crate::normalize::{DeviceKind, DeviceStatus, pretty_label};
use crate::thresholds::{Severity, Thresholds};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatusTally {
    pub total: usize,
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
}

impl StatusTally {
    fn record(&mut self, status: DeviceStatus) {
        self.total += 1;
        match status {
            DeviceStatus::Online => self.online += 1,
            DeviceStatus::Warning => self.warning += 1,
            DeviceStatus::Offline => self.offline += 1,
            DeviceStatus::Other => {}
        }
    }
}

/// A device flagged as offline or warning.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProblemDevice {
    pub hostname: String,
    pub ip_address: String,
    pub kind: DeviceKind,
    pub type_label: String,
    pub site: String,
    pub connected_clients: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UptimeEntry {
    pub hostname: String,
    pub site: String,
    pub type_label: String,
    pub uptime_days: f64,
    pub severity: Severity,
}

impl UptimeEntry {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwitchPorts {
    pub hostname: String,
    pub site: String,
    pub used: i64,
    pub total: i64,
    pub utilization: f64,
}

impl SwitchPorts {
    pub fn is_full(&self) -> bool {
        self.used == self.total
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct PortTotals {
    pub used: i64,
    pub total: i64,
}

impl PortTotals {
    pub fn utilization(&self) -> f64 {
        ratio(self.used, self.total)
    }

    fn add(&mut self, used: i64, total: i64) {
        self.used = self.used.saturating_add(used);
        self.total = self.total.saturating_add(total);
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SitePorts {
    pub site: String,
    pub ports: PortTotals,
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeStat {
    pub label: String,
    pub count: usize,
    pub offline: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteSummary {
    pub site: String,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub tally: StatusTally,
    pub vendors: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccessPointLoad {
    pub hostname: String,
    pub site: String,
    pub clients: i64,
    pub status: DeviceStatus,
}

/// Every aggregate the report needs, derived from one inventory snapshot.
/// Per-device lists keep inventory order; ordering for display is applied
/// by the sections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    pub tally: StatusTally,
    pub offline: Vec<ProblemDevice>,
    pub warning: Vec<ProblemDevice>,
    pub low_uptime: Vec<UptimeEntry>,
    pub freshly_restarted: usize,
    pub switches: Vec<SwitchPorts>,
    pub site_ports: Vec<SitePorts>,
    pub port_totals: PortTotals,
    pub types: Vec<TypeStat>,
    pub vlans: Vec<i64>,
    pub sites: Vec<SiteSummary>,
    pub access_points: Vec<AccessPointLoad>,
    pub top_access_point: Option<AccessPointLoad>,
}

impl Metrics {
    pub fn collect(inventory: &Inventory, thresholds: &Thresholds) -> Self {
        let mut metrics = Metrics::default();
        let mut types: BTreeMap<String, TypeStat> = BTreeMap::new();
        let mut vlans: BTreeSet<i64> = BTreeSet::new();

        for location in &inventory.locations {
            let mut site = SiteSummary {
                site: location.site_or_dash().to_string(),
                city: location.city.clone(),
                contact: location.contact.clone(),
                tally: StatusTally::default(),
                vendors: BTreeSet::new(),
            };
            let mut site_ports = PortTotals::default();

            for device in &location.devices {
                let status = DeviceStatus::from_raw(device.status.as_deref());
                let kind = DeviceKind::from_raw(device.device_type.as_deref());
                let type_label = pretty_label(device.device_type.as_deref());

                metrics.tally.record(status);
                site.tally.record(status);

                let stat = types.entry(type_label.clone()).or_insert_with(|| TypeStat {
                    label: type_label.clone(),
                    count: 0,
                    offline: 0,
                });
                stat.count += 1;

                match status {
                    DeviceStatus::Offline => {
                        stat.offline += 1;
                        metrics.offline.push(problem(location, device, kind, &type_label));
                    }
                    DeviceStatus::Warning => {
                        metrics.warning.push(problem(location, device, kind, &type_label));
                    }
                    DeviceStatus::Online | DeviceStatus::Other => {}
                }

                if let Some(days) = device.uptime_days.get() {
                    let severity = thresholds.uptime_severity(days);
                    if severity != Severity::Info {
                        metrics.low_uptime.push(UptimeEntry {
                            hostname: device.hostname_or_dash().to_string(),
                            site: site.site.clone(),
                            type_label: type_label.clone(),
                            uptime_days: days,
                            severity,
                        });
                    }
                    if thresholds.is_freshly_restarted(days) {
                        metrics.freshly_restarted += 1;
                    }
                }

                if kind == DeviceKind::Switch {
                    match device.ports.get() {
                        Some(ports) if ports.total > 0 => {
                            site_ports.add(ports.used, ports.total);
                            metrics.switches.push(SwitchPorts {
                                hostname: device.hostname_or_dash().to_string(),
                                site: site.site.clone(),
                                used: ports.used,
                                total: ports.total,
                                utilization: ratio(ports.used, ports.total),
                            });
                        }
                        Some(_) => debug!(
                            hostname = device.hostname_or_dash(),
                            "switch reports zero total ports, excluded from utilization"
                        ),
                        None => {}
                    }
                }

                vlans.extend(device.vlans.iter().copied());

                if let Some(vendor) = device.vendor.as_deref().map(str::trim) {
                    if !vendor.is_empty() {
                        site.vendors.insert(vendor.to_string());
                    }
                }

                if kind == DeviceKind::AccessPoint {
                    let load = AccessPointLoad {
                        hostname: device.hostname_or_dash().to_string(),
                        site: site.site.clone(),
                        clients: device.connected_clients.get().unwrap_or(0),
                        status,
                    };
                    let replaces_top = metrics
                        .top_access_point
                        .as_ref()
                        .is_none_or(|top| load.clients > top.clients);
                    if replaces_top {
                        metrics.top_access_point = Some(load.clone());
                    }
                    metrics.access_points.push(load);
                }
            }

            metrics.port_totals.add(site_ports.used, site_ports.total);
            metrics.site_ports.push(SitePorts {
                site: site.site.clone(),
                ports: site_ports,
                utilization: site_ports.utilization(),
            });
            metrics.sites.push(site);
        }

        metrics.types = types.into_values().collect();
        metrics.vlans = vlans.into_iter().collect();

        debug!(
            devices = metrics.tally.total,
            sites = metrics.sites.len(),
            vlans = metrics.vlans.len(),
            "aggregated inventory metrics"
        );

        metrics
    }

    pub fn high_utilization_switches(&self, thresholds: &Thresholds) -> Vec<&SwitchPorts> {
        self.switches
            .iter()
            .filter(|switch| thresholds.port_severity(switch.utilization) != Severity::Info)
            .collect()
    }

    /// Site with the highest switch-port utilization; the first one wins ties.
    pub fn busiest_site(&self) -> Option<&SitePorts> {
        self.site_ports.iter().fold(None, |best, candidate| match best {
            Some(current) if candidate.utilization <= current.utilization => Some(current),
            _ => Some(candidate),
        })
    }
}

fn problem(
    location: &Location,
    device: &Device,
    kind: DeviceKind,
    type_label: &str,
) -> ProblemDevice {
    ProblemDevice {
        hostname: device.hostname_or_dash().to_string(),
        ip_address: device.ip_or_dash().to_string(),
        kind,
        type_label: type_label.to_string(),
        site: location.site_or_dash().to_string(),
        connected_clients: device.connected_clients.get(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inventory(value: serde_json::Value) -> Inventory {
        Inventory::from_value(&value).inventory
    }

    fn sample() -> Inventory {
        inventory(json!({
            "company": "TechCorp AB",
            "last_updated": "2024-03-15T08:30:00Z",
            "locations": [
                {
                    "site": "HQ",
                    "city": "Stockholm",
                    "contact": "Anna",
                    "devices": [
                        {"hostname": "rt-01", "type": "router", "status": "online", "uptime_days": 120, "vendor": "Cisco", "vlans": [10, 20]},
                        {"hostname": "sw-01", "type": "switch", "status": "Warning", "uptime_days": 2, "ports": {"used": 46, "total": 48}, "vendor": "Cisco", "vlans": ["20", "guest", 30]},
                        {"hostname": "sw-02", "type": "switch", "status": "online", "uptime_days": 12, "ports": {"used": 24, "total": 24}, "vendor": "Juniper"},
                        {"hostname": "ap-01", "type": "access_point", "status": "online", "connected_clients": 25, "vendor": "Aruba"},
                        {"hostname": "ap-02", "type": "Access Point", "status": "OFFLINE", "uptime_days": "n/a"}
                    ]
                },
                {
                    "site": "Branch",
                    "city": "Göteborg",
                    "devices": [
                        {"hostname": "sw-10", "type": "switch", "status": "offline", "ports": {"used": 0, "total": 0}},
                        {"hostname": "ap-10", "type": "access_point", "status": "warning", "clients": 25},
                        {"hostname": "fw-10", "type": "firewall", "status": "unknown", "vlans": [5]}
                    ]
                }
            ]
        }))
    }

    #[test]
    fn status_tally_counts_case_insensitively() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        assert_eq!(metrics.tally.total, 8);
        assert_eq!(metrics.tally.offline, 2);
        assert_eq!(metrics.tally.warning, 2);
        assert_eq!(metrics.tally.online, 3);
        assert!(metrics.tally.offline + metrics.tally.warning <= metrics.tally.total);
    }

    #[test]
    fn per_type_offline_counts_sum_to_global() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        let offline: usize = metrics.types.iter().map(|t| t.offline).sum();
        let count: usize = metrics.types.iter().map(|t| t.count).sum();
        assert_eq!(offline, metrics.tally.offline);
        assert_eq!(count, metrics.tally.total);
        let labels: Vec<&str> = metrics.types.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Access Point", "Firewall", "Router", "Switch"]);
    }

    #[test]
    fn low_uptime_skips_missing_and_malformed() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        let hosts: Vec<&str> = metrics.low_uptime.iter().map(|e| e.hostname.as_str()).collect();
        assert_eq!(hosts, vec!["sw-01", "sw-02"]);
        assert!(metrics.low_uptime[0].is_critical());
        assert!(!metrics.low_uptime[1].is_critical());
        assert_eq!(metrics.freshly_restarted, 1);
    }

    #[test]
    fn switch_ports_aggregate_per_site_and_globally() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        assert_eq!(metrics.switches.len(), 2);
        assert!(metrics.switches[1].is_full());

        let hq = &metrics.site_ports[0];
        assert_eq!(hq.ports, PortTotals { used: 70, total: 72 });
        let branch = &metrics.site_ports[1];
        assert_eq!(branch.ports, PortTotals::default());
        assert_eq!(branch.utilization, 0.0);
        assert_eq!(metrics.port_totals, PortTotals { used: 70, total: 72 });
        assert_eq!(metrics.busiest_site().map(|s| s.site.as_str()), Some("HQ"));
    }

    #[test]
    fn vlans_are_unique_sorted_integers() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        assert_eq!(metrics.vlans, vec![5, 10, 20, 30]);
        assert!(metrics.vlans.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn site_summary_tracks_vendors_and_contacts() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        let hq = &metrics.sites[0];
        assert_eq!(hq.tally.total, 5);
        assert_eq!(hq.contact.as_deref(), Some("Anna"));
        assert_eq!(hq.vendors.len(), 3);
        assert!(metrics.sites[1].vendors.is_empty());
        assert_eq!(metrics.sites[1].contact, None);
    }

    #[test]
    fn access_points_default_missing_clients_to_zero() {
        let metrics = Metrics::collect(&sample(), &Thresholds::default());
        let clients: Vec<i64> = metrics.access_points.iter().map(|ap| ap.clients).collect();
        assert_eq!(clients, vec![25, 0, 25]);
        let top = metrics.top_access_point.as_ref().unwrap();
        assert_eq!(top.hostname, "ap-01");
    }

    #[test]
    fn empty_inventory_yields_empty_metrics() {
        let metrics = Metrics::collect(&Inventory::default(), &Thresholds::default());
        assert_eq!(metrics.tally, StatusTally::default());
        assert!(metrics.site_ports.is_empty());
        assert!(metrics.busiest_site().is_none());
        assert!(metrics.top_access_point.is_none());
        assert_eq!(metrics.port_totals.utilization(), 0.0);
    }
}
