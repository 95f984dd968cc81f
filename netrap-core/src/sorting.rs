//! Display orderings. Every comparator is total; `sort_by` is stable, so
//! entries equal on all keys keep inventory order.

use std::cmp::Ordering;

use crate::metrics::{AccessPointLoad, ProblemDevice, SitePorts, SwitchPorts, UptimeEntry};

/// Ascending, with a missing value sorting after every present one.
pub fn compare_uptime(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Routers, then switches, then access points, then everything else;
/// hostname breaks ties.
pub fn sort_problem_devices(devices: &mut [ProblemDevice]) {
    devices.sort_by(|a, b| {
        a.kind
            .priority()
            .cmp(&b.kind.priority())
            .then_with(|| a.hostname.cmp(&b.hostname))
    });
}

pub fn sort_low_uptime(entries: &mut [UptimeEntry]) {
    entries.sort_by(|a, b| {
        compare_uptime(Some(a.uptime_days), Some(b.uptime_days))
            .then_with(|| a.hostname.cmp(&b.hostname))
    });
}

/// Highest utilization first; sites without ports sit at 0.
pub fn rank_sites(sites: &mut [SitePorts]) {
    sites.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));
}

pub fn sort_switches(switches: &mut [&SwitchPorts]) {
    switches.sort_by(|a, b| {
        b.utilization
            .total_cmp(&a.utilization)
            .then_with(|| a.hostname.cmp(&b.hostname))
    });
}

/// Most clients first; equal counts keep encounter order.
pub fn rank_access_points(access_points: &mut [AccessPointLoad]) {
    access_points.sort_by(|a, b| b.clients.cmp(&a.clients));
}
