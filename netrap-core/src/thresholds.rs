use anyhow::{Result, anyhow};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

/// Classification cut-offs. Port ratios are fractions in `0..=1`, uptime
/// values are days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub port_warning: f64,
    pub port_critical: f64,
    pub low_uptime_days: f64,
    pub critical_uptime_days: f64,
    /// Devices restarted more recently than this trigger the stability
    /// recommendation. Independent of `critical_uptime_days`.
    pub fresh_uptime_days: f64,
    pub ap_overload_clients: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            port_warning: 0.80,
            port_critical: 0.95,
            low_uptime_days: 30.0,
            critical_uptime_days: 3.0,
            fresh_uptime_days: 5.0,
            ap_overload_clients: 40,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("port_warning", self.port_warning),
            ("port_critical", self.port_critical),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be between 0 and 1", name));
            }
        }

        if self.port_warning > self.port_critical {
            return Err(anyhow!(
                "port_warning ({:.1}%) must be <= port_critical ({:.1}%)",
                self.port_warning * 100.0,
                self.port_critical * 100.0
            ));
        }

        for (name, value) in [
            ("low_uptime_days", self.low_uptime_days),
            ("critical_uptime_days", self.critical_uptime_days),
            ("fresh_uptime_days", self.fresh_uptime_days),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("{} must be a non-negative number of days", name));
            }
        }

        if self.critical_uptime_days > self.low_uptime_days {
            return Err(anyhow!(
                "critical_uptime_days ({}) must be <= low_uptime_days ({})",
                self.critical_uptime_days,
                self.low_uptime_days
            ));
        }

        if self.ap_overload_clients < 1 {
            return Err(anyhow!("ap_overload_clients must be at least 1"));
        }

        Ok(())
    }

    pub fn port_severity(&self, utilization: f64) -> Severity {
        if utilization >= self.port_critical {
            Severity::Critical
        } else if utilization >= self.port_warning {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    /// `Info` means the device is not in the low-uptime set at all.
    pub fn uptime_severity(&self, days: f64) -> Severity {
        if days < self.critical_uptime_days {
            Severity::Critical
        } else if days < self.low_uptime_days {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    pub fn is_freshly_restarted(&self, days: f64) -> bool {
        days < self.fresh_uptime_days
    }

    pub fn is_overloaded(&self, clients: i64) -> bool {
        clients >= self.ap_overload_clients
    }
}
