use serde::Serialize;
use std::time::Duration;

/// A single resource record taken from a transferred zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub class: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub data: String,
}

/// Everything a nameserver handed out for `domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub domain: String,
    pub nameserver: String,
    pub records: Vec<Record>,
}

impl Zone {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Walk every ancestor of a target down from its registrable domain.
    pub parents: bool,
    /// Stop probing a domain once one nameserver hands out its zone.
    pub stop_on_first: bool,
    /// Bound on each connect, read and write of a transfer.
    pub transfer_timeout: Duration,
    /// Bound on a whole transfer, however steadily the server keeps sending.
    pub transfer_deadline: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parents: false,
            stop_on_first: false,
            transfer_timeout: Duration::from_secs(10),
            transfer_deadline: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub targets: usize,
    pub domains_checked: usize,
    pub domains_skipped: usize,
    pub nameservers_probed: usize,
    pub zones_found: usize,
}
