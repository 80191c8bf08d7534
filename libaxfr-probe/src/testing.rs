//! In-memory stand-ins for the resolver and the transfer client.

use crate::axfr::{TransferError, ZoneTransfer};
use crate::resolve::{LookupError, NameLookup};
use async_trait::async_trait;
use hickory_proto::rr::rdata::{A, SOA};
use hickory_proto::rr::{Name, RData, Record};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeLookup {
    nameservers: HashMap<String, Vec<String>>,
    hosts: HashMap<String, Ipv4Addr>,
    ns_calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn delegate(mut self, domain: &str, nameservers: &[(&str, Ipv4Addr)]) -> Self {
        self.nameservers.insert(
            domain.to_string(),
            nameservers.iter().map(|(ns, _)| ns.to_string()).collect(),
        );
        for (ns, addr) in nameservers {
            self.hosts.insert(ns.to_string(), *addr);
        }
        self
    }

    /// Domain exists but has no NS records.
    pub fn empty(mut self, domain: &str) -> Self {
        self.nameservers.insert(domain.to_string(), Vec::new());
        self
    }

    pub fn ns_calls(&self) -> Vec<String> {
        self.ns_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NameLookup for FakeLookup {
    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        self.ns_calls.lock().unwrap().push(domain.to_string());
        match self.nameservers.get(domain) {
            Some(ns) if ns.is_empty() => Err(LookupError::NoRecords {
                name: domain.to_string(),
                query: "NS",
            }),
            Some(ns) => Ok(ns.clone()),
            None => Err(LookupError::NxDomain { name: domain.to_string() }),
        }
    }

    async fn ipv4(&self, host: &str) -> Result<Ipv4Addr, LookupError> {
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| LookupError::NxDomain { name: host.to_string() })
    }
}

#[derive(Clone, Copy)]
pub enum Behaviour {
    Serve,
    Refuse,
    Break,
}

/// Serves a tiny zone from addresses set to `Serve`.
#[derive(Default)]
pub struct FakeTransfer {
    servers: HashMap<Ipv4Addr, Behaviour>,
    calls: Mutex<Vec<(SocketAddr, String)>>,
}

impl FakeTransfer {
    pub fn server(mut self, addr: Ipv4Addr, behaviour: Behaviour) -> Self {
        self.servers.insert(addr, behaviour);
        self
    }

    pub fn calls(&self) -> Vec<(SocketAddr, String)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn small_zone(domain: &str) -> Vec<Record> {
    let apex = Name::from_ascii(format!("{}.", domain)).unwrap();
    let www = Name::from_ascii(format!("www.{}.", domain)).unwrap();
    vec![
        Record::from_rdata(
            apex.clone(),
            3600,
            RData::SOA(SOA::new(
                Name::from_ascii(format!("ns1.{}.", domain)).unwrap(),
                Name::from_ascii(format!("hostmaster.{}.", domain)).unwrap(),
                1,
                3600,
                900,
                604800,
                86400,
            )),
        ),
        Record::from_rdata(www, 3600, RData::A(A(Ipv4Addr::new(192, 0, 2, 80)))),
    ]
}

#[async_trait]
impl ZoneTransfer for FakeTransfer {
    async fn transfer(&self, server: SocketAddr, domain: &str) -> Result<Vec<Record>, TransferError> {
        let addr = match server {
            SocketAddr::V4(v4) => *v4.ip(),
            SocketAddr::V6(_) => unreachable!("prober only dials IPv4"),
        };
        self.calls.lock().unwrap().push((server, domain.to_string()));

        match self.servers.get(&addr).copied().unwrap_or(Behaviour::Refuse) {
            Behaviour::Serve => Ok(small_zone(domain)),
            Behaviour::Refuse => Err(TransferError::Refused("REFUSED".to_string())),
            Behaviour::Break => Err(TransferError::Incomplete(0)),
        }
    }
}
