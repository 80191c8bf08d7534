use crate::{
    axfr::{TcpTransfer, TransferError, ZoneTransfer},
    resolve::{LookupError, NameLookup, SystemResolver},
    types::Zone,
    zone::build_zone,
};
use hickory_resolver::ResolveError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, Level};

const DNS_PORT: u16 = 53;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to resolve nameserver address: {0}")]
    Lookup(#[from] LookupError),
    #[error("Zone transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl ProbeError {
    /// Address lookups that fail are errors, broken transfers only warnings.
    pub fn level(&self) -> Level {
        match self {
            ProbeError::Lookup(_) => Level::ERROR,
            ProbeError::Transfer(_) => Level::WARN,
        }
    }
}

/// Asks nameservers for copies of zones.
pub struct Prober<L = SystemResolver, T = TcpTransfer> {
    lookup: L,
    transfer: T,
}

impl Prober {
    /// Lookups through the system resolver, transfers over TCP.
    pub fn system(step_timeout: Duration, deadline: Duration) -> Result<Self, ResolveError> {
        Ok(Self::with_parts(
            SystemResolver::new()?,
            TcpTransfer::new(step_timeout, deadline),
        ))
    }
}

impl<L: NameLookup, T: ZoneTransfer> Prober<L, T> {
    pub fn with_parts(lookup: L, transfer: T) -> Self {
        Self { lookup, transfer }
    }

    #[cfg(test)]
    pub(crate) fn lookup(&self) -> &L {
        &self.lookup
    }

    #[cfg(test)]
    pub(crate) fn transfer(&self) -> &T {
        &self.transfer
    }

    pub async fn nameservers(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        self.lookup.nameservers(domain).await
    }

    /// Tries to transfer `domain` from `nameserver`.
    ///
    /// `Ok(None)` means the server declined. Anything else that goes wrong
    /// comes back as an error.
    pub async fn probe(&self, domain: &str, nameserver: &str) -> Result<Option<Zone>, ProbeError> {
        let address = self.lookup.ipv4(nameserver).await?;
        debug!(domain, nameserver, %address, "Requesting zone transfer");

        let server = SocketAddr::from((address, DNS_PORT));
        match self.transfer.transfer(server, domain).await {
            Ok(records) => {
                let zone = build_zone(domain, nameserver, records);
                debug!(domain, nameserver, records = zone.records.len(), "Zone transferred");
                Ok(Some(zone))
            }
            Err(TransferError::Refused(reason)) => {
                info!("No zone transfer allowed in {} for {}", nameserver, domain);
                debug!(domain, nameserver, %reason, "Transfer refused");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
