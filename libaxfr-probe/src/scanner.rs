use crate::{
    axfr::{TcpTransfer, ZoneTransfer},
    parents::expand_parents,
    prober::Prober,
    resolve::{LookupError, NameLookup, SystemResolver},
    types::{ScanConfig, ScanSummary, Zone},
};
use hickory_resolver::ResolveError;
use std::collections::HashSet;
use std::io;
use thiserror::Error;
use tracing::{debug, error, info, warn, Level};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to write zone: {0}")]
    Output(#[from] io::Error),
}

/// Walks the targets of one run and hands every exposed zone to the caller.
///
/// A domain is only ever checked once per scanner. With `parents` enabled a
/// target is replaced by its ancestors, registrable domain first; as soon as
/// one of them turns out to be checked already, the more specific ones left
/// for that target are skipped too.
pub struct Scanner<L = SystemResolver, T = TcpTransfer> {
    prober: Prober<L, T>,
    config: ScanConfig,
    checked: HashSet<String>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ResolveError> {
        let prober = Prober::system(config.transfer_timeout, config.transfer_deadline)?;
        Ok(Self::with_prober(prober, config))
    }
}

impl<L: NameLookup, T: ZoneTransfer> Scanner<L, T> {
    pub fn with_prober(prober: Prober<L, T>, config: ScanConfig) -> Self {
        Self {
            prober,
            config,
            checked: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_checked(&self, domain: &str) -> bool {
        self.checked.contains(domain)
    }

    /// Checks every target, calling `emit` for each zone as soon as it comes
    /// in. Only a failing `emit` ends the run early.
    pub async fn scan<I, F>(&mut self, targets: I, mut emit: F) -> Result<ScanSummary, ScanError>
    where
        I: IntoIterator<Item = String>,
        F: FnMut(&Zone) -> io::Result<()>,
    {
        let mut summary = ScanSummary::default();

        for target in targets {
            summary.targets += 1;

            let candidates = if self.config.parents {
                expand_parents(&target)
            } else {
                vec![target]
            };

            for (i, domain) in candidates.iter().enumerate() {
                if self.checked.contains(domain) {
                    debug!(domain = %domain, remaining = candidates.len() - i - 1, "Already checked");
                    summary.domains_skipped += candidates.len() - i;
                    break;
                }
                self.checked.insert(domain.clone());
                summary.domains_checked += 1;

                self.check_domain(domain, &mut emit, &mut summary).await?;
            }
        }

        Ok(summary)
    }

    async fn check_domain<F>(
        &self,
        domain: &str,
        emit: &mut F,
        summary: &mut ScanSummary,
    ) -> Result<(), ScanError>
    where
        F: FnMut(&Zone) -> io::Result<()>,
    {
        info!("Checking {}", domain);

        let nameservers = match self.prober.nameservers(domain).await {
            Ok(nameservers) => nameservers,
            Err(LookupError::NoRecords { .. }) => {
                error!("No nameservers for {}", domain);
                return Ok(());
            }
            Err(e) => {
                error!("Not able to retrieve name servers for {}: {}", domain, e);
                return Ok(());
            }
        };
        info!("{} nameservers: {}", domain, nameservers.join(","));

        for nameserver in &nameservers {
            summary.nameservers_probed += 1;

            match self.prober.probe(domain, nameserver).await {
                Ok(Some(zone)) if !zone.is_empty() => {
                    summary.zones_found += 1;
                    emit(&zone)?;
                    if self.config.stop_on_first {
                        debug!(domain, nameserver = %nameserver, "Stopping at first exposed zone");
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) if e.level() == Level::ERROR => {
                    error!(domain, nameserver = %nameserver, error = %e, "Zone transfer attempt failed");
                }
                Err(e) => {
                    warn!(domain, nameserver = %nameserver, error = %e, "Zone transfer attempt failed");
                }
            }
        }

        Ok(())
    }
}
