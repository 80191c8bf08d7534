use async_trait::async_trait;
use hickory_resolver::{ResolveError, TokioResolver};
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No {query} records for {name}")]
    NoRecords { name: String, query: &'static str },
    #[error("Domain {name} does not exist")]
    NxDomain { name: String },
    #[error("Lookup of {name} failed: {source}")]
    Resolve {
        name: String,
        #[source]
        source: ResolveError,
    },
}

impl LookupError {
    fn from_resolve(name: &str, query: &'static str, err: ResolveError) -> Self {
        if err.is_nx_domain() {
            LookupError::NxDomain { name: name.to_string() }
        } else if err.is_no_records_found() {
            LookupError::NoRecords { name: name.to_string(), query }
        } else {
            LookupError::Resolve { name: name.to_string(), source: err }
        }
    }
}

/// The two questions asked of the recursive resolver.
#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Nameserver hostnames for `domain`, in the order the answer lists them.
    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, LookupError>;

    /// First IPv4 address of `host`.
    async fn ipv4(&self, host: &str) -> Result<Ipv4Addr, LookupError>;
}

/// Lookups through the system's configured resolver.
pub struct SystemResolver {
    resolver: TokioResolver,
}

impl SystemResolver {
    pub fn new() -> Result<Self, ResolveError> {
        let resolver = TokioResolver::builder_tokio()?.build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl NameLookup for SystemResolver {
    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        let lookup = self
            .resolver
            .ns_lookup(domain)
            .await
            .map_err(|e| LookupError::from_resolve(domain, "NS", e))?;

        let nameservers: Vec<String> = lookup.iter().map(|ns| ns.to_string()).collect();
        if nameservers.is_empty() {
            return Err(LookupError::NoRecords { name: domain.to_string(), query: "NS" });
        }

        debug!(domain, count = nameservers.len(), "NS lookup answered");
        Ok(nameservers)
    }

    async fn ipv4(&self, host: &str) -> Result<Ipv4Addr, LookupError> {
        let lookup = self
            .resolver
            .ipv4_lookup(host)
            .await
            .map_err(|e| LookupError::from_resolve(host, "A", e))?;

        lookup
            .iter()
            .next()
            .map(|a| a.0)
            .ok_or_else(|| LookupError::NoRecords { name: host.to_string(), query: "A" })
    }
}
