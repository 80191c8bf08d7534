pub mod axfr;
pub mod parents;
mod prober;
pub mod resolve;
mod scanner;
#[cfg(test)]
mod testing;
mod types;
mod zone;

pub use axfr::{TcpTransfer, TransferError, ZoneTransfer};
pub use parents::expand_parents;
pub use prober::{ProbeError, Prober};
pub use resolve::{LookupError, NameLookup, SystemResolver};
pub use scanner::{ScanError, Scanner};
pub use types::{Record, ScanConfig, ScanSummary, Zone};
pub use zone::build_zone;
