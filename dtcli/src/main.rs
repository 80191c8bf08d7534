mod logging;
mod output;
mod targets;

use clap::Parser;
use libaxfr_probe::{ScanConfig, Scanner};
use logging::LogConfig;
use output::{OutputFormat, ZonePrinter};
use std::{io, time::Duration};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dns-transfer")]
#[command(about = "Check if name servers allow DNS zone transfer", long_about = None)]
struct Args {
    /// Domain to check, file with one domain per line, or - for stdin
    domain: Vec<String>,

    /// Output each zone as one JSON object per line
    #[arg(long, short = 'j')]
    json: bool,

    /// Check parent domains as well, starting from the registrable domain
    #[arg(long, short = 'p')]
    parent: bool,

    /// Stop checking when one name server returns zone info
    #[arg(long)]
    one: bool,

    /// Seconds to wait on each step of a zone transfer
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Seconds a whole zone transfer may take
    #[arg(long, default_value_t = 60)]
    max_time: u64,

    /// Verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    LogConfig::from_verbosity(args.verbose).init();

    let config = ScanConfig {
        parents: args.parent,
        stop_on_first: args.one,
        transfer_timeout: Duration::from_secs(args.timeout),
        transfer_deadline: Duration::from_secs(args.max_time),
    };
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut scanner = Scanner::new(config)?;
        let mut printer = ZonePrinter::new(io::stdout().lock(), format);

        let summary = scanner
            .scan(targets::read_targets(&args.domain), |zone| printer.print(zone))
            .await?;

        info!(
            targets = summary.targets,
            checked = summary.domains_checked,
            skipped = summary.domains_skipped,
            nameservers = summary.nameservers_probed,
            zones = summary.zones_found,
            "Done"
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
