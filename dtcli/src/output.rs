use libaxfr_probe::Zone;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Writes zones to `out` as they arrive, flushing after each one.
pub struct ZonePrinter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ZonePrinter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn print(&mut self, zone: &Zone) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => write_plain(&mut self.out, zone)?,
            OutputFormat::Json => write_json(&mut self.out, zone)?,
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn write_plain<W: Write>(out: &mut W, zone: &Zone) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "###### Zone {} ######", zone.domain)?;
    writeln!(out, "Domain: {}", zone.domain)?;
    writeln!(out, "Nameserver: {}", zone.nameserver)?;
    writeln!(out, "Records::")?;
    for record in &zone.records {
        writeln!(out, "{} {} {} {}", record.name, record.class, record.rtype, record.data)?;
    }
    Ok(())
}

fn write_json<W: Write>(out: &mut W, zone: &Zone) -> io::Result<()> {
    serde_json::to_writer(&mut *out, zone)?;
    writeln!(out)
}
