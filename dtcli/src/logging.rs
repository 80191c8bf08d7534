use tracing::Level;

/// Logging set up once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub verbosity: u8,
}

impl LogConfig {
    pub fn from_verbosity(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// 0 keeps warnings and errors, 1 adds info, 2 and up add debug.
    pub fn level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    /// Installs the global subscriber. Diagnostics go to stderr so zones on
    /// stdout stay clean.
    pub fn init(&self) {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(self.level())
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .without_time()
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level(), Level::WARN);
        assert_eq!(LogConfig::from_verbosity(1).level(), Level::INFO);
        assert_eq!(LogConfig::from_verbosity(2).level(), Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(7).level(), Level::DEBUG);
    }
}
