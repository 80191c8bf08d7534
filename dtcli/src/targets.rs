use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::warn;

/// Where a batch of targets comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    Literal(String),
    File(PathBuf),
    Stdin,
}

impl TargetSource {
    /// `-` is standard input, anything naming a readable file is that file,
    /// and everything else is taken as a domain.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            return TargetSource::Stdin;
        }
        let path = PathBuf::from(arg);
        if path.metadata().map(|m| m.is_file()).unwrap_or(false) {
            TargetSource::File(path)
        } else {
            TargetSource::Literal(arg.to_string())
        }
    }

    fn lines(self) -> Box<dyn Iterator<Item = String>> {
        match self {
            TargetSource::Literal(target) => Box::new(std::iter::once(target)),
            TargetSource::File(path) => match File::open(&path) {
                Ok(file) => Box::new(read_lines(BufReader::new(file), path.display().to_string())),
                Err(e) => {
                    warn!("Failed to open {}: {}", path.display(), e);
                    Box::new(std::iter::empty())
                }
            },
            TargetSource::Stdin => Box::new(read_lines(io::stdin().lock(), "<stdin>".to_string())),
        }
    }
}

/// Lines of `reader` until the first read error, which is logged.
fn read_lines<R: BufRead + 'static>(reader: R, origin: String) -> impl Iterator<Item = String> {
    reader.lines().map_while(move |line| match line {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("Stopped reading {}: {}", origin, e);
            None
        }
    })
}

/// Drops surrounding whitespace, blank lines and `#` comments.
pub fn clean_lines<I>(lines: I) -> impl Iterator<Item = String>
where
    I: Iterator<Item = String>,
{
    lines.filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            None
        } else {
            Some(line.to_string())
        }
    })
}

/// Lazily reads every target named by `args`, standard input when there are
/// none.
pub fn read_targets(args: &[String]) -> impl Iterator<Item = String> {
    let sources: Vec<TargetSource> = if args.is_empty() {
        vec![TargetSource::Stdin]
    } else {
        args.iter().map(|arg| TargetSource::from_arg(arg)).collect()
    };

    clean_lines(sources.into_iter().flat_map(TargetSource::lines))
}
