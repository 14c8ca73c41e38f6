// Logging and verbosity control

use tracing_subscriber::EnvFilter;

/// Verbosity levels selected by the global flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Only errors
    Quiet,
    /// Warnings such as failed server attempts
    Normal,
    /// Per-request debug output
    Verbose,
}

impl VerbosityLevel {
    /// `quiet` wins over `verbose`
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn default_directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "lodestar_updates=debug,lodestar_http=debug,lodestar_cli=debug,info",
        }
    }

    /// Build the env filter, preferring `RUST_LOG` when it parses
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Initialize logging based on CLI flags. Output goes to stderr so `--json`
/// stays machine-readable.
pub fn init_logging(verbose: bool, quiet: bool) -> VerbosityLevel {
    let level = VerbosityLevel::from_flags(verbose, quiet);

    // A subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level.env_filter())
        .with_writer(std::io::stderr)
        .with_target(level == VerbosityLevel::Verbose)
        .try_init();

    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins() {
        assert_eq!(VerbosityLevel::from_flags(true, true), VerbosityLevel::Quiet);
        assert_eq!(VerbosityLevel::from_flags(true, false), VerbosityLevel::Verbose);
        assert_eq!(VerbosityLevel::from_flags(false, false), VerbosityLevel::Normal);
    }

    #[test]
    fn test_directives_parse() {
        for level in [
            VerbosityLevel::Quiet,
            VerbosityLevel::Normal,
            VerbosityLevel::Verbose,
        ] {
            assert!(level.default_directive().parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(VerbosityLevel::Quiet < VerbosityLevel::Normal);
        assert!(VerbosityLevel::Normal < VerbosityLevel::Verbose);
    }
}
