use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE_DIR: &str = "./database";
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Run-wide options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hides the banner line at startup.
    pub no_banner: bool,
    /// `0` prints everything, `1` drops headers, `2` only the summary.
    pub quiet: u8,
    /// How long the sweep keeps listening after the last echo request.
    pub ping_timeout: Duration,
    /// Upper bound of hosts polled at the same time. `1` polls sequentially.
    pub concurrency: usize,
    /// Directory receiving one `<ip>.json` record per host.
    pub database_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_banner: false,
            quiet: 0,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            database_dir: PathBuf::from(DEFAULT_DATABASE_DIR),
        }
    }
}
