use clap::Parser;
use std::path::PathBuf;

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "wfw", version = VERSION, about = "Waterfall grid viewer TUI")]
pub struct Cli {
    /// Project identifier used in page and build variant links
    #[arg(short, long)]
    pub project: String,

    /// Page JSON file; `{skip}` is replaced by the requested offset
    #[arg(short, long, value_name = "TEMPLATE")]
    pub data: String,

    /// Number of newest versions to skip on the first page
    #[arg(short, long, default_value_t = 0)]
    pub skip: u64,

    /// IANA timezone for header timestamps
    #[arg(short, long, default_value = "UTC", value_parser = validate_timezone)]
    pub tz: String,

    /// View state file (defaults to $XDG_STATE_HOME/wfw/state.json)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Enable verbose logging to $XDG_STATE_HOME/wfw/debug.log
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accepts any timezone name chrono-tz knows about.
pub fn validate_timezone(s: &str) -> Result<String, String> {
    s.parse::<chrono_tz::Tz>()
        .map(|_| s.to_string())
        .map_err(|_| format!("unknown timezone '{s}', expected an IANA name like America/New_York"))
}
