use std::path::PathBuf;

use clap::Parser;

use crate::logging::{LogTarget, TracingConfig};

/// Swipe through a concert setlist with covers tinted by their artwork.
#[derive(Parser, Debug)]
#[command(name = "setlist-vote", version, about)]
pub struct Args {
    /// Directory that cover image locators are resolved against
    #[arg(short, long, default_value = ".")]
    pub assets: PathBuf,

    /// JSON catalog to use instead of the built-in setlist
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Width of one carousel item in pixels
    #[arg(long, default_value_t = 340.0, value_parser = parse_item_width)]
    pub item_width: f32,

    /// Launch the interactive carousel
    #[arg(long)]
    pub tui: bool,

    /// Print colors as CSS rgb() triples instead of hex
    #[arg(long)]
    pub css: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn tracing_config(&self) -> TracingConfig {
        let target = match (&self.log_file, self.tui) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, true) => LogTarget::Discard,
            (None, false) => LogTarget::Stderr,
        };
        TracingConfig {
            debug: self.debug,
            target,
        }
    }
}

fn parse_item_width(s: &str) -> Result<f32, String> {
    let width: f32 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if width > 0.0 && width.is_finite() {
        Ok(width)
    } else {
        Err(format!("item width must be positive, got {s}"))
    }
}
