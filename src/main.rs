use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use setlist_vote::carousel::CarouselController;
use setlist_vote::catalog::Catalog;
use setlist_vote::cli::Args;
use setlist_vote::logging::init_tracing;
use setlist_vote::sampler::{ColorCache, ExtractionWorker, FsImageSource};
use setlist_vote::tui::button::BuyNowButton;
use setlist_vote::tui::{self, TuiApp};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.tracing_config())?;

    let catalog = Arc::new(match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    });
    let source = Arc::new(FsImageSource::new(&args.assets));
    info!(
        items = catalog.len(),
        assets = %source.root().display(),
        "starting color extraction"
    );
    let worker = ExtractionWorker::spawn(source, Arc::clone(&catalog))
        .context("failed to start color extraction thread")?;

    if args.tui {
        let controller = CarouselController::new(catalog.len(), args.item_width, Instant::now())?;
        let button = BuyNowButton::new().on_click(|| info!("buy now clicked"));
        return tui::run(TuiApp::new(catalog, controller, Some(worker), button));
    }

    let mut cache = ColorCache::new();
    worker.wait_into(&mut cache);
    print_colors(&catalog, &cache, args.css)
}

/// One line per item: id, color, title.
fn print_colors(catalog: &Catalog, cache: &ColorCache, css: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for item in catalog.items() {
        let color = cache.resolve(catalog, item.id);
        let color = if css { color.to_css_rgb() } else { color.to_hex() };
        writeln!(out, "{}\t{}\t{}", item.id, color, item.title)?;
    }
    Ok(())
}
