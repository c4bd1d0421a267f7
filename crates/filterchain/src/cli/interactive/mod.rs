//! Interactive mode for bare `filterchain` on a TTY.
//!
//! One [`FilterChain`] lives for the whole session, so a new run under the
//! same work name replaces the previous one exactly as the flag-based CLI does.

pub mod filter;
pub mod theme;

use console::Style;
use dialoguer::Select;
use filterchain_core::{Config, FilterChain};

/// `Ok(None)` on interrupt (Ctrl+C / terminal disconnect), `Err` on other
/// I/O failures. Wraps calls that lack an `_opt` variant.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Filter an image",
    "Browse gallery",
    "Clean scratch directory",
    "Show configuration",
    "Exit",
];

pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let chain = FilterChain::new(config)?;
    let theme = theme::filterchain_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => filter::guided_filter(&chain).await?,
            Some(1) => show_gallery(&chain),
            Some(2) => clean(&chain),
            Some(3) => show_config(chain.config()),
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn show_gallery(chain: &FilterChain) {
    let dim = Style::new().for_stderr().dim();
    let images = chain.gallery();

    eprintln!();
    if images.is_empty() {
        eprintln!("  {}", dim.apply_to("Gallery is empty."));
    }
    for path in &images {
        eprintln!("  {}", path.display());
    }
    eprintln!();
}

fn clean(chain: &FilterChain) {
    let green = Style::new().for_stderr().green();
    let red = Style::new().for_stderr().red();

    eprintln!();
    match chain.cleanup() {
        Ok(report) if report.failed.is_empty() => eprintln!(
            "  {} Removed {} scratch image(s)",
            green.apply_to("✓"),
            report.deleted.len()
        ),
        Ok(report) => eprintln!(
            "  {} Removed {}, could not remove {}",
            red.apply_to("✗"),
            report.deleted.len(),
            report.failed.len()
        ),
        Err(e) => eprintln!("  {} Cleanup failed: {e}", red.apply_to("✗")),
    }
    eprintln!();
}

fn show_config(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<20} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Scratch dir:"),
        config.scratch_dir().display()
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Gallery dir:"),
        config.gallery_dir().display()
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Work name:"),
        config.pipeline.work_name
    );
    eprintln!(
        "    {:<20} {} retries, {}ms base delay",
        label.apply_to("Retry:"),
        config.pipeline.retry_attempts,
        config.pipeline.retry_delay_ms
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Upload endpoint:"),
        config.upload.endpoint
    );
    eprintln!();
}
