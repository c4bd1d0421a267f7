//! Guided filter flow: image source → filters → destination → run.

use console::Style;
use dialoguer::{Input, MultiSelect, Select};
use filterchain_core::{FilterChain, FilterOptions, FilterRequest};
use std::path::PathBuf;

use super::theme::filterchain_theme;
use crate::cli::run::run_request;

const FILTER_ITEMS: &[&str] = &["Watercolor", "Grayscale", "Blur"];

/// Map multi-select indices and the destination choice to options.
fn options_from(selected: &[usize], save_locally: bool) -> FilterOptions {
    FilterOptions {
        watercolor: selected.contains(&0),
        grayscale: selected.contains(&1),
        blur: selected.contains(&2),
        save_locally,
    }
}

pub async fn guided_filter(chain: &FilterChain) -> anyhow::Result<()> {
    let theme = filterchain_theme();
    let warn = Style::new().for_stderr().yellow();

    let source = Select::with_theme(&theme)
        .with_prompt("Image source")
        .items(&["Pick a file", "Generate a stock image"])
        .default(0)
        .interact_opt()?;

    let image = match source {
        Some(0) => loop {
            let Some(raw) = super::handle_interrupt(
                Input::<String>::with_theme(&theme)
                    .with_prompt("Path to image")
                    .interact_text(),
            )?
            else {
                return Ok(());
            };

            let path = PathBuf::from(shellexpand::tilde(raw.trim()).into_owned());
            if path.is_file() {
                break path.display().to_string();
            }
            eprintln!(
                "  {}",
                warn.apply_to(format!("Not a file: {}", path.display()))
            );
        },
        Some(_) => chain.stock_image(None)?.to_string(),
        None => return Ok(()),
    };

    let Some(selected) = MultiSelect::with_theme(&theme)
        .with_prompt("Filters (space to toggle)")
        .items(FILTER_ITEMS)
        .interact_opt()?
    else {
        return Ok(());
    };

    let save_locally = match Select::with_theme(&theme)
        .with_prompt("Destination")
        .items(&["Save to gallery", "Upload"])
        .default(0)
        .interact_opt()?
    {
        Some(choice) => choice == 0,
        None => return Ok(()),
    };

    let request = FilterRequest::new(image).with_options(options_from(&selected, save_locally));

    eprintln!();
    match run_request(chain, &request).await {
        Ok(summary) => {
            let green = Style::new().for_stderr().green();
            eprintln!(
                "  {} {}",
                green.apply_to("✓"),
                summary.image_uri.as_deref().unwrap_or("done")
            );
        }
        Err(e) => {
            let red = Style::new().for_stderr().red();
            eprintln!("  {} {e:#}", red.apply_to("✗"));
        }
    }
    eprintln!();

    Ok(())
}
