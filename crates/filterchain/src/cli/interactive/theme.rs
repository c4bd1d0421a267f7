//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Magenta prompts, green success marks, red errors.
pub fn filterchain_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        checked_item_prefix: style("◉".to_string()).for_stderr().green(),
        unchecked_item_prefix: style("○".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the version banner to stderr so stdout stays clean.
pub fn print_banner() {
    let version_line = format!("Filterchain v{}", filterchain_core::VERSION);
    let tagline = "watercolor · grayscale · blur";

    let inner_width = tagline.chars().count() + 4;

    let top = format!("  ╭{:─<width$}╮", "", width = inner_width);
    let mid1 = format!("  │{:^width$}│", version_line, width = inner_width);
    let mid2 = format!("  │{:^width$}│", tagline, width = inner_width);
    let bot = format!("  ╰{:─<width$}╯", "", width = inner_width);

    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    for line in [&top, &mid1, &mid2, &bot] {
        eprintln!("{}", magenta.apply_to(line));
    }
    eprintln!();
}
