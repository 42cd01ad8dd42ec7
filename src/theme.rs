use anstyle::{AnsiColor, Color, RgbColor, Style};
use clap::builder::Styles;

pub const ACCENT_RGB: (u8, u8, u8) = (207, 106, 76);

pub const ACCENT: Style = Style::new()
    .fg_color(Some(Color::Rgb(RgbColor(
        ACCENT_RGB.0,
        ACCENT_RGB.1,
        ACCENT_RGB.2,
    ))))
    .bold();
pub const LITERAL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
pub const DIM: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
pub const FAILURE: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)))
    .bold();

/// Styles for generated help and usage errors
#[must_use]
pub fn help_styles() -> Styles {
    Styles::styled()
        .header(ACCENT)
        .usage(ACCENT)
        .literal(LITERAL)
        .placeholder(DIM)
        .error(FAILURE)
        .invalid(FAILURE)
        .valid(LITERAL)
}

/// Prefix for fatal errors printed by the binary
#[must_use]
pub fn error_prefix() -> String {
    format!("{FAILURE}error:{FAILURE:#}")
}
