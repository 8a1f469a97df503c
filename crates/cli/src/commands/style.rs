//! Terminal styling for conflictkit output.
//!
//! Status lines (`success`, `warn`) go to whichever stream the caller picks;
//! `ours` / `theirs` color the two sides of a hunk consistently.

use console::Style;

/// Enable or disable colors on both output streams.
pub fn set_colors(enabled: bool) {
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Green checkmark prefix, for files written or checked clean.
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Yellow warning prefix, for empty blocks and conflict counts.
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Bold heading for a file or conflict title.
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Dimmed annotation such as a line range.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Label for the current-branch side (blue).
pub fn ours(msg: &str) -> String {
    let style = Style::new().blue().bold();
    style.apply_to(msg).to_string()
}

/// Label for the incoming side (magenta).
pub fn theirs(msg: &str) -> String {
    let style = Style::new().magenta().bold();
    style.apply_to(msg).to_string()
}
