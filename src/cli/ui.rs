use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn name_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Creates a cell for displaying percentage change with color coding.
/// Undefined values are shown as "N/A".
pub fn change_cell(change: f64) -> Cell {
    if !change.is_finite() {
        return na_cell();
    }
    let text = format!("{change:.2}%");
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// A plain right-aligned number with `precision` decimals.
pub fn number_cell(value: f64, precision: usize) -> Cell {
    if !value.is_finite() {
        return na_cell();
    }
    Cell::new(format!("{value:.precision$}")).set_alignment(CellAlignment::Right)
}

/// Correlation coefficients, strongest relationships highlighted.
pub fn correlation_cell(value: f64) -> Cell {
    if !value.is_finite() {
        return na_cell();
    }
    let cell = Cell::new(format!("{value:.3}")).set_alignment(CellAlignment::Right);
    if value >= 0.8 {
        cell.fg(Color::Green).add_attribute(Attribute::Bold)
    } else if value <= -0.5 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

pub fn empty_cell() -> Cell {
    Cell::new("")
}

/// Creates a new `indicatif::ProgressBar` showing the last finished item.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let bar_style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(bar_style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_cell_formats_two_decimals() {
        assert_eq!(change_cell(12.345).content(), "12.35%");
        assert_eq!(change_cell(-0.5).content(), "-0.50%");
        assert_eq!(change_cell(f64::NAN).content(), "N/A");
    }

    #[test]
    fn test_number_and_correlation_cells() {
        assert_eq!(number_cell(0.123456, 4).content(), "0.1235");
        assert_eq!(number_cell(f64::INFINITY, 4).content(), "N/A");
        assert_eq!(correlation_cell(0.98765).content(), "0.988");
        assert_eq!(correlation_cell(f64::NAN).content(), "N/A");
    }

    #[test]
    fn test_progress_bar_carries_message() {
        let pb = new_progress_bar(3);
        pb.set_message("EUR=X");
        pb.inc(1);
        assert_eq!(pb.message(), "EUR=X");
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.length(), Some(3));
    }
}
