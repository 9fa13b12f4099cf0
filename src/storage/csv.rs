//! CSV output for single series and for the comparison matrices.
use crate::core::analytics::{CorrelationMatrix, LinearTrend, PerformanceTable};
use crate::core::series::Series;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Formats a value with the shortest digits that read back to the same
/// number; undefined values become empty cells.
///
/// Magnitudes below `1e-4` or from `1e16` up use exponent notation with a
/// signed two-digit exponent (`1.2e-05`, `1e+16`), everything else is plain
/// decimal with at least one fractional digit (`100.0`).
pub fn format_value(value: f64) -> String {
    match serde_json::Number::from_f64(value) {
        Some(n) => render_shortest(&n.to_string()),
        None => String::new(),
    }
}

fn render_shortest(shortest: &str) -> String {
    let (sign, unsigned) = match shortest.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", shortest),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = format!("{int_part}{frac_part}");

    // Decimal point position relative to the first significant digit.
    let leading_zeros = all_digits.len() - all_digits.trim_start_matches('0').len();
    let digits = all_digits.trim_matches('0');
    if digits.is_empty() {
        return format!("{sign}0.0");
    }
    let point = int_part.len() as i32 + exponent - leading_zeros as i32;
    let exp10 = point - 1;

    if !(-4..16).contains(&exp10) {
        let (first, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            first.to_string()
        } else {
            format!("{first}.{rest}")
        };
        let exp_sign = if exp10 < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exp10.abs());
    }

    let len = digits.len() as i32;
    if point <= 0 {
        format!("{sign}0.{}{digits}", "0".repeat((-point) as usize))
    } else if point >= len {
        format!("{sign}{digits}{}.0", "0".repeat((point - len) as usize))
    } else {
        let (int_digits, frac_digits) = digits.split_at(point as usize);
        format!("{sign}{int_digits}.{frac_digits}")
    }
}

/// One `date,value,` line per point, after a `date,value,` header.
pub fn write_series<W: Write>(writer: W, series: &Series) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "value", ""])?;
    for point in series.points() {
        wtr.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            format_value(point.value),
            String::new(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_file(path: &Path, series: &Series) -> Result<()> {
    let file = create(path)?;
    write_series(file, series)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))
}

/// Rows are dates, columns are series.
pub fn write_table<W: Write>(writer: W, table: &PerformanceTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["date".to_string()];
    header.extend(table.names().iter().cloned());
    wtr.write_record(&header)?;

    for (row, date) in table.dates().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(table.columns().iter().map(|c| format_value(c[row])));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_correlation<W: Write>(writer: W, matrix: &CorrelationMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![String::new()];
    header.extend(matrix.names.iter().cloned());
    wtr.write_record(&header)?;

    for (name, row) in matrix.names.iter().zip(&matrix.values) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|v| format_value(*v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trends<W: Write>(writer: W, trends: &[(String, LinearTrend)]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["series", "slope", "intercept"])?;
    for (name, trend) in trends {
        wtr.write_record([
            name.clone(),
            format_value(trend.slope),
            format_value(trend.intercept),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DateWindow;
    use crate::core::series::tests::{daily, date};
    use crate::core::window::RebasedSeries;

    #[test]
    fn test_series_csv_has_trailing_commas() {
        let series = daily("s", "2024-01-01", &[0.0, 4.761904761904767, -1.5]);
        let mut out = Vec::new();
        write_series(&mut out, &series).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,value,\n\
             2024-01-01,0.0,\n\
             2024-01-02,4.761904761904767,\n\
             2024-01-03,-1.5,\n"
        );
    }

    #[test]
    fn test_nan_is_empty_cell() {
        assert_eq!(format_value(f64::NAN), "");
        assert_eq!(format_value(100.0), "100.0");
    }

    #[test]
    fn test_exponent_notation_is_signed_and_padded() {
        assert_eq!(format_value(1.2e-5), "1.2e-05");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(-2.5e20), "-2.5e+20");
        assert_eq!(format_value(1.5e-300), "1.5e-300");
    }

    #[test]
    fn test_plain_decimal_range() {
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-0.0), "-0.0");
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(-12.345), "-12.345");
        assert_eq!(format_value(1234567890123456.0), "1234567890123456.0");
        assert_eq!(format_value(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_table_and_correlation_csv() {
        let window = DateWindow::new(date("2024-01-01"), date("2024-01-02")).unwrap();
        let table = PerformanceTable::new(vec![
            RebasedSeries {
                name: "a".to_string(),
                window,
                values: vec![0.0, 1.0],
            },
            RebasedSeries {
                name: "b".to_string(),
                window,
                values: vec![0.0, 2.0],
            },
        ])
        .unwrap();

        let mut out = Vec::new();
        write_table(&mut out, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,a,b\n2024-01-01,0.0,0.0\n2024-01-02,1.0,2.0\n"
        );

        let mut out = Vec::new();
        write_table(&mut out, &table.pct_change()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\n2024-01-01,,\n"));

        let mut out = Vec::new();
        write_correlation(&mut out, &table.correlation()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(",a,b\n"));
        assert!(text.contains("a,1.0,1.0\n"));

        let mut out = Vec::new();
        write_trends(&mut out, &table.trends()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "series,slope,intercept\na,1.0,0.0\nb,2.0,0.0\n"
        );
    }
}
