// Delimited-file persistence shared by every table in the crate.
//
// Loading returns raw string fields: typed coercion happens where the values
// are used, so a single malformed cell can be skipped without losing the
// whole file. Saving writes rows in memory order, no header, CRLF line ends
// (the convention of the tools that consume these matrices).

use std::fs::{self, File};
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::debug;

use crate::error::{Result, SptmError};

/// How to read a delimited file.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// Lines starting with this byte are skipped entirely
    pub comment: Option<u8>,
    /// Remove NUL bytes from the raw input before parsing
    pub strip_nul: bool,
}

impl ReadOptions {
    pub fn comma() -> Self {
        Self {
            delimiter: b',',
            comment: None,
            strip_nul: false,
        }
    }

    pub fn tab() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::comma()
        }
    }
}

/// A value that can be written as one delimited field.
pub trait ToField {
    fn to_field(&self) -> String;
}

impl ToField for f64 {
    fn to_field(&self) -> String {
        format_float(*self)
    }
}

impl ToField for String {
    fn to_field(&self) -> String {
        self.clone()
    }
}

impl ToField for &str {
    fn to_field(&self) -> String {
        (*self).to_string()
    }
}

impl ToField for usize {
    fn to_field(&self) -> String {
        self.to_string()
    }
}

/// Format a float the way the downstream tools expect: shortest
/// round-trip digits, a trailing `.0` on integral values, and exponent form
/// (`1e-05`, `2.5e+16`) when the decimal exponent is below -4 or at least 16.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.5e-7"
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let fixed = value.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// Parse a delimited file into rows of string fields.
///
/// Blank lines are skipped. Rows may have differing widths; shape checks
/// belong to whoever interprets the rows. Fields are decoded as UTF-8 one at
/// a time, with invalid bytes replaced by U+FFFD, so a stray byte in a text
/// column only spoils the cell it sits in.
pub fn load(path: &Path, options: ReadOptions) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(SptmError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |source: csv::Error| SptmError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut bytes = fs::read(path).map_err(|e| unreadable(csv::Error::from(e)))?;
    if options.strip_nul {
        bytes.retain(|&b| b != 0);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .comment(options.comment)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(unreadable)?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded delimited file");
    Ok(rows)
}

/// Write a table as comma-delimited text, one row per line.
///
/// Parent directories are created if needed.
pub fn save<T: ToField>(path: &Path, rows: &[Vec<T>]) -> Result<()> {
    let output_err = |source: io::Error| SptmError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(output_err)?;
        }
    }

    let file = File::create(path).map_err(output_err)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::CRLF)
        .from_writer(file);

    for row in rows {
        let fields: Vec<String> = row.iter().map(ToField::to_field).collect();
        writer
            .write_record(&fields)
            .map_err(|e| output_err(e.into()))?;
    }
    writer.flush().map_err(output_err)?;

    debug!(path = %path.display(), rows = rows.len(), "Saved delimited file");
    Ok(())
}

/// Parse every field of a loaded table as a float.
///
/// Used for re-reading matrices this crate wrote itself, where every cell
/// is numeric. The first bad cell is reported with its position.
pub fn parse_matrix(rows: &[Vec<String>]) -> Result<Vec<Vec<f64>>> {
    rows.iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| {
                    cell.trim().parse::<f64>().map_err(|_| SptmError::InvalidValue {
                        row: r,
                        column: c,
                        value: cell.clone(),
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_integral_values_keep_decimal() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(65.0), "65.0");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn test_format_float_fractions_round_trip() {
        for v in [0.1, 1.0 / 3.0, 2.5e-7, 48.75] {
            let text = format_float(v);
            assert_eq!(text.parse::<f64>().unwrap(), v, "{text} did not round-trip");
        }
    }

    #[test]
    fn test_format_float_exponent_form_outside_fixed_range() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(2.5e16), "2.5e+16");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(-3.25e-120), "-3.25e-120");
    }

    #[test]
    fn test_format_float_fixed_range_edges() {
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00012), "0.00012");
        assert_eq!(format_float(9999999999999998.0), "9999999999999998.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/definitely/not/here.csv"), ReadOptions::comma()).unwrap_err();
        assert!(matches!(err, SptmError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_strips_nul_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        fs::write(&path, b"1,a\n\0\n\n2\0,b\n").unwrap();

        let options = ReadOptions {
            strip_nul: true,
            ..ReadOptions::comma()
        };
        let rows = load(&path, options).unwrap();
        assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);
    }

    #[test]
    fn test_load_keeps_rows_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        fs::write(&path, b"1,great\n1,caf\xe9\n\xff2,room\n").unwrap();

        let rows = load(&path, ReadOptions::comma()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "1");
        assert_eq!(rows[1][1], "caf\u{FFFD}");
        assert_eq!(rows[2][0], "\u{FFFD}2");
    }

    #[test]
    fn test_load_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path(), ReadOptions::comma()).unwrap_err();
        assert!(matches!(err, SptmError::Unreadable { .. }));
    }

    #[test]
    fn test_load_tab_with_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doctopics.txt");
        fs::write(&path, "#doc name topic proportion\n0\tdoc0\t0.5\t0.5\n").unwrap();

        let options = ReadOptions {
            comment: Some(b'#'),
            ..ReadOptions::tab()
        };
        let rows = load(&path, options).unwrap();
        assert_eq!(rows, vec![vec!["0", "doc0", "0.5", "0.5"]]);
    }

    #[test]
    fn test_save_creates_parent_and_uses_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        save(&path, &[vec![1.0, 0.25], vec![0.0, 65.0]]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1.0,0.25\r\n0.0,65.0\r\n");
    }

    #[test]
    fn test_parse_matrix_reports_position() {
        let rows = vec![
            vec!["1.0".to_string(), "2.0".to_string()],
            vec!["3.0".to_string(), "oops".to_string()],
        ];
        match parse_matrix(&rows) {
            Err(SptmError::InvalidValue { row, column, value }) => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(value, "oops");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
