pub mod stats;
pub mod time;

use crate::error::{DatasetError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Column names the views depend on. Matching is case-sensitive.
pub mod columns {
    pub const TIME: &str = "Time";
    pub const TEMPERATURE: &str = "Temperature (c)";
    pub const PH: &str = "pH";
    pub const ODO: &str = "ODO mg/L";
    pub const LONGITUDE: &str = "Longitude";
    pub const LATITUDE: &str = "Latitude";
    pub const DEPTH: &str = "Total Water Column (m)";
}

/// Water quality observations, one independent row per measurement.
///
/// Loaded once at startup and never mutated afterwards; views borrow it.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn load(path: &Path, delimiter: char) -> Result<Self> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), delimiter)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() {
            return Err(DatasetError::Delimiter(delimiter));
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter as u8)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(DatasetError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // Short rows are padded so every row lines up with the header.
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Values of a numeric column in row order; missing cells are `None`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                parse_cell(&row[idx]).map_err(|value| DatasetError::NonNumeric {
                    column: name.to_string(),
                    row: row_idx + 1,
                    value,
                })
            })
            .collect()
    }

    /// Columns where every non-empty cell is a number and at least one cell is
    /// filled, in header order, with missing cells dropped.
    pub fn numeric_columns(&self) -> Vec<(&str, Vec<f64>)> {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let mut values = Vec::with_capacity(self.rows.len());
                for row in &self.rows {
                    match parse_cell(&row[idx]) {
                        Ok(Some(v)) => values.push(v),
                        Ok(None) => {}
                        Err(_) => return None,
                    }
                }
                if values.is_empty() {
                    None
                } else {
                    Some((name.as_str(), values))
                }
            })
            .collect()
    }
}

/// Cell texts read as a missing value, matching the usual dataframe defaults.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Missing markers and non-finite numbers are `None`; other non-numeric text
/// is returned as the error.
fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, String> {
    if is_missing(cell) {
        return Ok(None);
    }
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(cell.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Dataset;

    pub const SAMPLE_CSV: &str = "\
Time,Temperature (c),pH,ODO mg/L,Longitude,Latitude,Total Water Column (m),Site
10:00:00,28.5,8.1,6.2,-80.20,25.70,1.0,North
10:05:00,29.0,8.0,5.9,-80.21,25.71,2.5,North
10:10:00,29.5,7.9,5.5,-80.22,25.72,4.0,South
10:15:00,30.0,7.8,5.1,-80.23,25.73,0.0,South
";

    pub fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE_CSV.as_bytes(), ',').unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_keeps_column_and_row_order() {
        let ds = fixtures::sample();
        assert_eq!(ds.headers()[0], "Time");
        assert_eq!(ds.headers()[7], "Site");
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.rows()[2][0], "10:10:00");
    }

    #[test]
    fn test_numeric_column() {
        let ds = fixtures::sample();
        assert_eq!(
            ds.numeric_column(columns::PH).unwrap(),
            vec![Some(8.1), Some(8.0), Some(7.9), Some(7.8)]
        );
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let ds = fixtures::sample();
        assert!(matches!(
            ds.numeric_column("PH"),
            Err(DatasetError::MissingColumn(name)) if name == "PH"
        ));
    }

    #[test]
    fn test_non_numeric_cell_is_reported() {
        let ds = Dataset::from_reader("pH\n8.0\nabc\n".as_bytes(), ',').unwrap();
        match ds.numeric_column("pH") {
            Err(DatasetError::NonNumeric { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_markers_are_not_numbers() {
        let ds = Dataset::from_reader("pH\n8.0\nNA\nNaN\nnull\nN/A\n7.5\n".as_bytes(), ',')
            .unwrap();
        assert_eq!(
            ds.numeric_column("pH").unwrap(),
            vec![Some(8.0), None, None, None, None, Some(7.5)]
        );
        assert!(is_missing("#N/A"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_non_finite_values_are_missing() {
        let ds = Dataset::from_reader("x\n1\ninf\n-inf\n".as_bytes(), ',').unwrap();
        assert_eq!(ds.numeric_column("x").unwrap(), vec![Some(1.0), None, None]);
    }

    #[test]
    fn test_short_rows_are_padded_as_missing() {
        let ds = Dataset::from_reader("a,b\n1,2\n3\n".as_bytes(), ',').unwrap();
        assert_eq!(ds.numeric_column("b").unwrap(), vec![Some(2.0), None]);
    }

    #[test]
    fn test_numeric_columns_skip_text_columns() {
        let ds = fixtures::sample();
        let names: Vec<&str> = ds.numeric_columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "Temperature (c)",
                "pH",
                "ODO mg/L",
                "Longitude",
                "Latitude",
                "Total Water Column (m)"
            ]
        );
    }

    #[test]
    fn test_semicolon_delimiter() {
        let ds = Dataset::from_reader("x;y\n1;2\n".as_bytes(), ';').unwrap();
        assert_eq!(ds.numeric_column("y").unwrap(), vec![Some(2.0)]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(fixtures::SAMPLE_CSV.as_bytes()).unwrap();
        let ds = Dataset::load(file.path(), ',').unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dataset::load(&dir.path().join("missing.csv"), ','),
            Err(DatasetError::Io { .. })
        ));
    }
}
