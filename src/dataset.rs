//! Loads delimited text files into a table of typed columns, and computes the
//! per-column statistics used for imputation and for building forms.

use crate::error::{Error, Result};
use crate::utils::mean;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// A single cell value, either a number or a category label.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Category(String),
}

impl Value {
    /// Parse raw text. Anything that reads as a number is a number.
    pub fn parse(text: &str) -> Value {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(num) if num.is_finite() => Value::Number(num),
            _ => Value::Category(text.to_string()),
        }
    }

    /// Returns the category label of this value. Numbers are rendered the
    /// way they would be written in a data file.
    pub fn as_category(&self) -> String {
        match self {
            Value::Number(num) => num.to_string(),
            Value::Category(label) => label.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(num) => write!(f, "{}", num),
            Value::Category(label) => write!(f, "{}", label),
        }
    }
}

/// The cells of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

/// A named column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Build a column from raw cells, inferring the type: the column is
    /// numeric only if every cell parses as a number.
    fn from_cells(name: &str, cells: Vec<String>) -> Self {
        let numbers: Option<Vec<f64>> = cells
            .iter()
            .map(|cell| match Value::parse(cell) {
                Value::Number(num) => Some(num),
                Value::Category(_) => None,
            })
            .collect();
        match numbers {
            Some(values) => Column::numeric(name, values),
            None => Column::categorical(
                name,
                cells.iter().map(|c| c.trim().to_string()).collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric cells, or None for a categorical column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Returns the cell at 'row'.
    pub fn value(&self, row: usize) -> Option<Value> {
        match &self.data {
            ColumnData::Numeric(values) => {
                values.get(row).map(|v| Value::Number(*v))
            }
            ColumnData::Categorical(values) => {
                values.get(row).map(|v| Value::Category(v.clone()))
            }
        }
    }

    /// Mean of a numeric column.
    pub fn mean(&self) -> Option<f64> {
        mean(self.as_numeric()?)
    }

    pub fn min(&self) -> Option<f64> {
        self.as_numeric()?.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.as_numeric()?.iter().copied().reduce(f64::max)
    }

    /// The most frequent value. Ties are broken in favor of the smallest
    /// value.
    pub fn mode(&self) -> Option<Value> {
        self.counts()
            .into_iter()
            .fold(None, |best: Option<(Value, usize)>, (val, cnt)| match best {
                Some((_, best_cnt)) if best_cnt >= cnt => best,
                _ => Some((val, cnt)),
            })
            .map(|(val, _)| val)
    }

    /// The distinct values of the column in ascending order.
    pub fn distinct(&self) -> Vec<Value> {
        self.counts().into_iter().map(|(val, _)| val).collect()
    }

    /// Count the occurrences of every distinct value, in ascending order.
    fn counts(&self) -> Vec<(Value, usize)> {
        match &self.data {
            ColumnData::Numeric(values) => {
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                let mut counts: Vec<(Value, usize)> = Vec::new();
                for val in sorted {
                    if let Some((Value::Number(prev), cnt)) = counts.last_mut()
                    {
                        if *prev == val {
                            *cnt += 1;
                            continue;
                        }
                    }
                    counts.push((Value::Number(val), 1));
                }
                counts
            }
            ColumnData::Categorical(values) => {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for val in values {
                    *counts.entry(val).or_default() += 1;
                }
                counts
                    .into_iter()
                    .map(|(val, cnt)| (Value::Category(val.to_string()), cnt))
                    .collect()
            }
        }
    }

    /// Returns a new column made of the cells at 'rows'.
    fn take(&self, rows: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|r| values[*r]).collect())
            }
            ColumnData::Categorical(values) => ColumnData::Categorical(
                rows.iter().map(|r| values[*r].clone()).collect(),
            ),
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

/// A rectangular table of named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Create a table from columns that must all have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(col) = columns.iter().find(|c| c.len() != rows) {
            return Err(Error::SchemaMismatch(format!(
                "column '{}' has {} rows, expected {}",
                col.name(),
                col.len(),
                rows
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Load a comma separated file with a header row.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::read(file, ',')?;
        log::info!(
            "Loaded {} rows and {} columns from {}.",
            table.rows(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse delimited text. The first record is the header, and every row
    /// must have as many fields as the header.
    pub fn parse(text: &str, delimiter: char) -> Result<Self> {
        Self::read(text.as_bytes(), delimiter)
    }

    fn read<R: io::Read>(input: R, delimiter: char) -> Result<Self> {
        let delimiter = u8::try_from(delimiter).map_err(|_| Error::Parse {
            line: 0,
            reason: format!("'{}' is not a single byte delimiter", delimiter),
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let header: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        if header.is_empty() {
            return Err(Error::EmptyDataset("no header row".into()));
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); header.len()];
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            for (col, field) in cells.iter_mut().zip(record.iter()) {
                col.push(field.to_string());
            }
        }

        if cells.first().map_or(true, Vec::is_empty) {
            return Err(Error::EmptyDataset("no data rows".into()));
        }

        let columns = header
            .iter()
            .zip(cells)
            .map(|(name, col)| Column::from_cells(name, col))
            .collect();
        Table::new(columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the column named 'name'.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Returns a copy of the table without the columns in 'names'. Every
    /// name must exist.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Table> {
        for name in names {
            self.column(name)?;
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Ok(Table {
            columns,
            rows: self.rows,
        })
    }

    /// Returns a new table made of the rows at 'rows'.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            rows: rows.len(),
        }
    }
}

/// Convert a reader error, keeping the line of the bad record.
fn csv_error(err: csv::Error) -> Error {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(err) => Error::Io(err),
        _ => Error::Parse { line, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Age,Gender,Score\n\
                          20,Male,71.5\n\
                          22,Female,80\n\
                          \n\
                          20,\"Female\",66\n";

    #[test]
    fn test_parse_types() {
        let table = Table::parse(SAMPLE, ',').unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.column_names(), vec!["Age", "Gender", "Score"]);
        assert!(table.column("Age").unwrap().is_numeric());
        assert!(!table.column("Gender").unwrap().is_numeric());
        assert_eq!(
            table.column("Score").unwrap().as_numeric().unwrap(),
            &[71.5, 80.0, 66.0]
        );
    }

    #[test]
    fn test_statistics() {
        let table = Table::parse(SAMPLE, ',').unwrap();
        let age = table.column("Age").unwrap();
        assert_eq!(age.min(), Some(20.0));
        assert_eq!(age.max(), Some(22.0));
        assert_eq!(age.mode(), Some(Value::Number(20.0)));

        let gender = table.column("Gender").unwrap();
        assert_eq!(gender.mean(), None);
        assert_eq!(gender.mode(), Some(Value::Category("Female".into())));
        assert_eq!(
            gender.distinct(),
            vec![
                Value::Category("Female".into()),
                Value::Category("Male".into())
            ]
        );
    }

    #[test]
    fn test_mode_tie_prefers_smallest() {
        let col = Column::categorical(
            "c",
            vec!["b".into(), "a".into(), "b".into(), "a".into()],
        );
        assert_eq!(col.mode(), Some(Value::Category("a".into())));
    }

    #[test]
    fn test_ragged_row() {
        let res = Table::parse("a,b\n1,2\n3\n", ',');
        assert!(matches!(res, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(Table::parse("", ','), Err(Error::EmptyDataset(_))));
        assert!(matches!(
            Table::parse("a,b\n", ','),
            Err(Error::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_drop_and_take() {
        let table = Table::parse(SAMPLE, ',').unwrap();
        let dropped = table.drop_columns(&["Score"]).unwrap();
        assert_eq!(dropped.column_names(), vec!["Age", "Gender"]);
        assert!(matches!(
            table.drop_columns(&["FinalGrade"]),
            Err(Error::MissingColumn(_))
        ));

        let taken = table.take_rows(&[2, 0]);
        assert_eq!(taken.rows(), 2);
        assert_eq!(
            taken.column("Score").unwrap().as_numeric().unwrap(),
            &[66.0, 71.5]
        );
    }

    #[test]
    fn test_quoted_fields() {
        let text = "Major,Note,CGPA\n\
                    \"Computer\nScience\",\"say \"\"hi\"\", twice\",3.2\n\
                    Art,plain,2.9\n";
        let table = Table::parse(text, ',').unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(
            table.column("Major").unwrap().value(0),
            Some(Value::Category("Computer\nScience".into()))
        );
        assert_eq!(
            table.column("Note").unwrap().value(0),
            Some(Value::Category("say \"hi\", twice".into()))
        );
        assert!(table.column("CGPA").unwrap().is_numeric());
    }

    #[test]
    fn test_other_delimiters() {
        let table = Table::parse("a;b\n1;x\n2;y\n", ';').unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert!(matches!(
            Table::parse("a,b\n1,2\n", '\u{2013}'),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse(" 20 "), Value::Number(20.0));
        assert_eq!(Value::parse("3.5"), Value::Number(3.5));
        assert_eq!(Value::parse("Male"), Value::Category("Male".into()));
        assert_eq!(Value::parse("NaN"), Value::Category("NaN".into()));
        assert_eq!(Value::Number(1.0).as_category(), "1");
    }
}
