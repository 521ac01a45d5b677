//! CSV instance reader with schema inference and validation.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Dataset;
use crate::schema::{Column, ColumnKind, Schema, is_missing};

/// Reads labelled or unlabelled instances from a CSV file.
///
/// Expected CSV format:
/// - Header row required; one column holds the class label
/// - Every other column is an attribute
/// - Empty cells and `?` mean "missing"
///
/// [`InstanceReader::read`] infers a [`Schema`] from the data itself, while
/// [`InstanceReader::read_with_schema`] encodes new data against a schema saved
/// at training time.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::MissingColumn`] | Class or schema column absent from header |
/// | [`IoError::NoAttributeColumns`] | Only the class column is present |
/// | [`IoError::UnknownColumn`] | An ignored column is not in the header |
/// | [`IoError::InvalidContinuousValue`] | Continuous cell is missing, NaN, Inf, or unparseable |
/// | [`IoError::MissingClassLabel`] | Labelled row with an empty class cell |
/// | [`IoError::UnknownClassLabel`] | Class label absent from a trained schema |
pub struct InstanceReader {
    path: PathBuf,
    class_column: String,
    ignored: Vec<String>,
}

impl InstanceReader {
    /// Create a reader for `path` with labels in `class_column`.
    pub fn new(path: &Path, class_column: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            class_column: class_column.to_string(),
            ignored: Vec::new(),
        }
    }

    /// Mark columns as inactive during schema inference.
    #[must_use]
    pub fn with_ignored(mut self, columns: Vec<String>) -> Self {
        self.ignored = columns;
        self
    }

    /// Read the file and infer its schema.
    ///
    /// A column whose present cells all parse as finite numbers is continuous.
    /// Any other column is categorical with categories in order of first
    /// appearance. A column with no present cell is inactive. Class labels are
    /// indexed in order of first appearance.
    #[instrument(skip(self), fields(path = %self.path.display(), class_column = %self.class_column))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let (header, records) = self.read_records()?;

        let class_pos = self.position(&header, &self.class_column)?;
        if header.len() < 2 {
            return Err(IoError::NoAttributeColumns {
                path: self.path.clone(),
            });
        }
        for name in &self.ignored {
            if name == &self.class_column || !header.iter().any(|h| h == name.as_str()) {
                return Err(IoError::UnknownColumn {
                    column: name.clone(),
                });
            }
        }

        let attribute_positions: Vec<usize> = (0..header.len()).filter(|&p| p != class_pos).collect();
        let columns: Vec<Column> = attribute_positions
            .iter()
            .map(|&pos| {
                let name = header[pos].to_string();
                let kind = if self.ignored.contains(&name) {
                    ColumnKind::Inactive
                } else {
                    infer_kind(records.iter().map(|r| &r[pos]))
                };
                debug!(column = %name, ?kind, "inferred column");
                Column { name, kind }
            })
            .collect();

        let mut classes: Vec<String> = Vec::new();
        let mut labels = Vec::with_capacity(records.len());
        for (row_index, record) in records.iter().enumerate() {
            let label = record[class_pos].trim();
            if is_missing(label) {
                return Err(IoError::MissingClassLabel {
                    path: self.path.clone(),
                    row_index,
                });
            }
            let class = match classes.iter().position(|c| c == label) {
                Some(class) => class,
                None => {
                    classes.push(label.to_string());
                    classes.len() - 1
                }
            };
            labels.push(class);
        }

        let schema = Schema::new(self.class_column.clone(), columns, classes);
        let rows = self.encode_rows(&schema, &attribute_positions, &records)?;

        info!(
            n_rows = rows.len(),
            n_attributes = schema.n_attributes(),
            n_classes = schema.classes().len(),
            "dataset loaded"
        );

        Ok(Dataset::new(schema, rows, Some(labels)))
    }

    /// Read the file and encode it with a previously inferred `schema`.
    ///
    /// Columns are matched by name, so their order in the file is free. An
    /// inactive schema column may be absent. The class column is optional;
    /// when present every label must belong to the schema. Categorical cells
    /// with a category the schema has not seen encode as `-1`.
    #[instrument(skip(self, schema), fields(path = %self.path.display()))]
    pub fn read_with_schema(&self, schema: &Schema) -> Result<Dataset, IoError> {
        let (header, records) = self.read_records()?;

        let mut positions = Vec::with_capacity(schema.n_attributes());
        for column in schema.columns() {
            match header.iter().position(|h| h == column.name) {
                Some(pos) => positions.push(Some(pos)),
                None if column.kind == ColumnKind::Inactive => positions.push(None),
                None => {
                    return Err(IoError::MissingColumn {
                        path: self.path.clone(),
                        column: column.name.clone(),
                    });
                }
            }
        }

        let labels = match header.iter().position(|h| h == schema.class_column()) {
            Some(class_pos) => {
                let mut labels = Vec::with_capacity(records.len());
                for (row_index, record) in records.iter().enumerate() {
                    let label = record[class_pos].trim();
                    if is_missing(label) {
                        return Err(IoError::MissingClassLabel {
                            path: self.path.clone(),
                            row_index,
                        });
                    }
                    let class =
                        schema
                            .class_index(label)
                            .ok_or_else(|| IoError::UnknownClassLabel {
                                path: self.path.clone(),
                                row_index,
                                label: label.to_string(),
                            })?;
                    labels.push(class);
                }
                Some(labels)
            }
            None => None,
        };

        let mut rows = Vec::with_capacity(records.len());
        let mut unseen = 0usize;
        for (row_index, record) in records.iter().enumerate() {
            let mut row = Vec::with_capacity(schema.n_attributes());
            for (column, pos) in schema.columns().iter().zip(&positions) {
                let value = match pos {
                    Some(pos) => {
                        let cell = &record[*pos];
                        if matches!(column.kind, ColumnKind::Categorical { .. })
                            && !is_missing(cell)
                            && column.encode(cell) == Some(-1.0)
                        {
                            unseen += 1;
                        }
                        self.encode_cell(column, cell, row_index)?
                    }
                    None => -1.0,
                };
                row.push(value);
            }
            rows.push(row);
        }
        if unseen > 0 {
            debug!(unseen, "categorical cells outside the trained categories");
        }

        info!(
            n_rows = rows.len(),
            labelled = labels.is_some(),
            "dataset encoded with schema"
        );

        Ok(Dataset::new(schema.clone(), rows, labels))
    }

    fn read_records(&self) -> Result<(StringRecord, Vec<StringRecord>), IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the row length check below report the row.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr
            .headers()
            .map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?
            .clone();
        let expected = header.len();
        debug!(expected, "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        Ok((header, records))
    }

    fn position(&self, header: &StringRecord, column: &str) -> Result<usize, IoError> {
        header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }

    fn encode_rows(
        &self,
        schema: &Schema,
        positions: &[usize],
        records: &[StringRecord],
    ) -> Result<Vec<Vec<f64>>, IoError> {
        records
            .iter()
            .enumerate()
            .map(|(row_index, record)| {
                schema
                    .columns()
                    .iter()
                    .zip(positions)
                    .map(|(column, &pos)| self.encode_cell(column, &record[pos], row_index))
                    .collect()
            })
            .collect()
    }

    fn encode_cell(&self, column: &Column, cell: &str, row_index: usize) -> Result<f64, IoError> {
        column
            .encode(cell)
            .ok_or_else(|| IoError::InvalidContinuousValue {
                path: self.path.clone(),
                row_index,
                column: column.name.clone(),
                raw: cell.to_string(),
            })
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let present: Vec<&str> = cells.filter(|c| !is_missing(c)).map(str::trim).collect();
    if present.is_empty() {
        return ColumnKind::Inactive;
    }
    if present
        .iter()
        .all(|c| c.parse::<f64>().is_ok_and(f64::is_finite))
    {
        return ColumnKind::Continuous;
    }
    let mut categories: Vec<String> = Vec::new();
    for cell in present {
        if !categories.iter().any(|c| c == cell) {
            categories.push(cell.to_string());
        }
    }
    ColumnKind::Categorical { categories }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn infers_column_kinds() {
        let csv = "size,colour,note,label\n1.5,red,,yes\n2.0,blue,?,no\n0.5,red,,yes\n";
        let f = write_csv(csv);
        let ds = InstanceReader::new(f.path(), "label").read().unwrap();
        let columns = ds.schema().columns();
        assert_eq!(columns[0].kind, ColumnKind::Continuous);
        assert_eq!(
            columns[1].kind,
            ColumnKind::Categorical {
                categories: vec!["red".into(), "blue".into()]
            }
        );
        assert_eq!(columns[2].kind, ColumnKind::Inactive);
        assert_eq!(ds.schema().descriptor().unwrap().codes(), vec![0, 2, -1]);
        assert_eq!(ds.schema().classes(), &["yes".to_string(), "no".to_string()]);
        assert_eq!(ds.classes(), Some(&[0, 1, 0][..]));
        assert_eq!(ds.rows()[1], vec![2.0, 1.0, -1.0]);
    }

    #[test]
    fn class_column_may_be_anywhere() {
        let csv = "label,a\nx,1\ny,2\n";
        let f = write_csv(csv);
        let ds = InstanceReader::new(f.path(), "label").read().unwrap();
        assert_eq!(ds.schema().n_attributes(), 1);
        assert_eq!(ds.schema().columns()[0].name, "a");
        assert_eq!(ds.rows(), &[vec![1.0], vec![2.0]]);
    }

    #[test]
    fn numbers_mixed_with_text_are_categorical() {
        let csv = "code,label\n1,a\nx,b\n1,a\n";
        let f = write_csv(csv);
        let ds = InstanceReader::new(f.path(), "label").read().unwrap();
        assert_eq!(
            ds.schema().columns()[0].kind,
            ColumnKind::Categorical {
                categories: vec!["1".into(), "x".into()]
            }
        );
        assert_eq!(ds.rows()[2], vec![0.0]);
    }

    #[test]
    fn missing_continuous_value_error() {
        let csv = "a,b,label\n1.0,2.0,x\n?,3.0,y\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidContinuousValue { row_index: 1, ref column, .. } if column == "a"
        ));
    }

    #[test]
    fn ignored_column_is_inactive() {
        let csv = "id,a,label\nr1,1.0,x\nr2,?,y\n";
        let f = write_csv(csv);
        let ds = InstanceReader::new(f.path(), "label")
            .with_ignored(vec!["id".into(), "a".into()])
            .read()
            .unwrap();
        assert_eq!(ds.schema().descriptor().unwrap().codes(), vec![-1, -1]);
        assert_eq!(ds.rows()[1], vec![-1.0, -1.0]);
    }

    #[test]
    fn ignoring_unknown_column_error() {
        let csv = "a,label\n1,x\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label")
            .with_ignored(vec!["zzz".into()])
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::UnknownColumn { .. }));
    }

    #[test]
    fn missing_class_column_error() {
        let csv = "a,b\n1,2\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { ref column, .. } if column == "label"));
    }

    #[test]
    fn no_attribute_columns_error() {
        let csv = "label\nx\ny\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(err, IoError::NoAttributeColumns { .. }));
    }

    #[test]
    fn missing_class_label_error() {
        let csv = "a,label\n1,x\n2,\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(err, IoError::MissingClassLabel { row_index: 1, .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv("a,label\n");
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn inconsistent_row_length_error() {
        let csv = "a,b,label\n1,2,x\n3,y\n";
        let f = write_csv(csv);
        let err = InstanceReader::new(f.path(), "label").read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn file_not_found_error() {
        let err = InstanceReader::new(Path::new("/nonexistent/data.csv"), "label")
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn schema_encoding_matches_by_name() {
        let train = write_csv("size,colour,label\n1.0,red,yes\n2.0,blue,no\n");
        let schema = InstanceReader::new(train.path(), "label")
            .read()
            .unwrap()
            .schema()
            .clone();

        let new = write_csv("colour,size\ngreen,3.5\nblue,0.5\n");
        let ds = InstanceReader::new(new.path(), "label")
            .read_with_schema(&schema)
            .unwrap();
        assert!(ds.classes().is_none());
        assert_eq!(ds.rows(), &[vec![3.5, -1.0], vec![0.5, 1.0]]);
    }

    #[test]
    fn schema_encoding_reads_known_labels() {
        let train = write_csv("a,label\n1,yes\n2,no\n");
        let schema = InstanceReader::new(train.path(), "label")
            .read()
            .unwrap()
            .schema()
            .clone();

        let test = write_csv("a,label\n5,no\n6,yes\n");
        let ds = InstanceReader::new(test.path(), "label")
            .read_with_schema(&schema)
            .unwrap();
        assert_eq!(ds.classes(), Some(&[1, 0][..]));

        let bad = write_csv("a,label\n5,maybe\n");
        let err = InstanceReader::new(bad.path(), "label")
            .read_with_schema(&schema)
            .unwrap_err();
        assert!(matches!(err, IoError::UnknownClassLabel { ref label, .. } if label == "maybe"));
    }

    #[test]
    fn schema_encoding_requires_active_columns() {
        let train = write_csv("a,b,label\n1,2,x\n");
        let schema = InstanceReader::new(train.path(), "label")
            .read()
            .unwrap()
            .schema()
            .clone();

        let new = write_csv("a\n1\n");
        let err = InstanceReader::new(new.path(), "label")
            .read_with_schema(&schema)
            .unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { ref column, .. } if column == "b"));
    }

    #[test]
    fn schema_encoding_tolerates_absent_inactive_column() {
        let train = write_csv("id,a,label\nr1,1,x\n");
        let schema = InstanceReader::new(train.path(), "label")
            .with_ignored(vec!["id".into()])
            .read()
            .unwrap()
            .schema()
            .clone();

        let new = write_csv("a\n4\n");
        let ds = InstanceReader::new(new.path(), "label")
            .read_with_schema(&schema)
            .unwrap();
        assert_eq!(ds.rows(), &[vec![-1.0, 4.0]]);
    }
}
