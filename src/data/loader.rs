use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{ColumnKind, Dataset, Record, Schema, Value};
use crate::error::SchemaError;

/// Tokens treated as an empty cell regardless of column kind.
const MISSING_TOKENS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse the customer dataset from the raw bytes of a source file.
///
/// Supported formats:
/// * `.csv`     – header row with the bank-marketing column names (primary)
/// * `.json`    – `[{ "Customer_ID": "...", "Month": "...", ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// Columns outside the schema are ignored. A missing column or a malformed
/// number fails the whole load with a [`SchemaError`].
pub fn load_bytes(format: SourceFormat, bytes: Vec<u8>) -> Result<Dataset> {
    let schema = Schema::bank_marketing();
    match format {
        SourceFormat::Csv => load_csv(&bytes, schema),
        SourceFormat::Json => load_json(&bytes, schema),
        SourceFormat::Parquet => load_parquet(bytes, schema),
    }
}

/// Source layout, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" | "pq" => Ok(Self::Parquet),
            other => bail!("Unsupported file extension: .{other}"),
        }
    }
}

/// Raw cell as it comes out of a source, before schema typing.
enum RawCell<'a> {
    Null,
    Number(f64),
    Text(&'a str),
}

fn decode_cell(
    raw: RawCell<'_>,
    kind: ColumnKind,
    row: usize,
    column: &str,
) -> Result<Value, SchemaError> {
    match (raw, kind) {
        (RawCell::Null, _) => Ok(Value::Missing),
        (RawCell::Number(v), ColumnKind::Numeric) => Ok(Value::from(v)),
        (RawCell::Number(v), ColumnKind::Categorical) => {
            Ok(Value::Text(Value::Number(v).to_string()))
        }
        (RawCell::Text(s), kind) => {
            let s = s.trim();
            if MISSING_TOKENS.contains(&s) {
                return Ok(Value::Missing);
            }
            match kind {
                ColumnKind::Categorical => Ok(Value::Text(s.to_string())),
                ColumnKind::Numeric => s.parse::<f64>().map(Value::from).map_err(|_| {
                    SchemaError::InvalidNumber {
                        row,
                        column: column.to_string(),
                        value: s.to_string(),
                    }
                }),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8], schema: Schema) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Source position of each schema column.
    let positions = schema
        .iter()
        .map(|(name, _)| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SchemaError::MissingColumn {
                    column: name.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let values = schema
            .iter()
            .zip(&positions)
            .map(|((name, kind), &pos)| {
                decode_cell(RawCell::Text(record.get(pos).unwrap_or("")), kind, row_no, name)
            })
            .collect::<Result<Vec<_>, _>>()?;
        records.push(Record { values });
    }

    Ok(Dataset::from_records(schema, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
/// Every object must carry every schema key; `null` marks a missing cell.
fn load_json(bytes: &[u8], schema: Schema) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut values = Vec::with_capacity(schema.len());
        for (name, kind) in schema.iter() {
            let cell = obj.get(name).ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_string(),
            })?;
            let raw = match cell {
                JsonValue::Null => RawCell::Null,
                JsonValue::Number(n) => RawCell::Number(n.as_f64().unwrap_or(f64::NAN)),
                JsonValue::String(s) => RawCell::Text(s),
                JsonValue::Bool(b) => RawCell::Text(if *b { "true" } else { "false" }),
                other => bail!("Row {i}, column '{name}': unsupported JSON value {other}"),
            };
            values.push(decode_cell(raw, kind, i, name)?);
        }
        records.push(Record { values });
    }

    Ok(Dataset::from_records(schema, records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by **Pandas** (`df.to_parquet()`) or
/// **Polars** (`df.write_parquet()`) with the bank-marketing columns.
fn load_parquet(bytes: Vec<u8>, schema: Schema) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();

        let source_cols = schema
            .iter()
            .map(|(name, _)| {
                batch_schema
                    .index_of(name)
                    .map(|i| batch.column(i))
                    .map_err(|_| SchemaError::MissingColumn {
                        column: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let values = schema
                .iter()
                .zip(&source_cols)
                .map(|((name, kind), col)| {
                    let raw = arrow_cell(col, row, row_no, name)?;
                    decode_cell(raw, kind, row_no, name)
                })
                .collect::<Result<Vec<_>, _>>()?;
            records.push(Record { values });
        }
    }

    Ok(Dataset::from_records(schema, records))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell<'a>(
    col: &'a Arc<dyn Array>,
    row: usize,
    row_no: usize,
    name: &str,
) -> Result<RawCell<'a>, SchemaError> {
    if col.is_null(row) {
        return Ok(RawCell::Null);
    }
    let unsupported = || SchemaError::UnsupportedType {
        row: row_no,
        column: name.to_string(),
        data_type: format!("{:?}", col.data_type()),
    };
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| RawCell::Text(s.value(row))),
        DataType::LargeUtf8 => Some(RawCell::Text(col.as_string::<i64>().value(row))),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| RawCell::Number(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| RawCell::Text(if a.value(row) { "true" } else { "false" })),
        _ => None,
    };
    cell.ok_or_else(unsupported)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{ArrayRef, Date32Array};
    use arrow::record_batch::RecordBatch;
    use arrow::datatypes::{Field, Schema as ArrowSchema};
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::model::columns;

    fn load_file(path: &Path) -> Result<Dataset> {
        let format = SourceFormat::from_path(path)?;
        load_bytes(format, std::fs::read(path)?)
    }

    fn header() -> String {
        Schema::bank_marketing()
            .iter()
            .map(|(n, _)| n)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn write_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    const ROW_A: &str = "CUS_1,January,30,25-34,Lawyer,50000,Medium,3,2,Auto Loan,12,0,4,1200.5,31.2,200,49.5,80,300.25,Good,Standard,Regular,High,Low";
    const ROW_B: &str = "CUS_1,February,30,25-34,Lawyer,,Medium,3,2,Auto Loan,NA,5,4,1200.5,29.9,201,49.5,,310,Good,Standard,Regular,High,Low";

    #[test]
    fn loads_csv_rows_in_order() {
        let file = write_file(".csv", &format!("{},Extra\n{ROW_A},x\n{ROW_B},y\n", header()));
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        let month = ds.column(columns::MONTH).unwrap();
        let income = ds.column(columns::ANNUAL_INCOME).unwrap();
        let rate = ds.column(columns::INTEREST_RATE).unwrap();
        assert_eq!(ds.records[0].get(month), &Value::from("January"));
        assert_eq!(ds.records[0].get(income), &Value::Number(50000.0));
        assert_eq!(ds.records[1].get(income), &Value::Missing);
        assert_eq!(ds.records[1].get(rate), &Value::Missing);
    }

    #[test]
    fn numeric_looking_ids_stay_text() {
        let row = ROW_A.replacen("CUS_1", "1007", 1);
        let file = write_file(".csv", &format!("{}\n{row}\n", header()));
        let ds = load_file(file.path()).unwrap();
        let id = ds.column(columns::CUSTOMER_ID).unwrap();
        assert_eq!(ds.records[0].get(id), &Value::from("1007"));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let head = header().replace(",Spending_Level", "");
        let file = write_file(".csv", &format!("{head}\n"));
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn {
                column: "Spending_Level".into()
            })
        );
    }

    #[test]
    fn malformed_number_is_schema_error() {
        let row = ROW_A.replacen(",50000,", ",fifty,", 1);
        let file = write_file(".csv", &format!("{}\n{ROW_A}\n{row}\n", header()));
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::InvalidNumber {
                row: 1,
                column: "Annual_Income".into(),
                value: "fifty".into(),
            })
        );
    }

    #[test]
    fn header_only_csv_is_an_empty_dataset() {
        let file = write_file(".csv", &format!("{}\n", header()));
        let ds = load_file(file.path()).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_file(Path::new("/definitely/not/here.csv")).is_err());
    }

    #[test]
    fn unsupported_extension_fails() {
        let file = write_file(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    fn json_row() -> serde_json::Map<String, JsonValue> {
        Schema::bank_marketing()
            .iter()
            .map(|(name, kind)| {
                let v = match kind {
                    ColumnKind::Numeric => serde_json::json!(1),
                    ColumnKind::Categorical => serde_json::json!("x"),
                };
                (name.to_string(), v)
            })
            .collect()
    }

    #[test]
    fn loads_json_records() {
        let row = json_row();
        let mut second = row.clone();
        second.insert(columns::AGE.into(), JsonValue::Null);
        second.insert(columns::CUSTOMER_ID.into(), serde_json::json!(42));
        let text = serde_json::to_string(&vec![row, second]).unwrap();

        let file = write_file(".json", &text);
        let ds = load_file(file.path()).unwrap();
        let age = ds.column(columns::AGE).unwrap();
        let id = ds.column(columns::CUSTOMER_ID).unwrap();
        assert_eq!(ds.records[0].get(age), &Value::Number(1.0));
        assert_eq!(ds.records[1].get(age), &Value::Missing);
        assert_eq!(ds.records[1].get(id), &Value::from("42"));
    }

    #[test]
    fn json_record_without_a_key_is_schema_error() {
        let row = json_row();
        let mut second = row.clone();
        second.remove(columns::CREDIT_MIX);
        let text = serde_json::to_string(&vec![row, second]).unwrap();

        let file = write_file(".json", &text);
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn {
                column: "Credit_Mix".into()
            })
        );
    }

    /// Two-row Parquet file with every schema column except `skip`; `age`
    /// replaces the Age column when given.
    fn write_parquet(skip: Option<&str>, age: Option<(DataType, ArrayRef)>) -> NamedTempFile {
        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (name, kind) in Schema::bank_marketing().iter() {
            if Some(name) == skip {
                continue;
            }
            if let (columns::AGE, Some((data_type, array))) = (name, &age) {
                fields.push(Field::new(name, data_type.clone(), true));
                arrays.push(array.clone());
                continue;
            }
            match kind {
                ColumnKind::Numeric => {
                    fields.push(Field::new(name, DataType::Float64, true));
                    arrays.push(Arc::new(Float64Array::from(vec![Some(2.5), None])));
                }
                ColumnKind::Categorical => {
                    fields.push(Field::new(name, DataType::Utf8, true));
                    arrays.push(Arc::new(StringArray::from(vec![Some("a"), Some("b")])));
                }
            }
        }
        let arrow_schema = Arc::new(ArrowSchema::new(fields));
        let batch = RecordBatch::try_new(arrow_schema.clone(), arrays).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), arrow_schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn loads_parquet_columns() {
        let file = write_parquet(None, None);
        let ds = load_file(file.path()).unwrap();
        let debt = ds.column(columns::OUTSTANDING_DEBT).unwrap();
        let mix = ds.column(columns::CREDIT_MIX).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].get(debt), &Value::Number(2.5));
        assert_eq!(ds.records[1].get(debt), &Value::Missing);
        assert_eq!(ds.records[1].get(mix), &Value::from("b"));
    }

    #[test]
    fn parquet_integer_columns_are_numbers() {
        let ages: ArrayRef = Arc::new(Int64Array::from(vec![Some(30), Some(41)]));
        let file = write_parquet(None, Some((DataType::Int64, ages)));
        let ds = load_file(file.path()).unwrap();
        let age = ds.column(columns::AGE).unwrap();
        assert_eq!(ds.records[1].get(age), &Value::Number(41.0));
    }

    #[test]
    fn parquet_without_a_column_is_schema_error() {
        let file = write_parquet(Some(columns::PAYMENT_VALUE), None);
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn {
                column: "Payment_Value".into()
            })
        );
    }

    #[test]
    fn parquet_date_column_is_unsupported() {
        let dates: ArrayRef = Arc::new(Date32Array::from(vec![Some(19_000), Some(19_001)]));
        let file = write_parquet(None, Some((DataType::Date32, dates)));
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::UnsupportedType {
                row: 0,
                column: "Age".into(),
                data_type: "Date32".into(),
            })
        );
    }
}
