use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::format::format_plain;

use super::error::LoadError;
use super::kpi::Kpis;
use super::model::{self, ProjectRecord, ProjectStatus, REQUIRED_COLUMNS};

/// Token the source sheet uses for "no end date yet".
pub const ABSENT_TOKEN: &str = "-";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load project records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`  – header row, one project per record
/// * `.json` – `[{ "Project Name": ..., "Location": ..., ... }, ...]`
///
/// Row order is preserved and wholly empty rows are skipped. KPIs are not
/// derived here; see [`model::ProjectTable::new`].
pub fn load_file(path: &Path) -> Result<Vec<ProjectRecord>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let records = parse_sheet(&sheet)?;
    log::info!(
        "Loaded {} project(s) from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

// ---------------------------------------------------------------------------
// Format-neutral intermediate
// ---------------------------------------------------------------------------

/// A single source cell before it is bound to a typed field.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_plain(*n),
            Cell::Date(d) => d.to_string(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Header plus data rows, as read from any supported format.
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<Sheet, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or(LoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(first)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    Ok(Sheet { headers, rows })
}

fn workbook_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_date().map(Cell::Date).unwrap_or_else(|| Cell::Text(cell.to_string()))
        }
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Sheet, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Sheet { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Project Name": "Sunfield", "Location": "North", "End Date": "-", ... },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<Sheet, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = match root {
        JsonValue::Array(records) => records,
        _ => return Err(LoadError::NotARecord(0)),
    };

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(LoadError::NotARecord(i + 1))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    Ok(Sheet { headers, rows })
}

fn json_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Empty,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Typed row parsing
// ---------------------------------------------------------------------------

/// Position of each required column in the header row.
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            let found = headers.iter().position(|h| {
                h == column || model::column_aliases(column).contains(&h.as_str())
            });
            match found {
                Some(pos) => positions[slot] = pos,
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
        Ok(ColumnIndex(positions))
    }
}

/// Borrowed view over one data row with typed accessors.
struct RowReader<'a> {
    index: &'a ColumnIndex,
    cells: &'a [Cell],
    row: usize,
}

impl<'a> RowReader<'a> {
    fn cell(&self, column: &str) -> &'a Cell {
        let slot = REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .unwrap_or(0);
        self.cells.get(self.index.0[slot]).unwrap_or(&EMPTY_CELL)
    }

    fn invalid(&self, column: &str, cell: &Cell) -> LoadError {
        LoadError::InvalidCell {
            row: self.row,
            column: column.to_string(),
            value: cell.display(),
        }
    }

    fn text(&self, column: &str) -> String {
        self.cell(column).display().trim().to_string()
    }

    fn number(&self, column: &str) -> Result<Option<f64>, LoadError> {
        let cell = self.cell(column);
        match cell {
            Cell::Empty => Ok(None),
            Cell::Number(n) => Ok(Some(*n)),
            Cell::Text(s) => match s.trim() {
                "" | ABSENT_TOKEN => Ok(None),
                t => parse_number(t).map(Some).ok_or_else(|| self.invalid(column, cell)),
            },
            Cell::Date(_) => Err(self.invalid(column, cell)),
        }
    }

    fn date(&self, column: &str) -> Result<NaiveDate, LoadError> {
        let cell = self.cell(column);
        cell_date(cell).ok_or_else(|| self.invalid(column, cell))
    }

    /// Like [`Self::date`], but `-` and blanks load as `None`.
    fn optional_date(&self, column: &str) -> Result<Option<NaiveDate>, LoadError> {
        let cell = self.cell(column);
        match cell {
            Cell::Text(s) if s.trim() == ABSENT_TOKEN => Ok(None),
            c if c.is_blank() => Ok(None),
            c => cell_date(c).map(Some).ok_or_else(|| self.invalid(column, c)),
        }
    }
}

fn parse_sheet(sheet: &Sheet) -> Result<Vec<ProjectRecord>, LoadError> {
    let index = ColumnIndex::resolve(&sheet.headers)?;
    let mut records = Vec::with_capacity(sheet.rows.len());

    for (i, cells) in sheet.rows.iter().enumerate() {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        let r = RowReader {
            index: &index,
            cells,
            row: i + 1,
        };
        records.push(ProjectRecord {
            project_name: r.text(model::COL_PROJECT_NAME),
            location: r.text(model::COL_LOCATION),
            energy_type: r.text(model::COL_ENERGY_TYPE),
            status: ProjectStatus::parse(&r.text(model::COL_PROJECT_STATUS)),
            start_date: r.date(model::COL_START_DATE)?,
            end_date: r.optional_date(model::COL_END_DATE)?,
            installed_capacity_mw: r.number(model::COL_INSTALLED_CAPACITY)?,
            energy_generated_mwh: r.number(model::COL_ENERGY_GENERATED)?,
            revenue_usd: r.number(model::COL_REVENUE)?,
            profit_usd: r.number(model::COL_PROFIT)?,
            operational_cost_usd: r.number(model::COL_OPERATIONAL_COST)?,
            co2_reduction_tons: r.number(model::COL_CO2_REDUCTION)?,
            kpis: Kpis::default(),
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Scalar parsing helpers
// ---------------------------------------------------------------------------

/// Accepts thousands separators and a leading currency sign.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Values above this are epoch milliseconds (pandas JSON), below it Excel serial days.
const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000.0;

fn cell_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date(s.trim()),
        Cell::Number(n) if *n >= EPOCH_MILLIS_THRESHOLD => {
            chrono::DateTime::from_timestamp_millis(*n as i64).map(|dt| dt.date_naive())
        }
        Cell::Number(n) if *n >= 1.0 => {
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            epoch.checked_add_signed(Duration::days(n.trunc() as i64))
        }
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Project Name,Location,Energy Type,Project Status,Start Date,End Date,\
Installed Capacity (MW),Energy Generated (MWh),Revenue (USD),Profit (USD),Operational Cost,CO2 Reduction (tons)";

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn csv_rows_load_in_order_with_hyphen_end_date_absent() {
        let csv = format!(
            "{HEADER}\n\
             Sunfield,North,Solar,Operational,2019-03-01,-,120,\"250,000\",5000000,1200000,3800000,90000\n\
             Gale Ridge,South,Wind,Under Construction,2021-06-15,2024-12-31,80,0,0,0,0,0\n"
        );
        let f = write_temp("csv", &csv);
        let rows = load_file(f.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project_name, "Sunfield");
        assert_eq!(rows[0].end_date, None);
        assert_eq!(rows[0].energy_generated_mwh, Some(250_000.0));
        assert_eq!(rows[1].status, ProjectStatus::UnderConstruction);
        assert_eq!(
            rows[1].end_date,
            Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        );
    }

    #[test]
    fn empty_numeric_cells_load_as_missing() {
        let csv = format!("{HEADER}\nLake,East,Hydro,Planned,2023-01-01,,50,,,,,\n");
        let f = write_temp("csv", &csv);
        let rows = load_file(f.path()).unwrap();
        assert_eq!(rows[0].energy_generated_mwh, None);
        assert_eq!(rows[0].end_date, None);
        assert_eq!(rows[0].installed_capacity_mw, Some(50.0));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let csv = format!("{HEADER}\n,,,,,,,,,,,\nLake,East,Hydro,Planned,2023-01-01,-,50,1,1,1,1,1\n");
        let f = write_temp("csv", &csv);
        assert_eq!(load_file(f.path()).unwrap().len(), 1);
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let f = write_temp("csv", "Project Name,Location\nA,North\n");
        match load_file(f.path()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols.len(), REQUIRED_COLUMNS.len() - 2);
                assert!(cols.contains(&"Energy Generated (MWh)".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn operational_cost_alias_is_accepted() {
        let csv = format!("{HEADER}\nLake,East,Hydro,Planned,2023-01-01,-,50,1,1,1,7,1\n")
            .replacen("Operational Cost", "Operational Cost (USD)", 1);
        let f = write_temp("csv", &csv);
        let rows = load_file(f.path()).unwrap();
        assert_eq!(rows[0].operational_cost_usd, Some(7.0));
    }

    #[test]
    fn unparseable_start_date_names_row_and_column() {
        let csv = format!("{HEADER}\nLake,East,Hydro,Planned,soon,-,50,1,1,1,1,1\n");
        let f = write_temp("csv", &csv);
        match load_file(f.path()) {
            Err(LoadError::InvalidCell { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "Start Date");
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"Project Name": "Sunfield", "Location": "North", "Energy Type": "Solar",
             "Project Status": "Operational", "Start Date": "2019-03-01", "End Date": "-",
             "Installed Capacity (MW)": 120, "Energy Generated (MWh)": 1000.5,
             "Revenue (USD)": 10, "Profit (USD)": 5, "Operational Cost": 5,
             "CO2 Reduction (tons)": null}
        ]"#;
        let f = write_temp("json", json);
        let rows = load_file(f.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].end_date, None);
        assert_eq!(rows[0].energy_generated_mwh, Some(1000.5));
        assert_eq!(rows[0].co2_reduction_tons, None);
    }

    #[test]
    fn xlsx_sheet_loads_native_numbers_dates_and_hyphen() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renewable_projects.xlsx");
        let date = Format::new().set_num_format("yyyy-mm-dd");
        let ymd = |y, m, d| ExcelDateTime::from_ymd(y, m, d).unwrap();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in REQUIRED_COLUMNS.iter().enumerate() {
            sheet.write(0, col as u16, *header).unwrap();
        }
        let rows: [(&str, &str, &str, f64, f64); 2] = [
            ("Sunfield", "Solar", "Operational", 150.0, 0.0),
            ("Gale Ridge", "Wind", "Under Construction", 80.5, 1_200.0),
        ];
        for (i, (name, kind, status, capacity, energy)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write(row, 0, *name).unwrap();
            sheet.write(row, 1, "North").unwrap();
            sheet.write(row, 2, *kind).unwrap();
            sheet.write(row, 3, *status).unwrap();
            sheet.write_with_format(row, 4, &ymd(2020, 1, 15), &date).unwrap();
            sheet.write(row, 6, *capacity).unwrap();
            sheet.write(row, 7, *energy).unwrap();
            for col in 8..12 {
                sheet.write(row, col, 1_000.0).unwrap();
            }
        }
        sheet.write(1, 5, "-").unwrap();
        sheet.write_with_format(2, 5, &ymd(2030, 2, 1), &date).unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        let start = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert_eq!(loaded[0].start_date, start);
        assert_eq!(loaded[0].end_date, None);
        assert_eq!(loaded[0].installed_capacity_mw, Some(150.0));
        assert_eq!(loaded[0].energy_generated_mwh, Some(0.0));
        assert_eq!(loaded[1].status, ProjectStatus::UnderConstruction);
        assert_eq!(loaded[1].start_date, start);
        assert_eq!(
            loaded[1].end_date,
            Some(NaiveDate::from_ymd_opt(2030, 2, 1).unwrap())
        );
        assert_eq!(loaded[1].installed_capacity_mw, Some(80.5));
        assert_eq!(loaded[1].operational_cost_usd, Some(1_000.0));
    }

    #[test]
    fn missing_file_and_unknown_extension_fail() {
        assert!(matches!(
            load_file(Path::new("does/not/exist.xlsx")),
            Err(LoadError::NotFound(_))
        ));
        let f = write_temp("txt", "hello");
        assert!(matches!(
            load_file(f.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn dates_parse_from_text_and_serials() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert_eq!(parse_date("2020-01-15"), Some(d));
        assert_eq!(parse_date("2020-01-15 00:00:00"), Some(d));
        assert_eq!(cell_date(&Cell::Number(43845.0)), Some(d));
        assert_eq!(cell_date(&Cell::Number(1_579_046_400_000.0)), Some(d));
        assert_eq!(cell_date(&Cell::Text("-".into())), None);
    }

    #[test]
    fn numbers_accept_separators_and_currency() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("$2,000"), Some(2000.0));
        assert_eq!(parse_number("n/a"), None);
    }
}
