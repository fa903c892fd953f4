use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::models::attendance::AttendanceStatus;
use crate::domain::models::company::Company;
use crate::domain::models::import::RowError;
use crate::error::AppError;

/// Import/export column schema. Order matters for export; import matches
/// columns by name, not position.
pub const EXPECTED_COLUMNS: [&str; 17] = [
    "EP number",
    "Name",
    "Company",
    "Plant",
    "Department",
    "Trade",
    "Skill",
    "Date",
    "IN1",
    "OUT1",
    "IN2",
    "OUT2",
    "IN3",
    "OUT3",
    "Hours Worked",
    "Overtime",
    "Status",
];

pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const TIME_FORMAT: &str = "%H:%M";

/// User-facing row numbers count the header as row 1.
pub const HEADER_ROW_OFFSET: usize = 2;

/// A parsed CSV file with its columns resolved by name.
pub struct CsvTable {
    columns: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

impl CsvTable {
    /// Parses the raw file and verifies the column set up front. A missing
    /// column fails the whole import before any row is looked at.
    pub fn parse(data: &[u8]) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| AppError::MalformedFile(e.to_string()))?
            .clone();

        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();

        let missing: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .filter(|name| !columns.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingColumns(missing));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|e| AppError::MalformedFile(e.to_string()))?);
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed cell value; rows shorter than the header read as blank.
    pub fn field(&self, row: usize, column: &str) -> &str {
        let idx = self.columns[column];
        self.rows[row].get(idx).unwrap_or("").trim()
    }
}

/// Company lookup table preloaded once per import pass, so row validation
/// stays a pure function over it.
pub struct CompanyIndex {
    by_name: HashMap<String, Company>,
}

impl CompanyIndex {
    pub fn new(companies: Vec<Company>) -> Self {
        Self {
            by_name: companies.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Company> {
        self.by_name.get(name)
    }
}

/// A fully-checked import row. Every field is typed; nothing downstream
/// needs to re-parse.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub ep_number: String,
    pub name: String,
    pub company_id: String,
    pub plant: String,
    pub department: String,
    pub trade: String,
    pub skill: String,
    pub date: NaiveDate,
    pub in1: Option<NaiveTime>,
    pub out1: Option<NaiveTime>,
    pub in2: Option<NaiveTime>,
    pub out2: Option<NaiveTime>,
    pub in3: Option<NaiveTime>,
    pub out3: Option<NaiveTime>,
    pub hours_worked: Decimal,
    pub overtime: Decimal,
    pub status: AttendanceStatus,
}

/// Blank cells and the literal `nan` (artifact of spreadsheet exports)
/// both mean "no value".
fn cell(value: &str) -> Option<&str> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value)
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RowError> {
    cell(value).ok_or(RowError::MissingField(field))
}

fn parse_date(value: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RowError::InvalidDate(value.to_string()))
}

fn parse_punch(value: &str, field: &'static str) -> Result<Option<NaiveTime>, RowError> {
    match cell(value) {
        None => Ok(None),
        Some(v) => NaiveTime::parse_from_str(v, TIME_FORMAT)
            .map(Some)
            .map_err(|_| RowError::InvalidTime { field, value: v.to_string() }),
    }
}

fn parse_decimal(value: &str, field: &'static str) -> Result<Decimal, RowError> {
    match cell(value) {
        None => Ok(Decimal::ZERO),
        Some(v) => {
            let parsed = Decimal::from_str(v)
                .map_err(|_| RowError::InvalidNumber { field, value: v.to_string() })?;
            if parsed.is_sign_negative() {
                return Err(RowError::InvalidNumber { field, value: v.to_string() });
            }
            Ok(parsed)
        }
    }
}

/// Validates one input row. No side effects, no dependency on import mode;
/// the checks are identical for dry runs and commits. Companies are resolved
/// against the preloaded index and never created here.
pub fn validate_row(
    table: &CsvTable,
    index: usize,
    companies: &CompanyIndex,
) -> Result<ValidatedRow, RowError> {
    let row_number = index + HEADER_ROW_OFFSET;

    let ep_number = required(table.field(index, "EP number"), "EP number")?.to_string();
    let name = required(table.field(index, "Name"), "Name")?.to_string();
    let company_name = required(table.field(index, "Company"), "Company")?;
    let date_str = required(table.field(index, "Date"), "Date")?;
    let status_str = required(table.field(index, "Status"), "Status")?;

    let date = parse_date(date_str)?;
    let status = AttendanceStatus::from_str(status_str)
        .map_err(|_| RowError::InvalidStatus(status_str.to_string()))?;

    let company = companies
        .get(company_name)
        .ok_or_else(|| RowError::UnknownCompany(company_name.to_string()))?;

    Ok(ValidatedRow {
        row_number,
        ep_number,
        name,
        company_id: company.id.clone(),
        plant: cell(table.field(index, "Plant")).unwrap_or("").to_string(),
        department: cell(table.field(index, "Department")).unwrap_or("").to_string(),
        trade: cell(table.field(index, "Trade")).unwrap_or("").to_string(),
        skill: cell(table.field(index, "Skill")).unwrap_or("").to_string(),
        date,
        in1: parse_punch(table.field(index, "IN1"), "IN1")?,
        out1: parse_punch(table.field(index, "OUT1"), "OUT1")?,
        in2: parse_punch(table.field(index, "IN2"), "IN2")?,
        out2: parse_punch(table.field(index, "OUT2"), "OUT2")?,
        in3: parse_punch(table.field(index, "IN3"), "IN3")?,
        out3: parse_punch(table.field(index, "OUT3"), "OUT3")?,
        hours_worked: parse_decimal(table.field(index, "Hours Worked"), "Hours Worked")?,
        overtime: parse_decimal(table.field(index, "Overtime"), "Overtime")?,
        status,
    })
}
