use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::info;

use super::database::CaseDatabase;
use super::geo::split_province;
use super::model::Dataset;

// The CSSE daily-report file names, relative to the data directory.
const FILE_CONFIRMED: &str = "time_series_19-covid-Confirmed.csv";
const FILE_DEATHS: &str = "time_series_19-covid-Deaths.csv";
const FILE_RECOVERED: &str = "time_series_19-covid-Recovered.csv";

// Identifier columns preceding the per-date counts.
const COL_PROVINCE: usize = 0;
const COL_COUNTRY: usize = 1;
const COL_LONGITUDE: usize = 2;
const COL_LATITUDE: usize = 3;
const N_IDENTIFIER_COLS: usize = 4;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the three CSSE files from `dir` into a [`CaseDatabase`].
///
/// The confirmed table fixes the row order; deaths and recovered are
/// aligned to it by a key join on (province, country). The three header
/// rows must agree.
pub fn load_directory(dir: &Path) -> Result<CaseDatabase> {
    let confirmed = read_table(&dir.join(FILE_CONFIRMED))?;
    let dead = read_table(&dir.join(FILE_DEATHS))?;
    let recovered = read_table(&dir.join(FILE_RECOVERED))?;

    if confirmed.headers != dead.headers || dead.headers != recovered.headers {
        bail!("headers for confirmed/dead/recovered do not match");
    }

    let dates = parse_header_dates(&confirmed.headers[N_IDENTIFIER_COLS..])?;
    let dead = align_to(&confirmed, dead, "deaths")?;
    let recovered = align_to(&confirmed, recovered, "recovered")?;

    let mut countries = Vec::with_capacity(confirmed.rows.len());
    let mut provinces = Vec::with_capacity(confirmed.rows.len());
    let mut counties = Vec::with_capacity(confirmed.rows.len());
    let mut longitudes = Vec::with_capacity(confirmed.rows.len());
    let mut latitudes = Vec::with_capacity(confirmed.rows.len());

    for (row_no, row) in confirmed.rows.iter().enumerate() {
        let (province, county) = split_province(&row[COL_PROVINCE])
            .with_context(|| format!("row {row_no} of {FILE_CONFIRMED}"))?;
        countries.push(row[COL_COUNTRY].clone());
        provinces.push(province);
        counties.push(county);
        longitudes.push(parse_coordinate(row, COL_LONGITUDE, row_no)?);
        latitudes.push(parse_coordinate(row, COL_LATITUDE, row_no)?);
    }

    let mut regions = Dataset::new();
    regions.insert("country", countries)?;
    regions.insert("province", provinces)?;
    regions.insert("county", counties)?;
    regions.insert("longitude", longitudes)?;
    regions.insert("latitude", latitudes)?;

    let db = CaseDatabase::new(
        regions,
        dates,
        parse_counts(&confirmed, "confirmed")?,
        parse_counts(&dead, "dead")?,
        parse_counts(&recovered, "recovered")?,
    )?;
    info!(
        "loaded {} regions x {} dates from {}",
        db.num_regions(),
        db.num_dates(),
        dir.display()
    );
    Ok(db)
}

// ---------------------------------------------------------------------------
// Raw tables
// ---------------------------------------------------------------------------

/// One CSV file as strings: the header row plus the data rows.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// The (province, country) join key of a data row.
    fn key(row: &[String]) -> (String, String) {
        (row[COL_PROVINCE].clone(), row[COL_COUNTRY].clone())
    }
}

fn read_table(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.len() < N_IDENTIFIER_COLS {
        bail!(
            "{}: expected at least {N_IDENTIFIER_COLS} columns, got {}",
            path.display(),
            headers.len()
        );
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, header has {}",
                record.len(),
                headers.len()
            );
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(RawTable { headers, rows })
}

/// CSSE time-series headers are `m/d/yy` dates.
fn parse_header_dates(headers: &[String]) -> Result<Vec<NaiveDate>> {
    headers
        .iter()
        .map(|h| {
            let mut parts = h.split('/');
            let (Some(month), Some(day), Some(year), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                bail!("malformed date header {h:?}");
            };
            NaiveDate::from_ymd_opt(
                2000 + year.trim().parse::<i32>()?,
                month.trim().parse()?,
                day.trim().parse()?,
            )
            .with_context(|| format!("date header {h:?} out of range"))
        })
        .collect()
}

/// Reorder `other` to the reference table's row order via a key join on
/// (province, country). Every reference key must exist exactly once in
/// `other`, and nothing in `other` may be left over.
fn align_to(reference: &RawTable, other: RawTable, label: &str) -> Result<RawTable> {
    let mut by_key: HashMap<(String, String), Vec<String>> = HashMap::new();
    for row in other.rows {
        let key = RawTable::key(&row);
        if by_key.insert(key.clone(), row).is_some() {
            bail!("{label}: duplicate region {key:?}");
        }
    }

    let mut rows = Vec::with_capacity(reference.rows.len());
    for row in &reference.rows {
        let key = RawTable::key(row);
        let matched = by_key
            .remove(&key)
            .with_context(|| format!("{label}: no row for region {key:?}"))?;
        rows.push(matched);
    }
    if let Some(key) = by_key.into_keys().next() {
        bail!("{label}: region {key:?} missing from the confirmed table");
    }
    Ok(RawTable {
        headers: other.headers,
        rows,
    })
}

fn parse_coordinate(row: &[String], col: usize, row_no: usize) -> Result<f64> {
    row[col]
        .trim()
        .parse()
        .with_context(|| format!("row {row_no}, column {col}: {:?} is not a number", row[col]))
}

/// The per-date counts of one table as a region-major numeric matrix.
fn parse_counts(table: &RawTable, label: &str) -> Result<Vec<Vec<f64>>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            row[N_IDENTIFIER_COLS..]
                .iter()
                .map(|cell| {
                    cell.trim().parse::<f64>().with_context(|| {
                        format!("{label} row {row_no}: {cell:?} is not a count")
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: vec![
                "Province/State".into(),
                "Country/Region".into(),
                "Long".into(),
                "Lat".into(),
                "3/1/20".into(),
            ],
            rows: rows
                .iter()
                .map(|row| row.iter().map(|f| f.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn header_dates_parse_as_month_day_shortyear() {
        let dates =
            parse_header_dates(&["1/22/20".to_string(), "2/3/20".to_string()]).unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2020, 2, 3).unwrap());
        assert!(parse_header_dates(&["2020-01-22".to_string()]).is_err());
    }

    #[test]
    fn align_reorders_by_region_key() {
        let reference = table(&[
            &["Hubei", "China", "112.3", "30.9", "1"],
            &["", "Italy", "12.8", "43.0", "2"],
        ]);
        let other = table(&[
            &["", "Italy", "12.8", "43.0", "20"],
            &["Hubei", "China", "112.3", "30.9", "10"],
        ]);
        let aligned = align_to(&reference, other, "deaths").unwrap();
        assert_eq!(aligned.rows[0][4], "10");
        assert_eq!(aligned.rows[1][4], "20");
    }

    #[test]
    fn align_rejects_missing_and_leftover_regions() {
        let reference = table(&[&["Hubei", "China", "112.3", "30.9", "1"]]);
        let missing = table(&[&["", "Italy", "12.8", "43.0", "2"]]);
        assert!(align_to(&reference, missing, "deaths").is_err());

        let reference = table(&[&["Hubei", "China", "112.3", "30.9", "1"]]);
        let leftover = table(&[
            &["Hubei", "China", "112.3", "30.9", "1"],
            &["", "Italy", "12.8", "43.0", "2"],
        ]);
        assert!(align_to(&reference, leftover, "recovered").is_err());
    }

    #[test]
    fn counts_parse_region_major() {
        let t = table(&[&["Hubei", "China", "112.3", "30.9", "7"]]);
        assert_eq!(parse_counts(&t, "confirmed").unwrap(), vec![vec![7.0]]);
        let bad = table(&[&["Hubei", "China", "112.3", "30.9", "seven"]]);
        assert!(parse_counts(&bad, "confirmed").is_err());
    }
}
