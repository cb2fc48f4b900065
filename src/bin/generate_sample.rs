use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Region rows: province field (CSSE spelling), country, longitude,
/// latitude, and per-table growth knobs (midpoint day, ceiling).
const REGIONS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("Hubei", "Mainland China", 112.27, 30.97, 8.0, 68000.0),
    ("", "Italy", 12.83, 43.0, 22.0, 12000.0),
    ("", "South Korea", 128.2, 36.0, 18.0, 8000.0),
    ("King County, WA", "US", -121.83, 47.5, 26.0, 600.0),
    ("Cook County, IL", "US", -87.94, 41.74, 28.0, 150.0),
    ("Washington, D.C.", "US", -77.04, 38.9, 30.0, 40.0),
];

const N_DAYS: usize = 40;

/// Cumulative count on `day` of a logistic outbreak curve.
fn logistic(day: f64, midpoint: f64, ceiling: f64) -> f64 {
    (ceiling / (1.0 + (-(day - midpoint) / 4.0).exp())).round()
}

fn write_table(
    path: &Path,
    dates: &[NaiveDate],
    scale: f64,
    lag: f64,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "Province/State".to_string(),
        "Country/Region".to_string(),
        "Long".to_string(),
        "Lat".to_string(),
    ];
    // CSSE headers spell dates as m/d/yy.
    header.extend(
        dates
            .iter()
            .map(|d| d.format("%-m/%-d/%y").to_string()),
    );
    writer.write_record(&header)?;

    for &(province, country, longitude, latitude, midpoint, ceiling) in REGIONS {
        let mut row = vec![
            province.to_string(),
            country.to_string(),
            longitude.to_string(),
            latitude.to_string(),
        ];
        for day in 0..dates.len() {
            let count = logistic(day as f64 - lag, midpoint, ceiling * scale);
            row.push(format!("{count:.0}"));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let dir = std::env::args().nth(1).unwrap_or_else(|| "Data".to_string());
    let dir = Path::new(&dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;

    let start = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
    let dates: Vec<NaiveDate> = (0..N_DAYS)
        .map(|i| start + chrono::Days::new(i as u64))
        .collect();

    // Deaths and recoveries trail confirmations and scale down.
    write_table(
        &dir.join("time_series_19-covid-Confirmed.csv"),
        &dates,
        1.0,
        0.0,
    )?;
    write_table(
        &dir.join("time_series_19-covid-Deaths.csv"),
        &dates,
        0.04,
        2.0,
    )?;
    write_table(
        &dir.join("time_series_19-covid-Recovered.csv"),
        &dates,
        0.6,
        8.0,
    )?;

    println!(
        "Wrote {} regions x {} days to {}",
        REGIONS.len(),
        N_DAYS,
        dir.display()
    );
    Ok(())
}
