use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use caseload::data::CaseDatabase;
use caseload::query::{
    ApplyTo, Condition, Modifier, OneOrMany, Query, Statistic, Value,
};

const USAGE: &str = "\
caseload - condition-driven search over COVID-19 case time series

USAGE:
    caseload --data DIR [OPTIONS]

OPTIONS:
    --data DIR         data directory with the three CSSE csv files (required)
    --param NAME       field to filter on (repeatable)
    --condition TOKEN  condition token, e.g. 'greater than', 'nearest' (repeatable)
    --value VALUE      number, YYYY-MM-DD date, statistic token, or text (repeatable)
    --modifier TOKEN   vector modifier, e.g. 'delta', 'cumulative sum' (repeatable)
    --apply-to MODE    'all' (AND, default) or 'any' (OR)
    --json             print results as JSON instead of a table
    --help             show this text

With no filter options every region is selected. Examples:
    caseload --data Data
    caseload --data Data --param country --condition equal --value US
    caseload --data Data --param confirmed --condition 'greater than' --value mean";

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

struct Args {
    data: PathBuf,
    params: Vec<String>,
    conditions: Vec<String>,
    values: Vec<String>,
    modifiers: Vec<String>,
    apply_to: String,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut data = None;
    let mut params = Vec::new();
    let mut conditions = Vec::new();
    let mut values = Vec::new();
    let mut modifiers = Vec::new();
    let mut apply_to = "all".to_string();
    let mut json = false;

    let mut argv = std::env::args().skip(1);
    while let Some(flag) = argv.next() {
        let mut take = |name: &str| {
            argv.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "--data" => data = Some(PathBuf::from(take("--data")?)),
            "--param" => params.push(take("--param")?),
            "--condition" => conditions.push(take("--condition")?),
            "--value" => values.push(take("--value")?),
            "--modifier" => modifiers.push(take("--modifier")?),
            "--apply-to" => apply_to = take("--apply-to")?,
            "--json" => json = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unrecognized argument {other:?}\n\n{USAGE}"),
        }
    }

    Ok(Args {
        data: data.with_context(|| format!("--data is required\n\n{USAGE}"))?,
        params,
        conditions,
        values,
        modifiers,
        apply_to,
        json,
    })
}

/// Interpret one `--value` string: number, then ISO date, then statistic
/// token, then plain text literal.
fn parse_value(raw: &str) -> Value {
    if let Ok(number) = raw.parse::<f64>() {
        return Value::Number(number);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Value::Date(date);
    }
    if let Ok(stat) = Statistic::from_token(raw) {
        return Value::Stat(stat);
    }
    Value::Text(raw.to_string())
}

fn one_or_many<T>(mut items: Vec<T>) -> OneOrMany<T> {
    if items.len() == 1 {
        OneOrMany::One(items.remove(0))
    } else {
        OneOrMany::Many(items)
    }
}

fn build_query(args: &Args) -> Result<Query> {
    if args.params.is_empty() && args.conditions.is_empty() && args.values.is_empty() {
        if !args.modifiers.is_empty() {
            bail!("--modifier given without --param/--condition/--value");
        }
        return Ok(Query::everything());
    }
    if args.params.is_empty() || args.conditions.is_empty() || args.values.is_empty() {
        bail!("a filter needs --param, --condition, and --value together");
    }

    let conditions = args
        .conditions
        .iter()
        .map(|token| Condition::from_token(token))
        .collect::<caseload::error::Result<Vec<_>>>()?;
    let values: Vec<Value> = args.values.iter().map(|raw| parse_value(raw)).collect();

    let mut query = Query::filter(
        one_or_many(args.params.clone()),
        one_or_many(conditions),
        one_or_many(values),
    )
    .apply_to(ApplyTo::from_token(&args.apply_to)?);

    if !args.modifiers.is_empty() {
        let modifiers = args
            .modifiers
            .iter()
            .map(|token| Modifier::from_token(token))
            .collect::<caseload::error::Result<Vec<_>>>()?;
        query = query.modifiers(one_or_many(modifiers));
    }
    Ok(query)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One matched region with its latest counts, for `--json` output.
#[derive(Serialize)]
struct RegionRecord<'a> {
    country: &'a str,
    province: &'a str,
    county: &'a str,
    confirmed: f64,
    dead: f64,
    recovered: f64,
}

fn records(db: &CaseDatabase) -> Vec<RegionRecord<'_>> {
    let regions = db.regions();
    let countries = regions.column("country").and_then(|c| c.as_text());
    let provinces = regions.column("province").and_then(|c| c.as_text());
    let counties = regions.column("county").and_then(|c| c.as_text());
    let latest = |matrix: &[Vec<f64>], i: usize| {
        matrix[i].last().copied().unwrap_or(0.0)
    };

    (0..db.num_regions())
        .map(|i| RegionRecord {
            country: countries.map_or("", |c| c[i].as_str()),
            province: provinces.map_or("", |c| c[i].as_str()),
            county: counties.map_or("", |c| c[i].as_str()),
            confirmed: latest(db.confirmed(), i),
            dead: latest(db.dead(), i),
            recovered: latest(db.recovered(), i),
        })
        .collect()
}

fn print_table(db: &CaseDatabase) {
    let rows = records(db);
    let as_of = db
        .dates()
        .last()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<20} {:<22} {:<16} {:>10} {:>8} {:>10}",
        "country", "province", "county", "confirmed", "dead", "recovered"
    );
    for r in &rows {
        println!(
            "{:<20} {:<22} {:<16} {:>10} {:>8} {:>10}",
            r.country, r.province, r.county, r.confirmed, r.dead, r.recovered
        );
    }
    println!("{} region(s), counts as of {as_of}", rows.len());
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let db = CaseDatabase::load(&args.data)?;
    let query = build_query(&args)?;
    debug!("query: {query:?}");

    let selected = db.select_regions(&query)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&records(&selected))?);
    } else {
        print_table(&selected);
    }
    Ok(())
}
