use std::path::Path;

use anyhow::bail;
use chrono::NaiveDate;

use crate::error::Result as QueryResult;
use crate::query::{Query, Searcher};

use super::loader;
use super::model::{Dataset, Mask};

// ---------------------------------------------------------------------------
// CaseDatabase – aligned region metadata and case-count time series
// ---------------------------------------------------------------------------

/// The loaded COVID-19 data: one row of region metadata per region, and
/// for each of confirmed/dead/recovered a region x date count matrix
/// sharing the regions' row index.
#[derive(Debug, Clone)]
pub struct CaseDatabase {
    /// country, province, county, longitude, latitude; one row per region.
    regions: Dataset,
    /// The shared date axis of the three matrices.
    dates: Vec<NaiveDate>,
    confirmed: Vec<Vec<f64>>,
    dead: Vec<Vec<f64>>,
    recovered: Vec<Vec<f64>>,
}

impl CaseDatabase {
    /// Assemble a database from already-aligned parts, checking that the
    /// matrices match the regions and the date axis.
    pub fn new(
        regions: Dataset,
        dates: Vec<NaiveDate>,
        confirmed: Vec<Vec<f64>>,
        dead: Vec<Vec<f64>>,
        recovered: Vec<Vec<f64>>,
    ) -> anyhow::Result<Self> {
        let n_regions = regions.len();
        for (label, matrix) in [
            ("confirmed", &confirmed),
            ("dead", &dead),
            ("recovered", &recovered),
        ] {
            if matrix.len() != n_regions {
                bail!(
                    "{label}: {} rows for {n_regions} regions",
                    matrix.len()
                );
            }
            if let Some(row) = matrix.iter().find(|row| row.len() != dates.len()) {
                bail!(
                    "{label}: row with {} counts for {} dates",
                    row.len(),
                    dates.len()
                );
            }
        }
        Ok(CaseDatabase {
            regions,
            dates,
            confirmed,
            dead,
            recovered,
        })
    }

    /// Load the three CSSE files from a data directory.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        loader::load_directory(dir)
    }

    pub fn regions(&self) -> &Dataset {
        &self.regions
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn confirmed(&self) -> &[Vec<f64>] {
        &self.confirmed
    }

    pub fn dead(&self) -> &[Vec<f64>] {
        &self.dead
    }

    pub fn recovered(&self) -> &[Vec<f64>] {
        &self.recovered
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    /// Run a query against the region metadata and apply the resulting
    /// mask to the metadata and all three count matrices at once,
    /// yielding the sub-database of matching regions.
    pub fn select_regions(&self, query: &Query) -> QueryResult<CaseDatabase> {
        let mask = Searcher::new(&self.regions).search(query)?;
        Ok(self.masked(&mask))
    }

    fn masked(&self, mask: &Mask) -> CaseDatabase {
        CaseDatabase {
            regions: self.regions.select(mask),
            dates: self.dates.clone(),
            confirmed: mask.apply(&self.confirmed),
            dead: mask.apply(&self.dead),
            recovered: mask.apply(&self.recovered),
        }
    }

    /// The time series of one region as a dataset (one row per date),
    /// for time-axis queries such as a nearest-forward date match or a
    /// delta condition on the counts.
    pub fn timeseries(&self, region: usize) -> Option<Dataset> {
        if region >= self.num_regions() {
            return None;
        }
        let mut ds = Dataset::new();
        // These inserts cannot fail: every vector has num_dates entries.
        ds.insert("date", self.dates.clone()).ok()?;
        ds.insert(
            "day",
            (0..self.dates.len()).map(|i| i as f64).collect::<Vec<f64>>(),
        )
        .ok()?;
        ds.insert("confirmed", self.confirmed[region].clone()).ok()?;
        ds.insert("dead", self.dead[region].clone()).ok()?;
        ds.insert("recovered", self.recovered[region].clone()).ok()?;
        Some(ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Comparison, Condition, Value};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn database() -> CaseDatabase {
        let mut regions = Dataset::new();
        regions
            .insert("country", vec!["China", "Italy", "US"])
            .unwrap();
        regions
            .insert("province", vec!["Hubei", "N/A", "Washington"])
            .unwrap();
        regions
            .insert("county", vec!["N/A", "N/A", "King County"])
            .unwrap();
        regions
            .insert("longitude", vec![112.3, 12.8, -121.8])
            .unwrap();
        regions.insert("latitude", vec![30.9, 43.0, 47.5]).unwrap();
        CaseDatabase::new(
            regions,
            vec![date(1), date(2), date(3)],
            vec![
                vec![100.0, 150.0, 200.0],
                vec![10.0, 30.0, 90.0],
                vec![1.0, 2.0, 4.0],
            ],
            vec![
                vec![5.0, 9.0, 14.0],
                vec![0.0, 1.0, 3.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec![
                vec![20.0, 45.0, 80.0],
                vec![0.0, 2.0, 5.0],
                vec![0.0, 0.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn construction_checks_matrix_shapes() {
        let db = database();
        let err = CaseDatabase::new(
            db.regions().clone(),
            db.dates().to_vec(),
            db.confirmed()[..2].to_vec(),
            db.dead().to_vec(),
            db.recovered().to_vec(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 rows for 3 regions"));
    }

    #[test]
    fn select_regions_filters_metadata_and_matrices_together() {
        let db = database();
        let query = Query::filter(
            "country",
            Condition::Compare(Comparison::Eq),
            Value::from("US"),
        );
        let sub = db.select_regions(&query).unwrap();
        assert_eq!(sub.num_regions(), 1);
        assert_eq!(sub.confirmed(), &[vec![1.0, 2.0, 4.0]]);
        assert_eq!(sub.dead(), &[vec![0.0, 0.0, 1.0]]);
        assert_eq!(sub.dates(), db.dates());
    }

    #[test]
    fn timeseries_view_is_queryable_per_region() {
        let db = database();
        let ts = db.timeseries(0).unwrap();
        assert_eq!(ts.len(), 3);
        let query = Query::filter(
            "confirmed",
            Condition::Compare(Comparison::Gt),
            Value::from(120.0),
        );
        let indices = Searcher::new(&ts).search_indices(&query).unwrap();
        assert_eq!(indices, vec![1, 2]);
        assert!(db.timeseries(3).is_none());
    }
}
