//! Selection of the decision date and the history behind it.

use super::EngineError;
use crate::domain::FeatureRow;
use chrono::NaiveDate;

/// Feature rows on or before the decision date, oldest first. Never empty.
#[derive(Debug, Clone)]
pub struct DecisionWindow<'a> {
    rows: Vec<&'a FeatureRow>,
}

impl<'a> DecisionWindow<'a> {
    /// Pick the rows for a decision at `requested`, or at the latest date when `None`.
    ///
    /// Input order does not matter. A requested date past the newest row is an
    /// error, and so is a date that appears on more than one row.
    pub fn select(
        rows: &'a [FeatureRow],
        requested: Option<NaiveDate>,
    ) -> Result<Self, EngineError> {
        let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        if let Some(pair) = dates.windows(2).find(|p| p[0] == p[1]) {
            return Err(EngineError::DuplicateDate(pair[0]));
        }
        let latest = *dates.last().ok_or(EngineError::EmptyDataset)?;

        let target = match requested {
            Some(date) if date > latest => {
                return Err(EngineError::DateBeyondData {
                    requested: date,
                    latest,
                })
            }
            Some(date) => date,
            None => latest,
        };

        let mut selected: Vec<&FeatureRow> = rows.iter().filter(|r| r.date <= target).collect();
        if selected.is_empty() {
            return Err(EngineError::NoDataOnOrBefore(target));
        }
        selected.sort_by_key(|r| r.date);
        Ok(Self { rows: selected })
    }

    /// The snapshot the decision is made on.
    pub fn latest(&self) -> &'a FeatureRow {
        self.rows[self.rows.len() - 1]
    }

    pub fn rows(&self) -> &[&'a FeatureRow] {
        &self.rows
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
