//! Data models for weight tracking

use crate::errors::CoreError;
use crate::validation::validate_identity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily weight measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

impl Measurement {
    pub fn new(date: NaiveDate, weight_kg: f64) -> Self {
        Self { date, weight_kg }
    }
}

/// Result of an upsert against a [`MeasurementLog`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    /// An entry for that date existed and its weight was replaced
    Updated { previous_weight_kg: f64 },
}

/// Date-ordered measurement collection with at most one entry per date.
///
/// Every constructor and mutation keeps the collection strictly ascending
/// by date; a later write for an existing date replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Measurement>", into = "Vec<Measurement>")]
pub struct MeasurementLog {
    entries: Vec<Measurement>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from records in any order.
    ///
    /// When a date appears more than once the record that comes last in
    /// `records` wins.
    pub fn from_records(records: impl IntoIterator<Item = Measurement>) -> Self {
        let mut log = Self::new();
        for record in records {
            log.upsert(record.date, record.weight_kg);
        }
        log
    }

    /// Insert a measurement, or replace the weight of the entry on that date
    pub fn upsert(&mut self, date: NaiveDate, weight_kg: f64) -> UpsertOutcome {
        match self.entries.binary_search_by_key(&date, |m| m.date) {
            Ok(idx) => {
                let previous_weight_kg = self.entries[idx].weight_kg;
                self.entries[idx].weight_kg = weight_kg;
                UpsertOutcome::Updated { previous_weight_kg }
            }
            Err(idx) => {
                self.entries.insert(idx, Measurement::new(date, weight_kg));
                UpsertOutcome::Inserted
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Measurement> {
        self.entries
            .binary_search_by_key(&date, |m| m.date)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.entries.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.entries.iter().map(|m| m.date).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.entries.iter().map(|m| m.weight_kg).collect()
    }
}

impl From<Vec<Measurement>> for MeasurementLog {
    fn from(records: Vec<Measurement>) -> Self {
        Self::from_records(records)
    }
}

impl From<MeasurementLog> for Vec<Measurement> {
    fn from(log: MeasurementLog) -> Self {
        log.entries
    }
}

impl<'a> IntoIterator for &'a MeasurementLog {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Case-normalized key partitioning profile and measurement storage.
///
/// This is not authentication: anyone supplying the same string reaches
/// the same data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Trim and lowercase `raw`, rejecting empty or malformed keys
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.trim().to_lowercase();
        validate_identity(&normalized).map_err(|_| CoreError::invalid("identity", raw))?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::new(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
