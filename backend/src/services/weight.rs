//! Weight tracking service
//!
//! Provides business logic for weight tracking including:
//! - Daily measurement upsert (one entry per date, last write wins)
//! - Trend smoothing and indicators for the tracking view
//! - CSV export and partition reset

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::services::ProfileService;
use crate::state::AppState;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use weight_plan_shared::types::{
    LogWeightRequest, LogWeightResponse, SuggestedWeightResponse, SuggestionSource,
    TrackingResponse,
};
use weight_plan_shared::validation::validate_weight;
use weight_plan_shared::{
    build_tracking_series, calculate_plan, project_weight_loss, Measurement, MeasurementLog,
    ProjectionInput, ProjectionOutcome, UpsertOutcome,
};

/// Weight service for business logic
pub struct WeightService;

impl WeightService {
    /// Record a daily weight, replacing any entry for the same date
    pub async fn log_weight(
        state: &AppState,
        user: &UserIdentity,
        request: LogWeightRequest,
    ) -> Result<LogWeightResponse, ApiError> {
        validate_weight(request.weight_kg).map_err(|message| ApiError::InvalidField {
            field: "weight_kg".to_string(),
            message,
        })?;
        let date = request.date.unwrap_or_else(today);
        let measurement = Measurement::new(date, request.weight_kg);

        let key = user.key();
        let outcome = {
            let _guard = state.locks.acquire(&key).await;
            let outcome = state.store().upsert(user.identity(), measurement).await?;
            state.measurements.invalidate(&key).await;
            outcome
        };

        match outcome {
            UpsertOutcome::Inserted => {
                info!(partition = %key, date = %date, weight_kg = measurement.weight_kg, "Weight recorded")
            }
            UpsertOutcome::Updated { previous_weight_kg } => info!(
                partition = %key,
                date = %date,
                weight_kg = measurement.weight_kg,
                previous_weight_kg,
                "Weight replaced"
            ),
        }

        Ok(LogWeightResponse {
            date,
            weight_kg: measurement.weight_kg,
            outcome,
        })
    }

    /// Measurement history of a partition, ascending by date.
    ///
    /// A miss fills the cache under the partition lock, so a load can never
    /// land after the invalidation of a concurrent write.
    pub async fn history(state: &AppState, user: &UserIdentity) -> Result<MeasurementLog, ApiError> {
        let key = user.key();
        if let Some(log) = state.measurements.get(&key).await {
            debug!(partition = %key, "Measurement cache hit");
            return Ok(log);
        }

        let _guard = state.locks.acquire(&key).await;
        if let Some(log) = state.measurements.get(&key).await {
            return Ok(log);
        }
        let log = state.store().load(user.identity()).await?;
        state.measurements.insert(key, log.clone()).await;
        Ok(log)
    }

    /// History with trend, week axis, indicators and a projection.
    ///
    /// A supplied plan is drawn as given; without one the stored profile's
    /// plan is used.
    pub async fn tracking(
        state: &AppState,
        user: &UserIdentity,
        plan: Option<ProjectionInput>,
    ) -> Result<TrackingResponse, ApiError> {
        let log = Self::history(state, user).await?;
        let series = build_tracking_series(&log);
        let projection = match plan {
            Some(input) => Some(project_weight_loss(&input)),
            None => Self::stored_projection(state, user).await?,
        };

        Ok(TrackingResponse {
            measurements: series.points,
            indicators: series.indicators,
            projection,
        })
    }

    /// Projection of the stored profile's plan. A stored profile that no
    /// longer parses yields no projection rather than failing the view.
    async fn stored_projection(
        state: &AppState,
        user: &UserIdentity,
    ) -> Result<Option<ProjectionOutcome>, ApiError> {
        match ProfileService::get_profile(state, user).await {
            Ok(profile) => Ok(Some(calculate_plan(&profile).projection)),
            Err(ApiError::Core(e)) => {
                warn!(partition = %user.key(), error = %e, "Stored profile unreadable, skipping projection");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Default value for the next entry: last recorded weight, else the
    /// profile's current weight
    pub async fn suggested_weight(
        state: &AppState,
        user: &UserIdentity,
    ) -> Result<SuggestedWeightResponse, ApiError> {
        let log = Self::history(state, user).await?;
        if let Some(last) = log.last() {
            return Ok(SuggestedWeightResponse {
                weight_kg: last.weight_kg,
                source: SuggestionSource::LastMeasurement,
            });
        }

        let profile = ProfileService::get_profile(state, user).await?;
        Ok(SuggestedWeightResponse {
            weight_kg: profile.current_weight_kg,
            source: SuggestionSource::Profile,
        })
    }

    /// Delete every measurement of the partition
    pub async fn reset(state: &AppState, user: &UserIdentity) -> Result<usize, ApiError> {
        let key = user.key();
        let _guard = state.locks.acquire(&key).await;
        let removed = state.store().clear(user.identity()).await?;
        state.measurements.invalidate(&key).await;

        warn!(partition = %key, removed, "Measurement history reset");
        Ok(removed)
    }

    /// History as `date,weight` CSV
    pub async fn export_csv(state: &AppState, user: &UserIdentity) -> Result<String, ApiError> {
        let log = Self::history(state, user).await?;
        Ok(to_csv(&log)?)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Serialize a log in the flat-file layout
pub fn to_csv(log: &MeasurementLog) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "weight"])?;
    for m in log {
        wtr.write_record([m.date.format("%Y-%m-%d").to_string(), m.weight_kg.to_string()])?;
    }
    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    Ok(String::from_utf8(bytes)?)
}
