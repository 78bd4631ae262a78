//! Plan profile and its key/value storage form
//!
//! Stores keep a profile as a flat mapping of named string fields. Missing
//! keys fall back to typed defaults; unknown keys are carried along untouched.

use crate::errors::{CoreError, CoreResult};
use crate::health_metrics::{
    normalize_key, ActivityProfile, BiologicalSex, DeficitMode, JobActivity, SportIntensity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named string fields as persisted by a profile store
pub type ProfileFields = BTreeMap<String, String>;

pub mod keys {
    pub const CURRENT_WEIGHT_KG: &str = "current_weight_kg";
    pub const HEIGHT_CM: &str = "height_cm";
    pub const AGE: &str = "age";
    pub const SEX: &str = "sex";
    pub const TARGET_WEIGHT_KG: &str = "target_weight_kg";
    pub const DEFICIT_MODE: &str = "deficit_mode";
    pub const CUSTOM_DEFICIT_KCAL: &str = "custom_deficit_kcal";
    pub const ACTIVITY_MODEL: &str = "activity_model";
    pub const ACTIVITY_LEVEL: &str = "activity_level";
    pub const JOB_ACTIVITY: &str = "job_activity";
    pub const SPORT_INTENSITY: &str = "sport_intensity";
    pub const SPORT_HOURS_PER_WEEK: &str = "sport_hours_per_week";
}

/// Default values applied to any key a stored profile lacks
pub const DEFAULT_FIELDS: &[(&str, &str)] = &[
    (keys::CURRENT_WEIGHT_KG, "70.0"),
    (keys::HEIGHT_CM, "165.0"),
    (keys::AGE, "30"),
    (keys::SEX, "female"),
    (keys::TARGET_WEIGHT_KG, "62.0"),
    (keys::DEFICIT_MODE, "auto"),
    (keys::CUSTOM_DEFICIT_KCAL, "500"),
    (keys::ACTIVITY_MODEL, "decomposed"),
    (keys::ACTIVITY_LEVEL, "light"),
    (keys::JOB_ACTIVITY, "low"),
    (keys::SPORT_INTENSITY, "moderate"),
    (keys::SPORT_HOURS_PER_WEEK, "3.0"),
];

pub fn default_fields() -> ProfileFields {
    DEFAULT_FIELDS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Biometric and goal inputs to the plan calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub current_weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: BiologicalSex,
    pub activity: ActivityProfile,
    pub target_weight_kg: f64,
    pub deficit: DeficitMode,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            current_weight_kg: 70.0,
            height_cm: 165.0,
            age_years: 30,
            sex: BiologicalSex::Female,
            activity: ActivityProfile::Decomposed {
                job: JobActivity::Low,
                sport: SportIntensity::Moderate,
                sport_hours_per_week: 3.0,
            },
            target_weight_kg: 62.0,
            deficit: DeficitMode::Auto,
        }
    }
}

fn field<'a>(fields: &'a ProfileFields, key: &str) -> CoreResult<&'a str> {
    fields
        .get(key)
        .map(|v| v.trim())
        .ok_or_else(|| CoreError::MissingField(key.to_string()))
}

fn number(fields: &ProfileFields, key: &str) -> CoreResult<f64> {
    let raw = field(fields, key)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::invalid(key, raw))
}

impl Profile {
    /// Parse a stored mapping, filling absent keys from [`DEFAULT_FIELDS`].
    ///
    /// Present but unparseable values are errors, including enum keys the
    /// tables do not know.
    pub fn from_fields(stored: &ProfileFields) -> CoreResult<Self> {
        let mut fields = default_fields();
        fields.extend(stored.iter().map(|(k, v)| (k.clone(), v.clone())));

        let age = number(&fields, keys::AGE)?;
        if age < 0.0 {
            return Err(CoreError::invalid(keys::AGE, field(&fields, keys::AGE)?));
        }

        let activity_model = field(&fields, keys::ACTIVITY_MODEL)?;
        let activity = match normalize_key(activity_model).as_str() {
            "single" => ActivityProfile::Single {
                level: field(&fields, keys::ACTIVITY_LEVEL)?.parse()?,
            },
            "decomposed" => ActivityProfile::Decomposed {
                job: field(&fields, keys::JOB_ACTIVITY)?.parse()?,
                sport: field(&fields, keys::SPORT_INTENSITY)?.parse()?,
                sport_hours_per_week: number(&fields, keys::SPORT_HOURS_PER_WEEK)?,
            },
            _ => return Err(CoreError::unknown("activity model", activity_model)),
        };

        let deficit_mode = field(&fields, keys::DEFICIT_MODE)?;
        let deficit = match normalize_key(deficit_mode).as_str() {
            "auto" => DeficitMode::Auto,
            "custom" => DeficitMode::Custom {
                kcal_per_day: number(&fields, keys::CUSTOM_DEFICIT_KCAL)?,
            },
            _ => return Err(CoreError::unknown("deficit mode", deficit_mode)),
        };

        Ok(Self {
            current_weight_kg: number(&fields, keys::CURRENT_WEIGHT_KG)?,
            height_cm: number(&fields, keys::HEIGHT_CM)?,
            // Stored ages may carry a decimal part ("30.0")
            age_years: age.trunc() as u32,
            sex: field(&fields, keys::SEX)?.parse()?,
            activity,
            target_weight_kg: number(&fields, keys::TARGET_WEIGHT_KG)?,
            deficit,
        })
    }

    /// Fields to write back on save.
    ///
    /// Only keys relevant to the selected activity model and deficit mode
    /// are emitted, so a saved custom deficit or job level survives a switch
    /// to the other mode.
    pub fn to_fields(&self) -> ProfileFields {
        let mut fields = ProfileFields::new();
        let mut put = |k: &str, v: String| {
            fields.insert(k.to_string(), v);
        };

        put(keys::CURRENT_WEIGHT_KG, self.current_weight_kg.to_string());
        put(keys::HEIGHT_CM, self.height_cm.to_string());
        put(keys::AGE, self.age_years.to_string());
        put(keys::SEX, self.sex.to_string());
        put(keys::TARGET_WEIGHT_KG, self.target_weight_kg.to_string());
        put(keys::DEFICIT_MODE, self.deficit.as_str().to_string());
        if let DeficitMode::Custom { kcal_per_day } = self.deficit {
            put(keys::CUSTOM_DEFICIT_KCAL, kcal_per_day.to_string());
        }

        match self.activity {
            ActivityProfile::Single { level } => {
                put(keys::ACTIVITY_MODEL, "single".to_string());
                put(keys::ACTIVITY_LEVEL, level.to_string());
            }
            ActivityProfile::Decomposed {
                job,
                sport,
                sport_hours_per_week,
            } => {
                put(keys::ACTIVITY_MODEL, "decomposed".to_string());
                put(keys::JOB_ACTIVITY, job.to_string());
                put(keys::SPORT_INTENSITY, sport.to_string());
                put(keys::SPORT_HOURS_PER_WEEK, sport_hours_per_week.to_string());
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_metrics::ActivityLevel;

    #[test]
    fn test_empty_fields_yield_default_profile() {
        let profile = Profile::from_fields(&ProfileFields::new()).unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_fields_round_trip() {
        let profile = Profile {
            current_weight_kg: 92.4,
            height_cm: 181.0,
            age_years: 47,
            sex: BiologicalSex::Male,
            activity: ActivityProfile::Single {
                level: ActivityLevel::High,
            },
            target_weight_kg: 84.0,
            deficit: DeficitMode::Custom { kcal_per_day: 650.0 },
        };
        let parsed = Profile::from_fields(&profile.to_fields()).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_fractional_age_is_truncated() {
        let mut fields = ProfileFields::new();
        fields.insert(keys::AGE.to_string(), "30.0".to_string());
        assert_eq!(Profile::from_fields(&fields).unwrap().age_years, 30);
    }

    #[test]
    fn test_auto_mode_does_not_overwrite_custom_value() {
        let profile = Profile::default();
        let fields = profile.to_fields();
        assert_eq!(fields.get(keys::DEFICIT_MODE).map(String::as_str), Some("auto"));
        assert!(!fields.contains_key(keys::CUSTOM_DEFICIT_KCAL));
    }

    #[test]
    fn test_unknown_enum_value_is_an_error() {
        let mut fields = ProfileFields::new();
        fields.insert(keys::JOB_ACTIVITY.to_string(), "astronaut".to_string());
        let err = Profile::from_fields(&fields).unwrap_err();
        assert!(matches!(err, CoreError::UnknownKey { kind: "job activity", .. }));
    }

    #[test]
    fn test_mode_keys_are_case_insensitive() {
        let mut fields = ProfileFields::new();
        fields.insert(keys::ACTIVITY_MODEL.to_string(), "Single".to_string());
        fields.insert(keys::ACTIVITY_LEVEL.to_string(), "Moderate".to_string());
        fields.insert(keys::DEFICIT_MODE.to_string(), " Auto ".to_string());

        let profile = Profile::from_fields(&fields).unwrap();
        assert_eq!(
            profile.activity,
            ActivityProfile::Single {
                level: ActivityLevel::Moderate
            }
        );
        assert_eq!(profile.deficit, DeficitMode::Auto);
    }

    #[test]
    fn test_unknown_deficit_mode_keeps_stored_value() {
        let mut fields = ProfileFields::new();
        fields.insert(keys::DEFICIT_MODE.to_string(), "Extreme".to_string());
        let err = Profile::from_fields(&fields).unwrap_err();
        assert!(
            matches!(err, CoreError::UnknownKey { kind: "deficit mode", ref value } if value == "Extreme")
        );
    }

    #[test]
    fn test_non_numeric_weight_is_an_error() {
        let mut fields = ProfileFields::new();
        fields.insert(keys::CURRENT_WEIGHT_KG.to_string(), "heavy".to_string());
        assert!(matches!(
            Profile::from_fields(&fields),
            Err(CoreError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_unrelated_keys_are_ignored() {
        let mut fields = ProfileFields::new();
        fields.insert("theme".to_string(), "dark".to_string());
        assert!(Profile::from_fields(&fields).is_ok());
    }
}
