use crate::errors::AppError;
use crate::models::{ActivityLevel, Profile, ProfileForm, ProfileInput};

/// Baseline intake per kilogram of body weight.
pub const BASE_ML_PER_KG: f64 = 35.0;

pub const AGE_RANGE: std::ops::RangeInclusive<i64> = 1..=120;
pub const WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 20.0..=300.0;

const DEFAULT_NAME: &str = "You";

pub fn recommended_goal_ml(weight_kg: f64, age: Option<u32>, activity: ActivityLevel) -> u32 {
    let mut multiplier = 1.0;
    match activity {
        ActivityLevel::Low => multiplier *= 0.95,
        ActivityLevel::Medium => {}
        ActivityLevel::High => multiplier *= 1.2,
    }
    if age.is_some_and(|age| age >= 65) {
        multiplier *= 0.9;
    }
    (weight_kg.max(0.0) * BASE_ML_PER_KG * multiplier) as u32
}

impl Default for Profile {
    fn default() -> Self {
        let age = 25;
        let weight = 65.0;
        let activity_level = ActivityLevel::Medium;
        Self {
            name: DEFAULT_NAME.to_string(),
            age,
            weight,
            activity_level,
            daily_goal_ml: recommended_goal_ml(weight, Some(age), activity_level),
        }
    }
}

/// Checks a profile edit and builds the replacement record. A missing goal is
/// filled with the recommended goal for the new weight, age and activity.
pub fn validate_profile(input: ProfileInput) -> Result<Profile, AppError> {
    let name = input.name.trim();
    let name = if name.is_empty() { DEFAULT_NAME } else { name };

    if !AGE_RANGE.contains(&input.age) {
        return Err(AppError::bad_request(format!(
            "age must be between {} and {}",
            AGE_RANGE.start(),
            AGE_RANGE.end()
        )));
    }
    if !input.weight.is_finite() || !WEIGHT_RANGE.contains(&input.weight) {
        return Err(AppError::bad_request(format!(
            "weight must be between {} and {} kg",
            WEIGHT_RANGE.start(),
            WEIGHT_RANGE.end()
        )));
    }
    let activity_level = ActivityLevel::parse(&input.activity_level)
        .ok_or_else(|| AppError::bad_request("activity level must be 'low', 'medium' or 'high'"))?;

    let age = input.age as u32;
    let daily_goal_ml = match input.daily_goal_ml {
        Some(goal) if goal <= 0 => {
            return Err(AppError::bad_request("daily goal must be a positive number of ml"));
        }
        Some(goal) => u32::try_from(goal)
            .map_err(|_| AppError::bad_request("daily goal is too large"))?,
        None => recommended_goal_ml(input.weight, Some(age), activity_level),
    };

    Ok(Profile {
        name: name.to_string(),
        age,
        weight: input.weight,
        activity_level,
        daily_goal_ml,
    })
}

impl TryFrom<ProfileForm> for ProfileInput {
    type Error = AppError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let age = form
            .age
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::bad_request("age must be a whole number"))?;
        let weight = form
            .weight
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::bad_request("weight must be a number"))?;
        let goal = form.daily_goal_ml.trim();
        let daily_goal_ml = if goal.is_empty() {
            None
        } else {
            Some(
                goal.parse::<i64>()
                    .map_err(|_| AppError::bad_request("daily goal must be a whole number"))?,
            )
        };

        Ok(ProfileInput {
            name: form.name,
            age,
            weight,
            activity_level: form.activity_level,
            daily_goal_ml,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age: i64, weight: f64, goal: Option<i64>) -> ProfileInput {
        ProfileInput {
            name: "Ada".to_string(),
            age,
            weight,
            activity_level: "high".to_string(),
            daily_goal_ml: goal,
        }
    }

    #[test]
    fn recommended_goal_scales_with_activity_and_age() {
        assert_eq!(recommended_goal_ml(70.0, Some(30), ActivityLevel::Medium), 2450);
        assert_eq!(recommended_goal_ml(70.0, Some(30), ActivityLevel::High), 2940);
        assert_eq!(recommended_goal_ml(60.0, Some(70), ActivityLevel::Medium), 1890);
        assert_eq!(recommended_goal_ml(80.0, None, ActivityLevel::Low), 2660);
    }

    #[test]
    fn default_profile_has_positive_goal() {
        let profile = Profile::default();
        assert_eq!(profile.name, "You");
        assert_eq!(profile.daily_goal_ml, 2275);
        assert_eq!(profile.goal(), Some(2275));
    }

    #[test]
    fn validate_profile_keeps_explicit_goal() {
        let profile = validate_profile(input(40, 80.0, Some(1800))).unwrap();
        assert_eq!(profile.daily_goal_ml, 1800);
        assert_eq!(profile.activity_level, ActivityLevel::High);
    }

    #[test]
    fn validate_profile_fills_missing_goal() {
        let profile = validate_profile(input(40, 80.0, None)).unwrap();
        assert_eq!(profile.daily_goal_ml, 3360);
    }

    #[test]
    fn validate_profile_rejects_out_of_range_values() {
        assert!(validate_profile(input(0, 80.0, None)).is_err());
        assert!(validate_profile(input(121, 80.0, None)).is_err());
        assert!(validate_profile(input(40, 10.0, None)).is_err());
        assert!(validate_profile(input(40, f64::NAN, None)).is_err());
        assert!(validate_profile(input(40, 80.0, Some(0))).is_err());
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let mut raw = input(40, 80.0, None);
        raw.name = "   ".to_string();
        assert_eq!(validate_profile(raw).unwrap().name, "You");
    }

    #[test]
    fn form_with_empty_goal_parses() {
        let form = ProfileForm {
            name: "Ada".to_string(),
            age: "33".to_string(),
            weight: "61.5".to_string(),
            activity_level: "low".to_string(),
            daily_goal_ml: String::new(),
        };
        let parsed = ProfileInput::try_from(form).unwrap();
        assert_eq!(parsed.age, 33);
        assert_eq!(parsed.daily_goal_ml, None);
    }

    #[test]
    fn form_with_text_age_is_rejected() {
        let form = ProfileForm {
            name: "Ada".to_string(),
            age: "old".to_string(),
            weight: "61.5".to_string(),
            activity_level: "low".to_string(),
            daily_goal_ml: String::new(),
        };
        assert!(ProfileInput::try_from(form).is_err());
    }
}
