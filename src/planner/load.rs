use crate::error::Result;
use crate::models::DemographicProfile;
use crate::planner::constants::{CHILD_CONSUMPTION, FEMALE_CONSUMPTION, MALE_CONSUMPTION};

/// Compute the metabolic load of a crowd.
///
/// Formula: male * 1.0 + female * 0.85 + child * 0.5
///
/// The value is left unrounded; use [`display_load`] for presentation.
pub fn compute_load(profile: &DemographicProfile) -> Result<f64> {
    profile.validate()?;

    let load = profile.male as f64 * MALE_CONSUMPTION
        + profile.female as f64 * FEMALE_CONSUMPTION
        + profile.child as f64 * CHILD_CONSUMPTION;

    tracing::debug!(
        male = profile.male,
        female = profile.female,
        child = profile.child,
        load,
        "computed metabolic load"
    );
    Ok(load)
}

/// Load rounded to the nearest whole unit for display.
pub fn display_load(load: f64) -> i64 {
    load.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaterError;

    #[test]
    fn test_zero_crowd() {
        let load = compute_load(&DemographicProfile::default()).unwrap();
        assert_eq!(load, 0.0);
    }

    #[test]
    fn test_mixed_crowd() {
        let load = compute_load(&DemographicProfile::new(300, 250, 50)).unwrap();
        assert!((load - 537.5).abs() < 1e-9);
        assert_eq!(display_load(load), 538);
    }

    #[test]
    fn test_negative_rejected() {
        let result = compute_load(&DemographicProfile::new(0, 0, -3));
        assert!(matches!(result, Err(CaterError::InvalidInput(_))));
    }
}
