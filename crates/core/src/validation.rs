//! Input validation utilities.
//!
//! Range checks for patient records, applied by the CLI and REST layer before calling the
//! core. The core itself scores whatever it is given.

use crate::patient::PatientInput;

/// Every range violation found in one patient record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid patient input: {}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

fn check_range<T>(errors: &mut Vec<String>, field: &str, value: T, low: T, high: T)
where
    T: PartialOrd + std::fmt::Display,
{
    if value < low || value > high {
        errors.push(format!("{field} must be between {low} and {high}, got {value}"));
    }
}

fn check_finite_range(errors: &mut Vec<String>, field: &str, value: f64, low: f64, high: f64) {
    if !value.is_finite() {
        errors.push(format!("{field} must be a finite number"));
    } else {
        check_range(errors, field, value, low, high);
    }
}

/// Validates a patient record, collecting every violation.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing each out-of-range field.
pub fn validate_patient(patient: &PatientInput) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    check_range(&mut errors, "age", patient.age, 0, 150);
    check_finite_range(&mut errors, "temperature_c", patient.temperature_c, 30.0, 45.0);
    check_range(&mut errors, "systolic_bp", patient.systolic_bp, 50, 300);
    check_range(&mut errors, "diastolic_bp", patient.diastolic_bp, 30, 200);
    if patient.diastolic_bp >= patient.systolic_bp {
        errors.push(format!(
            "diastolic_bp ({}) must be lower than systolic_bp ({})",
            patient.diastolic_bp, patient.systolic_bp
        ));
    }
    check_range(&mut errors, "heart_rate", patient.heart_rate, 20, 250);
    check_finite_range(&mut errors, "weight_kg", patient.weight_kg, 0.5, 500.0);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::tests::healthy_adult;

    #[test]
    fn test_valid_patient_passes() {
        assert!(validate_patient(&healthy_adult()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut patient = healthy_adult();
        patient.age = 200;
        patient.temperature_c = f64::NAN;
        patient.systolic_bp = 80;
        patient.diastolic_bp = 85;
        patient.heart_rate = 10;

        let err = validate_patient(&patient).expect_err("invalid patient");
        let messages = err.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("age"));
        assert!(messages[1].contains("finite"));
        assert!(messages.iter().any(|m| m.contains("lower than systolic_bp")));
        assert!(messages.iter().any(|m| m.starts_with("heart_rate")));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut patient = healthy_adult();
        patient.age = 150;
        patient.temperature_c = 45.0;
        patient.weight_kg = 0.5;
        patient.heart_rate = 250;
        assert!(validate_patient(&patient).is_ok());
    }
}
