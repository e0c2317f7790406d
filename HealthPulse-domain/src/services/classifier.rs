//! Threshold classifier for single readings, used when no language model
//! is configured.

use std::fmt;

use crate::entities::{format_number, AlertSeverity, MetricType, ReadingAssessment};

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodPressureCategory {
    /// Systolic < 120 and diastolic < 80
    Normal,
    /// Systolic 120-129 and diastolic < 80
    Elevated,
    /// Systolic 130-139 or diastolic 80-89
    Hypertension1,
    /// Systolic >= 140 or diastolic >= 90
    Hypertension2,
    /// Systolic >= 180 or diastolic >= 120
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Hypertension Stage 1",
            BloodPressureCategory::Hypertension2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        f.write_str(name)
    }
}

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(systolic: f64, diastolic: f64) -> BloodPressureCategory {
    if systolic >= 180.0 || diastolic >= 120.0 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140.0 || diastolic >= 90.0 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130.0 || diastolic >= 80.0 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120.0 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// A reading's values, checked for the fields its type needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingValue {
    BloodPressure { systolic: f64, diastolic: f64 },
    Single(f64),
}

impl ReadingValue {
    /// Pick the values a metric type needs, or explain what is missing
    pub fn from_parts(
        metric_type: MetricType,
        value: Option<f64>,
        systolic: Option<f64>,
        diastolic: Option<f64>,
    ) -> Result<Self, String> {
        match metric_type {
            MetricType::BloodPressure => match (systolic, diastolic) {
                (Some(systolic), Some(diastolic)) => Ok(ReadingValue::BloodPressure { systolic, diastolic }),
                _ => Err("Blood pressure requires both systolic and diastolic values".to_string()),
            },
            _ => value
                .map(ReadingValue::Single)
                .ok_or_else(|| format!("value: required for {}", metric_type)),
        }
    }
}

/// Outcome of one band check. None severity means the reading is normal.
struct Finding {
    severity: Option<AlertSeverity>,
    reason: String,
}

impl Finding {
    fn normal(reason: String) -> Self {
        Self { severity: None, reason }
    }

    fn abnormal(severity: AlertSeverity, reason: String) -> Self {
        Self { severity: Some(severity), reason }
    }
}

fn classify_blood_pressure(systolic: f64, diastolic: f64) -> Finding {
    let reading = format!("{}/{} mmHg", format_number(systolic), format_number(diastolic));

    let hypotension = if systolic < 70.0 || diastolic < 40.0 {
        Some(AlertSeverity::High)
    } else if systolic < 80.0 || diastolic < 50.0 {
        Some(AlertSeverity::Medium)
    } else if systolic < 90.0 || diastolic < 60.0 {
        Some(AlertSeverity::Low)
    } else {
        None
    };
    if let Some(severity) = hypotension {
        return Finding::abnormal(
            severity,
            format!("Blood pressure of {} is below the healthy range of 90-120/60-80 mmHg.", reading),
        );
    }

    let category = categorize_blood_pressure(systolic, diastolic);
    let severity = match category {
        BloodPressureCategory::Normal => {
            return Finding::normal(format!("Blood pressure of {} is within the healthy range.", reading));
        }
        BloodPressureCategory::Elevated => AlertSeverity::Low,
        BloodPressureCategory::Hypertension1 => AlertSeverity::Medium,
        BloodPressureCategory::Hypertension2 => AlertSeverity::High,
        BloodPressureCategory::HypertensiveCrisis => AlertSeverity::Critical,
    };
    Finding::abnormal(
        severity,
        format!("Blood pressure of {} falls in the {} category.", reading, category),
    )
}

fn classify_heart_rate(bpm: f64) -> Finding {
    let severity = if !(40.0..=150.0).contains(&bpm) {
        Some(AlertSeverity::Critical)
    } else if !(50.0..=130.0).contains(&bpm) {
        Some(AlertSeverity::High)
    } else if !(55.0..=115.0).contains(&bpm) {
        Some(AlertSeverity::Medium)
    } else if !(60.0..=100.0).contains(&bpm) {
        Some(AlertSeverity::Low)
    } else {
        None
    };

    let value = format_number(bpm);
    match severity {
        None => Finding::normal(format!("Heart rate of {} bpm is within the normal resting range.", value)),
        Some(severity) => {
            let direction = if bpm > 100.0 { "above" } else { "below" };
            Finding::abnormal(
                severity,
                format!("Heart rate of {} bpm is {} the normal resting range of 60-100 bpm.", value, direction),
            )
        }
    }
}

fn classify_oxygen(percent: f64) -> Finding {
    let severity = if percent < 85.0 {
        Some(AlertSeverity::Critical)
    } else if percent < 90.0 {
        Some(AlertSeverity::High)
    } else if percent < 92.0 {
        Some(AlertSeverity::Medium)
    } else if percent < 95.0 {
        Some(AlertSeverity::Low)
    } else {
        None
    };

    let value = format_number(percent);
    match severity {
        None => Finding::normal(format!("Oxygen saturation of {}% is within the normal range.", value)),
        Some(severity) => Finding::abnormal(
            severity,
            format!("Oxygen saturation of {}% is below the normal range of 95-100%.", value),
        ),
    }
}

/// Readings in Celsius are converted when the unit says so
fn to_fahrenheit(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some(unit) if unit.trim_start_matches('°').eq_ignore_ascii_case("c") => value * 9.0 / 5.0 + 32.0,
        _ => value,
    }
}

fn classify_temperature(fahrenheit: f64) -> Finding {
    let severity = if fahrenheit >= 104.0 || fahrenheit < 95.0 {
        Some(AlertSeverity::Critical)
    } else if fahrenheit >= 102.0 {
        Some(AlertSeverity::High)
    } else if fahrenheit >= 100.4 || fahrenheit < 96.0 {
        Some(AlertSeverity::Medium)
    } else if fahrenheit > 99.0 || fahrenheit < 97.0 {
        Some(AlertSeverity::Low)
    } else {
        None
    };

    let value = format_number(fahrenheit);
    match severity {
        None => Finding::normal(format!("Temperature of {}°F is within the normal range.", value)),
        Some(severity) => {
            let direction = if fahrenheit > 99.0 { "above" } else { "below" };
            Finding::abnormal(
                severity,
                format!("Temperature of {}°F is {} the normal range of 97-99°F.", value, direction),
            )
        }
    }
}

fn classify_sleep(hours: f64) -> Finding {
    let value = format_number(hours);
    if !(4.0..=12.0).contains(&hours) {
        Finding::abnormal(
            AlertSeverity::Low,
            format!("{} hours of sleep is outside the healthy range for most adults.", value),
        )
    } else {
        Finding::normal(format!("{} hours of sleep is within a reasonable range.", value))
    }
}

fn recommendations(severity: Option<AlertSeverity>) -> Vec<String> {
    let items: &[&str] = match severity {
        Some(AlertSeverity::Critical) => &[
            "Seek emergency medical care immediately",
            "Call 108 for an ambulance if you feel unwell",
            "Do not drive yourself to the hospital",
        ],
        Some(AlertSeverity::High) => &[
            "Contact your healthcare provider today",
            "Re-measure after resting for 15 minutes",
            "Note any symptoms you are experiencing",
        ],
        Some(AlertSeverity::Medium) | Some(AlertSeverity::Low) => &[
            "Re-measure later while at rest",
            "Track this metric over the next few days",
            "Mention this reading at your next check-up",
        ],
        None => &["Keep up your regular monitoring"],
    };
    items.iter().map(|s| s.to_string()).collect()
}

/// Assess a single reading against the standard healthy ranges
pub fn classify_reading(metric_type: MetricType, reading: ReadingValue, unit: Option<&str>) -> ReadingAssessment {
    let finding = match (metric_type, reading) {
        (_, ReadingValue::BloodPressure { systolic, diastolic }) => classify_blood_pressure(systolic, diastolic),
        (MetricType::HeartRate, ReadingValue::Single(v)) => classify_heart_rate(v),
        (MetricType::OxygenLevel, ReadingValue::Single(v)) => classify_oxygen(v),
        (MetricType::Temperature, ReadingValue::Single(v)) => classify_temperature(to_fahrenheit(v, unit)),
        (MetricType::SleepHours, ReadingValue::Single(v)) => classify_sleep(v),
        (other, ReadingValue::Single(_)) => Finding::normal(format!(
            "{} varies by individual and is not assessed against a fixed range.",
            other.label()
        )),
    };

    ReadingAssessment {
        is_abnormal: finding.severity.is_some(),
        severity: finding.severity.unwrap_or(AlertSeverity::Low),
        reason: finding.reason,
        recommendations: recommendations(finding.severity),
        requires_immediate_attention: finding.severity == Some(AlertSeverity::Critical),
    }
}
