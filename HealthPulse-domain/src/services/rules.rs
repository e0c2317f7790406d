//! Deterministic health scoring.
//!
//! Everything here is pure: callers fetch the data, these functions decide
//! the score, insights and alerts.

use crate::entities::{
    AlertSeverity, AlertType, GeneratedAlert, GeneratedInsight, HealthAnalysis, HealthMetric, InsightType,
    MetricType,
};

pub const BASELINE_SCORE: u8 = 75;

/// Bonus when the recent heart rate mean sits in the resting range
pub const HEART_RATE_BONUS: u8 = 5;

/// Bonus for tracking consistently
pub const TRACKING_BONUS: u8 = 10;

/// Readings needed to earn the tracking bonus
pub const CONSISTENT_TRACKING_READINGS: usize = 10;

/// Heart rate readings averaged for the score and insight
pub const RECENT_HEART_RATE_READINGS: usize = 5;

pub const NORMAL_HEART_RATE: (f64, f64) = (60.0, 100.0);

const HIGH_SYSTOLIC: f64 = 140.0;
const HIGH_DIASTOLIC: f64 = 90.0;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn in_normal_heart_range(bpm: f64) -> bool {
    bpm >= NORMAL_HEART_RATE.0 && bpm <= NORMAL_HEART_RATE.1
}

/// Mean of the most recent heart rate readings. `metrics` is newest first.
pub fn recent_heart_rate_average(metrics: &[HealthMetric]) -> Option<f64> {
    let recent: Vec<f64> = metrics
        .iter()
        .filter(|m| m.metric_type == MetricType::HeartRate)
        .take(RECENT_HEART_RATE_READINGS)
        .map(|m| m.value)
        .collect();

    if recent.is_empty() {
        None
    } else {
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }
}

/// Overall score between 0 and 100
pub fn health_score(metrics: &[HealthMetric]) -> u8 {
    let mut score = BASELINE_SCORE;

    if !metrics.is_empty() {
        if recent_heart_rate_average(metrics).is_some_and(in_normal_heart_range) {
            score += HEART_RATE_BONUS;
        }
        if metrics.len() >= CONSISTENT_TRACKING_READINGS {
            score += TRACKING_BONUS;
        }
    }

    score.min(100)
}

fn metric_insights(metrics: &[HealthMetric]) -> Vec<GeneratedInsight> {
    let mut insights = Vec::new();

    if metrics.is_empty() {
        insights.push(GeneratedInsight {
            insight_type: InsightType::Lifestyle,
            title: "Start Your Health Journey".to_string(),
            content: "Welcome to your health assistant! Begin by tracking your vital signs regularly to establish your health baseline.".to_string(),
            recommendations: strings(&[
                "Log your heart rate and blood pressure daily",
                "Track your activity levels and sleep patterns",
                "Set up medication reminders if needed",
            ]),
            confidence_score: 0.9,
        });
        return insights;
    }

    if let Some(average) = recent_heart_rate_average(metrics) {
        let assessment = if in_normal_heart_range(average) {
            "This is within the normal range."
        } else {
            "Consider consulting with a healthcare provider about this reading."
        };
        insights.push(GeneratedInsight {
            insight_type: InsightType::Lifestyle,
            title: "Heart Rate Monitoring".to_string(),
            content: format!("Your average heart rate is {} bpm. {}", average.round(), assessment),
            recommendations: strings(&[
                "Continue regular heart rate monitoring",
                "Maintain consistent exercise routine",
                "Monitor any unusual changes in resting heart rate",
            ]),
            confidence_score: 0.85,
        });
    }

    if metrics.iter().any(|m| m.metric_type == MetricType::BloodPressure) {
        insights.push(GeneratedInsight {
            insight_type: InsightType::PreventiveCare,
            title: "Blood Pressure Tracking".to_string(),
            content: "You're actively monitoring your blood pressure, which is excellent for cardiovascular health.".to_string(),
            recommendations: strings(&[
                "Continue regular blood pressure checks",
                "Maintain a low-sodium diet",
                "Stay hydrated throughout the day",
            ]),
            confidence_score: 0.8,
        });
    }

    insights
}

fn general_insights() -> Vec<GeneratedInsight> {
    vec![
        GeneratedInsight {
            insight_type: InsightType::Nutrition,
            title: "Balanced Nutrition".to_string(),
            content: "Maintaining a balanced diet is crucial for overall health and wellness.".to_string(),
            recommendations: strings(&[
                "Eat a variety of colorful fruits and vegetables",
                "Stay hydrated with at least 8 glasses of water daily",
                "Limit processed foods and added sugars",
            ]),
            confidence_score: 0.85,
        },
        GeneratedInsight {
            insight_type: InsightType::Exercise,
            title: "Regular Physical Activity".to_string(),
            content: "Regular exercise is essential for maintaining cardiovascular health and overall wellness.".to_string(),
            recommendations: strings(&[
                "Aim for 150 minutes of moderate exercise per week",
                "Include both cardio and strength training",
                "Take breaks to stretch if you sit for long periods",
            ]),
            confidence_score: 0.9,
        },
    ]
}

fn is_high_blood_pressure(metric: &HealthMetric) -> bool {
    metric.metric_type == MetricType::BloodPressure
        && (metric.systolic.unwrap_or(0.0) > HIGH_SYSTOLIC || metric.diastolic.unwrap_or(0.0) > HIGH_DIASTOLIC)
}

fn alerts(metrics: &[HealthMetric], active_medications: usize) -> Vec<GeneratedAlert> {
    let mut alerts = Vec::new();

    if metrics.is_empty() {
        alerts.push(GeneratedAlert {
            severity: AlertSeverity::Low,
            title: "Start Tracking Your Health".to_string(),
            message: "Begin your health journey by logging your first vital signs. Regular tracking helps identify trends and potential health concerns early.".to_string(),
            alert_type: AlertType::Appointment,
        });
    } else {
        if metrics.iter().any(is_high_blood_pressure) {
            alerts.push(GeneratedAlert {
                severity: AlertSeverity::Medium,
                title: "Elevated Blood Pressure Detected".to_string(),
                message: "Some of your blood pressure readings are above the normal range. Consider scheduling a check-up with your healthcare provider.".to_string(),
                alert_type: AlertType::AbnormalReading,
            });
        }

        if metrics
            .iter()
            .any(|m| m.metric_type == MetricType::HeartRate && m.value > NORMAL_HEART_RATE.1)
        {
            alerts.push(GeneratedAlert {
                severity: AlertSeverity::Low,
                title: "Elevated Heart Rate".to_string(),
                message: "Your heart rate has been elevated recently. This could be due to activity, stress, or caffeine. Monitor and consult a doctor if it persists.".to_string(),
                alert_type: AlertType::AbnormalReading,
            });
        }
    }

    if active_medications > 0 {
        let plural = if active_medications == 1 { "" } else { "s" };
        alerts.push(GeneratedAlert {
            severity: AlertSeverity::Low,
            title: "Medication Reminders Active".to_string(),
            message: format!(
                "You have {} active medication{}. Check the Medications tab to ensure you're taking them as prescribed.",
                active_medications, plural
            ),
            alert_type: AlertType::MedicationReminder,
        });
    }

    alerts
}

/// Score the user's recent data. `metrics` must be sorted newest first.
pub fn evaluate_health(metrics: &[HealthMetric], active_medications: usize) -> HealthAnalysis {
    let mut insights = metric_insights(metrics);
    insights.extend(general_insights());

    HealthAnalysis {
        overall_health_score: health_score(metrics),
        insights,
        alerts: alerts(metrics, active_medications),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn metric(metric_type: MetricType, value: f64, age_minutes: i64) -> HealthMetric {
        let at = Utc::now() - Duration::minutes(age_minutes);
        HealthMetric {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            metric_type,
            value,
            unit: metric_type.unit().to_string(),
            systolic: None,
            diastolic: None,
            notes: None,
            recorded_at: at,
            created_at: at,
        }
    }

    fn blood_pressure(systolic: f64, diastolic: f64, age_minutes: i64) -> HealthMetric {
        HealthMetric {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            ..metric(MetricType::BloodPressure, systolic, age_minutes)
        }
    }

    fn titles<T>(items: &[T], title: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| title(i).to_string()).collect()
    }

    #[test]
    fn test_no_data_gives_baseline_and_onboarding() {
        let analysis = evaluate_health(&[], 0);
        assert_eq!(analysis.overall_health_score, 75);
        assert_eq!(
            titles(&analysis.insights, |i| &i.title),
            vec!["Start Your Health Journey", "Balanced Nutrition", "Regular Physical Activity"]
        );
        assert_eq!(analysis.alerts.len(), 1);
        assert_eq!(analysis.alerts[0].alert_type, AlertType::Appointment);
        assert_eq!(analysis.alerts[0].title, "Start Tracking Your Health");
    }

    #[test]
    fn test_normal_heart_rate_earns_bonus() {
        let metrics = vec![metric(MetricType::HeartRate, 72.0, 1), metric(MetricType::HeartRate, 68.0, 2)];
        let analysis = evaluate_health(&metrics, 0);
        assert_eq!(analysis.overall_health_score, 80);
        assert_eq!(analysis.insights[0].title, "Heart Rate Monitoring");
        assert_eq!(
            analysis.insights[0].content,
            "Your average heart rate is 70 bpm. This is within the normal range."
        );
        assert!(analysis.alerts.is_empty());
    }

    #[test]
    fn test_heart_rate_mean_uses_five_most_recent() {
        let mut metrics: Vec<HealthMetric> = (0..5).map(|i| metric(MetricType::HeartRate, 110.0, i)).collect();
        metrics.push(metric(MetricType::HeartRate, 60.0, 100));
        assert_eq!(recent_heart_rate_average(&metrics), Some(110.0));

        let analysis = evaluate_health(&metrics, 0);
        assert_eq!(analysis.overall_health_score, 75);
        assert!(analysis.insights[0].content.ends_with("Consider consulting with a healthcare provider about this reading."));
        assert_eq!(titles(&analysis.alerts, |a| &a.title), vec!["Elevated Heart Rate"]);
    }

    #[test]
    fn test_consistent_tracking_bonus() {
        let metrics: Vec<HealthMetric> = (0..10).map(|i| metric(MetricType::Steps, 5000.0, i)).collect();
        let analysis = evaluate_health(&metrics, 0);
        assert_eq!(analysis.overall_health_score, 85);

        let mut with_heart = metrics.clone();
        with_heart.insert(0, metric(MetricType::HeartRate, 65.0, 0));
        assert_eq!(health_score(&with_heart), 90);
    }

    #[test]
    fn test_metrics_without_heart_rate_skip_heart_insight() {
        let analysis = evaluate_health(&[metric(MetricType::Weight, 160.0, 1)], 0);
        assert_eq!(analysis.overall_health_score, 75);
        assert_eq!(
            titles(&analysis.insights, |i| &i.title),
            vec!["Balanced Nutrition", "Regular Physical Activity"]
        );
        assert!(analysis.alerts.is_empty());
    }

    #[test]
    fn test_high_blood_pressure_alert() {
        let metrics = vec![blood_pressure(150.0, 85.0, 1), blood_pressure(118.0, 76.0, 2)];
        let analysis = evaluate_health(&metrics, 0);
        assert_eq!(analysis.insights[0].title, "Blood Pressure Tracking");
        assert_eq!(analysis.insights[0].insight_type, InsightType::PreventiveCare);
        assert_eq!(analysis.alerts[0].title, "Elevated Blood Pressure Detected");
        assert_eq!(analysis.alerts[0].severity, AlertSeverity::Medium);

        // 140/90 is the boundary and does not alert
        let boundary = evaluate_health(&[blood_pressure(140.0, 90.0, 1)], 0);
        assert!(boundary.alerts.is_empty());
    }

    #[test]
    fn test_medication_reminder_wording() {
        let single = evaluate_health(&[], 1);
        assert_eq!(
            single.alerts[1].message,
            "You have 1 active medication. Check the Medications tab to ensure you're taking them as prescribed."
        );
        let several = evaluate_health(&[], 3);
        assert!(several.alerts[1].message.starts_with("You have 3 active medications."));
        assert_eq!(several.alerts[1].alert_type, AlertType::MedicationReminder);
    }
}
