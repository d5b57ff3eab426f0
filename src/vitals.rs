//! Vital-sign threshold alerting.
//!
//! Deterministic range checks over a crew vital sample, gated by an
//! activity context derived from the sample's activity index: thresholds
//! that are alarming at rest are expected during exercise. Per-sign checks
//! run first in a fixed order, then fusion rules that combine multiple
//! signs. All limits live in [`VitalLimits`] so missions can adjust them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One crew vital sample.
///
/// Fields absent on the wire take nominal resting defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalSample {
    /// Heart rate in beats per minute.
    pub heart_rate: f64,
    /// Respiration rate in breaths per minute.
    pub respiration: f64,
    /// Blood oxygen saturation in percent.
    pub spo2: f64,
    /// Core body temperature in degrees Celsius.
    pub core_temp: f64,
    /// Heart rate variability in milliseconds.
    pub hrv: f64,
    /// Activity index in [0, 100] from the accelerometer.
    pub activity: f64,
}

impl Default for VitalSample {
    fn default() -> Self {
        Self {
            heart_rate: 70.0,
            respiration: 16.0,
            spo2: 98.0,
            core_temp: 36.8,
            hrv: 50.0,
            activity: 0.0,
        }
    }
}

/// Physical activity context inferred from the activity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityContext {
    /// Activity index at or below 15.
    Resting,
    /// Activity index above 15, at or below 40.
    LightActivity,
    /// Activity index above 40.
    Exercise,
}

impl ActivityContext {
    /// Context for a raw activity index.
    #[must_use]
    pub fn from_index(activity: f64) -> Self {
        if activity > 40.0 {
            Self::Exercise
        } else if activity > 15.0 {
            Self::LightActivity
        } else {
            Self::Resting
        }
    }

    /// Whether this is the sustained-exercise context.
    #[must_use]
    pub const fn is_exercise(self) -> bool {
        matches!(self, Self::Exercise)
    }
}

/// The check that raised an alert: one of the monitored signs, or a fusion
/// pattern combining several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    /// Heart rate range check.
    HeartRate,
    /// Respiration range check (context-gated).
    Respiration,
    /// Blood oxygen saturation floor.
    OxygenSaturation,
    /// Core temperature ceiling.
    CoreTemperature,
    /// Heart rate variability floor.
    HeartRateVariability,
    /// Fusion: high respiration with low SpO2 outside exercise.
    RespiratoryDistress,
    /// Fusion: elevated heart rate with elevated temperature.
    InfectionWatch,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Outside the nominal band; worth watching.
    Warning,
    /// Outside the safe band; needs attention now.
    Critical,
}

impl AlertSeverity {
    /// Whether this is the critical severity.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

/// A raised vital-sign alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalAlert {
    /// The check that raised this alert.
    pub sign: VitalSign,
    /// How bad it is.
    pub severity: AlertSeverity,
    /// The measured value that tripped the check (the primary sign's value
    /// for fusion alerts).
    pub measured: f64,
    /// Human-readable description.
    pub message: String,
    /// When the evaluation ran.
    pub raised_at: DateTime<Utc>,
}

/// Per-sign alert limits. Defaults are the flight-surgeon reference bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalLimits {
    /// Heart rate warning ceiling in bpm (suppressed during exercise).
    pub heart_rate_warning: f64,
    /// Heart rate critical ceiling in bpm.
    pub heart_rate_critical: f64,
    /// Resting respiration warning band floor, breaths/min.
    pub resting_respiration_low_warning: f64,
    /// Resting respiration warning band ceiling, breaths/min.
    pub resting_respiration_high_warning: f64,
    /// Resting respiration critical band floor, breaths/min.
    pub resting_respiration_low_critical: f64,
    /// Resting respiration critical band ceiling, breaths/min.
    pub resting_respiration_high_critical: f64,
    /// Minimum expected respiration during light activity, breaths/min.
    pub light_activity_respiration_floor: f64,
    /// Minimum expected respiration during exercise, breaths/min.
    pub exercise_respiration_floor: f64,
    /// SpO2 warning floor in percent.
    pub spo2_warning: f64,
    /// SpO2 critical floor in percent.
    pub spo2_critical: f64,
    /// Core temperature warning ceiling in degrees Celsius.
    pub core_temp_warning: f64,
    /// Core temperature critical ceiling in degrees Celsius.
    pub core_temp_critical: f64,
    /// HRV warning floor in milliseconds.
    pub hrv_warning: f64,
    /// Respiration floor for the respiratory-distress fusion rule.
    pub distress_respiration: f64,
    /// SpO2 ceiling for the respiratory-distress fusion rule.
    pub distress_spo2: f64,
    /// Heart rate floor for the infection-watch fusion rule.
    pub infection_heart_rate: f64,
    /// Core temperature floor for the infection-watch fusion rule.
    pub infection_core_temp: f64,
}

impl Default for VitalLimits {
    fn default() -> Self {
        Self {
            heart_rate_warning: 100.0,
            heart_rate_critical: 120.0,
            resting_respiration_low_warning: 10.0,
            resting_respiration_high_warning: 25.0,
            resting_respiration_low_critical: 8.0,
            resting_respiration_high_critical: 30.0,
            light_activity_respiration_floor: 12.0,
            exercise_respiration_floor: 20.0,
            spo2_warning: 95.0,
            spo2_critical: 92.0,
            core_temp_warning: 37.5,
            core_temp_critical: 39.0,
            hrv_warning: 20.0,
            distress_respiration: 35.0,
            distress_spo2: 94.0,
            infection_heart_rate: 90.0,
            infection_core_temp: 37.5,
        }
    }
}

/// Evaluates one sample against the limits.
///
/// Alerts come back in a fixed order: heart rate, respiration, SpO2, core
/// temperature, HRV, then the fusion rules. An empty vec means every check
/// passed.
#[must_use]
pub fn evaluate_vitals(sample: &VitalSample, limits: &VitalLimits) -> Vec<VitalAlert> {
    let context = ActivityContext::from_index(sample.activity);
    let raised_at = Utc::now();
    let mut alerts = Vec::new();

    let hr = sample.heart_rate;
    if hr > limits.heart_rate_critical {
        alerts.push(VitalAlert {
            sign: VitalSign::HeartRate,
            severity: AlertSeverity::Critical,
            measured: hr,
            message: format!("Heart rate critically high: {hr:.1} bpm"),
            raised_at,
        });
    } else if hr > limits.heart_rate_warning && !context.is_exercise() {
        alerts.push(VitalAlert {
            sign: VitalSign::HeartRate,
            severity: AlertSeverity::Warning,
            measured: hr,
            message: format!("Heart rate elevated: {hr:.1} bpm"),
            raised_at,
        });
    }

    let rr = sample.respiration;
    match context {
        ActivityContext::Resting => {
            let critical = rr < limits.resting_respiration_low_critical
                || rr > limits.resting_respiration_high_critical;
            let warning = rr < limits.resting_respiration_low_warning
                || rr > limits.resting_respiration_high_warning;
            if critical || warning {
                alerts.push(VitalAlert {
                    sign: VitalSign::Respiration,
                    severity: if critical {
                        AlertSeverity::Critical
                    } else {
                        AlertSeverity::Warning
                    },
                    measured: rr,
                    message: format!("Abnormal respiration at rest: {rr:.1} breaths/min"),
                    raised_at,
                });
            }
        }
        ActivityContext::LightActivity => {
            if rr < limits.light_activity_respiration_floor {
                alerts.push(VitalAlert {
                    sign: VitalSign::Respiration,
                    severity: AlertSeverity::Critical,
                    measured: rr,
                    message: format!(
                        "Poor respiratory response to light activity: {rr:.1} breaths/min"
                    ),
                    raised_at,
                });
            }
        }
        ActivityContext::Exercise => {
            if rr < limits.exercise_respiration_floor {
                alerts.push(VitalAlert {
                    sign: VitalSign::Respiration,
                    severity: AlertSeverity::Critical,
                    measured: rr,
                    message: format!(
                        "Inadequate respiration during exercise: {rr:.1} breaths/min"
                    ),
                    raised_at,
                });
            }
        }
    }

    let spo2 = sample.spo2;
    if spo2 < limits.spo2_critical {
        alerts.push(VitalAlert {
            sign: VitalSign::OxygenSaturation,
            severity: AlertSeverity::Critical,
            measured: spo2,
            message: format!("SpO2 critically low: {spo2:.1}%"),
            raised_at,
        });
    } else if spo2 < limits.spo2_warning {
        alerts.push(VitalAlert {
            sign: VitalSign::OxygenSaturation,
            severity: AlertSeverity::Warning,
            measured: spo2,
            message: format!("SpO2 low: {spo2:.1}%"),
            raised_at,
        });
    }

    let temp = sample.core_temp;
    if temp > limits.core_temp_critical {
        alerts.push(VitalAlert {
            sign: VitalSign::CoreTemperature,
            severity: AlertSeverity::Critical,
            measured: temp,
            message: format!("Core temperature critically high: {temp:.1} degC"),
            raised_at,
        });
    } else if temp > limits.core_temp_warning {
        alerts.push(VitalAlert {
            sign: VitalSign::CoreTemperature,
            severity: AlertSeverity::Warning,
            measured: temp,
            message: format!("Core temperature elevated: {temp:.1} degC"),
            raised_at,
        });
    }

    let hrv = sample.hrv;
    if hrv < limits.hrv_warning {
        alerts.push(VitalAlert {
            sign: VitalSign::HeartRateVariability,
            severity: AlertSeverity::Warning,
            measured: hrv,
            message: format!("HRV low: {hrv:.1} ms (stress indicator)"),
            raised_at,
        });
    }

    if rr > limits.distress_respiration && spo2 < limits.distress_spo2 && !context.is_exercise() {
        alerts.push(VitalAlert {
            sign: VitalSign::RespiratoryDistress,
            severity: AlertSeverity::Critical,
            measured: rr,
            message: format!(
                "Respiratory distress: RR {rr:.1} breaths/min with SpO2 {spo2:.1}% outside exercise"
            ),
            raised_at,
        });
    }

    if hr > limits.infection_heart_rate && temp > limits.infection_core_temp {
        alerts.push(VitalAlert {
            sign: VitalSign::InfectionWatch,
            severity: AlertSeverity::Warning,
            measured: hr,
            message: format!(
                "Infection watch: HR {hr:.1} bpm with core temperature {temp:.1} degC"
            ),
            raised_at,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VitalSample {
        VitalSample::default()
    }

    fn signs(alerts: &[VitalAlert]) -> Vec<VitalSign> {
        alerts.iter().map(|a| a.sign).collect()
    }

    #[test]
    fn nominal_sample_raises_nothing() {
        let alerts = evaluate_vitals(&sample(), &VitalLimits::default());
        assert!(alerts.is_empty(), "unexpected alerts: {alerts:?}");
    }

    #[test]
    fn activity_context_boundaries() {
        assert_eq!(ActivityContext::from_index(0.0), ActivityContext::Resting);
        assert_eq!(ActivityContext::from_index(15.0), ActivityContext::Resting);
        assert_eq!(
            ActivityContext::from_index(15.1),
            ActivityContext::LightActivity
        );
        assert_eq!(
            ActivityContext::from_index(40.0),
            ActivityContext::LightActivity
        );
        assert_eq!(ActivityContext::from_index(40.1), ActivityContext::Exercise);
    }

    #[test]
    fn elevated_heart_rate_warns_at_rest() {
        let s = VitalSample {
            heart_rate: 110.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::HeartRate]);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert_eq!(alerts[0].measured, 110.0);
    }

    #[test]
    fn heart_rate_warning_is_suppressed_during_exercise() {
        let s = VitalSample {
            heart_rate: 110.0,
            respiration: 25.0,
            activity: 60.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert!(alerts.is_empty(), "exercise HR should not warn: {alerts:?}");
    }

    #[test]
    fn critical_heart_rate_fires_even_during_exercise() {
        let s = VitalSample {
            heart_rate: 130.0,
            respiration: 25.0,
            activity: 60.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::HeartRate]);
        assert!(alerts[0].severity.is_critical());
    }

    #[test]
    fn resting_respiration_bands() {
        let limits = VitalLimits::default();
        for (rr, expect_critical) in [(28.0, false), (32.0, true), (9.0, false), (7.0, true)] {
            let s = VitalSample {
                respiration: rr,
                ..sample()
            };
            let alerts = evaluate_vitals(&s, &limits);
            assert_eq!(signs(&alerts), vec![VitalSign::Respiration], "rr = {rr}");
            assert_eq!(alerts[0].severity.is_critical(), expect_critical, "rr = {rr}");
        }
    }

    #[test]
    fn light_activity_gates_the_respiration_floor() {
        let limits = VitalLimits::default();
        let slow = VitalSample {
            respiration: 11.0,
            activity: 20.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&slow, &limits);
        assert_eq!(signs(&alerts), vec![VitalSign::Respiration]);
        assert!(alerts[0].severity.is_critical());
        // The same rate at rest sits inside the warning band.
        let at_rest = VitalSample {
            respiration: 11.0,
            ..sample()
        };
        assert!(evaluate_vitals(&at_rest, &limits).is_empty());
    }

    #[test]
    fn exercise_requires_adequate_respiration() {
        let limits = VitalLimits::default();
        let slow = VitalSample {
            respiration: 18.0,
            activity: 60.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&slow, &limits);
        assert_eq!(signs(&alerts), vec![VitalSign::Respiration]);
        assert!(alerts[0].severity.is_critical());
        let adequate = VitalSample {
            respiration: 22.0,
            activity: 60.0,
            ..sample()
        };
        assert!(evaluate_vitals(&adequate, &limits).is_empty());
    }

    #[test]
    fn spo2_floors() {
        let warn = VitalSample {
            spo2: 94.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&warn, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::OxygenSaturation]);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);

        let crit = VitalSample {
            spo2: 91.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&crit, &VitalLimits::default());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].severity.is_critical());
    }

    #[test]
    fn core_temperature_ceilings() {
        let warn = VitalSample {
            core_temp: 38.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&warn, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::CoreTemperature]);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);

        let crit = VitalSample {
            core_temp: 39.5,
            ..sample()
        };
        let alerts = evaluate_vitals(&crit, &VitalLimits::default());
        assert!(alerts[0].severity.is_critical());
    }

    #[test]
    fn low_hrv_warns() {
        let s = VitalSample {
            hrv: 15.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::HeartRateVariability]);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn respiratory_distress_fuses_rr_and_spo2_at_rest() {
        let s = VitalSample {
            respiration: 38.0,
            spo2: 93.0,
            activity: 10.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(
            signs(&alerts),
            vec![
                VitalSign::Respiration,
                VitalSign::OxygenSaturation,
                VitalSign::RespiratoryDistress,
            ]
        );
        let distress = &alerts[2];
        assert!(distress.severity.is_critical());
        assert_eq!(distress.measured, 38.0);
    }

    #[test]
    fn respiratory_distress_is_suppressed_during_exercise() {
        let s = VitalSample {
            respiration: 38.0,
            spo2: 93.0,
            activity: 60.0,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(signs(&alerts), vec![VitalSign::OxygenSaturation]);
    }

    #[test]
    fn infection_watch_fuses_hr_and_temperature() {
        let s = VitalSample {
            heart_rate: 95.0,
            core_temp: 37.8,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(
            signs(&alerts),
            vec![VitalSign::CoreTemperature, VitalSign::InfectionWatch]
        );
        let infection = &alerts[1];
        assert_eq!(infection.severity, AlertSeverity::Warning);
        assert_eq!(infection.measured, 95.0);
    }

    #[test]
    fn alerts_keep_the_documented_order() {
        let s = VitalSample {
            heart_rate: 105.0,
            core_temp: 37.8,
            ..sample()
        };
        let alerts = evaluate_vitals(&s, &VitalLimits::default());
        assert_eq!(
            signs(&alerts),
            vec![
                VitalSign::HeartRate,
                VitalSign::CoreTemperature,
                VitalSign::InfectionWatch,
            ]
        );
    }

    #[test]
    fn custom_limits_move_the_bands() {
        let limits = VitalLimits {
            heart_rate_warning: 150.0,
            heart_rate_critical: 160.0,
            infection_heart_rate: 150.0,
            ..VitalLimits::default()
        };
        let s = VitalSample {
            heart_rate: 130.0,
            ..sample()
        };
        assert!(evaluate_vitals(&s, &limits).is_empty());
    }

    #[test]
    fn partial_wire_sample_takes_defaults() {
        let parsed: VitalSample = serde_json::from_str("{\"heart_rate\": 110.0}").unwrap();
        assert_eq!(parsed.heart_rate, 110.0);
        assert_eq!(parsed.spo2, 98.0);
        assert_eq!(parsed.activity, 0.0);
    }

    #[test]
    fn sign_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&VitalSign::OxygenSaturation).unwrap(),
            "\"oxygen_saturation\""
        );
        assert_eq!(
            serde_json::to_string(&VitalSign::RespiratoryDistress).unwrap(),
            "\"respiratory_distress\""
        );
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Critical).unwrap(),
            "\"critical\""
        );
    }
}
