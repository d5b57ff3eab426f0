//! Physiological state classification from crew biometric readings.
//!
//! A fixed, ordered rule table maps a reading to a state. Rules are
//! evaluated in order; every triggered rule appends its recommendation and
//! the last triggered rule decides the state. Any non-normal state raises
//! the alert level.

use serde::{Deserialize, Serialize};

/// A crew biometric reading.
///
/// Fields absent on the wire take the nominal resting defaults
/// (70 bpm, 16 breaths/min, 0.5 stress).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricReading {
    /// Heart rate in beats per minute.
    pub heart_rate: f64,
    /// Respiration rate in breaths per minute.
    pub respiration: f64,
    /// Stress index in [0, 1].
    pub stress_level: f64,
}

impl Default for BiometricReading {
    fn default() -> Self {
        Self {
            heart_rate: 70.0,
            respiration: 16.0,
            stress_level: 0.5,
        }
    }
}

/// Classified physiological state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysiologicalState {
    /// No rule triggered.
    Normal,
    /// Heart rate above 100 bpm.
    ElevatedHeartRate,
    /// Respiration above 20 breaths/min.
    RapidBreathing,
    /// Stress index above 0.7.
    HighStress,
}

impl PhysiologicalState {
    /// Whether this is the no-findings state.
    #[must_use]
    pub const fn is_nominal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl std::fmt::Display for PhysiologicalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::ElevatedHeartRate => write!(f, "elevated_heart_rate"),
            Self::RapidBreathing => write!(f, "rapid_breathing"),
            Self::HighStress => write!(f, "high_stress"),
        }
    }
}

/// Alert level derived from the final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Final state was normal.
    Normal,
    /// At least one rule triggered.
    High,
}

/// Result of classifying one biometric reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysiologicalAssessment {
    /// Final state (last triggered rule wins).
    pub state: PhysiologicalState,
    /// Recommendations from every triggered rule, in rule order.
    pub recommendations: Vec<String>,
    /// High iff the state is not normal.
    pub alert_level: AlertLevel,
}

/// One classification rule: trigger, resulting state, recommendation.
struct Rule {
    trigger: fn(&BiometricReading) -> bool,
    state: PhysiologicalState,
    recommendation: &'static str,
}

/// Rules in evaluation order. Thresholds are strict comparisons.
const RULES: &[Rule] = &[
    Rule {
        trigger: |r| r.heart_rate > 100.0,
        state: PhysiologicalState::ElevatedHeartRate,
        recommendation: "Reduce physical exertion",
    },
    Rule {
        trigger: |r| r.respiration > 20.0,
        state: PhysiologicalState::RapidBreathing,
        recommendation: "Practice deep breathing",
    },
    Rule {
        trigger: |r| r.stress_level > 0.7,
        state: PhysiologicalState::HighStress,
        recommendation: "Take a break and hydrate",
    },
];

/// Classifies a biometric reading against the rule table. Pure; never fails.
#[must_use]
pub fn assess_biometrics(reading: &BiometricReading) -> PhysiologicalAssessment {
    let mut state = PhysiologicalState::Normal;
    let mut recommendations = Vec::new();
    for rule in RULES {
        if (rule.trigger)(reading) {
            state = rule.state;
            recommendations.push(rule.recommendation.to_string());
        }
    }
    let alert_level = if state.is_nominal() {
        AlertLevel::Normal
    } else {
        AlertLevel::High
    };
    PhysiologicalAssessment {
        state,
        recommendations,
        alert_level,
    }
}
