use serde::{Deserialize, Serialize};

/// Per-user coefficients used to turn sober days into savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionProfile {
    /// Currency spent per drinking occasion.
    #[serde(default = "default_unit_cost")]
    pub unit_cost: f64,
    /// Drinking occasions per week.
    #[serde(default = "default_weekly_frequency")]
    pub weekly_frequency: f64,
    /// Hours spent per occasion, not counting recovery.
    #[serde(default = "default_session_hours")]
    pub session_hours: f64,
}

/// Preset steps offered when a user sets up a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn unit_cost(self) -> f64 {
        match self {
            Intensity::Low => 10_000.0,
            Intensity::Medium => 40_000.0,
            Intensity::High => 70_000.0,
        }
    }

    pub fn weekly_frequency(self) -> f64 {
        match self {
            Intensity::Low => 1.0,
            Intensity::Medium => 2.5,
            Intensity::High => 5.0,
        }
    }

    pub fn session_hours(self) -> f64 {
        match self {
            Intensity::Low => 1.5,
            Intensity::Medium => 4.0,
            Intensity::High => 6.0,
        }
    }
}

impl std::str::FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "short" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" | "long" => Ok(Intensity::High),
            other => Err(format!("Unknown preset: {other}")),
        }
    }
}

fn default_unit_cost() -> f64 {
    Intensity::Medium.unit_cost()
}
fn default_weekly_frequency() -> f64 {
    Intensity::Medium.weekly_frequency()
}
fn default_session_hours() -> f64 {
    Intensity::Medium.session_hours()
}

impl Default for ConsumptionProfile {
    fn default() -> Self {
        Self::from_presets(Intensity::Medium, Intensity::Medium, Intensity::Medium)
    }
}

impl ConsumptionProfile {
    pub fn new(unit_cost: f64, weekly_frequency: f64, session_hours: f64) -> Self {
        Self {
            unit_cost,
            weekly_frequency,
            session_hours,
        }
    }

    pub fn from_presets(cost: Intensity, frequency: Intensity, duration: Intensity) -> Self {
        Self::new(
            cost.unit_cost(),
            frequency.weekly_frequency(),
            duration.session_hours(),
        )
    }

    /// Every coefficient must be finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("unit_cost", self.unit_cost),
            ("weekly_frequency", self.weekly_frequency),
            ("session_hours", self.session_hours),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_medium_preset() {
        let p = ConsumptionProfile::default();
        assert_eq!(p, ConsumptionProfile::new(40_000.0, 2.5, 4.0));
    }

    #[test]
    fn presets_map_to_values() {
        let p = ConsumptionProfile::from_presets(Intensity::Low, Intensity::High, Intensity::Low);
        assert_eq!(p, ConsumptionProfile::new(10_000.0, 5.0, 1.5));
        assert_eq!("long".parse::<Intensity>().unwrap(), Intensity::High);
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        assert!(ConsumptionProfile::default().validate().is_ok());
        assert!(ConsumptionProfile::new(-1.0, 1.0, 1.0).validate().is_err());
        assert!(ConsumptionProfile::new(1.0, f64::NAN, 1.0).validate().is_err());
    }
}
