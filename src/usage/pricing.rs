//! Per-character pricing and cost estimation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPricing {
    pub cost_per_million: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".into()
}

impl CharacterPricing {
    pub fn new(cost_per_million: f64) -> Self {
        Self {
            cost_per_million,
            currency: default_currency(),
        }
    }
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.into();
        self
    }
    pub fn calculate_cost(&self, characters: u64) -> f64 {
        (characters as f64 / 1_000_000.0) * self.cost_per_million
    }
    pub fn deepl_pro() -> Self {
        Self::new(25.0).with_currency("EUR")
    }
    pub fn google_v2() -> Self {
        Self::new(20.0)
    }
    pub fn format(&self, characters: u64) -> String {
        format!("{} {:.4}", self.currency, self.calculate_cost(characters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_per_million() {
        let p = CharacterPricing::google_v2();
        assert!((p.calculate_cost(500_000) - 10.0).abs() < f64::EPSILON);
        assert_eq!(p.format(1_000_000), "USD 20.0000");
    }
}
