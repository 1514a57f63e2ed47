//! Tiered decision evaluation.
//!
//! Maps a (risk, optimization, projected outcome) triple onto one of three
//! fixed tiers with canned recommendations. The thresholds are configuration
//! inherited from the product, not a validated decision model.

use serde::{Deserialize, Serialize};

/// Inputs on a 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionContext {
    pub risk_factor: f32,
    pub optimization_factor: f32,
    pub projected_outcome: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionTier {
    Safe,
    Strategic,
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAssessment {
    pub tier: DecisionTier,
    pub recommendation: String,
    pub confidence: f32,
    pub risk_assessment: String,
}

/// Evaluate a decision context against the fixed tier thresholds.
pub fn evaluate(context: DecisionContext) -> DecisionAssessment {
    let DecisionContext {
        risk_factor,
        optimization_factor,
        projected_outcome,
    } = context;

    if risk_factor <= 30.0 && optimization_factor >= 70.0 && projected_outcome >= 80.0 {
        DecisionAssessment {
            tier: DecisionTier::Safe,
            recommendation: "This is a safe decision with high optimization potential and \
                 excellent projected outcomes. Proceed with confidence."
                .to_string(),
            confidence: 0.9,
            risk_assessment: "Low risk, high reward scenario".to_string(),
        }
    } else if risk_factor <= 60.0 && optimization_factor >= 50.0 && projected_outcome >= 60.0 {
        DecisionAssessment {
            tier: DecisionTier::Strategic,
            recommendation: "This is a strategic decision requiring careful consideration of \
                 risks and benefits. Implement with monitoring."
                .to_string(),
            confidence: 0.7,
            risk_assessment: "Moderate risk, balanced reward scenario".to_string(),
        }
    } else {
        DecisionAssessment {
            tier: DecisionTier::Adaptive,
            recommendation: "This decision requires adaptive thinking and careful risk \
                 management. Consider alternative approaches or additional safeguards."
                .to_string(),
            confidence: 0.5,
            risk_assessment: "High risk scenario requiring careful management".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(risk: f32, opt: f32, outcome: f32) -> DecisionContext {
        DecisionContext {
            risk_factor: risk,
            optimization_factor: opt,
            projected_outcome: outcome,
        }
    }

    #[test]
    fn test_safe_tier() {
        let assessment = evaluate(ctx(10.0, 85.0, 90.0));
        assert_eq!(assessment.tier, DecisionTier::Safe);
        assert!((assessment.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_strategic_tier() {
        let assessment = evaluate(ctx(45.0, 60.0, 70.0));
        assert_eq!(assessment.tier, DecisionTier::Strategic);
    }

    #[test]
    fn test_adaptive_tier_for_high_risk() {
        let assessment = evaluate(ctx(90.0, 90.0, 90.0));
        assert_eq!(assessment.tier, DecisionTier::Adaptive);
        assert!((assessment.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_values_land_in_safe() {
        let assessment = evaluate(ctx(30.0, 70.0, 80.0));
        assert_eq!(assessment.tier, DecisionTier::Safe);
    }
}
