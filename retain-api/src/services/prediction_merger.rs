//! Prediction correlation and merge
//!
//! Joins scoring predictions back onto validated records by natural
//! key, falling back to display name for predictions the service
//! returned without an `Employee ID`. Records the service skipped get
//! neutral defaults instead of failing the batch.

use std::collections::HashMap;
use tracing::warn;

use crate::models::{EnrichedRecord, ValidatedRecord};
use crate::services::scoring_client::Prediction;

/// Probability assigned to records the scoring service did not match
const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Merge predictions into the batch, one enriched record per input
/// record, in input order.
pub fn merge(records: Vec<ValidatedRecord>, predictions: Vec<Prediction>) -> Vec<EnrichedRecord> {
    let mut by_key: HashMap<i64, &Prediction> = HashMap::new();
    let mut by_name: HashMap<&str, &Prediction> = HashMap::new();
    let mut collisions = 0usize;

    for prediction in &predictions {
        if let Some(key) = prediction.employee_id {
            if by_key.insert(key, prediction).is_some() {
                collisions += 1;
            }
        }
        if let Some(name) = prediction.full_name.as_deref() {
            if by_name.insert(name, prediction).is_some() {
                collisions += 1;
            }
        }
    }
    if collisions > 0 {
        // Last write wins, matching how the lookup maps are built
        warn!(collisions, "scoring response contained duplicate keys");
    }

    let mut unmatched = 0usize;
    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .map(|record| {
            let prediction = by_key
                .get(&record.key())
                .or_else(|| by_name.get(record.display_name()))
                .copied();

            match prediction {
                Some(p) => {
                    let probability = p.attrition_probability.unwrap_or(NEUTRAL_PROBABILITY);
                    let label = p
                        .attrition
                        .unwrap_or(if probability > 0.5 { 1 } else { 0 });
                    EnrichedRecord {
                        record,
                        probability,
                        label,
                        top_positive: p.top_positive_contributors.clone(),
                        top_negative: p.top_negative_contributors.clone(),
                        matched: true,
                    }
                }
                None => {
                    unmatched += 1;
                    EnrichedRecord {
                        record,
                        probability: NEUTRAL_PROBABILITY,
                        label: 0,
                        top_positive: Vec::new(),
                        top_negative: Vec::new(),
                        matched: false,
                    }
                }
            }
        })
        .collect();

    if unmatched > 0 {
        warn!(
            unmatched,
            total = enriched.len(),
            "records missing from scoring response, using neutral defaults"
        );
    }

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contributor;
    use serde_json::Map;

    fn record(key: i64, name: &str) -> ValidatedRecord {
        ValidatedRecord::new(key, name.to_string(), Map::new())
    }

    fn prediction(key: Option<i64>, name: Option<&str>, probability: f64) -> Prediction {
        Prediction {
            employee_id: key,
            full_name: name.map(str::to_string),
            attrition_probability: Some(probability),
            attrition: None,
            top_positive_contributors: vec![Contributor {
                feature: "Salary".to_string(),
                contribution: 0.2,
            }],
            top_negative_contributors: Vec::new(),
        }
    }

    #[test]
    fn matches_by_key_first() {
        let records = vec![record(1, "Ada"), record(2, "Grace")];
        let predictions = vec![
            prediction(Some(2), Some("Grace"), 0.9),
            prediction(Some(1), Some("Ada"), 0.1),
        ];

        let enriched = merge(records, predictions);
        assert_eq!(enriched.len(), 2);
        // Input order preserved regardless of response order
        assert_eq!(enriched[0].probability, 0.1);
        assert_eq!(enriched[1].probability, 0.9);
        assert!(enriched.iter().all(|e| e.matched));
    }

    #[test]
    fn falls_back_to_name_when_key_is_missing() {
        let records = vec![record(1, "Ada")];
        let predictions = vec![prediction(None, Some("Ada"), 0.7)];

        let enriched = merge(records, predictions);
        assert!(enriched[0].matched);
        assert_eq!(enriched[0].probability, 0.7);
    }

    #[test]
    fn unmatched_records_get_neutral_defaults() {
        let records = vec![record(1, "Ada"), record(2, "Grace")];
        let predictions = vec![prediction(Some(1), Some("Ada"), 0.9)];

        let enriched = merge(records, predictions);
        assert!(enriched[0].matched);
        assert!(!enriched[1].matched);
        assert_eq!(enriched[1].probability, 0.5);
        assert_eq!(enriched[1].label, 0);
        assert!(enriched[1].top_positive.is_empty());
        assert!(enriched[1].top_negative.is_empty());
    }

    #[test]
    fn label_derives_from_probability_when_omitted() {
        let records = vec![record(1, "Ada"), record(2, "Grace")];
        let predictions = vec![
            prediction(Some(1), None, 0.51),
            prediction(Some(2), None, 0.5),
        ];

        let enriched = merge(records, predictions);
        assert_eq!(enriched[0].label, 1);
        // Exactly 0.5 is not attrition
        assert_eq!(enriched[1].label, 0);
    }

    #[test]
    fn later_duplicate_prediction_wins() {
        let records = vec![record(1, "Ada")];
        let predictions = vec![
            prediction(Some(1), Some("Ada"), 0.2),
            prediction(Some(1), Some("Ada"), 0.9),
        ];

        let enriched = merge(records, predictions);
        assert!(enriched[0].matched);
        assert_eq!(enriched[0].probability, 0.9);
    }

    #[test]
    fn explicit_label_wins_over_derivation() {
        let records = vec![record(1, "Ada")];
        let mut p = prediction(Some(1), None, 0.9);
        p.attrition = Some(0);

        let enriched = merge(records, vec![p]);
        assert_eq!(enriched[0].label, 0);
    }
}
