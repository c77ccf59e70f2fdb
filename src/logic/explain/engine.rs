use super::types::{ExplainResult, FeatureContribution};
use crate::constants::EXPLAIN_TOP_N;
use crate::logic::features::{FeatureId, FeatureVector};
use crate::logic::model::FeatureImportances;

/// Contributions below this are noise
const MIN_IMPORTANCE: f64 = 0.05;

pub fn explain(vector: &FeatureVector, importances: &FeatureImportances) -> Option<ExplainResult> {
    let mut contributions = Vec::new();

    for (id, value) in vector.iter() {
        let i = id.index();
        let scale = importances.scale[i];
        if scale <= 0.0 {
            continue;
        }

        let weight = importances.weights[i];
        let delta = (value - importances.reference[i]) / scale;
        let importance = delta.abs() * weight;

        // Only include meaningful deviations
        if importance > MIN_IMPORTANCE {
            contributions.push(FeatureContribution {
                name: id.name().to_string(),
                delta, // Keep sign to show increase/decrease
                weight,
                importance,
                description: get_description(id, delta),
            });
        }
    }

    // Sort by importance DESC
    contributions.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    contributions.truncate(EXPLAIN_TOP_N);

    if contributions.is_empty() {
        return None;
    }

    Some(ExplainResult { contributions })
}

fn get_description(id: FeatureId, delta: f64) -> Option<String> {
    let above = delta > 0.0;
    let text = match (id, above) {
        (FeatureId::Rainfall12mo, true) => "Wetter than typical, more breeding sites",
        (FeatureId::Rainfall12mo, false) => "Drier than typical",
        (FeatureId::TempMeanC, true) => "Warmer than typical",
        (FeatureId::TempMeanC, false) => "Cooler than typical, slower parasite development",
        (FeatureId::NdviMean, true) => "Dense vegetation cover",
        (FeatureId::NdviMean, false) => "Sparse vegetation cover",
        (FeatureId::PopDensity, true) => "Densely populated",
        (FeatureId::PopDensity, false) => "Sparsely populated",
        (FeatureId::Elevation, true) => "High elevation",
        (FeatureId::Elevation, false) => "Low-lying terrain",
        (FeatureId::WaterCoverage, true) => "Extensive surface water",
        (FeatureId::WaterCoverage, false) => "Little surface water",
    };
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importances() -> FeatureImportances {
        FeatureImportances {
            reference: [1350.0, 25.0, 0.45, 500.0, 1250.0, 20.0],
            scale: [664.0, 4.0, 0.2, 288.0, 722.0, 11.5],
            weights: [0.21, 0.11, 0.08, 0.17, 0.24, 0.19],
        }
    }

    #[test]
    fn test_average_location_has_no_explanation() {
        let vector = FeatureVector::from_values([1350.0, 25.0, 0.45, 500.0, 1250.0, 20.0]);
        assert!(explain(&vector, &importances()).is_none());
    }

    #[test]
    fn test_sorted_and_signed() {
        let vector = FeatureVector::from_values([1350.0, 25.0, 0.45, 500.0, 0.0, 40.0]);
        let result = explain(&vector, &importances()).unwrap();

        assert_eq!(result.contributions.len(), 2);
        assert_eq!(result.contributions[0].name, "elevation");
        assert!(result.contributions[0].delta < 0.0);
        assert_eq!(
            result.contributions[0].description.as_deref(),
            Some("Low-lying terrain")
        );
        assert_eq!(result.contributions[1].name, "water_coverage");
        assert!(result.contributions[0].importance >= result.contributions[1].importance);
    }

    #[test]
    fn test_truncated_to_top_n() {
        let vector = FeatureVector::from_values([5000.0, 40.0, 0.95, 5000.0, 5000.0, 90.0]);
        let result = explain(&vector, &importances()).unwrap();
        assert_eq!(result.contributions.len(), EXPLAIN_TOP_N);
        assert!(!result.contributions.iter().any(|c| c.name == "ndvi_mean"));
    }
}
