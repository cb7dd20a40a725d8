use std::str::FromStr;

use crate::store::CoreError;

/// Blend the trained cosine matrices were tuned with.
pub const DEFAULT_WEIGHTS: [(&str, f64); 3] = [
    ("cosine_sim1", 0.5),
    ("cosine_sim2", 0.8),
    ("cosine_sim3", 1.0),
];

/**
 * Ordered mapping from similarity matrix name to a non-negative weight. At least one weight
 * is nonzero.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    weights: Vec<(String, f64)>,
}

impl WeightSet {
    pub fn new(weights: Vec<(String, f64)>) -> Result<WeightSet, CoreError> {
        for (idx, (name, weight)) in weights.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(CoreError::InvalidArgument(format!(
                    "weight of '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
            if weights[..idx].iter().any(|(other, _)| other == name) {
                return Err(CoreError::InvalidArgument(format!(
                    "weight of '{}' given twice",
                    name
                )));
            }
        }

        if !weights.iter().any(|(_, w)| *w > 0.0) {
            return Err(CoreError::InvalidArgument(
                "at least one weight must be nonzero".to_owned(),
            ));
        }

        Ok(WeightSet { weights })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, w)| (name.as_str(), *w))
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, w)| w)
    }
}

impl Default for WeightSet {
    fn default() -> WeightSet {
        WeightSet {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|(name, w)| (name.to_string(), *w))
                .collect(),
        }
    }
}

/// A single `name=weight` entry, as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry(pub String, pub f64);

impl FromStr for WeightEntry {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<WeightEntry, CoreError> {
        let mut parts = s.splitn(2, '=');
        let name = parts.next().unwrap_or_default().trim();
        let value = parts.next().map(str::trim);

        match value {
            Some(value) if !name.is_empty() => value
                .parse::<f64>()
                .map(|w| WeightEntry(name.to_owned(), w))
                .map_err(|_| CoreError::InvalidArgument(format!("invalid weight in '{}'", s))),
            _ => Err(CoreError::InvalidArgument(format!(
                "expected name=weight, got '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_keep_the_given_order() {
        let weights = WeightSet::new(vec![("b".to_owned(), 1.0), ("a".to_owned(), 0.0)]).unwrap();

        assert_eq!(weights.iter().collect::<Vec<_>>(), vec![("b", 1.0), ("a", 0.0)]);
        assert_eq!(weights.get("a"), Some(0.0));
        assert_eq!(weights.get("c"), None);
    }

    #[test]
    fn it_should_default_to_the_trained_blend() {
        let weights = WeightSet::default();

        assert_eq!(weights.get("cosine_sim1"), Some(0.5));
        assert_eq!(weights.get("cosine_sim2"), Some(0.8));
        assert_eq!(weights.get("cosine_sim3"), Some(1.0));
    }

    #[test]
    fn it_should_reject_negative_weights() {
        let result = WeightSet::new(vec![("a".to_owned(), -0.1)]);

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_reject_non_finite_weights() {
        let result = WeightSet::new(vec![("a".to_owned(), std::f64::NAN)]);

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_reject_all_zero_weights() {
        assert_matches!(
            WeightSet::new(vec![("a".to_owned(), 0.0), ("b".to_owned(), 0.0)]),
            Err(CoreError::InvalidArgument(_))
        );
        assert_matches!(WeightSet::new(vec![]), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_reject_repeated_names() {
        let result = WeightSet::new(vec![("a".to_owned(), 1.0), ("a".to_owned(), 2.0)]);

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_parse_weight_entries() {
        assert_eq!(
            "price = 0.8".parse::<WeightEntry>(),
            Ok(WeightEntry("price".to_owned(), 0.8))
        );
        assert_matches!("price".parse::<WeightEntry>(), Err(CoreError::InvalidArgument(_)));
        assert_matches!("=1".parse::<WeightEntry>(), Err(CoreError::InvalidArgument(_)));
        assert_matches!("price=high".parse::<WeightEntry>(), Err(CoreError::InvalidArgument(_)));
    }
}
