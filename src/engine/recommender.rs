use log::debug;

use super::engine_types::{Recommendation, RecommendationResult};
use super::weight_set::WeightSet;
use crate::store::{CoreError, SimilarityLookup};

/**
 * Ranks the neighbors of a property by a weighted sum of similarity rows.
 */
pub struct Recommender<'s, S: SimilarityLookup + ?Sized> {
    store: &'s S,
    weights: WeightSet,
}

impl<'s, S: SimilarityLookup + ?Sized> Recommender<'s, S> {
    /// Every weighted matrix must exist in `store`. Matrices without a weight are ignored.
    pub fn new(store: &'s S, weights: WeightSet) -> Result<Recommender<'s, S>, CoreError> {
        for (name, _) in weights.iter() {
            if !store.has_matrix(name) {
                return Err(CoreError::InvalidArgument(format!(
                    "weight given for unknown similarity matrix '{}'",
                    name
                )));
            }
        }
        Ok(Recommender { store, weights })
    }

    pub fn with_weights(self, weights: WeightSet) -> Result<Recommender<'s, S>, CoreError> {
        Recommender::new(self.store, weights)
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /**
     * `combined[j] = sum over m of weight[m] * S_m[query][j]`, in identifier order.
     */
    #[cfg(test)]
    pub fn combined_scores(&self, query_property: &str) -> Result<Vec<f64>, CoreError> {
        let position = self.store.index_of(query_property)?;
        self.combined_row(position)
    }

    fn combined_row(&self, position: usize) -> Result<Vec<f64>, CoreError> {
        let mut combined = vec![0.0; self.store.identifiers().len()];

        for (name, weight) in self.weights.iter() {
            let row = self.store.similarity_row(name, position).ok_or_else(|| {
                CoreError::InvalidArgument(format!("similarity matrix '{}' is not loaded", name))
            })?;
            if row.len() != combined.len() {
                return Err(CoreError::ShapeMismatch {
                    name: name.to_owned(),
                    expected: (combined.len(), combined.len()),
                    found: (combined.len(), row.len()),
                });
            }
            for (acc, value) in combined.iter_mut().zip(row) {
                *acc += weight * value;
            }
        }

        if let Some(idx) = combined.iter().position(|score| !score.is_finite()) {
            return Err(CoreError::InvalidArgument(format!(
                "combined score of '{}' is not finite",
                self.store.identifiers()[idx]
            )));
        }

        Ok(combined)
    }

    pub fn recommend(&self, query_property: &str, top_n: usize) -> Result<RecommendationResult, CoreError> {
        let position = self.store.index_of(query_property)?;

        if top_n == 0 {
            return Err(CoreError::InvalidArgument(
                "top_n must be a positive integer".to_owned(),
            ));
        }

        let combined = self.combined_row(position)?;
        let identifiers = self.store.identifiers();

        let mut candidates: Vec<(usize, f64)> = combined
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| *idx != position)
            .collect();

        candidates.sort_by(|(a_idx, a_score), (b_idx, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| identifiers[*a_idx].cmp(&identifiers[*b_idx]))
        });
        candidates.truncate(top_n);

        debug!(
            "{} recommendations for '{}' (top {})",
            candidates.len(),
            query_property,
            top_n
        );

        Ok(candidates
            .into_iter()
            .map(|(idx, score)| Recommendation {
                property: identifiers[idx].clone(),
                score,
            })
            .collect())
    }
}
