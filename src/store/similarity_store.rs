use log::{debug, info};
use serde;

use std::collections::HashMap;
use std::convert::TryFrom;

use super::store_types::{index_labels, CoreError, LabeledTable, Matrix, SimilarityLookup};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NamedMatrix {
    pub name: String,
    pub matrix: Matrix,
}

/**
 * Square similarity matrices sharing one identifier axis. Immutable once loaded.
 */
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SimilarityStoreParts")]
pub struct SimilarityStore {
    identifiers: Vec<String>,
    matrices: Vec<NamedMatrix>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

#[derive(serde::Deserialize)]
struct SimilarityStoreParts {
    identifiers: Vec<String>,
    matrices: Vec<NamedMatrix>,
}

impl TryFrom<SimilarityStoreParts> for SimilarityStore {
    type Error = CoreError;

    fn try_from(parts: SimilarityStoreParts) -> Result<SimilarityStore, CoreError> {
        SimilarityStore::load(parts.matrices, parts.identifiers)
    }
}

impl SimilarityStore {
    pub fn load(matrices: Vec<NamedMatrix>, identifiers: Vec<String>) -> Result<SimilarityStore, CoreError> {
        if matrices.is_empty() {
            return Err(CoreError::InvalidArgument(
                "at least one similarity matrix is required".to_owned(),
            ));
        }

        let positions = index_labels("identifiers", &identifiers)?;
        let size = identifiers.len();

        for (idx, named) in matrices.iter().enumerate() {
            if matrices[..idx].iter().any(|m| m.name == named.name) {
                return Err(CoreError::InvalidArgument(format!(
                    "similarity matrix '{}' given twice",
                    named.name
                )));
            }

            if named.matrix.shape() != (size, size) {
                return Err(CoreError::ShapeMismatch {
                    name: named.name.clone(),
                    expected: (size, size),
                    found: named.matrix.shape(),
                });
            }

            if let Some((row, col, value)) = named.matrix.find_cell(|v| v.is_finite()) {
                return Err(CoreError::InvalidArgument(format!(
                    "similarity matrix '{}' has non-finite value {} at ({}, {})",
                    named.name, value, row, col
                )));
            }

            debug!("Similarity matrix '{}' accepted ({}x{})", named.name, size, size);
        }

        info!(
            "Similarity store loaded: {} matrices over {} properties",
            matrices.len(),
            size
        );

        Ok(SimilarityStore {
            identifiers,
            matrices,
            positions,
        })
    }

    /**
     * Loads tables that carry their own labels. Every table must be labeled with the same
     * identifiers, in the same order, on both axes.
     */
    pub fn load_labeled(tables: Vec<(String, LabeledTable)>) -> Result<SimilarityStore, CoreError> {
        let identifiers = match tables.first() {
            Some((_, table)) => table.row_labels.clone(),
            None => {
                return Err(CoreError::InvalidArgument(
                    "at least one similarity matrix is required".to_owned(),
                ))
            }
        };

        let mut matrices = Vec::with_capacity(tables.len());
        for (name, table) in tables {
            if table.row_labels != table.col_labels {
                return Err(CoreError::IdentifierMismatch {
                    name,
                    reason: "row and column labels differ".to_owned(),
                });
            }
            if table.row_labels != identifiers {
                return Err(CoreError::IdentifierMismatch {
                    name,
                    reason: "labels differ from the first similarity matrix".to_owned(),
                });
            }
            matrices.push(NamedMatrix {
                name,
                matrix: table.values,
            });
        }

        SimilarityStore::load(matrices, identifiers)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn matrix_names(&self) -> impl Iterator<Item = &str> {
        self.matrices.iter().map(|m| m.name.as_str())
    }

    #[inline]
    pub fn row(&self, name: &str, position: usize) -> Option<&[f64]> {
        if position >= self.identifiers.len() {
            return None;
        }
        self.matrices
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.matrix.row(position))
    }
}

impl SimilarityLookup for SimilarityStore {
    fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    fn index_of(&self, identifier: &str) -> Result<usize, CoreError> {
        self.positions
            .get(identifier)
            .cloned()
            .ok_or_else(|| CoreError::UnknownProperty(identifier.to_owned()))
    }

    fn has_matrix(&self, name: &str) -> bool {
        self.matrices.iter().any(|m| m.name == name)
    }

    fn similarity_row(&self, name: &str, position: usize) -> Option<&[f64]> {
        self.row(name, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    fn named(name: &str, rows: Vec<Vec<f64>>) -> NamedMatrix {
        let size = rows.len();
        NamedMatrix {
            name: name.to_owned(),
            matrix: Matrix::from_rows(name, size, rows).unwrap(),
        }
    }

    fn identity3(name: &str) -> NamedMatrix {
        named(
            name,
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
        )
    }

    #[test]
    fn it_should_load_square_matrices() {
        let store = SimilarityStore::load(
            vec![identity3("s1"), identity3("s2")],
            ids(&["A", "B", "C"]),
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.matrix_names().collect::<Vec<_>>(), vec!["s1", "s2"]);
        assert_eq!(store.index_of("C"), Ok(2));
        assert_eq!(store.row("s2", 1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(store.row("s3", 1), None);
        assert_eq!(store.row("s1", 3), None);
    }

    #[test]
    fn it_should_fail_with_an_unknown_property() {
        let store = SimilarityStore::load(vec![identity3("s1")], ids(&["A", "B", "C"])).unwrap();

        assert_eq!(store.index_of("Z"), Err(CoreError::UnknownProperty("Z".to_owned())));
    }

    #[test]
    fn it_should_fail_when_shape_disagrees_with_identifiers() {
        let result = SimilarityStore::load(vec![identity3("s1")], ids(&["A", "B"]));

        assert_matches!(
            result,
            Err(CoreError::ShapeMismatch { expected: (2, 2), found: (3, 3), .. })
        );
    }

    #[test]
    fn it_should_fail_with_a_rectangular_matrix() {
        let rect = named("rect", vec![vec![1.0, 0.5, 0.2], vec![0.5, 1.0, 0.1]]);
        let result = SimilarityStore::load(vec![rect], ids(&["A", "B"]));

        assert_matches!(result, Err(CoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn it_should_fail_without_matrices() {
        let result = SimilarityStore::load(vec![], ids(&["A"]));

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_fail_with_repeated_matrix_names() {
        let result = SimilarityStore::load(vec![identity3("s1"), identity3("s1")], ids(&["A", "B", "C"]));

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_fail_with_duplicated_identifiers() {
        let result = SimilarityStore::load(vec![identity3("s1")], ids(&["A", "B", "A"]));

        assert_matches!(result, Err(CoreError::IdentifierMismatch { .. }));
    }

    #[test]
    fn it_should_fail_with_non_finite_values() {
        let bad = named("bad", vec![vec![1.0, std::f64::NAN], vec![0.0, 1.0]]);
        let result = SimilarityStore::load(vec![bad], ids(&["A", "B"]));

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    fn labeled(rows: &[&str], cols: &[&str]) -> LabeledTable {
        LabeledTable {
            row_labels: ids(rows),
            col_labels: ids(cols),
            values: identity3("t").matrix,
        }
    }

    #[test]
    fn it_should_load_labeled_tables() {
        let store = SimilarityStore::load_labeled(vec![
            ("s1".to_owned(), labeled(&["A", "B", "C"], &["A", "B", "C"])),
            ("s2".to_owned(), labeled(&["A", "B", "C"], &["A", "B", "C"])),
        ])
        .unwrap();

        assert_eq!(store.identifiers(), &ids(&["A", "B", "C"])[..]);
        assert!(store.has_matrix("s2"));
    }

    #[test]
    fn it_should_fail_when_labels_differ_across_tables() {
        let result = SimilarityStore::load_labeled(vec![
            ("s1".to_owned(), labeled(&["A", "B", "C"], &["A", "B", "C"])),
            ("s2".to_owned(), labeled(&["A", "C", "B"], &["A", "C", "B"])),
        ]);

        assert_matches!(
            result,
            Err(CoreError::IdentifierMismatch { ref name, .. }) if name == "s2"
        );
    }

    #[test]
    fn it_should_fail_when_row_and_column_labels_differ() {
        let result = SimilarityStore::load_labeled(vec![(
            "s1".to_owned(),
            labeled(&["A", "B", "C"], &["A", "B", "D"]),
        )]);

        assert_matches!(result, Err(CoreError::IdentifierMismatch { .. }));
    }
}
