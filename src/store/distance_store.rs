use log::info;
use serde;

use std::collections::HashMap;
use std::convert::TryFrom;

use super::store_types::{
    index_labels, CoreError, DistanceColumn, DistanceLookup, LabeledTable, Matrix,
};

/**
 * Distance in meters from every anchor to every property. Rows are anchors, columns are
 * properties.
 */
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "DistanceStoreParts")]
pub struct DistanceStore {
    anchors: Vec<String>,
    properties: Vec<String>,
    distances: Matrix,
    #[serde(skip)]
    anchor_positions: HashMap<String, usize>,
}

#[derive(serde::Deserialize)]
struct DistanceStoreParts {
    anchors: Vec<String>,
    properties: Vec<String>,
    distances: Matrix,
}

impl TryFrom<DistanceStoreParts> for DistanceStore {
    type Error = CoreError;

    fn try_from(parts: DistanceStoreParts) -> Result<DistanceStore, CoreError> {
        DistanceStore::load(parts.distances, parts.anchors, parts.properties)
    }
}

impl DistanceStore {
    pub fn load(
        distances: Matrix,
        anchors: Vec<String>,
        properties: Vec<String>,
    ) -> Result<DistanceStore, CoreError> {
        let expected = (anchors.len(), properties.len());
        if distances.shape() != expected {
            return Err(CoreError::ShapeMismatch {
                name: "distances".to_owned(),
                expected,
                found: distances.shape(),
            });
        }

        let anchor_positions = index_labels("anchors", &anchors)?;
        index_labels("properties", &properties)?;

        if let Some((row, col, value)) = distances.find_cell(|v| v.is_finite() && v >= 0.0) {
            return Err(CoreError::InvalidArgument(format!(
                "distance from '{}' to '{}' is {}",
                anchors[row], properties[col], value
            )));
        }

        info!(
            "Distance store loaded: {} anchors, {} properties",
            anchors.len(),
            properties.len()
        );

        Ok(DistanceStore {
            anchors,
            properties,
            distances,
            anchor_positions,
        })
    }

    /**
     * Builds the store from a table with one row per property and one column per anchor.
     */
    pub fn from_property_table(table: LabeledTable) -> Result<DistanceStore, CoreError> {
        DistanceStore::load(table.values.transpose(), table.col_labels, table.row_labels)
    }

    pub fn anchors(&self) -> &[String] {
        &self.anchors
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }
}

impl DistanceLookup for DistanceStore {
    fn column(&self, anchor: &str) -> Result<DistanceColumn, CoreError> {
        let position = self
            .anchor_positions
            .get(anchor)
            .ok_or_else(|| CoreError::UnknownAnchor(anchor.to_owned()))?;

        Ok(DistanceColumn::new(&self.properties, self.distances.row(*position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    fn sample_store() -> DistanceStore {
        let distances = Matrix::from_rows(
            "distances",
            3,
            vec![vec![500.0, 4500.0, 12000.0], vec![100.0, 0.0, 50.0]],
        )
        .unwrap();
        DistanceStore::load(distances, names(&["X", "Y"]), names(&["P1", "P2", "P3"])).unwrap()
    }

    #[test]
    fn it_should_return_the_column_of_an_anchor() {
        let store = sample_store();

        let column = store.column("X").unwrap();

        assert_eq!(
            column.iter().collect::<Vec<_>>(),
            vec![("P1", 500.0), ("P2", 4500.0), ("P3", 12000.0)]
        );
        assert_eq!(store.column("Y").unwrap().get("P2"), Some(0.0));
    }

    #[test]
    fn it_should_fail_with_an_unknown_anchor() {
        let store = sample_store();

        assert_matches!(store.column("Nowhere"), Err(CoreError::UnknownAnchor(ref a)) if a == "Nowhere");
    }

    #[test]
    fn it_should_fail_when_shape_disagrees_with_names() {
        let distances = Matrix::from_rows("distances", 2, vec![vec![1.0, 2.0]]).unwrap();

        let result = DistanceStore::load(distances, names(&["X"]), names(&["P1", "P2", "P3"]));

        assert_matches!(
            result,
            Err(CoreError::ShapeMismatch { expected: (1, 3), found: (1, 2), .. })
        );
    }

    #[test]
    fn it_should_fail_with_negative_distances() {
        let distances = Matrix::from_rows("distances", 2, vec![vec![1.0, -2.0]]).unwrap();

        let result = DistanceStore::load(distances, names(&["X"]), names(&["P1", "P2"]));

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_fail_with_duplicated_anchors() {
        let distances = Matrix::from_rows("distances", 1, vec![vec![1.0], vec![2.0]]).unwrap();

        let result = DistanceStore::load(distances, names(&["X", "X"]), names(&["P1"]));

        assert_matches!(result, Err(CoreError::IdentifierMismatch { .. }));
    }

    #[test]
    fn it_should_transpose_a_property_table() {
        let table = LabeledTable {
            row_labels: names(&["P1", "P2", "P3"]),
            col_labels: names(&["X", "Y"]),
            values: Matrix::from_rows(
                "t",
                2,
                vec![vec![500.0, 100.0], vec![4500.0, 0.0], vec![12000.0, 50.0]],
            )
            .unwrap(),
        };

        let store = DistanceStore::from_property_table(table).unwrap();

        assert_eq!(store.anchors(), &names(&["X", "Y"])[..]);
        assert_eq!(store.properties(), &names(&["P1", "P2", "P3"])[..]);
        assert_eq!(store.column("Y").unwrap().get("P3"), Some(50.0));
    }

    #[test]
    fn it_should_load_a_property_table_without_properties() {
        let table = LabeledTable {
            row_labels: vec![],
            col_labels: names(&["X", "Y"]),
            values: Matrix::from_rows("t", 2, vec![]).unwrap(),
        };

        let store = DistanceStore::from_property_table(table).unwrap();

        assert_eq!(store.anchors(), &names(&["X", "Y"])[..]);
        assert!(store.properties().is_empty());
        assert!(store.column("Y").unwrap().is_empty());
    }
}
