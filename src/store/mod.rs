mod distance_store;
mod similarity_store;
mod store_types;

pub use distance_store::DistanceStore;
pub use similarity_store::SimilarityStore;
pub use store_types::{CoreError, DistanceLookup, LabeledTable, Matrix, SimilarityLookup};

#[cfg(test)]
pub use similarity_store::NamedMatrix;
