mod table_reader;

pub use table_reader::{read_labeled_table, ArtifactLoadError};
