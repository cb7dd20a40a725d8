use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde;

use super::artifacts::{read_labeled_table, ArtifactLoadError};
use super::cli_utils;
use super::store::{CoreError, DistanceStore, LabeledTable, SimilarityLookup, SimilarityStore};

/**
 * Both stores, packed together so they can be saved once and reloaded at startup.
 */
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BundleParts")]
pub struct ArtifactBundle {
    pub similarity: SimilarityStore,
    pub distances: DistanceStore,
}

#[derive(serde::Deserialize)]
struct BundleParts {
    similarity: SimilarityStore,
    distances: DistanceStore,
}

impl TryFrom<BundleParts> for ArtifactBundle {
    type Error = CoreError;

    fn try_from(parts: BundleParts) -> Result<ArtifactBundle, CoreError> {
        ArtifactBundle::new(parts.similarity, parts.distances)
    }
}

impl ArtifactBundle {
    /// The distance table must list exactly the similarity identifiers, in the same order.
    pub fn new(similarity: SimilarityStore, distances: DistanceStore) -> Result<ArtifactBundle, CoreError> {
        if distances.properties() != similarity.identifiers() {
            return Err(CoreError::IdentifierMismatch {
                name: "distances".to_owned(),
                reason: "property names differ from the similarity identifiers".to_owned(),
            });
        }
        Ok(ArtifactBundle {
            similarity,
            distances,
        })
    }
}

pub fn read_table_file(name: &str, path: &Path) -> Result<LabeledTable, ArtifactLoadError> {
    info!("Reading '{}' from {} ...", name, path.display());

    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let progress_bar = cli_utils::create_progress_bar_bytes(false, name, Some(file_size));

    let table = read_labeled_table(name, io::BufReader::new(file), &progress_bar);

    progress_bar.finish_and_clear();
    table
}

/// `tables` pairs each matrix name with the CSV file holding it.
pub fn load_similarity_store(tables: &[(String, PathBuf)]) -> Result<SimilarityStore, ArtifactLoadError> {
    let mut labeled = Vec::with_capacity(tables.len());
    for (name, path) in tables {
        labeled.push((name.clone(), read_table_file(name, path)?));
    }
    Ok(SimilarityStore::load_labeled(labeled)?)
}

pub fn load_distance_store(path: &Path) -> Result<DistanceStore, ArtifactLoadError> {
    let table = read_table_file("distances", path)?;
    Ok(DistanceStore::from_property_table(table)?)
}

pub fn create_bundle(
    tables: &[(String, PathBuf)],
    distances_path: &Path,
) -> Result<ArtifactBundle, ArtifactLoadError> {
    let similarity = load_similarity_store(tables)?;
    let distances = load_distance_store(distances_path)?;
    Ok(ArtifactBundle::new(similarity, distances)?)
}

pub fn write_bundle<W: io::Write>(bundle: &ArtifactBundle, output: W) -> Result<(), ArtifactLoadError> {
    bincode::serialize_into(output, bundle)?;
    Ok(())
}

pub fn read_bundle<R: io::Read>(input: R) -> Result<ArtifactBundle, ArtifactLoadError> {
    Ok(bincode::deserialize_from(input)?)
}

pub fn save_bundle(bundle: &ArtifactBundle, output_file: &Path) -> Result<(), ArtifactLoadError> {
    let mut buf_writer = io::BufWriter::new(File::create(output_file)?);
    write_bundle(bundle, &mut buf_writer)?;
    buf_writer.flush()?;
    Ok(())
}

pub fn load_bundle(input_path: &Path) -> Result<ArtifactBundle, ArtifactLoadError> {
    let progress_bar = cli_utils::create_progress_bar_count(false, "Loading bundle...", None);
    progress_bar.enable_steady_tick(200);

    let file_reader = File::open(input_path)?;
    let result = read_bundle(io::BufReader::new(file_reader));

    progress_bar.finish_and_clear();
    result
}
