#[macro_use]
extern crate clap;
use clap::{App, AppSettings, Arg, ArgGroup, ArgMatches, SubCommand};

extern crate failure;
use failure::Error;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

use log::{debug, error, info, warn};
use simplelog;
use std::path::Path;

mod artifact_utils;
mod artifacts;
mod cli_utils;
mod engine;
mod report_writer;
mod store;

use chrono::offset::Local;

use engine::{price_range, ProximityQuery, Recommender, DEFAULT_PRICE_MARGIN};
use report_writer::{NameRow, NearbyRow, OutputFormat, PriceRow, RecommendationRow};
use store::{DistanceStore, SimilarityStore};

const DEFAULT_BUNDLE_FILE: &str = "artifacts.idx.bin";

fn main() {
    let matches = build_cli().get_matches();

    let verbosity = matches.occurrences_of("verbose").max(
        matches
            .subcommand()
            .1
            .map(|m| m.occurrences_of("verbose"))
            .unwrap_or(0),
    );
    let level = match verbosity {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };

    let local_time = Local::now();
    let time_offset = local_time.offset();
    // Configure logging
    simplelog::TermLogger::init(
        level,
        simplelog::Config {
            offset: *time_offset,
            ..simplelog::Config::default()
        },
        simplelog::TerminalMode::Stderr,
    )
    .ok();

    match do_main(&matches) {
        Ok(_) => info!("Process finished OK"),
        Err(err) => {
            error!("Process finished with an error: {}", err);
            std::process::exit(1);
        }
    };
}

fn index_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("index")
        .short("x")
        .long("index")
        .help("Bundle created with generate_index.")
        .takes_value(true)
}

fn similarity_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("similarity")
        .short("s")
        .long("similarity")
        .help("Similarity matrix CSV as name=path. A bare path is named after its file.")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1)
}

fn locations_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("locations")
        .short("l")
        .long("locations")
        .help("Distance CSV in meters: one row per property, one column per location.")
        .takes_value(true)
}

fn output_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("output")
        .short("o")
        .long("output")
        .help("Sets the output file to create. If omitted, stdout will be used.")
        .takes_value(true)
}

fn format_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("format")
        .long("format")
        .help("Output format.")
        .takes_value(true)
        .possible_values(&["csv", "json"])
        .default_value("csv")
}

fn build_cli<'a, 'b>() -> App<'a, 'b> {
    App::new("apartment_recommender")
        .version("0.1.0")
        .author("Gustavo Ajzenman")
        .about("Similar apartments, nearby apartments and price bands from precomputed artifacts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .global(true)
            .help("More logging. Repeat for trace output.")
        )
        .subcommand(
            SubCommand::with_name("generate_index")
                .about("Pack similarity and distance CSVs into one bundle")
                .arg(Arg::with_name("output")
                    .short("o")
                    .help("Output path or file for the generated bundle")
                    .takes_value(true)
                    .default_value(".")
                )
                .arg(Arg::with_name("force")
                    .short("f")
                    .long("force")
                    .help("Overwrite an existing bundle")
                    .takes_value(false)
                )
                .arg(similarity_arg().required(true))
                .arg(locations_arg().required(true))
        )
        .subcommand(
            SubCommand::with_name("recommend")
                .about("Apartments most similar to a given one")
                .group(ArgGroup::with_name("artifacts")
                    .args(&["index", "similarity"])
                    .required(true))
                .arg(index_arg())
                .arg(similarity_arg())
                .arg(Arg::with_name("property")
                    .short("p")
                    .long("property")
                    .help("Apartment to find neighbors for.")
                    .takes_value(true)
                    .required(true)
                )
                .arg(Arg::with_name("top-n")
                    .short("n")
                    .long("top-n")
                    .help("Number of recommendations.")
                    .takes_value(true)
                    .default_value("5")
                )
                .arg(Arg::with_name("weight")
                    .short("w")
                    .long("weight")
                    .help("Weight of a similarity matrix as name=value. Defaults to cosine_sim1=0.5 cosine_sim2=0.8 cosine_sim3=1.")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1)
                )
                .arg(output_arg())
                .arg(format_arg())
        )
        .subcommand(
            SubCommand::with_name("nearby")
                .about("Apartments within a radius of a location")
                .group(ArgGroup::with_name("artifacts")
                    .args(&["index", "locations"])
                    .required(true))
                .arg(index_arg())
                .arg(locations_arg())
                .arg(Arg::with_name("anchor")
                    .short("a")
                    .long("anchor")
                    .help("Location to search around.")
                    .takes_value(true)
                    .required(true)
                )
                .arg(Arg::with_name("radius")
                    .short("r")
                    .long("radius")
                    .help("Radius in kilometers.")
                    .takes_value(true)
                    .default_value("5")
                )
                .arg(output_arg())
                .arg(format_arg())
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Sorted apartment names, or location names with --anchors")
                .group(ArgGroup::with_name("artifacts")
                    .args(&["index", "locations"])
                    .required(true))
                .arg(index_arg())
                .arg(locations_arg())
                .arg(Arg::with_name("anchors")
                    .long("anchors")
                    .help("List locations instead of apartments.")
                )
                .arg(output_arg())
                .arg(format_arg())
        )
        .subcommand(
            SubCommand::with_name("price_range")
                .about("Price band around a predicted log1p price")
                .arg(Arg::with_name("log-price")
                    .long("log-price")
                    .help("Output of the price pipeline.")
                    .takes_value(true)
                    .allow_hyphen_values(true)
                    .required(true)
                )
                .arg(Arg::with_name("margin")
                    .long("margin")
                    .help("Fraction added and removed around the price. Defaults to 0.10.")
                    .takes_value(true)
                )
                .arg(output_arg())
                .arg(format_arg())
        )
}

fn create_bundle_command<P: AsRef<Path>>(
    dest_path: P,
    tables: &[(String, std::path::PathBuf)],
    locations_path: P,
    force: bool,
) -> Result<(), Error> {
    let dest_file_buffer = if dest_path.as_ref().is_dir() {
        dest_path.as_ref().join(DEFAULT_BUNDLE_FILE)
    } else {
        dest_path.as_ref().to_path_buf()
    };
    let dest_file: &Path = dest_file_buffer.as_path();

    if dest_file.exists() && !force {
        warn!(
            "Bundle exists in {}. Skipping. Use --force to overwrite",
            dest_file.display()
        );
        return Ok(());
    }

    info!("Generating bundle into {} ...", dest_file.display());

    let bundle = artifact_utils::create_bundle(tables, locations_path.as_ref())?;

    info!("Saving bundle into {}", dest_file.display());
    artifact_utils::save_bundle(&bundle, dest_file)?;

    Ok(())
}

fn load_similarity(matches: &ArgMatches) -> Result<SimilarityStore, Error> {
    if let Some(index) = matches.value_of("index") {
        return Ok(artifact_utils::load_bundle(Path::new(index))?.similarity);
    }
    let tables = cli_utils::parse_named_paths(matches.values_of("similarity").unwrap_or_default())?;
    Ok(artifact_utils::load_similarity_store(&tables)?)
}

fn load_distances(matches: &ArgMatches) -> Result<DistanceStore, Error> {
    if let Some(index) = matches.value_of("index") {
        return Ok(artifact_utils::load_bundle(Path::new(index))?.distances);
    }
    let locations = matches.value_of("locations").unwrap_or_default();
    Ok(artifact_utils::load_distance_store(Path::new(locations))?)
}

fn write_report<T: serde::Serialize>(matches: &ArgMatches, rows: &[T]) -> Result<(), Error> {
    let format: OutputFormat = matches.value_of("format").unwrap_or("csv").parse()?;
    let mut output = cli_utils::open_output(matches.value_of("output"))?;
    report_writer::write_rows(output.as_mut(), rows, format)?;
    Ok(())
}

fn recommend_command(matches: &ArgMatches) -> Result<(), Error> {
    let store = load_similarity(matches)?;
    let weights = cli_utils::parse_weights(matches.values_of("weight").unwrap_or_default())?;
    let recommender = Recommender::new(&store, weights)?;
    debug!(
        "{} properties, matrices {:?}, weights {:?}",
        store.len(),
        store.matrix_names().collect::<Vec<_>>(),
        recommender.weights()
    );

    let property = matches.value_of("property").unwrap_or_default();
    let top_n = value_t!(matches, "top-n", usize)?;

    let result = recommender.recommend(property, top_n)?;
    if result.is_empty() {
        warn!("No similar properties found for '{}'.", property);
    } else {
        info!("Top {} recommendations for '{}':", result.len(), property);
    }

    let rows: Vec<RecommendationRow> = result.iter().map(RecommendationRow::from).collect();
    write_report(matches, &rows)
}

fn nearby_command(matches: &ArgMatches) -> Result<(), Error> {
    let store = load_distances(matches)?;

    let anchor = matches.value_of("anchor").unwrap_or_default();
    let radius_km = value_t!(matches, "radius", f64)?;

    let result = ProximityQuery::new(&store).within_radius(anchor, radius_km * 1000.0)?;
    if result.is_empty() {
        warn!(
            "No properties found within {} km of {}. Try increasing the radius or choosing another location.",
            radius_km, anchor
        );
    } else {
        info!(
            "Found {} properties within {} km of {}:",
            result.len(),
            radius_km,
            anchor
        );
    }

    let rows: Vec<NearbyRow> = result.iter().map(NearbyRow::from).collect();
    write_report(matches, &rows)
}

fn list_command(matches: &ArgMatches) -> Result<(), Error> {
    let store = load_distances(matches)?;

    let mut names: Vec<&str> = if matches.is_present("anchors") {
        store.anchors().iter().map(String::as_str).collect()
    } else {
        store.properties().iter().map(String::as_str).collect()
    };
    names.sort();

    let rows: Vec<NameRow> = names.into_iter().map(|name| NameRow { name }).collect();
    write_report(matches, &rows)
}

fn price_range_command(matches: &ArgMatches) -> Result<(), Error> {
    let log_price = value_t!(matches, "log-price", f64)?;
    let margin = if matches.is_present("margin") {
        value_t!(matches, "margin", f64)?
    } else {
        DEFAULT_PRICE_MARGIN
    };

    let range = price_range(log_price, margin)?;
    let row = PriceRow::from(&range);
    info!(
        "The price of the property is between {:.2} Cr and {:.2} Cr",
        row.low, row.high
    );

    write_report(matches, &[row])
}

fn do_main(matches: &ArgMatches) -> Result<(), Error> {
    match matches.subcommand() {
        ("generate_index", Some(generate_matches)) => {
            let tables = cli_utils::parse_named_paths(
                generate_matches.values_of("similarity").unwrap_or_default(),
            )?;
            create_bundle_command(
                generate_matches.value_of("output").unwrap_or_default(),
                &tables,
                generate_matches.value_of("locations").unwrap_or_default(),
                generate_matches.is_present("force"),
            )
        }
        ("recommend", Some(run_matches)) => recommend_command(run_matches),
        ("nearby", Some(run_matches)) => nearby_command(run_matches),
        ("list", Some(run_matches)) => list_command(run_matches),
        ("price_range", Some(run_matches)) => price_range_command(run_matches),
        _ => Ok(()),
    }
}
