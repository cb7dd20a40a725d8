use indicatif::{ProgressBar, ProgressStyle};

use std::io;
use std::path::PathBuf;

use super::engine::{WeightEntry, WeightSet};
use super::store::CoreError;

fn create_progress_bar_template(
    quiet_mode: bool,
    msg: &str,
    length: Option<u64>,
    template_progress: &str,
    template_spinner: &str,
) -> ProgressBar {
    let bar = match (quiet_mode, length) {
        (true, _) => ProgressBar::hidden(),
        (false, Some(len)) => ProgressBar::new(len),
        (false, None) => ProgressBar::new_spinner(),
    };

    bar.set_message(msg);
    if length.is_some() {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(template_progress)
                .progress_chars("=> "),
        );
    } else {
        bar.set_style(ProgressStyle::default_spinner().template(template_spinner));
    }

    bar.inc(0); // Draw before the next log line.

    bar
}

pub fn create_progress_bar_bytes(quiet_mode: bool, msg: &str, length: Option<u64>) -> ProgressBar {
    create_progress_bar_template(
        quiet_mode,
        msg,
        length,
        "[{elapsed_precise}] {msg} {spinner:.green} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} eta: {eta}",
        "[{elapsed_precise}] {msg} {spinner:.green}",
    )
}

pub fn create_progress_bar_count(quiet_mode: bool, msg: &str, length: Option<u64>) -> ProgressBar {
    create_progress_bar_template(
        quiet_mode,
        msg,
        length,
        "[{elapsed_precise}] {msg} {spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} eta: {eta}",
        "[{elapsed_precise}] {msg} {spinner:.green}",
    )
}

/**
 * Splits `name=path` arguments. A bare path is named after its file stem.
 */
pub fn parse_named_paths<'a, I: Iterator<Item = &'a str>>(
    values: I,
) -> Result<Vec<(String, PathBuf)>, CoreError> {
    values
        .map(|value| match value.find('=') {
            Some(idx) if idx > 0 => Ok((value[..idx].to_owned(), PathBuf::from(&value[idx + 1..]))),
            Some(_) => Err(CoreError::InvalidArgument(format!(
                "expected name=path, got '{}'",
                value
            ))),
            None => {
                let path = PathBuf::from(value);
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .ok_or_else(|| CoreError::InvalidArgument(format!("no file name in '{}'", value)))?;
                Ok((name, path))
            }
        })
        .collect()
}

/// No entries means the default blend.
pub fn parse_weights<'a, I: Iterator<Item = &'a str>>(values: I) -> Result<WeightSet, CoreError> {
    let entries = values
        .map(|v| v.parse::<WeightEntry>().map(|WeightEntry(name, w)| (name, w)))
        .collect::<Result<Vec<_>, _>>()?;

    if entries.is_empty() {
        Ok(WeightSet::default())
    } else {
        WeightSet::new(entries)
    }
}

pub fn open_output(path: Option<&str>) -> io::Result<Box<dyn io::Write>> {
    match path {
        Some(path) => Ok(Box::new(io::BufWriter::new(std::fs::File::create(path)?))),
        None => Ok(Box::new(io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_parse_named_paths() {
        let parsed = parse_named_paths(
            vec!["cosine_sim1=models/sim_a.csv", "models/cosine_sim3.csv"].into_iter(),
        )
        .unwrap();

        assert_eq!(
            parsed,
            vec![
                ("cosine_sim1".to_owned(), PathBuf::from("models/sim_a.csv")),
                ("cosine_sim3".to_owned(), PathBuf::from("models/cosine_sim3.csv")),
            ]
        );
    }

    #[test]
    fn it_should_reject_a_path_without_name() {
        let result = parse_named_paths(vec!["=models/sim_a.csv"].into_iter());

        assert_matches!(result, Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn it_should_parse_weights_or_fall_back_to_defaults() {
        let weights = parse_weights(vec!["features=0.5", "price=1"].into_iter()).unwrap();
        assert_eq!(weights.iter().collect::<Vec<_>>(), vec![("features", 0.5), ("price", 1.0)]);

        assert_eq!(parse_weights(vec![].into_iter()).unwrap(), WeightSet::default());
        assert_matches!(
            parse_weights(vec!["features=-1"].into_iter()),
            Err(CoreError::InvalidArgument(_))
        );
    }
}
