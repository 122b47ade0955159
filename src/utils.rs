use crate::config::Config;
use crate::error::{Error, Result};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create, if missing, the results directory under base_dir and return its path.
pub fn create_results_path(base_dir: &Path, config: &Config) -> Result<PathBuf> {
    let results_path = base_dir.join(&config.results_dir);
    if !results_path.exists() {
        debug!("creating results directory {}", results_path.display());
    }
    std::fs::create_dir_all(&results_path).map_err(Error::io(&results_path))?;
    Ok(results_path)
}

/// Name of the cleaned file, the suffix goes between stem and extension:
/// "stats.txt" -> "stats_clean.txt".
pub fn clean_file_name(fin: &Path, config: &Config) -> String {
    let stem = fin
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match fin.extension() {
        Some(ext) => format!("{}{}.{}", stem, config.clean_suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, config.clean_suffix),
    }
}

pub fn min_and_max<'a, I, T>(mut s: I) -> Option<(T, T)>
where
    I: Iterator<Item = &'a T>,
    T: 'a + std::cmp::PartialOrd + Clone,
{
    let (mut min, mut max) = match s.next() {
        Some(v) => (v, v),
        None => return None,
    };
    for es in s {
        if es > max {
            max = es
        } else if es < min {
            min = es
        }
    }
    Some((min.clone(), max.clone()))
}

/// Format a float the way the cleaned csv writes it:
/// whole numbers keep one decimal ("2014.0"), NaN is left empty.
pub fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_finite() && v.fract() == 0. {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Axis range with a tenth of the span added on each side,
/// one unit when all the values are equal.
pub fn padded_range(min: f64, max: f64) -> Range<f64> {
    let span = (max - min) / 10f64;
    let pad = if span > 0. { span } else { 1. };
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_keeps_extension() {
        let config = Config::default();
        assert_eq!(
            clean_file_name(Path::new("/tmp/data/stats.txt"), &config),
            "stats_clean.txt"
        );
        assert_eq!(clean_file_name(Path::new("stats"), &config), "stats_clean");
        assert_eq!(
            clean_file_name(Path::new("run.2024.log"), &config),
            "run.2024_clean.log"
        );
    }

    #[test]
    fn results_path_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let first = create_results_path(dir.path(), &config).unwrap();
        let second = create_results_path(dir.path(), &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("results"));
        assert!(first.is_dir());
    }

    #[test]
    fn min_max_of_values() {
        let v = vec![3., -1., 7., 2.];
        assert_eq!(min_and_max(v.iter()), Some((-1., 7.)));
        let empty: Vec<f64> = Vec::new();
        assert_eq!(min_and_max(empty.iter()), None);
    }

    #[test]
    fn whole_numbers_keep_a_decimal() {
        assert_eq!(fmt_float(2014.), "2014.0");
        assert_eq!(fmt_float(0.), "0.0");
        assert_eq!(fmt_float(15650.), "15650.0");
        assert_eq!(fmt_float(1.551), "1.551");
        assert_eq!(fmt_float(149.33), "149.33");
        assert_eq!(fmt_float(f64::NAN), "");
    }

    #[test]
    fn flat_range_is_padded() {
        assert_eq!(padded_range(5., 5.), 4.0..6.0);
        assert_eq!(padded_range(0., 10.), -1.0..11.0);
    }
}
