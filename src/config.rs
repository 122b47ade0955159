use std::collections::BTreeMap;

pub const MB: &str = "MiB";
pub const GB: &str = "GiB";

// column names once the header is compacted
pub const NAME_HDR: &str = "NAME";
pub const CPU_HDR: &str = "CPU%";
pub const MEM_HDR: &str = "MEMUSAGE/LIMIT";

// column names of the cleaned csv
pub const MEM_USAGE_HDR: &str = "MEM USAGE (MiB)";
pub const MEM_LIMIT_HDR: &str = "MEM LIMIT (MiB)";

/// Parameters of a cleaning and plotting run.
/// Built once by the caller and passed down, nothing is read from globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Substring that marks a line as a (repeated) header.
    pub header_marker: String,
    /// Multiplier to MB for each 3-character unit suffix.
    /// Suffixes that are not listed are left unscaled.
    pub unit_multipliers: BTreeMap<String, f64>,
    /// Directory, relative to the working directory, for all the outputs.
    pub results_dir: String,
    /// Inserted between the input file stem and its extension.
    pub clean_suffix: String,
    /// Time between two snapshots, scales the sample index on the x axis.
    pub poll_interval: chrono::Duration,
}

impl Default for Config {
    fn default() -> Config {
        let mut unit_multipliers = BTreeMap::new();
        unit_multipliers.insert(MB.to_string(), 1.);
        unit_multipliers.insert(GB.to_string(), 1000.);
        Config {
            header_marker: String::from("CONTAINER"),
            unit_multipliers,
            results_dir: String::from("results"),
            clean_suffix: String::from("_clean"),
            poll_interval: chrono::Duration::seconds(1),
        }
    }
}

impl Config {
    pub fn unit_multiplier(&self, unit: &str) -> f64 {
        self.unit_multipliers.get(unit).copied().unwrap_or(1.)
    }

    /// Seconds between two samples, as used for the x axis.
    pub fn poll_seconds(&self) -> f64 {
        self.poll_interval.num_milliseconds() as f64 / 1000.
    }
}
