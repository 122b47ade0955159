use crate::config::{CPU_HDR, MEM_LIMIT_HDR, MEM_USAGE_HDR, NAME_HDR};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
pub mod config;
pub mod error;
pub mod normalize;
pub mod plot;
pub mod usage_plot;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// One sample of one container.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    pub container_name: String,
    pub cpu_percent: f64,
    pub mem_usage_mb: f64,
    pub mem_limit_mb: f64,
    /// All the fields of the data line as read, one per table column.
    pub fields: Vec<String>,
}

/// The cleaned resource usage of all the containers.
/// Rows are in polling order, which is the only time information in the data:
/// the n-th row of a container is its n-th sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTable {
    /// Compacted header of the stats file, e.g. "CONTAINERID", "NAME", "CPU%".
    pub columns: Vec<String>,
    pub rows: Vec<UsageRow>,
}

impl UsageTable {
    pub fn new(columns: Vec<String>, capacity: usize) -> UsageTable {
        UsageTable {
            columns,
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Read the appended docker stats snapshots and clean them.
    pub fn from_stats<P>(fin: P, config: &Config) -> Result<UsageTable>
    where
        P: AsRef<Path>,
    {
        let fin = fin.as_ref();
        let file = File::open(fin).map_err(Error::io(fin))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
            .map_err(Error::io(fin))?;
        info!("read {} lines from {}", lines.len(), fin.display());
        normalize::clean_data(&lines, config)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct container names, in order of first appearance.
    pub fn container_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for r in self.rows.iter() {
            if !names.contains(&r.container_name.as_str()) {
                names.push(&r.container_name);
            }
        }
        names
    }

    /// The samples of one container, in their original order.
    pub fn container_rows<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UsageRow> + 'a {
        self.rows.iter().filter(move |r| r.container_name == name)
    }

    /// Write the table to a csv file at the given path:
    /// all the columns of the stats file with CPU% as number,
    /// followed by memory usage and limit in MiB.
    pub fn to_csv<P>(&self, fout: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let fout = fout.as_ref();
        let file = File::create(fout).map_err(Error::io(fout))?;
        let mut buf = BufWriter::new(file);
        self.write_csv(&mut buf)
            .and_then(|_| buf.flush())
            .map_err(Error::io(fout))
    }

    fn write_csv<W: Write>(&self, buf: &mut W) -> std::io::Result<()> {
        let header: Vec<&str> = self
            .columns
            .iter()
            .map(|c| c.as_str())
            .chain([MEM_USAGE_HDR, MEM_LIMIT_HDR])
            .collect();
        writeln!(buf, "{}", header.join(","))?;
        for r in self.rows.iter() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            for (i, column) in self.columns.iter().enumerate() {
                if column == CPU_HDR {
                    record.push(utils::fmt_float(r.cpu_percent));
                } else {
                    record.push(r.fields.get(i).cloned().unwrap_or_default());
                }
            }
            record.push(utils::fmt_float(r.mem_usage_mb));
            record.push(utils::fmt_float(r.mem_limit_mb));
            writeln!(buf, "{}", record.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for UsageTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<30} {:>10} {:>16} {:>16}",
            NAME_HDR, CPU_HDR, MEM_USAGE_HDR, MEM_LIMIT_HDR
        )?;
        for r in self.rows.iter() {
            writeln!(
                f,
                "{:<30} {:>10.2} {:>16.3} {:>16.3}",
                r.container_name, r.cpu_percent, r.mem_usage_mb, r.mem_limit_mb
            )?;
        }
        Ok(())
    }
}

/// Files written by a run.
#[derive(Debug, Clone)]
pub struct Outputs {
    pub clean_csv: PathBuf,
    pub charts: Vec<plot::Chart>,
}

/// Clean the stats file and save the cleaned table and the charts
/// in the results directory under `base_dir`.
/// The cleaning is done before anything is written,
/// a parsing failure leaves no output behind.
pub fn run<P, B>(fin: P, base_dir: B, config: &Config) -> Result<Outputs>
where
    P: AsRef<Path>,
    B: AsRef<Path>,
{
    let fin = fin.as_ref();
    let table = UsageTable::from_stats(fin, config)?;
    info!(
        "cleaned {} samples of {} containers",
        table.len(),
        table.container_names().len()
    );
    let results_path = utils::create_results_path(base_dir.as_ref(), config)?;
    let clean_csv = results_path.join(utils::clean_file_name(fin, config));
    table.to_csv(&clean_csv)?;
    info!("Saved cleaned data to {}", clean_csv.display());
    let charts = plot::plot_data(&table, &results_path, config)?;
    Ok(Outputs { clean_csv, charts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(name: &str, cpu: f64, usage: f64) -> UsageRow {
        UsageRow {
            container_name: name.to_string(),
            cpu_percent: cpu,
            mem_usage_mb: usage,
            mem_limit_mb: 15650.,
            fields: vec![
                format!("id_{}", name),
                name.to_string(),
                format!("{}%", cpu),
                String::from("2.014GiB/15.65GiB"),
            ],
        }
    }

    fn columns() -> Vec<String> {
        ["CONTAINERID", "NAME", "CPU%", "MEMUSAGE/LIMIT"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn container_order_and_rows() {
        let table = UsageTable {
            columns: columns(),
            rows: vec![
                row("b", 1., 10.),
                row("a", 2., 20.),
                row("b", 3., 30.),
                row("a", 4., 40.),
                row("b", 5., 50.),
            ],
        };
        assert_eq!(table.container_names(), vec!["b", "a"]);
        let b: Vec<f64> = table.container_rows("b").map(|r| r.cpu_percent).collect();
        assert_eq!(b, vec![1., 3., 5.]);
        assert_eq!(table.container_rows("c").count(), 0);
    }

    #[test]
    fn csv_keeps_stats_columns() {
        let table = UsageTable {
            columns: columns(),
            rows: vec![row("web", 14.5, 2014.), row("db", 0., 1.551)],
        };
        let mut out: Vec<u8> = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CONTAINERID,NAME,CPU%,MEMUSAGE/LIMIT,MEM USAGE (MiB),MEM LIMIT (MiB)\n\
             id_web,web,14.5,2.014GiB/15.65GiB,2014.0,15650.0\n\
             id_db,db,0.0,2.014GiB/15.65GiB,1.551,15650.0\n"
        );
    }

    #[test]
    fn display_has_one_line_per_row() {
        let table = UsageTable {
            columns: columns(),
            rows: vec![row("web", 14.5, 2014.), row("db", 0., 1.551)],
        };
        println!("{}", table);
        assert_eq!(table.to_string().lines().count(), 3);
    }

    #[test]
    fn run_on_docker_stats() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let outputs = run("./test/stats.txt", dir.path(), &config).unwrap();
        let results = dir.path().join("results");
        assert_eq!(outputs.clean_csv, results.join("stats_clean.txt"));
        let csv = std::fs::read_to_string(&outputs.clean_csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[0],
            "CONTAINERID,NAME,CPU%,MEMUSAGE/LIMIT,MEM%,NETI/O,BLOCKI/O,PIDS,\
             MEM USAGE (MiB),MEM LIMIT (MiB)"
        );
        assert!(lines[1].starts_with(
            "367f4a14014d,objective_banach,149.33,2.014GiB/15.65GiB,12.87%,60.8kB/11.5kB,195MB/0B,23,"
        ));
        assert!(lines[2].starts_with("cb5fe1ddbcc2,reminders_pgbackups_1,0.0,"));
        // cpu and the two memory columns are plain numbers
        for l in lines[1..].iter() {
            let record: Vec<&str> = l.split(',').collect();
            assert_eq!(record.len(), 10);
            for value in [record[2], record[8], record[9]] {
                assert!(value.parse::<f64>().is_ok(), "not a number: {}", value);
            }
        }
        assert_eq!(outputs.charts.len(), 4);
        for name in ["objective_banach", "reminders_pgbackups_1"] {
            assert!(results.join(format!("{}_memory.svg", name)).is_file());
            assert!(results.join(format!("{}_cpu.svg", name)).is_file());
        }
    }

    #[test]
    fn run_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let fin = dir.path().join("broken.txt");
        std::fs::write(
            &fin,
            "CONTAINER ID   NAME   CPU %   MEM USAGE / LIMIT\n\
             367f4a14014d   web    1.0%    1.0XiB\n",
        )
        .unwrap();
        let base = dir.path().join("out");
        assert!(run(&fin, &base, &Config::default()).is_err());
        assert!(!base.join("results").exists());
    }

    #[test]
    fn run_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path().join("nope.txt"), dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
