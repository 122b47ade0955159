//! Turn the appended `docker stats --no-stream` snapshots into one table.
//!
//! The raw file repeats its header at every poll. Only the first header is
//! kept and its multi-word column names are compacted into single tokens,
//! then the data lines are split on whitespace and the memory and cpu
//! columns are converted to numbers.
use crate::config::{Config, CPU_HDR, MEM_HDR, NAME_HDR};
use crate::error::{Error, Result};
use crate::{UsageRow, UsageTable};
use std::num::ParseFloatError;
use tracing::{debug, warn};

/// Text fields of one data line, with its position among the data lines.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// The single-header table before any numeric conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Index of the named column, fail if the header does not have it.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string(), self.headers.clone()))
    }
}

/// Clean the raw lines and return the usage table,
/// any malformed number fails the whole cleaning.
pub fn clean_data<S: AsRef<str>>(dirty_data: &[S], config: &Config) -> Result<UsageTable> {
    let single_header = remove_extra_headers(dirty_data, &config.header_marker)?;
    let raw = read_table(&single_header)?;
    debug!("single header table, columns {:?}", raw.headers);
    for row in raw.rows.iter() {
        debug!("{:>5}: {:?}", row.line, row.fields);
    }
    let name_col = raw.column(NAME_HDR)?;
    let cpu_col = raw.column(CPU_HDR)?;
    let mem_col = raw.column(MEM_HDR)?;

    let mut table = UsageTable::new(raw.headers.clone(), raw.rows.len());
    for row in raw.rows.iter() {
        let (mem_usage_mb, mem_limit_mb) = parse_mem_usage(&row.fields[mem_col], row.line, config)?;
        let cpu = &row.fields[cpu_col];
        let cpu_percent = cpu_str2num(cpu).map_err(parse_error("cpu", cpu, row.line))?;
        table.rows.push(UsageRow {
            container_name: row.fields[name_col].clone(),
            cpu_percent,
            mem_usage_mb,
            mem_limit_mb,
            fields: row.fields.clone(),
        });
    }
    Ok(table)
}

/// Keep the first line as the only header and drop all the other lines with the marker.
/// Blank lines are dropped too; leading blank lines are not taken as header.
pub fn remove_extra_headers<S: AsRef<str>>(dirty_data: &[S], marker: &str) -> Result<Vec<String>> {
    if marker.is_empty() {
        return Err(Error::EmptyMarker);
    }
    let mut lines = dirty_data
        .iter()
        .map(|l| l.as_ref())
        .skip_while(|l| l.trim().is_empty());
    let header = lines.next().ok_or(Error::EmptyInput)?;
    let mut cleaned_data: Vec<String> = Vec::with_capacity(dirty_data.len());
    cleaned_data.push(compact_header(header));
    let mut dropped = 0usize;
    for line in lines {
        if line.contains(marker) {
            dropped += 1;
        } else if !line.trim().is_empty() {
            cleaned_data.push(line.trim_end().to_string());
        }
    }
    debug!(
        "removed {} repeated headers, kept {} data lines",
        dropped,
        cleaned_data.len() - 1
    );
    Ok(cleaned_data)
}

/// Remove the single spaces inside the column names,
/// shortening each run of spaces between columns by one.
/// e.g., "CONTAINER ID   NAME" -> "CONTAINERID  NAME"
pub fn compact_header(line: &str) -> String {
    line.trim_end()
        .split(' ')
        .map(|p| if p.is_empty() { " " } else { p })
        .collect()
}

/// Split a line on whitespace, gluing `a / b` back into the single field `a/b`.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token != "/" {
            fields.push(token.to_string());
            continue;
        }
        let next = tokens.next().unwrap_or("");
        match fields.last_mut() {
            Some(prev) => {
                prev.push('/');
                prev.push_str(next);
            }
            None => fields.push(format!("/{}", next)),
        }
    }
    fields
}

/// Read the header and the data rows.
/// Rows with a different number of fields than the header are skipped.
pub fn read_table<S: AsRef<str>>(lines: &[S]) -> Result<RawTable> {
    let (header, data) = lines.split_first().ok_or(Error::EmptyInput)?;
    let headers = split_fields(header.as_ref());
    let mut rows: Vec<RawRow> = Vec::with_capacity(data.len());
    for (i, l) in data.iter().enumerate() {
        let fields = split_fields(l.as_ref());
        if fields.len() != headers.len() {
            warn!(
                "skipping data line {} with {} fields, header has {}: {}",
                i + 1,
                fields.len(),
                headers.len(),
                l.as_ref()
            );
            continue;
        }
        rows.push(RawRow { line: i + 1, fields });
    }
    Ok(RawTable { headers, rows })
}

/// Split the memory field of format 'x.xxxGiB/y.yyyGiB' into usage and limit.
pub fn split_mem_usage(mem_str: &str) -> Option<(&str, &str)> {
    mem_str
        .split_once('/')
        .map(|(usage, limit)| (usage.trim(), limit.trim()))
}

fn parse_mem_usage(mem_str: &str, line: usize, config: &Config) -> Result<(f64, f64)> {
    let (usage, limit) = split_mem_usage(mem_str).ok_or_else(|| Error::MalformedMemory {
        value: mem_str.to_string(),
        line,
    })?;
    debug!("mem usage {} and limit {} on line {}", usage, limit, line);
    let usage = mem_str2num(usage, config).map_err(parse_error("memory usage", usage, line))?;
    let limit = mem_str2num(limit, config).map_err(parse_error("memory limit", limit, line))?;
    Ok((usage, limit))
}

/// Return the memory string as value in MB.
/// Expects the form '1.234MiB' or '1.234GiB': the last 3 characters are always
/// taken as unit, a unit without multiplier in the config is not rescaled.
pub fn mem_str2num(mem_str: &str, config: &Config) -> std::result::Result<f64, ParseFloatError> {
    let (val, units) = split_suffix(mem_str.trim(), 3);
    let val = val.trim().parse::<f64>()?;
    Ok(val * config.unit_multiplier(units))
}

/// Parse the CPU % utilization, e.g., "14.5%" -> 14.5
pub fn cpu_str2num(cpu_str: &str) -> std::result::Result<f64, ParseFloatError> {
    let (val, _) = split_suffix(cpu_str.trim(), 1);
    val.trim().parse::<f64>()
}

// split off the last n chars, the whole string is suffix if shorter
fn split_suffix(s: &str, n: usize) -> (&str, &str) {
    let at = s
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    s.split_at(at)
}

fn parse_error<'a>(
    field: &'static str,
    value: &'a str,
    line: usize,
) -> impl FnOnce(ParseFloatError) -> Error + 'a {
    move |source| Error::Parse {
        field,
        value: value.to_string(),
        line,
        source,
    }
}
