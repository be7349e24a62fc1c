use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

pub const DEFAULT_SEASON_DIRS: &[&str] = &["./EPL_23-24_season", "./EPL_24-25_season"];
pub const DEFAULT_COMBINED_OUTPUT: &str = "matches.csv";

/// Rows from many CSV files under the union of their headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CombinedCsv {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn append(&mut self, headers: &[String], records: Vec<Vec<String>>) {
        let mut positions = Vec::with_capacity(headers.len());
        for header in headers {
            let pos = match self.headers.iter().position(|h| h == header) {
                Some(pos) => pos,
                None => {
                    self.headers.push(header.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.headers.len() - 1
                }
            };
            positions.push(pos);
        }

        for record in records {
            let mut row = vec![String::new(); self.headers.len()];
            for (value, pos) in record.into_iter().zip(&positions) {
                row[*pos] = value;
            }
            self.rows.push(row);
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("create csv {}", path.display()))?;
        writer
            .write_record(&self.headers)
            .context("write csv header")?;
        for row in &self.rows {
            writer.write_record(row).context("write csv row")?;
        }
        writer.flush().context("flush csv")?;
        Ok(())
    }
}

/// Regular files of `dir`, sorted by file name.
pub fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn combine_dirs<D: AsRef<Path>>(dirs: &[D]) -> Result<CombinedCsv> {
    let mut out = CombinedCsv::default();
    for dir in dirs {
        let dir = dir.as_ref();
        let files = sorted_files(dir)?;
        log::info!("Combining {} files from {}", files.len(), dir.display());
        for file in files {
            let (headers, records) = read_latin1_csv(&file)?;
            log::debug!("{}: {} rows", file.display(), records.len());
            out.append(&headers, records);
        }
    }
    Ok(out)
}

/// Reads one Latin-1 CSV file. Short rows are padded by the caller; a row
/// longer than the header is an error.
pub fn read_latin1_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let raw = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = decode_latin1(&raw);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = dedup_headers(
        reader
            .headers()
            .with_context(|| format!("read header of {}", path.display()))?
            .iter(),
    );
    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read row of {}", path.display()))?;
        if record.len() > headers.len() {
            bail!(
                "{} row {}: {} fields but the header has {}",
                path.display(),
                idx + 1,
                record.len(),
                headers.len()
            );
        }
        records.push(record.iter().map(|v| v.to_string()).collect());
    }
    Ok((headers, records))
}

/// Repeated names get a `.N` suffix, so `a,a` reads as `a,a.1`.
pub fn dedup_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut n = 0;
        while out.contains(&candidate) {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        out.push(candidate);
    }
    out
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}
