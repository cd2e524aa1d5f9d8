//! Delimited-text intake.

use std::path::Path;

use btw_core::record::RawRecord;
use tracing::debug;

use crate::{Error, Result};

const CANDIDATES: &[u8] = &[b';', b',', b'\t'];
const SNIFF_LINES: usize = 10;

/// Read a delimited file, decoding it as UTF-8 or, failing that, as
/// Windows-1252 (what spreadsheet tools commonly write).
pub fn read_path(path: &Path) -> Result<Vec<RawRecord>> {
  let bytes = std::fs::read(path)?;
  let content = decode(bytes);
  debug!(path = %path.display(), bytes = content.len(), "read input table");
  read_str(&content)
}

/// Parse delimited text whose first line is the header row. Blank lines and
/// rows with no non-blank cell are skipped; header labels are kept verbatim.
pub fn read_str(content: &str) -> Result<Vec<RawRecord>> {
  let content = content.strip_prefix('\u{feff}').unwrap_or(content);
  let delimiter = sniff_delimiter(content);

  let mut reader = csv::ReaderBuilder::new()
    .delimiter(delimiter)
    .flexible(true)
    .trim(csv::Trim::None)
    .from_reader(content.as_bytes());

  let headers = reader.headers()?.clone();
  if headers.iter().all(|h| h.trim().is_empty()) {
    return Err(Error::MissingHeader);
  }

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    if record.iter().all(|cell| cell.trim().is_empty()) {
      continue;
    }
    rows.push(
      headers
        .iter()
        .zip(record.iter())
        .filter(|(label, _)| !label.is_empty())
        .collect::<RawRecord>(),
    );
  }
  Ok(rows)
}

fn decode(bytes: Vec<u8>) -> String {
  match String::from_utf8(bytes) {
    Ok(s) => s,
    Err(e) => {
      let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
      decoded.into_owned()
    }
  }
}

/// Pick the candidate that splits the first line into the most fields and
/// keeps that count on the following lines.
fn sniff_delimiter(content: &str) -> u8 {
  let sample: Vec<&str> = content
    .lines()
    .filter(|l| !l.trim().is_empty())
    .take(SNIFF_LINES)
    .collect();

  let field_count = |line: &str, delim: u8| {
    csv::ReaderBuilder::new()
      .delimiter(delim)
      .has_headers(false)
      .flexible(true)
      .from_reader(line.as_bytes())
      .records()
      .next()
      .and_then(|r| r.ok())
      .map_or(1, |r| r.len())
  };

  let mut best = b',';
  let mut best_score = 0;
  for &delim in CANDIDATES {
    let counts: Vec<usize> = sample.iter().map(|l| field_count(l, delim)).collect();
    let Some(&target) = counts.first().filter(|&&c| c > 1) else {
      continue;
    };
    let score = counts.iter().filter(|&&c| c == target).count() * target;
    if score > best_score {
      best_score = score;
      best = delim;
    }
  }
  best
}
