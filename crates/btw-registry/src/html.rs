//! Minimal extraction of KBO result tables.
//!
//! KBO renders results as `<table class="grid">` rows. Only cell text is
//! needed, so rows are pulled out with patterns rather than a full HTML
//! parser; nested tables are not supported.

use std::sync::LazyLock;

use regex::Regex;

static GRID_TABLE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?is)<table\b[^>]*\bclass\s*=\s*["'][^"']*\bgrid\b[^"']*["'][^>]*>(.*?)</table>"#)
    .expect("static regex")
});
static ROW: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("static regex"));
static CELL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]>").expect("static regex")
});
static TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("static regex"));

/// Text of every cell of every row in every `grid` table, in document order.
/// The header row, if any, is included as row 0.
pub(crate) fn grid_rows(html: &str) -> Vec<Vec<String>> {
  GRID_TABLE
    .captures_iter(html)
    .flat_map(|table| {
      let body = table.get(1).map_or("", |m| m.as_str());
      ROW
        .captures_iter(body)
        .map(|row| {
          CELL
            .captures_iter(&row[1])
            .map(|cell| cell_text(&cell[1]))
            .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
    })
    .collect()
}

/// Strip markup, decode common entities and collapse whitespace.
fn cell_text(fragment: &str) -> String {
  let without_tags = TAG.replace_all(fragment, " ");
  let decoded = decode_entities(&without_tags);
  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
  let named = s
    .replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&apos;", "'");
  let numeric = NUMERIC_ENTITY.replace_all(&named, |c: &regex::Captures<'_>| {
    let radix = if c[1].is_empty() { 10 } else { 16 };
    u32::from_str_radix(&c[2], radix)
      .ok()
      .and_then(char::from_u32)
      .map(String::from)
      .unwrap_or_default()
  });
  numeric.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r#"
    <html><body>
      <table class="header"><tr><td>ignored</td></tr></table>
      <table id="table" class="grid wide">
        <tr><th>Algemeen</th><th></th></tr>
        <tr><td class="QL">Naam:</td><td class="QL">Bloemen &amp; Co<br/><span>sinds 1999</span></td></tr>
        <tr><td>Status:</td><td><span class="pageactief">Actief</span></td></tr>
        <tr><td>Adres:</td><td>Teststraat&nbsp;1 &#8211; 1000 Brussel</td></tr>
      </table>
    </body></html>
  "#;

  #[test]
  fn extracts_grid_cells() {
    let rows = grid_rows(PAGE);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][1], "Bloemen & Co sinds 1999");
    assert_eq!(rows[2][1], "Actief");
    assert_eq!(rows[3][1], "Teststraat 1 \u{2013} 1000 Brussel");
  }

  #[test]
  fn ignores_non_grid_tables() {
    let rows = grid_rows(r#"<table class="header"><tr><td>x</td></tr></table>"#);
    assert!(rows.is_empty());
  }

  #[test]
  fn no_table_means_no_rows() {
    assert!(grid_rows("<p>Geen resultaten</p>").is_empty());
  }
}
