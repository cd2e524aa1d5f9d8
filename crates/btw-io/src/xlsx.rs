//! Export workbook writer.

use std::path::Path;

use btw_core::export::{ContinuedRow, ExportGroups, SheetRow, StoppedRow};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::{Error, Result};

pub const STOPPED_SHEET: &str = "Stopped companies";
pub const CONTINUED_SHEET: &str = "New VAT numbers";

/// Build the workbook: one sheet per non-empty group, header row in bold.
pub fn build(groups: &ExportGroups) -> Result<Workbook> {
  if groups.is_empty() {
    return Err(Error::NothingToExport);
  }

  let mut workbook = Workbook::new();
  if !groups.stopped.is_empty() {
    write_sheet::<StoppedRow>(&mut workbook, STOPPED_SHEET, &groups.stopped)?;
  }
  if !groups.continued.is_empty() {
    write_sheet::<ContinuedRow>(&mut workbook, CONTINUED_SHEET, &groups.continued)?;
  }
  Ok(workbook)
}

/// Write the workbook to `path`.
pub fn save(groups: &ExportGroups, path: &Path) -> Result<()> {
  let mut workbook = build(groups)?;
  workbook.save(path)?;
  info!(
    path = %path.display(),
    stopped = groups.stopped.len(),
    continued = groups.continued.len(),
    "export written"
  );
  Ok(())
}

/// The workbook as `.xlsx` bytes, for serving over HTTP.
pub fn to_buffer(groups: &ExportGroups) -> Result<Vec<u8>> {
  Ok(build(groups)?.save_to_buffer()?)
}

fn write_sheet<R: SheetRow>(workbook: &mut Workbook, name: &str, rows: &[R]) -> Result<()> {
  let bold = Format::new().set_bold();
  let sheet = workbook.add_worksheet().set_name(name)?;

  for (col, header) in R::HEADERS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *header, &bold)?;
  }
  for (i, row) in rows.iter().enumerate() {
    let r = i as u32 + 1;
    for (col, cell) in row.cells().into_iter().enumerate() {
      sheet.write_string(r, col as u16, cell)?;
    }
  }
  sheet.set_freeze_panes(1, 0)?;
  sheet.autofit();
  Ok(())
}

#[cfg(test)]
mod tests {
  use btw_core::export::{STATUS_CONTINUED, STATUS_STOPPED};

  use super::*;

  fn stopped() -> StoppedRow {
    StoppedRow {
      name:                "Gone BV".into(),
      original_identifier: "BE0123456789".into(),
      email:               "info@gone.be".into(),
      address:             "Teststraat 1, 1000 Brussel".into(),
      kind:                "Bloemist".into(),
      status:              STATUS_STOPPED.into(),
    }
  }

  fn continued() -> ContinuedRow {
    ContinuedRow {
      name:                "Moved BV".into(),
      original_identifier: "BE0123456789".into(),
      new_identifier:      "BE0987654321".into(),
      email:               String::new(),
      address:             String::new(),
      kind:                String::new(),
      status:              STATUS_CONTINUED.into(),
    }
  }

  #[test]
  fn empty_groups_are_refused() {
    assert!(matches!(build(&ExportGroups::default()), Err(Error::NothingToExport)));
  }

  #[test]
  fn only_non_empty_groups_get_a_sheet() {
    let groups = ExportGroups { stopped: vec![stopped()], continued: vec![] };
    let mut workbook = build(&groups).unwrap();

    assert!(workbook.worksheet_from_name(STOPPED_SHEET).is_ok());
    assert!(workbook.worksheet_from_name(CONTINUED_SHEET).is_err());
  }

  #[test]
  fn saves_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xlsx");
    let groups = ExportGroups { stopped: vec![stopped()], continued: vec![continued()] };

    save(&groups, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
  }

  #[test]
  fn buffer_is_a_zip_archive() {
    let groups = ExportGroups { stopped: vec![], continued: vec![continued()] };
    let bytes = to_buffer(&groups).unwrap();
    assert!(bytes.starts_with(b"PK"));
  }
}
