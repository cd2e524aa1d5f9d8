//! Plain-text output for the terminal.

use btw_core::{
  CanonicalIdentifier,
  lookup::AddressMatch,
  reconcile::{ActiveReason, FinalStatus, ManualOverride, ReconciliationStore},
  store::{Run, RunSummary},
  verdict::{Source, Verdict},
};

use crate::app::Tally;

pub fn run_list(runs: &[RunSummary]) {
  if runs.is_empty() {
    println!("No runs yet.");
    return;
  }
  for r in runs {
    println!(
      "{}  {}  {:>4}/{:<4} active{}  {}",
      r.run_id,
      r.created_at.format("%Y-%m-%d %H:%M"),
      r.active_count,
      r.total,
      if r.cancelled { " (cancelled)" } else { "" },
      r.source.as_deref().unwrap_or("-"),
    );
  }
}

pub fn run(run: &Run, overrides: &ReconciliationStore) {
  println!("Run {}", run.run_id);
  println!("  started  {}", run.created_at.format("%Y-%m-%d %H:%M:%S"));
  if let Some(source) = &run.source {
    println!("  source   {source}");
  }
  if run.cancelled {
    println!("  cancelled before all records were checked");
  }
  println!();

  for (i, result) in run.results.iter().enumerate() {
    let id = &result.record.identifier;
    let status = overrides.final_status(id, &result.verdict);
    println!(
      "{:>4}. {:<14} {:<8} {}",
      i + 1,
      id.to_string(),
      status_label(&status),
      result.record.name,
    );
    if !status.is_active()
      && let Some(error) = &result.verdict.error
    {
      println!("        {error}");
    }
    let ov = overrides.get(id);
    if !ov.is_default() {
      println!("        override: {}", override_summary(&ov));
    }
  }

  println!();
  tally(&Tally::of(run, overrides));
}

pub fn tally(t: &Tally) {
  println!(
    "{} records: {} active, {} stopped, {} continue under a new number",
    t.total, t.active, t.stopped, t.continued
  );
}

pub fn verdict(id: &CanonicalIdentifier, verdict: &Verdict, status: &FinalStatus) {
  println!("{}  {}", id.display(), status_label(status));
  if verdict.is_active {
    println!("  resolved by {}", source_label(verdict.resolved_by));
  }
  if let Some(d) = &verdict.details {
    for (label, value) in [("name", &d.name), ("address", &d.address), ("status", &d.status)] {
      if let Some(v) = value {
        println!("  {label:<8} {}", v.replace('\n', ", "));
      }
    }
  }
  if let Some(error) = &verdict.error {
    println!("  {error}");
  }
}

pub fn override_state(id: &CanonicalIdentifier, ov: &ManualOverride) {
  println!("{}  {}", id.display(), override_summary(ov));
}

pub fn matches(found: &[AddressMatch]) {
  if found.is_empty() {
    println!("No enterprises found at this address.");
    return;
  }
  for (i, m) in found.iter().enumerate() {
    println!("{:>3}. {}  {}  [{}]", i + 1, m.registry_number, m.name, m.status);
    println!("     {}", m.address);
  }
}

fn status_label(status: &FinalStatus) -> &'static str {
  match status {
    FinalStatus::Active(ActiveReason::Superseded) => "moved",
    FinalStatus::Active(_) => "active",
    FinalStatus::Stopped => "stopped",
  }
}

fn source_label(source: Source) -> &'static str {
  match source {
    Source::Primary => "VIES",
    Source::Fallback => "KBO",
    Source::None => "-",
  }
}

fn override_summary(ov: &ManualOverride) -> String {
  let mut parts = Vec::new();
  if ov.confirmed_active_in_registry {
    parts.push("confirmed active".to_owned());
  }
  match (ov.has_superseding_identifier, ov.superseding_identifier_value.as_str()) {
    (true, "") => parts.push("continues under a new number (not filled in)".to_owned()),
    (true, v) => parts.push(format!("continues as {v}")),
    (false, "") => {}
    (false, v) => parts.push(format!("new number {v} staged, not ticked")),
  }
  if parts.is_empty() {
    "no override".to_owned()
  } else {
    parts.join("; ")
  }
}
