//! Human-readable rendering for terminal output: the conflict listing shown
//! to the operator and the end-of-run summary.
use colored::*;

use crate::reconcile::{ConflictCase, Disposition};
use crate::record::Record;
use crate::stats::{RunStats, Tally};

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

/// Banner printed once before the first conflict.
pub fn render_conflicts_header(total: usize) -> String {
    format!(
        "\n{}\n{}\n",
        format!("Found {} conflicts to resolve:", total).bold().yellow(),
        "=".repeat(80)
    )
}

fn push_side(out: &mut String, title: &str, records: &[Record]) {
    out.push_str(&format!("\n{}\n", title.bold()));
    for (i, r) in records.iter().enumerate() {
        out.push_str(&format!("  {}. Password: {}\n", i + 1, r.password.red()));
    }
}

/// Both sides of one conflict followed by the option menu.
pub fn render_conflict(case: &ConflictCase, position: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", format!("Conflict {}:", position).bold().cyan()));
    out.push_str(&format!("Key: {}\n", case.label()));
    push_side(&mut out, "Importing records:", &case.importing);
    push_side(&mut out, "Master records:", &case.master);
    out.push_str(&format!("\n{}\n", "Options:".bold()));
    for d in Disposition::ALL {
        out.push_str(&format!("{}. {}\n", d.menu_number(), d.description()));
    }
    out
}

pub fn render_prompt(position: usize) -> String {
    format!("Choose option for conflict {} (1-4): ", position)
}

pub fn render_invalid_choice() -> String {
    format!("{}\n", "Invalid choice. Please enter 1, 2, 3, or 4.".red())
}

fn tally_line(label: &str, t: &Tally) -> String {
    format!("{}: {} keys ({} records)", label, t.keys, t.records)
}

pub fn render_summary(stats: &RunStats) -> String {
    let mut lines: Vec<String> = Vec::new();
    let b = &stats.breakdown;
    lines.push(format!("Importing records: {}", stats.importing_records));
    lines.push(format!("Master records: {}", stats.master_records));
    lines.push(tally_line("Importing only", &b.importing_only));
    lines.push(tally_line("Master only", &b.master_only));
    lines.push(tally_line("Agreeing", &b.agreeing));
    lines.push(tally_line("Conflicts", &b.conflicting));
    lines.push(format!("  Kept importing: {}", stats.kept_importing));
    lines.push(format!("  Kept master: {}", stats.kept_master));
    lines.push(format!("  Kept both: {}", stats.kept_both));
    lines.push(format!("  Skipped: {}", stats.skipped));
    lines.push(format!(
        "{}: {}",
        "Total records in output".bold(),
        stats.output_records
    ));

    let mut out = section_header(&"Reconciliation Summary".bold().yellow().to_string());
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::KeyEncoding;
    use crate::stats::Breakdown;

    #[test]
    fn visible_len_ignores_ansi() {
        assert_eq!(visible_len("\u{1b}[1;33mabc\u{1b}[0m"), 3);
        assert_eq!(visible_len("plain"), 5);
    }

    #[test]
    fn conflict_lists_both_sides_with_one_based_indexes() {
        colored::control::set_override(false);
        let importing = vec![Record::new("n", "u", "usr", "pw1", "note")];
        let master = vec![
            Record::new("n", "u", "usr", "pw2", "note"),
            Record::new("n", "u", "usr", "pw3", "note"),
        ];
        let case = ConflictCase {
            key: importing[0].key(KeyEncoding::LengthPrefixed),
            importing,
            master,
        };
        let s = render_conflict(&case, 2);
        assert!(s.contains("Conflict 2:"));
        assert!(s.contains("Key: n|u|usr|note"));
        assert!(s.contains("Importing records:\n  1. Password: pw1\n"));
        assert!(s.contains("Master records:\n  1. Password: pw2\n  2. Password: pw3\n"));
        assert!(s.contains("1. Keep importing records\n2. Keep master records\n3. Keep both\n4. Skip this conflict\n"));
    }

    #[test]
    fn snapshot_summary() {
        colored::control::set_override(false);
        let stats = RunStats {
            importing_records: 3,
            master_records: 3,
            breakdown: Breakdown {
                importing_only: Tally { keys: 1, records: 1 },
                master_only: Tally { keys: 1, records: 1 },
                agreeing: Tally { keys: 0, records: 0 },
                conflicting: Tally { keys: 2, records: 4 },
            },
            kept_importing: 0,
            kept_master: 0,
            kept_both: 1,
            skipped: 1,
            output_records: 4,
        };
        let s = render_summary(&stats);
        insta::assert_snapshot!(s.trim(), @r"
        Reconciliation Summary
        ──────────────────────

        Importing records: 3
        Master records: 3
        Importing only: 1 keys (1 records)
        Master only: 1 keys (1 records)
        Agreeing: 0 keys (0 records)
        Conflicts: 2 keys (4 records)
          Kept importing: 0
          Kept master: 0
          Kept both: 1
          Skipped: 1
        Total records in output: 4
        ");
    }
}
