//! Reconciliation of an importing index against a master index.
//!
//! Every key in the union of both indexes lands in exactly one class:
//! importing-only, master-only, agreeing (both sides present with the same
//! set of passwords) or conflicting (both present, password sets differ).
//! Agreeing keys keep only the importing side's group. Each conflict is
//! handed to a [`Resolver`] which picks a [`Disposition`].
//!
//! Output order is importing-only, master-only, agreeing, then resolved
//! conflicts. Within each class keys are visited in sorted order, so two runs
//! over the same inputs present conflicts identically.
//!
//! ```
//! use pwreconcile::index::group_by_key;
//! use pwreconcile::reconcile::{ConflictCase, Disposition, reconcile};
//! use pwreconcile::record::{KeyEncoding, Record};
//!
//! let importing = group_by_key(&[Record::new("n", "u", "usr", "pw1", "")], KeyEncoding::Joined);
//! let master = group_by_key(&[Record::new("n", "u", "usr", "pw2", "")], KeyEncoding::Joined);
//! let mut keep_both = |_: &ConflictCase| Disposition::KeepBoth;
//! let result = reconcile(&importing, &master, &mut keep_both).unwrap();
//! assert_eq!(result.records.len(), 2);
//! ```
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::str::FromStr;

use log::debug;

use crate::index::Index;
use crate::record::{IdentityKey, Record};
use crate::stats::Breakdown;

/// Operator's resolution for a single conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    KeepImporting,
    KeepMaster,
    KeepBoth,
    Skip,
}

impl Disposition {
    /// Menu order; position + 1 is the number the operator types.
    pub const ALL: [Disposition; 4] = [
        Disposition::KeepImporting,
        Disposition::KeepMaster,
        Disposition::KeepBoth,
        Disposition::Skip,
    ];

    pub fn menu_number(self) -> u8 {
        match self {
            Disposition::KeepImporting => 1,
            Disposition::KeepMaster => 2,
            Disposition::KeepBoth => 3,
            Disposition::Skip => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Disposition::KeepImporting => "Keep importing records",
            Disposition::KeepMaster => "Keep master records",
            Disposition::KeepBoth => "Keep both",
            Disposition::Skip => "Skip this conflict",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Disposition::KeepImporting => "keep-importing",
            Disposition::KeepMaster => "keep-master",
            Disposition::KeepBoth => "keep-both",
            Disposition::Skip => "skip",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("invalid choice: {0:?}")]
    InvalidChoice(String),
}

/// Parses a menu answer: `1`-`4`, surrounding whitespace ignored.
impl FromStr for Disposition {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Disposition::KeepImporting),
            "2" => Ok(Disposition::KeepMaster),
            "3" => Ok(Disposition::KeepBoth),
            "4" => Ok(Disposition::Skip),
            other => Err(MenuError::InvalidChoice(other.to_string())),
        }
    }
}

/// A key present on both sides whose password sets differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCase {
    pub key: IdentityKey,
    pub importing: Vec<Record>,
    pub master: Vec<Record>,
}

impl ConflictCase {
    /// `|`-joined identity for display.
    pub fn label(&self) -> String {
        self.importing
            .first()
            .or(self.master.first())
            .map(Record::identity_label)
            .unwrap_or_else(|| self.key.to_string())
    }

    /// Records kept under `disposition`, importing side first.
    pub fn kept(&self, disposition: Disposition) -> impl Iterator<Item = &Record> {
        let none: &[Record] = &[];
        let (imp, mas) = match disposition {
            Disposition::KeepImporting => (self.importing.as_slice(), none),
            Disposition::KeepMaster => (none, self.master.as_slice()),
            Disposition::KeepBoth => (self.importing.as_slice(), self.master.as_slice()),
            Disposition::Skip => (none, none),
        };
        imp.iter().chain(mas.iter())
    }
}

/// Decision seam for conflicts. `position` is 1-based out of `total`.
pub trait Resolver {
    fn resolve(
        &mut self,
        case: &ConflictCase,
        position: usize,
        total: usize,
    ) -> io::Result<Disposition>;

    /// Called once before the first conflict, only when there are conflicts.
    fn begin(&mut self, _total: usize) -> io::Result<()> {
        Ok(())
    }
}

impl<F> Resolver for F
where
    F: FnMut(&ConflictCase) -> Disposition,
{
    fn resolve(&mut self, case: &ConflictCase, _: usize, _: usize) -> io::Result<Disposition> {
        Ok(self(case))
    }
}

/// Applies the same disposition to every conflict.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub Disposition);

impl Resolver for FixedResolver {
    fn resolve(&mut self, _: &ConflictCase, _: usize, _: usize) -> io::Result<Disposition> {
        Ok(self.0)
    }
}

/// Result of the classification step, before any conflict is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub importing_only: Vec<Record>,
    pub master_only: Vec<Record>,
    pub agreeing: Vec<Record>,
    pub conflicts: Vec<ConflictCase>,
    pub breakdown: Breakdown,
}

fn password_set(group: &[Record]) -> BTreeSet<&str> {
    group.iter().map(|r| r.password.as_str()).collect()
}

pub fn classify(importing: &Index, master: &Index) -> Classification {
    let mut out = Classification::default();
    let keys: BTreeSet<&IdentityKey> = importing.keys().chain(master.keys()).collect();
    for key in keys {
        match (importing.get(key), master.get(key)) {
            (Some(imp), None) => {
                out.breakdown.importing_only.add(imp.len());
                out.importing_only.extend_from_slice(imp);
            }
            (None, Some(mas)) => {
                out.breakdown.master_only.add(mas.len());
                out.master_only.extend_from_slice(mas);
            }
            (Some(imp), Some(mas)) => {
                if password_set(imp) == password_set(mas) {
                    out.breakdown.agreeing.add(imp.len());
                    out.agreeing.extend_from_slice(imp);
                } else {
                    out.breakdown.conflicting.add(imp.len() + mas.len());
                    out.conflicts.push(ConflictCase {
                        key: key.clone(),
                        importing: imp.to_vec(),
                        master: mas.to_vec(),
                    });
                }
            }
            (None, None) => unreachable!("key drawn from one of the two indexes"),
        }
    }
    debug!(
        "classified {} keys: importing_only={}, master_only={}, agreeing={}, conflicting={}",
        out.breakdown.total_keys(),
        out.breakdown.importing_only.keys,
        out.breakdown.master_only.keys,
        out.breakdown.agreeing.keys,
        out.breakdown.conflicting.keys
    );
    out
}

/// Operator decision for one conflict and how many records it kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: IdentityKey,
    pub disposition: Disposition,
    pub kept: usize,
}

/// Final ordered record sequence plus the per-conflict decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<Record>,
    pub resolutions: Vec<Resolution>,
    pub breakdown: Breakdown,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of conflicts resolved with `disposition`.
    pub fn count(&self, disposition: Disposition) -> usize {
        self.resolutions
            .iter()
            .filter(|r| r.disposition == disposition)
            .count()
    }
}

impl Classification {
    /// Resolve every conflict in order and assemble the output.
    pub fn resolve<R: Resolver + ?Sized>(self, resolver: &mut R) -> io::Result<Reconciliation> {
        let Classification {
            importing_only,
            master_only,
            agreeing,
            conflicts,
            breakdown,
        } = self;
        let mut records = importing_only;
        records.extend(master_only);
        records.extend(agreeing);

        let total = conflicts.len();
        if total > 0 {
            resolver.begin(total)?;
        }
        let mut resolutions = Vec::with_capacity(total);
        for (i, case) in conflicts.into_iter().enumerate() {
            let disposition = resolver.resolve(&case, i + 1, total)?;
            let before = records.len();
            records.extend(case.kept(disposition).cloned());
            debug!("conflict {}/{} {}: {}", i + 1, total, case.key, disposition);
            resolutions.push(Resolution {
                key: case.key,
                disposition,
                kept: records.len() - before,
            });
        }
        Ok(Reconciliation {
            records,
            resolutions,
            breakdown,
        })
    }
}

/// Classify both indexes and resolve conflicts through `resolver`.
pub fn reconcile<R: Resolver + ?Sized>(
    importing: &Index,
    master: &Index,
    resolver: &mut R,
) -> io::Result<Reconciliation> {
    classify(importing, master).resolve(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::group_by_key;
    use crate::record::KeyEncoding;

    fn rec(name: &str, pw: &str) -> Record {
        Record::new(name, "https://example.com", "alice", pw, "note")
    }

    fn idx(records: &[Record]) -> Index {
        group_by_key(records, KeyEncoding::Joined)
    }

    fn passwords(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.password.as_str()).collect()
    }

    #[test]
    fn disjoint_keys_keep_everything_without_conflicts() {
        let a = idx(&[rec("a", "1"), rec("b", "2")]);
        let b = idx(&[rec("c", "3")]);
        let mut never = |_: &ConflictCase| -> Disposition { panic!("no conflicts expected") };
        let out = reconcile(&a, &b, &mut never).unwrap();
        assert_eq!(passwords(&out.records), vec!["1", "2", "3"]);
        assert!(out.resolutions.is_empty());
    }

    #[test]
    fn agreeing_sets_keep_importing_group_only() {
        let a = idx(&[rec("a", "1"), rec("a", "2"), rec("a", "1")]);
        let b = idx(&[rec("a", "2"), rec("a", "1")]);
        let c = classify(&a, &b);
        assert!(c.conflicts.is_empty());
        assert_eq!(passwords(&c.agreeing), vec!["1", "2", "1"]);
        assert_eq!(c.breakdown.agreeing.keys, 1);
        let out = c.resolve(&mut FixedResolver(Disposition::Skip)).unwrap();
        assert_eq!(out.records.len(), 3);
    }

    #[test]
    fn differing_sets_produce_one_conflict() {
        let a = idx(&[rec("a", "pw1")]);
        let b = idx(&[rec("a", "pw2"), rec("a", "pw1")]);
        let c = classify(&a, &b);
        assert_eq!(c.conflicts.len(), 1);
        assert_eq!(passwords(&c.conflicts[0].importing), vec!["pw1"]);
        assert_eq!(passwords(&c.conflicts[0].master), vec!["pw2", "pw1"]);
    }

    #[test]
    fn each_disposition_keeps_the_right_groups() {
        let a = idx(&[rec("a", "pw1")]);
        let b = idx(&[rec("a", "pw2"), rec("a", "pw3")]);
        let cases = [
            (Disposition::KeepImporting, vec!["pw1"]),
            (Disposition::KeepMaster, vec!["pw2", "pw3"]),
            (Disposition::KeepBoth, vec!["pw1", "pw2", "pw3"]),
            (Disposition::Skip, vec![]),
        ];
        for (d, expected) in cases {
            let out = reconcile(&a, &b, &mut FixedResolver(d)).unwrap();
            assert_eq!(passwords(&out.records), expected, "{d}");
            assert_eq!(out.resolutions[0].kept, expected.len());
            assert_eq!(out.count(d), 1);
        }
    }

    #[test]
    fn output_order_is_unique_then_agreeing_then_conflicts() {
        let a = idx(&[rec("conflict", "x"), rec("agree", "s"), rec("imp", "i")]);
        let b = idx(&[rec("mas", "m"), rec("agree", "s"), rec("conflict", "y")]);
        let out = reconcile(&a, &b, &mut FixedResolver(Disposition::KeepBoth)).unwrap();
        assert_eq!(passwords(&out.records), vec!["i", "m", "s", "x", "y"]);
    }

    #[test]
    fn conflicts_are_presented_in_sorted_key_order() {
        let a = idx(&[rec("zeta", "1"), rec("alpha", "1"), rec("mid", "1")]);
        let b = idx(&[rec("mid", "2"), rec("zeta", "2"), rec("alpha", "2")]);
        let mut seen = Vec::new();
        let mut record_order = |case: &ConflictCase| {
            seen.push(case.importing[0].name.clone());
            Disposition::Skip
        };
        let out = reconcile(&a, &b, &mut record_order).unwrap();
        assert!(out.is_empty());
        assert_eq!(seen, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn output_count_matches_breakdown() {
        let a = idx(&[rec("a", "1"), rec("b", "1"), rec("b", "1"), rec("c", "1")]);
        let b = idx(&[rec("b", "1"), rec("c", "2"), rec("c", "3"), rec("d", "1")]);
        let out = reconcile(&a, &b, &mut FixedResolver(Disposition::KeepMaster)).unwrap();
        let bd = &out.breakdown;
        assert_eq!(bd.total_keys(), 4);
        let kept: usize = out.resolutions.iter().map(|r| r.kept).sum();
        assert_eq!(
            out.records.len(),
            bd.importing_only.records + bd.master_only.records + bd.agreeing.records + kept
        );
        assert_eq!(out.records.len(), 1 + 1 + 2 + 2);
    }

    #[test]
    fn empty_inputs_yield_empty_result() {
        let out = reconcile(&Index::new(), &Index::new(), &mut FixedResolver(Disposition::KeepBoth))
            .unwrap();
        assert!(out.is_empty());
        assert!(out.resolutions.is_empty());
    }

    #[test]
    fn parses_menu_choices() {
        assert_eq!(" 3 \n".parse::<Disposition>().unwrap(), Disposition::KeepBoth);
        for d in Disposition::ALL {
            assert_eq!(d.menu_number().to_string().parse::<Disposition>().unwrap(), d);
        }
        assert_eq!(
            "5".parse::<Disposition>().unwrap_err(),
            MenuError::InvalidChoice("5".into())
        );
        assert!("".parse::<Disposition>().is_err());
        assert!("one".parse::<Disposition>().is_err());
    }

    #[test]
    fn resolver_error_aborts_reconciliation() {
        struct Closed;
        impl Resolver for Closed {
            fn resolve(&mut self, _: &ConflictCase, _: usize, _: usize) -> io::Result<Disposition> {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed"))
            }
        }
        let a = idx(&[rec("a", "1")]);
        let b = idx(&[rec("a", "2")]);
        assert!(reconcile(&a, &b, &mut Closed).is_err());
    }
}
