use crate::stars::{StarDecision, Threshold};
use std::fmt;

/// What a recalculation does with one stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecountAction {
    Remove,
    Skip,
    Rerender(i16),
}

/// `recount` is `None` when the original message no longer exists.
pub fn plan_recount(
    stored: i16,
    recount: Option<i16>,
    threshold: Threshold,
    redo: bool,
) -> RecountAction {
    match recount {
        None => RecountAction::Remove,
        Some(c) if threshold.evaluate(c) == StarDecision::Below => RecountAction::Remove,
        Some(c) if c == stored && !redo => RecountAction::Skip,
        Some(c) => RecountAction::Rerender(c),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecalculateSummary {
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RecalculateSummary {
    pub fn total(&self) -> usize {
        self.updated + self.removed + self.unchanged + self.failed
    }
}

impl fmt::Display for RecalculateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Checked {} entries: {} updated, {} removed, {} unchanged, {} failed",
            self.total(),
            self.updated,
            self.removed,
            self.unchanged,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_underqualified_messages_are_removed() {
        let t = Threshold::new(3);
        assert_eq!(plan_recount(5, None, t, false), RecountAction::Remove);
        assert_eq!(plan_recount(5, Some(2), t, true), RecountAction::Remove);
    }

    #[test]
    fn unchanged_counts_are_skipped_unless_redoing() {
        let t = Threshold::new(3);
        assert_eq!(plan_recount(4, Some(4), t, false), RecountAction::Skip);
        assert_eq!(plan_recount(4, Some(4), t, true), RecountAction::Rerender(4));
        assert_eq!(plan_recount(4, Some(6), t, false), RecountAction::Rerender(6));
    }

    #[test]
    fn summary_reads_well() {
        let s = RecalculateSummary {
            updated: 2,
            removed: 1,
            unchanged: 7,
            failed: 0,
        };
        assert_eq!(
            s.to_string(),
            "Checked 10 entries: 2 updated, 1 removed, 7 unchanged, 0 failed"
        );
    }
}
