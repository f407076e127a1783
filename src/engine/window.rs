// Threshold Windows
//
// AND, OR, GT and LT all reduce to one question: does the number of true
// children land inside an inclusive window? The window also tells the
// evaluator when the answer is settled before every child has reported.
use crate::engine::circuit::{GateKind, ThresholdKind};

/// Inclusive bounds on the true and false child counts of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountWindow {
    pub min_true: i64,
    pub max_true: i64,
    pub min_false: i64,
    pub max_false: i64,
}

/// What to do with a counting gate before submitting any child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// The result is known without looking at the children.
    Constant(bool),
    /// Count child results against the window.
    Count(CountWindow),
}

/// Running child counts of one gate evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub trues: i64,
    pub falses: i64,
}

impl Tally {
    pub fn record(&mut self, value: bool) {
        if value {
            self.trues += 1;
        } else {
            self.falses += 1;
        }
    }
}

// Child counts beyond i64 are not representable in memory anyway.
fn width(children: usize) -> i64 {
    i64::try_from(children).unwrap_or(i64::MAX)
}

pub fn plan_gate(kind: GateKind, children: usize) -> Plan {
    let n = width(children);
    let window = match kind {
        GateKind::And => CountWindow {
            min_true: n,
            max_true: n,
            min_false: 0,
            max_false: 0,
        },
        GateKind::Or => CountWindow {
            min_true: 1,
            max_true: n,
            min_false: 0,
            max_false: n - 1,
        },
    };
    Plan::Count(window)
}

pub fn plan_threshold(kind: ThresholdKind, threshold: i64, children: usize) -> Plan {
    let n = width(children);
    match kind {
        ThresholdKind::Lt if threshold <= 0 => Plan::Constant(false),
        ThresholdKind::Gt if threshold >= n => Plan::Constant(false),
        ThresholdKind::Lt if threshold > n => Plan::Constant(true),
        ThresholdKind::Gt => Plan::Count(CountWindow {
            min_true: threshold.saturating_add(1),
            max_true: n,
            min_false: 0,
            max_false: n.saturating_sub(threshold).saturating_sub(1),
        }),
        ThresholdKind::Lt => Plan::Count(CountWindow {
            min_true: 0,
            max_true: threshold - 1,
            min_false: n - threshold + 1,
            max_false: n,
        }),
    }
}

impl CountWindow {
    fn satisfied(&self, tally: Tally) -> bool {
        tally.trues >= self.min_true && tally.falses >= self.min_false
    }

    fn overflowed(&self, tally: Tally) -> bool {
        tally.trues > self.max_true || tally.falses > self.max_false
    }

    /// The gate's value, if the counts so far already decide it.
    pub fn decide(&self, tally: Tally) -> Option<bool> {
        if self.overflowed(tally) || self.satisfied(tally) {
            Some(self.satisfied(tally))
        } else {
            None
        }
    }

    /// The gate's value once every child has reported.
    pub fn settle(&self, tally: Tally) -> bool {
        !self.overflowed(tally) && self.satisfied(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(plan: Plan) -> CountWindow {
        match plan {
            Plan::Count(window) => window,
            Plan::Constant(value) => panic!("expected a window, got constant {value}"),
        }
    }

    #[test]
    fn test_window_table() {
        let and = window(plan_gate(GateKind::And, 4));
        assert_eq!((and.min_true, and.max_true, and.min_false, and.max_false), (4, 4, 0, 0));

        let or = window(plan_gate(GateKind::Or, 4));
        assert_eq!((or.min_true, or.max_true, or.min_false, or.max_false), (1, 4, 0, 3));

        let gt = window(plan_threshold(ThresholdKind::Gt, 2, 5));
        assert_eq!((gt.min_true, gt.max_true, gt.min_false, gt.max_false), (3, 5, 0, 2));

        let lt = window(plan_threshold(ThresholdKind::Lt, 2, 5));
        assert_eq!((lt.min_true, lt.max_true, lt.min_false, lt.max_false), (0, 1, 4, 5));
    }

    #[test]
    fn test_constant_shortcuts() {
        assert_eq!(plan_threshold(ThresholdKind::Lt, 0, 3), Plan::Constant(false));
        assert_eq!(plan_threshold(ThresholdKind::Lt, -2, 3), Plan::Constant(false));
        assert_eq!(plan_threshold(ThresholdKind::Gt, 3, 3), Plan::Constant(false));
        assert_eq!(plan_threshold(ThresholdKind::Gt, 7, 3), Plan::Constant(false));
        assert_eq!(plan_threshold(ThresholdKind::Lt, 4, 3), Plan::Constant(true));
        // LT(0) over zero children is still the k <= 0 shortcut
        assert_eq!(plan_threshold(ThresholdKind::Lt, 0, 0), Plan::Constant(false));
    }

    #[test]
    fn test_and_exits_on_first_false() {
        let and = window(plan_gate(GateKind::And, 3));
        let mut tally = Tally::default();
        tally.record(true);
        assert_eq!(and.decide(tally), None);
        tally.record(false);
        assert_eq!(and.decide(tally), Some(false));
    }

    #[test]
    fn test_or_waits_for_every_false() {
        let or = window(plan_gate(GateKind::Or, 2));
        let mut tally = Tally::default();
        tally.record(false);
        assert_eq!(or.decide(tally), None);
        tally.record(false);
        assert_eq!(or.decide(tally), Some(false));
    }

    #[test]
    fn test_settle_empty_gates() {
        let and = window(plan_gate(GateKind::And, 0));
        assert!(and.settle(Tally::default()));
        let or = window(plan_gate(GateKind::Or, 0));
        assert!(!or.settle(Tally::default()));
    }

    #[test]
    fn test_windows_match_counting_semantics() {
        for n in 0..=6usize {
            for k in -1..=(n as i64 + 1) {
                for trues in 0..=n as i64 {
                    let tally = Tally {
                        trues,
                        falses: n as i64 - trues,
                    };
                    let gt = match plan_threshold(ThresholdKind::Gt, k, n) {
                        Plan::Constant(value) => value,
                        Plan::Count(window) => window.settle(tally),
                    };
                    assert_eq!(gt, trues > k, "GT({k}) with {trues}/{n} true");
                    let lt = match plan_threshold(ThresholdKind::Lt, k, n) {
                        Plan::Constant(value) => value,
                        Plan::Count(window) => window.settle(tally),
                    };
                    assert_eq!(lt, trues < k, "LT({k}) with {trues}/{n} true");
                }
            }
        }
    }
}
