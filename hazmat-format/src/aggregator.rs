use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use hazmat_exec::TerminationStatus;

/// The verdict on a single case. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    /// How the solution ended. `Ok` for the cases that reached the comparator.
    pub status: TerminationStatus,
    /// The name of the case, usually the path of its input.
    pub case: String,
    /// Wall-clock seconds of the solution.
    pub duration: f64,
    /// Whether the comparator accepted the output. Always false when `status` is not `Ok`.
    pub accepted: bool,
}

/// The part of the test setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPhase {
    /// The generator crashed.
    Generator,
    /// The reference solution did not exit cleanly.
    Reference,
    /// The comparator did not finish in time.
    Comparator,
}

impl Display for FaultPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultPhase::Generator => write!(f, "generator"),
            FaultPhase::Reference => write!(f, "reference solution"),
            FaultPhase::Comparator => write!(f, "comparator"),
        }
    }
}

/// A failure of the test setup on a case. Never charged to the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessFault {
    /// The case being processed.
    pub case: String,
    /// What failed.
    pub phase: FaultPhase,
    /// Human readable details.
    pub detail: String,
}

/// The counters of an aggregator, without the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    /// Cases accepted by the comparator.
    pub accepted: usize,
    /// Cases rejected by the comparator.
    pub rejected: usize,
    /// Cases where the solution did not exit cleanly, by status.
    pub errors: BTreeMap<TerminationStatus, usize>,
}

impl Counts {
    /// The number of cases counted.
    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.errors.values().sum::<usize>()
    }
}

/// The groups of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Accepted cases.
    Accepted,
    /// Rejected cases.
    Rejected,
    /// Timed out cases.
    Timeout,
    /// Every other non clean exit.
    Other,
}

/// A group of cases in a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySection {
    /// Which group.
    pub kind: SectionKind,
    /// The cases of the group, in the order they were recorded.
    pub cases: Vec<CaseOutcome>,
}

/// The end-of-run summary: the sections are always in the order accepted, rejected, timeout, other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// The non-empty sections allowed by the level.
    pub sections: Vec<SummarySection>,
}

/// Accumulates the outcomes of the cases of a run.
///
/// `accepted + rejected + sum(errors)` is always the number of `record_result`/`record_error`
/// calls. The history is kept only when `store` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultAggregator {
    /// A name for the reports, e.g. the test directory.
    pub name: String,
    /// Whether to keep the history of the cases.
    pub store: bool,
    counts: Counts,
    events: Vec<CaseOutcome>,
    harness_faults: Vec<HarnessFault>,
}

impl ResultAggregator {
    /// A new empty aggregator.
    pub fn new<S: Into<String>>(name: S, store: bool) -> ResultAggregator {
        ResultAggregator {
            name: name.into(),
            store,
            ..Default::default()
        }
    }

    /// Record a case where the solution did not exit cleanly. `status` is never `Ok`.
    pub fn record_error<S: Into<String>>(
        &mut self,
        case: S,
        duration: f64,
        status: TerminationStatus,
    ) -> CaseOutcome {
        debug_assert!(!status.is_ok(), "record_error called with an OK status");
        *self.counts.errors.entry(status).or_default() += 1;
        self.push(CaseOutcome {
            status,
            case: case.into(),
            duration,
            accepted: false,
        })
    }

    /// Record a case where the solution exited cleanly and the comparator decided.
    pub fn record_result<S: Into<String>>(
        &mut self,
        case: S,
        duration: f64,
        accepted: bool,
    ) -> CaseOutcome {
        if accepted {
            self.counts.accepted += 1;
        } else {
            self.counts.rejected += 1;
        }
        self.push(CaseOutcome {
            status: TerminationStatus::Ok,
            case: case.into(),
            duration,
            accepted,
        })
    }

    /// Record a failure of the test setup. It does not change the counters.
    pub fn record_harness_fault<S: Into<String>, D: Into<String>>(
        &mut self,
        case: S,
        phase: FaultPhase,
        detail: D,
    ) {
        let fault = HarnessFault {
            case: case.into(),
            phase,
            detail: detail.into(),
        };
        trace!("Harness fault: {:?}", fault);
        self.harness_faults.push(fault);
    }

    fn push(&mut self, outcome: CaseOutcome) -> CaseOutcome {
        if self.store {
            self.events.push(outcome.clone());
        }
        outcome
    }

    /// Combine two aggregators: the counters are summed, the histories and the faults are
    /// concatenated, `self` first.
    pub fn merge(&self, other: &ResultAggregator) -> ResultAggregator {
        let mut errors = self.counts.errors.clone();
        for (status, count) in &other.counts.errors {
            *errors.entry(*status).or_default() += count;
        }
        ResultAggregator {
            name: self.name.clone(),
            store: self.store || other.store,
            counts: Counts {
                accepted: self.counts.accepted + other.counts.accepted,
                rejected: self.counts.rejected + other.counts.rejected,
                errors,
            },
            events: self
                .events
                .iter()
                .chain(other.events.iter())
                .cloned()
                .collect(),
            harness_faults: self
                .harness_faults
                .iter()
                .chain(other.harness_faults.iter())
                .cloned()
                .collect(),
        }
    }

    /// The counters.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    /// Number of accepted cases.
    pub fn accepted(&self) -> usize {
        self.counts.accepted
    }

    /// Number of rejected cases.
    pub fn rejected(&self) -> usize {
        self.counts.rejected
    }

    /// Number of cases that ended with `status`.
    pub fn errors(&self, status: TerminationStatus) -> usize {
        self.counts.errors.get(&status).copied().unwrap_or(0)
    }

    /// Number of cases counted.
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// The history of the cases, empty unless `store` is set.
    pub fn events(&self) -> &[CaseOutcome] {
        &self.events
    }

    /// The failures of the test setup.
    pub fn harness_faults(&self) -> &[HarnessFault] {
        &self.harness_faults
    }

    /// Build the summary for a verbosity level: accepted cases are listed with `level > 2`, rejected
    /// ones with `level > 1`, timeouts and the other failures with `level > 0`.
    pub fn summary(&self, level: u8) -> Summary {
        let mut sections = vec![];
        let mut section = |kind, filter: &dyn Fn(&CaseOutcome) -> bool| {
            sections.push(SummarySection {
                kind,
                cases: self.events.iter().filter(|e| filter(e)).cloned().collect(),
            })
        };
        if self.counts.accepted > 0 && level > 2 {
            section(SectionKind::Accepted, &|e: &CaseOutcome| e.status.is_ok() && e.accepted);
        }
        if self.counts.rejected > 0 && level > 1 {
            section(SectionKind::Rejected, &|e: &CaseOutcome| e.status.is_ok() && !e.accepted);
        }
        if level > 0 {
            if self.errors(TerminationStatus::Timeout) > 0 {
                section(SectionKind::Timeout, &|e: &CaseOutcome| {
                    e.status == TerminationStatus::Timeout
                });
            }
            let others = self
                .counts
                .errors
                .keys()
                .any(|s| *s != TerminationStatus::Timeout);
            if others {
                section(SectionKind::Other, &|e: &CaseOutcome| {
                    !e.status.is_ok() && e.status != TerminationStatus::Timeout
                });
            }
        }
        Summary { sections }
    }
}
