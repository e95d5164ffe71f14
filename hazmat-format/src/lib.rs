//! Accounting and reporting of the outcomes of a run.
//!
//! The [`ResultAggregator`](struct.ResultAggregator.html) counts the verdicts of the cases,
//! optionally keeping the history needed for the end-of-run summary, and keeps track of the
//! harness faults separately from the verdicts. The [`ui`](ui/index.html) module renders them.

#![deny(missing_docs)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod aggregator;
pub mod ui;

pub use aggregator::{
    CaseOutcome, Counts, FaultPhase, HarnessFault, ResultAggregator, SectionKind, Summary,
    SummarySection,
};
