use std::time::Duration;

use pretty_assertions::assert_eq;
use speculoos::prelude::*;

use hazmat_exec::Generator;
use hazmat_format::{FaultPhase, ResultAggregator};
use hazmat_rust::orchestrator::{BreakPolicy, LiveScratch, LoopOutcome};

mod common;
use common::{printed, TestInterface};

const SECOND: Duration = Duration::from_secs(1);

fn scratch(test: &TestInterface) -> LiveScratch {
    LiveScratch {
        input: test.path().join(".input"),
        expected: test.path().join(".expected"),
        actual: test.path().join(".actual"),
    }
}

fn seeded_generator(test: &TestInterface) -> Generator {
    let program = test.script("gen.sh", "echo $1");
    let mut generator = Generator::new(program, "");
    generator.args = vec!["{}".into()];
    generator
}

#[test]
fn test_failing_reference_is_never_charged() {
    let test = TestInterface::new();
    let sol = test.script("sol.sh", "cat");
    let reference = test.script("ref.sh", "exit 1");
    let solution = test.solution(&sol, SECOND);
    let reference = test.solution(&reference, SECOND);
    let generator = seeded_generator(&test);

    let mut orchestrator = test.orchestrator();
    let mut aggregator = ResultAggregator::new("LIVE", true);
    let outcome = orchestrator
        .run_live(
            &solution,
            &reference,
            &generator,
            Some(5),
            &scratch(&test),
            &mut aggregator,
        )
        .unwrap();
    assert_eq!(outcome, LoopOutcome::Completed);
    assert_that!(aggregator.harness_faults().len()).is_equal_to(5);
    assert!(aggregator
        .harness_faults()
        .iter()
        .all(|f| f.phase == FaultPhase::Reference));
    assert_eq!(aggregator.accepted(), 0);
    assert_eq!(aggregator.rejected(), 0);
    assert_eq!(aggregator.total(), 0);
}

#[test]
fn test_same_solutions_agree() {
    let test = TestInterface::new();
    let sol = test.script("sol.sh", "cat");
    let reference = test.script("ref.sh", "cat");
    let solution = test.solution(&sol, SECOND);
    let reference = test.solution(&reference, SECOND);
    let generator = seeded_generator(&test);

    let mut orchestrator = test.orchestrator();
    let mut aggregator = ResultAggregator::new("LIVE", true);
    orchestrator
        .run_live(
            &solution,
            &reference,
            &generator,
            Some(3),
            &scratch(&test),
            &mut aggregator,
        )
        .unwrap();
    assert_eq!(aggregator.accepted(), 3);
    let names: Vec<_> = aggregator.events().iter().map(|e| e.case.clone()).collect();
    assert_that!(names[0]).starts_with("0.in (seed ");
    assert_that!(names[2]).starts_with("2.in (seed ");
}

#[test]
fn test_break_and_save() {
    let test = TestInterface::new();
    let sol = test.script("sol.sh", "echo wrong");
    let reference = test.script("ref.sh", "cat");
    let solution = test.solution(&sol, SECOND);
    let reference = test.solution(&reference, SECOND);
    let generator = Generator::new(test.script("gen.sh", "cat"), "7 8 9");
    let save = test.path().join("saved");
    std::fs::create_dir(&save).unwrap();

    let mut orchestrator = test
        .orchestrator()
        .break_policy(BreakPolicy::Global)
        .save_dir(Some(&save));
    let mut aggregator = ResultAggregator::new("LIVE", false);
    let outcome = orchestrator
        .run_live(
            &solution,
            &reference,
            &generator,
            Some(10),
            &scratch(&test),
            &mut aggregator,
        )
        .unwrap();
    assert_eq!(outcome, LoopOutcome::Broken);
    assert_eq!(aggregator.rejected(), 1);
    assert_eq!(aggregator.total(), 1);
    assert_eq!(std::fs::read_to_string(save.join("0.in")).unwrap(), "7 8 9");
    assert!(printed(orchestrator).contains("WA"));
}

#[test]
fn test_crashing_generator() {
    let test = TestInterface::new();
    let sol = test.script("sol.sh", "cat");
    let solution = test.solution(&sol, SECOND);
    let generator = Generator::new(test.script("gen.sh", "exit 3"), "");

    let mut orchestrator = test.orchestrator();
    let mut aggregator = ResultAggregator::new("LIVE", false);
    let outcome = orchestrator
        .run_live(
            &solution,
            &solution,
            &generator,
            Some(3),
            &scratch(&test),
            &mut aggregator,
        )
        .unwrap();
    assert_eq!(outcome, LoopOutcome::Completed);
    assert_eq!(aggregator.total(), 0);
    assert_eq!(aggregator.harness_faults().len(), 3);
    assert_eq!(aggregator.harness_faults()[0].phase, FaultPhase::Generator);
}

#[test]
fn test_unbounded_until_interrupted() {
    let test = TestInterface::new();
    let sol = test.script("sol.sh", "cat");
    let solution = test.solution(&sol, SECOND);
    let generator = Generator::new(test.script("gen.sh", "echo 1"), "");

    let interrupt = test.interrupt.clone();
    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(500));
        interrupt.trigger();
    });
    let mut orchestrator = test.orchestrator();
    let mut aggregator = ResultAggregator::new("LIVE", false);
    let outcome = orchestrator
        .run_live(
            &solution,
            &solution,
            &generator,
            None,
            &scratch(&test),
            &mut aggregator,
        )
        .unwrap();
    trigger.join().unwrap();
    assert_eq!(outcome, LoopOutcome::Interrupted);
    assert_eq!(aggregator.rejected(), 0);
    assert_eq!(aggregator.accepted(), aggregator.total());
}
