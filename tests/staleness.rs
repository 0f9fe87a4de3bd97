// tests/staleness.rs

mod common;
use crate::common::{catalog_for, evaluator_for, init_tracing};

use std::path::PathBuf;

use buildgate::catalog::Output;
use buildgate::fs::mock::MockFileSystem;
use buildgate::staleness::Verdict;
use buildgate_test_utils::builders::{ProjectBuilder, generated};

#[test]
fn project_without_groups_is_up_to_date() {
    init_tracing();

    let fs = MockFileSystem::new();
    let catalog = catalog_for(ProjectBuilder::new().build());

    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn source_file_scenario_tracks_writes_to_the_source() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![generated("/p/out.js", "/p/a.js")])
            .build(),
    );
    let evaluator = evaluator_for(&fs);

    assert!(evaluator.is_up_to_date(&catalog));

    fs.touch("/p/a.js");
    assert_eq!(
        evaluator.evaluate(&catalog),
        Verdict::SourceNewer {
            output: PathBuf::from("/p/out.js"),
            source: PathBuf::from("/p/a.js"),
        }
    );
}

#[test]
fn equal_source_and_output_times_are_up_to_date() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/p/a.js", MockFileSystem::at(10));
    fs.add_file("/p/out.js", MockFileSystem::at(10));

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![generated("/p/out.js", "/p/a.js")])
            .build(),
    );

    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn any_missing_output_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/one.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group(
                "Output",
                vec![Output::new("/p/one.js"), Output::new("/p/two.js")],
            )
            .build(),
    );

    assert_eq!(
        evaluator_for(&fs).evaluate(&catalog),
        Verdict::MissingOutput {
            path: PathBuf::from("/p/two.js")
        }
    );
}

#[test]
fn missing_output_short_circuits_the_scan() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/late.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![Output::new("/p/missing.js")])
            .with_group("Symbols", vec![Output::new("/p/late.js")])
            .build(),
    );

    assert!(!evaluator_for(&fs).is_up_to_date(&catalog));
    // Neither the later output group nor any input was stat'ed.
    assert!(fs.stat_log().is_empty());
}

#[test]
fn input_newer_than_earliest_output_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/old.js");
    fs.touch("/p/a.js");
    fs.touch("/p/new.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group(
                "Output",
                vec![Output::new("/p/old.js"), Output::new("/p/new.js")],
            )
            .build(),
    );

    assert_eq!(
        evaluator_for(&fs).evaluate(&catalog),
        Verdict::InputNewer {
            input: PathBuf::from("/p/a.js")
        }
    );
}

#[test]
fn inputs_older_than_all_outputs_are_up_to_date() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/b.js");
    fs.touch("/p/out.js");
    fs.touch("/p/out.map");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js", "/p/b.js"])
            .with_group(
                "Output",
                vec![Output::new("/p/out.js"), Output::new("/p/out.map")],
            )
            .build(),
    );

    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn input_scan_stops_at_first_newer_input() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/out.js");
    fs.touch("/p/a.js");
    fs.touch("/p/b.js");
    fs.touch("/p/c.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js", "/p/b.js", "/p/c.js"])
            .with_group("Output", vec![Output::new("/p/out.js")])
            .build(),
    );

    assert!(!evaluator_for(&fs).is_up_to_date(&catalog));
    assert_eq!(
        fs.stat_log(),
        vec![PathBuf::from("/p/out.js"), PathBuf::from("/p/a.js")]
    );
}

#[test]
fn output_that_is_also_an_input_is_not_evidence_of_staleness() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/gen.js");
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js", "/p/gen.js"])
            .with_group(
                "Output",
                vec![Output::new("/p/gen.js"), Output::new("/p/out.js")],
            )
            .build(),
    );

    // gen.js is older than a.js, but it only counts as an input.
    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn input_membership_ignores_case() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/Gen.js");
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js", "/P/GEN.JS"])
            .with_group(
                "Output",
                vec![Output::new("/p/Gen.js"), Output::new("/p/out.js")],
            )
            .build(),
    );

    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn missing_inputs_are_skipped() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js", "/p/deleted.js"])
            .with_group("Output", vec![Output::new("/p/out.js")])
            .build(),
    );

    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn unreadable_output_timestamp_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");
    fs.deny_access("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![Output::new("/p/out.js")])
            .build(),
    );

    match evaluator_for(&fs).evaluate(&catalog) {
        Verdict::UnreadableTimestamp { path, cause } => {
            assert_eq!(path, PathBuf::from("/p/out.js"));
            assert!(cause.contains("access denied"));
        }
        other => panic!("expected UnreadableTimestamp, got {other:?}"),
    }
}

#[test]
fn unreadable_source_timestamp_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");
    fs.deny_access("/p/a.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_group("Output", vec![generated("/p/out.js", "/p/a.js")])
            .build(),
    );

    assert!(!evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn dangling_source_link_falls_back_to_input_comparison() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/out.js");
    fs.touch("/p/a.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![generated("/p/out.js", "/p/gone.ts")])
            .build(),
    );

    // out.js is compared against the inputs instead, and a.js is newer.
    assert_eq!(
        evaluator_for(&fs).evaluate(&catalog),
        Verdict::InputNewer {
            input: PathBuf::from("/p/a.js")
        }
    );
}

#[test]
fn linked_outputs_do_not_constrain_unrelated_inputs() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.ts");
    fs.touch("/p/a.js");
    fs.touch("/p/b.ts");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.ts", "/p/b.ts"])
            .with_group("Output", vec![generated("/p/a.js", "/p/a.ts")])
            .build(),
    );

    // a.js is fully accounted for by its own source; with no unlinked
    // outputs the earliest output time stays unbounded.
    assert!(evaluator_for(&fs).is_up_to_date(&catalog));
}

#[test]
fn repeated_checks_agree_without_filesystem_changes() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/out.js");
    fs.touch("/p/a.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![Output::new("/p/out.js")])
            .build(),
    );
    let evaluator = evaluator_for(&fs);

    let first = evaluator.evaluate(&catalog);
    let second = evaluator.evaluate(&catalog);
    assert_eq!(first, second);
    assert!(!first.is_up_to_date());
}

#[test]
fn unreadable_input_timestamp_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");
    fs.deny_access("/p/a.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Output", vec![Output::new("/p/out.js")])
            .build(),
    );

    match evaluator_for(&fs).evaluate(&catalog) {
        Verdict::UnreadableTimestamp { path, cause } => {
            assert_eq!(path, PathBuf::from("/p/a.js"));
            assert!(cause.contains("access denied"));
        }
        other => panic!("expected UnreadableTimestamp, got {other:?}"),
    }
}

#[test]
fn failed_input_enumeration_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/out.js");
    fs.touch("/p/a.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_failing_group("SourceFiles")
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );

    assert_eq!(
        evaluator_for(&fs).evaluate(&catalog),
        Verdict::EnumerationFailed {
            group: "SourceFiles".to_string()
        }
    );
    // Decided before any timestamp was read.
    assert!(fs.stat_log().is_empty());
}

#[test]
fn failed_output_enumeration_is_stale() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.touch("/p/a.js");
    fs.touch("/p/out.js");

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Built", vec![Output::new("/p/out.js")])
            .with_failing_group("Symbols")
            .build(),
    );

    assert!(!evaluator_for(&fs).is_up_to_date(&catalog));
}
