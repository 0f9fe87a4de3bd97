// tests/staleness_property.rs

mod common;
use crate::common::{catalog_for, evaluator_for};

use buildgate::catalog::Output;
use buildgate::fs::mock::MockFileSystem;
use buildgate_test_utils::builders::{ProjectBuilder, generated};
use proptest::prelude::*;

/// One output: its last-write time (None = missing) and an optional link to
/// one of the inputs.
#[derive(Debug, Clone)]
struct OutputCase {
    modified: Option<u64>,
    source: Option<usize>,
}

fn input_path(i: usize) -> String {
    format!("/p/src/in{i}.ts")
}

fn output_path(i: usize) -> String {
    format!("/p/out/out{i}.js")
}

/// Straightforward restatement of the rule, without early exits.
fn expected_up_to_date(inputs: &[Option<u64>], outputs: &[OutputCase]) -> bool {
    if outputs.iter().any(|o| o.modified.is_none()) {
        return false;
    }

    let mut earliest_output: Option<u64> = None;
    for output in outputs {
        let modified = output.modified.unwrap_or_default();
        let linked = output
            .source
            .and_then(|i| inputs.get(i).copied().flatten());
        match linked {
            Some(source) if source > modified => return false,
            Some(_) => {}
            None => {
                earliest_output = Some(earliest_output.map_or(modified, |e| e.min(modified)));
            }
        }
    }

    let latest_input = inputs.iter().flatten().copied().max();
    match (earliest_output, latest_input) {
        (Some(earliest), Some(latest)) => latest <= earliest,
        _ => true,
    }
}

fn output_case(n_inputs: usize) -> impl Strategy<Value = OutputCase> {
    (
        prop::option::weighted(0.9, 0u64..20),
        prop::option::of(0..n_inputs.max(1)),
    )
        .prop_map(|(modified, source)| OutputCase { modified, source })
}

fn scenario() -> impl Strategy<Value = (Vec<Option<u64>>, Vec<OutputCase>)> {
    prop::collection::vec(prop::option::weighted(0.8, 0u64..20), 0..5).prop_flat_map(|inputs| {
        let n = inputs.len();
        (Just(inputs), prop::collection::vec(output_case(n), 0..5))
    })
}

proptest! {
    #[test]
    fn verdict_matches_reference_rule((inputs, outputs) in scenario()) {
        let fs = MockFileSystem::new();
        for (i, modified) in inputs.iter().enumerate() {
            if let Some(secs) = modified {
                fs.add_file(input_path(i), MockFileSystem::at(*secs));
            }
        }
        for (i, case) in outputs.iter().enumerate() {
            if let Some(secs) = case.modified {
                fs.add_file(output_path(i), MockFileSystem::at(secs));
            }
        }

        let input_paths: Vec<String> = (0..inputs.len()).map(input_path).collect();
        let input_refs: Vec<&str> = input_paths.iter().map(String::as_str).collect();
        let members: Vec<Output> = outputs
            .iter()
            .enumerate()
            .map(|(i, case)| match case.source {
                Some(src) => generated(&output_path(i), input_path(src)),
                None => Output::new(output_path(i)),
            })
            .collect();

        let mut builder = ProjectBuilder::new();
        if !input_refs.is_empty() {
            builder = builder.with_sources(&input_refs);
        }
        if !members.is_empty() {
            builder = builder.with_group("Built", members);
        }
        let catalog = catalog_for(builder.build());
        let evaluator = evaluator_for(&fs);

        let first = evaluator.is_up_to_date(&catalog);
        prop_assert_eq!(first, expected_up_to_date(&inputs, &outputs));

        // Same disk state, same answer.
        prop_assert_eq!(evaluator.is_up_to_date(&catalog), first);
    }
}
