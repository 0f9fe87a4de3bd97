// tests/catalog.rs

mod common;
use crate::common::{catalog_for, init_tracing};

use std::sync::Arc;

use buildgate::catalog::{GroupClassifier, GroupKind, Output, OutputGroupCatalog};
use buildgate::errors::BuildgateError;
use buildgate_test_utils::builders::ProjectBuilder;

#[test]
fn groups_are_classified_by_name() {
    init_tracing();

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );

    let groups = catalog.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name(), "SourceFiles");
    assert_eq!(groups[0].kind(), GroupKind::Input);
    assert_eq!(groups[1].name(), "Built");
    assert_eq!(groups[1].role(), "BuiltProjectOutputGroup");
    assert!(!groups[1].is_input());
}

#[test]
fn default_classifier_matches_whole_name_only() {
    let classifier = GroupClassifier::default();

    assert_eq!(classifier.classify("SourceFiles"), GroupKind::Input);
    assert_eq!(classifier.classify("SourceFilesExtra"), GroupKind::Output);
    assert_eq!(classifier.classify("sourcefiles"), GroupKind::Output);
}

#[test]
fn custom_classifier_can_mark_several_input_groups() {
    init_tracing();

    let project = Arc::new(
        ProjectBuilder::new()
            .with_group("SourceFiles", vec![Output::new("/p/a.js")])
            .with_group("Content", vec![Output::new("/p/logo.png")])
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );
    let classifier = GroupClassifier::new("^(SourceFiles|Content)$").unwrap();
    let catalog = OutputGroupCatalog::new(project, classifier);

    let kinds: Vec<GroupKind> = catalog.groups().iter().map(|g| g.kind()).collect();
    assert_eq!(
        kinds,
        vec![GroupKind::Input, GroupKind::Input, GroupKind::Output]
    );
}

#[test]
fn invalid_classifier_pattern_is_rejected() {
    let err = GroupClassifier::new("(unclosed").unwrap_err();
    assert!(matches!(err, BuildgateError::InvalidPattern(_)));
}

#[test]
fn groups_are_enumerated_once_until_reset() {
    init_tracing();

    let project = Arc::new(
        ProjectBuilder::new()
            .with_sources(&["/p/a.js"])
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );
    let catalog = OutputGroupCatalog::new(project.clone(), GroupClassifier::default());

    catalog.groups();
    catalog.groups();
    catalog.find("Built");
    assert_eq!(project.enumerate_calls(), 2);

    catalog.reset();
    assert_eq!(project.enumerate_calls(), 2);

    catalog.groups();
    assert_eq!(project.enumerate_calls(), 4);
}

#[test]
fn find_looks_up_by_exact_name() {
    init_tracing();

    let catalog = catalog_for(
        ProjectBuilder::new()
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );

    let built = catalog.find("Built").expect("group present");
    assert_eq!(built.outputs(), &[Output::new("/p/out.js")]);
    assert!(catalog.find("built").is_none());
    assert!(catalog.find("Missing").is_none());
}

#[test]
fn failing_enumeration_is_flagged_and_not_memoized() {
    init_tracing();

    let project = Arc::new(
        ProjectBuilder::new()
            .with_failing_group("SourceFiles")
            .with_group("Built", vec![Output::new("/p/out.js")])
            .build(),
    );
    let catalog = OutputGroupCatalog::new(project.clone(), GroupClassifier::default());

    let groups = catalog.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name(), "SourceFiles");
    assert!(groups[0].enumeration_failed());
    assert!(groups[0].outputs().is_empty());
    assert!(!groups[1].enumeration_failed());
    assert_eq!(project.enumerate_calls(), 2);

    // The failed population is retried on the next access.
    project.recover("SourceFiles");
    let groups = catalog.groups();
    assert!(!groups[0].enumeration_failed());
    assert_eq!(project.enumerate_calls(), 4);

    // Once everything enumerated, the result is memoized again.
    catalog.groups();
    assert_eq!(project.enumerate_calls(), 4);
}

#[test]
fn empty_catalog_does_not_support_build() {
    init_tracing();

    let empty = catalog_for(ProjectBuilder::new().build());
    assert!(!empty.is_build_supported());

    let full = catalog_for(ProjectBuilder::new().with_sources(&["/p/a.js"]).build());
    assert!(full.is_build_supported());
}
