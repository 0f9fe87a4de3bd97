#![allow(dead_code)]

use std::sync::Arc;

use buildgate::catalog::{GroupClassifier, OutputGroupCatalog};
use buildgate::fs::mock::MockFileSystem;
use buildgate::staleness::StalenessEvaluator;
use buildgate_test_utils::fake_project::FakeProject;

pub use buildgate_test_utils::init_tracing;

/// Catalog over `project` with the default `SourceFiles` classifier.
pub fn catalog_for(project: FakeProject) -> OutputGroupCatalog {
    OutputGroupCatalog::new(Arc::new(project), GroupClassifier::default())
}

pub fn evaluator_for(fs: &MockFileSystem) -> StalenessEvaluator {
    StalenessEvaluator::new(Arc::new(fs.clone()))
}
