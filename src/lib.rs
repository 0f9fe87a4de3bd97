// src/lib.rs

pub mod callbacks;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod orchestrator;
pub mod project;
pub mod staleness;
pub mod types;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Result, bail};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::callbacks::BuildStatusSubscriber;
use crate::catalog::{GroupClassifier, GroupKind};
use crate::cli::{CliArgs, Command};
use crate::config::{load_and_validate, project_root_dir};
use crate::exec::{CommandExecutor, ConsoleSink};
use crate::fs::{FileSystem, RealFileSystem};
use crate::orchestrator::{Ack, BuildOrchestrator};
use crate::project::ConfiguredProject;
use crate::types::BuildOptions;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project file loading
/// - the configured project model and command executor
/// - the orchestrator
///
/// Returns `Ok(false)` when the command ran but the answer is negative
/// (outputs stale, build failed or cancelled).
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = PathBuf::from(&args.config);
    let file = load_and_validate(&config_path)?;
    let root = project_root_dir(&config_path);
    info!(config = ?config_path, root = ?root, "loaded project file");

    let classifier = GroupClassifier::new(&file.project().input_group_pattern)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let project = Arc::new(ConfiguredProject::new(file, root, Arc::clone(&fs))?);
    let executor = Arc::new(CommandExecutor::for_project(&project)?);

    let orchestrator = BuildOrchestrator::new(
        project.configuration(),
        project.clone(),
        executor,
        fs,
        Arc::new(ConsoleSink),
    )
    .with_classifier(classifier);

    match args.command {
        Command::Check => {
            let verdict = orchestrator.up_to_date_verdict();
            println!("{}: {verdict}", orchestrator.configuration());
            Ok(verdict.is_up_to_date())
        }
        Command::Build { rebuild } => {
            let options = BuildOptions { rebuild };
            run_to_completion(&orchestrator, |o| o.start_build(options)).await
        }
        Command::Clean => {
            run_to_completion(&orchestrator, |o| o.start_clean(BuildOptions::default())).await
        }
        Command::Groups => {
            print_groups(&orchestrator);
            Ok(true)
        }
    }
}

/// Subscriber that forwards the end notification to a oneshot channel.
struct CompletionSignal {
    tx: Mutex<Option<oneshot::Sender<bool>>>,
}

impl BuildStatusSubscriber for CompletionSignal {
    fn on_build_begin(&self) -> Result<bool> {
        Ok(true)
    }

    fn on_build_end(&self, success: bool) -> Result<()> {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(tx) = tx {
            let _ = tx.send(success);
        }
        Ok(())
    }
}

/// Start an operation and wait for its end notification.
async fn run_to_completion<F>(orchestrator: &BuildOrchestrator, start: F) -> Result<bool>
where
    F: FnOnce(&BuildOrchestrator) -> errors::Result<Ack>,
{
    if !orchestrator.is_build_supported() {
        bail!(
            "configuration '{}' has nothing to build (no [commands].build)",
            orchestrator.configuration()
        );
    }

    let (tx, rx) = oneshot::channel();
    let signal = Arc::new(CompletionSignal {
        tx: Mutex::new(Some(tx)),
    });
    let handle = orchestrator.add_build_status_subscriber(signal);

    let outcome = match start(orchestrator) {
        Ok(Ack::Started) => rx.await.unwrap_or(false),
        Ok(Ack::Cancelled) => false,
        Err(err) => {
            orchestrator.remove_build_status_subscriber(handle);
            return Err(err.into());
        }
    };

    orchestrator.remove_build_status_subscriber(handle);
    debug!(success = outcome, "operation finished");
    Ok(outcome)
}

/// Print each group with its classification and members.
fn print_groups(orchestrator: &BuildOrchestrator) {
    let groups = orchestrator.catalog().groups();
    println!(
        "buildgate groups ({}) for configuration '{}'",
        groups.len(),
        orchestrator.configuration()
    );
    for group in groups.iter() {
        let kind = match group.kind() {
            GroupKind::Input => "input",
            GroupKind::Output => "output",
        };
        println!("  - {} [{}] ({kind})", group.name(), group.role());
        if group.enumeration_failed() {
            println!("      <members could not be enumerated>");
        }
        for output in group.outputs() {
            match output.source_file() {
                Some(source) => println!(
                    "      {} <- {}",
                    output.canonical_path().display(),
                    source.display()
                ),
                None => println!("      {}", output.canonical_path().display()),
            }
        }
    }
}
