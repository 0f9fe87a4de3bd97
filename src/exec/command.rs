// src/exec/command.rs

//! Executor that runs the `[commands]` of a project file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::CommandsSection;
use crate::exec::backend::{BuildExecutor, BuildRequest, CompletionCallback};
use crate::exec::runner::{CommandSpec, run_command};
use crate::fs::{FileSystem, normalize_path};
use crate::project::ConfiguredProject;
use crate::types::{BuildInProgress, BuildTarget};

/// Runs build/rebuild/clean shell commands on the tokio runtime.
///
/// Sets the project's "build in progress" flag before the command is
/// spawned and clears it right before the completion callback runs.
pub struct CommandExecutor {
    commands: CommandsSection,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    /// Directories that must exist before a (non-clean) build writes outputs.
    output_dirs: BTreeSet<PathBuf>,
    in_progress: BuildInProgress,
    runtime: Handle,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("commands", &self.commands)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl CommandExecutor {
    /// Must be called from within a tokio runtime.
    pub fn for_project(project: &ConfiguredProject) -> Result<Self> {
        let runtime =
            Handle::try_current().context("command executor needs a running tokio runtime")?;

        let output_dirs = project
            .file()
            .groups()
            .iter()
            .flat_map(|g| g.output.iter())
            .filter_map(|o| {
                normalize_path(project.root(), Path::new(&o.path))
                    .parent()
                    .map(Path::to_path_buf)
            })
            .collect();

        Ok(Self {
            commands: project.commands().clone(),
            root: project.root().to_path_buf(),
            fs: project.filesystem(),
            output_dirs,
            in_progress: project.build_in_progress(),
            runtime,
        })
    }

    fn command_for(&self, target: BuildTarget) -> Option<&str> {
        let cmd = match target {
            BuildTarget::Build | BuildTarget::Default => self.commands.build.as_ref(),
            BuildTarget::Rebuild => self
                .commands
                .rebuild
                .as_ref()
                .or(self.commands.build.as_ref()),
            BuildTarget::Clean => self.commands.clean.as_ref(),
        };
        cmd.map(String::as_str)
    }
}

impl BuildExecutor for CommandExecutor {
    fn prepare_build(&self, configuration: &str, clean: bool) -> Result<()> {
        if clean {
            debug!(%configuration, "preparing clean; nothing to set up");
            return Ok(());
        }

        for dir in self.output_dirs.iter() {
            self.fs.create_dir_all(dir)?;
        }
        debug!(
            %configuration,
            dirs = self.output_dirs.len(),
            "prepared output directories"
        );
        Ok(())
    }

    fn execute_build_async(
        &self,
        request: BuildRequest,
        on_complete: CompletionCallback,
    ) -> Result<()> {
        let target = request.target;
        let cmd = self
            .command_for(target)
            .ok_or_else(|| anyhow!("no command configured for target '{target}'"))?;

        let spec = CommandSpec {
            cmd: cmd.to_string(),
            cwd: self.root.clone(),
            target,
        };

        info!(
            configuration = %request.configuration,
            target_kind = %target,
            rebuild = request.options.rebuild,
            "dispatching build"
        );

        self.in_progress.set(true);
        let in_progress = self.in_progress.clone();
        let output = Arc::clone(&request.output);

        self.runtime.spawn(async move {
            let result = run_command(spec, output).await;
            in_progress.set(false);
            on_complete(result, target);
        });

        Ok(())
    }
}
