//! Docker-backed container runtime
//!
//! Builds the target tree's Dockerfile, runs the container detached with the
//! target port published, and executes generated test files as Python
//! scripts. When a test must run against a different port (source-app
//! validation), a port-rewired copy of the test file is executed instead of
//! mutating the original.

use async_trait::async_trait;
use recast_engine::{ContainerRuntime, RunOutcome};
use recast_fs::find_and_replace;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Shells out to the local Docker daemon.
pub struct DockerRuntime {
    image_tag: String,
    container_name: String,
    target_port: u16,
}

impl DockerRuntime {
    /// Create a runtime publishing `target_port`.
    pub fn new(target_port: u16) -> Self {
        Self {
            image_tag: "recast-target".to_string(),
            container_name: "recast-target".to_string(),
            target_port,
        }
    }

    async fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> RunOutcome {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        match command.output().await {
            Ok(output) if output.status.success() => RunOutcome::Success,
            Ok(output) => RunOutcome::Failure(format!(
                "{program} {} exited with {}\nstdout:\n{}\nstderr:\n{}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            )),
            Err(e) => RunOutcome::Failure(format!("failed to spawn {program}: {e}")),
        }
    }

    /// Copy the test file with the target port swapped for `port`.
    fn rewire_port(&self, test_file: &Path, port: u16) -> Result<PathBuf, String> {
        let rewired = test_file.with_extension(format!("port{port}.py"));
        std::fs::copy(test_file, &rewired).map_err(|e| e.to_string())?;
        find_and_replace(
            &rewired,
            &format!(":{}", self.target_port),
            &format!(":{port}"),
        )
        .map_err(|e| e.to_string())?;
        Ok(rewired)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn build_and_start(&self, target_dir: &Path) -> RunOutcome {
        let build = self
            .run("docker", &["build", "-t", &self.image_tag, "."], Some(target_dir))
            .await;
        if !build.is_success() {
            return build;
        }

        // A previous container with our name may still be around.
        let _ = self
            .run("docker", &["rm", "-f", &self.container_name], None)
            .await;

        let publish = format!("{0}:{0}", self.target_port);
        self.run(
            "docker",
            &[
                "run",
                "-d",
                "--name",
                &self.container_name,
                "-p",
                &publish,
                &self.image_tag,
            ],
            None,
        )
        .await
    }

    async fn run_test(&self, test_file: &Path, port: u16) -> RunOutcome {
        let path = if port == self.target_port {
            test_file.to_path_buf()
        } else {
            match self.rewire_port(test_file, port) {
                Ok(path) => path,
                Err(e) => return RunOutcome::Failure(format!("failed to rewire test port: {e}")),
            }
        };
        let Some(path_str) = path.to_str() else {
            return RunOutcome::Failure("test path is not valid UTF-8".to_string());
        };
        self.run("python3", &[path_str], None).await
    }
}
