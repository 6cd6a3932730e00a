use super::{Invocation, Step, StepKind};
use crate::app_config::Settings;

/// `cargo build --example <name>` for the wasm target.
pub struct CargoBuildStep;

impl CargoBuildStep {
    pub fn new() -> Self {
        CargoBuildStep
    }
}

impl Step for CargoBuildStep {
    fn kind(&self) -> StepKind {
        StepKind::Build
    }

    fn invocation(&self, settings: &Settings) -> Invocation {
        let mut invocation = Invocation::new(self.kind(), &settings.tools.cargo)
            .arg("build")
            .args(["--example", settings.example.as_str()])
            .args(["--target", settings.target_triple.as_str()])
            .args(["--profile", settings.profile.as_str()]);

        if settings.pass_target_dir {
            invocation = invocation
                .arg("--target-dir")
                .arg(settings.target_dir.to_string_lossy());
        }

        if !settings.features.is_empty() {
            invocation = invocation.arg("--features").arg(settings.features.join(","));
        }

        // User-supplied args go last so they can add to anything above.
        invocation.args(settings.cargo_args.iter().cloned())
    }
}
