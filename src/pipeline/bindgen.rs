use super::{Invocation, Step, StepKind};
use crate::app_config::Settings;
use crate::utils::file_system;
use crate::Error;

/// Generates the JS glue (and TypeScript declarations) for the built example.
pub struct BindgenStep;

impl BindgenStep {
    pub fn new() -> Self {
        BindgenStep
    }
}

impl Step for BindgenStep {
    fn kind(&self) -> StepKind {
        StepKind::Bind
    }

    fn invocation(&self, settings: &Settings) -> Invocation {
        let mut invocation = Invocation::new(self.kind(), &settings.tools.wasm_bindgen)
            .arg("--out-dir")
            .arg(settings.out_dir.to_string_lossy())
            .args(["--out-name", settings.out_name.as_str()])
            .args(["--target", settings.bindgen_target.as_str()]);

        if !settings.typescript {
            invocation = invocation.arg("--no-typescript");
        }

        invocation.arg(settings.artifact_path().to_string_lossy())
    }

    fn prepare(&self, settings: &Settings) -> Result<(), Error> {
        file_system::ensure_dir_exists(&settings.out_dir).map_err(Error::FileSystem)
    }

    fn finish(&self, settings: &Settings) -> Result<(), Error> {
        let js = settings.bindgen_js_path();
        if !js.exists() {
            log::warn!("wasm-bindgen succeeded but {:?} was not found. Check --out-name.", js);
            return Ok(());
        }

        for file in file_system::list_files_with_extension(&settings.out_dir, "js").map_err(Error::FileSystem)? {
            log::debug!("Generated {:?}", file);
        }
        log::info!("Bindings written to {:?}", settings.out_dir);
        Ok(())
    }
}
