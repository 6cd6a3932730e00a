use super::{Invocation, Step, StepKind};
use crate::app_config::Settings;

/// Optimizes the bindgen output in place for size.
pub struct WasmOptStep;

impl WasmOptStep {
    pub fn new() -> Self {
        WasmOptStep
    }
}

impl Step for WasmOptStep {
    fn kind(&self) -> StepKind {
        StepKind::Optimize
    }

    fn invocation(&self, settings: &Settings) -> Invocation {
        let wasm = settings.bindgen_wasm_path().to_string_lossy().to_string();
        Invocation::new(self.kind(), &settings.tools.wasm_opt)
            .arg("-Oz")
            .args(["-o", wasm.as_str()])
            .arg(wasm)
    }
}
