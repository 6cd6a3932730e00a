use super::{Invocation, Step, StepKind};
use crate::app_config::Settings;
use crate::utils::file_system;
use crate::webpage;
use crate::Error;

/// Serves the preview directory until interrupted.
pub struct StaticServerStep;

impl StaticServerStep {
    pub fn new() -> Self {
        StaticServerStep
    }
}

impl Step for StaticServerStep {
    fn kind(&self) -> StepKind {
        StepKind::Serve
    }

    fn invocation(&self, settings: &Settings) -> Invocation {
        let mut invocation = Invocation::new(self.kind(), &settings.tools.server);
        if let Some(addr) = &settings.addr {
            invocation = invocation.args(["--addr", addr.as_str()]);
        }
        invocation.arg(settings.serve_dir.to_string_lossy())
    }

    fn prepare(&self, settings: &Settings) -> Result<(), Error> {
        file_system::ensure_dir_exists(&settings.serve_dir).map_err(Error::FileSystem)?;
        webpage::ensure_index(&settings.serve_dir, &settings.out_dir, &settings.out_name)?;
        match &settings.addr {
            Some(addr) => log::info!("Serving {:?} at http://{}", settings.serve_dir, addr),
            None => log::info!("Serving {:?}, press Ctrl-C to stop", settings.serve_dir),
        }
        Ok(())
    }
}
