use wasm_example_runner::Error;

fn main() {
    if let Err(e) = wasm_example_runner::run() {
        let code = e.exit_code();
        match &e {
            // The tool already printed its own diagnostics.
            Error::StepFailed { .. } => log::debug!("{}", e),
            Error::ToolNotFound(_) => eprintln!("Error: {}", e),
            Error::Config(msg) => eprintln!("Error: Configuration issue: {}", msg),
            Error::Io(io_err) => eprintln!("Error: A file system I/O error occurred: {}", io_err),
            Error::FileSystem(msg) => eprintln!("Error: File system operation failed: {}", msg),
            Error::Json(json_err) => eprintln!("Error: {}", json_err),
        }
        std::process::exit(code);
    }
}
