use clap::Parser;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "wasm-example.toml";

pub const DEFAULT_PROFILE: &str = "release";
pub const DEFAULT_TARGET_TRIPLE: &str = "wasm32-unknown-unknown";
pub const DEFAULT_TARGET_DIR: &str = "target";
pub const DEFAULT_OUT_DIR: &str = "examples/wasm/target";
pub const DEFAULT_OUT_NAME: &str = "wasm_example";
pub const DEFAULT_BINDGEN_TARGET: &str = "web";
pub const DEFAULT_SERVE_DIR: &str = "examples/wasm";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Build a cargo example for WebAssembly, generate its bindings and serve it", long_about = None)]
pub struct AppConfig {
    /// Name of the cargo example to build
    #[clap(value_parser)]
    pub example: String,

    /// Extra arguments forwarded to `cargo build`
    #[clap(last = true, value_parser)]
    pub cargo_args: Vec<String>,

    /// Cargo profile to build with [default: release]
    #[clap(long, value_parser)]
    pub profile: Option<String>,

    /// Comma-separated cargo features
    #[clap(long, value_parser)]
    pub features: Option<String>,

    /// Compilation target [default: wasm32-unknown-unknown]
    #[clap(long, value_parser)]
    pub target_triple: Option<String>,

    /// Cargo target directory [default: $CARGO_TARGET_DIR or target]
    #[clap(long, value_parser)]
    pub target_dir: Option<PathBuf>,

    /// Output directory for the generated bindings [default: examples/wasm/target]
    #[clap(long, value_parser)]
    pub out_dir: Option<PathBuf>,

    /// Base name of the generated bindings [default: wasm_example]
    #[clap(long, value_parser)]
    pub out_name: Option<String>,

    /// wasm-bindgen output flavour (web, bundler, nodejs, no-modules, deno) [default: web]
    #[clap(long, value_parser)]
    pub bindgen_target: Option<String>,

    /// Skip the TypeScript declaration files
    #[clap(long)]
    pub no_typescript: bool,

    /// Directory served over HTTP [default: examples/wasm]
    #[clap(long, value_parser)]
    pub serve_dir: Option<PathBuf>,

    /// Listen address for the static server
    #[clap(long, value_parser)]
    pub addr: Option<String>,

    /// Shrink the generated wasm with wasm-opt before serving
    #[clap(long)]
    pub optimize: bool,

    /// Stop after the bindings are generated
    #[clap(long)]
    pub no_serve: bool,

    /// Verify every required tool is installed before running anything
    #[clap(long)]
    pub check_tools: bool,

    /// Print the planned commands as JSON and exit
    #[clap(long)]
    pub dry_run: bool,

    /// Path to a TOML config file
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,
}

impl AppConfig {
    pub fn new() -> Self {
        AppConfig::parse()
    }
}

/// Programs invoked for each step, overridable from the config file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
    pub cargo: String,
    pub wasm_bindgen: String,
    pub wasm_opt: String,
    pub server: String,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            cargo: "cargo".to_string(),
            wasm_bindgen: "wasm-bindgen".to_string(),
            wasm_opt: "wasm-opt".to_string(),
            server: "basic-http-server".to_string(),
        }
    }
}

/// Contents of `wasm-example.toml`. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub profile: Option<String>,
    pub features: Vec<String>,
    pub target_triple: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub out_name: Option<String>,
    pub bindgen_target: Option<String>,
    pub typescript: Option<bool>,
    pub serve_dir: Option<PathBuf>,
    pub addr: Option<String>,
    pub optimize: Option<bool>,
    pub tools: Tools,
}

impl FileConfig {
    pub fn parse(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Loads the config file. An explicit path must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        Self::load_from(Path::new("."), explicit)
    }

    /// Like [`FileConfig::load`], looking for the default file in `dir`.
    pub fn load_from(dir: &Path, explicit: Option<&Path>) -> Result<Self, Error> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config(format!("Config file {:?} does not exist.", path)));
                }
                path.to_path_buf()
            }
            None => {
                let default = dir.join(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    return Ok(FileConfig::default());
                }
                default
            }
        };

        log::debug!("Reading config file {:?}", path);
        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents)
    }
}

/// Target dir cargo picks up from the environment: `CARGO_TARGET_DIR`, then `CARGO_BUILD_TARGET_DIR`.
///
/// `build.target-dir` in `.cargo/config.toml` is not read; pass `--target-dir` in that case.
pub fn env_target_dir(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    ["CARGO_TARGET_DIR", "CARGO_BUILD_TARGET_DIR"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Fully resolved settings: command line over config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub example: String,
    pub cargo_args: Vec<String>,
    pub profile: String,
    pub features: Vec<String>,
    pub target_triple: String,
    pub target_dir: PathBuf,
    /// Set when the target dir was chosen by us and must be passed to cargo.
    pub pass_target_dir: bool,
    pub out_dir: PathBuf,
    pub out_name: String,
    pub bindgen_target: String,
    pub typescript: bool,
    pub serve_dir: PathBuf,
    pub addr: Option<String>,
    pub optimize: bool,
    pub serve: bool,
    pub tools: Tools,
}

impl Settings {
    pub fn resolve(cli: AppConfig, file: FileConfig, env_target_dir: Option<PathBuf>) -> Result<Self, Error> {
        if cli.example.trim().is_empty() {
            return Err(Error::Config("Example name must not be empty.".to_string()));
        }

        let features = match &cli.features {
            Some(list) => list
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
            None => file.features,
        };

        let explicit_target_dir = cli.target_dir.or(file.target_dir);
        let pass_target_dir = explicit_target_dir.is_some();
        let target_dir = explicit_target_dir
            .or(env_target_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR));

        let out_name = cli.out_name.or(file.out_name).unwrap_or_else(|| DEFAULT_OUT_NAME.to_string());
        if out_name.contains(['/', '\\']) {
            return Err(Error::Config(format!("Output name {:?} must not contain a path separator.", out_name)));
        }
        // Spliced into the generated index.html and its module import.
        if out_name.contains(['\'', '"', '`', '<', '>', '&']) {
            return Err(Error::Config(format!("Output name {:?} must not contain quotes or markup characters.", out_name)));
        }

        Ok(Settings {
            example: cli.example,
            cargo_args: cli.cargo_args,
            profile: cli.profile.or(file.profile).unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            features,
            target_triple: cli
                .target_triple
                .or(file.target_triple)
                .unwrap_or_else(|| DEFAULT_TARGET_TRIPLE.to_string()),
            target_dir,
            pass_target_dir,
            out_dir: cli.out_dir.or(file.out_dir).unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            out_name,
            bindgen_target: cli
                .bindgen_target
                .or(file.bindgen_target)
                .unwrap_or_else(|| DEFAULT_BINDGEN_TARGET.to_string()),
            typescript: !cli.no_typescript && file.typescript.unwrap_or(true),
            serve_dir: cli.serve_dir.or(file.serve_dir).unwrap_or_else(|| PathBuf::from(DEFAULT_SERVE_DIR)),
            addr: cli.addr.or(file.addr),
            optimize: cli.optimize || file.optimize.unwrap_or(false),
            serve: !cli.no_serve,
            tools: file.tools,
        })
    }

    /// Directory cargo writes the profile's output into.
    pub fn profile_dir(&self) -> &str {
        match self.profile.as_str() {
            "dev" | "test" => "debug",
            "bench" => "release",
            other => other,
        }
    }

    /// Path of the compiled example, e.g. `target/wasm32-unknown-unknown/release/examples/hello.wasm`.
    pub fn artifact_path(&self) -> PathBuf {
        self.target_dir
            .join(&self.target_triple)
            .join(self.profile_dir())
            .join("examples")
            .join(format!("{}.wasm", self.example))
    }

    /// The `_bg.wasm` file wasm-bindgen writes next to the JS glue.
    pub fn bindgen_wasm_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_bg.wasm", self.out_name))
    }

    pub fn bindgen_js_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.js", self.out_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> AppConfig {
        let mut argv = vec!["wasm_example_runner"];
        argv.extend_from_slice(args);
        AppConfig::try_parse_from(argv).expect("valid command line")
    }

    #[test]
    fn defaults_match_the_wasm_example_layout() {
        let settings = Settings::resolve(cli(&["hello"]), FileConfig::default(), None).unwrap();
        assert_eq!(settings.profile, "release");
        assert_eq!(settings.target_triple, "wasm32-unknown-unknown");
        assert_eq!(settings.target_dir, PathBuf::from("target"));
        assert!(!settings.pass_target_dir);
        assert_eq!(settings.out_dir, PathBuf::from("examples/wasm/target"));
        assert_eq!(settings.out_name, "wasm_example");
        assert_eq!(settings.serve_dir, PathBuf::from("examples/wasm"));
        assert!(settings.typescript);
        assert!(settings.serve);
        assert!(!settings.optimize);
        assert_eq!(settings.tools, Tools::default());
    }

    #[test]
    fn artifact_path_is_derived_from_example_name() {
        let settings = Settings::resolve(cli(&["hello"]), FileConfig::default(), None).unwrap();
        assert_eq!(
            settings.artifact_path(),
            PathBuf::from("target/wasm32-unknown-unknown/release/examples/hello.wasm")
        );

        let dev = Settings::resolve(cli(&["hello", "--profile", "dev"]), FileConfig::default(), None).unwrap();
        assert_eq!(
            dev.artifact_path(),
            PathBuf::from("target/wasm32-unknown-unknown/debug/examples/hello.wasm")
        );
    }

    #[test]
    fn command_line_wins_over_config_file() {
        let file = FileConfig::parse(
            r#"
            profile = "wasm"
            features = ["webgl2"]
            out_name = "from_file"
            optimize = true
            typescript = false

            [tools]
            server = "miniserve"
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(
            cli(&["hello", "--profile", "dev", "--features", "webgpu,x11"]),
            file,
            None,
        )
        .unwrap();

        assert_eq!(settings.profile, "dev");
        assert_eq!(settings.features, vec!["webgpu", "x11"]);
        assert_eq!(settings.out_name, "from_file");
        assert!(settings.optimize);
        assert!(!settings.typescript);
        assert_eq!(settings.tools.server, "miniserve");
        assert_eq!(settings.tools.cargo, "cargo");
    }

    #[test]
    fn cargo_target_dir_is_only_a_fallback() {
        let from_env = Settings::resolve(cli(&["hello"]), FileConfig::default(), Some(PathBuf::from("/tmp/tgt"))).unwrap();
        assert_eq!(from_env.target_dir, PathBuf::from("/tmp/tgt"));
        assert!(!from_env.pass_target_dir);

        let explicit = Settings::resolve(
            cli(&["hello", "--target-dir", "build"]),
            FileConfig::default(),
            Some(PathBuf::from("/tmp/tgt")),
        )
        .unwrap();
        assert_eq!(explicit.target_dir, PathBuf::from("build"));
        assert!(explicit.pass_target_dir);
    }

    #[test]
    fn trailing_arguments_are_forwarded_to_cargo() {
        let settings =
            Settings::resolve(cli(&["hello", "--", "--locked", "-j2"]), FileConfig::default(), None).unwrap();
        assert_eq!(settings.cargo_args, vec!["--locked", "-j2"]);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let err = FileConfig::parse("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_default_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileConfig::load_from(dir.path(), None).unwrap(), FileConfig::default());
    }

    #[test]
    fn default_config_file_is_read_from_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "out_name = \"game\"\n[tools]\nserver = \"miniserve\"\n").unwrap();

        let file = FileConfig::load_from(dir.path(), None).unwrap();
        assert_eq!(file.out_name.as_deref(), Some("game"));
        assert_eq!(file.tools.server, "miniserve");
    }

    #[test]
    fn explicit_config_file_wins_over_the_default_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "profile = \"dev\"").unwrap();
        let other = dir.path().join("ci.toml");
        fs::write(&other, "profile = \"wasm\"").unwrap();

        let file = FileConfig::load_from(dir.path(), Some(&other)).unwrap();
        assert_eq!(file.profile.as_deref(), Some("wasm"));
    }

    #[test]
    fn target_dir_env_precedence() {
        let env = |vars: &'static [(&'static str, &'static str)]| {
            env_target_dir(move |name| {
                vars.iter().find(|(k, _)| *k == name).map(|(_, v)| OsString::from(*v))
            })
        };

        assert_eq!(env(&[]), None);
        assert_eq!(env(&[("CARGO_BUILD_TARGET_DIR", "/b")]), Some(PathBuf::from("/b")));
        assert_eq!(
            env(&[("CARGO_TARGET_DIR", "/a"), ("CARGO_BUILD_TARGET_DIR", "/b")]),
            Some(PathBuf::from("/a"))
        );
        assert_eq!(
            env(&[("CARGO_TARGET_DIR", ""), ("CARGO_BUILD_TARGET_DIR", "/b")]),
            Some(PathBuf::from("/b"))
        );
    }

    #[test]
    fn out_name_with_quotes_is_rejected() {
        for name in ["it's", "a\"b", "<x>"] {
            let err = Settings::resolve(cli(&["hello", "--out-name", name]), FileConfig::default(), None).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{name} should be rejected");
        }
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let err = FileConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn out_name_with_separator_is_rejected() {
        let err = Settings::resolve(cli(&["hello", "--out-name", "a/b"]), FileConfig::default(), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
