//! Minimal `index.html` for previewing the generated bindings when the serve
//! directory does not ship its own page.

use std::path::{Component, Path, PathBuf};

use crate::utils::file_system;
use crate::Error;

pub const INDEX_FILE: &str = "index.html";

/// Writes `index.html` into `serve_dir` unless one already exists.
///
/// Returns `Ok(true)` when a page was written. Skips (with a warning) when
/// `out_dir` is not inside `serve_dir`, since the server could not reach the bindings.
pub fn ensure_index(serve_dir: &Path, out_dir: &Path, out_name: &str) -> Result<bool, Error> {
    let index = serve_dir.join(INDEX_FILE);
    if index.exists() {
        log::debug!("Using existing {:?}", index);
        return Ok(false);
    }

    let Some(module_path) = module_url(serve_dir, out_dir, out_name) else {
        log::warn!(
            "Bindings directory {:?} is outside {:?}; not generating {}",
            out_dir,
            serve_dir,
            INDEX_FILE
        );
        return Ok(false);
    };

    file_system::write_file(&index, &index_html(&module_path, out_name)).map_err(Error::FileSystem)?;
    log::info!("Generated {:?}", index);
    Ok(true)
}

/// URL of the JS glue relative to the served root, e.g. `./target/wasm_example.js`.
fn module_url(serve_dir: &Path, out_dir: &Path, out_name: &str) -> Option<String> {
    let out_dir = without_cur_dir(out_dir);
    let relative = out_dir.strip_prefix(without_cur_dir(serve_dir)).ok()?;
    let mut url = String::from(".");
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                url.push('/');
                url.push_str(&part.to_string_lossy());
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    url.push('/');
    url.push_str(out_name);
    url.push_str(".js");
    Some(url)
}

/// `./examples/wasm` and `examples/wasm` name the same directory.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

fn index_html(module_path: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        html, body {{
            margin: 0;
            height: 100%;
            background: #2b2c2f;
        }}
        canvas {{
            display: block;
            margin: 0 auto;
        }}
    </style>
</head>
<body>
    <script type="module">
        import init from '{module_path}';
        init().catch((error) => {{
            // winit-based apps unwind out of init on purpose; only surface real errors.
            if (!error.message.startsWith("Using exceptions for control flow")) {{
                throw error;
            }}
        }});
    </script>
</body>
</html>
"#
    )
}
