use std::collections::HashMap;
use std::fs;
use std::process::Command;

use anyhow::{Context, Result, anyhow, bail};
use camino::Utf8Path;
use gtmpl::{Template, Value};

/// Parse a Go `text/template` source. `name` only shows up in error messages.
pub fn parse_template(name: &str, src: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(src)
        .map_err(|e| anyhow!("parsing {name} template: {e}"))?;
    Ok(template)
}

/// Render `template` with `values` as the dot, so `{{.Key}}` looks up `Key`.
pub fn render_template(
    name: &str,
    template: &Template,
    values: &[(&str, &str)],
) -> Result<String> {
    let data: HashMap<String, String> = values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    template
        .render(&gtmpl::Context::from(Value::from(data)))
        .map_err(|e| anyhow!("rendering {name} template: {e}"))
}

/// Run `cmd` to completion with inherited stdio and fail on a nonzero exit.
pub fn run_command(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!("running {cmd:?}");

    let status = cmd
        .status()
        .with_context(|| format!("spawning {program}"))?;
    if !status.success() {
        bail!("{program} failed: {status}");
    }
    Ok(())
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write_file(path: &Utf8Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {path}"))?;
    tracing::debug!("wrote {path} ({} bytes)", contents.len());
    Ok(())
}
