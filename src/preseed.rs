//! Rendering of the Debian installer preseed file.
//!
//! The user supplies the template; it may reference `SSHUsername` and
//! `SSHPassword`. The result lands in the directory Packer serves over HTTP
//! to the installer (see `http_directory` in the Packer template).

use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::config::BuildConfig;
use crate::utils;

/// Directory, relative to the working directory, served by Packer's HTTP server.
pub const HTTP_DIR: &str = "http";
pub const PRESEED_FILE_NAME: &str = "preseed.cfg";

/// Render the preseed template into `<workdir>/http/preseed.cfg` and return
/// the path written.
pub fn generate_preseed_file(config: &BuildConfig, workdir: &Utf8Path) -> Result<Utf8PathBuf> {
    let template_path = workdir.join(&config.preseed_file);
    let source = fs::read_to_string(&template_path)
        .with_context(|| format!("reading preseed template {template_path}"))?;
    let template = utils::parse_template("preseed", &source)?;

    let rendered = utils::render_template(
        "preseed",
        &template,
        &[
            ("SSHUsername", config.ssh_username.as_str()),
            ("SSHPassword", config.ssh_password.as_str()),
        ],
    )?;

    let http_dir = workdir.join(HTTP_DIR);
    fs::create_dir_all(&http_dir)
        .with_context(|| format!("error creating {http_dir} directory"))?;

    let dest = http_dir.join(PRESEED_FILE_NAME);
    utils::write_file(&dest, &rendered)?;
    tracing::info!("wrote preseed file {dest}");
    Ok(dest)
}
