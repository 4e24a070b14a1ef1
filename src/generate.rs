use anyhow::{Context, Result};
use camino::Utf8Path;
use rand::Rng;

use crate::config::BuildConfig;
use crate::packer::{self, PACKER_BINARY, Packer};
use crate::preseed;

/// Produce what `--gen` asks for in `workdir`, building the image with
/// Packer in the default mode.
pub fn run(config: &mut BuildConfig, workdir: &Utf8Path) -> Result<()> {
    run_with(config, workdir, &mut rand::rng(), PACKER_BINARY)
}

fn run_with<R: Rng + ?Sized>(
    config: &mut BuildConfig,
    workdir: &Utf8Path,
    rng: &mut R,
    packer_binary: &str,
) -> Result<()> {
    tracing::info!("Starting debvirt-image-kit...");
    let mode = config.mode()?;

    // packer must be installed whatever the mode
    let tool = Packer::locate(packer_binary, workdir)?;

    if config.ensure_password(rng) {
        println!("Generated random SSH password: {}", config.ssh_password);
    }
    let config = &*config;

    if mode.renders_preseed() {
        preseed::generate_preseed_file(config, workdir).context("Error generating preseed file")?;
    }

    let template = if mode.renders_packer_template() {
        Some(
            packer::generate_packer_template(config, workdir)
                .context("Error generating Packer template")?,
        )
    } else {
        None
    };

    if let Some(template) = template.filter(|_| mode.runs_packer()) {
        tool.init_and_build(&template)?;
    }

    tracing::info!("{}", mode.success_message());
    Ok(())
}
