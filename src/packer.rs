//! The Packer side of a build: rendering the HCL template and driving the
//! `packer` binary.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::config::BuildConfig;
use crate::utils;

pub const PACKER_BINARY: &str = "packer";

// `{{ .HTTPIP }}` and `{{ .HTTPPort }}` belong to Packer, which fills them in
// when it serves the preseed file. They are emitted as string literals so they
// come out of our rendering pass untouched.
const PACKER_TEMPLATE_SRC: &str = r#"
packer {
  required_plugins {
    qemu = {
      version = ">= 1.0.0"
      source  = "github.com/hashicorp/qemu"
    }
  }
}

source "qemu" "debian" {
  iso_url      = "{{.ISOURL}}"
  iso_checksum = "{{.ISOChecksum}}"
  output_directory = "{{.OutputDir}}"
  shutdown_command = "echo '{{.SSHPassword}}' | sudo -S /sbin/shutdown -hP now"
  disk_size        = "{{.DiskSize}}"
  memory           = "{{.MemorySize}}"
  format           = "qcow2"
  accelerator      = "kvm"
  http_directory   = "http"
  ssh_username     = "{{.SSHUsername}}"
  ssh_password     = "{{.SSHPassword}}"
  ssh_timeout      = "20m"
  vm_name          = "debian-{{.DebianVersion}}-{{.DebianArch}}"
  net_device       = "virtio-net"
  disk_interface   = "virtio"
  boot_wait        = "5s"
  boot_command     = [
    "<esc><wait>",
    "auto ",
    "url=http://{{ "{{ .HTTPIP }}" }}:{{ "{{ .HTTPPort }}" }}/preseed.cfg ",
    "<enter>"
  ]
}

build {
  sources = ["source.qemu.debian"]
}
"#;

fn packer_template() -> gtmpl::Template {
    utils::parse_template("packer", PACKER_TEMPLATE_SRC).expect("embedded Packer template is valid")
}

/// Render the Packer template into `<workdir>/debian-<version>-<arch>.pkr.hcl`
/// and return its file name, relative to `workdir`.
pub fn generate_packer_template(config: &BuildConfig, workdir: &Utf8Path) -> Result<String> {
    let file_name = config.packer_template_file_name();
    let iso_url = config.iso_url();
    let iso_checksum = config.iso_checksum();

    let rendered = utils::render_template(
        "packer",
        &packer_template(),
        &[
            ("DebianVersion", config.debian_version.as_str()),
            ("DebianArch", config.debian_arch.as_str()),
            ("OutputDir", config.output_dir.as_str()),
            ("DiskSize", config.disk_size.as_str()),
            ("MemorySize", config.memory_size.as_str()),
            ("SSHUsername", config.ssh_username.as_str()),
            ("SSHPassword", config.ssh_password.as_str()),
            ("ISOURL", iso_url.as_str()),
            ("ISOChecksum", iso_checksum.as_str()),
        ],
    )?;

    utils::write_file(&workdir.join(&file_name), &rendered)?;
    tracing::info!("wrote Packer template {file_name}");
    Ok(file_name)
}

/// A resolved `packer` executable, run from a fixed working directory.
#[derive(Debug)]
pub struct Packer {
    program: PathBuf,
    workdir: Utf8PathBuf,
}

impl Packer {
    /// Look `name` up on `PATH`. A name containing a path separator is
    /// checked as a path instead.
    pub fn locate(name: &str, workdir: &Utf8Path) -> Result<Self> {
        let program = which::which(name).context(
            "Packer is not installed or not in the system PATH. Please install Packer and try again.",
        )?;
        tracing::debug!("using packer at {}", program.display());
        Ok(Self {
            program,
            workdir: workdir.to_owned(),
        })
    }

    /// `packer init`: installs the plugins the template requires.
    pub fn init(&self, template: &str) -> Result<()> {
        self.run("init", template)
    }

    pub fn build(&self, template: &str) -> Result<()> {
        self.run("build", template)
    }

    /// Install plugins, then build. `build` is skipped if `init` fails.
    pub fn init_and_build(&self, template: &str) -> Result<()> {
        tracing::info!("Installing Packer plugins...");
        self.init(template).context("Error installing Packer plugins")?;

        tracing::info!("Running Packer to build the image...");
        self.build(template).context("Error running Packer")?;
        Ok(())
    }

    fn run(&self, subcommand: &str, template: &str) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand).arg(template).current_dir(&self.workdir);
        utils::run_command(&mut cmd)
    }
}
