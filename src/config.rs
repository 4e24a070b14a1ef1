use std::str::FromStr;

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Parser;
use rand::Rng;

use crate::password::{DEFAULT_PASSWORD_LENGTH, generate_password};

/// Everything a run needs, as given on the command line.
///
/// Values are passed through verbatim to the templates; sizes and URLs are
/// not validated.
#[derive(Parser, Debug, Clone)]
#[command(name = "debvirt-image-kit")]
#[command(about = "Create Debian images for KVM using Packer")]
#[command(
    long_about = "debvirt-image-kit is a tool to create Debian images for KVM virtualization using HashiCorp Packer as a backend."
)]
pub struct BuildConfig {
    /// Debian version
    #[arg(short = 'v', long = "version", default_value = "11.6.0")]
    pub debian_version: String,

    /// Debian architecture
    #[arg(short = 'a', long = "arch", default_value = "amd64")]
    pub debian_arch: String,

    /// Output directory
    #[arg(short = 'o', long = "output", default_value = "output")]
    pub output_dir: String,

    /// Disk size (e.g., 5000M, 10G)
    #[arg(long, default_value = "20000M")]
    pub disk_size: String,

    /// Memory size (e.g., 2048)
    #[arg(long = "memory", default_value = "1024")]
    pub memory_size: String,

    /// SSH username
    #[arg(long, default_value = "debian")]
    pub ssh_username: String,

    /// SSH password (if not provided, a random password will be generated)
    #[arg(long, default_value = "")]
    pub ssh_password: String,

    /// Base URL for ISO download
    #[arg(
        long = "iso-base-url",
        default_value = "https://cdimage.debian.org/debian-cd/current/amd64/iso-cd/"
    )]
    pub iso_base_url: String,

    /// Checksum file name
    #[arg(long = "checksum-file", default_value = "SHA256SUMS")]
    pub checksum_file_name: String,

    /// ISO file name (e.g., debian-11.6.0-amd64-netinst.iso)
    #[arg(long = "iso-file", default_value = "")]
    pub iso_file_name: String,

    /// Path to the preseed template file
    #[arg(long = "preseed-file", default_value = "preseed.cfg.tpl")]
    pub preseed_file: Utf8PathBuf,

    /// Generate option: 'preseed', 'packer', or 'all' (default: build image)
    #[arg(long = "gen", default_value = "")]
    pub gen_option: String,
}

impl BuildConfig {
    /// Fill in a random SSH password if none was given. Returns whether one
    /// was generated; an existing password is never replaced.
    pub fn ensure_password<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.ssh_password.is_empty() {
            return false;
        }
        self.ssh_password = generate_password(rng, DEFAULT_PASSWORD_LENGTH);
        true
    }

    pub fn mode(&self) -> anyhow::Result<Mode> {
        self.gen_option.parse()
    }

    /// The installer ISO file name, derived from version and arch unless
    /// given explicitly.
    pub fn iso_file_name(&self) -> String {
        if self.iso_file_name.is_empty() {
            format!(
                "debian-{}-{}-netinst.iso",
                self.debian_version, self.debian_arch
            )
        } else {
            self.iso_file_name.clone()
        }
    }

    pub fn iso_url(&self) -> String {
        format!("{}{}", self.iso_base_url, self.iso_file_name())
    }

    /// Packer's `file:` checksum reference pointing at the checksum list
    /// next to the ISO.
    pub fn iso_checksum(&self) -> String {
        format!("file:{}{}", self.iso_base_url, self.checksum_file_name)
    }

    pub fn vm_name(&self) -> String {
        format!("debian-{}-{}", self.debian_version, self.debian_arch)
    }

    pub fn packer_template_file_name(&self) -> String {
        format!("{}.pkr.hcl", self.vm_name())
    }
}

/// What a run produces, selected by `--gen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only render the preseed file.
    Preseed,
    /// Only render the Packer template.
    Packer,
    /// Render both files without building.
    All,
    /// Render both files, then run `packer init` and `packer build`.
    Build,
}

impl Mode {
    pub fn renders_preseed(self) -> bool {
        matches!(self, Mode::Preseed | Mode::All | Mode::Build)
    }

    pub fn renders_packer_template(self) -> bool {
        matches!(self, Mode::Packer | Mode::All | Mode::Build)
    }

    pub fn runs_packer(self) -> bool {
        self == Mode::Build
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Mode::Preseed => "Preseed file generated successfully.",
            Mode::Packer => "Packer template generated successfully.",
            Mode::All => "Preseed file and Packer template generated successfully.",
            Mode::Build => "debvirt-image-kit: Debian image generated successfully!",
        }
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "preseed" => Mode::Preseed,
            "packer" => Mode::Packer,
            "all" => Mode::All,
            "" => Mode::Build,
            other => bail!(
                "Invalid gen option: {other}. Use 'preseed', 'packer', 'all', or omit for default behavior."
            ),
        })
    }
}
