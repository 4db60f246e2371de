use crate::aru::{AruClient, Credentials};
use crate::build::{BuildRequest, BuildResolver, ResolvedBuild};
use crate::cache::{ArtifactRegistry, FileCacheStore};
use crate::config::ImageToolConfig;
use crate::download::HttpPatchDownloader;
use crate::error::{ImageToolError, Result};
use crate::installer::FmwInstallerType;
use crate::models::Architecture;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::env;

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Installer bundle (e.g., "WLS", "FMW", "SOA_OSB")
    #[arg(long = "type", value_name = "TYPE", default_value = "WLS")]
    pub bundle: FmwInstallerType,

    /// Installer version (e.g., "12.2.1.4.0")
    #[arg(long)]
    pub version: String,

    /// Target architecture; the cache falls back to the host architecture
    #[arg(long)]
    pub architecture: Option<Architecture>,

    /// Comma separated patch ids (e.g., "32698246,28186730_13.9.4.2.10")
    #[arg(long, value_delimiter = ',')]
    pub patches: Vec<String>,

    /// Add the recommended patches for the bundle
    #[arg(long)]
    pub recommended_patches: bool,

    /// Add the latest PSU for the bundle
    #[arg(long)]
    pub latest_psu: bool,

    /// Oracle Support user name
    #[arg(long, requires = "password_env")]
    pub user: Option<String>,

    /// Environment variable holding the Oracle Support password
    #[arg(long, value_name = "VAR", requires = "user")]
    pub password_env: Option<String>,

    /// Use only what is already cached
    #[arg(long)]
    pub offline: bool,

    /// JDK installer version to include
    #[arg(long)]
    pub jdk_version: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ResolveOutput {
    installers: Vec<InstallerOutput>,
    patches: Vec<PatchOutput>,
}

#[derive(Serialize)]
struct InstallerOutput {
    installer: String,
    version: String,
    path: String,
}

#[derive(Serialize)]
struct PatchOutput {
    patch_id: String,
    description: Option<String>,
    path: String,
    downloaded: bool,
}

pub struct ResolveCommand<'a> {
    config: &'a ImageToolConfig,
}

impl<'a> ResolveCommand<'a> {
    pub fn new(config: &'a ImageToolConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, args: ResolveArgs) -> Result<()> {
        let request = build_request(&args)?;

        let cache_dir = self.config.cache_dir();
        let lock_timeout = self.config.locking.timeout();
        let mut store = FileCacheStore::open(&cache_dir, lock_timeout)?;
        let mut registry = ArtifactRegistry::open(&cache_dir, lock_timeout)?;
        let catalog = AruClient::new(&self.config.aru);
        let downloader = HttpPatchDownloader::new().with_timeout(self.config.aru.timeout());

        let resolved = BuildResolver::new(&mut store, &catalog, &downloader)
            .with_registry(&mut registry)
            .resolve(&request)?;

        if args.json {
            output_json(&resolved)
        } else {
            output_text(&request, &resolved);
            Ok(())
        }
    }
}

fn build_request(args: &ResolveArgs) -> Result<BuildRequest> {
    let credentials = match (&args.user, &args.password_env) {
        (Some(user), Some(variable)) => {
            let password = env::var(variable).map_err(|_| {
                ImageToolError::InvalidConfig(format!(
                    "Environment variable {variable} with the password for {user} is not set"
                ))
            })?;
            Some(Credentials::new(user.as_str(), password))
        }
        _ => None,
    };

    let mut request = BuildRequest::new(args.bundle, args.version.as_str());
    request.architecture = args.architecture;
    request.patch_ids = args
        .patches
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    request.recommended_patches = args.recommended_patches;
    request.latest_psu = args.latest_psu;
    request.credentials = credentials;
    request.offline = args.offline;
    request.jdk_version = args.jdk_version.clone();
    Ok(request)
}

fn output_text(request: &BuildRequest, resolved: &ResolvedBuild) {
    println!(
        "{} {} {}",
        "Resolved".green().bold(),
        request.bundle.name().cyan(),
        request.version.cyan()
    );

    println!("\nInstallers:");
    for installer in &resolved.installers {
        println!(
            "  {} {}: {}",
            installer.installer,
            installer.version,
            installer.path.display()
        );
    }

    if resolved.patches.is_empty() {
        println!("\nPatches: none");
        return;
    }

    println!("\nPatches:");
    for patch in &resolved.patches {
        let marker = if patch.downloaded {
            " (downloaded)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {}: {}{marker}",
            patch.patch_id(),
            patch.path.display()
        );
    }
}

fn output_json(resolved: &ResolvedBuild) -> Result<()> {
    let output = ResolveOutput {
        installers: resolved
            .installers
            .iter()
            .map(|installer| InstallerOutput {
                installer: installer.installer.to_string(),
                version: installer.version.clone(),
                path: installer.path.display().to_string(),
            })
            .collect(),
        patches: resolved
            .patches
            .iter()
            .map(|patch| PatchOutput {
                patch_id: patch.patch_id(),
                description: patch.description.clone(),
                path: patch.path.display().to_string(),
                downloaded: patch.downloaded,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
