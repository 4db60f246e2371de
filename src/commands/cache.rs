use crate::cache::{ArtifactRegistry, CacheStore, FileCacheStore};
use crate::config::ImageToolConfig;
use crate::error::{ImageToolError, Result};
use crate::installer::InstallerType;
use crate::models::Architecture;
use crate::patches::PatchId;
use clap::Subcommand;
use colored::*;
use comfy_table::{Cell, Table};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cache entries and registered artifacts
    #[command(visible_alias = "ls")]
    List,
    /// Map a cache key to a file path
    AddEntry {
        /// Cache key (e.g., "wls_12.2.1.4.0_amd64")
        #[arg(long)]
        key: String,
        /// Path of the file the key points to
        #[arg(long)]
        value: PathBuf,
    },
    /// Print the path stored for a cache key
    GetEntry {
        #[arg(long)]
        key: String,
    },
    /// Remove a cache key
    DeleteEntry {
        #[arg(long)]
        key: String,
    },
    /// Remove every cache key
    Clear,
    /// Register an installer file
    AddInstaller {
        /// Installer type (e.g., "wls", "fmw", "jdk")
        #[arg(long = "type", value_name = "TYPE")]
        installer_type: InstallerType,
        /// Installer version (e.g., "12.2.1.4.0", "8u401")
        #[arg(long)]
        version: String,
        /// Path of the installer file
        #[arg(long)]
        path: PathBuf,
        /// Architecture the installer was built for; generic when omitted
        #[arg(long)]
        architecture: Option<Architecture>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Register a patch file
    AddPatch {
        /// Patch id with version (e.g., "32698246_12.2.1.4.0")
        #[arg(long)]
        patch_id: String,
        /// Path of the patch file
        #[arg(long)]
        path: PathBuf,
        /// Architecture the patch was built for; generic when omitted
        #[arg(long)]
        architecture: Option<Architecture>,
        #[arg(long)]
        description: Option<String>,
    },
}

impl CacheCommand {
    pub fn execute(self, config: &ImageToolConfig) -> Result<()> {
        let cache_dir = config.cache_dir();
        let mut store = FileCacheStore::open(&cache_dir, config.locking.timeout())?;

        match self {
            CacheCommand::List => {
                let registry = ArtifactRegistry::open(&cache_dir, config.locking.timeout())?;
                list_cache(&store, &registry)
            }
            CacheCommand::AddEntry { key, value } => {
                store.add(&key, &value)?;
                println!("{} Added {} = {}", "✓".green().bold(), key.cyan(), value.display());
                Ok(())
            }
            CacheCommand::GetEntry { key } => {
                let path = store.get(&key).ok_or_else(|| ImageToolError::NotFound {
                    key: key.to_lowercase(),
                    alternate: None,
                })?;
                println!("{}", path.display());
                Ok(())
            }
            CacheCommand::DeleteEntry { key } => {
                match store.delete(&key)? {
                    Some(path) => println!(
                        "{} Deleted {} ({})",
                        "✓".green().bold(),
                        key.cyan(),
                        path.display()
                    ),
                    None => println!("{} No entry for {}", "✗".red(), key.cyan()),
                }
                Ok(())
            }
            CacheCommand::Clear => {
                let count = store.list().len();
                store.clear()?;
                println!("{} Removed {count} cache entries", "✓".green().bold());
                Ok(())
            }
            CacheCommand::AddInstaller {
                installer_type,
                version,
                path,
                architecture,
                description,
            } => {
                let mut registry = ArtifactRegistry::open(&cache_dir, config.locking.timeout())?;
                let record = registry.register_installer(
                    &mut store,
                    installer_type,
                    &version,
                    architecture,
                    &path,
                    description,
                )?;
                println!(
                    "{} Added {installer_type} {version} ({}) at {}",
                    "✓".green().bold(),
                    record.architecture_label(),
                    record.location.display()
                );
                Ok(())
            }
            CacheCommand::AddPatch {
                patch_id,
                path,
                architecture,
                description,
            } => {
                let id = PatchId::from_str(&patch_id)?;
                let Some(version) = id.version() else {
                    return Err(ImageToolError::InvalidPatchIdFormat(patch_id));
                };
                let mut registry = ArtifactRegistry::open(&cache_dir, config.locking.timeout())?;
                let record = registry.register_patch(
                    &mut store,
                    id.bug_number(),
                    version,
                    architecture,
                    &path,
                    description,
                )?;
                println!(
                    "{} Added patch {id} ({}) at {}",
                    "✓".green().bold(),
                    record.architecture_label(),
                    record.location.display()
                );
                Ok(())
            }
        }
    }
}

fn list_cache(store: &FileCacheStore, registry: &ArtifactRegistry) -> Result<()> {
    let entries = store.list();
    if entries.is_empty() {
        println!("{} Cache is empty", "✗".red());
        println!(
            "\n{}: Run {} to register an installer.",
            "Solution".yellow().bold(),
            "'imagetool cache add-installer'".cyan()
        );
        return Ok(());
    }

    println!("Cache contents ({}):\n", store.cache_dir().display());
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
    table.set_header(vec![Cell::new("Key"), Cell::new("Path")]);
    for (key, path) in &entries {
        table.add_row(vec![Cell::new(key), Cell::new(path.display())]);
    }
    println!("{table}");

    let installers = registry.installers();
    if !installers.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
        table.set_header(vec![
            Cell::new("Installer"),
            Cell::new("Version"),
            Cell::new("Architecture"),
            Cell::new("Added"),
            Cell::new("Location"),
        ]);
        for (kind, version, record) in installers {
            table.add_row(vec![
                Cell::new(kind),
                Cell::new(version),
                Cell::new(record.architecture_label()),
                Cell::new(record.date_added),
                Cell::new(record.location.display()),
            ]);
        }
        println!("\nRegistered installers:\n{table}");
    }

    let patches = registry.patches();
    if !patches.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
        table.set_header(vec![
            Cell::new("Bug"),
            Cell::new("Version"),
            Cell::new("Architecture"),
            Cell::new("Description"),
            Cell::new("Location"),
        ]);
        for (bug, record) in patches {
            table.add_row(vec![
                Cell::new(bug),
                Cell::new(&record.version),
                Cell::new(record.architecture_label()),
                Cell::new(record.description.as_deref().unwrap_or_default()),
                Cell::new(record.location.display()),
            ]);
        }
        println!("\nRegistered patches:\n{table}");
    }

    println!("\nTotal: {} cache entries", entries.len());
    Ok(())
}
