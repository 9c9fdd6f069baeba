use anyhow::{Context, Result};
use clap::Args;

use crate::context::{DashkitConfig, FilterSettings, ProjectContext, StorageSettings};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "dashkit init                          # Write .dashkit/config.toml with defaults",
        "dashkit init --namespace sales        # Prefix every stored filter key with 'sales:'",
        "dashkit init --year-span 10 --force   # Overwrite an existing config",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Key prefix shared by every persisted filter
    #[arg(long)]
    namespace: Option<String>,

    /// Number of years offered by the year filter
    #[arg(long)]
    year_span: Option<u16>,

    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let root = std::env::current_dir().context("Failed to get current directory")?;
    let config_path = ProjectContext::config_path(&root);

    if config_path.exists() && !args.force {
        output.warning(&format!("{} already exists", config_path.display()));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    let config = DashkitConfig {
        storage: StorageSettings {
            namespace: args.namespace,
            ..StorageSettings::default()
        },
        filters: FilterSettings {
            year_span: args.year_span.unwrap_or(FilterSettings::default().year_span),
        },
    };

    if let Some(config_dir) = config_path.parent() {
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    }
    let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    output.success(&format!("Wrote {}", config_path.display()));
    Ok(())
}
