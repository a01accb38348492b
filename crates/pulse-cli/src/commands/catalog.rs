use std::path::Path;

use pulse_core::{PulseConfig, default_catalog};

use crate::OutputFormat;

pub fn list(config: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = match config {
        Some(path) => PulseConfig::from_file(Path::new(path))?.catalog(),
        None => default_catalog(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            println!("{} endpoints:\n", catalog.len());
            for desc in &catalog {
                let auth = if desc.requires_auth { "auth" } else { "" };
                println!(
                    "  {:<4} {:<45} {:<10} {}",
                    desc.method, desc.path, desc.category, auth
                );
            }
        }
    }

    Ok(())
}
