use std::path::Path;

use pulse_core::PulseConfig;

pub fn init(path: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("pulse.toml");
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    std::fs::write(&output, PulseConfig::scaffold().to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_scaffold_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        init(path).unwrap();
        let config = PulseConfig::from_file(&dir.path().join("pulse.toml")).unwrap();
        assert_eq!(config.batch_size(), 10);

        assert!(init(path).is_err());
    }
}
