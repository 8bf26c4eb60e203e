use crate::config::LaunchConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a launch description from a YAML file
pub fn load_config(config_path: &Path) -> Result<LaunchConfig> {
    info!("Loading launch description from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open '{}'", config_path.display()))?;

    let config: LaunchConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse '{}'", config_path.display()))?;

    config
        .validate()
        .wrap_err_with(|| format!("Invalid launch description '{}'", config_path.display()))?;

    info!(
        "Loaded topology '{}' ({} switches, {} hosts, {} links)",
        config.name,
        config.switches.len(),
        config.hosts.len(),
        config.links.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
name: pair
controller: local
switches:
  - name: s1
hosts:
  - name: h1
    ip: 10.0.0.1/8
links:
  - [h1, s1]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.name, "pair");
        let (topology, _) = config.build_topology().unwrap();
        assert_eq!(topology.link_count(), 1);
        assert_eq!(topology.node("h1").unwrap().address().unwrap().prefix_len(), Some(8));
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "name: nothing\n").unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(format!("{:?}", err).contains("declares no switches or hosts"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("/nonexistent/netlaunch.yaml")).is_err());
    }
}
