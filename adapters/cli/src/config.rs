//! Loading of formation overrides from TOML documents.
//!
//! Every key is optional; omitted keys keep their default value:
//!
//! ```toml
//! window_width = 800
//! circle_radius = 8.0
//! step_length = 16.0
//! leg_duration_secs = 0.5
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use geomart_core::FormationConfig;

/// Reads and validates the formation configuration stored at `path`.
pub(crate) fn load(path: &Path) -> Result<FormationConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read formation config {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid formation config {}", path.display()))
}

/// Parses and validates a formation configuration document.
pub(crate) fn parse(contents: &str) -> Result<FormationConfig> {
    let config: FormationConfig =
        toml::from_str(contents).context("failed to parse formation config toml")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomart_core::ConfigError;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse("").expect("empty config is valid");
        assert_eq!(config, FormationConfig::default());
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let config = parse(
            "window_width = 800\ncircle_radius = 8.0\nleg_duration_secs = 0.5\n",
        )
        .expect("partial config is valid");

        assert_eq!(config.window_width, 800);
        assert_eq!(config.circle_radius, 8.0);
        assert_eq!(config.leg_duration_secs, 0.5);
        assert_eq!(config.window_height, FormationConfig::default().window_height);
        assert_eq!(config.step_length, FormationConfig::default().step_length);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = parse("circle_colour = \"red\"\n").expect_err("unknown key must fail");
        assert!(format!("{error:#}").contains("circle_colour"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = parse("step_length = 0.0\n").expect_err("zero step must fail");
        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidStepLength { step_length: 0.0 })
        );
    }

    #[test]
    fn load_reports_missing_files() {
        let path = Path::new("/nonexistent/geomart/formation.toml");
        let error = load(path).expect_err("missing file must fail");
        assert!(error.to_string().contains("failed to read formation config"));
    }

    #[test]
    fn load_reads_document_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "geomart-formation-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "window_height = 320\n").expect("write temp config");

        let loaded = load(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.expect("valid config").window_height, 320);
    }
}
