use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ScreenName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Enable,
    Disable,
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetStatus::Enable => write!(f, "enable"),
            TargetStatus::Disable => write!(f, "disable"),
        }
    }
}

/// One account to archive, with the session cookies used to crawl it.
#[derive(Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub screen_name: ScreenName,
    pub status: TargetStatus,
    #[serde(default)]
    pub ct0: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl TargetConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status == TargetStatus::Enable
    }
}

impl std::fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetConfig")
            .field("screen_name", &self.screen_name)
            .field("status", &self.status)
            .field("ct0", &self.ct0.as_ref().map(|_| "[redacted]"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<TargetConfig>,
}

impl TargetsFile {
    /// Targets with `status: enable`, in file order.
    pub fn enabled(&self) -> impl Iterator<Item = &TargetConfig> {
        self.targets.iter().filter(|t| t.is_enabled())
    }
}

/// Load and validate the crawl targets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_targets(&content)
}

fn parse_targets(content: &str) -> Result<TargetsFile, ConfigError> {
    let targets_file: TargetsFile =
        serde_yaml::from_str(content).map_err(ConfigError::TargetsFileParse)?;

    validate_targets(&targets_file)?;

    Ok(targets_file)
}

fn validate_targets(targets_file: &TargetsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for target in &targets_file.targets {
        let lower = target.screen_name.as_str().to_lowercase();
        if !seen.insert(lower) {
            return Err(ConfigError::Validation(format!(
                "duplicate target screen_name: '{}'",
                target.screen_name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enabled_and_disabled_targets() {
        let yaml = r"
targets:
  - screen_name: alice_1
    status: enable
    ct0: abc
    auth_token: def
  - screen_name: bob
    status: disable
";
        let file = parse_targets(yaml).unwrap();
        assert_eq!(file.targets.len(), 2);
        let enabled: Vec<&str> = file.enabled().map(|t| t.screen_name.as_str()).collect();
        assert_eq!(enabled, vec!["alice_1"]);
        assert_eq!(file.targets[0].ct0.as_deref(), Some("abc"));
        assert!(file.targets[1].auth_token.is_none());
    }

    #[test]
    fn rejects_invalid_screen_name() {
        let yaml = r"
targets:
  - screen_name: not-valid
    status: enable
";
        let err = parse_targets(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::TargetsFileParse(_)));
    }

    #[test]
    fn rejects_unknown_status() {
        let yaml = r"
targets:
  - screen_name: alice
    status: paused
";
        assert!(matches!(
            parse_targets(yaml),
            Err(ConfigError::TargetsFileParse(_))
        ));
    }

    #[test]
    fn rejects_case_insensitive_duplicates() {
        let yaml = r"
targets:
  - screen_name: Alice
    status: enable
  - screen_name: alice
    status: disable
";
        let err = parse_targets(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate target"));
    }

    #[test]
    fn debug_redacts_cookies() {
        let yaml = r"
targets:
  - screen_name: alice
    status: enable
    ct0: secret-ct0
    auth_token: secret-auth
";
        let file = parse_targets(yaml).unwrap();
        let rendered = format!("{:?}", file.targets[0]);
        assert!(!rendered.contains("secret-ct0"));
        assert!(!rendered.contains("secret-auth"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_targets(Path::new("/nonexistent/targets.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TargetsFileIo { .. }));
    }
}
