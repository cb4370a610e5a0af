use serde::{Deserialize, Serialize};

use crate::CoreError;

/// An account handle. Only ASCII alphanumerics and underscores are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScreenName(String);

impl ScreenName {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScreenName`] if `name` is empty or contains
    /// anything other than `[0-9A-Za-z_]`.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if valid {
            Ok(Self(name))
        } else {
            Err(CoreError::InvalidScreenName(name))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScreenName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScreenName> for String {
    fn from(value: ScreenName) -> Self {
        value.0
    }
}

impl std::fmt::Display for ScreenName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumerics_and_underscore() {
        let name = ScreenName::new("screen_name_1").unwrap();
        assert_eq!(name.as_str(), "screen_name_1");
        assert_eq!(name.to_string(), "screen_name_1");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ScreenName::new(""),
            Err(CoreError::InvalidScreenName(_))
        ));
    }

    #[test]
    fn rejects_non_ascii_and_punctuation() {
        assert!(ScreenName::new("不正なスクリーンネーム").is_err());
        assert!(ScreenName::new("with space").is_err());
        assert!(ScreenName::new("@handle").is_err());
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: ScreenName = serde_json::from_str("\"valid_name\"").unwrap();
        assert_eq!(ok.as_str(), "valid_name");
        assert!(serde_json::from_str::<ScreenName>("\"bad-name\"").is_err());
    }
}
