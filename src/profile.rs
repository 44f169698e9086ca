use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Environment variables a profile may carry.
///
/// Declaration order is the display order and matches the sorted order of
/// the variable names, so serialized profiles come out sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnvKey {
    #[serde(rename = "ANTHROPIC_AUTH_TOKEN")]
    AuthToken,
    #[serde(rename = "ANTHROPIC_BASE_URL")]
    BaseUrl,
    #[serde(rename = "ANTHROPIC_DEFAULT_HAIKU_MODEL")]
    HaikuModel,
    #[serde(rename = "ANTHROPIC_DEFAULT_OPUS_MODEL")]
    OpusModel,
    #[serde(rename = "ANTHROPIC_DEFAULT_SONNET_MODEL")]
    SonnetModel,
    #[serde(rename = "ANTHROPIC_MODEL")]
    Model,
}

impl EnvKey {
    pub const ALL: [EnvKey; 6] = [
        EnvKey::AuthToken,
        EnvKey::BaseUrl,
        EnvKey::HaikuModel,
        EnvKey::OpusModel,
        EnvKey::SonnetModel,
        EnvKey::Model,
    ];

    /// The environment variable name
    pub fn as_str(self) -> &'static str {
        match self {
            EnvKey::AuthToken => "ANTHROPIC_AUTH_TOKEN",
            EnvKey::BaseUrl => "ANTHROPIC_BASE_URL",
            EnvKey::HaikuModel => "ANTHROPIC_DEFAULT_HAIKU_MODEL",
            EnvKey::OpusModel => "ANTHROPIC_DEFAULT_OPUS_MODEL",
            EnvKey::SonnetModel => "ANTHROPIC_DEFAULT_SONNET_MODEL",
            EnvKey::Model => "ANTHROPIC_MODEL",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            EnvKey::AuthToken => "API Token",
            EnvKey::BaseUrl => "Base URL",
            EnvKey::HaikuModel => "Haiku Model",
            EnvKey::OpusModel => "Opus Model",
            EnvKey::SonnetModel => "Sonnet Model",
            EnvKey::Model => "Default Model",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, EnvKey::AuthToken)
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnvKey(pub String);

impl fmt::Display for UnknownEnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown environment key '{}'", self.0)
    }
}

impl std::error::Error for UnknownEnvKey {}

impl FromStr for EnvKey {
    type Err = UnknownEnvKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownEnvKey(s.to_string()))
    }
}

/// A Claude Code configuration profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "known_keys_only")]
    env: BTreeMap<EnvKey, String>,
}

/// Drops unrecognized keys instead of rejecting the whole document
fn known_keys_only<'de, D>(deserializer: D) -> Result<BTreeMap<EnvKey, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| k.parse::<EnvKey>().ok().map(|key| (key, v)))
        .collect())
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_env(&mut self, key: EnvKey, value: impl Into<String>) {
        self.env.insert(key, value.into());
    }

    pub fn get_env(&self, key: EnvKey) -> Option<&str> {
        self.env.get(&key).map(String::as_str)
    }

    pub fn remove_env(&mut self, key: EnvKey) -> Option<String> {
        self.env.remove(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
    }

    pub fn len(&self) -> usize {
        self.env.len()
    }

    /// Keys and values in display order
    pub fn iter(&self) -> impl Iterator<Item = (EnvKey, &str)> {
        self.env.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = EnvKey> + '_ {
        self.env.keys().copied()
    }

    /// Build a profile from the `env` object of a Claude settings file.
    ///
    /// Only recognized keys with string values are picked up.
    pub fn from_settings_env(env: &Map<String, Value>) -> Self {
        let env = env
            .iter()
            .filter_map(|(k, v)| {
                let key = k.parse::<EnvKey>().ok()?;
                let value = v.as_str()?;
                Some((key, value.to_string()))
            })
            .collect();
        Self { env }
    }

    /// Value as it should be shown on screen, secrets masked
    pub fn display_value(&self, key: EnvKey) -> Option<String> {
        self.get_env(key).map(|value| {
            if key.is_secret() {
                mask_secret(value)
            } else {
                value.to_string()
            }
        })
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.set_env(EnvKey::AuthToken, token);
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.get_env(EnvKey::AuthToken)
    }

    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.set_env(EnvKey::BaseUrl, url);
    }

    pub fn base_url(&self) -> Option<&str> {
        self.get_env(EnvKey::BaseUrl)
    }

    pub fn set_haiku_model(&mut self, model: impl Into<String>) {
        self.set_env(EnvKey::HaikuModel, model);
    }

    pub fn haiku_model(&self) -> Option<&str> {
        self.get_env(EnvKey::HaikuModel)
    }

    pub fn set_opus_model(&mut self, model: impl Into<String>) {
        self.set_env(EnvKey::OpusModel, model);
    }

    pub fn opus_model(&self) -> Option<&str> {
        self.get_env(EnvKey::OpusModel)
    }

    pub fn set_sonnet_model(&mut self, model: impl Into<String>) {
        self.set_env(EnvKey::SonnetModel, model);
    }

    pub fn sonnet_model(&self) -> Option<&str> {
        self.get_env(EnvKey::SonnetModel)
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.set_env(EnvKey::Model, model);
    }

    pub fn model(&self) -> Option<&str> {
        self.get_env(EnvKey::Model)
    }
}

/// Mask a secret for display: short values are hidden completely, longer
/// ones keep their first and last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
