use std::collections::{BTreeMap, HashMap};
use std::env;

use super::dto::KeyStatus;
use crate::providers::dto::ProviderName;

/// Resolves the API key a provider call should use.
pub trait KeyResolver: Send + Sync {
    /// Key configured by the operator, if any.
    fn configured(&self, provider: ProviderName) -> Option<String>;

    /// Operator key first, then the caller's key. Blank keys are absent.
    fn resolve(&self, provider: ProviderName, client_key: Option<&str>) -> Option<String> {
        self.configured(provider).or_else(|| normalize(client_key))
    }
}

fn normalize(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Operator keys captured from the process environment at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvKeyResolver {
    keys: HashMap<ProviderName, String>,
}

impl EnvKeyResolver {
    pub fn from_env() -> Self {
        let keys = ProviderName::ALL
            .iter()
            .filter_map(|provider| {
                let key = env::var(provider.meta().env_key).ok();
                normalize(key.as_deref()).map(|key| (*provider, key))
            })
            .collect::<HashMap<_, _>>();

        log::info!(
            "Loaded environment API keys for {} of {} providers",
            keys.len(),
            ProviderName::ALL.len()
        );

        Self { keys }
    }

    pub fn from_map<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = (ProviderName, S)>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .filter_map(|(provider, key)| normalize(Some(key.as_ref())).map(|key| (provider, key)))
            .collect();

        Self { keys }
    }
}

impl KeyResolver for EnvKeyResolver {
    fn configured(&self, provider: ProviderName) -> Option<String> {
        self.keys.get(&provider).cloned()
    }
}

/// First and last four characters with the middle starred. Keys of eight
/// characters or fewer are fully starred.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();

    if len <= 8 {
        return "*".repeat(len);
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();

    format!("{}{}{}", head, "*".repeat(len - 8), tail)
}

pub fn key_statuses(resolver: &dyn KeyResolver) -> BTreeMap<ProviderName, KeyStatus> {
    ProviderName::ALL
        .iter()
        .map(|provider| {
            let key = resolver.configured(*provider);
            let status = KeyStatus {
                has_env_key: key.is_some(),
                masked: key.as_deref().map(mask_key).unwrap_or_default(),
            };

            (*provider, status)
        })
        .collect()
}
