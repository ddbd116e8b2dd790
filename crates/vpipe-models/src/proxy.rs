//! Outbound proxy settings.

use serde::{Deserialize, Serialize};

/// Proxy URLs for outbound traffic, read from `HTTP_PROXY` / `HTTPS_PROXY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxySettings {
    /// Read proxy settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read proxy settings through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            http: read("HTTP_PROXY"),
            https: read("HTTPS_PROXY"),
        }
    }

    /// Whether no proxy is configured.
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }

    /// Single proxy URL for tools that take one `--proxy` argument.
    /// HTTPS wins since media hosts are served over TLS.
    pub fn preferred(&self) -> Option<&str> {
        self.https.as_deref().or(self.http.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_values_are_unset() {
        let proxy = ProxySettings::from_lookup(lookup(&[("HTTP_PROXY", ""), ("HTTPS_PROXY", "  ")]));
        assert!(proxy.is_empty());
        assert_eq!(proxy.preferred(), None);
    }

    #[test]
    fn test_preferred_proxy() {
        let proxy = ProxySettings::from_lookup(lookup(&[("HTTP_PROXY", "http://proxy:3128")]));
        assert_eq!(proxy.preferred(), Some("http://proxy:3128"));

        let proxy = ProxySettings::from_lookup(lookup(&[
            ("HTTP_PROXY", "http://proxy:3128"),
            ("HTTPS_PROXY", "http://secure-proxy:3129"),
        ]));
        assert_eq!(proxy.preferred(), Some("http://secure-proxy:3129"));
    }
}
