//! Update client configuration

use std::time::Duration;

use lodestar_http::HttpConfig;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{Result, UpdateError},
    servers::ServerList,
};

/// Settings for one theme's update client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Base URLs in fallback priority order; a comma-joined string is also accepted
    #[serde(default, deserialize_with = "server_urls")]
    pub servers: Vec<String>,

    /// URL of the site the theme is installed on
    #[serde(default)]
    pub site_url: String,

    /// Theme slug sent with update checks
    #[serde(default)]
    pub slug: String,

    /// Product identifier sent with license checks (falls back to the slug)
    #[serde(default)]
    pub product: String,

    /// Theme name shown in the details dialog when the feed omits one
    #[serde(default)]
    pub name: String,

    /// Option-store key holding the license key
    #[serde(default = "default_license_option")]
    pub license_option: String,

    /// How long a fetched update feed entry stays fresh
    #[serde(default = "default_update_ttl_secs")]
    pub update_ttl_secs: u64,

    /// How long a computed license status stays fresh
    #[serde(default = "default_license_ttl_secs")]
    pub license_ttl_secs: u64,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            site_url: String::new(),
            slug: String::new(),
            product: String::new(),
            name: String::new(),
            license_option: default_license_option(),
            update_ttl_secs: default_update_ttl_secs(),
            license_ttl_secs: default_license_ttl_secs(),
            http: HttpConfig::default(),
        }
    }
}

impl UpdaterConfig {
    /// Minimal configuration for a slug, site and server list
    pub fn new<I, S>(slug: impl Into<String>, site_url: impl Into<String>, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slug: slug.into(),
            site_url: site_url.into(),
            servers: servers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn update_ttl(&self) -> Duration {
        Duration::from_secs(self.update_ttl_secs)
    }

    pub fn license_ttl(&self) -> Duration {
        Duration::from_secs(self.license_ttl_secs)
    }

    /// Product name sent to the license endpoint
    pub fn product_name(&self) -> &str {
        if self.product.is_empty() {
            &self.slug
        } else {
            &self.product
        }
    }

    /// Name shown to users: the configured name, then the product, then the slug
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.product_name()
        } else {
            &self.name
        }
    }

    /// Check required fields and parse the server list
    pub fn validate(&self) -> Result<ServerList> {
        if self.slug.trim().is_empty() {
            return Err(UpdateError::config("slug must not be empty"));
        }
        if self.site_url.trim().is_empty() {
            return Err(UpdateError::config("site_url must not be empty"));
        }
        if self.license_option.trim().is_empty() {
            return Err(UpdateError::config("license_option must not be empty"));
        }
        if self.update_ttl_secs == 0 || self.license_ttl_secs == 0 {
            return Err(UpdateError::config("cache TTLs must be greater than 0"));
        }
        ServerList::new(&self.servers)
    }
}

fn server_urls<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::List(servers) => servers,
        OneOrMany::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|server| !server.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn default_license_option() -> String {
    "license_key".to_string()
}

fn default_update_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_license_ttl_secs() -> u64 {
    12 * 60 * 60
}
