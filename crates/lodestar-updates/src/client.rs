//! Update and license client with multi-server fallback

use std::{sync::Arc, time::Duration};

use lodestar_cache::{ExpiringStore, OptionStore};
use lodestar_http::{shared_client, HttpClientTrait, JsonResponse};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::UpdaterConfig,
    error::{AttemptError, CheckFailure, Result, ServerAttempt},
    models::{
        HostEvent, LicenseStatus, LicenseValidation, ThemeInformation, ThemeUpdate, UpdateCheck,
        UpdateInfo,
    },
    servers::ServerList,
    version,
};

const CHECK_UPDATE_PATH: &str = "check-update";
const LICENSE_VALIDATE_PATH: &str = "license/validate";

pub const LICENSE_VALID_MESSAGE: &str = "License is valid";
pub const LICENSE_UNREACHABLE_MESSAGE: &str = "Unable to connect to license server.";
pub const LICENSE_MISSING_MESSAGE: &str = "Please enter a license key.";

/// Update client for one installed theme.
///
/// Built once by the host and shared by reference; every operation degrades
/// to "no update" or an invalid license instead of returning an error.
pub struct UpdateClient {
    config: UpdaterConfig,
    servers: ServerList,
    http: Arc<dyn HttpClientTrait>,
    cache: Arc<dyn ExpiringStore>,
    options: Arc<dyn OptionStore>,
}

impl UpdateClient {
    /// Create a client over explicit collaborators
    pub fn new(
        config: UpdaterConfig,
        http: Arc<dyn HttpClientTrait>,
        cache: Arc<dyn ExpiringStore>,
        options: Arc<dyn OptionStore>,
    ) -> Result<Self> {
        let servers = config.validate()?;
        if servers.is_empty() {
            warn!("No update servers configured for '{}'", config.slug);
        }

        Ok(Self {
            config,
            servers,
            http,
            cache,
            options,
        })
    }

    /// Create a client with the production HTTP transport from `config.http`
    pub fn from_config(
        config: UpdaterConfig,
        cache: Arc<dyn ExpiringStore>,
        options: Arc<dyn OptionStore>,
    ) -> Result<Self> {
        let http = shared_client(config.http.clone())?;
        Self::new(config, http, cache, options)
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Configured endpoints in priority order
    pub fn update_servers(&self) -> &[Url] {
        self.servers.urls()
    }

    // ---------------------------------------------------------------------
    // Update checks
    // ---------------------------------------------------------------------

    /// Newer release info, if any. Failed checks also return `None`.
    pub async fn check_for_update(&self, current_version: &str) -> Option<UpdateInfo> {
        self.check_for_update_detailed(current_version)
            .await
            .into_update()
    }

    /// Update check that keeps "no update" and "check failed" apart
    pub async fn check_for_update_detailed(&self, current_version: &str) -> UpdateCheck {
        if current_version.trim().is_empty() {
            return UpdateCheck::CheckFailed(CheckFailure::InvalidVersion(
                "installed version is empty".to_string(),
            ));
        }

        let info = match self.resolve_update_info(current_version).await {
            Ok(info) => info,
            Err(failure) => {
                warn!("Update check for '{}' failed: {}", self.config.slug, failure);
                return UpdateCheck::CheckFailed(failure);
            }
        };

        match version::is_newer(&info.new_version, current_version) {
            Some(true) => {
                info!(
                    "Update available: {} -> {}",
                    current_version, info.new_version
                );
                UpdateCheck::UpdateAvailable(info)
            }
            Some(false) => UpdateCheck::NoUpdateAvailable {
                latest_version: info.new_version,
            },
            None => UpdateCheck::CheckFailed(CheckFailure::InvalidVersion(format!(
                "cannot compare '{}' with '{}'",
                info.new_version, current_version
            ))),
        }
    }

    /// One fallback sweep over the servers, bypassing the cache
    pub async fn request_update_info(
        &self,
        current_version: &str,
        license_key: &str,
    ) -> Option<UpdateInfo> {
        self.fetch_update_info(current_version, license_key)
            .await
            .ok()
    }

    /// Entry for the host's update list when a newer release exists
    pub async fn theme_update(&self, current_version: &str) -> Option<ThemeUpdate> {
        self.check_for_update(current_version)
            .await
            .map(|info| info.to_theme_update(&self.config.slug))
    }

    /// Details dialog payload for the latest known release, newer or not
    pub async fn theme_information(&self, current_version: &str) -> Option<ThemeInformation> {
        let info = self.resolve_update_info(current_version).await.ok()?;
        Some(info.to_theme_information(&self.config.slug, self.config.display_name()))
    }

    /// Drop the cached feed entry so the next check hits the network
    pub async fn clear_update_cache(&self) -> bool {
        match self.cache.delete(&self.update_cache_key()).await {
            Ok(removed) => {
                debug!("Cleared update cache for '{}'", self.config.slug);
                removed
            }
            Err(e) => {
                warn!("Failed to clear update cache: {}", e);
                false
            }
        }
    }

    /// React to host lifecycle events
    pub async fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::ThemeSwitched | HostEvent::UpgradeCompleted => {
                debug!("Host event {:?}, invalidating update cache", event);
                self.clear_update_cache().await;
            }
        }
    }

    async fn resolve_update_info(
        &self,
        current_version: &str,
    ) -> std::result::Result<UpdateInfo, CheckFailure> {
        let cache_key = self.update_cache_key();
        if let Some(info) = self.cached::<UpdateInfo>(&cache_key).await {
            debug!("Using cached update info ({})", info.new_version);
            return Ok(info);
        }

        let license_key = self.license_key().await.unwrap_or_default();
        let info = self.fetch_update_info(current_version, &license_key).await?;

        // Cached whether or not it is newer, so "no update" is not refetched either
        self.store(&cache_key, &info, self.config.update_ttl()).await;
        Ok(info)
    }

    async fn fetch_update_info(
        &self,
        current_version: &str,
        license_key: &str,
    ) -> std::result::Result<UpdateInfo, CheckFailure> {
        if self.servers.is_empty() {
            return Err(CheckFailure::NoServers);
        }

        let body = json!({
            "license_key": license_key,
            "site_url": self.config.site_url,
            "slug": self.config.slug,
            "version": current_version,
        });

        let mut attempts = Vec::new();
        for server in self.servers.iter() {
            let endpoint = ServerList::endpoint(server, CHECK_UPDATE_PATH);
            match self.try_update_server(&endpoint, &body).await {
                Ok(info) => {
                    info!("Update feed answered by {} ({})", server, info.new_version);
                    return Ok(info);
                }
                Err(error) => {
                    warn!("Update server {} failed: {}", server, error);
                    attempts.push(ServerAttempt {
                        server: server.to_string(),
                        error,
                    });
                }
            }
        }

        Err(CheckFailure::AllServersFailed(attempts))
    }

    async fn try_update_server(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> std::result::Result<UpdateInfo, AttemptError> {
        let response = self.post(endpoint, body).await?;
        if !response.is_ok() {
            return Err(AttemptError::Status(response.status.as_u16()));
        }

        let map = response.json_object().ok_or_else(|| {
            AttemptError::Malformed("response body is not a JSON object".to_string())
        })?;
        UpdateInfo::from_response(map)
    }

    // ---------------------------------------------------------------------
    // Licensing
    // ---------------------------------------------------------------------

    /// Configured license key; empty values count as absent
    pub async fn license_key(&self) -> Option<String> {
        match self.options.get(&self.config.license_option).await {
            Ok(Some(Value::String(key))) if !key.trim().is_empty() => Some(key.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read license key: {}", e);
                None
            }
        }
    }

    /// Ask the servers whether `license_key` is valid.
    ///
    /// An explicit rejection from any server ends the sweep; transport
    /// failures move on to the next server.
    pub async fn validate_license(&self, license_key: &str) -> LicenseValidation {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return LicenseValidation::invalid(LICENSE_MISSING_MESSAGE);
        }

        let body = json!({
            "license_key": license_key,
            "site_url": self.config.site_url,
            "product": self.config.product_name(),
        });

        for server in self.servers.iter() {
            let endpoint = ServerList::endpoint(server, LICENSE_VALIDATE_PATH);
            let response = match self.post(&endpoint, &body).await {
                Ok(response) => response,
                Err(error) => {
                    warn!("License server {} failed: {}", server, error);
                    continue;
                }
            };

            let payload = response.json_object();
            if response.is_ok() {
                if let Some(map) = payload {
                    let message = map
                        .get("message")
                        .and_then(Value::as_str)
                        .filter(|m| !m.is_empty())
                        .unwrap_or(LICENSE_VALID_MESSAGE)
                        .to_string();
                    info!("License accepted by {}", server);
                    return LicenseValidation::valid(message, Value::Object(map));
                }
                warn!(
                    "License server {} failed: {}",
                    server,
                    AttemptError::Malformed("response body is not a JSON object".to_string())
                );
                continue;
            }

            let rejection = payload
                .as_ref()
                .and_then(|map| map.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string);
            match rejection {
                Some(message) => {
                    info!(
                        "License server {} answered: {}",
                        server,
                        AttemptError::Rejected(message.clone())
                    );
                    return LicenseValidation::invalid(message);
                }
                None => warn!(
                    "License server {} failed: {}",
                    server,
                    AttemptError::Status(response.status.as_u16())
                ),
            }
        }

        LicenseValidation::invalid(LICENSE_UNREACHABLE_MESSAGE)
    }

    /// Current license state, cached per key
    pub async fn license_status(&self) -> LicenseStatus {
        let Some(license_key) = self.license_key().await else {
            return LicenseStatus::inactive();
        };

        let cache_key = self.license_cache_key(&license_key);
        if let Some(status) = self.cached::<LicenseStatus>(&cache_key).await {
            return status;
        }

        let validation = self.validate_license(&license_key).await;
        let status = LicenseStatus::from(&validation);
        self.store(&cache_key, &status, self.config.license_ttl())
            .await;
        status
    }

    /// Store a new key from the settings screen and validate it
    pub async fn activate_license(&self, license_key: &str) -> LicenseValidation {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            self.deactivate_license().await;
            return LicenseValidation::invalid(LICENSE_MISSING_MESSAGE);
        }

        if let Err(e) = self
            .options
            .set(&self.config.license_option, Value::String(license_key.to_string()))
            .await
        {
            warn!("Failed to store license key: {}", e);
        }

        let validation = self.validate_license(license_key).await;
        self.store(
            &self.license_cache_key(license_key),
            &LicenseStatus::from(&validation),
            self.config.license_ttl(),
        )
        .await;
        validation
    }

    /// Forget the stored key. Returns whether one was stored.
    pub async fn deactivate_license(&self) -> bool {
        match self.options.remove(&self.config.license_option).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to remove license key: {}", e);
                false
            }
        }
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> std::result::Result<JsonResponse, AttemptError> {
        self.http
            .post_json(endpoint, body)
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))
    }

    fn update_cache_key(&self) -> String {
        format!("{}_update_info", self.config.slug)
    }

    fn license_cache_key(&self, license_key: &str) -> String {
        let digest = hex::encode(Sha256::digest(license_key.as_bytes()));
        format!("{}_license_status_{}", self.config.slug, &digest[..16])
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.cache.get(key).await {
            Ok(value) => value?,
            Err(e) => {
                warn!("Cache read for '{}' failed: {}", key, e);
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring unreadable cache entry '{}': {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize cache entry '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!("Cache write for '{}' failed: {}", key, e);
        }
    }
}
