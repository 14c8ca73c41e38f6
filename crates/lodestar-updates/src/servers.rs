//! Ordered update server list

use tracing::warn;
use url::Url;

use crate::error::{Result, UpdateError};

/// Endpoints in fallback priority order, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerList {
    urls: Vec<Url>,
}

impl ServerList {
    /// Parse base URLs. Only `http` and `https` are accepted.
    pub fn new<I, S>(servers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut urls = Vec::new();
        for raw in servers {
            let raw = raw.as_ref().trim();
            let url = Url::parse(raw).map_err(|source| UpdateError::Url {
                url: raw.to_string(),
                source,
            })?;

            match url.scheme() {
                "https" => {}
                "http" => warn!("Update server {} does not use TLS", url),
                other => {
                    return Err(UpdateError::config(format!(
                        "unsupported scheme '{}' for update server {}",
                        other, raw
                    )))
                }
            }
            urls.push(url);
        }
        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.urls.iter()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// `<server>/<path>` with exactly one slash between them
    pub fn endpoint(server: &Url, path: &str) -> String {
        format!(
            "{}/{}",
            server.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_preserved() {
        let list = ServerList::new(["https://b.example", "https://a.example"]).unwrap();
        let hosts: Vec<_> = list.iter().map(|u| u.host_str().unwrap()).collect();
        assert_eq!(hosts, vec!["b.example", "a.example"]);
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let list = ServerList::new([
            "https://updates.example.com",
            "https://mirror.example.com/api/v1/",
        ])
        .unwrap();

        assert_eq!(
            ServerList::endpoint(&list.urls()[0], "check-update"),
            "https://updates.example.com/check-update"
        );
        assert_eq!(
            ServerList::endpoint(&list.urls()[1], "/license/validate"),
            "https://mirror.example.com/api/v1/license/validate"
        );
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let err = ServerList::new(["not a url"]).unwrap_err();
        assert!(matches!(err, UpdateError::Url { .. }));
    }

    #[test]
    fn test_rejects_other_schemes() {
        let err = ServerList::new(["ftp://updates.example.com"]).unwrap_err();
        assert!(matches!(err, UpdateError::Config { .. }));
    }

    #[test]
    fn test_empty_list_is_allowed() {
        let list = ServerList::new(Vec::<String>::new()).unwrap();
        assert!(list.is_empty());
    }
}
