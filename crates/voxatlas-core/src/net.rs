use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::CollectorConfig;
use crate::Result;

/// Thin HTTP client shared by the network collectors. Carries the user
/// agent, both timeouts, and the fixed inter-request pause.
pub struct ApiClient {
    inner: Client,
    delay: Duration,
}

impl ApiClient {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(random_user_agent);

        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            inner,
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self
            .inner
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// GET a text document (the paper search API answers with Atom XML).
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        let response = self
            .inner
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    /// The fixed pause between consecutive calls. Politeness only, not
    /// backpressure.
    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

fn random_user_agent() -> String {
    use rand::Rng;

    let agents = [
        "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Windows NT 10.0; rv:115.0) Gecko/20100101 Firefox/115.0",
        "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:128.0) Gecko/20100101 Firefox/128.0",
    ];

    let mut rng = rand::rng();
    agents[rng.random_range(0..agents.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_defaults() {
        let config = CollectorConfig::default();
        assert!(ApiClient::new(&config).is_ok());
    }

    #[test]
    fn test_random_user_agent_is_valid() {
        let ua = random_user_agent();

        assert!(ua.contains("Mozilla"));
        assert!(ua.contains("Firefox"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_uses_configured_delay() {
        let config = CollectorConfig::default().with_delay_ms(1500);
        let client = ApiClient::new(&config).unwrap();

        let before = tokio::time::Instant::now();
        client.pause().await;
        assert_eq!(before.elapsed(), Duration::from_millis(1500));
    }
}
