use crate::skim_browser::page::SkimPage;
use anyhow::{anyhow, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use skim_config::BrowserConfig;
use std::collections::HashMap;
use tracing::{info, warn};
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct SkimDriver {
    pub client: Client,
}

/// Chrome command-line arguments for `config`.
pub fn build_chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-notifications".to_string(),
        format!(
            "--window-size={},{}",
            config.window_size.0, config.window_size.1
        ),
    ];
    if let Some(ua) = &config.user_agent {
        args.push(format!("--user-agent={ua}"));
    }
    if let Some(dir) = &config.profile_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
        args.push("--profile-directory=Default".to_string());
    }
    if config.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

fn full_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    let mut chrome_opts = HashMap::new();
    chrome_opts.insert("args".to_string(), json!(build_chrome_arguments(config)));
    chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));
    chrome_opts.insert("useAutomationExtension".to_string(), json!(false));
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

/// Capabilities without the user profile or automation switches; used when
/// the full set is rejected (typically a locked profile directory).
fn bare_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut args = vec![format!(
        "--window-size={},{}",
        config.window_size.0, config.window_size.1
    )];
    if config.headless {
        args.push("--headless".to_string());
    }
    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

impl SkimDriver {
    /// Connect to the WebDriver service named in `config`.
    ///
    /// The full capability set is tried first, then a bare one. The error
    /// carries both causes when neither session can be created.
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let endpoint = config.webdriver_url.as_str();
        let client = match ClientBuilder::native()
            .capabilities(full_capabilities(config))
            .connect(endpoint)
            .await
        {
            Ok(client) => client,
            Err(first) => {
                warn!(
                    target: "skim.driver",
                    %endpoint,
                    error = %first,
                    "session with full capabilities failed; retrying with bare capabilities"
                );
                ClientBuilder::native()
                    .capabilities(bare_capabilities(config))
                    .connect(endpoint)
                    .await
                    .map_err(|second| {
                        anyhow!("could not start a browser session at {endpoint}: {first}; retry: {second}")
                    })?
            }
        };
        info!(target: "skim.driver", %endpoint, headless = config.headless, "browser session started");

        Ok(Self { client })
    }

    /// A page handle sharing this driver's session.
    pub fn page(&self) -> SkimPage {
        SkimPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn headless_adds_headless_flags() {
        let config = BrowserConfig {
            headless: true,
            ..BrowserConfig::default()
        };
        let args = build_chrome_arguments(&config);
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--window-size=1440,900".to_string()));
    }

    #[test]
    fn profile_and_user_agent_are_passed_through() {
        let config = BrowserConfig {
            user_agent: Some("TestAgent/1.0".into()),
            profile_dir: Some(PathBuf::from("/tmp/profile")),
            ..BrowserConfig::default()
        };
        let args = build_chrome_arguments(&config);
        assert!(args.contains(&"--user-agent=TestAgent/1.0".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(!args.iter().any(|a| a == "--headless"));
    }

    #[test]
    fn bare_capabilities_drop_profile() {
        let config = BrowserConfig {
            profile_dir: Some(PathBuf::from("/tmp/profile")),
            ..BrowserConfig::default()
        };
        let caps = bare_capabilities(&config);
        let rendered = serde_json::to_string(&caps).unwrap();
        assert!(!rendered.contains("user-data-dir"));
        assert!(full_capabilities(&config)["goog:chromeOptions"]["args"]
            .to_string()
            .contains("user-data-dir"));
    }
}
