//! WebDriver scraper
//!
//! Drives a real browser through a WebDriver server and turns every
//! interactive node of the loaded page into an `ElementRecord`.

use std::collections::BTreeMap;
use std::path::Path;

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};

use crate::core::config::BrowserConfig;
use crate::core::{ElementRecord, HealerError, Location, Result, Size};
use crate::tools::browser::snapshot::{is_interactive_tag, write_snapshot, ATTRIBUTES};

/// Captures DOM snapshots through WebDriver
pub struct Snapshotter {
    config: BrowserConfig,
}

impl Snapshotter {
    /// Create a new snapshotter
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// WebDriver capabilities for the configured browser
    fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();

        match self.config.browser.to_lowercase().as_str() {
            "firefox" => {
                let mut args = Vec::new();
                if self.config.headless {
                    args.push("--headless".to_string());
                }
                caps.insert("browserName".to_string(), json!("firefox"));
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            _ => {
                let mut args = vec!["--no-sandbox".to_string()];
                if self.config.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                caps.insert("browserName".to_string(), json!("chrome"));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }

    async fn connect(&self) -> Result<Client> {
        tracing::debug!(webdriver = %self.config.webdriver_url, "Connecting to WebDriver");

        ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| {
                HealerError::browser(format!(
                    "Cannot start a {} session at {}: {}. Is chromedriver/geckodriver running?",
                    self.config.browser, self.config.webdriver_url, e
                ))
            })
    }

    /// Load `url` and return its interactive elements in document order
    pub async fn capture(&self, url: &str) -> Result<Vec<ElementRecord>> {
        let client = self.connect().await?;
        let result = scrape_page(&client, url).await;

        // Close the session even if scraping failed
        if let Err(e) = client.close().await {
            tracing::warn!("Failed to close WebDriver session: {}", e);
        }

        result
    }

    /// Capture `url` and write the snapshot to `path`, returning the element count
    pub async fn dump(&self, url: &str, path: &Path) -> Result<usize> {
        let records = self.capture(url).await?;
        write_snapshot(path, &records).await?;
        tracing::info!(count = records.len(), path = %path.display(), "UI dumped");
        Ok(records.len())
    }
}

async fn scrape_page(client: &Client, url: &str) -> Result<Vec<ElementRecord>> {
    client
        .goto(url)
        .await
        .map_err(|e| HealerError::browser(format!("Failed to open {}: {}", url, e)))?;

    let elements = client
        .find_all(Locator::XPath("//*"))
        .await
        .map_err(|e| HealerError::browser(format!("Failed to enumerate elements: {}", e)))?;

    let total = elements.len();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for element in elements {
        match extract_element(&element).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping element: {}", e);
            }
        }
    }

    tracing::debug!(total, kept = records.len(), skipped, "Scraped page");
    Ok(records)
}

/// Extract one element, or `None` when its tag is not interactive
async fn extract_element(
    element: &Element,
) -> std::result::Result<Option<ElementRecord>, fantoccini::error::CmdError> {
    let tag = element.tag_name().await?.to_lowercase();
    if !is_interactive_tag(&tag) {
        return Ok(None);
    }

    let mut attributes = BTreeMap::new();
    for name in ATTRIBUTES {
        if let Some(value) = element.attr(name).await? {
            if !value.is_empty() {
                attributes.insert(name.to_string(), value);
            }
        }
    }

    let (x, y, width, height) = element.rectangle().await?;

    Ok(Some(ElementRecord {
        tag,
        text: element.text().await?.trim().to_string(),
        attributes,
        visible: element.is_displayed().await?,
        enabled: element.is_enabled().await?,
        location: Location {
            x: x.round() as i64,
            y: y.round() as i64,
        },
        size: Size {
            width: width.round() as i64,
            height: height.round() as i64,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(browser: &str, headless: bool) -> BrowserConfig {
        BrowserConfig {
            webdriver_url: "http://localhost:9515".into(),
            browser: browser.into(),
            headless,
        }
    }

    #[test]
    fn test_chrome_headless_capabilities() {
        let caps = Snapshotter::new(config("chrome", true)).capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert_eq!(caps["browserName"], "chrome");
    }

    #[test]
    fn test_firefox_headed_capabilities() {
        let caps = Snapshotter::new(config("Firefox", false)).capabilities();
        assert_eq!(caps["browserName"], "firefox");
        assert!(caps["moz:firefoxOptions"]["args"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires chromedriver on localhost:9515
    async fn test_capture_example_com() {
        let snapshotter = Snapshotter::new(config("chrome", true));
        let records = snapshotter.capture("https://example.com").await.unwrap();
        assert!(records.iter().all(|r| is_interactive_tag(&r.tag)));
        assert!(records.iter().any(|r| r.tag == "a"));
    }
}
