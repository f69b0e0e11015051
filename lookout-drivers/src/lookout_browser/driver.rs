use crate::lookout_browser::page::LivePage;
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use lookout_config::BrowserSettings;
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct LookoutDriver {
    pub client: Client,
    settings: BrowserSettings,
}

/// Chrome command-line arguments for the configured window.
pub fn chrome_arguments(settings: &BrowserSettings) -> Vec<String> {
    let mut args = vec![
        format!("--window-size={},{}", settings.window_width, settings.window_height),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];
    if settings.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

impl LookoutDriver {
    /// Connect to the WebDriver service at `settings.webdriver_url`.
    pub async fn connect(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(chrome_arguments(settings)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await
            .with_context(|| format!("connecting to webdriver at {}", settings.webdriver_url))?;

        if let Err(err) = client
            .set_window_size(settings.window_width, settings.window_height)
            .await
        {
            tracing::warn!(target: "lookout.driver", error = %err, "driver.window_size.failed");
        }
        tracing::info!(
            target: "lookout.driver",
            url = %settings.webdriver_url,
            headless = settings.headless,
            "driver.connected"
        );

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// Navigate to `url` and wait for the document to finish loading.
    pub async fn goto(&self, url: &str) -> Result<LivePage> {
        let page = self.page();
        page.goto(url).await?;
        Ok(page)
    }

    /// The page currently loaded in the session.
    pub fn page(&self) -> LivePage {
        LivePage::new(self.client.clone(), &self.settings)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
