//! Chrome-backed page actor.
//!
//! Launches a headful browser, navigates to the result portal and drives it
//! through the CDP. Headful on purpose: the operator watches the page while
//! answering captchas.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::driver::PageActor;
use crate::error::{AppError, Result};
use crate::models::Config;

/// Real browser session on the result portal.
pub struct PortalBrowser {
    page: Page,
    submit_button: String,
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
}

impl PortalBrowser {
    /// Launch Chrome and open the portal page.
    pub async fn open(config: &Config) -> Result<Self> {
        let browser_config = BrowserConfig::builder()
            .with_head()
            .window_size(960, 1080)
            .build()
            .map_err(|e| AppError::driver("browser launch", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::driver("browser launch", e))?;

        // The handler stream must be polled for the whole session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page(&config.portal.url)
            .await
            .map_err(|e| AppError::driver("open portal", e))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| AppError::driver("open portal", e))?;

        Ok(Self {
            page,
            submit_button: config.elements.submit_button.clone(),
            browser: Mutex::new(Some(browser)),
            handler_task,
        })
    }

    fn selector(id: &str) -> String {
        format!("#{}", id)
    }
}

#[async_trait]
impl PageActor for PortalBrowser {
    async fn fill_field(&self, id: &str, value: &str) -> Result<()> {
        // Clear any previous value before typing
        self.page
            .evaluate(format!(
                "document.getElementById('{}').value = ''",
                id
            ))
            .await
            .map_err(|e| AppError::driver(id, e))?;

        let element = self
            .page
            .find_element(Self::selector(id))
            .await
            .map_err(|e| AppError::driver(id, e))?;
        element.click().await.map_err(|e| AppError::driver(id, e))?;
        element
            .type_str(value)
            .await
            .map_err(|e| AppError::driver(id, e))?;
        Ok(())
    }

    async fn read_field(&self, id: &str) -> Result<Option<String>> {
        let Ok(element) = self.page.find_element(Self::selector(id)).await else {
            return Ok(None);
        };
        let text = element
            .inner_text()
            .await
            .map_err(|e| AppError::driver(id, e))?;
        Ok(text.map(|t| t.trim().to_string()))
    }

    async fn element_present(&self, id: &str) -> Result<bool> {
        Ok(self.page.find_element(Self::selector(id)).await.is_ok())
    }

    async fn select_option(&self, id: &str, value: &str) -> Result<()> {
        // Set the <select> value and fire the change event the site listens on
        self.page
            .evaluate(format!(
                "const s = document.getElementById('{}'); \
                 s.value = '{}'; \
                 s.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                id, value
            ))
            .await
            .map_err(|e| AppError::driver(id, e))?;
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let element = self
            .page
            .find_element(Self::selector(&self.submit_button))
            .await
            .map_err(|e| AppError::driver("submit", e))?;
        element
            .click()
            .await
            .map_err(|e| AppError::driver("submit", e))?;
        Ok(())
    }

    async fn wait_for_any(&self, ids: &[&str], timeout: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            for id in ids {
                if self.element_present(id).await? {
                    return Ok(true);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn extract_image(&self, id: &str) -> Result<Vec<u8>> {
        let element = self
            .page
            .find_element(Self::selector(id))
            .await
            .map_err(|e| AppError::driver(id, e))?;
        element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(|e| AppError::driver(id, e))
    }

    async fn close(&self) -> Result<()> {
        if let Some(mut browser) = self.browser.lock().await.take() {
            browser
                .close()
                .await
                .map_err(|e| AppError::driver("browser close", e))?;
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        Ok(())
    }
}
