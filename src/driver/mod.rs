//! Page actor abstraction.
//!
//! The engine never talks to a browser directly; it drives the result page
//! through this capability surface. The `browser` feature supplies a real
//! Chrome-backed implementation.

#[cfg(feature = "browser")]
pub mod browser;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "browser")]
pub use browser::PortalBrowser;

/// Trait for anything that can drive the result page.
///
/// All element references are DOM ids (see `ElementIds` in the config).
#[async_trait]
pub trait PageActor: Send + Sync {
    /// Clear a form field and type a value into it.
    async fn fill_field(&self, id: &str, value: &str) -> Result<()>;

    /// Read the text of an element. `None` when the element is absent.
    async fn read_field(&self, id: &str) -> Result<Option<String>>;

    /// Whether an element is currently present on the page.
    async fn element_present(&self, id: &str) -> Result<bool>;

    /// Choose a dropdown option by value.
    async fn select_option(&self, id: &str, value: &str) -> Result<()>;

    /// Submit the lookup form.
    async fn submit(&self) -> Result<()>;

    /// Wait until any of the elements is present, up to `timeout`.
    /// Returns `false` when none appeared in time.
    async fn wait_for_any(&self, ids: &[&str], timeout: Duration) -> Result<bool>;

    /// Capture an element as image bytes (the captcha).
    async fn extract_image(&self, id: &str) -> Result<Vec<u8>>;

    /// Release the underlying browser resource.
    async fn close(&self) -> Result<()>;
}
