//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target portal settings
    #[serde(default)]
    pub portal: PortalConfig,

    /// Harvest loop behavior settings
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Page element identifiers
    #[serde(default)]
    pub elements: ElementIds,

    /// Site error message fragments used for outcome classification
    #[serde(default)]
    pub messages: SiteMessages,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.portal.url.trim().is_empty() {
            return Err(AppError::validation("portal.url is empty"));
        }
        if self.portal.password.is_empty() {
            return Err(AppError::validation("portal.password is empty"));
        }
        if self.harvest.result_timeout_secs == 0 {
            return Err(AppError::validation(
                "harvest.result_timeout_secs must be > 0",
            ));
        }
        if self.harvest.key_width == 0 {
            return Err(AppError::validation("harvest.key_width must be > 0"));
        }
        if self.messages.no_data.is_empty() || self.messages.bad_captcha.is_empty() {
            return Err(AppError::validation("site message fragments are empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            harvest: HarvestConfig::default(),
            elements: ElementIds::default(),
            messages: SiteMessages::default(),
        }
    }
}

/// Target portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Result page URL
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Fixed password value the site accepts for every enrollment
    #[serde(default = "defaults::password")]
    pub password: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            password: defaults::password(),
        }
    }
}

/// Harvest loop behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Seconds to wait for the result or message region after submit
    #[serde(default = "defaults::result_timeout")]
    pub result_timeout_secs: u64,

    /// Total width of an enrollment number, prefix plus padded suffix
    #[serde(default = "defaults::key_width")]
    pub key_width: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            result_timeout_secs: defaults::result_timeout(),
            key_width: defaults::key_width(),
        }
    }
}

/// DOM element ids on the result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementIds {
    #[serde(default = "defaults::exam_select")]
    pub exam_select: String,
    #[serde(default = "defaults::enrollment_field")]
    pub enrollment_field: String,
    #[serde(default = "defaults::password_field")]
    pub password_field: String,
    #[serde(default = "defaults::captcha_field")]
    pub captcha_field: String,
    #[serde(default = "defaults::captcha_image")]
    pub captcha_image: String,
    #[serde(default = "defaults::submit_button")]
    pub submit_button: String,
    #[serde(default = "defaults::message_label")]
    pub message_label: String,
    #[serde(default = "defaults::name_label")]
    pub name_label: String,
    #[serde(default = "defaults::exam_label")]
    pub exam_label: String,
    #[serde(default = "defaults::current_back_label")]
    pub current_back_label: String,
    #[serde(default = "defaults::total_back_label")]
    pub total_back_label: String,
    #[serde(default = "defaults::spi_label")]
    pub spi_label: String,
    #[serde(default = "defaults::cpi_label")]
    pub cpi_label: String,
    #[serde(default = "defaults::cgpa_label")]
    pub cgpa_label: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            exam_select: defaults::exam_select(),
            enrollment_field: defaults::enrollment_field(),
            password_field: defaults::password_field(),
            captcha_field: defaults::captcha_field(),
            captcha_image: defaults::captcha_image(),
            submit_button: defaults::submit_button(),
            message_label: defaults::message_label(),
            name_label: defaults::name_label(),
            exam_label: defaults::exam_label(),
            current_back_label: defaults::current_back_label(),
            total_back_label: defaults::total_back_label(),
            spi_label: defaults::spi_label(),
            cpi_label: defaults::cpi_label(),
            cgpa_label: defaults::cgpa_label(),
        }
    }
}

/// Error message fragments emitted by the site, matched by substring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMessages {
    #[serde(default = "defaults::no_data")]
    pub no_data: String,
    #[serde(default = "defaults::bad_captcha")]
    pub bad_captcha: String,
}

impl Default for SiteMessages {
    fn default() -> Self {
        Self {
            no_data: defaults::no_data(),
            bad_captcha: defaults::bad_captcha(),
        }
    }
}

mod defaults {
    // Portal defaults
    pub fn url() -> String {
        "https://www.gturesults.in/".into()
    }
    pub fn password() -> String {
        "1234".into()
    }

    // Harvest defaults
    pub fn result_timeout() -> u64 {
        5
    }
    pub fn key_width() -> usize {
        12
    }

    // Element id defaults, as rendered by the result page
    pub fn exam_select() -> String {
        "ddlbatch".into()
    }
    pub fn enrollment_field() -> String {
        "txtenroll".into()
    }
    pub fn password_field() -> String {
        "txtpassword".into()
    }
    pub fn captcha_field() -> String {
        "CodeNumberTextBox".into()
    }
    pub fn captcha_image() -> String {
        "imgCaptcha".into()
    }
    pub fn submit_button() -> String {
        "btnSearch".into()
    }
    pub fn message_label() -> String {
        "lblmsg".into()
    }
    pub fn name_label() -> String {
        "lblName".into()
    }
    pub fn exam_label() -> String {
        "lblExam".into()
    }
    pub fn current_back_label() -> String {
        "lblCUPBack".into()
    }
    pub fn total_back_label() -> String {
        "lblTotalBack".into()
    }
    pub fn spi_label() -> String {
        "lblSPI".into()
    }
    pub fn cpi_label() -> String {
        "lblCPI".into()
    }
    pub fn cgpa_label() -> String {
        "lblCGPA".into()
    }

    // Site message defaults (case-sensitive, matched by substring)
    pub fn no_data() -> String {
        "Data not available".into()
    }
    pub fn bad_captcha() -> String {
        "Incorrect captcha".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let mut config = Config::default();
        config.portal.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.harvest.result_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_roundtrip_from_toml() {
        let toml_src = r#"
            [portal]
            password = "0000"

            [harvest]
            result_timeout_secs = 10
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.portal.password, "0000");
        assert_eq!(config.harvest.result_timeout_secs, 10);
        // Unspecified sections fall back to defaults
        assert_eq!(config.elements.message_label, "lblmsg");
        assert_eq!(config.harvest.key_width, 12);
    }
}
