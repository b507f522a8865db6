use crate::config::types::{
    Config, OutputConfig, PageEntry, RendererKind, ScraperConfig, UserAgentConfig,
};
use crate::url::validate_page_url;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Upper bound on the politeness delay
const MAX_DELAY_CEILING_MS: u64 = 10 * 60 * 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_pages(&config.pages)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.max_delay_ms > MAX_DELAY_CEILING_MS {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms must be <= {}ms, got {}ms",
            MAX_DELAY_CEILING_MS, config.max_delay_ms
        )));
    }

    if config.keyword_match_limit < 1 {
        return Err(ConfigError::Validation(
            "keyword_match_limit must be >= 1".to_string(),
        ));
    }

    if config.render_timeout_secs < 1 || config.render_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "render_timeout_secs must be between 1 and 300, got {}",
            config.render_timeout_secs
        )));
    }

    if config.renderer == RendererKind::Chromium && !cfg!(feature = "chromium") {
        return Err(ConfigError::Validation(
            "renderer = \"chromium\" requires building with the `chromium` feature".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seeded career pages
fn validate_pages(pages: &[PageEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for page in pages {
        if page.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Career page '{}' must have a name",
                page.url
            )));
        }

        validate_page_url(&page.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid career page URL '{}': {}", page.url, e))
        })?;

        if !seen.insert(page.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Career page '{}' is listed more than once",
                page.url
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
