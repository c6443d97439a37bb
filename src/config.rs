//! Site Configuration
//!
//! Defaults cover the stock page. A page may override any field with a JSON
//! document in `<script id="site-config" type="application/json">`.

use page_kit::Dom;
use serde::Deserialize;

use crate::error::{SiteError, SiteResult};

/// Element id of the embedded JSON config
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Page sections, in injection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Navbar,
    Hero,
    About,
    Services,
    Contact,
    Footer,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Navbar,
        Section::Hero,
        Section::About,
        Section::Services,
        Section::Contact,
        Section::Footer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Navbar => "navbar",
            Section::Hero => "hero",
            Section::About => "about",
            Section::Services => "services",
            Section::Contact => "contact",
            Section::Footer => "footer",
        }
    }

    /// Id of the container the fragment is injected into
    pub fn mount_id(self) -> &'static str {
        self.name()
    }

    /// Fragment file name under the fragment base path
    pub fn resource(self) -> &'static str {
        match self {
            Section::Navbar => "navbar.html",
            Section::Hero => "hero.html",
            Section::About => "about.html",
            Section::Services => "services.html",
            Section::Contact => "contact.html",
            Section::Footer => "footer.html",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory (relative to the page) holding the fragment files
    pub fragment_base: String,
    /// Per-fragment fetch timeout
    pub fetch_timeout_ms: u32,
    /// Scroll offset past which the navbar gets its `scrolled` style
    pub navbar_scroll_threshold: f64,
    /// A section becomes active this many pixels before its top is reached
    pub section_lookahead: f64,
    /// Fraction of a section that must be visible to reveal it
    pub reveal_threshold: f64,
    /// IntersectionObserver root margin for reveals
    pub reveal_root_margin: String,
    /// Minimum interval between scroll handler runs
    pub scroll_throttle_ms: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            fragment_base: "components".to_string(),
            fetch_timeout_ms: 10_000,
            navbar_scroll_threshold: 100.0,
            section_lookahead: 150.0,
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            scroll_throttle_ms: 50,
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> SiteResult<Self> {
        let config: SiteConfig = serde_json::from_str(json).map_err(|e| SiteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the embedded config, falling back to defaults
    pub fn from_page<D: Dom + ?Sized>(dom: &D) -> Self {
        let Some(json) = dom
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| dom.text_content(&el))
        else {
            tracing::debug!("No embedded site config, using defaults");
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring embedded site config: {}", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> SiteResult<()> {
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(SiteError::Config(format!(
                "revealThreshold must be within 0..=1, got {}",
                self.reveal_threshold
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SiteError::Config("fetchTimeoutMs must be positive".to_string()));
        }
        Ok(())
    }

    /// Relative URL of a section's fragment
    pub fn fragment_path(&self, section: Section) -> String {
        let base = self.fragment_base.trim_end_matches('/');
        if base.is_empty() {
            section.resource().to_string()
        } else {
            format!("{}/{}", base, section.resource())
        }
    }
}
