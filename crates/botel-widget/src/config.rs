//! Hosting-page embed configuration.
//!
//! A page embeds the widget by setting `window.BotelWidgetConfig` and
//! loading `/widget/embed.js`. The script forwards the presentational
//! options to the standalone widget page as query parameters. Parsing is
//! deliberately forgiving: unknown keys are ignored and missing, empty or
//! mistyped values fall back to the defaults.

use crate::error::ConfigError;
use botel_types::{ConnectionDetails, WidgetPosition};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

pub const DEFAULT_PRIMARY_COLOR: &str = "#002cf2";
pub const DEFAULT_COMPANY_NAME: &str = "Botel AI";

/// Path of the embed script relative to the widget origin.
pub const EMBED_SCRIPT_PATH: &str = "/widget/embed.js";

/// Path of the page loaded inside the iframe.
pub const STANDALONE_PATH: &str = "/widget-standalone";

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_company_name() -> String {
    DEFAULT_COMPANY_NAME.to_string()
}

fn lenient_position<'de, D>(deserializer: D) -> Result<WidgetPosition, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(WidgetPosition::from_param)
        .unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: WidgetPosition,

    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    #[serde(default = "default_company_name")]
    pub company_name: String,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub server_url: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing
    )]
    pub token: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            position: WidgetPosition::default(),
            primary_color: default_primary_color(),
            company_name: default_company_name(),
            server_url: None,
            token: None,
        }
    }
}

impl WidgetConfig {
    /// Parses the JSON object a host page assigns to `BotelWidgetConfig`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Builds a config from an arbitrary JSON value. Anything that is not
    /// an object yields the defaults.
    pub fn from_value(value: serde_json::Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        let mut object = value;
        // Mistyped colour or name fields must not discard the rest.
        if let Some(map) = object.as_object_mut() {
            for key in ["primaryColor", "companyName"] {
                let keep = map.get(key).and_then(|v| v.as_str()).is_some();
                if !keep {
                    map.remove(key);
                }
            }
        }
        serde_json::from_value::<Self>(object)
            .unwrap_or_default()
            .normalized()
    }

    /// Parses the query string of the standalone widget page.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "position" => config.position = WidgetPosition::from_param(&value),
                "primaryColor" => config.primary_color = value.into_owned(),
                "companyName" => config.company_name = value.into_owned(),
                _ => {}
            }
        }
        config.normalized()
    }

    /// Replaces blank presentational fields with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.primary_color.trim().is_empty() {
            self.primary_color = default_primary_color();
        }
        if self.company_name.trim().is_empty() {
            self.company_name = default_company_name();
        }
        self
    }

    /// Header title of the widget panel.
    pub fn title(&self) -> String {
        format!("{} Assistant", self.company_name)
    }

    /// Connection details supplied directly by the host, if complete.
    pub fn static_details(&self) -> Option<ConnectionDetails> {
        match (&self.server_url, &self.token) {
            (Some(url), Some(token)) => Some(ConnectionDetails::new(url, token)),
            _ => None,
        }
    }

    /// URL of the standalone widget page for this config.
    ///
    /// Only presentational options travel in the query string; the token
    /// never leaves the host page this way.
    pub fn iframe_src(&self, base: &Url) -> Result<Url, ConfigError> {
        let mut src = base.join(STANDALONE_PATH.trim_start_matches('/'))?;
        src.query_pairs_mut()
            .append_pair("position", self.position.as_str())
            .append_pair("primaryColor", &self.primary_color)
            .append_pair("companyName", &self.company_name);
        Ok(src)
    }
}

/// Derives the widget base URL from the URL the embed script was loaded
/// from, e.g. `https://w.example.com/widget/embed.js` becomes
/// `https://w.example.com/`.
pub fn embed_base_url(script_src: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(script_src)?;
    let path = url.path().to_string();
    let base_path = path
        .strip_suffix(EMBED_SCRIPT_PATH)
        .ok_or(ConfigError::UnexpectedScriptPath(EMBED_SCRIPT_PATH))?;
    url.set_path(&format!("{}/", base_path));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
