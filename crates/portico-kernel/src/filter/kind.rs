use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage a filter runs in.
///
/// The short name (`in`, `out`, `end`) is the canonical textual form: it is
/// what [`build_id`](super::build_id) embeds and what serialized records carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterType {
    /// Runs on the request path before the endpoint.
    #[serde(rename = "in", alias = "inbound")]
    Inbound,
    /// Runs on the response path after the endpoint.
    #[serde(rename = "out", alias = "outbound")]
    Outbound,
    /// Produces the response (proxies to an origin or answers directly).
    #[serde(rename = "end", alias = "endpoint")]
    Endpoint,
}

impl FilterType {
    /// Short name used in filter ids.
    pub fn short_name(&self) -> &'static str {
        match self {
            FilterType::Inbound => "in",
            FilterType::Outbound => "out",
            FilterType::Endpoint => "end",
        }
    }

    /// Case-insensitive parse accepting both the short and the long name.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "in" | "inbound" => Some(FilterType::Inbound),
            "out" | "outbound" => Some(FilterType::Outbound),
            "end" | "endpoint" => Some(FilterType::Endpoint),
            _ => None,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_ci(s).ok_or_else(|| format!("unknown filter type: {s}"))
    }
}
