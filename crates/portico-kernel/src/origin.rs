//! Origin identity.
//!
//! An origin is a logical backend cluster the gateway proxies requests to.
//! [`OriginName`] carries the names the rest of the system uses to find its
//! configuration: the client name namespaces every dynamic pool property.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Infix between the client name and the knob suffix of a pool property key.
pub const POOL_PROPERTY_NAMESPACE: &str = "netty.client";

/// Identity of one origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginName {
    /// Client-configuration identifier; namespace of dynamic pool properties.
    client_name: String,
    /// VIP or other target string the origin resolves to.
    target: String,
    /// Application owning the origin.
    authority: String,
    /// `false` when `authority` was guessed from the VIP.
    authority_trusted: bool,
}

impl OriginName {
    /// Origin addressed by VIP alone; the VIP doubles as client name and the
    /// authority is guessed from it (see [`app_name_from_vip`]).
    pub fn from_vip(vip: impl Into<String>) -> Self {
        let vip = vip.into();
        Self {
            client_name: vip.clone(),
            authority: app_name_from_vip(&vip).to_string(),
            target: vip,
            authority_trusted: false,
        }
    }

    /// Origin addressed by VIP with a known owning application.
    pub fn from_vip_and_app(vip: impl Into<String>, app: impl Into<String>) -> Self {
        let vip = vip.into();
        Self::from_vip_and_app_with_client(vip.clone(), app, vip)
    }

    /// Origin addressed by VIP with a known application and an explicit client name.
    pub fn from_vip_and_app_with_client(
        vip: impl Into<String>,
        app: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            target: vip.into(),
            authority: app.into(),
            authority_trusted: true,
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn is_authority_trusted(&self) -> bool {
        self.authority_trusted
    }

    /// Dynamic property key for a pool knob: `<client_name>.netty.client.<suffix>`.
    pub fn property_key(&self, suffix: &str) -> String {
        format!("{}.{POOL_PROPERTY_NAMESPACE}.{suffix}", self.client_name)
    }
}

impl fmt::Display for OriginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OriginName{{client_name='{}', target='{}', authority='{}'}}",
            self.client_name, self.target, self.authority
        )
    }
}

/// Best-effort application name for a VIP such as `api-prod:7001`: the text
/// before the port, cut at the first `-`.
pub fn app_name_from_vip(vip: &str) -> &str {
    let host = vip.split(':').next().unwrap_or(vip);
    host.split('-').next().unwrap_or(host)
}
