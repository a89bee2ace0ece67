//! Supported cloud providers and their "add remote" forms
//!
//! Browser providers are created with no parameters and let rclone run its
//! OAuth flow. Manual providers need explicit fields, validated here before
//! anything is invoked.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::utils::types::errors::{CloudMountError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Drive,
    Dropbox,
    OneDrive,
    PCloud,
    Box,
    Yandex,
    Mega,
    Nextcloud,
    WebDav,
    S3,
}

pub const S3_VENDORS: [&str; 5] = ["AWS", "Minio", "Wasabi", "DigitalOcean", "Other"];
pub const DEFAULT_S3_VENDOR: &str = "Minio";

/// Parameter keys whose values never reach the logs.
const SENSITIVE_KEYS: [&str; 5] = ["pass", "secret_access_key", "2fa", "token", "password"];

impl Provider {
    pub const ALL: [Provider; 10] = [
        Provider::Drive,
        Provider::Dropbox,
        Provider::OneDrive,
        Provider::PCloud,
        Provider::Box,
        Provider::Yandex,
        Provider::Mega,
        Provider::Nextcloud,
        Provider::WebDav,
        Provider::S3,
    ];

    /// rclone backend type passed to `rclone config create`
    pub fn rclone_type(self) -> &'static str {
        match self {
            Provider::Drive => "drive",
            Provider::Dropbox => "dropbox",
            Provider::OneDrive => "onedrive",
            Provider::PCloud => "pcloud",
            Provider::Box => "box",
            Provider::Yandex => "yandex",
            Provider::Mega => "mega",
            Provider::Nextcloud | Provider::WebDav => "webdav",
            Provider::S3 => "s3",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Drive => "Google Drive",
            Provider::Dropbox => "Dropbox",
            Provider::OneDrive => "OneDrive",
            Provider::PCloud => "pCloud",
            Provider::Box => "Box",
            Provider::Yandex => "Yandex Disk",
            Provider::Mega => "Mega.nz",
            Provider::Nextcloud => "Nextcloud / Owncloud",
            Provider::WebDav => "WebDAV",
            Provider::S3 => "S3 / MinIO / AWS",
        }
    }

    /// Authorised through the browser; takes no form fields.
    pub fn is_oauth(self) -> bool {
        matches!(
            self,
            Provider::Drive
                | Provider::Dropbox
                | Provider::OneDrive
                | Provider::PCloud
                | Provider::Box
                | Provider::Yandex
        )
    }

    /// Validate form `fields` and turn them into `rclone config create`
    /// parameters. Empty values count as missing.
    pub fn build_parameters(
        self,
        fields: &HashMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let field = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let required = |key: &str| {
            field(key).ok_or_else(|| {
                CloudMountError::InvalidInput(format!(
                    "{} needs a value for '{key}'",
                    self.display_name()
                ))
            })
        };

        let mut params = BTreeMap::new();
        match self {
            Provider::Drive
            | Provider::Dropbox
            | Provider::OneDrive
            | Provider::PCloud
            | Provider::Box
            | Provider::Yandex => {}
            Provider::Nextcloud | Provider::WebDav => {
                params.insert("url".to_string(), required("url")?);
                params.insert("user".to_string(), field("user").unwrap_or_default());
                params.insert("pass".to_string(), field("pass").unwrap_or_default());
                let vendor = if self == Provider::Nextcloud {
                    "nextcloud"
                } else {
                    "other"
                };
                params.insert("vendor".to_string(), vendor.to_string());
            }
            Provider::Mega => {
                params.insert("user".to_string(), required("user")?);
                params.insert("pass".to_string(), required("pass")?);
                if let Some(code) = field("2fa") {
                    params.insert("2fa".to_string(), code);
                }
            }
            Provider::S3 => {
                let access_key = required("access_key_id")?;
                let vendor = field("provider").unwrap_or_else(|| DEFAULT_S3_VENDOR.to_string());
                if !S3_VENDORS.contains(&vendor.as_str()) {
                    return Err(CloudMountError::InvalidInput(format!(
                        "unknown S3 provider '{vendor}', expected one of {}",
                        S3_VENDORS.join(", ")
                    )));
                }
                params.insert("provider".to_string(), vendor);
                params.insert("env_auth".to_string(), "false".to_string());
                params.insert("access_key_id".to_string(), access_key);
                params.insert(
                    "secret_access_key".to_string(),
                    field("secret_access_key").unwrap_or_default(),
                );
                if let Some(endpoint) = field("endpoint") {
                    params.insert("endpoint".to_string(), endpoint);
                }
            }
        }
        Ok(params)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = CloudMountError;

    fn from_str(s: &str) -> Result<Self> {
        let provider = match s.to_ascii_lowercase().as_str() {
            "drive" | "gdrive" | "google" => Provider::Drive,
            "dropbox" => Provider::Dropbox,
            "onedrive" => Provider::OneDrive,
            "pcloud" => Provider::PCloud,
            "box" => Provider::Box,
            "yandex" => Provider::Yandex,
            "mega" => Provider::Mega,
            "nextcloud" | "owncloud" => Provider::Nextcloud,
            "webdav" => Provider::WebDav,
            "s3" | "minio" | "aws" => Provider::S3,
            other => {
                return Err(CloudMountError::InvalidInput(format!(
                    "unknown provider '{other}'"
                )));
            }
        };
        Ok(provider)
    }
}

/// Remote names become config section headers, directory names and unit
/// names, so they must be plain tokens.
pub fn validate_remote_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CloudMountError::InvalidInput(
            "remote name cannot be empty".into(),
        ));
    }
    if name.starts_with('-') || name.starts_with('.') {
        return Err(CloudMountError::InvalidInput(format!(
            "remote name '{name}' cannot start with '-' or '.'"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '[' | ']' | ':' | '/' | '\\'))
    {
        return Err(CloudMountError::InvalidInput(format!(
            "remote name '{name}' cannot contain '{bad}'"
        )));
    }
    Ok(())
}

/// Copy of `params` with secret values masked, for logging.
pub fn redact_parameters(params: &BTreeMap<String, String>) -> Value {
    let map = params
        .iter()
        .map(|(k, v)| {
            let value = if SENSITIVE_KEYS.contains(&k.as_str()) && !v.is_empty() {
                "[REDACTED]".to_string()
            } else {
                v.clone()
            };
            (k.clone(), Value::String(value))
        })
        .collect();
    Value::Object(map)
}
