use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::format::format_bytes;

/// Storage usage reported by `rclone about --json`.
///
/// Providers omit fields they do not track, so every field defaults to 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub used: i64,
    #[serde(default)]
    pub free: i64,
    #[serde(default)]
    pub trashed: i64,
}

impl Quota {
    /// Used fraction in `0.0..=1.0`, or `None` when the provider has no limit.
    pub fn used_fraction(&self) -> Option<f64> {
        if self.total <= 0 {
            return None;
        }
        Some((self.used as f64 / self.total as f64).clamp(0.0, 1.0))
    }
}

/// What a remote card shows in its quota row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum QuotaSummary {
    /// Not queried yet
    Pending,
    /// Queried, but the provider gave nothing usable
    Unknown,
    Unlimited,
    Limited { used: i64, total: i64, fraction: f64 },
}

impl QuotaSummary {
    /// Build the summary from a quota-cache lookup.
    ///
    /// The outer `Option` is cache presence; the inner one is whether the
    /// query produced data.
    pub fn from_cached(entry: Option<Option<Quota>>) -> Self {
        match entry {
            None => Self::Pending,
            Some(None) => Self::Unknown,
            Some(Some(q)) => match q.used_fraction() {
                Some(fraction) => Self::Limited {
                    used: q.used,
                    total: q.total,
                    fraction,
                },
                None => Self::Unlimited,
            },
        }
    }
}

impl fmt::Display for QuotaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Calculating..."),
            Self::Unknown => write!(f, "Info unavailable"),
            Self::Unlimited => write!(f, "Unlimited space"),
            Self::Limited { used, total, .. } => {
                write!(f, "{} / {}", format_bytes(*used), format_bytes(*total))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_about_output() {
        let json = r#"{"total":16106127360,"used":5368709120,"free":10737418240,"trashed":1024}"#;
        let q: Quota = serde_json::from_str(json).unwrap();
        assert_eq!(q.total, 16106127360);
        assert_eq!(q.used, 5368709120);
        assert_eq!(q.free, 10737418240);
        assert_eq!(q.trashed, 1024);
    }

    #[test]
    fn test_decode_partial_about_output() {
        // WebDAV servers often report only usage
        let q: Quota = serde_json::from_str(r#"{"used":42}"#).unwrap();
        assert_eq!(q.used, 42);
        assert_eq!(q.total, 0);
        assert_eq!(q.used_fraction(), None);
    }

    #[test]
    fn test_summary_states() {
        assert_eq!(QuotaSummary::from_cached(None), QuotaSummary::Pending);
        assert_eq!(QuotaSummary::from_cached(Some(None)), QuotaSummary::Unknown);

        let unlimited = Quota {
            used: 10,
            ..Default::default()
        };
        assert_eq!(
            QuotaSummary::from_cached(Some(Some(unlimited))),
            QuotaSummary::Unlimited
        );

        let limited = Quota {
            total: 1024 * 1024,
            used: 512 * 1024,
            ..Default::default()
        };
        let summary = QuotaSummary::from_cached(Some(Some(limited)));
        assert_eq!(
            summary,
            QuotaSummary::Limited {
                used: 512 * 1024,
                total: 1024 * 1024,
                fraction: 0.5
            }
        );
        assert_eq!(summary.to_string(), "512.00 KB / 1.00 MB");
    }
}
