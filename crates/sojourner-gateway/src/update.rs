use std::cmp::Ordering;

use anyhow::{Context, Result};
use tracing::{info, warn};

const GITHUB_API: &str = "https://api.github.com/repos/sojourner-bot/sojourner/releases/latest";
const USER_AGENT: &str = "sojourner-gateway";

/// Current version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query the GitHub Releases API for the latest published version.
async fn latest_release_version() -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(15))
        .build()?;

    let resp: serde_json::Value = client
        .get(GITHUB_API)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .context("failed to reach GitHub API")?
        .error_for_status()
        .context("GitHub API returned error status")?
        .json()
        .await
        .context("failed to parse GitHub API response")?;

    let tag_name = resp["tag_name"]
        .as_str()
        .context("missing tag_name in release")?;
    Ok(tag_name.strip_prefix('v').unwrap_or(tag_name).to_string())
}

/// Fire-and-forget startup check. Logs a warning when a newer release exists.
pub async fn check_update_on_startup() {
    match latest_release_version().await {
        Ok(latest) => {
            if compare_versions(VERSION, &latest) == Ordering::Less {
                warn!(
                    current = VERSION,
                    latest = %latest,
                    "A new version is available: v{} -> v{}",
                    VERSION,
                    latest
                );
            } else {
                info!(current = VERSION, "running the latest released version");
            }
        }
        Err(e) => warn!(error = %e, "startup update check failed (non-fatal)"),
    }
}

/// Compare two semver version strings (e.g. "0.1.0" vs "0.2.0").
///
/// Returns `Ordering::Less` when `a < b`, `Greater` when `a > b`, etc.
/// Only handles numeric 3-part versions; a leading `v` and pre-release
/// suffixes on the patch component are ignored.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| -> (u64, u64, u64) {
        let s = s.strip_prefix('v').unwrap_or(s);
        let mut parts = s.split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let patch = parts
            .next()
            .and_then(|p| {
                // Strip pre-release suffix: "1-rc.1" -> "1"
                let numeric: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
                numeric.parse().ok()
            })
            .unwrap_or(0);
        (major, minor, patch)
    };
    parse(a).cmp(&parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_compare_basic() {
        assert_eq!(compare_versions("0.1.0", "0.2.0"), Ordering::Less);
        assert_eq!(compare_versions("0.2.0", "0.1.0"), Ordering::Greater);
        assert_eq!(compare_versions("0.1.0", "0.1.0"), Ordering::Equal);
    }

    #[test]
    fn version_compare_with_v_prefix() {
        assert_eq!(compare_versions("v0.1.0", "0.2.0"), Ordering::Less);
        assert_eq!(compare_versions("0.1.0", "v0.2.0"), Ordering::Less);
    }

    #[test]
    fn version_compare_major_minor() {
        assert_eq!(compare_versions("1.0.0", "0.99.99"), Ordering::Greater);
        assert_eq!(compare_versions("0.1.0", "0.0.99"), Ordering::Greater);
    }

    #[test]
    fn version_compare_prerelease_patch() {
        assert_eq!(compare_versions("0.1.1-rc.1", "0.1.1"), Ordering::Equal);
        assert_eq!(compare_versions("0.1.2-rc.1", "0.1.1"), Ordering::Greater);
    }
}
