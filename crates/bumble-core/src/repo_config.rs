//! Remote repository settings entered through the settings form.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BRANCH;

/// Remote repository configuration.
///
/// Empty fields mean "not configured"; which fields are required depends on
/// the operation (see `bumble_storage::Backend`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        RepoConfig {
            owner: String::new(),
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            token: String::new(),
        }
    }
}

impl RepoConfig {
    /// Build a config from raw form values: every field trimmed, blank branch
    /// replaced by `main`.
    pub fn from_form(owner: &str, repo: &str, branch: &str, token: &str) -> Self {
        RepoConfig {
            owner: owner.trim().to_string(),
            repo: repo.trim().to_string(),
            branch: branch.trim().to_string(),
            token: token.trim().to_string(),
        }
        .normalized()
    }

    pub fn normalized(mut self) -> Self {
        if self.branch.trim().is_empty() {
            self.branch = DEFAULT_BRANCH.to_string();
        }
        self
    }

    /// Branch to write to, never blank.
    pub fn branch(&self) -> &str {
        let branch = self.branch.trim();
        if branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            branch
        }
    }

    /// Owner and repository are both set.
    pub fn has_repository(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Default config for a fresh install, with owner/repo inferred from a
    /// GitHub Pages URL when one is known.
    pub fn inferred(pages_url: Option<&str>) -> Self {
        match pages_url.and_then(infer_from_pages_url) {
            Some((owner, repo)) => RepoConfig {
                owner,
                repo,
                ..RepoConfig::default()
            },
            None => RepoConfig::default(),
        }
    }

    /// Load the persisted config. Absent or unreadable records fall back to
    /// [`RepoConfig::inferred`].
    pub fn load(stored: Option<&str>, pages_url: Option<&str>) -> Self {
        let Some(raw) = stored else {
            return Self::inferred(pages_url);
        };
        match serde_json::from_str::<RepoConfig>(raw) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable repository config");
                Self::inferred(pages_url)
            }
        }
    }

    /// Copy safe for logging.
    pub fn redacted(&self) -> RepoConfig {
        RepoConfig {
            token: if self.has_token() {
                "***".to_string()
            } else {
                String::new()
            },
            ..self.clone()
        }
    }
}

/// Extract `(owner, repo)` from `https://<owner>.github.io/<repo>/...`.
pub fn infer_from_pages_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host, path),
        None => (rest, ""),
    };
    let host = host.split(':').next()?.to_lowercase();
    let owner = host.strip_suffix(".github.io")?;
    if owner.is_empty() || owner.contains('.') {
        return None;
    }
    let path = path.split(['?', '#']).next().unwrap_or("");
    let repo = path.split('/').find(|part| !part.is_empty())?;
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_values_are_trimmed_and_branch_defaults() {
        let config = RepoConfig::from_form("  octo ", " photos\t", "   ", " tok ");
        assert_eq!(config.owner, "octo");
        assert_eq!(config.repo, "photos");
        assert_eq!(config.branch, "main");
        assert_eq!(config.token, "tok");
    }

    #[test]
    fn blank_stored_branch_reads_as_main() {
        let config = RepoConfig {
            branch: "  ".to_string(),
            ..RepoConfig::default()
        };
        assert_eq!(config.branch(), "main");
        let loaded = RepoConfig::load(Some(r#"{"owner":"a","repo":"b","branch":""}"#), None);
        assert_eq!(loaded.branch, "main");
        assert_eq!(loaded.token, "");
    }

    #[test]
    fn infers_owner_and_repo_from_pages_url() {
        assert_eq!(
            infer_from_pages_url("https://octo.github.io/photos/index.html"),
            Some(("octo".to_string(), "photos".to_string()))
        );
        assert_eq!(
            infer_from_pages_url("https://Octo.github.io/photos?x=1"),
            Some(("octo".to_string(), "photos".to_string()))
        );
        assert_eq!(infer_from_pages_url("https://octo.github.io/"), None);
        assert_eq!(infer_from_pages_url("https://example.com/photos"), None);
        assert_eq!(infer_from_pages_url("file:///tmp/index.html"), None);
    }

    #[test]
    fn load_falls_back_to_inference() {
        let pages = Some("https://octo.github.io/photos/");
        let fresh = RepoConfig::load(None, pages);
        assert_eq!(fresh.owner, "octo");
        assert_eq!(fresh.repo, "photos");
        assert_eq!(fresh.branch, "main");

        let broken = RepoConfig::load(Some("{oops"), pages);
        assert_eq!(broken, fresh);

        let saved = RepoConfig::load(Some(r#"{"owner":"x","repo":"y","branch":"dev","token":"t"}"#), pages);
        assert_eq!(saved.owner, "x");
        assert_eq!(saved.branch, "dev");
    }

    #[test]
    fn redacted_hides_token() {
        let config = RepoConfig::from_form("a", "b", "", "secret");
        assert_eq!(config.redacted().token, "***");
        assert_eq!(RepoConfig::default().redacted().token, "");
    }
}
