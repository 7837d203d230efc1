use anyhow::{Context, Result};

use crate::error::Error;

/// Owner and repository name, as they appear in API paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    pub org: String,
    pub repo: String,
}

impl RemoteRepo {
    /// Parse an explicit `owner/repo` slug from the command line.
    pub fn from_slug(slug: &str) -> Result<Self, Error> {
        match slug.split_once('/') {
            Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    org: org.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(Error::Config(slug.to_string())),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}

/// Derive owner/repo from the origin remote of the working directory.
pub fn detect() -> Result<RemoteRepo> {
    let output = std::process::Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .context("Failed to run `git config`")?;
    if !output.status.success() {
        anyhow::bail!("No origin remote configured. Pass --repo owner/repo or run inside a clone.");
    }
    let url = String::from_utf8(output.stdout)?.trim().to_string();
    Ok(parse_remote_url(&url)?)
}

/// Accepts `git@host:org/repo(.git)` and `https://host/org/repo(.git)`.
pub fn parse_remote_url(url: &str) -> Result<RemoteRepo, Error> {
    let bad = || Error::Config(url.to_string());

    if let Some(rest) = url.strip_prefix("git@") {
        let (_host, path) = rest.split_once(':').ok_or_else(bad)?;
        let (org, repo) = path.split_once('/').ok_or_else(bad)?;
        let repo = strip_git_suffix(repo);
        if org.is_empty() || repo.is_empty() {
            return Err(bad());
        }
        return Ok(RemoteRepo {
            org: org.to_string(),
            repo: repo.to_string(),
        });
    }

    if url.starts_with("https://") {
        let parts: Vec<&str> = url.split('/').collect();
        // ["https:", "", host, org, repo]
        if parts.len() < 5 {
            return Err(bad());
        }
        let org = parts[3];
        let repo = strip_git_suffix(parts[4]);
        if org.is_empty() || repo.is_empty() {
            return Err(bad());
        }
        return Ok(RemoteRepo {
            org: org.to_string(),
            repo: repo.to_string(),
        });
    }

    Err(bad())
}

fn strip_git_suffix(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}
