//! Changelog generation from git history.
//!
//! Commit subjects follow the Angular convention (`type(scope)!: subject`).
//! Commits are grouped into releases by version tags and rendered in the
//! Keep a Changelog format. Commits newer than the latest tag are released
//! under the configured bump version.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use regex_lite::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::config::ChangelogConfig;

/// Rendered sections, in order: (commit type, heading).
pub const SECTIONS: [(&str, &str); 5] = [
    ("build", "Build"),
    ("deps", "Dependencies"),
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("refactor", "Code Refactoring"),
];

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// One commit as read from `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub date: NaiveDate,
    /// Ref names decorating the commit (`HEAD -> main, tag: v1.0.0`)
    pub refs: String,
    pub subject: String,
}

/// Parsed Angular-convention subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub kind: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub subject: String,
}

/// A version and the commits released in it, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub date: NaiveDate,
    pub entries: Vec<(ConventionalCommit, String)>,
}

/// Read history, render it and write the output file.
pub async fn generate_changelog(config: &ChangelogConfig) -> anyhow::Result<PathBuf> {
    let commits = read_history(&config.repository).await?;
    let today = chrono::Local::now().date_naive();
    let releases = group_releases(&commits, &config.bump_version, today);

    debug!(
        commits = commits.len(),
        releases = releases.len(),
        "Rendering changelog"
    );

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    tokio::fs::write(&config.output, render(&releases))
        .await
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    Ok(config.output.clone())
}

/// Run `git log` in `repository`, newest commit first.
pub async fn read_history(repository: &Path) -> anyhow::Result<Vec<Commit>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repository)
        .args([
            "log",
            "--date=short",
            "--decorate=short",
            "--format=%H%x1f%ad%x1f%D%x1f%s%x1e",
        ])
        .output()
        .await
        .context("failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git log failed: {}", stderr.trim());
    }

    Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse the `git log` format used by `read_history`. Malformed records are skipped.
pub fn parse_log(output: &str) -> Vec<Commit> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(4, FIELD_SEP);
            let hash = fields.next()?.trim();
            let date = NaiveDate::parse_from_str(fields.next()?.trim(), "%Y-%m-%d").ok()?;
            let refs = fields.next()?.trim();
            let subject = fields.next()?.trim();
            if hash.is_empty() {
                return None;
            }
            Some(Commit {
                hash: hash.to_string(),
                date,
                refs: refs.to_string(),
                subject: subject.to_string(),
            })
        })
        .collect()
}

fn angular_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<kind>[a-z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?:\s*(?P<subject>\S.*)$")
            .expect("valid angular commit pattern")
    })
}

/// Parse an Angular-convention subject; `None` when the subject doesn't follow it.
pub fn parse_conventional(subject: &str) -> Option<ConventionalCommit> {
    let caps = angular_regex().captures(subject.trim())?;
    Some(ConventionalCommit {
        kind: caps.name("kind")?.as_str().to_string(),
        scope: caps.name("scope").map(|m| m.as_str().trim().to_string()),
        breaking: caps.name("breaking").is_some(),
        subject: caps.name("subject")?.as_str().trim().to_string(),
    })
}

/// Version named by a `tag: ...` decoration, without a leading `v`.
pub fn version_from_refs(refs: &str) -> Option<String> {
    refs.split(',')
        .filter_map(|r| r.trim().strip_prefix("tag: "))
        .map(|tag| tag.trim_start_matches('v').to_string())
        .find(|version| version.starts_with(|c: char| c.is_ascii_digit()))
}

/// Group newest-first commits into releases. Commits above the latest tag go
/// into `bump_version` dated `today`; releases with nothing to render are dropped.
pub fn group_releases(commits: &[Commit], bump_version: &str, today: NaiveDate) -> Vec<Release> {
    let mut releases = vec![Release {
        version: bump_version.to_string(),
        date: today,
        entries: Vec::new(),
    }];

    for commit in commits {
        if let Some(version) = version_from_refs(&commit.refs) {
            releases.push(Release {
                version,
                date: commit.date,
                entries: Vec::new(),
            });
        }

        let Some(parsed) = parse_conventional(&commit.subject) else {
            continue;
        };
        if !SECTIONS.iter().any(|(kind, _)| *kind == parsed.kind) {
            continue;
        }
        if let Some(release) = releases.last_mut() {
            release.entries.push((parsed, short_hash(&commit.hash)));
        }
    }

    releases.retain(|r| !r.entries.is_empty());
    releases
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(7).collect()
}

/// Render releases in the Keep a Changelog format.
pub fn render(releases: &[Release]) -> String {
    let mut out = String::from(
        "# Changelog\n\n\
         All notable changes to this project will be documented in this file.\n\n\
         The format is based on [Keep a Changelog](http://keepachangelog.com/en/1.0.0/)\n\
         and this project adheres to [Semantic Versioning](http://semver.org/spec/v2.0.0.html).\n",
    );

    for release in releases {
        out.push_str(&format!(
            "\n## [{}] - {}\n",
            release.version,
            release.date.format("%Y-%m-%d")
        ));

        for (kind, title) in SECTIONS {
            let entries: Vec<_> = release
                .entries
                .iter()
                .filter(|(commit, _)| commit.kind == kind)
                .collect();
            if entries.is_empty() {
                continue;
            }

            out.push_str(&format!("\n### {}\n\n", title));
            for (commit, hash) in entries {
                let scope = commit
                    .scope
                    .as_deref()
                    .map(|s| format!("**{}**: ", s))
                    .unwrap_or_default();
                let breaking = if commit.breaking { " [BREAKING]" } else { "" };
                out.push_str(&format!("- {}{} ({}){}\n", scope, commit.subject, hash, breaking));
            }
        }
    }

    out
}
