//! GraphQL queries and response shapes
//!
//! Response types mirror the GitHub schema; conversion into the scoring
//! model happens in [`RepositoryNode::into_snapshot`].

use crate::models::{
    CommitAuthor, CommitRecord, FeatureFlags, LicenseInfo, RepositorySnapshot,
    COMMIT_HISTORY_LIMIT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata, history and community files
pub const REPOSITORY_QUERY: &str = r#"
query RepositoryHealth($owner: String!, $name: String!, $historyLimit: Int!) {
  repository(owner: $owner, name: $name) {
    name
    nameWithOwner
    owner { login }
    description
    url
    primaryLanguage { name }
    createdAt
    pushedAt
    stargazerCount
    forkCount
    watchers { totalCount }
    openIssues: issues(states: OPEN) { totalCount }
    closedIssues: issues(states: CLOSED) { totalCount }
    openPullRequests: pullRequests(states: OPEN) { totalCount }
    mergedPullRequests: pullRequests(states: MERGED) { totalCount }
    releases { totalCount }
    licenseInfo { name key }
    codeOfConduct { name }
    securityPolicyUrl
    hasIssuesEnabled
    hasWikiEnabled
    hasDiscussionsEnabled
    hasVulnerabilityAlertsEnabled
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: $historyLimit) {
            nodes {
              committedDate
              author { name email user { login } }
              signature { isValid }
            }
          }
        }
      }
    }
    readmeMd: object(expression: "HEAD:README.md") { ... on Blob { text } }
    readmeLower: object(expression: "HEAD:readme.md") { ... on Blob { text } }
    readmePlain: object(expression: "HEAD:README") { ... on Blob { text } }
    readmeRst: object(expression: "HEAD:README.rst") { ... on Blob { text } }
    contributingRoot: object(expression: "HEAD:CONTRIBUTING.md") { ... on Blob { text } }
    contributingGithub: object(expression: "HEAD:.github/CONTRIBUTING.md") { ... on Blob { text } }
    contributingDocs: object(expression: "HEAD:docs/CONTRIBUTING.md") { ... on Blob { text } }
  }
}
"#;

/// Entries of the workflow directory
pub const WORKFLOWS_QUERY: &str = r#"
query RepositoryWorkflows($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    workflows: object(expression: "HEAD:.github/workflows") {
      ... on Tree { entries { name type } }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

impl GraphQlError {
    pub fn is_type(&self, kind: &str) -> bool {
        self.error_type.as_deref() == Some(kind)
    }
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData<T> {
    pub repository: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Blob {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseNode {
    name: String,
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchRef {
    target: Option<CommitTarget>,
}

#[derive(Debug, Deserialize)]
struct CommitTarget {
    #[serde(default)]
    history: Option<History>,
}

#[derive(Debug, Deserialize)]
struct History {
    #[serde(default)]
    nodes: Vec<CommitNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    committed_date: DateTime<Utc>,
    author: Option<AuthorNode>,
    signature: Option<SignatureNode>,
}

#[derive(Debug, Deserialize)]
struct AuthorNode {
    name: Option<String>,
    email: Option<String>,
    user: Option<Login>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureNode {
    is_valid: bool,
}

/// `repository` node of [`REPOSITORY_QUERY`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    name: String,
    name_with_owner: String,
    owner: Login,
    description: Option<String>,
    url: String,
    primary_language: Option<Named>,
    created_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
    stargazer_count: u64,
    fork_count: u64,
    #[serde(default)]
    watchers: TotalCount,
    #[serde(default)]
    open_issues: TotalCount,
    #[serde(default)]
    closed_issues: TotalCount,
    #[serde(default)]
    open_pull_requests: TotalCount,
    #[serde(default)]
    merged_pull_requests: TotalCount,
    #[serde(default)]
    releases: TotalCount,
    license_info: Option<LicenseNode>,
    code_of_conduct: Option<Named>,
    security_policy_url: Option<String>,
    #[serde(default)]
    has_issues_enabled: bool,
    #[serde(default)]
    has_wiki_enabled: bool,
    #[serde(default)]
    has_discussions_enabled: bool,
    /// Null unless the token has admin rights on the repository
    #[serde(default)]
    has_vulnerability_alerts_enabled: Option<bool>,
    default_branch_ref: Option<BranchRef>,
    readme_md: Option<Blob>,
    readme_lower: Option<Blob>,
    readme_plain: Option<Blob>,
    readme_rst: Option<Blob>,
    contributing_root: Option<Blob>,
    contributing_github: Option<Blob>,
    contributing_docs: Option<Blob>,
}

fn first_text(blobs: [Option<Blob>; 4]) -> Option<String> {
    blobs.into_iter().flatten().find_map(|b| b.text)
}

impl RepositoryNode {
    pub fn into_snapshot(self) -> RepositorySnapshot {
        let commits: Vec<CommitRecord> = self
            .default_branch_ref
            .and_then(|r| r.target)
            .and_then(|t| t.history)
            .map(|h| h.nodes)
            .unwrap_or_default()
            .into_iter()
            .take(COMMIT_HISTORY_LIMIT)
            .map(|node| {
                let author = node.author.map(|a| CommitAuthor {
                    login: a.user.map(|u| u.login),
                    email: a.email,
                    name: a.name,
                });
                CommitRecord {
                    committed_at: node.committed_date,
                    author: author.unwrap_or_default(),
                    signed: node.signature.is_some_and(|s| s.is_valid),
                }
            })
            .collect();

        let readme = first_text([
            self.readme_md,
            self.readme_lower,
            self.readme_plain,
            self.readme_rst,
        ]);
        let contributing = first_text([
            self.contributing_root,
            self.contributing_github,
            self.contributing_docs,
            None,
        ]);

        RepositorySnapshot {
            owner: self.owner.login,
            name: self.name,
            full_name: self.name_with_owner,
            description: self.description.filter(|d| !d.trim().is_empty()),
            url: self.url,
            primary_language: self.primary_language.map(|l| l.name),
            created_at: self.created_at,
            pushed_at: self.pushed_at,
            stars: self.stargazer_count,
            forks: self.fork_count,
            watchers: self.watchers.total_count,
            open_issues: self.open_issues.total_count,
            closed_issues: self.closed_issues.total_count,
            open_pull_requests: self.open_pull_requests.total_count,
            merged_pull_requests: self.merged_pull_requests.total_count,
            releases: self.releases.total_count,
            license: self.license_info.map(|l| LicenseInfo {
                name: l.name,
                key: l.key,
            }),
            has_code_of_conduct: self.code_of_conduct.is_some(),
            security_policy_url: self.security_policy_url,
            commits,
            readme,
            contributing,
            features: FeatureFlags {
                issues_enabled: self.has_issues_enabled,
                wiki_enabled: self.has_wiki_enabled,
                discussions_enabled: self.has_discussions_enabled,
                vulnerability_alerts_enabled: self
                    .has_vulnerability_alerts_enabled
                    .unwrap_or(false),
            },
        }
    }
}

/// `repository` node of [`WORKFLOWS_QUERY`]
#[derive(Debug, Deserialize)]
pub struct WorkflowsNode {
    workflows: Option<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    #[serde(default)]
    entries: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
}

impl WorkflowsNode {
    /// Workflow file names, or `None` when the directory does not exist
    pub fn into_listing(self) -> Option<Vec<String>> {
        let tree = self.workflows?;
        Some(
            tree.entries
                .into_iter()
                .filter(|e| e.entry_type == "blob")
                .map(|e| e.name)
                .filter(|n| n.ends_with(".yml") || n.ends_with(".yaml"))
                .collect(),
        )
    }
}
