//! CLI flag contract tests
//!
//! Runs the binary against a mock GitHub API and verifies that flags
//! (--format, --output, --no-cache, --explain, --skip-token-check) and the
//! cache subcommands behave the same on fresh and cached runs.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::path::Path;
use std::process::Command;

fn repohealth_bin() -> String {
    env!("CARGO_BIN_EXE_repohealth").to_string()
}

/// Isolated home: config dir and cache dir under one tempdir
struct Sandbox {
    home: tempfile::TempDir,
    server: ServerGuard,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            server: Server::new(),
        }
    }

    fn cache_dir(&self) -> std::path::PathBuf {
        self.home.path().join("cache")
    }

    fn command(&self, token: Option<&str>) -> Command {
        let mut cmd = Command::new(repohealth_bin());
        cmd.env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env("REPOHEALTH_CACHE_DIR", self.cache_dir())
            .env("REPOHEALTH_API_URL", format!("{}/graphql", self.server.url()))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("GITHUB_TOKEN");
        if let Some(token) = token {
            cmd.env("GITHUB_TOKEN", token);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> (i32, String, String) {
        run_command(self.command(Some("test-token")), args)
    }

    fn mock_repository(&mut self, hits: usize) -> Mock {
        self.server
            .mock("POST", "/graphql")
            .match_header("authorization", "bearer test-token")
            .match_body(Matcher::Regex("stargazerCount".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "data": { "repository": {
                    "name": "widget",
                    "nameWithOwner": "acme/widget",
                    "owner": { "login": "acme" },
                    "description": "Widgets for everyone",
                    "url": "https://github.com/acme/widget",
                    "stargazerCount": 4200,
                    "forkCount": 310,
                    "watchers": { "totalCount": 90 },
                    "openIssues": { "totalCount": 12 },
                    "closedIssues": { "totalCount": 340 },
                    "openPullRequests": { "totalCount": 4 },
                    "mergedPullRequests": { "totalCount": 520 },
                    "releases": { "totalCount": 18 },
                    "licenseInfo": { "name": "MIT License", "key": "mit" },
                    "hasIssuesEnabled": true,
                    "hasDiscussionsEnabled": true,
                    "readmeMd": { "text": "# Widget\n\n## Install\n\n```\ncargo install widget\n```\n" }
                } } })
                .to_string(),
            )
            .expect(hits)
            .create()
    }

    fn mock_workflows(&mut self) -> Mock {
        self.server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex("HEAD:.github/workflows".into()))
            .with_status(200)
            .with_body(
                json!({ "data": { "repository": { "workflows": { "entries": [
                    { "name": "ci.yml", "type": "blob" }
                ] } } } })
                .to_string(),
            )
            .create()
    }

    fn mock_user(&mut self, scopes: &str, hits: usize) -> Mock {
        self.server
            .mock("GET", "/user")
            .with_status(200)
            .with_header("x-oauth-scopes", scopes)
            .with_body(r#"{"login":"acme"}"#)
            .expect(hits)
            .create()
    }
}

fn run_command(mut cmd: Command, args: &[&str]) -> (i32, String, String) {
    cmd.args(args);
    let output = cmd.output().expect("Failed to run repohealth");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Invalid JSON on stdout")
}

fn cached_files(dir: &Path) -> usize {
    std::fs::read_dir(dir.join("scores"))
        .map(|rd| rd.filter_map(|e| e.ok()).count())
        .unwrap_or(0)
}

// ============================================================================
// score
// ============================================================================

#[test]
fn test_score_json_output() {
    let mut sb = Sandbox::new();
    let repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let user = sb.mock_user("public_repo, read:org", 1);

    let (code, stdout, stderr) = sb.run(&["score", "acme/widget", "--format", "json"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    repo.assert();
    user.assert();

    let v = parse_json(&stdout);
    assert_eq!(v["repository"]["full_name"], "acme/widget");
    let score = v["final_score"].as_f64().unwrap();
    assert!((0.0..=10.0).contains(&score));
    assert_eq!(v["categories"].as_object().unwrap().len(), 6);
    assert_eq!(v["categories"]["quality"]["breakdown"]["ci_pipeline"], 1.0);
    assert_eq!(v["metadata"]["scoring_version"], "2.0.0");
}

#[test]
fn test_second_run_served_from_disk_cache() {
    let mut sb = Sandbox::new();
    let repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 2);

    let (code, first, _) = sb.run(&["score", "acme/widget", "--format", "json"]);
    assert_eq!(code, 0);
    assert_eq!(cached_files(&sb.cache_dir()), 1);

    // URL form and different case map to the same entry
    let (code, second, stderr) = sb.run(&[
        "score",
        "https://github.com/ACME/Widget.git",
        "--format",
        "json",
    ]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stderr.contains("Using cached score"), "stderr: {stderr}");
    repo.assert();

    assert_eq!(parse_json(&first), parse_json(&second));
}

#[test]
fn test_no_cache_refetches() {
    let mut sb = Sandbox::new();
    let repo = sb.mock_repository(2);
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 2);

    assert_eq!(sb.run(&["score", "acme/widget"]).0, 0);
    let (code, _, stderr) = sb.run(&["score", "acme/widget", "--no-cache"]);
    assert_eq!(code, 0);
    assert!(!stderr.contains("Using cached score"));
    repo.assert();
}

#[test]
fn test_skip_token_check() {
    let mut sb = Sandbox::new();
    let _repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let user = sb.mock_user("", 0);

    let (code, _, stderr) = sb.run(&["score", "acme/widget", "--skip-token-check"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    user.assert();
}

#[test]
fn test_disallowed_scopes_abort_before_fetch() {
    let mut sb = Sandbox::new();
    let repo = sb.mock_repository(0);
    let _user = sb.mock_user("repo, delete_repo", 1);

    let (code, stdout, stderr) = sb.run(&["score", "acme/widget"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("delete_repo"), "stderr: {stderr}");
    repo.assert();
}

#[test]
fn test_missing_token() {
    let sb = Sandbox::new();
    let (code, _, stderr) = run_command(sb.command(None), &["score", "acme/widget"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("GITHUB_TOKEN"), "stderr: {stderr}");
}

#[test]
fn test_repository_not_found() {
    let mut sb = Sandbox::new();
    sb.server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex("stargazerCount".into()))
        .with_status(200)
        .with_body(
            r#"{"data":{"repository":null},"errors":[{"type":"NOT_FOUND","message":"Could not resolve"}]}"#,
        )
        .create();
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 1);

    let (code, _, stderr) = sb.run(&["score", "acme/missing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Repository not found: acme/missing"), "stderr: {stderr}");
    assert_eq!(cached_files(&sb.cache_dir()), 0);
}

#[test]
fn test_output_file_and_explain() {
    let mut sb = Sandbox::new();
    let _repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 1);
    let out = sb.home.path().join("report.md");

    let (code, stdout, _) = sb.run(&[
        "score",
        "acme/widget",
        "--format",
        "markdown",
        "--explain",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());

    let report = std::fs::read_to_string(&out).unwrap();
    assert!(report.contains("| Documentation |"));
    assert!(report.contains("## Scoring Formula"));
}

#[test]
fn test_text_output_has_no_ansi_when_piped() {
    let mut sb = Sandbox::new();
    let _repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 1);

    let (code, stdout, _) = sb.run(&["score", "acme/widget"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("acme/widget"));
    assert!(stdout.contains("Grade:"));
    assert!(!stdout.contains('\x1b'));
}

#[test]
fn test_invalid_repository_argument() {
    let sb = Sandbox::new();
    let (code, _, stderr) = sb.run(&["score", "not-a-repo"]);
    assert_eq!(code, 2, "clap usage errors exit with 2");
    assert!(stderr.contains("invalid repository"));
}

// ============================================================================
// cache
// ============================================================================

#[test]
fn test_cache_status_clear_and_forget() {
    let mut sb = Sandbox::new();
    let _repo = sb.mock_repository(1);
    let _wf = sb.mock_workflows();
    let _user = sb.mock_user("", 1);
    assert_eq!(sb.run(&["score", "acme/widget"]).0, 0);

    let (code, stdout, _) = sb.run(&["cache", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("acme/widget"));

    let (_, stdout, _) = sb.run(&["cache", "clear", "--dry-run"]);
    assert!(stdout.contains("Dry run"));
    assert_eq!(cached_files(&sb.cache_dir()), 1);

    let (_, stdout, _) = sb.run(&["cache", "forget", "acme/unknown"]);
    assert!(stdout.contains("No cached score"));

    let (_, stdout, _) = sb.run(&["cache", "forget", "Acme/Widget"]);
    assert!(stdout.contains("Removed cached score for Acme/Widget"));
    assert_eq!(cached_files(&sb.cache_dir()), 0);

    let (_, stdout, _) = sb.run(&["cache", "clear"]);
    assert!(stdout.contains("No cached scores found"));
}

// ============================================================================
// misc
// ============================================================================

#[test]
fn test_version() {
    let sb = Sandbox::new();
    let (code, stdout, _) = sb.run(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("repohealth "));
}

#[test]
fn test_doctor_reports_disallowed_scopes() {
    let mut sb = Sandbox::new();
    let _user = sb.mock_user("admin:org", 1);
    let (code, stdout, _) = sb.run(&["doctor"]);
    assert_ne!(code, 0);
    assert!(stdout.contains("not allowed: admin:org"), "stdout: {stdout}");
}

#[test]
fn test_config_init_writes_example() {
    let sb = Sandbox::new();
    let (code, stdout, _) = sb.run(&["config", "init"]);
    assert_eq!(code, 0);
    let path = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Config initialized at: "))
        .expect("config path in output");
    assert!(Path::new(path).exists());
    assert!(path.ends_with("config.toml"));
}
