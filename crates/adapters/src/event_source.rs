//! Candidate discovery from a GitHub trigger event or the last commit's added files
//!
//! Uses tokio::process::Command for git.

use async_trait::async_trait;
use autotweet_domain::{
    ArticleCandidate, CandidateSource, SourceError,
    usecases::{candidates_from_added_files, candidates_from_event},
};
use std::path::PathBuf;
use tokio::process::Command;

/// Git-backed candidate source
pub struct GitEventSource {
    /// JSON event file written by the CI runner, if any
    event_path: Option<PathBuf>,
    /// Event action announcing new articles
    action: String,
    repo_dir: PathBuf,
    articles_dir: String,
    /// Diff base when the current revision has no parent
    empty_tree_sha: String,
}

impl GitEventSource {
    pub fn new(
        event_path: Option<PathBuf>,
        action: String,
        repo_dir: PathBuf,
        articles_dir: String,
        empty_tree_sha: String,
    ) -> Self {
        Self {
            event_path,
            action,
            repo_dir,
            articles_dir,
            empty_tree_sha,
        }
    }

    async fn read_event(&self) -> Result<Option<serde_json::Value>, SourceError> {
        let Some(path) = &self.event_path else {
            return Ok(None);
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::Event(format!("{}: {}", path.display(), e)))?;
        let event = serde_json::from_str(&raw)
            .map_err(|e| SourceError::Event(format!("{}: {}", path.display(), e)))?;
        Ok(Some(event))
    }

    async fn git(&self, args: &[&str]) -> Result<String, SourceError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| SourceError::Command(format!("git {}: {}", args.join(" "), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Command(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn added_articles(&self, limit: usize) -> Result<Vec<ArticleCandidate>, SourceError> {
        let previous = match self.git(&["rev-parse", "--verify", "--quiet", "HEAD~1"]).await {
            Ok(sha) => sha.trim().to_string(),
            Err(_) => {
                tracing::debug!("No previous revision, diffing against the empty tree");
                self.empty_tree_sha.clone()
            }
        };

        let diff = self
            .git(&["diff", "--diff-filter=A", "--name-only", &previous, "HEAD"])
            .await?;

        let candidates = candidates_from_added_files(diff.lines(), &self.articles_dir, limit);
        tracing::info!(
            articles = ?candidates.iter().map(|c| &c.path).collect::<Vec<_>>(),
            "Articles detected via push"
        );
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for GitEventSource {
    async fn discover(&self, limit: usize) -> Result<Vec<ArticleCandidate>, SourceError> {
        match self.read_event().await {
            Ok(Some(event)) => {
                if let Some(candidates) = candidates_from_event(&event, &self.action, limit) {
                    tracing::info!(
                        articles = ?candidates.iter().map(|c| &c.path).collect::<Vec<_>>(),
                        "Articles detected via dispatch"
                    );
                    return Ok(candidates);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable trigger event");
            }
        }

        self.added_articles(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    fn source(event_path: Option<PathBuf>, repo_dir: &Path) -> GitEventSource {
        GitEventSource::new(
            event_path,
            "new-article-published".to_string(),
            repo_dir.to_path_buf(),
            "article".to_string(),
            EMPTY_TREE.to_string(),
        )
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git")
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    fn commit_files(dir: &Path, files: &[&str], message: &str) {
        for file in files {
            let path = dir.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "<html><title>T</title></html>").unwrap();
        }
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", message]);
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        git(dir.path(), &["init", "-q"]);
        dir
    }

    #[tokio::test]
    async fn test_dispatch_event_wins() {
        let dir = TempDir::new().unwrap();
        let event_path = dir.path().join("event.json");
        fs::write(
            &event_path,
            r#"{"action":"new-article-published","client_payload":{"articles":["article/a.html","article/b.html"]}}"#,
        )
        .unwrap();

        // No git repository here: the event alone must be enough
        let candidates = source(Some(event_path), dir.path())
            .discover(5)
            .await
            .unwrap();

        assert_eq!(
            candidates,
            vec![
                ArticleCandidate::new("article/a.html"),
                ArticleCandidate::new("article/b.html")
            ]
        );
    }

    #[tokio::test]
    async fn test_added_articles_since_previous_commit() {
        let dir = repo();
        commit_files(dir.path(), &["article/old.html", "README.md"], "first");
        commit_files(
            dir.path(),
            &["article/new.html", "article/draft.md", "templates/x.html"],
            "second",
        );

        let candidates = source(None, dir.path()).discover(5).await.unwrap();

        assert_eq!(candidates, vec![ArticleCandidate::new("article/new.html")]);
    }

    #[tokio::test]
    async fn test_first_commit_diffs_against_empty_tree() {
        let dir = repo();
        commit_files(dir.path(), &["article/a.html", "article/b.html"], "first");

        let candidates = source(None, dir.path()).discover(1).await.unwrap();

        assert_eq!(candidates, vec![ArticleCandidate::new("article/a.html")]);
    }

    #[tokio::test]
    async fn test_push_event_falls_back_to_git() {
        let dir = repo();
        commit_files(dir.path(), &["article/a.html"], "first");
        let event_path = dir.path().join("event.json");
        fs::write(&event_path, r#"{"ref":"refs/heads/main"}"#).unwrap();

        let candidates = source(Some(event_path), dir.path())
            .discover(5)
            .await
            .unwrap();

        assert_eq!(candidates, vec![ArticleCandidate::new("article/a.html")]);
    }

    #[tokio::test]
    async fn test_outside_repository_is_command_error() {
        let dir = TempDir::new().unwrap();
        let result = source(None, dir.path()).discover(5).await;
        assert!(matches!(result, Err(SourceError::Command(_))));
    }
}
