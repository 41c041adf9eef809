//! Turning a triggering event into the set of components to build.

use tracing::info;

use crate::deps;
use crate::domain::error::{PrDepsError, Result};
use crate::domain::overrides::OverrideSet;
use crate::domain::pull_request::PullRequest;
use crate::event::Trigger;
use crate::source::PullRequestSource;

/// Where the `deps:` directive was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveOrigin {
    TriggerComment,
    PullRequestBody,
    PullRequestComment { comment_id: u64 },
    None,
}

/// The PR being built and every override it asks for, its own head included.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub pull_request: PullRequest,
    pub overrides: OverrideSet,
    pub origin: DirectiveOrigin,
}

/// Fetch the PR named by `trigger` and collect its overrides.
///
/// The `deps:` directive is looked up in the triggering comment, then the PR
/// body, then the PR's comments newest first. The PR head is always added
/// and wins over a directive line for the same component.
pub async fn discover_overrides(
    trigger: &Trigger,
    source: &dyn PullRequestSource,
) -> Result<Discovery> {
    let pr_url = trigger.pr_url().ok_or_else(|| {
        PrDepsError::Event(format!("event does not reference a pull request: {trigger:?}"))
    })?;

    info!(url = %pr_url, "Retrieving PR information");
    let pr = source.pull_request(pr_url).await?;
    info!(body = ?pr.body, "Got pr body");

    let (mut overrides, origin) = find_directive(trigger, &pr, source).await?;

    let head = pr.head_override()?;
    info!(
        component = %head.component,
        repo = %head.repo,
        branch = %head.branch,
        "Adding PR head to the components to build"
    );
    overrides.insert(head);

    Ok(Discovery {
        pull_request: pr,
        overrides,
        origin,
    })
}

async fn find_directive(
    trigger: &Trigger,
    pr: &PullRequest,
    source: &dyn PullRequestSource,
) -> Result<(OverrideSet, DirectiveOrigin)> {
    if let Trigger::PullRequestComment { comment_body, .. } = trigger {
        if let Some(set) = deps::parse_directive(comment_body) {
            return Ok((set, DirectiveOrigin::TriggerComment));
        }
    }

    if let Some(set) = pr.body.as_deref().and_then(deps::parse_directive) {
        return Ok((set, DirectiveOrigin::PullRequestBody));
    }

    if let Some(url) = pr.comments_url.as_deref() {
        info!(url = %url, "Retrieving PR comments");
        let comments = source.comments(url).await?;
        for comment in comments.iter().rev() {
            if let Some(set) = comment.body.as_deref().and_then(deps::parse_directive) {
                return Ok((
                    set,
                    DirectiveOrigin::PullRequestComment {
                        comment_id: comment.id,
                    },
                ));
            }
        }
    }

    info!("No deps specified");
    Ok((OverrideSet::new(), DirectiveOrigin::None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::overrides::RepoRef;
    use crate::domain::pull_request::{HeadRepo, IssueComment, PullRequestHead};
    use crate::fakes::MemoryPullRequestSource;

    const PR_URL: &str = "https://api.github.com/repos/jitsi/jicofo/pulls/9";
    const COMMENTS_URL: &str = "https://api.github.com/repos/jitsi/jicofo/issues/9/comments";

    fn pr(body: Option<&str>) -> PullRequest {
        PullRequest {
            number: 9,
            body: body.map(str::to_string),
            comments_url: Some(COMMENTS_URL.to_string()),
            head: PullRequestHead {
                git_ref: "colibri2".to_string(),
                repo: Some(HeadRepo {
                    name: "jicofo".to_string(),
                    full_name: "alice/jicofo".to_string(),
                }),
            },
        }
    }

    fn comment(id: u64, body: &str) -> IssueComment {
        IssueComment {
            id,
            body: Some(body.to_string()),
            created_at: None,
        }
    }

    fn pr_trigger() -> Trigger {
        Trigger::PullRequest {
            action: "opened".to_string(),
            pr_url: PR_URL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_body_directive_plus_head() {
        let source = MemoryPullRequestSource::new().with_pull(
            PR_URL,
            pr(Some("Adds colibri2.\n\ndeps:\nuse jicoco alice/jicoco colibri2\n")),
        );
        let found = discover_overrides(&pr_trigger(), &source).await.unwrap();

        assert_eq!(found.origin, DirectiveOrigin::PullRequestBody);
        assert_eq!(found.overrides.len(), 2);
        assert_eq!(
            found.overrides.get("jicofo"),
            Some(&RepoRef::new("alice/jicofo", "colibri2"))
        );
        assert!(found.overrides.contains("jicoco"));
        // Body had a directive, comments are never fetched.
        assert_eq!(source.requests(), vec![PR_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_head_wins_over_directive_for_same_component() {
        let source = MemoryPullRequestSource::new().with_pull(
            PR_URL,
            pr(Some("deps:\nuse jicofo bob/jicofo other\n")),
        );
        let found = discover_overrides(&pr_trigger(), &source).await.unwrap();
        assert_eq!(
            found.overrides.get("jicofo"),
            Some(&RepoRef::new("alice/jicofo", "colibri2"))
        );
    }

    #[tokio::test]
    async fn test_missing_body_yields_only_head() {
        let source = MemoryPullRequestSource::new().with_pull(PR_URL, pr(None));
        let found = discover_overrides(&pr_trigger(), &source).await.unwrap();
        assert_eq!(found.origin, DirectiveOrigin::None);
        assert_eq!(found.overrides.len(), 1);
    }

    #[tokio::test]
    async fn test_newest_comment_directive_is_used() {
        let source = MemoryPullRequestSource::new()
            .with_pull(PR_URL, pr(Some("no directive here")))
            .with_comments(
                COMMENTS_URL,
                vec![
                    comment(1, "deps:\nuse rtp alice/rtp old"),
                    comment(2, "looks good"),
                    comment(3, "deps:\nuse rtp alice/rtp new"),
                ],
            );
        let found = discover_overrides(&pr_trigger(), &source).await.unwrap();
        assert_eq!(
            found.origin,
            DirectiveOrigin::PullRequestComment { comment_id: 3 }
        );
        assert_eq!(found.overrides.get("rtp").unwrap().branch, "new");
    }

    #[tokio::test]
    async fn test_trigger_comment_takes_priority() {
        let source = MemoryPullRequestSource::new().with_pull(
            PR_URL,
            pr(Some("deps:\nuse rtp alice/rtp from-body")),
        );
        let trigger = Trigger::PullRequestComment {
            pr_url: PR_URL.to_string(),
            comment_body: "retry with\ndeps:\nuse rtp alice/rtp from-comment".to_string(),
        };
        let found = discover_overrides(&trigger, &source).await.unwrap();
        assert_eq!(found.origin, DirectiveOrigin::TriggerComment);
        assert_eq!(found.overrides.get("rtp").unwrap().branch, "from-comment");
    }

    #[tokio::test]
    async fn test_deleted_head_repo_fails_discovery() {
        let mut gone = pr(Some("deps:\nuse rtp alice/rtp fix"));
        gone.head.repo = None;
        let source = MemoryPullRequestSource::new().with_pull(PR_URL, gone);

        let err = discover_overrides(&pr_trigger(), &source).await.unwrap_err();
        assert!(matches!(err, PrDepsError::Source(_)));
        assert!(err.to_string().contains("no longer exists"));
    }

    #[tokio::test]
    async fn test_unsupported_trigger_is_rejected() {
        let source = MemoryPullRequestSource::new();
        let trigger = Trigger::Unsupported {
            action: "closed".to_string(),
        };
        let err = discover_overrides(&trigger, &source).await.unwrap_err();
        assert!(matches!(err, PrDepsError::Event(_)));
    }
}
