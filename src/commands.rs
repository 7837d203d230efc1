use std::io::{self, Write};

use anyhow::Result;

use crate::comments::{latest_root, thread_of, Comment, Scope};
use crate::editor;
use crate::error::Error;
use crate::format;
use crate::github::{Client, NewReviewComment};

/// Print every root comment in scope followed by its thread.
pub async fn view(
    client: &Client,
    repo: &str,
    number: u64,
    file: Option<String>,
    line: Option<String>,
) -> Result<()> {
    let scope = Scope::new(file, line)?;
    let pr = client.get_pr(repo, number).await?;
    println!("{}", format::format_pr_header(&pr));
    println!();

    let comments = fetch_scope_comments(client, repo, number, &scope).await?;
    let scoped = scope.select(&comments);
    let roots: Vec<&Comment> = scoped.iter().filter(|c| c.is_root()).copied().collect();

    if roots.is_empty() {
        println!("No comments on {}", scope.describe());
        return Ok(());
    }
    for (i, root) in roots.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{}",
            format::format_thread(root, &thread_of(&comments, root.id))
        );
    }
    Ok(())
}

/// Leave a comment in scope: on the PR conversation, or as a reply to the
/// current review thread, or as a fresh thread root.
pub async fn comment(
    client: &Client,
    repo: &str,
    number: u64,
    file: Option<String>,
    line: Option<String>,
    text: Option<String>,
) -> Result<()> {
    let scope = Scope::new(file, line)?;
    client.get_pr(repo, number).await?;

    let body = match text {
        Some(t) => t,
        None => editor::compose("")?,
    };
    if body.trim().is_empty() {
        return Err(Error::EmptyInput.into());
    }

    match &scope {
        Scope::PullRequest => {
            let comments = client.list_issue_comments(repo, number).await?;
            if let Some(latest) = latest_root(&scope.select(&comments)) {
                println!("Existing comment found on this pull request:");
                println!("{}", format::format_comment(latest));
            }
            let created = client.create_issue_comment(repo, number, &body).await?;
            println!("Posted comment #{} on pull request #{number}", created.id);
        }
        Scope::Review { path, range } => {
            let comments = client.list_review_comments(repo, number).await?;
            let scoped = scope.select(&comments);
            if let Some(root) = latest_root(&scoped) {
                println!(
                    "{}",
                    format::format_thread(root, &thread_of(&comments, root.id))
                );
                if confirm("Continue the existing thread?")? {
                    let reply = client.create_reply(repo, number, root.id, &body).await?;
                    println!("Posted reply #{} to thread #{}", reply.id, root.id);
                    return Ok(());
                }
                if !confirm("Create a new thread?")? {
                    eprintln!("Nothing posted.");
                    return Ok(());
                }
            }
            // The sha must be current at creation time; a push during the
            // prompts above would make an earlier one stale.
            let head_sha = client.get_pr(repo, number).await?.head.sha;
            let payload = match range {
                None => NewReviewComment::for_file(&body, &head_sha, path),
                Some(r) => NewReviewComment::for_lines(&body, &head_sha, path, *r),
            };
            let created = client.create_review_comment(repo, number, &payload).await?;
            println!("Posted comment #{} on {}", created.id, scope.describe());
        }
    }
    Ok(())
}

/// Rewrite the body of the current root comment in scope.
pub async fn edit(
    client: &Client,
    repo: &str,
    number: u64,
    file: Option<String>,
    line: Option<String>,
    text: Option<String>,
) -> Result<()> {
    let scope = Scope::new(file, line)?;
    client.get_pr(repo, number).await?;

    let comments = fetch_scope_comments(client, repo, number, &scope).await?;
    let scoped = scope.select(&comments);
    let root = latest_root(&scoped).ok_or_else(|| {
        Error::NotFound(format!("no comment to edit on {}", scope.describe()))
    })?;

    println!(
        "{}",
        format::format_thread(root, &thread_of(&comments, root.id))
    );

    let new_body = match text {
        Some(t) => t,
        None => editor::compose(&root.body)?,
    };
    if new_body.trim().is_empty() {
        return Err(Error::EmptyInput.into());
    }
    if new_body == root.body {
        anyhow::bail!("no changes, comment #{} left as is", root.id);
    }

    let updated = match &scope {
        Scope::PullRequest => client.update_issue_comment(repo, root.id, &new_body).await?,
        Scope::Review { .. } => client.update_review_comment(repo, root.id, &new_body).await?,
    };
    println!("Updated comment #{}", updated.id);
    Ok(())
}

/// Approve the PR, optionally with a review body.
pub async fn approve(
    client: &Client,
    repo: &str,
    number: u64,
    text: Option<String>,
) -> Result<()> {
    client.get_pr(repo, number).await?;
    let review = client.approve(repo, number, text.as_deref()).await?;
    println!(
        "Approved pull request #{number} (review #{}, {})",
        review.id, review.html_url
    );
    Ok(())
}

/// The listing a scope reads from: conversation comments for the PR scope,
/// review comments otherwise.
async fn fetch_scope_comments(
    client: &Client,
    repo: &str,
    number: u64,
    scope: &Scope,
) -> Result<Vec<Comment>> {
    match scope {
        Scope::PullRequest => client.list_issue_comments(repo, number).await,
        Scope::Review { .. } => client.list_review_comments(repo, number).await,
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} (Y/n): ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "Y" | "y"))
}
