use crate::comments::Comment;
use crate::github::PullRequest;

/// Format the header line for `view`
pub fn format_pr_header(pr: &PullRequest) -> String {
    format!("#{} {}  [{}]", pr.number, pr.title, pr.state)
}

/// Format a single comment with its author line and anchor, if any.
pub fn format_comment(comment: &Comment) -> String {
    let mut header = format!("@{} (#{})", comment.author(), comment.id);
    if let Some(location) = comment.location() {
        header.push_str("  ");
        header.push_str(&location);
    }
    format!("{header}\n{}", comment.body)
}

/// Format a thread: the root comment followed by its replies, quoted.
pub fn format_thread(root: &Comment, replies: &[&Comment]) -> String {
    let mut out = vec![format_comment(root)];
    for reply in replies {
        for line in reply.body.lines() {
            out.push(format!("> {line}"));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::User;

    fn comment(id: u64, body: &str, reply_to: Option<u64>) -> Comment {
        Comment {
            id,
            body: body.to_string(),
            path: None,
            line: None,
            start_line: None,
            in_reply_to_id: reply_to,
            user: Some(User {
                login: "octocat".to_string(),
            }),
        }
    }

    #[test]
    fn comment_carries_author_and_id() {
        let c = comment(7, "ship it", None);
        assert_eq!(format_comment(&c), "@octocat (#7)\nship it");
    }

    #[test]
    fn anchored_comment_shows_its_location() {
        let mut c = comment(7, "ship it", None);
        c.path = Some("src/lib.rs".to_string());
        c.line = Some(4);
        assert_eq!(format_comment(&c), "@octocat (#7)  src/lib.rs:4\nship it");
    }

    #[test]
    fn thread_quotes_replies_per_line() {
        let root = comment(1, "root", None);
        let reply = comment(2, "first\nsecond", Some(1));
        let out = format_thread(&root, &[&reply]);
        assert_eq!(out, "@octocat (#1)\nroot\n> first\n> second");
    }
}
