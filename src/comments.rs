use serde::Deserialize;

use crate::error::Error;

/// A PR comment as returned by the comment listing endpoints.
///
/// Conversation-level comments carry no `path`; review comments anchored to
/// a file carry `path`, and line-anchored ones `line` as well. A comment
/// with `in_reply_to_id` set is a reply in the thread rooted at that id and
/// is never itself a root.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub start_line: Option<u64>,
    #[serde(default)]
    pub in_reply_to_id: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.in_reply_to_id.is_none()
    }

    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("unknown")
    }

    /// `path:start-end` anchor, as much of it as the comment carries.
    /// Pull-request-level comments have no anchor.
    pub fn location(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        Some(match (self.start_line, self.line) {
            (Some(start), Some(end)) if start != end => format!("{path}:{start}-{end}"),
            (_, Some(line)) => format!("{path}:{line}"),
            _ => path.to_string(),
        })
    }
}

/// Inclusive line range, parsed from `N`, `N-M` or `N:M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u64,
    pub end: u64,
}

impl LineRange {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let malformed = || {
            Error::Validation(format!(
                "malformed line range `{raw}`: expected N, N-M or N:M"
            ))
        };

        let (lo, hi) = match raw.split_once(['-', ':']) {
            Some((lo, hi)) => (lo, hi),
            None => (raw, raw),
        };
        let start: u64 = lo.trim().parse().map_err(|_| malformed())?;
        let end: u64 = hi.trim().parse().map_err(|_| malformed())?;
        // Diff lines are 1-based; a reversed range matches nothing.
        if start == 0 || start > end {
            return Err(malformed());
        }
        Ok(Self { start, end })
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, line: u64) -> bool {
        self.start <= line && line <= self.end
    }
}

impl std::fmt::Display for LineRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Where a command acts: the PR conversation, one file, or a line range
/// within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    PullRequest,
    Review {
        path: String,
        range: Option<LineRange>,
    },
}

impl Scope {
    pub fn new(file: Option<String>, line: Option<String>) -> Result<Self, Error> {
        match (file, line) {
            (None, None) => Ok(Scope::PullRequest),
            (None, Some(_)) => Err(Error::Validation(
                "a line range needs --file as well".to_string(),
            )),
            (Some(path), None) => Ok(Scope::Review { path, range: None }),
            (Some(path), Some(raw)) => Ok(Scope::Review {
                path,
                range: Some(LineRange::parse(&raw)?),
            }),
        }
    }

    /// The comments belonging to this scope, in listing order.
    ///
    /// PR scope keeps comments with no path; file scope keeps everything on
    /// the path regardless of line; line scope keeps comments on the path
    /// whose anchor line falls within the range.
    pub fn select<'a>(&self, comments: &'a [Comment]) -> Vec<&'a Comment> {
        comments.iter().filter(|c| self.matches(c)).collect()
    }

    fn matches(&self, comment: &Comment) -> bool {
        match self {
            Scope::PullRequest => comment.path.is_none(),
            Scope::Review { path, range: None } => comment.path.as_deref() == Some(path.as_str()),
            Scope::Review {
                path,
                range: Some(range),
            } => {
                comment.path.as_deref() == Some(path.as_str())
                    && comment.line.is_some_and(|l| range.contains(l))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Scope::PullRequest => "this pull request".to_string(),
            Scope::Review { path, range: None } => format!("file {path}"),
            Scope::Review {
                path,
                range: Some(range),
            } => format!("{path} line {range}"),
        }
    }
}

/// The root of the current thread: the last comment in the scoped list with
/// no `in_reply_to_id`. Listing order stands in for recency.
pub fn latest_root<'a>(scoped: &[&'a Comment]) -> Option<&'a Comment> {
    scoped.iter().rev().find(|c| c.is_root()).copied()
}

/// Replies to the thread rooted at `root_id`, in listing order.
pub fn thread_of<'a>(comments: &'a [Comment], root_id: u64) -> Vec<&'a Comment> {
    comments
        .iter()
        .filter(|c| c.in_reply_to_id == Some(root_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn comment(id: u64, path: Option<&str>, line: Option<u64>, reply_to: Option<u64>) -> Comment {
        Comment {
            id,
            body: format!("comment {id}"),
            path: path.map(str::to_string),
            line,
            start_line: None,
            in_reply_to_id: reply_to,
            user: Some(User {
                login: "octocat".to_string(),
            }),
        }
    }

    #[test]
    fn range_single_line() {
        assert_eq!(LineRange::parse("5").unwrap(), LineRange { start: 5, end: 5 });
    }

    #[test]
    fn range_dash_and_colon_forms() {
        assert_eq!(LineRange::parse("5-10").unwrap(), LineRange { start: 5, end: 10 });
        assert_eq!(LineRange::parse("5:10").unwrap(), LineRange { start: 5, end: 10 });
    }

    #[test]
    fn range_rejects_malformed_input() {
        assert_matches!(LineRange::parse("abc"), Err(Error::Validation(_)));
        assert_matches!(LineRange::parse("5-"), Err(Error::Validation(_)));
        assert_matches!(LineRange::parse("-5"), Err(Error::Validation(_)));
        assert_matches!(LineRange::parse("10-5"), Err(Error::Validation(_)));
        assert_matches!(LineRange::parse("0"), Err(Error::Validation(_)));
        assert_matches!(LineRange::parse(""), Err(Error::Validation(_)));
    }

    #[test]
    fn range_contains_is_inclusive() {
        let r = LineRange::parse("3-7").unwrap();
        assert!(r.contains(3));
        assert!(r.contains(7));
        assert!(!r.contains(2));
        assert!(!r.contains(8));
    }

    #[test]
    fn scope_rejects_line_without_file() {
        assert_matches!(
            Scope::new(None, Some("5".to_string())),
            Err(Error::Validation(_))
        );
    }

    #[test]
    fn pr_scope_keeps_only_pathless_comments() {
        let all = vec![
            comment(1, None, None, None),
            comment(2, Some("src/lib.rs"), Some(4), None),
            comment(3, None, None, None),
        ];
        let scope = Scope::new(None, None).unwrap();
        let ids: Vec<u64> = scope.select(&all).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn file_scope_keeps_the_path_at_any_line() {
        let all = vec![
            comment(1, Some("src/lib.rs"), None, None),
            comment(2, Some("src/lib.rs"), Some(12), None),
            comment(3, Some("README.md"), Some(2), None),
            comment(4, None, None, None),
        ];
        let scope = Scope::new(Some("src/lib.rs".to_string()), None).unwrap();
        let ids: Vec<u64> = scope.select(&all).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn line_scope_keeps_lines_inside_the_range() {
        let all = vec![
            comment(1, Some("src/lib.rs"), Some(2), None),
            comment(2, Some("src/lib.rs"), Some(5), None),
            comment(3, Some("src/lib.rs"), Some(10), None),
            comment(4, Some("src/lib.rs"), None, None),
            comment(5, Some("README.md"), Some(5), None),
        ];
        let scope = Scope::new(Some("src/lib.rs".to_string()), Some("4-10".to_string())).unwrap();
        let ids: Vec<u64> = scope.select(&all).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn location_shows_the_anchored_part() {
        let mut c = comment(1, Some("src/lib.rs"), Some(7), None);
        assert_eq!(c.location().as_deref(), Some("src/lib.rs:7"));
        c.start_line = Some(3);
        assert_eq!(c.location().as_deref(), Some("src/lib.rs:3-7"));
        assert!(comment(2, None, None, None).location().is_none());
        assert_eq!(
            comment(3, Some("docs/a.md"), None, None).location().as_deref(),
            Some("docs/a.md")
        );
    }

    #[test]
    fn latest_root_of_empty_scope_is_none() {
        assert!(latest_root(&[]).is_none());
    }

    #[test]
    fn latest_root_skips_replies() {
        let all = vec![
            comment(1, Some("src/lib.rs"), Some(4), None),
            comment(2, Some("src/lib.rs"), Some(4), Some(1)),
        ];
        let scoped: Vec<&Comment> = all.iter().collect();
        assert_eq!(latest_root(&scoped).unwrap().id, 1);
    }

    #[test]
    fn latest_root_is_the_last_root_in_listing_order() {
        let all = vec![
            comment(1, Some("src/lib.rs"), Some(4), None),
            comment(2, Some("src/lib.rs"), Some(4), None),
            comment(3, Some("src/lib.rs"), Some(4), Some(2)),
        ];
        let scoped: Vec<&Comment> = all.iter().collect();
        assert_eq!(latest_root(&scoped).unwrap().id, 2);
    }

    #[test]
    fn reply_only_scope_has_no_root() {
        let all = vec![comment(2, Some("src/lib.rs"), Some(4), Some(1))];
        let scoped: Vec<&Comment> = all.iter().collect();
        assert!(latest_root(&scoped).is_none());
    }

    #[test]
    fn thread_of_collects_replies_in_order() {
        let all = vec![
            comment(1, Some("src/lib.rs"), Some(4), None),
            comment(2, Some("src/lib.rs"), Some(4), Some(1)),
            comment(3, Some("src/lib.rs"), Some(9), None),
            comment(4, Some("src/lib.rs"), Some(4), Some(1)),
        ];
        let ids: Vec<u64> = thread_of(&all, 1).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(thread_of(&all, 3).is_empty());
    }
}
