use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::github::{PullRequest, Repository, RepositoryPullRequests};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Short markers for the flags a reviewer cares about: "R" when you are a
/// requested reviewer, "D" for drafts
fn flags(pr: &PullRequest) -> String {
    let mut flags = String::new();
    flags.push(if pr.is_reviewer_match { 'R' } else { ' ' });
    flags.push(if pr.is_draft { 'D' } else { ' ' });
    flags
}

/// Format one PR line
/// Format: "{flags} {#number} {title}  {age} | {author} | {comments}c {approvals}a"
fn format_pr_line(pr: &PullRequest, title_width: Option<usize>, use_colors: bool) -> String {
    let title = match title_width {
        Some(width) => truncate_title(&pr.title, width),
        None => pr.title.clone(),
    };
    let counts = format!("{}c {}a", pr.comment_count, pr.approval_count);

    if use_colors {
        let title = if pr.is_reviewer_match {
            title.bold().to_string()
        } else {
            title
        };
        format!(
            "  {} {} {}  {} | {} | {}",
            flags(pr).magenta(),
            pr.short_ref().dimmed(),
            title,
            pr.age.dimmed(),
            pr.author.yellow(),
            counts.green()
        )
    } else {
        format!(
            "  {} {} {}  {} | {} | {}",
            flags(pr),
            pr.short_ref(),
            title,
            pr.age,
            pr.author,
            counts
        )
    }
}

/// Format one repository block: a header line, then its PRs, an error
/// placeholder, or a note that nothing is open
pub fn format_repository(result: &RepositoryPullRequests, use_colors: bool) -> String {
    let header = if use_colors {
        result.full_name().cyan().bold().to_string()
    } else {
        result.full_name()
    };

    let mut lines = vec![header];

    if let Some(error) = &result.error {
        let line = format!("  error: {}", error);
        lines.push(if use_colors { line.red().to_string() } else { line });
    } else if result.pull_requests.is_empty() {
        lines.push("  There are no open PRs for this repo".to_string());
    } else {
        // Reserve room for flags, ref, age, author and counts; give the rest to the title
        let title_width = get_terminal_width().map(|width| width.saturating_sub(60).max(20));
        lines.extend(
            result
                .pull_requests
                .iter()
                .map(|pr| format_pr_line(pr, title_width, use_colors)),
        );
    }

    lines.join("\n")
}

/// Format every repository result, separated by blank lines
pub fn format_results(results: &[RepositoryPullRequests], use_colors: bool) -> String {
    if results.is_empty() {
        return "No repositories selected.".to_string();
    }

    results
        .iter()
        .map(|result| format_repository(result, use_colors))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format the repository list for picking a selection, "*" marks the ones
/// already selected
pub fn format_repository_list(repositories: &[Repository], use_colors: bool) -> String {
    if repositories.is_empty() {
        return "No repositories found.".to_string();
    }

    repositories
        .iter()
        .map(|repo| {
            let marker = if repo.selected { "*" } else { " " };
            if use_colors && repo.selected {
                format!("{} {}", marker.green(), repo.full_name.bold())
            } else {
                format!("{} {}", marker, repo.full_name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_pr() -> PullRequest {
        PullRequest {
            number: 123,
            title: "Fix login bug".to_string(),
            created_at: Utc::now(),
            age: "5 hours ago".to_string(),
            state: "open".to_string(),
            url: "https://github.com/octo/app/pull/123".to_string(),
            author: "octocat".to_string(),
            requested_reviewers: vec!["alice".to_string()],
            is_reviewer_match: true,
            is_draft: false,
            comment_count: 4,
            approval_count: 1,
        }
    }

    fn sample_repo(pull_requests: Vec<PullRequest>) -> RepositoryPullRequests {
        RepositoryPullRequests {
            org_name: "octo".to_string(),
            repo_name: "app".to_string(),
            pull_requests,
            error: None,
        }
    }

    #[test]
    fn test_format_pr_line_plain() {
        let line = format_pr_line(&sample_pr(), None, false);
        assert_eq!(line, "  R  #123 Fix login bug  5 hours ago | octocat | 4c 1a");
    }

    #[test]
    fn test_format_pr_line_draft_flag() {
        let mut pr = sample_pr();
        pr.is_reviewer_match = false;
        pr.is_draft = true;
        let line = format_pr_line(&pr, None, false);
        assert!(line.starts_with("   D #123"));
    }

    #[test]
    fn test_format_repository_with_prs() {
        let result = format_repository(&sample_repo(vec![sample_pr()]), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "octo/app");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Fix login bug"));
    }

    #[test]
    fn test_format_repository_empty() {
        let result = format_repository(&sample_repo(vec![]), false);
        assert_eq!(result, "octo/app\n  There are no open PRs for this repo");
    }

    #[test]
    fn test_format_repository_error_placeholder() {
        let mut repo = sample_repo(vec![]);
        repo.repo_name = "missing".to_string();
        repo.error = Some("Not Found".to_string());
        assert_eq!(format_repository(&repo, false), "octo/missing\n  error: Not Found");
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&[], false), "No repositories selected.");
    }

    #[test]
    fn test_format_results_separates_repositories() {
        let results = vec![sample_repo(vec![sample_pr()]), sample_repo(vec![])];
        let output = format_results(&results, false);
        assert_eq!(output.matches("octo/app").count(), 2);
        assert!(output.contains("\n\n"));
    }

    #[test]
    fn test_format_repository_list() {
        let repos = vec![
            Repository {
                full_name: "octo/app".to_string(),
                selected: true,
            },
            Repository {
                full_name: "octo/lib".to_string(),
                selected: false,
            },
        ];
        assert_eq!(format_repository_list(&repos, false), "* octo/app\n  octo/lib");
        assert_eq!(format_repository_list(&[], false), "No repositories found.");
    }

    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }
}
