use branchy_core::{BranchyError, BranchyResult};
use branchy_domain::{Author, Branch, Commit};
use chrono::{DateTime, Utc};

const FIELD_SEPARATOR: char = '\u{1f}';

/// `git for-each-ref` format producing one line per branch, fields separated
/// by the ASCII unit separator
pub const BRANCH_FORMAT: &str = "%(refname:lstrip=2)%1f%(objectname)%1f%(authorname)%1f%(authoremail)%1f%(authordate:iso-strict)%1f%(contents:subject)%1f%(HEAD)";

/// Parse the output of `git for-each-ref --format=BRANCH_FORMAT refs/heads`.
///
/// Branches come back sorted by name.
pub fn parse_branch_list(output: &str) -> BranchyResult<Vec<Branch>> {
    let mut branches = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect::<BranchyResult<Vec<_>>>()?;
    branches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(branches)
}

fn parse_line(line: &str) -> BranchyResult<Branch> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let &[name, id, author_name, author_email, date, subject, head] = fields.as_slice() else {
        return Err(BranchyError::Parse(format!(
            "Expected 7 fields in branch line, found {}: {:?}",
            fields.len(),
            line
        )));
    };

    let date = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| BranchyError::Parse(format!("Invalid commit date '{}': {}", date, e)))?
        .with_timezone(&Utc);

    Ok(Branch {
        name: name.to_string(),
        last_commit: Commit {
            id: id.to_string(),
            message: subject.to_string(),
            date,
            author: Author {
                name: author_name.to_string(),
                email: author_email
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string(),
            },
        },
        is_head: head.trim() == "*",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(fields: [&str; 7]) -> String {
        fields.join("\u{1f}")
    }

    #[test]
    fn test_parse_branch_list() {
        let output = [
            line([
                "main",
                "0123456789abcdef0123456789abcdef01234567",
                "Ada Lovelace",
                "<ada@example.com>",
                "2024-03-01T10:15:00+01:00",
                "Initial commit",
                "*",
            ]),
            line([
                "feature/login",
                "89abcdef0123456789abcdef0123456789abcdef",
                "Grace Hopper",
                "<grace@example.com>",
                "2024-03-02T08:00:00Z",
                "Add login form",
                " ",
            ]),
        ]
        .join("\n");

        let branches = parse_branch_list(&output).unwrap();
        assert_eq!(branches.len(), 2);

        let feature = &branches[0];
        assert_eq!(feature.name, "feature/login");
        assert!(!feature.is_head);
        assert_eq!(feature.last_commit.message, "Add login form");
        assert_eq!(feature.last_commit.author.email, "grace@example.com");

        let main = &branches[1];
        assert_eq!(main.name, "main");
        assert!(main.is_head);
        assert_eq!(main.last_commit.short_id(), "0123456");
        assert_eq!(main.last_commit.author.name, "Ada Lovelace");
        assert_eq!(
            main.last_commit.date.to_rfc3339(),
            "2024-03-01T09:15:00+00:00"
        );
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_branch_list("").unwrap().is_empty());
        assert!(parse_branch_list("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_subject_may_be_empty() {
        let output = line([
            "main",
            "abc",
            "Ada",
            "<ada@example.com>",
            "2024-03-01T10:15:00Z",
            "",
            "*",
        ]);
        let branches = parse_branch_list(&output).unwrap();
        assert_eq!(branches[0].last_commit.message, "");
    }

    #[test]
    fn test_missing_fields_is_parse_error() {
        let err = parse_branch_list("main\u{1f}abc").unwrap_err();
        assert!(matches!(err, BranchyError::Parse(_)));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let output = line(["main", "abc", "Ada", "<a@b>", "yesterday", "msg", "*"]);
        let err = parse_branch_list(&output).unwrap_err();
        assert!(err.to_string().contains("Invalid commit date 'yesterday'"));
    }
}
