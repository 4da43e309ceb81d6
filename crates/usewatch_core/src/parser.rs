use log::trace;

use crate::{
    constants::{MAX_EXPANSION_STEPS, TERMINATOR, USE_KEYWORD},
    error::ParseError,
    statement::strip_line_comment,
    types::{Expansion, ImportPath},
};

/// A `prefix{inner}suffix` split of a partially expanded path.
#[derive(Debug, PartialEq, Eq)]
struct BraceGroup<'a> {
    prefix: &'a str,
    inner: &'a str,
    suffix: &'a str,
}

/// Expand one import statement into the paths it brings into scope.
///
/// `use a::{b, c::{d, e}};` yields `a::b`, `a::c::d`, `a::c::e` in that order.
/// Duplicates are kept. Any malformed part rejects the whole statement.
pub fn expand_statement(text: &str) -> Result<Expansion, ParseError> {
    let Some(rest) = text.strip_prefix(USE_KEYWORD) else {
        return Err(ParseError::MissingKeyword);
    };
    if !rest.contains(TERMINATOR) {
        return Err(ParseError::MissingTerminator);
    }

    let body = flatten(rest);
    if body.contains('/') {
        return Err(ParseError::StraySlash);
    }
    let Some(body) = body.strip_suffix(TERMINATOR) else {
        return Err(ParseError::TrailingText);
    };
    if body.contains(TERMINATOR) {
        return Err(ParseError::ExtraTerminator);
    }
    if body.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let paths = expand_braces(body)?;
    let statement = format!("{}{}{}", USE_KEYWORD, body, TERMINATOR);
    trace!("Expanded '{}' into {} paths", statement, paths.len());
    Ok(Expansion { statement, paths })
}

/// Join physical lines into one, dropping line comments and normalising
/// whitespace so that `std::{\n  fs, // x\n  net}` becomes `std::{fs, net}`.
fn flatten(text: &str) -> String {
    let joined = text.lines().map(strip_line_comment).collect::<Vec<_>>().join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            if matches!(prev, Some('{') | Some(':'))
                || matches!(next, Some('}') | Some(',') | Some(':') | Some(TERMINATOR))
            {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn expand_braces(body: &str) -> Result<Vec<ImportPath>, ParseError> {
    let mut pending = vec![body.to_string()];
    let mut paths = Vec::new();
    let mut steps = 0;

    while let Some(item) = pending.pop() {
        steps += 1;
        if steps > MAX_EXPANSION_STEPS {
            return Err(ParseError::TooManySteps(MAX_EXPANSION_STEPS));
        }

        match find_group(&item)? {
            Some(group) => {
                // Pushed in reverse so alternatives pop in source order
                for alt in split_alternatives(group.inner).into_iter().rev() {
                    let alt = alt.trim();
                    if alt.is_empty() {
                        continue;
                    }
                    pending.push(format!("{}{}{}", group.prefix, alt, group.suffix));
                }
            }
            None => paths.push(ImportPath::parse(&item)?),
        }
    }

    Ok(paths)
}

/// Locate the first outermost brace group of `item`.
fn find_group(item: &str) -> Result<Option<BraceGroup<'_>>, ParseError> {
    let mut depth = 0usize;
    let mut open = None;

    for (i, c) in item.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(ParseError::UnmatchedBrace(item.to_string()));
                }
                depth -= 1;
                if depth == 0
                    && let Some(start) = open
                {
                    return Ok(Some(BraceGroup {
                        prefix: &item[..start],
                        inner: &item[start + 1..i],
                        suffix: &item[i + 1..],
                    }));
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::UnclosedBrace(item.to_string()));
    }
    Ok(None)
}

/// Split the contents of a group on the commas at its own nesting level.
fn split_alternatives(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn expand(text: &str) -> Vec<String> {
        expand_statement(text).unwrap().paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_plain_path() {
        let expansion = expand_statement("use std::fs::File;").unwrap();
        assert_eq!(expansion.paths.len(), 1);
        assert_eq!(expansion.paths[0].segments(), ["std", "fs", "File"]);
        assert_eq!(expansion.statement, "use std::fs::File;");
    }

    #[test]
    fn test_single_group() {
        assert_eq!(expand("use std::{env, fs, net};"), vec!["std::env", "std::fs", "std::net"]);
    }

    #[test]
    fn test_group_with_prefix_and_suffix() {
        let got: HashSet<String> = expand("use a::{b, c}::d;").into_iter().collect();
        let want: HashSet<String> = ["a::b::d", "a::c::d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn test_nested_groups_multiply_out() {
        assert_eq!(expand("use a::{b, c::{d,e}};"), vec!["a::b", "a::c::d", "a::c::e"]);
    }

    #[test]
    fn test_deeply_nested_groups() {
        let paths = expand(
            "use std::{io::{self, Read, Write}, os::unix::{fs::{self, PermissionsExt}, net}};",
        );
        assert_eq!(
            paths,
            vec![
                "std::io",
                "std::io::Read",
                "std::io::Write",
                "std::os::unix::fs",
                "std::os::unix::fs::PermissionsExt",
                "std::os::unix::net",
            ]
        );
    }

    #[test]
    fn test_sibling_groups_cross_product() {
        assert_eq!(expand("use {a, b}::{c, d};"), vec!["a::c", "a::d", "b::c", "b::d"]);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        assert_eq!(expand("use std::{fs, fs};"), vec!["std::fs", "std::fs"]);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        for path in expand("use std::{env::{self, args}, fs::File};") {
            assert_eq!(expand(&format!("use {};", path)), vec![path.clone()]);
        }
    }

    #[test]
    fn test_multi_line_statement_with_comment() {
        let expansion =
            expand_statement("use std::{\n  fs, // filesystem access\n  net};").unwrap();
        assert_eq!(expansion.statement, "use std::{fs, net};");
        let paths: Vec<String> = expansion.paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["std::fs", "std::net"]);
    }

    #[test]
    fn test_trailing_comma_and_alias() {
        assert_eq!(
            expand("use std::{\n    fs::File as F,\n    process::Command,\n};"),
            vec!["std::fs::File", "std::process::Command"]
        );
    }

    #[test]
    fn test_empty_group_imports_nothing() {
        assert!(expand("use std::{};").is_empty());
    }

    #[test]
    fn test_truncated_statement_is_expandable() {
        assert_eq!(expand("use std::{\n    fs,\n    net}\n;"), vec!["std::fs", "std::net"]);
        assert!(matches!(
            expand_statement("use std::{\n    fs,\n    net\n;"),
            Err(ParseError::UnclosedBrace(_))
        ));
    }

    #[test]
    fn test_unclosed_brace_rejects_statement() {
        assert_eq!(
            expand_statement("use a::{b,c;"),
            Err(ParseError::UnclosedBrace("a::{b,c".to_string()))
        );
    }

    #[test]
    fn test_unmatched_close_rejects_statement() {
        assert!(matches!(
            expand_statement("use a::{b}};"),
            Err(ParseError::UnmatchedBrace(_))
        ));
        assert!(matches!(expand_statement("use a::b};"), Err(ParseError::UnmatchedBrace(_))));
    }

    #[test]
    fn test_partially_valid_statement_yields_nothing() {
        // The first alternative is fine, the second is not; nothing is returned
        assert!(expand_statement("use a::{b, c::{d};").is_err());
    }

    #[test]
    fn test_missing_keyword() {
        assert_eq!(expand_statement("pub use std::fs;"), Err(ParseError::MissingKeyword));
        assert_eq!(expand_statement("std::fs;"), Err(ParseError::MissingKeyword));
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(expand_statement("use std::fs"), Err(ParseError::MissingTerminator));
    }

    #[test]
    fn test_terminator_only_in_comment() {
        assert_eq!(expand_statement("use std::fs // ;"), Err(ParseError::TrailingText));
    }

    #[test]
    fn test_stray_slash() {
        assert_eq!(expand_statement("use std::{fs, /* net */ env};"), Err(ParseError::StraySlash));
    }

    #[test]
    fn test_text_after_terminator() {
        assert_eq!(expand_statement("use std::fs; fn main() {}"), Err(ParseError::TrailingText));
    }

    #[test]
    fn test_extra_terminator() {
        assert_eq!(
            expand_statement("use std::fs; use std::env;"),
            Err(ParseError::ExtraTerminator)
        );
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(expand_statement("use ;"), Err(ParseError::Empty));
        assert_eq!(expand_statement("use // nothing\n;"), Err(ParseError::Empty));
    }

    #[test]
    fn test_empty_segment() {
        assert!(matches!(
            expand_statement("use std::::fs;"),
            Err(ParseError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_step_limit() {
        // 2^13 leaves need more than the step budget
        let body = vec!["{a, b}"; 13].join("::");
        assert_eq!(
            expand_statement(&format!("use {};", body)),
            Err(ParseError::TooManySteps(MAX_EXPANSION_STEPS))
        );
    }

    #[test]
    fn test_flatten_normalises_whitespace() {
        assert_eq!(flatten("std :: {\n\tfs ,\n  net } ;"), "std::{fs, net};");
        assert_eq!(flatten("::std::env;"), "::std::env;");
    }

    #[test]
    fn test_find_group_picks_outermost() {
        let group = find_group("a::{b, c::{d}}::e").unwrap().unwrap();
        assert_eq!(group, BraceGroup { prefix: "a::", inner: "b, c::{d}", suffix: "::e" });
        assert_eq!(find_group("a::b").unwrap(), None);
    }

    #[test]
    fn test_split_alternatives_respects_nesting() {
        assert_eq!(split_alternatives("b, c::{d, e}, f"), vec!["b", " c::{d, e}", " f"]);
        assert_eq!(split_alternatives(""), vec![""]);
    }
}
