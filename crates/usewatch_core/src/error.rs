use thiserror::Error;

/// Reason a statement was rejected by the expander.
///
/// Each variant is a flavour of malformed statement; none of them is fatal to a
/// scan. The caller decides whether to log, count or ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected statement to start with 'use '")]
    MissingKeyword,

    #[error("expected ';' in statement")]
    MissingTerminator,

    #[error("unexpected '/' after removing comments")]
    StraySlash,

    #[error("expected ';' at end of statement")]
    TrailingText,

    #[error("unexpected extra ';' inside statement")]
    ExtraTerminator,

    #[error("statement has no path between 'use' and ';'")]
    Empty,

    #[error("empty path segment in '{0}'")]
    EmptySegment(String),

    #[error("unclosed '{{' in '{0}'")]
    UnclosedBrace(String),

    #[error("unmatched '}}' in '{0}'")]
    UnmatchedBrace(String),

    #[error("brace expansion exceeded {0} steps")]
    TooManySteps(usize),
}
