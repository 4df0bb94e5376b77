//! Shared chumsky parser utilities for diagram source parsing
//!
//! All helpers use rich errors so parse failures can be reported with a
//! source location.

use chumsky::prelude::*;

/// Parser extra carrying rich, span-aware errors
pub type RichExtra<'src> = extra::Err<Rich<'src, char>>;

/// Parse a `//` comment up to (not including) the end of the line.
pub fn line_comment<'src>() -> impl Parser<'src, &'src str, (), RichExtra<'src>> + Clone {
    just("//").ignore_then(none_of('\n').repeated()).ignored()
}

/// Parse optional whitespace, newlines and `//` comments.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, (), RichExtra<'src>> + Clone {
    one_of(" \t\n\r")
        .ignored()
        .or(line_comment())
        .repeated()
        .ignored()
}

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), RichExtra<'src>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse a double-quoted string literal with `\"` and `\\` escapes.
pub fn string_literal<'src>() -> impl Parser<'src, &'src str, String, RichExtra<'src>> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('"'),
        just('\\'),
        just('n').to('\n'),
    )));

    none_of("\\\"")
        .or(escape)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
}

/// Convert a byte offset into a 1-based line and column.
pub fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|tail| tail.chars().count())
        .unwrap_or(0)
        + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_whitespace_with_comments() {
        let parser = optional_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("test").into_result().is_ok());
        assert!(parser.parse(" \n\ttest").into_result().is_ok());
        assert!(parser.parse("// note\n  test").into_result().is_ok());
        assert!(parser.parse("/ test").into_result().is_err());
    }

    #[test]
    fn test_inline_whitespace() {
        let parser = inline_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("\t test").into_result().is_ok());
        // Should NOT consume newlines
        assert!(parser.parse("\ntest").into_result().is_err());
    }

    #[test]
    fn test_string_literal() {
        let parser = string_literal().then_ignore(end());
        assert_eq!(
            parser.parse(r#""HelloWorld""#).into_result().unwrap(),
            "HelloWorld"
        );
        assert_eq!(
            parser.parse(r#""say \"hi\"""#).into_result().unwrap(),
            "say \"hi\""
        );
        assert!(parser.parse(r#""open"#).into_result().is_err());
    }

    #[test]
    fn test_line_column() {
        let input = "classDiagram {\n  class(\n}";
        assert_eq!(line_column(input, 0), (1, 1));
        assert_eq!(line_column(input, 15), (2, 1));
        assert_eq!(line_column(input, 17), (2, 3));
        assert_eq!(line_column(input, 1000), (3, 2));
    }
}
