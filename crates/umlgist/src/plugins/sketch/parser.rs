//! Class diagram DSL parser using chumsky
//!
//! Parses the subset of the Hylimo class-diagram language understood by
//! the sketch engine into AST statements.

use chumsky::prelude::*;
use chumsky::text::{ident, keyword};
use std::fmt;

use crate::core::chumsky_utils::{
    inline_whitespace, line_comment, line_column, optional_whitespace, string_literal, RichExtra,
};
use crate::core::Diagnostic;

/// Member visibility section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    /// UML glyph shown in front of members
    pub fn symbol(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Class,
    Interface,
    Enum,
}

impl ClassifierKind {
    /// Class tag identifying the element on the canvas
    pub fn element_class(self) -> &'static str {
        match self {
            ClassifierKind::Class => "class-element",
            ClassifierKind::Interface => "interface-element",
            ClassifierKind::Enum => "enum-element",
        }
    }

    /// Stereotype shown above the name
    pub fn stereotype(self) -> Option<&'static str> {
        match self {
            ClassifierKind::Class => None,
            ClassifierKind::Interface => Some("<<interface>>"),
            ClassifierKind::Enum => Some("<<enumeration>>"),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Class => write!(f, "class"),
            ClassifierKind::Interface => write!(f, "interface"),
            ClassifierKind::Enum => write!(f, "enum"),
        }
    }
}

/// A group of member lines, optionally under a visibility
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub visibility: Option<Visibility>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierDecl {
    pub kind: ClassifierKind,
    pub name: String,
    pub is_abstract: bool,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub name: String,
    pub statements: Vec<Statement>,
}

/// Connection operators; the marker sits on the side the symbol points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOperator {
    /// `--`
    Line,
    /// `-->`
    Arrow,
    /// `<--`
    ReverseArrow,
    /// `..`
    Dashed,
    /// `..>`
    DashedArrow,
    /// `<..`
    ReverseDashedArrow,
    /// `extends`
    Extends,
    /// `implements`
    Implements,
    /// `--*`
    Composition,
    /// `*--`
    ReverseComposition,
    /// `--<>`
    Aggregation,
    /// `<>--`
    ReverseAggregation,
}

impl ConnectionOperator {
    /// Class tag of the end marker, if any
    pub fn marker_class(self) -> Option<&'static str> {
        match self {
            ConnectionOperator::Line | ConnectionOperator::Dashed => None,
            ConnectionOperator::Arrow
            | ConnectionOperator::ReverseArrow
            | ConnectionOperator::DashedArrow
            | ConnectionOperator::ReverseDashedArrow => Some("arrow-marker"),
            ConnectionOperator::Extends | ConnectionOperator::Implements => {
                Some("triangle-marker")
            }
            ConnectionOperator::Composition | ConnectionOperator::ReverseComposition => {
                Some("filled-diamond-marker")
            }
            ConnectionOperator::Aggregation | ConnectionOperator::ReverseAggregation => {
                Some("diamond-marker")
            }
        }
    }

    pub fn is_dashed(self) -> bool {
        matches!(
            self,
            ConnectionOperator::Dashed
                | ConnectionOperator::DashedArrow
                | ConnectionOperator::ReverseDashedArrow
                | ConnectionOperator::Implements
        )
    }

    /// Whether the marker belongs to the left operand
    pub fn is_reversed(self) -> bool {
        matches!(
            self,
            ConnectionOperator::ReverseArrow
                | ConnectionOperator::ReverseDashedArrow
                | ConnectionOperator::ReverseComposition
                | ConnectionOperator::ReverseAggregation
        )
    }
}

/// `label("text", position)` inside a `with { ... }` block
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDecl {
    pub text: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDecl {
    pub from: String,
    pub to: String,
    pub operator: ConnectionOperator,
    pub labels: Vec<LabelDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Classifier(ClassifierDecl),
    Package(PackageDecl),
    Comment(String),
    Connection(ConnectionDecl),
}

/// Chumsky-based parser for the class diagram DSL
#[derive(Debug, Clone, Copy, Default)]
pub struct SketchParser;

impl SketchParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a complete `classDiagram { ... }` document
    ///
    /// Errors carry 1-based line and column positions.
    pub fn parse_diagram(&self, input: &str) -> Result<Vec<Statement>, Vec<Diagnostic>> {
        Self::diagram_parser()
            .parse(input)
            .into_result()
            .map_err(|errors| to_diagnostics(input, errors))
    }

    /// Parse a single statement
    pub fn parse_statement(&self, input: &str) -> Result<Statement, Vec<Diagnostic>> {
        Self::statement_parser()
            .padded_by(optional_whitespace())
            .then_ignore(end())
            .parse(input)
            .into_result()
            .map_err(|errors| to_diagnostics(input, errors))
    }

    fn diagram_parser<'src>() -> impl Parser<'src, &'src str, Vec<Statement>, RichExtra<'src>> {
        optional_whitespace()
            .ignore_then(keyword("classDiagram"))
            .then_ignore(optional_whitespace())
            .ignore_then(Self::block(Self::statement_parser()))
            .then_ignore(optional_whitespace())
            .then_ignore(end())
    }

    /// `{` statements separated by whitespace, comments or `;` `}`
    fn block<'src, T>(
        item: impl Parser<'src, &'src str, T, RichExtra<'src>> + Clone,
    ) -> impl Parser<'src, &'src str, Vec<T>, RichExtra<'src>> + Clone {
        just('{')
            .ignore_then(separators())
            .ignore_then(
                item.then_ignore(separators())
                    .repeated()
                    .collect::<Vec<T>>(),
            )
            .then_ignore(just('}'))
    }

    fn statement_parser<'src>() -> impl Parser<'src, &'src str, Statement, RichExtra<'src>> + Clone
    {
        recursive(|statement| {
            choice((
                Self::classifier_parser().map(Statement::Classifier),
                Self::package_parser(statement).map(Statement::Package),
                Self::comment_parser().map(Statement::Comment),
                Self::connection_parser().map(Statement::Connection),
            ))
        })
    }

    /// `("name")` or `("name", abstract = true)`
    fn arguments<'src>() -> impl Parser<'src, &'src str, (String, bool), RichExtra<'src>> + Clone
    {
        let abstract_flag = just(',')
            .padded_by(optional_whitespace())
            .ignore_then(keyword("abstract"))
            .ignore_then(just('=').padded_by(optional_whitespace()))
            .ignore_then(boolean())
            .or_not()
            .map(|flag| flag.unwrap_or(false));

        string_literal()
            .padded_by(optional_whitespace())
            .then(abstract_flag)
            .then_ignore(optional_whitespace())
            .delimited_by(just('('), just(')'))
    }

    fn classifier_parser<'src>(
    ) -> impl Parser<'src, &'src str, ClassifierDecl, RichExtra<'src>> + Clone {
        let kind = choice((
            keyword("class").to(ClassifierKind::Class),
            keyword("interface").to(ClassifierKind::Interface),
            keyword("enum").to(ClassifierKind::Enum),
        ));

        let visibility = choice((
            keyword("public").to(Visibility::Public),
            keyword("private").to(Visibility::Private),
            keyword("protected").to(Visibility::Protected),
            keyword("package").to(Visibility::Package),
        ));

        let section = visibility
            .then_ignore(optional_whitespace())
            .then(member_lines().delimited_by(just('{'), just('}')))
            .map(|(visibility, members)| Section {
                visibility: Some(visibility),
                members,
            });

        let sectioned_body = Self::block(section);
        let plain_body = member_lines()
            .delimited_by(just('{'), just('}'))
            .map(|members| {
                vec![Section {
                    visibility: None,
                    members,
                }]
            });

        kind.then_ignore(optional_whitespace())
            .then(Self::arguments())
            .then(
                optional_whitespace()
                    .ignore_then(sectioned_body.or(plain_body))
                    .or_not(),
            )
            .map(|((kind, (name, is_abstract)), sections)| ClassifierDecl {
                kind,
                name,
                is_abstract,
                sections: sections
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|section| !section.members.is_empty())
                    .collect(),
            })
    }

    fn package_parser<'src, S>(
        statement: S,
    ) -> impl Parser<'src, &'src str, PackageDecl, RichExtra<'src>> + Clone
    where
        S: Parser<'src, &'src str, Statement, RichExtra<'src>> + Clone + 'src,
    {
        keyword("package")
            .ignore_then(optional_whitespace())
            .ignore_then(
                string_literal()
                    .padded_by(optional_whitespace())
                    .delimited_by(just('('), just(')')),
            )
            .then_ignore(optional_whitespace())
            .then(Self::block(statement))
            .map(|(name, statements)| PackageDecl { name, statements })
    }

    fn comment_parser<'src>() -> impl Parser<'src, &'src str, String, RichExtra<'src>> + Clone {
        keyword("comment")
            .ignore_then(optional_whitespace())
            .ignore_then(
                string_literal()
                    .padded_by(optional_whitespace())
                    .delimited_by(just('('), just(')')),
            )
    }

    fn connection_parser<'src>(
    ) -> impl Parser<'src, &'src str, ConnectionDecl, RichExtra<'src>> + Clone {
        let name = ident().map(|s: &str| s.to_string());

        // Longest symbols first so `--` does not swallow `-->`
        let operator = choice((
            just("<>--").to(ConnectionOperator::ReverseAggregation),
            just("--<>").to(ConnectionOperator::Aggregation),
            just("-->").to(ConnectionOperator::Arrow),
            just("--*").to(ConnectionOperator::Composition),
            just("<--").to(ConnectionOperator::ReverseArrow),
            just("*--").to(ConnectionOperator::ReverseComposition),
            just("..>").to(ConnectionOperator::DashedArrow),
            just("<..").to(ConnectionOperator::ReverseDashedArrow),
            just("--").to(ConnectionOperator::Line),
            just("..").to(ConnectionOperator::Dashed),
            keyword("extends").to(ConnectionOperator::Extends),
            keyword("implements").to(ConnectionOperator::Implements),
        ));

        let label = keyword("label")
            .ignore_then(optional_whitespace())
            .ignore_then(
                string_literal()
                    .padded_by(optional_whitespace())
                    .then_ignore(just(','))
                    .then(number().padded_by(optional_whitespace()))
                    .delimited_by(just('('), just(')')),
            )
            .map(|(text, position)| LabelDecl { text, position });

        let labels = inline_whitespace()
            .ignore_then(keyword("with"))
            .ignore_then(optional_whitespace())
            .ignore_then(Self::block(label))
            .or_not()
            .map(Option::unwrap_or_default);

        name.clone()
            .then_ignore(inline_whitespace())
            .then(operator)
            .then_ignore(inline_whitespace())
            .then(name)
            .then(labels)
            .map(|(((from, operator), to), labels)| ConnectionDecl {
                from,
                to,
                operator,
                labels,
            })
    }
}

/// Whitespace, comments and `;` between statements
fn separators<'src>() -> impl Parser<'src, &'src str, (), RichExtra<'src>> + Clone {
    one_of(" \t\n\r;")
        .ignored()
        .or(line_comment())
        .repeated()
        .ignored()
}

/// Raw member lines up to the closing brace
///
/// Blank lines are dropped and `//` comments end a line.
fn member_lines<'src>() -> impl Parser<'src, &'src str, Vec<String>, RichExtra<'src>> + Clone {
    let line = just("//")
        .not()
        .ignore_then(none_of("\n\r;{}"))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| Some(s.trim().to_string()));

    one_of("\n\r;")
        .to(None)
        .or(line_comment().to(None))
        .or(line)
        .repeated()
        .collect::<Vec<Option<String>>>()
        .map(|lines| {
            lines
                .into_iter()
                .flatten()
                .filter(|line| !line.is_empty())
                .collect()
        })
}

fn boolean<'src>() -> impl Parser<'src, &'src str, bool, RichExtra<'src>> + Clone {
    keyword("true").to(true).or(keyword("false").to(false))
}

fn number<'src>() -> impl Parser<'src, &'src str, f64, RichExtra<'src>> + Clone {
    one_of("+-0123456789.eE")
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<f64>()
                .map_err(|e| Rich::custom(span, format!("invalid number '{}': {}", s, e)))
        })
}

fn to_diagnostics(input: &str, errors: Vec<Rich<'_, char>>) -> Vec<Diagnostic> {
    errors
        .into_iter()
        .map(|error| {
            let (line, column) = line_column(input, error.span().start);
            Diagnostic::at(error.to_string(), line, column)
        })
        .collect()
}
