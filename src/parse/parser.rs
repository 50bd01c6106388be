use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::Sum;
use std::mem;
use std::ops::{Add, AddAssign, Deref, DerefMut};

use itertools::Itertools;
use serde::Serialize;
use tracing::{instrument, trace};

use crate::parse::lexer::{Lexer, LexerError};
use crate::parse::lookahead::Lookahead;
use crate::position::{HasSpan, Position, Span};
use crate::syntax::{Arity, Leaf, SyntaxKind, SyntaxNode, Token, Tree};

const RECURSION_LIMIT: usize = 1000;

#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Internal,
}

/// A bug in the parser itself rather than a problem with the input.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub enum InternalError {
    LookaheadExceeded {
        requested: usize,
        capacity: usize,
    },

    StackUnderflow {
        kind: SyntaxKind,
        requested: usize,
        available: usize,
    },

    NotANodeKind(SyntaxKind),

    ArityMismatch {
        kind: SyntaxKind,
        arity: Arity,
        actual: usize,
    },

    LeftoverItems {
        count: usize,
    },
}

impl Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookaheadExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "peeked {} tokens ahead with a lookahead buffer of {}",
                requested, capacity
            ),

            Self::StackUnderflow {
                kind,
                requested,
                available,
            } => write!(
                f,
                "reducing `{}` needed {} items but the construction stack held {}",
                kind, requested, available
            ),

            Self::NotANodeKind(kind) => write!(f, "`{:?}` is not a node kind", kind),

            Self::ArityMismatch {
                kind,
                arity,
                actual,
            } => write!(
                f,
                "`{}` admits {} children but {} were produced",
                kind, arity, actual
            ),

            Self::LeftoverItems { count } => write!(
                f,
                "the construction stack held {} items at the end of the parse",
                count
            ),
        }
    }
}

impl Error for InternalError {}

#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub enum ParserError {
    UnexpectedToken {
        expected: Cow<'static, [SyntaxKind]>,
        actual: Token,
    },

    RecursionLimit(Span),

    Lexer(LexerError),

    Internal(InternalError),
}

impl ParserError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedToken { .. } | Self::RecursionLimit(_) => ErrorCategory::Syntax,
            Self::Lexer(_) => ErrorCategory::Lexical,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// The location of the offending input. Internal errors have none.
    pub fn location(&self) -> Option<Cow<'_, Span>> {
        match self {
            Self::UnexpectedToken { actual, .. } => Some(actual.span()),
            Self::RecursionLimit(span) => Some(Cow::Borrowed(span)),
            Self::Lexer(e) => Some(e.span()),
            Self::Internal(_) => None,
        }
    }
}

impl From<LexerError> for ParserError {
    fn from(e: LexerError) -> Self {
        Self::Lexer(e)
    }
}

impl From<InternalError> for ParserError {
    fn from(e: InternalError) -> Self {
        Self::Internal(e)
    }
}

fn format_expected(kinds: &[SyntaxKind]) -> String {
    kinds.iter().map(|kind| format!("`{}`", kind)).join(", ")
}

impl Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected, actual } => {
                write!(f, "encountered an unexpected token: `{}`", actual.kind)?;

                match expected.len() {
                    0 => Ok(()),
                    1 => write!(f, " (expected `{}`)", &expected[0]),
                    2 => write!(f, " (expected `{}` or `{}`)", &expected[0], &expected[1]),

                    n => write!(
                        f,
                        " (expected {}, or `{}`)",
                        format_expected(&expected[..n - 1]),
                        &expected[n - 1]
                    ),
                }
            }

            Self::RecursionLimit(_) => {
                write!(f, "a recursion limit has been reached while parsing")
            }

            Self::Lexer(e) => write!(f, "{}", e),

            Self::Internal(e) => write!(f, "internal parser error: {}", e),
        }
    }
}

impl Error for ParserError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lexer(e) => Some(e),
            Self::Internal(e) => Some(e),
            _ => None,
        }
    }
}

/// The number of nodes a parsing step left on the construction stack.
#[must_use = "the item count has to reach a `build` call"]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
struct Items(usize);

impl Items {
    const NONE: Items = Items(0);
    const ONE: Items = Items(1);
}

impl Add for Items {
    type Output = Items;

    fn add(self, rhs: Items) -> Items {
        Items(self.0 + rhs.0)
    }
}

impl AddAssign for Items {
    fn add_assign(&mut self, rhs: Items) {
        self.0 += rhs.0;
    }
}

impl Sum for Items {
    fn sum<I: Iterator<Item = Items>>(iter: I) -> Items {
        iter.fold(Items::NONE, Add::add)
    }
}

type ParseResult = Result<Items, ParserError>;

trait Matcher {
    fn matches(&self, kind: SyntaxKind) -> bool;

    fn expected_kinds(&self) -> Cow<'static, [SyntaxKind]>;
}

impl Matcher for SyntaxKind {
    fn matches(&self, kind: SyntaxKind) -> bool {
        *self == kind
    }

    fn expected_kinds(&self) -> Cow<'static, [SyntaxKind]> {
        vec![*self].into()
    }
}

impl<const N: usize> Matcher for [SyntaxKind; N] {
    fn matches(&self, kind: SyntaxKind) -> bool {
        self.contains(&kind)
    }

    fn expected_kinds(&self) -> Cow<'static, [SyntaxKind]> {
        self.to_vec().into()
    }
}

impl<const N: usize> Matcher for &'static [SyntaxKind; N] {
    fn matches(&self, kind: SyntaxKind) -> bool {
        self.contains(&kind)
    }

    fn expected_kinds(&self) -> Cow<'static, [SyntaxKind]> {
        let kinds: &'static [SyntaxKind] = *self;

        kinds.into()
    }
}

macro_rules! select {
    ($self:ident : { $( $matcher:expr => $arm:expr, )+ _ => @error $(,)? }) => ({
        select!($self: { $( $matcher => $arm, )+ _ => {
            let mut expected = Vec::new();
            $( expected.extend($matcher.expected_kinds().iter().copied()); )+

            return Err(ParserError::UnexpectedToken {
                expected: expected.into_iter().unique().collect::<Vec<_>>().into(),
                actual: $self.tokens.peek(0)?.clone(),
            });
        }})
    });

    ($self:ident : { $( $matcher:expr => $arm:expr, )+ _ => $default:expr $(,)? }) => ({
        match $self.peek_kind(0)? {
            $( kind if $matcher.matches(kind) => $arm, )+
            _ => $default,
        }
    });
}

/// Binary operator tokens paired with the node kinds they reduce to.
const RELATIONAL_OPS: [(SyntaxKind, SyntaxKind); 6] = [
    (SyntaxKind::LessEq, SyntaxKind::LessEqual),
    (SyntaxKind::Less, SyntaxKind::LessThan),
    (SyntaxKind::GreaterEq, SyntaxKind::GreaterEqual),
    (SyntaxKind::Greater, SyntaxKind::GreaterThan),
    (SyntaxKind::Eq, SyntaxKind::Equal),
    (SyntaxKind::LessGreater, SyntaxKind::NotEqual),
];

const ADDITIVE_OPS: [(SyntaxKind, SyntaxKind); 3] = [
    (SyntaxKind::Plus, SyntaxKind::Add),
    (SyntaxKind::Minus, SyntaxKind::Subtract),
    (SyntaxKind::OrKw, SyntaxKind::Or),
];

const MULTIPLICATIVE_OPS: [(SyntaxKind, SyntaxKind); 4] = [
    (SyntaxKind::Asterisk, SyntaxKind::Multiply),
    (SyntaxKind::Slash, SyntaxKind::Divide),
    (SyntaxKind::AndKw, SyntaxKind::And),
    (SyntaxKind::ModKw, SyntaxKind::Modulo),
];

/// The production a parse starts from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntryPoint {
    Program,
    Statement,
    Expression,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ParseStats {
    /// The largest distance the parser peeked ahead of the current token.
    pub max_lookahead: usize,
}

struct BoundedParser<'buf, 'a> {
    parser: &'a mut Parser<'buf>,
    prev_layer_start: Position,
}

impl Drop for BoundedParser<'_, '_> {
    fn drop(&mut self) {
        self.parser.recursion_limit += 1;
        self.parser.layer_start = self.prev_layer_start;
    }
}

impl<'buf> Deref for BoundedParser<'buf, '_> {
    type Target = Parser<'buf>;

    fn deref(&self) -> &Parser<'buf> {
        self.parser
    }
}

impl<'buf> DerefMut for BoundedParser<'buf, '_> {
    fn deref_mut(&mut self) -> &mut Parser<'buf> {
        self.parser
    }
}

/// A recursive-descent parser that assembles the tree on a shared construction stack.
///
/// Leaf steps push one node each; every production sums the item counts of its steps and hands
/// the total to [`build`](Self::build), which pops that many nodes as the children of a new tree.
/// Separators and keywords are matched but never pushed.
pub struct Parser<'buf> {
    tokens: Lookahead<'buf>,
    stack: Vec<SyntaxNode>,
    recursion_limit: usize,
    layer_start: Position,
}

impl<'buf> Parser<'buf> {
    pub fn new(lexer: Lexer<'buf>) -> Self {
        Self::with_lookahead(Lookahead::new(lexer))
    }

    pub fn with_lookahead(tokens: Lookahead<'buf>) -> Self {
        Self {
            tokens,
            stack: Vec::new(),
            recursion_limit: RECURSION_LIMIT,
            layer_start: Position::default(),
        }
    }

    pub fn parse(self) -> Result<SyntaxNode, ParserError> {
        self.parse_as(EntryPoint::Program)
    }

    pub fn parse_as(self, entry: EntryPoint) -> Result<SyntaxNode, ParserError> {
        self.parse_with_stats(entry).map(|(root, _)| root)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn parse_with_stats(
        mut self,
        entry: EntryPoint,
    ) -> Result<(SyntaxNode, ParseStats), ParserError> {
        let items = match entry {
            EntryPoint::Program => self.parse_tiny()?,
            EntryPoint::Statement => self.parse_statement()?,
            EntryPoint::Expression => self.parse_expression()?,
        };

        self.skip(SyntaxKind::EndOfFile)?;

        let count = self.stack.len();

        let root = match (items, self.stack.pop()) {
            (Items::ONE, Some(root)) if count == 1 => root,
            _ => return Err(InternalError::LeftoverItems { count }.into()),
        };

        let stats = ParseStats {
            max_lookahead: self.tokens.max_peek(),
        };

        Ok((root, stats))
    }

    fn bounded(&mut self) -> Result<BoundedParser<'buf, '_>, ParserError> {
        let Some(recursion_limit) = self.recursion_limit.checked_sub(1) else {
            return Err(ParserError::RecursionLimit(Span {
                start: self.layer_start,
                end: self.next_pos(),
            }));
        };

        self.recursion_limit = recursion_limit;

        let layer_start = self.next_pos();
        let prev_layer_start = mem::replace(&mut self.layer_start, layer_start);

        Ok(BoundedParser {
            parser: self,
            prev_layer_start,
        })
    }

    fn next_pos(&mut self) -> Position {
        match self.tokens.peek(0) {
            Ok(token) => token.span.start,

            // the error resurfaces on the next peek
            Err(_) => self.layer_start,
        }
    }

    fn peek_kind(&mut self, k: usize) -> Result<SyntaxKind, ParserError> {
        Ok(self.tokens.peek(k)?.kind)
    }

    #[instrument(
        level = "trace",
        ret,
        skip(self, matcher),
        fields(matcher = format_expected(&matcher.expected_kinds()))
    )]
    fn matches_nth(&mut self, n: usize, matcher: impl Matcher) -> Result<bool, ParserError> {
        let kind = self.peek_kind(n)?;
        trace!(?kind);

        Ok(matcher.matches(kind))
    }

    #[instrument(
        level = "trace",
        ret,
        skip(self, matcher),
        fields(matcher = format_expected(&matcher.expected_kinds()))
    )]
    fn expect(&mut self, matcher: impl Matcher) -> Result<Token, ParserError> {
        let token = self.tokens.peek(0)?;

        if matcher.matches(token.kind) {
            self.tokens.consume()
        } else {
            Err(ParserError::UnexpectedToken {
                expected: matcher.expected_kinds(),
                actual: token.clone(),
            })
        }
    }

    #[instrument(
        level = "trace",
        ret,
        skip(self, matcher),
        fields(matcher = format_expected(&matcher.expected_kinds()))
    )]
    fn try_consume(&mut self, matcher: impl Matcher) -> Result<Option<Token>, ParserError> {
        if self.matches_nth(0, matcher)? {
            self.tokens.consume().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Matches a token that does not enter the tree.
    fn skip(&mut self, matcher: impl Matcher) -> Result<(), ParserError> {
        self.expect(matcher).map(drop)
    }

    /// Matches a token and pushes it as a leaf.
    fn leaf(&mut self, matcher: impl Matcher) -> ParseResult {
        let token = self.expect(matcher)?;
        self.stack.push(Leaf::new(token).into());

        Ok(Items::ONE)
    }

    /// Consumes the next token if it is one of `ops`, returning the node kind it reduces to.
    fn try_consume_op(
        &mut self,
        ops: &[(SyntaxKind, SyntaxKind)],
    ) -> Result<Option<SyntaxKind>, ParserError> {
        let next = self.peek_kind(0)?;

        match ops.iter().find(|&&(token, _)| token == next) {
            Some(&(_, node)) => {
                self.tokens.consume()?;

                Ok(Some(node))
            }

            None => Ok(None),
        }
    }

    /// Pops `items` nodes off the construction stack and pushes them back as the children of a
    /// `kind` tree.
    fn build(&mut self, kind: SyntaxKind, items: Items) -> ParseResult {
        let Some(arity) = kind.arity() else {
            return Err(InternalError::NotANodeKind(kind).into());
        };

        let available = self.stack.len();

        if items.0 > available {
            return Err(InternalError::StackUnderflow {
                kind,
                requested: items.0,
                available,
            }
            .into());
        }

        if !arity.admits(items.0) {
            return Err(InternalError::ArityMismatch {
                kind,
                arity,
                actual: items.0,
            }
            .into());
        }

        let children = self.stack.split_off(available - items.0);
        trace!(%kind, children = children.len(), depth = available - items.0, "reduced");
        self.stack.push(Tree::new(kind, children).into());

        Ok(Items::ONE)
    }

    /// Parses one or more `element`s separated by `separator` and closed by `terminator`.
    fn parse_list<F>(
        &mut self,
        separator: SyntaxKind,
        terminator: SyntaxKind,
        mut element: F,
    ) -> ParseResult
    where
        F: FnMut(&mut Self) -> ParseResult,
    {
        let mut items = element(&mut *self.bounded()?)?;

        while self.try_consume(separator)?.is_some() {
            items += element(&mut *self.bounded()?)?;
        }

        // another separator would have been accepted here too
        self.skip([separator, terminator])?;

        Ok(items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_tiny(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ProgramKw)?;
        let mut items = self.parse_name()?;
        self.skip(SyntaxKind::Colon)?;
        items += self.bounded()?.parse_consts()?;
        items += self.bounded()?.parse_types()?;
        items += self.bounded()?.parse_dclns()?;
        items += self.bounded()?.parse_subprogs()?;
        items += self.bounded()?.parse_body()?;
        items += self.parse_name()?;
        self.skip(SyntaxKind::Dot)?;

        self.build(SyntaxKind::Program, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_name(&mut self) -> ParseResult {
        self.leaf(SyntaxKind::Identifier)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_consts(&mut self) -> ParseResult {
        let mut items = Items::NONE;

        if self.try_consume(SyntaxKind::ConstKw)?.is_some() {
            items += self.parse_list(SyntaxKind::Comma, SyntaxKind::Semicolon, Self::parse_const)?;
        }

        self.build(SyntaxKind::Consts, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_const(&mut self) -> ParseResult {
        let mut items = self.parse_name()?;
        self.skip(SyntaxKind::Eq)?;
        items += self.parse_const_value()?;

        self.build(SyntaxKind::Const, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_const_value(&mut self) -> ParseResult {
        select!(self: {
            SyntaxKind::Integer => self.leaf(SyntaxKind::Integer),
            SyntaxKind::Char => self.leaf(SyntaxKind::Char),
            SyntaxKind::Identifier => self.parse_name(),
            _ => @error,
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_types(&mut self) -> ParseResult {
        let mut items = Items::NONE;

        if self.try_consume(SyntaxKind::TypeKw)?.is_some() {
            loop {
                items += self.bounded()?.parse_type()?;
                self.skip(SyntaxKind::Semicolon)?;

                if !self.matches_nth(0, SyntaxKind::Identifier)? {
                    break;
                }
            }
        }

        self.build(SyntaxKind::Types, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_type(&mut self) -> ParseResult {
        let mut items = self.parse_name()?;
        self.skip(SyntaxKind::Eq)?;
        items += self.bounded()?.parse_lit_list()?;

        self.build(SyntaxKind::Type, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_lit_list(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ParenLeft)?;
        let items = self.parse_list(SyntaxKind::Comma, SyntaxKind::ParenRight, Self::parse_name)?;

        self.build(SyntaxKind::Lit, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_subprogs(&mut self) -> ParseResult {
        let mut items = Items::NONE;

        while self.matches_nth(0, SyntaxKind::FunctionKw)? {
            items += self.bounded()?.parse_fcn()?;
        }

        self.build(SyntaxKind::Subprogs, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_fcn(&mut self) -> ParseResult {
        self.skip(SyntaxKind::FunctionKw)?;
        let mut items = self.parse_name()?;
        self.skip(SyntaxKind::ParenLeft)?;
        items += self.bounded()?.parse_params()?;
        self.skip(SyntaxKind::Colon)?;
        items += self.parse_name()?;
        self.skip(SyntaxKind::Semicolon)?;
        items += self.bounded()?.parse_consts()?;
        items += self.bounded()?.parse_types()?;
        items += self.bounded()?.parse_dclns()?;
        items += self.bounded()?.parse_body()?;
        items += self.parse_name()?;
        self.skip(SyntaxKind::Semicolon)?;

        self.build(SyntaxKind::Fcn, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_params(&mut self) -> ParseResult {
        let items =
            self.parse_list(SyntaxKind::Semicolon, SyntaxKind::ParenRight, Self::parse_dcln)?;

        self.build(SyntaxKind::Params, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_dclns(&mut self) -> ParseResult {
        let mut items = Items::NONE;

        if self.try_consume(SyntaxKind::VarKw)?.is_some() {
            loop {
                items += self.bounded()?.parse_dcln()?;
                self.skip(SyntaxKind::Semicolon)?;

                if !self.matches_nth(0, SyntaxKind::Identifier)? {
                    break;
                }
            }
        }

        self.build(SyntaxKind::Dclns, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_dcln(&mut self) -> ParseResult {
        let mut items = self.parse_list(SyntaxKind::Comma, SyntaxKind::Colon, Self::parse_name)?;
        items += self.parse_name()?;

        self.build(SyntaxKind::Var, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_body(&mut self) -> ParseResult {
        self.skip(SyntaxKind::BeginKw)?;
        let items = self.parse_statement_list(SyntaxKind::EndKw)?;

        self.build(SyntaxKind::Block, items)
    }

    /// Parses `Statement list ';'` up to and including its `terminator`. The list is empty if it
    /// starts with the terminator.
    fn parse_statement_list(&mut self, terminator: SyntaxKind) -> ParseResult {
        if self.try_consume(terminator)?.is_some() {
            return Ok(Items::NONE);
        }

        self.parse_list(SyntaxKind::Semicolon, terminator, Self::parse_statement)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_statement(&mut self) -> ParseResult {
        if self.matches_nth(0, SyntaxKind::Identifier)?
            && self.matches_nth(1, &[SyntaxKind::ColonEq, SyntaxKind::ColonEqColon])?
        {
            return self.bounded()?.parse_assignment();
        }

        select!(self: {
            SyntaxKind::OutputKw => self.bounded()?.parse_output(),
            SyntaxKind::IfKw => self.bounded()?.parse_if(),
            SyntaxKind::WhileKw => self.bounded()?.parse_while(),
            SyntaxKind::RepeatKw => self.bounded()?.parse_repeat(),
            SyntaxKind::ForKw => self.bounded()?.parse_for(),
            SyntaxKind::LoopKw => self.bounded()?.parse_loop(),
            SyntaxKind::CaseKw => self.bounded()?.parse_case(),
            SyntaxKind::ReadKw => self.bounded()?.parse_read(),
            SyntaxKind::ExitKw => self.bounded()?.parse_exit(),
            SyntaxKind::ReturnKw => self.bounded()?.parse_return(),
            SyntaxKind::BeginKw => self.bounded()?.parse_body(),
            _ => self.build(SyntaxKind::Null, Items::NONE),
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_assignment(&mut self) -> ParseResult {
        let mut items = self.parse_name()?;

        select!(self: {
            SyntaxKind::ColonEq => {
                self.skip(SyntaxKind::ColonEq)?;
                items += self.bounded()?.parse_expression()?;

                self.build(SyntaxKind::Assign, items)
            },

            SyntaxKind::ColonEqColon => {
                self.skip(SyntaxKind::ColonEqColon)?;
                items += self.parse_name()?;

                self.build(SyntaxKind::Swap, items)
            },

            _ => @error,
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_output(&mut self) -> ParseResult {
        self.skip(SyntaxKind::OutputKw)?;
        self.skip(SyntaxKind::ParenLeft)?;
        let items =
            self.parse_list(SyntaxKind::Comma, SyntaxKind::ParenRight, Self::parse_out_exp)?;

        self.build(SyntaxKind::Output, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_out_exp(&mut self) -> ParseResult {
        select!(self: {
            SyntaxKind::String => {
                let items = self.leaf(SyntaxKind::String)?;

                self.build(SyntaxKind::OutString, items)
            },

            _ => {
                let items = self.bounded()?.parse_expression()?;

                self.build(SyntaxKind::OutInteger, items)
            },
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_if(&mut self) -> ParseResult {
        self.skip(SyntaxKind::IfKw)?;
        let mut items = self.bounded()?.parse_expression()?;
        self.skip(SyntaxKind::ThenKw)?;
        items += self.bounded()?.parse_statement()?;

        if self.try_consume(SyntaxKind::ElseKw)?.is_some() {
            items += self.bounded()?.parse_statement()?;
        }

        self.build(SyntaxKind::If, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_while(&mut self) -> ParseResult {
        self.skip(SyntaxKind::WhileKw)?;
        let mut items = self.bounded()?.parse_expression()?;
        self.skip(SyntaxKind::DoKw)?;
        items += self.bounded()?.parse_statement()?;

        self.build(SyntaxKind::While, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_repeat(&mut self) -> ParseResult {
        self.skip(SyntaxKind::RepeatKw)?;
        let mut items = self.parse_statement_list(SyntaxKind::UntilKw)?;
        items += self.bounded()?.parse_expression()?;

        self.build(SyntaxKind::Repeat, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_for(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ForKw)?;
        self.skip(SyntaxKind::ParenLeft)?;
        let mut items = self.bounded()?.parse_for_stat()?;
        self.skip(SyntaxKind::Semicolon)?;
        items += self.bounded()?.parse_for_exp()?;
        self.skip(SyntaxKind::Semicolon)?;
        items += self.bounded()?.parse_for_stat()?;
        self.skip(SyntaxKind::ParenRight)?;
        items += self.bounded()?.parse_statement()?;

        self.build(SyntaxKind::For, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_for_stat(&mut self) -> ParseResult {
        select!(self: {
            SyntaxKind::Identifier => self.bounded()?.parse_assignment(),
            _ => self.build(SyntaxKind::Null, Items::NONE),
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_for_exp(&mut self) -> ParseResult {
        select!(self: {
            SyntaxKind::Semicolon => self.build(SyntaxKind::True, Items::NONE),
            _ => self.bounded()?.parse_expression(),
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_loop(&mut self) -> ParseResult {
        self.skip(SyntaxKind::LoopKw)?;
        let items = self.parse_statement_list(SyntaxKind::PoolKw)?;

        self.build(SyntaxKind::Loop, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_case(&mut self) -> ParseResult {
        self.skip(SyntaxKind::CaseKw)?;
        let mut items = self.bounded()?.parse_expression()?;
        self.skip(SyntaxKind::OfKw)?;

        loop {
            items += self.bounded()?.parse_case_clause()?;
            self.skip(SyntaxKind::Semicolon)?;

            if self.matches_nth(0, &[SyntaxKind::OtherwiseKw, SyntaxKind::EndKw])? {
                break;
            }
        }

        items += self.bounded()?.parse_otherwise_clause()?;
        self.skip(SyntaxKind::EndKw)?;

        self.build(SyntaxKind::Case, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_case_clause(&mut self) -> ParseResult {
        let mut items =
            self.parse_list(SyntaxKind::Comma, SyntaxKind::Colon, Self::parse_case_expression)?;
        items += self.bounded()?.parse_statement()?;

        self.build(SyntaxKind::CaseClause, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_case_expression(&mut self) -> ParseResult {
        let mut items = self.parse_const_value()?;

        if self.try_consume(SyntaxKind::DotDot)?.is_some() {
            items += self.parse_const_value()?;

            return self.build(SyntaxKind::Range, items);
        }

        Ok(items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_otherwise_clause(&mut self) -> ParseResult {
        if self.try_consume(SyntaxKind::OtherwiseKw)?.is_none() {
            return Ok(Items::NONE);
        }

        let items = self.bounded()?.parse_statement()?;

        self.build(SyntaxKind::Otherwise, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_read(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ReadKw)?;
        self.skip(SyntaxKind::ParenLeft)?;
        let items = self.parse_list(SyntaxKind::Comma, SyntaxKind::ParenRight, Self::parse_name)?;

        self.build(SyntaxKind::Read, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_exit(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ExitKw)?;

        self.build(SyntaxKind::Exit, Items::NONE)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_return(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ReturnKw)?;
        let items = self.bounded()?.parse_expression()?;

        self.build(SyntaxKind::Return, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expression(&mut self) -> ParseResult {
        let mut items = self.bounded()?.parse_term()?;

        if let Some(kind) = self.try_consume_op(&RELATIONAL_OPS)? {
            items += self.bounded()?.parse_term()?;

            return self.build(kind, items);
        }

        Ok(items)
    }

    #[inline(always)]
    fn parse_bin_op_lassoc<D>(
        &mut self,
        ops: &[(SyntaxKind, SyntaxKind)],
        mut descend: D,
    ) -> ParseResult
    where
        D: FnMut(&mut Self) -> ParseResult,
    {
        let mut items = descend(&mut *self.bounded()?)?;

        while let Some(kind) = self.try_consume_op(ops)? {
            items += descend(&mut *self.bounded()?)?;
            items = self.build(kind, items)?;
        }

        Ok(items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_term(&mut self) -> ParseResult {
        self.parse_bin_op_lassoc(&ADDITIVE_OPS, Self::parse_factor)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_factor(&mut self) -> ParseResult {
        self.parse_bin_op_lassoc(&MULTIPLICATIVE_OPS, Self::parse_primary)
    }

    #[inline(always)]
    fn parse_un_op(&mut self, op: SyntaxKind, kind: SyntaxKind) -> ParseResult {
        self.skip(op)?;
        let items = self.bounded()?.parse_primary()?;

        self.build(kind, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_primary(&mut self) -> ParseResult {
        select!(self: {
            SyntaxKind::Minus => self.parse_un_op(SyntaxKind::Minus, SyntaxKind::Negate),
            SyntaxKind::NotKw => self.parse_un_op(SyntaxKind::NotKw, SyntaxKind::Not),

            SyntaxKind::Plus => {
                self.skip(SyntaxKind::Plus)?;

                self.bounded()?.parse_primary()
            },

            SyntaxKind::EofKw => {
                self.skip(SyntaxKind::EofKw)?;

                self.build(SyntaxKind::Eof, Items::NONE)
            },

            SyntaxKind::Identifier => self.bounded()?.parse_name_or_call(),
            SyntaxKind::Integer => self.leaf(SyntaxKind::Integer),
            SyntaxKind::Char => self.leaf(SyntaxKind::Char),
            SyntaxKind::ParenLeft => self.bounded()?.parse_paren(),

            SyntaxKind::SuccKw => self.bounded()?.parse_intrinsic(SyntaxKind::SuccKw, SyntaxKind::Succ),
            SyntaxKind::PredKw => self.bounded()?.parse_intrinsic(SyntaxKind::PredKw, SyntaxKind::Pred),
            SyntaxKind::ChrKw => self.bounded()?.parse_intrinsic(SyntaxKind::ChrKw, SyntaxKind::Chr),
            SyntaxKind::OrdKw => self.bounded()?.parse_intrinsic(SyntaxKind::OrdKw, SyntaxKind::Ord),

            _ => @error,
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_name_or_call(&mut self) -> ParseResult {
        if !self.matches_nth(1, SyntaxKind::ParenLeft)? {
            return self.parse_name();
        }

        let mut items = self.parse_name()?;
        self.skip(SyntaxKind::ParenLeft)?;
        items +=
            self.parse_list(SyntaxKind::Comma, SyntaxKind::ParenRight, Self::parse_expression)?;

        self.build(SyntaxKind::Call, items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_paren(&mut self) -> ParseResult {
        self.skip(SyntaxKind::ParenLeft)?;
        let items = self.bounded()?.parse_expression()?;
        self.skip(SyntaxKind::ParenRight)?;

        Ok(items)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_intrinsic(&mut self, keyword: SyntaxKind, kind: SyntaxKind) -> ParseResult {
        self.skip(keyword)?;
        self.skip(SyntaxKind::ParenLeft)?;
        let items = self.bounded()?.parse_expression()?;
        self.skip(SyntaxKind::ParenRight)?;

        self.build(kind, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::cursor::Cursor;

    fn parser(text: &str) -> Parser<'_> {
        Parser::new(Lexer::new(Cursor::new(text)))
    }

    #[test]
    fn test_build_checks_arity() {
        let mut parser = parser("a");
        let items = parser.leaf(SyntaxKind::Identifier).unwrap();

        let error = parser.build(SyntaxKind::If, items).unwrap_err();

        assert_eq!(
            error,
            ParserError::Internal(InternalError::ArityMismatch {
                kind: SyntaxKind::If,
                arity: Arity::Between(2, 3),
                actual: 1,
            })
        );
        assert_eq!(error.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_build_checks_stack_depth() {
        let mut parser = parser("x 1");
        let items = parser.leaf(SyntaxKind::Identifier).unwrap()
            + parser.leaf(SyntaxKind::Integer).unwrap();
        assert_eq!(items, Items(2));

        let error = parser.build(SyntaxKind::Assign, Items(5)).unwrap_err();

        assert_eq!(
            error,
            ParserError::Internal(InternalError::StackUnderflow {
                kind: SyntaxKind::Assign,
                requested: 5,
                available: 2,
            })
        );

        // nothing is popped on failure
        assert_eq!(parser.stack.len(), 2);
    }

    #[test]
    fn test_build_rejects_token_kinds() {
        let mut parser = parser("");

        let error = parser.build(SyntaxKind::Plus, Items::NONE).unwrap_err();

        assert_eq!(
            error,
            ParserError::Internal(InternalError::NotANodeKind(SyntaxKind::Plus))
        );
        assert!(error.location().is_none());
    }

    #[test]
    fn test_leftover_items_are_internal() {
        let stray = Lexer::new(Cursor::new("y")).next_token().unwrap();

        let mut parser = parser("x := 1");
        parser.stack.push(Leaf::new(stray).into());

        let error = parser.parse_with_stats(EntryPoint::Statement).unwrap_err();

        assert_eq!(
            error,
            ParserError::Internal(InternalError::LeftoverItems { count: 2 })
        );
        assert_eq!(error.category(), ErrorCategory::Internal);
        assert!(error.location().is_none());
    }

    #[test]
    fn test_list_error_mentions_the_separator() {
        let mut parser = parser("a, b c");

        let error = parser
            .parse_list(SyntaxKind::Comma, SyntaxKind::Colon, Parser::parse_name)
            .unwrap_err();

        let ParserError::UnexpectedToken { expected, actual } = error else {
            panic!("expected a syntax error");
        };

        assert_eq!(&*expected, &[SyntaxKind::Comma, SyntaxKind::Colon]);
        assert_eq!(actual.text, "c");
    }
}
