use std::fmt::{self, Display};

use phf::phf_map;
use serde::Serialize;

/// Invokes `$callback!` with the complete list of syntax kinds.
///
/// Every table derived from the kind list (the enum itself, the keyword map, node arities, the
/// visitor traits) is generated by a callback, so adding a kind here updates all of them.
macro_rules! syntax_kind_table {
    ($callback:ident) => {
        $callback! {
            keywords {
                ProgramKw = "program",
                VarKw = "var",
                ConstKw = "const",
                TypeKw = "type",
                FunctionKw = "function",
                ReturnKw = "return",
                BeginKw = "begin",
                EndKw = "end",
                OutputKw = "output",
                IfKw = "if",
                ThenKw = "then",
                ElseKw = "else",
                WhileKw = "while",
                DoKw = "do",
                CaseKw = "case",
                OfKw = "of",
                OtherwiseKw = "otherwise",
                RepeatKw = "repeat",
                ForKw = "for",
                UntilKw = "until",
                LoopKw = "loop",
                PoolKw = "pool",
                ExitKw = "exit",
                ModKw = "mod",
                AndKw = "and",
                OrKw = "or",
                NotKw = "not",
                ReadKw = "read",
                SuccKw = "succ",
                PredKw = "pred",
                ChrKw = "chr",
                OrdKw = "ord",
                EofKw = "eof",
            }

            punctuation {
                ColonEqColon = ":=:",
                ColonEq = ":=",
                LessEq = "<=",
                LessGreater = "<>",
                Less = "<",
                GreaterEq = ">=",
                Greater = ">",
                Plus = "+",
                Minus = "-",
                Asterisk = "*",
                Slash = "/",
                Eq = "=",
                ParenLeft = "(",
                ParenRight = ")",
                Semicolon = ";",
                DotDot = "..",
                Dot = ".",
                Colon = ":",
                Comma = ",",
            }

            literals {
                Identifier = "<identifier>",
                Integer = "<integer>",
                Char = "<char>",
                String = "<string>",
                EndOfFile = "<eof>",
            }

            trivia {
                Whitespace = "<whitespace>",
                EndOfLine = "<eol>",
                LineComment = "<comment>",
                BlockComment = "<block-comment>",
            }

            nodes {
                Program("program", Arity::Exact(7)) => visit_program,
                Consts("consts", Arity::AtLeast(0)) => visit_consts,
                Const("const", Arity::Exact(2)) => visit_const,
                Types("types", Arity::AtLeast(0)) => visit_types,
                Type("type", Arity::Exact(2)) => visit_type,
                Lit("lit", Arity::AtLeast(1)) => visit_lit,
                Subprogs("subprogs", Arity::AtLeast(0)) => visit_subprogs,
                Fcn("fcn", Arity::Exact(8)) => visit_fcn,
                Params("params", Arity::AtLeast(1)) => visit_params,
                Dclns("dclns", Arity::AtLeast(0)) => visit_dclns,
                Var("var", Arity::AtLeast(2)) => visit_var,
                Block("block", Arity::AtLeast(0)) => visit_block,

                // statements
                Output("output", Arity::AtLeast(1)) => visit_output,
                OutInteger("integer", Arity::Exact(1)) => visit_out_integer,
                OutString("string", Arity::Exact(1)) => visit_out_string,
                If("if", Arity::Between(2, 3)) => visit_if,
                While("while", Arity::Exact(2)) => visit_while,
                Repeat("repeat", Arity::AtLeast(1)) => visit_repeat,
                For("for", Arity::Exact(4)) => visit_for,
                Loop("loop", Arity::AtLeast(0)) => visit_loop,
                Case("case", Arity::AtLeast(2)) => visit_case,
                CaseClause("case_clause", Arity::AtLeast(2)) => visit_case_clause,
                Range("..", Arity::Exact(2)) => visit_range,
                Otherwise("otherwise", Arity::Exact(1)) => visit_otherwise,
                Read("read", Arity::AtLeast(1)) => visit_read,
                Exit("exit", Arity::Exact(0)) => visit_exit,
                Return("return", Arity::Exact(1)) => visit_return,
                Null("<null>", Arity::Exact(0)) => visit_null,
                Assign("assign", Arity::Exact(2)) => visit_assign,
                Swap("swap", Arity::Exact(2)) => visit_swap,
                True("true", Arity::Exact(0)) => visit_true,

                // expressions
                LessEqual("<=", Arity::Exact(2)) => visit_less_equal,
                LessThan("<", Arity::Exact(2)) => visit_less_than,
                GreaterEqual(">=", Arity::Exact(2)) => visit_greater_equal,
                GreaterThan(">", Arity::Exact(2)) => visit_greater_than,
                Equal("=", Arity::Exact(2)) => visit_equal,
                NotEqual("<>", Arity::Exact(2)) => visit_not_equal,
                Add("+", Arity::Exact(2)) => visit_add,
                Subtract("-", Arity::Exact(2)) => visit_subtract,
                Or("or", Arity::Exact(2)) => visit_or,
                Multiply("*", Arity::Exact(2)) => visit_multiply,
                Divide("/", Arity::Exact(2)) => visit_divide,
                And("and", Arity::Exact(2)) => visit_and,
                Modulo("mod", Arity::Exact(2)) => visit_modulo,
                Negate("-", Arity::Exact(1)) => visit_negate,
                Not("not", Arity::Exact(1)) => visit_not,
                Eof("eof", Arity::Exact(0)) => visit_eof,
                Call("call", Arity::AtLeast(2)) => visit_call,
                Succ("succ", Arity::Exact(1)) => visit_succ,
                Pred("pred", Arity::Exact(1)) => visit_pred,
                Chr("chr", Arity::Exact(1)) => visit_chr,
                Ord("ord", Arity::Exact(1)) => visit_ord,
            }
        }
    };
}

/// The number of children a node kind admits.
#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::Between(min, max) => (min..=max).contains(&count),
            Self::AtLeast(min) => count >= min,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {}", n),
            Self::Between(min, max) => write!(f, "{} to {}", min, max),
            Self::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

macro_rules! define_syntax_kinds {
    (
        keywords { $( $kw:ident = $kw_lit:literal, )+ }
        punctuation { $( $punct:ident = $punct_lit:literal, )+ }
        literals { $( $lit_kind:ident = $lit_name:literal, )+ }
        trivia { $( $trivia:ident = $trivia_name:literal, )+ }
        nodes { $( $node:ident ( $node_name:literal, $arity:expr ) => $visit:ident, )+ }
    ) => {
        #[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
        pub enum SyntaxKind {
            $( $kw, )+
            $( $punct, )+
            $( $lit_kind, )+
            $( $trivia, )+
            $( $node, )+
        }

        static KEYWORDS: phf::Map<&'static str, SyntaxKind> = phf_map! {
            $( $kw_lit => SyntaxKind::$kw ),+
        };

        impl SyntaxKind {
            /// Looks up the keyword spelled exactly as `text`.
            pub fn keyword(text: &str) -> Option<SyntaxKind> {
                KEYWORDS.get(text).copied()
            }

            /// The fixed spelling of a keyword or punctuation token.
            pub fn lexeme(self) -> Option<&'static str> {
                match self {
                    $( Self::$kw => Some($kw_lit), )+
                    $( Self::$punct => Some($punct_lit), )+
                    _ => None,
                }
            }

            /// The label of the kind: the lexeme for fixed tokens, a `<placeholder>` for literal
            /// and trivia kinds, and the tree label for node kinds.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$kw => $kw_lit, )+
                    $( Self::$punct => $punct_lit, )+
                    $( Self::$lit_kind => $lit_name, )+
                    $( Self::$trivia => $trivia_name, )+
                    $( Self::$node => $node_name, )+
                }
            }

            pub fn is_keyword(self) -> bool {
                matches!(self, $( Self::$kw )|+)
            }

            pub fn is_punctuation(self) -> bool {
                matches!(self, $( Self::$punct )|+)
            }

            pub fn is_literal(self) -> bool {
                matches!(self, $( Self::$lit_kind )|+)
            }

            pub fn is_trivia(self) -> bool {
                matches!(self, $( Self::$trivia )|+)
            }

            pub fn is_node(self) -> bool {
                matches!(self, $( Self::$node )|+)
            }

            /// The number of children the grammar declares for a node kind.
            pub fn arity(self) -> Option<Arity> {
                match self {
                    $( Self::$node => Some($arity), )+
                    _ => None,
                }
            }
        }
    };
}

syntax_kind_table!(define_syntax_kinds);

impl Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
