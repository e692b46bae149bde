//! Tokens of the Python subset.
//!
//! The lexer recognizes more of Python than the transpiler lowers: keywords
//! such as `class`, `try` or `lambda` still get their own kind so the parser
//! can build the construct and the code generator can name it when it
//! refuses it. Operators with no meaning on a 16-bit target that the parser
//! would only reject (`:=`, `@=`) are not tokens at all and surface as
//! syntax errors.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

impl Token {
    pub fn new(kind: TokenKind, span: TextRange) -> Self {
        Token { kind, span }
    }

    pub fn start(&self) -> TextSize {
        self.span.start()
    }

    pub fn end(&self) -> TextSize {
        self.span.end()
    }
}

/// Defines [`TokenKind`] as the lexed kinds plus the layout kinds the
/// indentation pass inserts, and the conversion from [`LogosToken`].
macro_rules! token_kinds {
    (lexed: [$($lexed:ident),* $(,)?], layout: [$($layout:ident),* $(,)?] $(,)?) => {
        /// Kind of a token seen by the parser.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum TokenKind {
            $($lexed,)*
            $($layout,)*
        }

        impl From<LogosToken> for TokenKind {
            fn from(token: LogosToken) -> TokenKind {
                match token {
                    $(LogosToken::$lexed => TokenKind::$lexed,)*
                }
            }
        }
    };
}

token_kinds! {
    lexed: [
        None, True, False,
        If, Elif, Else, While, For, In, Def, Return, Pass, Break, Continue,
        Import, From, As, Global, Nonlocal, And, Or, Not, Is,
        Class, With, Try, Except, Finally, Raise, Assert, Del, Yield, Lambda, Async, Await,
        Ident, Number, String, RawString, FString,
        Plus, Minus, Star, Slash, DoubleSlash, Percent, DoubleStar, Equal,
        EqualEqual, NotEqual, Less, LessEqual, Greater, GreaterEqual,
        Ampersand, Pipe, Caret, Tilde, LeftShift, RightShift,
        PlusEqual, MinusEqual, StarEqual, SlashEqual, DoubleSlashEqual, PercentEqual,
        DoubleStarEqual, AmpersandEqual, PipeEqual, CaretEqual, RightShiftEqual, LeftShiftEqual,
        LeftParen, RightParen, LeftBracket, RightBracket, LeftBrace, RightBrace,
        Comma, Colon, Semicolon, Dot, Ellipsis, Arrow, At,
        Newline, Comment,
    ],
    layout: [Indent, Dedent, Eof],
}

impl TokenKind {
    /// Binary operator an augmented assignment token applies, if any.
    pub fn aug_assign_op(self) -> Option<&'static str> {
        let op = match self {
            TokenKind::PlusEqual => "+",
            TokenKind::MinusEqual => "-",
            TokenKind::StarEqual => "*",
            TokenKind::SlashEqual => "/",
            TokenKind::DoubleSlashEqual => "//",
            TokenKind::PercentEqual => "%",
            TokenKind::DoubleStarEqual => "**",
            TokenKind::AmpersandEqual => "&",
            TokenKind::PipeEqual => "|",
            TokenKind::CaretEqual => "^",
            TokenKind::LeftShiftEqual => "<<",
            TokenKind::RightShiftEqual => ">>",
            _ => return None,
        };
        Some(op)
    }

    /// Change of bracket depth. Inside brackets, line breaks and
    /// indentation are ignored.
    pub fn bracket_delta(self) -> i64 {
        match self {
            TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => 1,
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => -1,
            _ => 0,
        }
    }
}

/// Raw lexer output for one line. Carriage returns and form feeds count as
/// blanks so Windows line endings need no preprocessing.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum LogosToken {
    #[token("None")]
    None,
    #[token("True")]
    True,
    #[token("False")]
    False,

    // Statements the transpiler lowers
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("def")]
    Def,
    #[token("return")]
    Return,
    #[token("pass")]
    Pass,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("global")]
    Global,
    #[token("nonlocal")]
    Nonlocal,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("is")]
    Is,

    // Parsed so that refusing them can name the construct
    #[token("class")]
    Class,
    #[token("with")]
    With,
    #[token("try")]
    Try,
    #[token("except")]
    Except,
    #[token("finally")]
    Finally,
    #[token("raise")]
    Raise,
    #[token("assert")]
    Assert,
    #[token("del")]
    Del,
    #[token("yield")]
    Yield,
    #[token("lambda")]
    Lambda,
    #[token("async")]
    Async,
    #[token("await")]
    Await,

    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*")]
    Ident,

    // Floats and exponents are lexed whole so they can be refused as
    // floating-point literals rather than as a stray dot.
    #[regex(r"0[bB][01](_?[01])*|0[oO][0-7](_?[0-7])*|0[xX][0-9a-fA-F](_?[0-9a-fA-F])*|[0-9](_?[0-9])*(\.[0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?")]
    Number,

    // Raw strings before plain ones so the prefix is not an identifier
    #[regex(r#"[rR]"[^"\n]*"|[rR]'[^'\n]*'"#)]
    RawString,

    #[regex(r#""(?:[^"\n\\]|\\.)*"|'(?:[^'\n\\]|\\.)*'"#)]
    String,

    #[regex(r#"[fF][rR]?"(?:[^"\n\\]|\\.)*"|[fF][rR]?'(?:[^'\n\\]|\\.)*'|[rR][fF]"[^"\n]*"|[rR][fF]'[^'\n]*'"#)]
    FString,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("**")]
    DoubleStar,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,

    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("//=")]
    DoubleSlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("**=")]
    DoubleStarEqual,
    #[token("&=")]
    AmpersandEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token(">>=")]
    RightShiftEqual,
    #[token("<<=")]
    LeftShiftEqual,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    /// `...` as an inert statement body.
    #[token("...")]
    Ellipsis,
    /// Return annotations are parsed and ignored.
    #[token("->")]
    Arrow,
    /// Only `@onevent` and other decorators; matrix product is refused.
    #[token("@")]
    At,

    #[token("\n")]
    Newline,

    #[regex(r"#[^\n]*")]
    Comment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        LogosToken::lexer(source)
            .map(|token| token.map(TokenKind::from).unwrap_or(TokenKind::Eof))
            .collect()
    }

    #[test]
    fn handler_header() {
        assert_eq!(
            kinds("@onevent\ndef timer0():"),
            vec![
                TokenKind::At,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Def,
                TokenKind::Ident,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn augmented_operators() {
        assert_eq!(kinds("x //= 2"), vec![TokenKind::Ident, TokenKind::DoubleSlashEqual, TokenKind::Number]);
        assert_eq!(TokenKind::DoubleSlashEqual.aug_assign_op(), Some("//"));
        assert_eq!(TokenKind::Equal.aug_assign_op(), None);
    }

    #[test]
    fn walrus_is_not_a_token() {
        assert_eq!(kinds("a := 1"), vec![TokenKind::Ident, TokenKind::Colon, TokenKind::Equal, TokenKind::Number]);
    }
}
