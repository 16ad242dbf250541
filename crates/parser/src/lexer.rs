use crate::ast::{CommentKind, Span};
use crate::error::{Diag, LexError, LexErrorKind};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Shared helpers
// =============================================================================

#[inline(always)]
const fn first_newline_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return Some(i);
        }
        i += 1;
    }

    None
}

#[inline(always)]
pub const fn is_dec_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline(always)]
pub const fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

// =============================================================================
// 1. Comment scanners (manual; memchr)
// =============================================================================

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr::memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

#[inline]
fn lex_line_comment(lex: &mut LogosLexer<'_, RawTok>) {
    let rem = lex.remainder().as_bytes();
    let len = memchr::memchr2(b'\n', b'\r', rem).unwrap_or(rem.len());
    lex.bump(len);
}

// =============================================================================
// 2. Numbers: maximal munch + classification
// =============================================================================

mod num {
    use super::*;

    /// Validates a numeric literal (without the imaginary suffix).
    ///
    /// Returns `Ok(true)` for floating-point literals, `Ok(false)` for integers.
    pub fn classify_number(lit: &[u8]) -> Result<bool, LexErrorKind> {
        let bad = Err(LexErrorKind::InvalidNumber);
        if lit.is_empty() {
            return bad;
        }

        let (base, digits) = match lit {
            [b'0', b'x' | b'X', rest @ ..] => (16u32, rest),
            [b'0', b'o' | b'O', rest @ ..] => (8, rest),
            [b'0', b'b' | b'B', rest @ ..] => (2, rest),
            _ => (10, lit),
        };
        let prefixed = base != 10;

        let exp_marker = if base == 16 { b'p' } else { b'e' };
        let (mantissa, exponent) = match digits
            .iter()
            .position(|&b| b.to_ascii_lowercase() == exp_marker)
        {
            Some(i) => (&digits[..i], Some(&digits[i + 1..])),
            None => (digits, None),
        };
        if exponent.is_some() && !matches!(base, 10 | 16) {
            return bad;
        }

        let (int_part, frac_part) = match mantissa.iter().position(|&b| b == b'.') {
            Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
            None => (mantissa, None),
        };
        let is_float = frac_part.is_some() || exponent.is_some();
        if is_float && !matches!(base, 10 | 16) {
            return bad;
        }
        // Hex floats need a 'p' exponent.
        if base == 16 && frac_part.is_some() && exponent.is_none() {
            return bad;
        }

        let digit_ok = |b: u8| match base {
            2 => matches!(b, b'0' | b'1'),
            8 => (b'0'..=b'7').contains(&b),
            10 => is_dec_digit(b),
            _ => is_hex_digit(b),
        };

        if !digits_ok(int_part, digit_ok, prefixed) {
            return bad;
        }
        if let Some(frac) = frac_part {
            if !frac.is_empty() && !digits_ok(frac, digit_ok, false) {
                return bad;
            }
            if int_part.is_empty() && frac.is_empty() {
                return bad;
            }
        } else if int_part.is_empty() {
            return bad;
        }

        if let Some(exp) = exponent {
            let exp = match exp {
                [b'+' | b'-', rest @ ..] => rest,
                _ => exp,
            };
            if exp.is_empty() || !digits_ok(exp, is_dec_digit, false) {
                return bad;
            }
        }

        // Legacy octal: "0777" is an integer and must only use octal digits.
        if base == 10 && !is_float && int_part.len() > 1 && int_part[0] == b'0' {
            let octal = int_part.iter().all(|&b| b == b'_' || (b'0'..=b'7').contains(&b));
            if !octal {
                return bad;
            }
        }

        Ok(is_float)
    }

    /// Digits with single underscores between digits (or right after a base prefix).
    fn digits_ok(bytes: &[u8], digit_ok: impl Fn(u8) -> bool, after_prefix: bool) -> bool {
        let mut prev_digit = after_prefix;
        let mut any = false;
        for &b in bytes {
            if b == b'_' {
                if !prev_digit {
                    return false;
                }
                prev_digit = false;
            } else if digit_ok(b) {
                prev_digit = true;
                any = true;
            } else {
                return false;
            }
        }
        bytes.is_empty() || (any && prev_digit)
    }

    #[inline]
    fn consume_digits(src: &[u8], mut i: usize, hex: bool) -> usize {
        while i < src.len() {
            let b = src[i];
            let ok = if hex { is_hex_digit(b) } else { is_dec_digit(b) };
            if !(ok || b == b'_') {
                break;
            }
            i += 1;
        }
        i
    }

    /// Logos callback: extends a number token to its maximal munch.
    ///
    /// Boundaries are permissive ("0b2" stays one token); `classify_number`
    /// rejects malformed literals afterwards.
    pub fn lex_number(lex: &mut LogosLexer<'_, super::RawTok>) -> Result<(), LexErrorKind> {
        let src = lex.source().as_bytes();
        let start = lex.span().start;
        let n = src.len();

        let mut i = start;
        let mut hex = false;

        if src[i] != b'.' {
            if src[i] == b'0' && i + 1 < n && matches!(src[i + 1] | 0x20, b'x' | b'o' | b'b') {
                hex = src[i + 1] | 0x20 == b'x';
                i += 2;
            } else {
                i += 1;
            }
            i = consume_digits(src, i, hex);
        }

        // fraction; don't steal ".." / "..."
        if i < n && src[i] == b'.' && !(i + 1 < n && src[i + 1] == b'.') {
            i = consume_digits(src, i + 1, hex);
        }

        if i < n {
            let e = src[i] | 0x20;
            if (e == b'e' && !hex) || e == b'p' {
                i += 1;
                if i < n && matches!(src[i], b'+' | b'-') {
                    i += 1;
                }
                i = consume_digits(src, i, false);
            }
        }

        let already = lex.span().end;
        if i > already {
            lex.bump(i - already);
        }
        Ok(())
    }
}

pub use num::classify_number;

// =============================================================================
// 3. Token Definition (RawTok - DFA optimized for logos)
// =============================================================================

#[repr(u8)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[token("//", lex_line_comment)] LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    // Identifiers
    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Numbers (maximal munch in callback)
    #[regex(r"[0-9]|\.[0-9]", num::lex_number)] Number,

    // Strings / runes
    #[regex(r"`[^`]*`")] RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'")] Rune,

    // Operators
    #[token("...")] Ellipsis,
    #[token("<<=")] ShlAssign,
    #[token(">>=")] ShrAssign,
    #[token("&^=")] AndNotAssign,
    #[token("+=")] AddAssign,
    #[token("-=")] SubAssign,
    #[token("*=")] MulAssign,
    #[token("/=")] DivAssign,
    #[token("%=")] ModAssign,
    #[token("&=")] AndAssign,
    #[token("|=")] OrAssign,
    #[token("^=")] XorAssign,
    #[token("<<")] Shl,
    #[token(">>")] Shr,
    #[token("&^")] AndNot,
    #[token("&&")] LAnd,
    #[token("||")] LOr,
    #[token("==")] EqEq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token("++")] Inc,
    #[token("--")] Dec,
    #[token(":=")] Define,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("!")] Bang,
    #[token("<")] Lt,
    #[token(">")] Gt,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

// =============================================================================
// 4. Lookup tables (fast classification)
// =============================================================================

macro_rules! gen_lookup_table {
    (bool, $size:expr, $($variant:ident),* $(,)?) => {{
        let mut table = [false; $size];
        $(table[RawTok::$variant as usize] = true;)*
        table
    }};
}

const SEMI_INSERT_TABLE: [bool; 256] = gen_lookup_table!(
    bool,
    256,
    Ident,
    Number,
    Rune,
    String,
    RawString,
    KwBreak,
    KwContinue,
    KwFallthrough,
    KwReturn,
    Inc,
    Dec,
    RParen,
    RBrack,
    RBrace,
);

impl RawTok {
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        SEMI_INSERT_TABLE[self as usize]
    }

    #[inline]
    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        macro_rules! simple_tok {
            ($($raw:ident => $tok:ident),* $(,)?) => {
                match self {
                    Self::Ident => Tok::Ident(slice),
                    Self::Rune => Tok::RuneLit(slice),
                    Self::String => Tok::StringLit(slice),
                    Self::RawString => Tok::RawStringLit(slice),
                    $(Self::$raw => Tok::$tok,)*
                    // Numbers, trivia and BOM are handled by the wrapper.
                    Self::Number | Self::Newline | Self::LineComment | Self::BlockComment
                    | Self::Bom | Self::Error => Tok::Error,
                }
            };
        }

        simple_tok! {
            KwBreak => KwBreak, KwCase => KwCase, KwChan => KwChan, KwConst => KwConst,
            KwContinue => KwContinue, KwDefault => KwDefault, KwDefer => KwDefer, KwElse => KwElse,
            KwFallthrough => KwFallthrough, KwFor => KwFor, KwFunc => KwFunc, KwGo => KwGo,
            KwGoto => KwGoto, KwIf => KwIf, KwImport => KwImport, KwInterface => KwInterface,
            KwMap => KwMap, KwPackage => KwPackage, KwRange => KwRange, KwReturn => KwReturn,
            KwSelect => KwSelect, KwStruct => KwStruct, KwSwitch => KwSwitch, KwType => KwType, KwVar => KwVar,

            Ellipsis => Ellipsis, ShlAssign => ShlAssign, ShrAssign => ShrAssign, AndNotAssign => AndNotAssign,
            AddAssign => AddAssign, SubAssign => SubAssign, MulAssign => MulAssign, DivAssign => DivAssign,
            ModAssign => ModAssign, AndAssign => AndAssign, OrAssign => OrAssign, XorAssign => XorAssign,
            Shl => Shl, Shr => Shr, AndNot => AndNot, LAnd => LAnd, LOr => LOr, EqEq => EqEq, NotEq => NotEq,
            Le => Le, Ge => Ge, Inc => Inc, Dec => Dec, Define => Define, Arrow => Arrow,
            Assign => Assign, Plus => Plus, Minus => Minus, Star => Star, Slash => Slash, Percent => Percent,
            Amp => Amp, Pipe => Pipe, Caret => Caret, Tilde => Tilde, Bang => Bang, Lt => Lt, Gt => Gt,

            LParen => LParen, RParen => RParen, LBrack => LBrack, RBrack => RBrack, LBrace => LBrace,
            RBrace => RBrace, Comma => Comma, Semi => Semi, Colon => Colon, Dot => Dot,
        }
    }
}

// =============================================================================
// 5. Public Token Definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    Ident(&'input str),
    IntLit(&'input str),
    FloatLit(&'input str),
    ImagLit(&'input str),
    RuneLit(&'input str),
    StringLit(&'input str),
    RawStringLit(&'input str),

    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    // Operators / Delimiters
    Ellipsis,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Inc,
    Dec,
    Define,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Lt,
    Gt,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    /// End of input; emitted exactly once by [`Lexer::tokenize`].
    Eof,
    Error,
}

impl<'input> std::fmt::Display for Tok<'input> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s)
            | Tok::IntLit(s)
            | Tok::FloatLit(s)
            | Tok::ImagLit(s)
            | Tok::RuneLit(s)
            | Tok::StringLit(s)
            | Tok::RawStringLit(s) => f.write_str(s),
            Tok::Semi => f.write_str("';'"),
            Tok::Eof => f.write_str("EOF"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Comment recorded while scanning (the stream itself never carries comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawComment {
    pub span: Span,
    pub kind: CommentKind,
}

pub type Spanned<'src> = (usize, Tok<'src>, usize);

// =============================================================================
// 6. Lexer wrapper: semicolon insertion + imag lookahead + diags + comments
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<Spanned<'src>>,
    diags: Vec<Diag>,
    comments: Vec<RawComment>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::with_capacity(16),
            comments: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    pub fn take_comments(&mut self) -> Vec<RawComment> {
        std::mem::take(&mut self.comments)
    }

    /// Scans the whole input, appending a single `Tok::Eof` at the end.
    pub fn tokenize(&mut self) -> Vec<Spanned<'src>> {
        let mut toks: Vec<_> = self.by_ref().collect();
        toks.push((self.src_len, Tok::Eof, self.src_len));
        toks
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let span = Span::new(span.start, span.end);
        self.diags.push(LexError { kind, span }.diag());
    }

    #[inline]
    fn emit_semi_at(&mut self, pos: usize) {
        self.pending = Some((pos, Tok::Semi, pos));
    }

    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(span.start);
                }
                true
            }
            RawTok::LineComment => {
                self.comments.push(RawComment {
                    span: Span::new(span.start, span.end),
                    kind: CommentKind::Line,
                });
                true
            }
            RawTok::BlockComment => {
                self.comments.push(RawComment {
                    span: Span::new(span.start, span.end),
                    kind: CommentKind::Block,
                });
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.emit_semi_at(span.start + off);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Spanned<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // 1) Emit pending token (e.g. injected ';')
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            // 2) Hard EOF
            if self.eof_done {
                return None;
            }

            // 3) Next raw token
            match self.logos.next() {
                None => {
                    // don't return here; a pending ';' is emitted next loop.
                    self.handle_eof();
                    continue;
                }
                Some(Err(kind)) => return Some(self.handle_lex_error(kind)),
                Some(Ok(raw)) => {
                    if let Some(item) = self.handle_raw_token(raw) {
                        return Some(item);
                    }
                }
            }
        }
    }
}

impl<'src> Lexer<'src> {
    #[inline]
    fn handle_eof(&mut self) {
        self.eof_done = true;

        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            self.emit_semi_at(self.src_len);
        }
    }

    #[inline]
    fn handle_lex_error(&mut self, kind: LexErrorKind) -> Spanned<'src> {
        let span = self.logos.span();
        if kind == LexErrorKind::UnterminatedComment {
            self.comments.push(RawComment {
                span: Span::new(span.start, span.end),
                kind: CommentKind::Block,
            });
        }
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    /// `None` means the raw token was trivia and nothing is emitted.
    #[inline]
    fn handle_raw_token(&mut self, raw: RawTok) -> Option<Spanned<'src>> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        // BOM is only valid as the very first character.
        if raw == RawTok::Bom {
            if span.start == 0 {
                return None;
            }
            self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
            self.last_can_insert_semi = false;
            return Some((span.start, Tok::Error, span.end));
        }

        if self.handle_trivia(raw, &span, slice) {
            return None;
        }

        if raw == RawTok::Error {
            self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
            self.last_can_insert_semi = false;
            return Some((span.start, Tok::Error, span.end));
        }

        if raw == RawTok::Number {
            return Some(self.handle_number_token(span, slice));
        }

        self.last_can_insert_semi = raw.can_insert_semicolon();
        Some((span.start, raw.to_token(slice), span.end))
    }

    #[inline]
    fn handle_number_token(&mut self, span: Range<usize>, slice: &'src str) -> Spanned<'src> {
        let src = self.logos.source();
        let bytes = slice.as_bytes();
        let has_i_suffix = span.end < self.src_len && src.as_bytes()[span.end] == b'i';

        let (end, result) = if has_i_suffix {
            self.logos.bump(1);
            // "0789i" is a decimal imaginary literal, not a bad octal.
            let decimal = bytes.iter().all(|&b| is_dec_digit(b) || b == b'_');
            let result = match num::classify_number(bytes) {
                Err(_) if decimal => Ok(true),
                other => other.map(|_| true),
            };
            (span.end + 1, result)
        } else {
            (span.end, num::classify_number(bytes))
        };

        match result {
            Ok(is_float) => {
                self.last_can_insert_semi = true;
                let text = &src[span.start..end];
                let tok = if has_i_suffix {
                    Tok::ImagLit(text)
                } else if is_float {
                    Tok::FloatLit(text)
                } else {
                    Tok::IntLit(text)
                };
                (span.start, tok, end)
            }
            Err(kind) => {
                self.push_lex_diag(kind, span.start..end);
                self.last_can_insert_semi = false;
                (span.start, Tok::Error, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_numbers() {
        for ok_int in ["0", "42", "1_000", "0x_FF", "0o17", "0b1010", "0777"] {
            assert_eq!(classify_number(ok_int.as_bytes()), Ok(false), "{ok_int}");
        }
        for ok_float in ["1.5", ".5", "1.", "1e9", "1E-3", "0x1p-2", "09.5", "1_0.2_5"] {
            assert_eq!(classify_number(ok_float.as_bytes()), Ok(true), "{ok_float}");
        }
        for bad in ["0b2", "09", "1__0", "1_", "0x1.8", "0o8", "1e", "0b1.0"] {
            assert!(classify_number(bad.as_bytes()).is_err(), "{bad}");
        }
    }

    #[test]
    fn records_comments_outside_the_stream() {
        let mut lx = Lexer::new("a // one\n/* two */ b");
        let toks = lx.tokenize();
        let comments = lx.take_comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kind, CommentKind::Line);
        assert_eq!(comments[1].kind, CommentKind::Block);
        let kinds: Vec<_> = toks.iter().map(|t| t.1).collect();
        assert_eq!(kinds, vec![Tok::Ident("a"), Tok::Semi, Tok::Ident("b"), Tok::Semi, Tok::Eof]);
    }
}
