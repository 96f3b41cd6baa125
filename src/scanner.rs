//! Scanner for the slice of the TypeScript/JavaScript lexical grammar needed
//! to read top-level module declarations.
//!
//! The scanner produces a flat token stream. Comments and whitespace are
//! dropped, but every token remembers whether a line terminator preceded it so
//! the parser can apply the ASI rules that matter for `export default Foo`.
//!
//! Template literals, regular expressions and (in `.tsx`/`.jsx` files) JSX
//! elements are consumed as opaque tokens. Their contents never surface as
//! braces or quotes, so the parser can skip balanced groups without
//! understanding expressions.

use crate::span::Span;
use memchr::memmem;
use std::path::Path;

/// Source dialect of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LanguageVariant {
    #[default]
    Standard,
    /// `.tsx` and `.jsx`: a `<` in operand position may open an element.
    Jsx,
}

impl LanguageVariant {
    pub fn from_path(path: &Path) -> Self {
        let is_jsx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsx") || ext.eq_ignore_ascii_case("jsx"));
        if is_jsx {
            LanguageVariant::Jsx
        } else {
            LanguageVariant::Standard
        }
    }
}

/// Token kinds produced by [`scan`].
///
/// Only reserved words that influence statement structure or regex/division
/// disambiguation get their own kind; contextual keywords (`from`, `as`,
/// `type`, `let`, `async`, ...) are scanned as [`SyntaxKind::Identifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Literals
    Identifier,
    StringLiteral,
    NumericLiteral,
    /// A whole no-substitution template, or one piece of a template with
    /// substitutions (head, middle or tail).
    TemplateLiteral,
    RegularExpressionLiteral,
    /// A whole JSX element or fragment, including its children.
    JsxElement,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    AtToken,
    AsteriskToken,
    EqualsToken,
    ColonToken,
    LessThanToken,
    GreaterThanToken,
    SlashToken,
    /// Any other operator character.
    OtherPunctuation,

    // Reserved words
    CaseKeyword,
    ClassKeyword,
    ConstKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FunctionKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    ReturnKeyword,
    ThrowKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,

    EndOfFileToken,
}

const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("case", SyntaxKind::CaseKeyword),
    ("class", SyntaxKind::ClassKeyword),
    ("const", SyntaxKind::ConstKeyword),
    ("default", SyntaxKind::DefaultKeyword),
    ("delete", SyntaxKind::DeleteKeyword),
    ("do", SyntaxKind::DoKeyword),
    ("else", SyntaxKind::ElseKeyword),
    ("enum", SyntaxKind::EnumKeyword),
    ("export", SyntaxKind::ExportKeyword),
    ("extends", SyntaxKind::ExtendsKeyword),
    ("function", SyntaxKind::FunctionKeyword),
    ("import", SyntaxKind::ImportKeyword),
    ("in", SyntaxKind::InKeyword),
    ("instanceof", SyntaxKind::InstanceOfKeyword),
    ("new", SyntaxKind::NewKeyword),
    ("return", SyntaxKind::ReturnKeyword),
    ("throw", SyntaxKind::ThrowKeyword),
    ("typeof", SyntaxKind::TypeOfKeyword),
    ("var", SyntaxKind::VarKeyword),
    ("void", SyntaxKind::VoidKeyword),
];

/// Map identifier text to its reserved-word kind.
pub fn text_to_keyword(text: &str) -> Option<SyntaxKind> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == text)
        .map(|(_, kind)| *kind)
}

pub fn keyword_to_text(kind: SyntaxKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, keyword)| *keyword == kind)
        .map(|(text, _)| *text)
}

pub fn token_is_keyword(kind: SyntaxKind) -> bool {
    keyword_to_text(kind).is_some()
}

/// Identifiers and reserved words are both valid `IdentifierName`s, which is
/// what import/export specifiers accept (`export { default as X }`).
pub fn token_is_identifier_or_keyword(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || token_is_keyword(kind)
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
    /// Identifier/keyword text or the cooked value of a string literal.
    /// Empty for punctuation and opaque literals.
    pub value: String,
    pub has_preceding_line_break: bool,
}

impl Token {
    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }

    /// Whether this is the (contextual) identifier `text`.
    #[inline]
    pub fn is_identifier_named(&self, text: &str) -> bool {
        self.kind == SyntaxKind::Identifier && self.value == text
    }

    #[inline]
    pub fn is_identifier_or_keyword(&self) -> bool {
        token_is_identifier_or_keyword(self.kind)
    }
}

/// Lexical errors that make a file unreadable as a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    UnterminatedString { pos: u32 },
    UnterminatedTemplate { pos: u32 },
    UnterminatedComment { pos: u32 },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::UnterminatedString { pos } => {
                write!(f, "unterminated string literal at offset {pos}")
            }
            ScanError::UnterminatedTemplate { pos } => {
                write!(f, "unterminated template literal at offset {pos}")
            }
            ScanError::UnterminatedComment { pos } => {
                write!(f, "unterminated block comment at offset {pos}")
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Tokenize `source`. The returned stream always ends with an
/// [`SyntaxKind::EndOfFileToken`].
pub fn scan(source: &str, variant: LanguageVariant) -> Result<Vec<Token>, ScanError> {
    ScannerState::new(source, variant).scan_all()
}

struct ScannerState<'a> {
    source: &'a str,
    bytes: &'a [u8],
    variant: LanguageVariant,
    pos: usize,
    tokens: Vec<Token>,
    /// One entry per open `{`; `true` marks a template substitution `${`.
    brace_stack: Vec<bool>,
    line_break: bool,
}

impl<'a> ScannerState<'a> {
    fn new(source: &'a str, variant: LanguageVariant) -> Self {
        ScannerState {
            source,
            bytes: source.as_bytes(),
            variant,
            pos: 0,
            tokens: Vec::new(),
            brace_stack: Vec::new(),
            line_break: false,
        }
    }

    fn scan_all(mut self) -> Result<Vec<Token>, ScanError> {
        self.skip_shebang();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(ch) = self.current_char() else {
                self.push(SyntaxKind::EndOfFileToken, start, String::new());
                return Ok(self.tokens);
            };

            match ch {
                '"' | '\'' => self.scan_string(ch)?,
                '`' => {
                    self.pos += 1;
                    self.scan_template_body(start)?;
                }
                '{' => {
                    self.brace_stack.push(false);
                    self.punctuation(SyntaxKind::OpenBraceToken);
                }
                '}' => {
                    if self.brace_stack.pop() == Some(true) {
                        self.pos += 1;
                        self.scan_template_body(start)?;
                    } else {
                        self.punctuation(SyntaxKind::CloseBraceToken);
                    }
                }
                '/' => {
                    if !(self.regex_allowed() && self.scan_regex()) {
                        self.punctuation(SyntaxKind::SlashToken);
                    }
                }
                '0'..='9' => self.scan_number(),
                '.' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => {
                    self.scan_number()
                }
                c if is_identifier_start(c) => self.scan_identifier(),
                '(' => self.punctuation(SyntaxKind::OpenParenToken),
                ')' => self.punctuation(SyntaxKind::CloseParenToken),
                '[' => self.punctuation(SyntaxKind::OpenBracketToken),
                ']' => self.punctuation(SyntaxKind::CloseBracketToken),
                ';' => self.punctuation(SyntaxKind::SemicolonToken),
                ',' => self.punctuation(SyntaxKind::CommaToken),
                '.' => self.punctuation(SyntaxKind::DotToken),
                '@' => self.punctuation(SyntaxKind::AtToken),
                '*' => self.punctuation(SyntaxKind::AsteriskToken),
                '=' => self.punctuation(SyntaxKind::EqualsToken),
                ':' => self.punctuation(SyntaxKind::ColonToken),
                '<' => {
                    if !(self.jsx_allowed() && self.scan_jsx_element()) {
                        self.punctuation(SyntaxKind::LessThanToken);
                    }
                }
                '>' => self.punctuation(SyntaxKind::GreaterThanToken),
                other => {
                    self.pos += other.len_utf8();
                    self.push(SyntaxKind::OtherPunctuation, start, String::new());
                }
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..)?.chars().next()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: SyntaxKind, start: usize, value: String) {
        self.tokens.push(Token {
            kind,
            span: Span::from_range(start, self.pos),
            value,
            has_preceding_line_break: self.line_break,
        });
        self.line_break = false;
    }

    fn punctuation(&mut self, kind: SyntaxKind) {
        let start = self.pos;
        self.pos += 1;
        self.push(kind, start, String::new());
    }

    fn skip_shebang(&mut self) {
        if self.bytes.starts_with(b"#!") {
            self.pos = memchr::memchr(b'\n', self.bytes).unwrap_or(self.bytes.len());
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ScanError> {
        while let Some(ch) = self.current_char() {
            match ch {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    self.line_break = true;
                    self.pos += ch.len_utf8();
                }
                '/' if self.peek_byte(1) == Some(b'/') => {
                    // The terminating newline is left for the next iteration.
                    self.pos = memchr::memchr(b'\n', &self.bytes[self.pos..])
                        .map_or(self.bytes.len(), |offset| self.pos + offset);
                }
                '/' if self.peek_byte(1) == Some(b'*') => {
                    let body_start = self.pos + 2;
                    let Some(offset) = memmem::find(&self.bytes[body_start..], b"*/") else {
                        return Err(ScanError::UnterminatedComment {
                            pos: self.pos as u32,
                        });
                    };
                    let body = &self.bytes[body_start..body_start + offset];
                    if memchr::memchr2(b'\n', b'\r', body).is_some() {
                        self.line_break = true;
                    }
                    self.pos = body_start + offset + 2;
                }
                c if c.is_whitespace() || c == '\u{feff}' => self.pos += c.len_utf8(),
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, quote: char) -> Result<(), ScanError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(ScanError::UnterminatedString { pos: start as u32 });
            };
            self.pos += ch.len_utf8();
            match ch {
                c if c == quote => break,
                '\n' | '\r' => {
                    return Err(ScanError::UnterminatedString { pos: start as u32 });
                }
                '\\' => self.scan_escape(&mut value),
                c => value.push(c),
            }
        }
        self.push(SyntaxKind::StringLiteral, start, value);
        Ok(())
    }

    /// Cook one escape sequence; `self.pos` is just past the backslash.
    fn scan_escape(&mut self, value: &mut String) {
        let Some(ch) = self.current_char() else {
            return;
        };
        self.pos += ch.len_utf8();
        match ch {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' => value.push('\0'),
            // Line continuation.
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if self.peek_byte(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            'x' => {
                let code = self.take_hex(2);
                value.extend(code.and_then(char::from_u32));
            }
            'u' => {
                let code = if self.peek_byte(0) == Some(b'{') {
                    self.pos += 1;
                    let end = self.bytes[self.pos..]
                        .iter()
                        .position(|b| *b == b'}')
                        .unwrap_or(0);
                    let code = self.take_hex(end);
                    if self.peek_byte(0) == Some(b'}') {
                        self.pos += 1;
                    }
                    code
                } else {
                    self.take_hex(4)
                };
                value.extend(code.and_then(char::from_u32));
            }
            other => value.push(other),
        }
    }

    fn take_hex(&mut self, len: usize) -> Option<u32> {
        let digits = self.source.get(self.pos..self.pos + len)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += len;
        Some(code)
    }

    /// Scan template characters up to the closing backtick or the next `${`.
    /// `self.pos` is just past the opening backtick or the closing `}` of a
    /// substitution.
    fn scan_template_body(&mut self, start: usize) -> Result<(), ScanError> {
        loop {
            match self.peek_byte(0) {
                None => return Err(ScanError::UnterminatedTemplate { pos: start as u32 }),
                Some(b'`') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
                Some(b'$') if self.peek_byte(1) == Some(b'{') => {
                    self.pos += 2;
                    self.brace_stack.push(true);
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.push(SyntaxKind::TemplateLiteral, start, String::new());
        Ok(())
    }

    /// A `/` starts a regular expression unless the previous token ends an
    /// operand.
    fn regex_allowed(&self) -> bool {
        let Some(previous) = self.tokens.last() else {
            return true;
        };
        !matches!(
            previous.kind,
            SyntaxKind::Identifier
                | SyntaxKind::NumericLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TemplateLiteral
                | SyntaxKind::RegularExpressionLiteral
                | SyntaxKind::JsxElement
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
        )
    }

    /// Try to scan a regular expression literal. On failure (no closing `/`
    /// before the end of the line) nothing is consumed.
    fn scan_regex(&mut self) -> bool {
        let start = self.pos;
        let mut cursor = self.pos + 1;
        let mut in_class = false;
        loop {
            match self.bytes.get(cursor) {
                None | Some(b'\n') | Some(b'\r') => return false,
                Some(b'\\') => cursor += 2,
                Some(b'[') => {
                    in_class = true;
                    cursor += 1;
                }
                Some(b']') => {
                    in_class = false;
                    cursor += 1;
                }
                Some(b'/') if !in_class => {
                    cursor += 1;
                    break;
                }
                Some(_) => cursor += 1,
            }
        }
        while self
            .bytes
            .get(cursor)
            .is_some_and(|b| b.is_ascii_alphanumeric())
        {
            cursor += 1;
        }
        self.pos = cursor;
        self.push(SyntaxKind::RegularExpressionLiteral, start, String::new());
        true
    }

    /// A `<` opens a JSX element where a regular expression could start.
    fn jsx_allowed(&self) -> bool {
        self.variant == LanguageVariant::Jsx
            && self.regex_allowed()
            && self
                .peek_byte(1)
                .is_some_and(|b| b == b'>' || is_jsx_name_start(b))
    }

    /// Try to scan a JSX element or fragment. When the text does not form a
    /// complete element (a type parameter list, or a stray `<`) nothing is
    /// consumed.
    fn scan_jsx_element(&mut self) -> bool {
        let start = self.pos;
        let Some(end) = jsx_element_end(self.bytes, start) else {
            return false;
        };
        self.pos = end;
        self.push(SyntaxKind::JsxElement, start, String::new());
        true
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        while self
            .peek_byte(0)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        {
            self.pos += 1;
        }
        self.push(SyntaxKind::NumericLiteral, start, String::new());
    }

    fn scan_identifier(&mut self) {
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let text = &self.source[start..self.pos];
        let kind = text_to_keyword(text).unwrap_or(SyntaxKind::Identifier);
        self.push(kind, start, text.to_string());
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_numeric() || ch == '\u{200c}' || ch == '\u{200d}'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsxTag {
    Opening,
    Closing,
    SelfClosing,
}

fn is_jsx_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_jsx_name_byte(byte: u8) -> bool {
    is_jsx_name_start(byte) || byte.is_ascii_digit() || matches!(byte, b'-' | b'.' | b':')
}

fn skip_ascii_whitespace(bytes: &[u8], mut cursor: usize) -> usize {
    while bytes.get(cursor).is_some_and(u8::is_ascii_whitespace) {
        cursor += 1;
    }
    cursor
}

/// End offset of the JSX element or fragment whose `<` is at `pos`.
fn jsx_element_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut cursor = pos;
    loop {
        let (after, tag) = jsx_tag_end(bytes, cursor)?;
        match tag {
            JsxTag::Opening => depth += 1,
            JsxTag::Closing => depth = depth.checked_sub(1)?,
            JsxTag::SelfClosing => {}
        }
        if depth == 0 {
            return Some(after);
        }
        cursor = jsx_text_end(bytes, after)?;
    }
}

/// Scan one tag starting at `<`.
fn jsx_tag_end(bytes: &[u8], pos: usize) -> Option<(usize, JsxTag)> {
    let mut cursor = pos + 1;
    let closing = bytes.get(cursor) == Some(&b'/');
    if closing {
        cursor = skip_ascii_whitespace(bytes, cursor + 1);
    }

    let name_start = cursor;
    while bytes.get(cursor).is_some_and(|b| is_jsx_name_byte(*b)) {
        cursor += 1;
    }
    if cursor > name_start {
        if !is_jsx_name_start(bytes[name_start]) {
            return None;
        }
        // `<T,>` and `<T extends U>` are type parameter lists.
        let next = skip_ascii_whitespace(bytes, cursor);
        let rest = &bytes[next.min(bytes.len())..];
        let is_extends = rest.starts_with(b"extends")
            && !rest.get(7).is_some_and(|b| is_jsx_name_byte(*b));
        if !closing && (rest.first() == Some(&b',') || is_extends) {
            return None;
        }
    } else if bytes.get(skip_ascii_whitespace(bytes, cursor)) != Some(&b'>') {
        return None;
    }

    loop {
        cursor = skip_ascii_whitespace(bytes, cursor);
        match *bytes.get(cursor)? {
            b'>' => {
                let tag = if closing { JsxTag::Closing } else { JsxTag::Opening };
                return Some((cursor + 1, tag));
            }
            b'/' if !closing && bytes.get(cursor + 1) == Some(&b'>') => {
                return Some((cursor + 2, JsxTag::SelfClosing));
            }
            // Attribute values run to the matching quote with no escapes.
            quote @ (b'"' | b'\'') if !closing => {
                let offset = memchr::memchr(quote, &bytes[cursor + 1..])?;
                cursor += offset + 2;
            }
            b'{' if !closing => cursor = jsx_expression_end(bytes, cursor)?,
            b'=' if !closing => cursor += 1,
            b if !closing && is_jsx_name_byte(b) => cursor += 1,
            _ => return None,
        }
    }
}

/// Skip element children up to the `<` of the next tag.
fn jsx_text_end(bytes: &[u8], mut cursor: usize) -> Option<usize> {
    loop {
        cursor += memchr::memchr2(b'<', b'{', bytes.get(cursor..)?)?;
        if bytes[cursor] == b'<' {
            return Some(cursor);
        }
        cursor = jsx_expression_end(bytes, cursor)?;
    }
}

/// End offset of the `{ .. }` expression container starting at `pos`.
fn jsx_expression_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut cursor = pos;
    loop {
        match *bytes.get(cursor)? {
            b'{' => {
                depth += 1;
                cursor += 1;
            }
            b'}' => {
                depth -= 1;
                cursor += 1;
                if depth == 0 {
                    return Some(cursor);
                }
            }
            quote @ (b'"' | b'\'') => cursor = quoted_end(bytes, cursor, quote)?,
            b'`' => cursor = template_end(bytes, cursor)?,
            b'/' if bytes.get(cursor + 1) == Some(&b'/') => {
                cursor += memchr::memchr(b'\n', &bytes[cursor..])?;
            }
            b'/' if bytes.get(cursor + 1) == Some(&b'*') => {
                cursor += memmem::find(&bytes[cursor + 2..], b"*/")? + 4;
            }
            b'<' if opens_nested_element(bytes, pos, cursor) => {
                cursor = jsx_element_end(bytes, cursor)?;
            }
            _ => cursor += 1,
        }
    }
}

/// Whether the `<` at `cursor`, inside the expression container opened at
/// `container`, starts an element rather than a comparison.
fn opens_nested_element(bytes: &[u8], container: usize, cursor: usize) -> bool {
    if !bytes
        .get(cursor + 1)
        .is_some_and(|b| *b == b'>' || is_jsx_name_start(*b))
    {
        return false;
    }
    let before = &bytes[container..cursor];
    let Some(last) = before.iter().rposition(|b| !b.is_ascii_whitespace()) else {
        return true;
    };
    matches!(
        before[last],
        b'(' | b'{' | b'[' | b',' | b'=' | b'?' | b':' | b'&' | b'|' | b'!' | b'>'
    ) || before[..=last].ends_with(b"return")
}

fn quoted_end(bytes: &[u8], pos: usize, quote: u8) -> Option<usize> {
    let mut cursor = pos + 1;
    loop {
        match *bytes.get(cursor)? {
            b'\\' => cursor += 2,
            b'\n' => return None,
            b if b == quote => return Some(cursor + 1),
            _ => cursor += 1,
        }
    }
}

fn template_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut cursor = pos + 1;
    loop {
        match *bytes.get(cursor)? {
            b'\\' => cursor += 2,
            b'`' => return Some(cursor + 1),
            b'$' if bytes.get(cursor + 1) == Some(&b'{') => {
                cursor = jsx_expression_end(bytes, cursor + 1)?;
            }
            _ => cursor += 1,
        }
    }
}
