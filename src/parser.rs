//! Top-level declaration parser.
//!
//! Walks the token stream produced by [`crate::scanner`] at brace depth zero
//! and recognizes:
//! - import declarations (default, named, namespace, side-effect, `type`)
//! - export declarations (named lists, re-exports, `export *`,
//!   `export * as ns`, `export default`, exported declarations)
//! - names of locally declared classes, functions, variables and types
//! - component registration blocks (`@Options({ components: { .. } })`,
//!   `export default defineComponent({ components: { .. } })`)
//!
//! Everything else (function bodies, class bodies, expressions) is skipped as
//! balanced bracket groups. Nothing is evaluated.

use crate::exports::ExportBinding;
use crate::imports::{ImportBinding, ImportKind};
use crate::module_table::ModuleTable;
use crate::scanner::{LanguageVariant, ScanError, SyntaxKind, Token, scan};
use crate::span::Span;

/// A malformed import or export declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Why a source text could not be read as a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleParseError {
    Scan(ScanError),
    Syntax(ParseError),
}

impl std::fmt::Display for ModuleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleParseError::Scan(err) => write!(f, "scan error: {err}"),
            ModuleParseError::Syntax(err) => write!(f, "syntax error: {err}"),
        }
    }
}

impl std::error::Error for ModuleParseError {}

impl From<ScanError> for ModuleParseError {
    fn from(err: ScanError) -> Self {
        ModuleParseError::Scan(err)
    }
}

impl From<ParseError> for ModuleParseError {
    fn from(err: ParseError) -> Self {
        ModuleParseError::Syntax(err)
    }
}

/// Parse the import/export table of a module source text.
pub fn parse_module_table(
    source: &str,
    variant: LanguageVariant,
) -> Result<ModuleTable, ModuleParseError> {
    let tokens = scan(source, variant)?;
    let table = ParserState::new(&tokens).parse_module_table()?;
    Ok(table)
}

/// Collect `(public name, local name)` pairs from every registration block in
/// `source` whose decorator name is one of `decorators`.
pub fn parse_registrations<S: AsRef<str>>(
    source: &str,
    variant: LanguageVariant,
    decorators: &[S],
) -> Result<Vec<(String, String)>, ScanError> {
    let tokens = scan(source, variant)?;
    Ok(ParserState::new(&tokens).parse_registrations(decorators))
}

/// Cursor over a token stream. The stream always ends with an
/// `EndOfFileToken`, which `current` never moves past.
pub struct ParserState<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> ParserState<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        ParserState { tokens, pos: 0 }
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn peek(&self, offset: usize) -> &'t Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn current(&self) -> &'t Token {
        self.peek(0)
    }

    fn at_eof(&self) -> bool {
        self.current().is(SyntaxKind::EndOfFileToken)
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.current().is(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_identifier(&mut self, text: &str) -> bool {
        if self.current().is_identifier_named(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> Result<&'t Token, ParseError> {
        let token = self.current();
        if token.is(kind) {
            self.advance();
            Ok(token)
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expect_identifier(&mut self, text: &str) -> Result<(), ParseError> {
        if self.eat_identifier(text) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{text}'")))
        }
    }

    /// Skip one token, or a whole bracket group when positioned on an opener.
    fn skip_balanced(&mut self) {
        let opens = |kind: SyntaxKind| {
            matches!(
                kind,
                SyntaxKind::OpenBraceToken | SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken
            )
        };
        let closes = |kind: SyntaxKind| {
            matches!(
                kind,
                SyntaxKind::CloseBraceToken
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
            )
        };

        if !opens(self.current().kind) {
            self.advance();
            return;
        }
        let mut depth = 0usize;
        while !self.at_eof() {
            let kind = self.current().kind;
            self.advance();
            if opens(kind) {
                depth += 1;
            } else if closes(kind) {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Whether the current token can begin a statement: first token, after
    /// `;` or a closed block, or on a new line.
    fn at_statement_start(&self) -> bool {
        if self.pos == 0 || self.current().has_preceding_line_break {
            return true;
        }
        matches!(
            self.tokens[self.pos - 1].kind,
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken
        )
    }

    fn take_identifier(&mut self) -> Option<String> {
        let token = self.current();
        if token.is(SyntaxKind::Identifier) {
            self.advance();
            Some(token.value.clone())
        } else {
            None
        }
    }

    /// `ModuleExportName`: an identifier name or a string literal.
    fn parse_module_export_name(&mut self) -> Result<String, ParseError> {
        let token = self.current();
        if token.is_identifier_or_keyword() || token.is(SyntaxKind::StringLiteral) {
            self.advance();
            Ok(token.value.clone())
        } else {
            Err(self.error("expected an identifier or string literal"))
        }
    }

    fn parse_module_specifier(&mut self) -> Result<String, ParseError> {
        self.expect_identifier("from")?;
        let token = self.expect(SyntaxKind::StringLiteral, "module specifier")?;
        let specifier = token.value.clone();
        self.skip_import_attributes();
        self.eat(SyntaxKind::SemicolonToken);
        Ok(specifier)
    }

    /// `with { type: 'json' }` / legacy `assert { .. }`
    fn skip_import_attributes(&mut self) {
        let token = self.current();
        if (token.is_identifier_named("with")
            || (token.is_identifier_named("assert") && !token.has_preceding_line_break))
            && self.peek(1).is(SyntaxKind::OpenBraceToken)
        {
            self.advance();
            self.skip_balanced();
        }
    }

    /// Whether an element-level `type` modifier applies at the current token
    /// (`{ type Foo }`, `{ type Foo as Bar }`), as opposed to an element named
    /// `type` (`{ type }`, `{ type as Foo }`).
    fn element_type_modifier_applies(&self) -> bool {
        if !self.current().is_identifier_named("type") {
            return false;
        }
        let next = self.peek(1);
        if !(next.is_identifier_or_keyword() || next.is(SyntaxKind::StringLiteral)) {
            return false;
        }
        let renames_type = next.is_identifier_named("as")
            && self.peek(2).is_identifier_or_keyword()
            && matches!(
                self.peek(3).kind,
                SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
            );
        !renames_type
    }

    // =========================================================================
    // Module table
    // =========================================================================

    pub fn parse_module_table(&mut self) -> Result<ModuleTable, ParseError> {
        let mut table = ModuleTable::default();
        while !self.at_eof() {
            // `import`/`export` are reserved, so outside of a member access
            // they always start a declaration (`@Dec() export class` has no
            // line break before `export`).
            let after_dot = self.pos > 0 && self.tokens[self.pos - 1].is(SyntaxKind::DotToken);
            match self.current().kind {
                SyntaxKind::ImportKeyword
                    if !after_dot
                        && !matches!(
                            self.peek(1).kind,
                            SyntaxKind::OpenParenToken | SyntaxKind::DotToken
                        ) =>
                {
                    self.parse_import_declaration(&mut table)?;
                }
                SyntaxKind::ExportKeyword if !after_dot => {
                    self.parse_export_declaration(&mut table)?
                }
                _ if self.at_statement_start() => {
                    if let Some(name) = self.parse_declaration_head() {
                        table.declarations.push(name);
                    } else {
                        self.skip_balanced();
                    }
                }
                _ => self.skip_balanced(),
            }
        }
        Ok(table)
    }

    /// Recognize the head of a declaration and return its name, consuming
    /// tokens up to and including the name. Consumes nothing when the current
    /// statement is not a named declaration.
    fn parse_declaration_head(&mut self) -> Option<String> {
        let start = self.pos;
        while ["declare", "abstract", "async"]
            .iter()
            .any(|modifier| self.current().is_identifier_named(modifier))
        {
            self.advance();
        }

        let token = self.current();
        let name = match token.kind {
            SyntaxKind::ClassKeyword | SyntaxKind::EnumKeyword => {
                self.advance();
                self.take_identifier()
            }
            SyntaxKind::FunctionKeyword => {
                self.advance();
                self.eat(SyntaxKind::AsteriskToken);
                self.take_identifier()
            }
            SyntaxKind::ConstKeyword | SyntaxKind::VarKeyword => {
                self.advance();
                self.eat(SyntaxKind::EnumKeyword);
                self.take_identifier()
            }
            SyntaxKind::Identifier
                if ["let", "interface", "type", "namespace", "module"]
                    .contains(&token.value.as_str())
                    && self.peek(1).is(SyntaxKind::Identifier) =>
            {
                self.advance();
                self.take_identifier()
            }
            _ => None,
        };

        if name.is_none() {
            self.pos = start;
        }
        name
    }

    fn parse_import_declaration(&mut self, table: &mut ModuleTable) -> Result<(), ParseError> {
        self.advance(); // import

        // Side-effect import: `import './styles.css'`
        if self.current().is(SyntaxKind::StringLiteral) {
            self.advance();
            self.skip_import_attributes();
            self.eat(SyntaxKind::SemicolonToken);
            return Ok(());
        }

        if self.import_type_modifier_applies() {
            self.advance();
        }

        let mut pending: Vec<(String, ImportKind)> = Vec::new();
        if let Some(local) = self.take_identifier() {
            // `import x = require('mod')` / `import x = Ns.member` bind nothing
            // this resolver follows.
            if self.current().is(SyntaxKind::EqualsToken) {
                return Ok(());
            }
            pending.push((local, ImportKind::Default));
            if !self.eat(SyntaxKind::CommaToken) {
                return self.finish_import(table, pending);
            }
        }

        match self.current().kind {
            SyntaxKind::AsteriskToken => {
                self.advance();
                self.expect_identifier("as")?;
                let local = self
                    .take_identifier()
                    .ok_or_else(|| self.error("expected namespace import name"))?;
                pending.push((local, ImportKind::Namespace));
            }
            SyntaxKind::OpenBraceToken => {
                self.advance();
                while !self.eat(SyntaxKind::CloseBraceToken) {
                    if self.element_type_modifier_applies() {
                        self.advance();
                    }
                    let imported_token = self.current();
                    let imported = self.parse_module_export_name()?;
                    let local = if self.eat_identifier("as") {
                        self.parse_module_export_name()?
                    } else if imported_token.is(SyntaxKind::StringLiteral) {
                        return Err(self.error("string import name requires 'as'"));
                    } else {
                        imported.clone()
                    };
                    pending.push((local, ImportKind::Named(imported)));
                    if !self.eat(SyntaxKind::CommaToken) {
                        self.expect(SyntaxKind::CloseBraceToken, "'}'")?;
                        break;
                    }
                }
            }
            _ => return Err(self.error("expected import clause")),
        }

        self.finish_import(table, pending)
    }

    fn finish_import(
        &mut self,
        table: &mut ModuleTable,
        pending: Vec<(String, ImportKind)>,
    ) -> Result<(), ParseError> {
        let module_specifier = self.parse_module_specifier()?;
        table
            .imports
            .extend(pending.into_iter().map(|(local_name, kind)| ImportBinding {
                local_name,
                module_specifier: module_specifier.clone(),
                kind,
            }));
        Ok(())
    }

    /// `import type X from`, `import type { .. }`, `import type * as ns` but
    /// not `import type from 'mod'` (a default import named `type`).
    fn import_type_modifier_applies(&self) -> bool {
        if !self.current().is_identifier_named("type") {
            return false;
        }
        let next = self.peek(1);
        match next.kind {
            SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken => true,
            SyntaxKind::Identifier if next.value == "from" => {
                !self.peek(2).is(SyntaxKind::StringLiteral)
            }
            SyntaxKind::Identifier => true,
            _ => false,
        }
    }

    fn parse_export_declaration(&mut self, table: &mut ModuleTable) -> Result<(), ParseError> {
        self.advance(); // export

        if self.current().is_identifier_named("type")
            && matches!(
                self.peek(1).kind,
                SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken
            )
        {
            self.advance();
        }

        match self.current().kind {
            SyntaxKind::DefaultKeyword => {
                self.advance();
                self.parse_export_default(table);
                Ok(())
            }
            SyntaxKind::AsteriskToken => {
                self.advance();
                if self.eat_identifier("as") {
                    let exported_name = self.parse_module_export_name()?;
                    let from_module = self.parse_module_specifier()?;
                    table.exports.push(ExportBinding::ReExportNamespace {
                        exported_name,
                        from_module,
                    });
                } else {
                    let from_module = self.parse_module_specifier()?;
                    table.exports.push(ExportBinding::ReExportAll { from_module });
                }
                Ok(())
            }
            SyntaxKind::OpenBraceToken => self.parse_export_list(table),
            // `export = x`, `export as namespace X`, `export import A = B.C`
            SyntaxKind::EqualsToken | SyntaxKind::ImportKeyword => Ok(()),
            SyntaxKind::Identifier if self.current().value == "as" => Ok(()),
            _ => {
                if let Some(name) = self.parse_declaration_head() {
                    table.declarations.push(name.clone());
                    table.exports.push(ExportBinding::Declaration { name });
                }
                Ok(())
            }
        }
    }

    fn parse_export_list(&mut self, table: &mut ModuleTable) -> Result<(), ParseError> {
        self.advance(); // {
        let mut elements: Vec<(String, String)> = Vec::new();
        while !self.eat(SyntaxKind::CloseBraceToken) {
            if self.element_type_modifier_applies() {
                self.advance();
            }
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_identifier("as") {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            elements.push((exported, local));
            if !self.eat(SyntaxKind::CommaToken) {
                self.expect(SyntaxKind::CloseBraceToken, "'}'")?;
                break;
            }
        }

        if self.current().is_identifier_named("from") {
            let from_module = self.parse_module_specifier()?;
            table.exports.extend(elements.into_iter().map(|(exported_name, local_name)| {
                ExportBinding::ReExportNamed {
                    exported_name,
                    local_name,
                    from_module: from_module.clone(),
                }
            }));
        } else {
            self.eat(SyntaxKind::SemicolonToken);
            table.exports.extend(elements.into_iter().map(|(exported_name, local_name)| {
                ExportBinding::LocalNamed {
                    exported_name,
                    local_name,
                }
            }));
        }
        Ok(())
    }

    /// Positioned just after `export default`.
    fn parse_export_default(&mut self, table: &mut ModuleTable) {
        let token = self.current();
        if token.is(SyntaxKind::Identifier) && self.ends_expression_statement(1) {
            self.advance();
            self.eat(SyntaxKind::SemicolonToken);
            table.exports.push(ExportBinding::DefaultAssignment {
                local_name: token.value.clone(),
            });
            return;
        }

        // `export default class Foo {}`, `export default function () {}`,
        // `export default { .. }`: the default export is defined here.
        if let Some(name) = self.parse_declaration_head() {
            table.declarations.push(name);
        }
        table.exports.push(ExportBinding::Declaration {
            name: "default".to_string(),
        });
    }

    /// Whether the token at `offset` ends the expression statement that
    /// started at the current token (explicitly, or by ASI on a new line).
    fn ends_expression_statement(&self, offset: usize) -> bool {
        let next = self.peek(offset);
        match next.kind {
            SyntaxKind::SemicolonToken
            | SyntaxKind::EndOfFileToken
            | SyntaxKind::CloseBraceToken => true,
            SyntaxKind::DotToken
            | SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::EqualsToken
            | SyntaxKind::CommaToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::OtherPunctuation
            | SyntaxKind::TemplateLiteral
            | SyntaxKind::InKeyword
            | SyntaxKind::InstanceOfKeyword => false,
            _ => next.has_preceding_line_break,
        }
    }

    // =========================================================================
    // Registration blocks
    // =========================================================================

    pub fn parse_registrations<S: AsRef<str>>(&mut self, decorators: &[S]) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        while !self.at_eof() {
            match self.current().kind {
                SyntaxKind::AtToken => self.parse_decorator(decorators, &mut entries),
                SyntaxKind::ExportKeyword if self.peek(1).is(SyntaxKind::DefaultKeyword) => {
                    self.advance();
                    self.advance();
                    self.parse_default_export_options(&mut entries);
                }
                _ => self.skip_balanced(),
            }
        }
        entries
    }

    /// Positioned on `@`. Harvests the options object of a recognized
    /// decorator that is applied to a class.
    fn parse_decorator<S: AsRef<str>>(&mut self, decorators: &[S], entries: &mut Vec<(String, String)>) {
        self.advance(); // @
        let Some(mut name) = self.take_identifier() else {
            return;
        };
        while self.current().is(SyntaxKind::DotToken) && self.peek(1).is(SyntaxKind::Identifier) {
            self.advance();
            name = self.peek(0).value.clone();
            self.advance();
        }
        if !self.current().is(SyntaxKind::OpenParenToken) {
            return;
        }

        let call_start = self.pos;
        let recognized = decorators.iter().any(|d| d.as_ref() == name);
        let mut found = Vec::new();
        if recognized && self.peek(1).is(SyntaxKind::OpenBraceToken) {
            self.advance();
            self.parse_options_object(&mut found);
        }
        self.pos = call_start;
        self.skip_balanced();

        if !found.is_empty() && self.decorates_class() {
            entries.extend(found);
        }
    }

    /// Look ahead past further decorators and modifiers for `class`.
    fn decorates_class(&mut self) -> bool {
        let start = self.pos;
        let result = loop {
            let token = self.current();
            match token.kind {
                SyntaxKind::ClassKeyword => break true,
                SyntaxKind::AtToken => {
                    self.advance();
                    while self.current().is(SyntaxKind::Identifier) || self.current().is(SyntaxKind::DotToken) {
                        self.advance();
                    }
                    if self.current().is(SyntaxKind::OpenParenToken) {
                        self.skip_balanced();
                    }
                }
                SyntaxKind::ExportKeyword | SyntaxKind::DefaultKeyword => self.advance(),
                SyntaxKind::Identifier if token.value == "abstract" || token.value == "declare" => {
                    self.advance()
                }
                _ => break false,
            }
        };
        self.pos = start;
        result
    }

    /// Positioned after `export default`: `{ .. }` or `defineComponent({ .. })`
    /// (any dotted callee, e.g. `Vue.extend({ .. })`).
    fn parse_default_export_options(&mut self, entries: &mut Vec<(String, String)>) {
        if self.current().is(SyntaxKind::OpenBraceToken) {
            self.parse_options_object(entries);
            return;
        }
        let start = self.pos;
        while self.current().is(SyntaxKind::Identifier) {
            self.advance();
            if !self.eat(SyntaxKind::DotToken) {
                break;
            }
        }
        if self.pos > start
            && self.current().is(SyntaxKind::OpenParenToken)
            && self.peek(1).is(SyntaxKind::OpenBraceToken)
        {
            let call_start = self.pos;
            self.advance();
            self.parse_options_object(entries);
            self.pos = call_start;
            self.skip_balanced();
        }
    }

    /// Positioned on the `{` of an options object; finds `components: { .. }`.
    fn parse_options_object(&mut self, entries: &mut Vec<(String, String)>) {
        self.advance(); // {
        loop {
            if self.eat(SyntaxKind::CloseBraceToken) || self.at_eof() {
                return;
            }
            let key = self.current();
            let is_components_key = (key.is_identifier_or_keyword() || key.is(SyntaxKind::StringLiteral))
                && key.value == "components";
            if is_components_key
                && self.peek(1).is(SyntaxKind::ColonToken)
                && self.peek(2).is(SyntaxKind::OpenBraceToken)
            {
                self.advance();
                self.advance();
                self.parse_components_object(entries);
            } else {
                self.skip_property();
            }
            self.eat(SyntaxKind::CommaToken);
        }
    }

    /// Positioned on the `{` of the `components` object.
    fn parse_components_object(&mut self, entries: &mut Vec<(String, String)>) {
        self.advance(); // {
        loop {
            if self.eat(SyntaxKind::CloseBraceToken) || self.at_eof() {
                return;
            }
            let key = self.current();
            let ends_property = |token: &Token| {
                matches!(
                    token.kind,
                    SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
                )
            };

            if key.is(SyntaxKind::Identifier) && ends_property(self.peek(1)) {
                // Shorthand: `{ Header }`
                entries.push((key.value.clone(), key.value.clone()));
                self.advance();
            } else if (key.is_identifier_or_keyword() || key.is(SyntaxKind::StringLiteral))
                && self.peek(1).is(SyntaxKind::ColonToken)
                && self.peek(2).is(SyntaxKind::Identifier)
                && ends_property(self.peek(3))
            {
                // `{ AppHeader: Header }`
                entries.push((key.value.clone(), self.peek(2).value.clone()));
                self.advance();
                self.advance();
                self.advance();
            } else {
                self.skip_property();
            }
            self.eat(SyntaxKind::CommaToken);
        }
    }

    /// Skip to the `,` or `}` that ends the current object property.
    fn skip_property(&mut self) {
        while !self.at_eof()
            && !matches!(
                self.current().kind,
                SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
            )
        {
            self.skip_balanced();
        }
    }
}
