//! Recursive-descent parser for Spanner DDL statements.

use crate::ast::{
    AlterTable, ColumnDef, Constraint, CreateIndex, CreateTable, Cluster, Ddl, ForeignKey,
    GeneratedColumn, Ident, IndexKey, IntValue, OnDelete, OtherStatement, Path, RowDeletionPolicy,
    ScalarTypeName, SchemaType, StructField, TableAlteration, TableConstraint, TypeSize,
};
use crate::lexer::{tokenize, Token, TokenKind};
use spanspy_core::{SortDirection, SourceError};
use tracing::trace;

type PResult<T> = std::result::Result<T, SourceError>;

/// Parse every statement in `src`.
///
/// `source_name` only appears in error messages. Statements the schema model
/// has no use for are returned as [`Ddl::Other`] rather than rejected.
pub fn parse_ddls(source_name: &str, src: &str) -> spanspy_core::Result<Vec<Ddl>> {
    let tokens = tokenize(source_name, src)?;
    let ddls = Parser::new(source_name, src, tokens).statements()?;
    Ok(ddls)
}

/// Parse exactly one statement (a trailing `;` is allowed).
pub fn parse_ddl(source_name: &str, src: &str) -> spanspy_core::Result<Ddl> {
    let tokens = tokenize(source_name, src)?;
    let mut parser = Parser::new(source_name, src, tokens);
    let ddl = parser.statement()?;
    parser.eat_symbol(";");
    if parser.current().kind != TokenKind::Eof {
        return Err(parser.expected("end of input").into());
    }
    Ok(ddl)
}

pub struct Parser<'a> {
    source_name: &'a str,
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// An `Eof` token is appended when `tokens` does not already end with one.
    pub fn new(source_name: &'a str, src: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                start: src.len(),
                end: src.len(),
                line,
                column,
            });
        }
        Self {
            source_name,
            src,
            tokens,
            pos: 0,
        }
    }

    pub fn statements(&mut self) -> PResult<Vec<Ddl>> {
        let mut ddls = Vec::new();
        loop {
            while self.eat_symbol(";") {}
            if self.current().kind == TokenKind::Eof {
                return Ok(ddls);
            }
            let ddl = self.statement()?;
            trace!(kind = ddl.kind(), "parsed statement");
            ddls.push(ddl);
            if !self.eat_symbol(";") && self.current().kind != TokenKind::Eof {
                return Err(self.expected("';' or end of input"));
            }
        }
    }

    pub fn statement(&mut self) -> PResult<Ddl> {
        if self.at_keyword("CREATE") {
            if self.nth(1).is_keyword("TABLE") {
                return self.create_table().map(Ddl::CreateTable);
            }
            let mut i = 1;
            while self.nth(i).is_keyword("UNIQUE") || self.nth(i).is_keyword("NULL_FILTERED") {
                i += 1;
            }
            if self.nth(i).is_keyword("INDEX") {
                return self.create_index().map(Ddl::CreateIndex);
            }
        } else if self.at_keyword("ALTER") && self.nth(1).is_keyword("TABLE") {
            return self.alter_table().map(Ddl::AlterTable);
        }
        Ok(Ddl::Other(self.other_statement()))
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn create_table(&mut self) -> PResult<CreateTable> {
        self.expect_keyword("CREATE")?;
        self.expect_keyword("TABLE")?;
        let mut stmt = CreateTable {
            if_not_exists: self.eat_keywords(&["IF", "NOT", "EXISTS"]),
            name: self.path()?,
            ..CreateTable::default()
        };

        self.expect_symbol("(")?;
        while !self.at_symbol(")") {
            if self.at_table_constraint() {
                stmt.constraints.push(self.table_constraint()?);
            } else {
                stmt.columns.push(self.column_def()?);
            }
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")")?;

        if self.eat_keywords(&["PRIMARY", "KEY"]) {
            stmt.primary_keys = self.key_list()?;
        }

        while self.eat_symbol(",") {
            if self.at_keyword("INTERLEAVE") {
                stmt.cluster = Some(self.cluster()?);
            } else if self.at_keyword("ROW") {
                stmt.row_deletion_policy = Some(self.row_deletion_policy()?);
            } else {
                return Err(self.expected("INTERLEAVE IN or ROW DELETION POLICY"));
            }
        }

        Ok(stmt)
    }

    fn alter_table(&mut self) -> PResult<AlterTable> {
        self.expect_keyword("ALTER")?;
        self.expect_keyword("TABLE")?;
        let name = self.path()?;
        let start = self.current().start;

        let alteration = if self.eat_keyword("ADD") {
            if self.eat_keyword("COLUMN") {
                let if_not_exists = self.eat_keywords(&["IF", "NOT", "EXISTS"]);
                TableAlteration::AddColumn {
                    if_not_exists,
                    column: self.column_def()?,
                }
            } else if self.at_table_constraint() {
                TableAlteration::AddTableConstraint(self.table_constraint()?)
            } else if self.at_keyword("ROW") {
                TableAlteration::AddRowDeletionPolicy(self.row_deletion_policy()?)
            } else if self.at_keyword("SYNONYM") {
                TableAlteration::Other(self.rest_of_statement(start))
            } else {
                return Err(self.expected("COLUMN, CONSTRAINT, FOREIGN KEY, CHECK or ROW DELETION POLICY"));
            }
        } else if self.eat_keyword("DROP") {
            if self.eat_keyword("COLUMN") {
                TableAlteration::DropColumn(self.ident()?)
            } else if self.eat_keyword("CONSTRAINT") {
                TableAlteration::DropConstraint(self.ident()?)
            } else if self.eat_keywords(&["ROW", "DELETION", "POLICY"]) {
                TableAlteration::DropRowDeletionPolicy
            } else if self.at_keyword("SYNONYM") {
                TableAlteration::Other(self.rest_of_statement(start))
            } else {
                return Err(self.expected("COLUMN, CONSTRAINT or ROW DELETION POLICY"));
            }
        } else if self.eat_keyword("SET") {
            if self.at_keyword("INTERLEAVE") {
                TableAlteration::SetInterleaveIn(self.cluster()?)
            } else if self.eat_keywords(&["ON", "DELETE"]) {
                TableAlteration::SetOnDelete(self.on_delete_action()?)
            } else {
                return Err(self.expected("INTERLEAVE IN or ON DELETE"));
            }
        } else if self.eat_keyword("REPLACE") {
            TableAlteration::ReplaceRowDeletionPolicy(self.row_deletion_policy()?)
        } else if self.eat_keyword("ALTER") {
            self.eat_keyword("COLUMN");
            let column = self.ident()?;
            TableAlteration::AlterColumn {
                name: column,
                sql: self.rest_of_statement(start),
            }
        } else if self.at_keyword("RENAME") {
            TableAlteration::Other(self.rest_of_statement(start))
        } else {
            return Err(self.expected("ADD, DROP, SET, REPLACE, ALTER or RENAME"));
        };

        Ok(AlterTable { name, alteration })
    }

    fn create_index(&mut self) -> PResult<CreateIndex> {
        self.expect_keyword("CREATE")?;
        let unique = self.eat_keyword("UNIQUE");
        let null_filtered = self.eat_keyword("NULL_FILTERED");
        self.expect_keyword("INDEX")?;
        let if_not_exists = self.eat_keywords(&["IF", "NOT", "EXISTS"]);
        let name = self.path()?;
        self.expect_keyword("ON")?;
        let table_name = self.path()?;
        let keys = self.key_list()?;

        let mut stmt = CreateIndex {
            unique,
            null_filtered,
            if_not_exists,
            name,
            table_name,
            keys,
            ..CreateIndex::default()
        };

        if self.eat_keyword("STORING") {
            stmt.storing = Some(self.ident_list()?);
        }
        while self.eat_symbol(",") {
            self.expect_keyword("INTERLEAVE")?;
            self.expect_keyword("IN")?;
            stmt.interleave_in = Some(self.ident()?);
        }
        if self.eat_keyword("OPTIONS") {
            stmt.options = Some(self.parenthesized_text()?);
        }

        Ok(stmt)
    }

    /// Skip a statement the model does not track, keeping its text.
    fn other_statement(&mut self) -> OtherStatement {
        let start = self.current().start;
        let kind = self
            .tokens
            .iter()
            .skip(self.pos)
            .take(2)
            .take_while(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        let sql = self.rest_of_statement(start);
        OtherStatement { kind, sql }
    }

    // ---------------------------------------------------------------------
    // Clauses
    // ---------------------------------------------------------------------

    fn column_def(&mut self) -> PResult<ColumnDef> {
        let name = self.ident()?;
        let ty = self.schema_type()?;
        let mut column = ColumnDef {
            name,
            ..ColumnDef::new("", ty)
        };

        loop {
            if self.eat_keywords(&["NOT", "NULL"]) {
                column.not_null = true;
            } else if self.eat_keywords(&["PRIMARY", "KEY"]) {
                column.primary_key = true;
            } else if self.eat_keyword("DEFAULT") {
                column.default_expr = Some(self.parenthesized_text()?);
            } else if self.eat_keyword("AS") {
                let expr = self.parenthesized_text()?;
                let stored = self.eat_keyword("STORED");
                column.generated_expr = Some(GeneratedColumn { expr, stored });
            } else if self.eat_keyword("HIDDEN") {
                column.hidden = true;
            } else if self.eat_keyword("OPTIONS") {
                column.options = Some(self.parenthesized_text()?);
            } else {
                return Ok(column);
            }
        }
    }

    fn at_table_constraint(&self) -> bool {
        self.at_keyword("CONSTRAINT")
            || (self.at_keyword("FOREIGN") && self.nth(1).is_keyword("KEY"))
            || (self.at_keyword("CHECK") && self.nth(1).is_symbol("("))
    }

    fn table_constraint(&mut self) -> PResult<TableConstraint> {
        let name = if self.eat_keyword("CONSTRAINT") {
            Some(self.ident()?)
        } else {
            None
        };

        let constraint = if self.eat_keywords(&["FOREIGN", "KEY"]) {
            let columns = self.ident_list()?;
            self.expect_keyword("REFERENCES")?;
            let reference_table = self.path()?;
            let reference_columns = self.ident_list()?;
            let on_delete = self.on_delete()?;
            let enforced = if self.eat_keywords(&["NOT", "ENFORCED"]) {
                false
            } else {
                self.eat_keyword("ENFORCED");
                true
            };
            Constraint::ForeignKey(ForeignKey {
                columns,
                reference_table,
                reference_columns,
                on_delete,
                enforced,
            })
        } else if self.eat_keyword("CHECK") {
            Constraint::Check {
                expr: self.parenthesized_text()?,
            }
        } else {
            return Err(self.expected("FOREIGN KEY or CHECK"));
        };

        Ok(TableConstraint { name, constraint })
    }

    fn cluster(&mut self) -> PResult<Cluster> {
        self.expect_keyword("INTERLEAVE")?;
        self.expect_keyword("IN")?;
        let parent = self.eat_keyword("PARENT");
        let table_name = self.path()?;
        let on_delete = self.on_delete()?;
        Ok(Cluster {
            table_name,
            parent,
            on_delete,
        })
    }

    fn on_delete(&mut self) -> PResult<Option<OnDelete>> {
        if self.eat_keywords(&["ON", "DELETE"]) {
            self.on_delete_action().map(Some)
        } else {
            Ok(None)
        }
    }

    fn on_delete_action(&mut self) -> PResult<OnDelete> {
        if self.eat_keyword("CASCADE") {
            Ok(OnDelete::Cascade)
        } else if self.eat_keywords(&["NO", "ACTION"]) {
            Ok(OnDelete::NoAction)
        } else {
            Err(self.expected("CASCADE or NO ACTION"))
        }
    }

    fn row_deletion_policy(&mut self) -> PResult<RowDeletionPolicy> {
        for keyword in ["ROW", "DELETION", "POLICY"] {
            self.expect_keyword(keyword)?;
        }
        self.expect_symbol("(")?;
        self.expect_keyword("OLDER_THAN")?;
        self.expect_symbol("(")?;
        let column_name = self.ident()?;
        self.expect_symbol(",")?;
        self.expect_keyword("INTERVAL")?;
        let num_days = self.int_value()?;
        self.expect_keyword("DAY")?;
        self.expect_symbol(")")?;
        self.expect_symbol(")")?;
        Ok(RowDeletionPolicy {
            column_name,
            num_days,
        })
    }

    /// `( name [ASC|DESC], ... )`
    fn key_list(&mut self) -> PResult<Vec<IndexKey>> {
        self.expect_symbol("(")?;
        let mut keys = Vec::new();
        while !self.at_symbol(")") {
            let name = self.ident()?;
            let dir = if self.eat_keyword("ASC") {
                Some(SortDirection::Asc)
            } else if self.eat_keyword("DESC") {
                Some(SortDirection::Desc)
            } else {
                None
            };
            keys.push(IndexKey { name, dir });
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")")?;
        Ok(keys)
    }

    fn schema_type(&mut self) -> PResult<SchemaType> {
        if self.at_keyword("ARRAY") && self.nth(1).is_symbol("<") {
            self.advance();
            self.advance();
            let item = self.schema_type()?;
            self.expect_symbol(">")?;
            if self.at_symbol("(") {
                // (vector_length=>N)
                self.parenthesized_text()?;
            }
            return Ok(SchemaType::Array(Box::new(item)));
        }

        if self.at_keyword("STRUCT") && self.nth(1).is_symbol("<") {
            self.advance();
            self.advance();
            let mut fields = Vec::new();
            while !self.at_symbol(">") {
                fields.push(self.struct_field()?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(">")?;
            return Ok(SchemaType::Struct(fields));
        }

        let bare = self.current().kind == TokenKind::Ident;
        let first = self.ident()?;
        if let Some(name) = ScalarTypeName::from_keyword(&first.name).filter(|_| bare) {
            if name.is_sized() && self.eat_symbol("(") {
                let size = if self.eat_keyword("MAX") {
                    TypeSize::Max
                } else {
                    TypeSize::Value(self.int_value()?)
                };
                self.expect_symbol(")")?;
                return Ok(SchemaType::Sized { name, size });
            }
            return Ok(SchemaType::Scalar(name));
        }

        let mut path = vec![first];
        while self.eat_symbol(".") {
            path.push(self.ident()?);
        }
        Ok(SchemaType::Named(path))
    }

    fn struct_field(&mut self) -> PResult<StructField> {
        let next = self.nth(1);
        let named = matches!(self.current().kind, TokenKind::Ident | TokenKind::QuotedIdent)
            && !(next.is_symbol("<") || next.is_symbol(",") || next.is_symbol(">") || next.is_symbol(".") || next.is_symbol("("));
        let name = if named { Some(self.ident()?) } else { None };
        Ok(StructField {
            name,
            ty: self.schema_type()?,
        })
    }

    fn int_value(&mut self) -> PResult<IntValue> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int => {
                self.advance();
                Ok(IntValue::Literal(token.text))
            }
            TokenKind::Param => {
                self.advance();
                Ok(IntValue::Param(token.text))
            }
            _ if token.is_keyword("CAST") => {
                self.advance();
                self.expect_symbol("(")?;
                let inner = self.int_value()?;
                self.expect_keyword("AS")?;
                self.ident()?;
                self.expect_symbol(")")?;
                Ok(IntValue::Cast(Box::new(inner)))
            }
            _ => Err(self.expected("integer, parameter or CAST")),
        }
    }

    // ---------------------------------------------------------------------
    // Names
    // ---------------------------------------------------------------------

    fn ident(&mut self) -> PResult<Ident> {
        match self.current().kind {
            TokenKind::Ident | TokenKind::QuotedIdent => {
                let name = self.current().text.clone();
                self.advance();
                Ok(Ident::new(name))
            }
            _ => Err(self.expected("identifier")),
        }
    }

    fn path(&mut self) -> PResult<Path> {
        let mut idents = vec![self.ident()?];
        while self.eat_symbol(".") {
            idents.push(self.ident()?);
        }
        Ok(Path::new(idents))
    }

    /// `( ident, ... )`, possibly empty.
    fn ident_list(&mut self) -> PResult<Vec<Ident>> {
        self.expect_symbol("(")?;
        let mut idents = Vec::new();
        while !self.at_symbol(")") {
            idents.push(self.ident()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")")?;
        Ok(idents)
    }

    // ---------------------------------------------------------------------
    // Raw text
    // ---------------------------------------------------------------------

    /// Consume a balanced `( ... )` group and return the text inside it.
    fn parenthesized_text(&mut self) -> PResult<String> {
        let open = self.current().clone();
        self.expect_symbol("(")?;
        let mut depth = 1;
        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::Eof => {
                    return Err(SourceError::new(self.source_name, open.line, open.column, "unbalanced '('"));
                }
                TokenKind::Symbol if token.text == "(" => depth += 1,
                TokenKind::Symbol if token.text == ")" => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(self.src[open.end..token.start].trim().to_string());
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume tokens up to the next top-level `;` and return the text from `start`.
    fn rest_of_statement(&mut self, start: usize) -> String {
        let mut depth = 0usize;
        let mut end = start;
        loop {
            let token = self.current();
            if token.kind == TokenKind::Eof || (depth == 0 && token.is_symbol(";")) {
                break;
            }
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth = depth.saturating_sub(1);
            }
            end = token.end;
            self.advance();
        }
        self.src[start..end].trim().to_string()
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    fn current(&self) -> &Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        self.current().is_symbol(symbol)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a keyword sequence only if every word matches.
    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matched = keywords
            .iter()
            .enumerate()
            .all(|(i, keyword)| self.nth(i).is_keyword(keyword));
        if matched {
            for _ in keywords {
                self.advance();
            }
        }
        matched
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.at_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> PResult<()> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.expected(&format!("'{symbol}'")))
        }
    }

    fn expected(&self, what: &str) -> SourceError {
        let token = self.current();
        SourceError::new(
            self.source_name,
            token.line,
            token.column,
            format!("expected {what} but found {}", token.describe()),
        )
    }
}
