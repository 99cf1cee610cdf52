//! Renders bound plans into SQL text plus an ordered parameter list.
//!
//! Values never enter the SQL text: every clause value, and the page slice,
//! becomes a placeholder whose [`BindParam`] is returned alongside.
//!
//! # Example
//!
//! ```ignore
//! let plan = SelectPlan::for_entity::<Product>(predicate)
//!     .order_by("id", true)
//!     .limit(10)
//!     .offset(20);
//! let stmt = QueryBuilder::new(Dialect::Postgres).build_select(&plan)?;
//! ```

use crate::entity::Column;
use crate::filter::{Clause, FilterOp, Predicate};
use crate::param::{BindParam, SqlType};
use crate::plan::{CountPlan, InsertPlan, SelectPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        '"'
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

/// SQL text and the parameters to bind, in placeholder order.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BindParam>,
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

struct Render<'a> {
    builder: &'a QueryBuilder,
    sql: String,
    params: Vec<BindParam>,
}

impl Render<'_> {
    fn push_param(&mut self, param: BindParam) {
        let placeholder = self.builder.dialect.placeholder(self.params.len() + 1);
        self.sql.push_str(&placeholder);
        self.params.push(param);
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

impl QueryBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            identifier_policy: IdentifierPolicy::Validate,
        }
    }

    /// Configure identifier validation/quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn build_select(&self, plan: &SelectPlan) -> Result<Statement, QueryError> {
        if plan.columns.is_empty() {
            return Err(QueryError::EmptyProjection { table: plan.table });
        }
        let table = self.format_identifier(plan.table, "table")?;
        let columns = self.format_column_list(plan.columns)?;
        let mut r = self.render(format!("SELECT {columns} FROM {table}"));
        self.append_where(&mut r, &plan.predicate)?;
        self.append_order(&mut r, &plan.order_by)?;
        append_limit_offset(&mut r, plan.limit, plan.offset)?;
        Ok(r.finish())
    }

    pub fn build_count(&self, plan: &CountPlan) -> Result<Statement, QueryError> {
        let table = self.format_identifier(plan.table, "table")?;
        let mut r = self.render(format!("SELECT COUNT(*) FROM {table}"));
        self.append_where(&mut r, &plan.predicate)?;
        Ok(r.finish())
    }

    /// Build an `INSERT ... RETURNING key` statement.
    pub fn build_insert(&self, plan: &InsertPlan) -> Result<Statement, QueryError> {
        if plan.values.is_empty() {
            return Err(QueryError::EmptyInsert { table: plan.table });
        }
        let table = self.format_identifier(plan.table, "table")?;
        let key = self.format_identifier(plan.key_column, "column")?;
        let mut columns = Vec::with_capacity(plan.values.len());
        for (column, _) in &plan.values {
            if *column == plan.key_column {
                return Err(QueryError::ClientSuppliedKey { column: plan.key_column });
            }
            columns.push(self.format_identifier(column, "column")?);
        }
        let mut r = self.render(format!("INSERT INTO {table} ({}) VALUES (", columns.join(", ")));
        for (idx, (_, param)) in plan.values.iter().enumerate() {
            if idx > 0 {
                r.sql.push_str(", ");
            }
            r.push_param(param.clone());
        }
        r.sql.push_str(&format!(") RETURNING {key}"));
        Ok(r.finish())
    }

    fn render(&self, head: String) -> Render<'_> {
        Render {
            builder: self,
            sql: head,
            params: Vec::new(),
        }
    }

    fn append_where(&self, r: &mut Render<'_>, predicate: &Predicate) -> Result<(), QueryError> {
        if predicate.is_all() {
            return Ok(());
        }
        r.sql.push_str(" WHERE ");
        self.append_predicate(r, predicate)
    }

    fn append_predicate(
        &self,
        r: &mut Render<'_>,
        predicate: &Predicate,
    ) -> Result<(), QueryError> {
        match predicate {
            // only reachable nested, where `Predicate::and`/`or` have already dropped it
            Predicate::All => r.sql.push_str("1 = 1"),
            Predicate::Clause(clause) => self.append_clause(r, clause)?,
            Predicate::And(parts) => self.append_joined(r, parts, " AND ")?,
            Predicate::Or(parts) => {
                r.sql.push('(');
                self.append_joined(r, parts, " OR ")?;
                r.sql.push(')');
            }
        }
        Ok(())
    }

    fn append_joined(
        &self,
        r: &mut Render<'_>,
        parts: &[Predicate],
        separator: &str,
    ) -> Result<(), QueryError> {
        for (idx, part) in parts.iter().enumerate() {
            if idx > 0 {
                r.sql.push_str(separator);
            }
            let nested_and = matches!(part, Predicate::And(_));
            if nested_and {
                r.sql.push('(');
            }
            self.append_predicate(r, part)?;
            if nested_and {
                r.sql.push(')');
            }
        }
        Ok(())
    }

    fn append_clause(&self, r: &mut Render<'_>, clause: &Clause) -> Result<(), QueryError> {
        let col = self.format_identifier(clause.column, "column")?;
        match clause.op {
            FilterOp::Eq => r.sql.push_str(&format!("{col} = ")),
            FilterOp::EqCi => r.sql.push_str(&format!("LOWER({col}) = ")),
            FilterOp::Gte => r.sql.push_str(&format!("{col} >= ")),
            FilterOp::Lte => r.sql.push_str(&format!("{col} <= ")),
            FilterOp::ContainsCi => r.sql.push_str(&format!("LOWER({col}) LIKE ")),
        }
        r.push_param(clause.param.clone());
        if clause.op == FilterOp::ContainsCi {
            r.sql.push_str(" ESCAPE '\\'");
        }
        Ok(())
    }

    fn append_order(
        &self,
        r: &mut Render<'_>,
        order: &[(&'static str, bool)],
    ) -> Result<(), QueryError> {
        if order.is_empty() {
            return Ok(());
        }
        r.sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(order.len());
        for (col, asc) in order {
            let col = self.format_identifier(col, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        r.sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn format_column_list(&self, columns: &[Column]) -> Result<String, QueryError> {
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.format_identifier(col.name, "column")?);
        }
        Ok(out.join(", "))
    }

    fn format_identifier(&self, ident: &str, kind: &'static str) -> Result<String, QueryError> {
        if !is_valid_identifier(ident) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect)),
            IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

fn append_limit_offset(
    r: &mut Render<'_>,
    limit: Option<u64>,
    offset: Option<u64>,
) -> Result<(), QueryError> {
    if let Some(limit) = limit {
        r.sql.push_str(" LIMIT ");
        r.push_param(slice_param("limit", limit)?);
    }
    if let Some(offset) = offset {
        r.sql.push_str(" OFFSET ");
        r.push_param(slice_param("offset", offset)?);
    }
    Ok(())
}

fn slice_param(name: &'static str, value: u64) -> Result<BindParam, QueryError> {
    let value = i64::try_from(value).map_err(|_| QueryError::SliceOutOfRange { name })?;
    BindParam::bind(name, SqlType::Integer, value).map_err(|_| QueryError::SliceOutOfRange { name })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    /// Paging was requested for an entity without an ordering key.
    MissingOrderingKey { table: &'static str },
    EmptyProjection { table: &'static str },
    EmptyInsert { table: &'static str },
    /// The identifier column was supplied by the caller on insert.
    ClientSuppliedKey { column: &'static str },
    SliceOutOfRange { name: &'static str },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::MissingOrderingKey { table } => {
                write!(f, "No ordering key configured for paged reads of {table}")
            }
            QueryError::EmptyProjection { table } => write!(f, "Empty projection for {table}"),
            QueryError::EmptyInsert { table } => write!(f, "No values to insert into {table}"),
            QueryError::ClientSuppliedKey { column } => {
                write!(f, "Key column {column} is assigned by the store")
            }
            QueryError::SliceOutOfRange { name } => write!(f, "{name} is out of range"),
        }
    }
}

impl std::error::Error for QueryError {}

fn is_valid_identifier(ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    ident.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
    }
    true
}

fn quote_identifier(ident: &str, dialect: Dialect) -> String {
    let quote = dialect.quote_char();
    ident
        .split('.')
        .map(|part| format!("{quote}{part}{quote}"))
        .collect::<Vec<_>>()
        .join(".")
}
