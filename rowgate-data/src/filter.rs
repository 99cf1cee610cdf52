//! Composition of optional filters into one bound predicate.

use crate::entity::Column;
use crate::error::DataError;
use crate::param::{BindParam, SqlType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Equality on lowercased text.
    EqCi,
    Gte,
    Lte,
    /// Case-insensitive substring match.
    ContainsCi,
}

/// One bound comparison against a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: &'static str,
    pub op: FilterOp,
    pub param: BindParam,
}

/// A composed boolean condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Selects every record. Rendered as no `WHERE` at all.
    All,
    Clause(Clause),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn clause(column: &Column, op: FilterOp, param: BindParam) -> Self {
        Predicate::Clause(Clause {
            column: column.name,
            op,
            param,
        })
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// AND the given predicates, dropping `All` members and flattening
    /// single-member conjunctions.
    pub fn and(parts: Vec<Predicate>) -> Self {
        join(parts, Predicate::And)
    }

    pub fn or(parts: Vec<Predicate>) -> Self {
        join(parts, Predicate::Or)
    }

    /// Visit every bound parameter in rendering order.
    pub fn params(&self) -> Vec<&BindParam> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a BindParam>) {
        match self {
            Predicate::All => {}
            Predicate::Clause(c) => out.push(&c.param),
            Predicate::And(parts) | Predicate::Or(parts) => {
                for p in parts {
                    p.collect_params(out);
                }
            }
        }
    }
}

fn join(parts: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    let mut parts: Vec<_> = parts.into_iter().filter(|p| !p.is_all()).collect();
    match parts.len() {
        0 => Predicate::All,
        1 => parts.remove(0),
        _ => wrap(parts),
    }
}

#[derive(Debug, Clone)]
struct Filter {
    column: Column,
    op: FilterOp,
    value: Value,
}

#[derive(Debug, Clone)]
struct Search {
    columns: Vec<Column>,
    term: Option<String>,
}

/// An ordered set of optional filters.
///
/// Absent values (`None`, `Value::Null`, empty text) are dropped when the
/// filters are composed, so they never turn into a clause.
///
/// # Example
///
/// ```ignore
/// let predicate = FilterSpec::new()
///     .eq(CATEGORY, query.category.clone())
///     .gte(PRICE, query.min_price)
///     .lte(PRICE, query.max_price)
///     .contains_any(&[NAME, DESCRIPTION], query.search_term.clone())
///     .compose()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    filters: Vec<Filter>,
    searches: Vec<Search>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.push(column, FilterOp::Eq, value.into())
    }

    /// Text equality ignoring case.
    pub fn eq_ignore_case(self, column: Column, value: Option<impl Into<String>>) -> Self {
        let value = value.map(|v| v.into().to_lowercase());
        self.push(column, FilterOp::EqCi, value.into())
    }

    /// Inclusive lower bound.
    pub fn gte(self, column: Column, value: impl Into<Value>) -> Self {
        self.push(column, FilterOp::Gte, value.into())
    }

    /// Inclusive upper bound.
    pub fn lte(self, column: Column, value: impl Into<Value>) -> Self {
        self.push(column, FilterOp::Lte, value.into())
    }

    pub fn contains(self, column: Column, term: Option<impl Into<String>>) -> Self {
        self.contains_any(&[column], term)
    }

    /// Match records where any of `columns` contains `term`, ignoring case.
    ///
    /// Each call adds its own group; groups are ANDed with each other.
    pub fn contains_any(mut self, columns: &[Column], term: Option<impl Into<String>>) -> Self {
        self.searches.push(Search {
            columns: columns.to_vec(),
            term: term.map(Into::into),
        });
        self
    }

    fn push(mut self, column: Column, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value,
        });
        self
    }

    /// `true` when composing would select every record.
    pub fn is_empty(&self) -> bool {
        let no_filters = self.filters.iter().all(|f| f.value.is_absent());
        let no_search = self
            .searches
            .iter()
            .all(|s| s.term.as_deref().map_or(true, str::is_empty) || s.columns.is_empty());
        no_filters && no_search
    }

    /// Bind every present filter and AND them together.
    ///
    /// `min > max` style contradictions are passed through as-is and simply
    /// select nothing.
    pub fn compose(&self) -> Result<Predicate, DataError> {
        let mut parts = Vec::with_capacity(self.filters.len() + self.searches.len());
        for filter in &self.filters {
            if filter.value.is_absent() {
                continue;
            }
            let param = filter.column.bind(filter.value.clone())?;
            parts.push(Predicate::clause(&filter.column, filter.op, param));
        }
        for search in &self.searches {
            if let Some(term) = search.term.as_deref().filter(|t| !t.is_empty()) {
                parts.push(compose_search(&search.columns, term)?);
            }
        }
        Ok(Predicate::and(parts))
    }
}

fn compose_search(columns: &[Column], term: &str) -> Result<Predicate, DataError> {
    if columns.is_empty() {
        return Ok(Predicate::All);
    }
    let widest = columns
        .iter()
        .map(|c| c.ty)
        .try_fold(0usize, |acc, ty| match ty {
            SqlType::VarChar(n) => Ok(acc.max(n)),
            SqlType::Text => Ok(usize::MAX),
            other => Err(other),
        })
        .map_err(|ty| {
            DataError::invalid_parameter("search", format!("cannot search a {} column", ty.name()))
        })?;
    if term.chars().count() > widest {
        return Err(DataError::invalid_parameter(
            "search",
            format!("exceeds {widest} characters"),
        ));
    }
    let pattern = like_pattern(term);
    let mut alternatives = Vec::with_capacity(columns.len());
    for column in columns {
        let param = BindParam::bind(column.name, SqlType::Text, pattern.as_str())?;
        alternatives.push(Predicate::clause(column, FilterOp::ContainsCi, param));
    }
    Ok(Predicate::or(alternatives))
}

/// Lowercase `term`, escape LIKE wildcards with `\`, and wrap it in `%`.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
