use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{split_lookup, Error, LOOKUP_SEP};

/// A scalar (or list of scalars) flowing between the HTTP layer, the domain
/// and a record store.
///
/// Values arriving from query strings start out as [`Value::Text`] and are
/// coerced to the target field's kind before they reach a store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Comparison operator that may terminate a lookup key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupOp {
    Exact,
    IExact,
    Contains,
    IContains,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Range,
    IsNull,
    Search,
    Regex,
    IRegex,
    Year,
    Month,
    Day,
}

impl LookupOp {
    pub const ALL: [LookupOp; 21] = [
        LookupOp::Exact,
        LookupOp::IExact,
        LookupOp::Contains,
        LookupOp::IContains,
        LookupOp::In,
        LookupOp::Gt,
        LookupOp::Gte,
        LookupOp::Lt,
        LookupOp::Lte,
        LookupOp::StartsWith,
        LookupOp::IStartsWith,
        LookupOp::EndsWith,
        LookupOp::IEndsWith,
        LookupOp::Range,
        LookupOp::IsNull,
        LookupOp::Search,
        LookupOp::Regex,
        LookupOp::IRegex,
        LookupOp::Year,
        LookupOp::Month,
        LookupOp::Day,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LookupOp::Exact => "exact",
            LookupOp::IExact => "iexact",
            LookupOp::Contains => "contains",
            LookupOp::IContains => "icontains",
            LookupOp::In => "in",
            LookupOp::Gt => "gt",
            LookupOp::Gte => "gte",
            LookupOp::Lt => "lt",
            LookupOp::Lte => "lte",
            LookupOp::StartsWith => "startswith",
            LookupOp::IStartsWith => "istartswith",
            LookupOp::EndsWith => "endswith",
            LookupOp::IEndsWith => "iendswith",
            LookupOp::Range => "range",
            LookupOp::IsNull => "isnull",
            LookupOp::Search => "search",
            LookupOp::Regex => "regex",
            LookupOp::IRegex => "iregex",
            LookupOp::Year => "year",
            LookupOp::Month => "month",
            LookupOp::Day => "day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Operators comparing the textual form of a value.
    pub fn is_text_match(self) -> bool {
        matches!(
            self,
            LookupOp::IExact
                | LookupOp::Contains
                | LookupOp::IContains
                | LookupOp::StartsWith
                | LookupOp::IStartsWith
                | LookupOp::EndsWith
                | LookupOp::IEndsWith
                | LookupOp::Search
                | LookupOp::Regex
                | LookupOp::IRegex
        )
    }

    /// Operators extracting a date part; their operand is always an integer.
    pub fn is_date_part(self) -> bool {
        matches!(self, LookupOp::Year | LookupOp::Month | LookupOp::Day)
    }
}

impl fmt::Display for LookupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownOperator(s.to_owned()))
    }
}

/// A single field-path comparison, e.g. `author__name__icontains = "ann"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lookup {
    pub path: Vec<String>,
    pub op: LookupOp,
    pub value: Value,
}

impl Lookup {
    pub fn new(path: &str, op: LookupOp, value: impl Into<Value>) -> Self {
        Self {
            path: split_lookup(path).into_iter().map(str::to_owned).collect(),
            op,
            value: value.into(),
        }
    }

    /// Parse a raw query-string pair. A trailing recognised operator is split
    /// off; anything else stays part of the path and is judged by the caller
    /// against the model schema.
    ///
    /// The raw value is kept as text except for `in`/`range` (comma separated
    /// lists) and `isnull` (boolean literal).
    pub fn from_param(key: &str, raw: &str) -> Result<Self, Error> {
        let mut segments = split_lookup(key);
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::EmptyLookup);
        }
        let op = match segments.last().and_then(|s| LookupOp::parse(s)) {
            Some(op) if segments.len() > 1 => {
                segments.pop();
                op
            }
            _ => LookupOp::Exact,
        };
        let value = match op {
            LookupOp::In | LookupOp::Range => {
                Value::List(raw.split(',').map(Value::from).collect())
            }
            LookupOp::IsNull => Value::Bool(parse_isnull(raw)?),
            _ => Value::text(raw),
        };
        Ok(Self {
            path: segments.into_iter().map(str::to_owned).collect(),
            op,
            value,
        })
    }

    pub fn path_str(&self) -> String {
        self.path.join(LOOKUP_SEP)
    }

    /// The key this lookup would carry in a query string.
    pub fn key(&self) -> String {
        format!("{}{LOOKUP_SEP}{}", self.path_str(), self.op)
    }
}

fn parse_isnull(raw: &str) -> Result<bool, Error> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(Error::InvalidValue {
            op: "isnull",
            value: raw.to_owned(),
        }),
    }
}

/// Boolean combination of lookups handed to a record store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Lookup(Lookup),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn lookup(path: &str, op: LookupOp, value: impl Into<Value>) -> Self {
        Expr::Lookup(Lookup::new(path, op, value))
    }

    /// Conjunction that collapses the trivial one-element case.
    pub fn all_of(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut v: Vec<Expr> = exprs.into_iter().collect();
        if v.len() == 1 {
            v.remove(0)
        } else {
            Expr::And(v)
        }
    }

    /// Disjunction that collapses the trivial one-element case.
    pub fn any_of(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut v: Vec<Expr> = exprs.into_iter().collect();
        if v.len() == 1 {
            v.remove(0)
        } else {
            Expr::Or(v)
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Every lookup leaf, depth first.
    pub fn lookups(&self) -> Vec<&Lookup> {
        let mut out = Vec::new();
        self.collect_lookups(&mut out);
        out
    }

    fn collect_lookups<'a>(&'a self, out: &mut Vec<&'a Lookup>) {
        match self {
            Expr::Lookup(l) => out.push(l),
            Expr::And(xs) | Expr::Or(xs) => xs.iter().for_each(|x| x.collect_lookups(out)),
            Expr::Not(x) => x.collect_lookups(out),
        }
    }
}

impl From<Lookup> for Expr {
    fn from(l: Lookup) -> Self {
        Expr::Lookup(l)
    }
}
