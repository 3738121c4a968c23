use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// One ordering key, written `field` (ascending) or `-field` (descending).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

impl OrderKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }

    pub fn parse(token: &str) -> Result<Self, Error> {
        let token = token.trim();
        let (field, dir) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDir::Desc),
            None => (token.strip_prefix('+').unwrap_or(token), SortDir::Asc),
        };
        if field.is_empty() || field.starts_with('-') {
            return Err(Error::InvalidOrderToken(token.to_owned()));
        }
        Ok(Self {
            field: field.to_owned(),
            dir,
        })
    }

    pub fn to_token(&self) -> String {
        match self.dir {
            SortDir::Asc => self.field.clone(),
            SortDir::Desc => format!("-{}", self.field),
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy(pub Vec<OrderKey>);

impl OrderBy {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> &[OrderKey] {
        &self.0
    }

    /// Build from tokens like `["-created", "title"]`, rejecting malformed ones.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|t| OrderKey::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn to_tokens(&self) -> Vec<String> {
        self.0.iter().map(OrderKey::to_token).collect()
    }

    pub fn push(&mut self, key: OrderKey) {
        self.0.push(key);
    }

    pub fn extend(&mut self, other: &OrderBy) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|k| k.field == field)
    }

    /// Append `field` in direction `dir` unless a key on it already exists;
    /// an existing key keeps its own direction.
    #[must_use]
    pub fn ensure_tiebreaker(mut self, field: &str, dir: SortDir) -> Self {
        if !self.contains_field(field) {
            self.0.push(OrderKey {
                field: field.to_owned(),
                dir,
            });
        }
        self
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tokens().join(","))
    }
}

impl FromIterator<OrderKey> for OrderBy {
    fn from_iter<T: IntoIterator<Item = OrderKey>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
