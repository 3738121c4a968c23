use listing_core::ast::{Expr, LookupOp};

use crate::domain::lookups::LookupResolver;
use crate::domain::repo::RecordQuery;

/// A `search_fields` entry: an optional mode prefix and a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    pub path: String,
    pub op: LookupOp,
}

impl SearchField {
    /// `^path` starts-with, `=path` exact, `@path` full text, otherwise
    /// contains; all case-insensitive.
    pub fn parse(decl: &str) -> Self {
        let (op, path) = if let Some(rest) = decl.strip_prefix('^') {
            (LookupOp::IStartsWith, rest)
        } else if let Some(rest) = decl.strip_prefix('=') {
            (LookupOp::IExact, rest)
        } else if let Some(rest) = decl.strip_prefix('@') {
            (LookupOp::Search, rest)
        } else {
            (LookupOp::IContains, decl)
        };
        Self {
            path: path.to_owned(),
            op,
        }
    }
}

/// Split on whitespace, keeping quoted phrases together without their quotes.
pub fn split_terms(term: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in term.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Each term must match at least one search field; terms are separate
/// filter steps. Returns the narrowed query and whether any search field
/// crosses a relation.
pub fn apply_search(
    query: RecordQuery,
    term: &str,
    search_fields: &[String],
    resolver: &LookupResolver,
) -> (RecordQuery, bool) {
    let terms = split_terms(term);
    if terms.is_empty() || search_fields.is_empty() {
        return (query, false);
    }
    let fields: Vec<SearchField> = search_fields.iter().map(|f| SearchField::parse(f)).collect();
    let mut query = query;
    for bit in &terms {
        query = query.filter(Expr::any_of(
            fields
                .iter()
                .map(|f| Expr::lookup(&f.path, f.op, bit.as_str())),
        ));
    }
    let needs_distinct = fields.iter().any(|f| resolver.crosses_relation(&f.path));
    (query, needs_distinct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldKind, FieldSpec, ModelSchema, SchemaRegistry};
    use std::sync::Arc;

    fn resolver() -> LookupResolver {
        let mut reg = SchemaRegistry::new();
        reg.register(ModelSchema::new("blog", "tag").field(FieldSpec::new("name", FieldKind::Text)));
        let article = reg.register(
            ModelSchema::new("blog", "article")
                .field(FieldSpec::new("title", FieldKind::Text))
                .field(FieldSpec::new("tags", FieldKind::ManyToMany { to: "blog.tag".into() })),
        );
        LookupResolver::new(article, Arc::new(reg))
    }

    #[test]
    fn prefixes_select_operator() {
        assert_eq!(SearchField::parse("^title").op, LookupOp::IStartsWith);
        assert_eq!(SearchField::parse("=slug").op, LookupOp::IExact);
        assert_eq!(SearchField::parse("@body").op, LookupOp::Search);
        let f = SearchField::parse("author__name");
        assert_eq!((f.op, f.path.as_str()), (LookupOp::IContains, "author__name"));
    }

    #[test]
    fn quoted_phrases_stay_together() {
        assert_eq!(split_terms(r#"  rust "async io" 'a b'  "#), vec!["rust", "async io", "a b"]);
        assert!(split_terms("   ").is_empty());
    }

    #[test]
    fn empty_term_is_identity() {
        let q = RecordQuery::all();
        let (out, distinct) = apply_search(q.clone(), "  ", &["title".into()], &resolver());
        assert_eq!(out, q);
        assert!(!distinct);
        let (out, _) = apply_search(q.clone(), "rust", &[], &resolver());
        assert_eq!(out, q);
    }

    #[test]
    fn one_step_per_term_or_across_fields() {
        let fields = vec!["title".to_owned(), "tags__name".to_owned()];
        let (out, distinct) = apply_search(RecordQuery::all(), "rust tokio", &fields, &resolver());
        assert!(distinct);
        assert_eq!(out.filters.len(), 2);
        assert_eq!(
            out.filters[0],
            Expr::any_of([
                Expr::lookup("title", LookupOp::IContains, "rust"),
                Expr::lookup("tags__name", LookupOp::IContains, "rust"),
            ])
        );
    }

    #[test]
    fn local_fields_do_not_need_distinct() {
        let (_, distinct) = apply_search(RecordQuery::all(), "x", &["^title".into()], &resolver());
        assert!(!distinct);
    }
}
