#[cfg(test)]
mod tests {
    use crate::api::listing::*;
    use axum::extract::FromRequestParts;
    use axum::http::{Request, StatusCode};

    #[test]
    fn test_parse_decodes_pairs_in_order() {
        let p = ListingParams::parse("q=hello+world&status__exact=live&p=2").unwrap();
        assert_eq!(
            p.pairs(),
            &[
                ("q".to_string(), "hello world".to_string()),
                ("status__exact".to_string(), "live".to_string()),
                ("p".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_is_last_write_wins() {
        let p = ListingParams::parse("o=1&o=-2").unwrap();
        assert_eq!(p.get("o"), Some("-2"));
        assert_eq!(p.get("missing"), None);
        assert!(p.contains("o"));
    }

    #[test]
    fn test_parse_skips_empty_keys() {
        let p = ListingParams::parse("=x&&a=1").unwrap();
        assert_eq!(p.pairs().len(), 1);
    }

    #[test]
    fn test_parse_budgets() {
        let long = "a=".to_string() + &"x".repeat(MAX_QUERY_LEN);
        assert_eq!(ListingParams::parse(&long), Err(ListingParamsError::TooLong));

        let many: Vec<String> = (0..=MAX_PARAMS).map(|i| format!("k{i}=v")).collect();
        assert_eq!(
            ListingParams::parse(&many.join("&")),
            Err(ListingParamsError::TooMany)
        );

        let key = format!("{}=1", "k".repeat(MAX_KEY_LEN + 1));
        assert_eq!(ListingParams::parse(&key), Err(ListingParamsError::KeyTooLong));
    }

    #[test]
    fn test_with_replaces_in_place() {
        let p = ListingParams::parse("p=3&q=a&p=4").unwrap();
        assert_eq!(p.with("p", "0").to_query_string(), "?p=0&q=a");
        assert_eq!(p.with("o", "1").to_query_string(), "?p=3&q=a&p=4&o=1");
    }

    #[test]
    fn test_without_and_empty_query_string() {
        let p = ListingParams::parse("p=3&q=a").unwrap();
        assert_eq!(p.without(&["p"]).to_query_string(), "?q=a");
        assert_eq!(p.without(&["p", "q"]).to_query_string(), "");
    }

    #[test]
    fn test_query_string_encodes_values() {
        let p = ListingParams::new(vec![("q".into(), "a b&c".into())]);
        assert_eq!(p.to_query_string(), "?q=a+b%26c");
    }

    #[tokio::test]
    async fn test_extractor_reads_uri_query() {
        let request = Request::builder()
            .uri("/admin/modeladmin/blog/article/?q=rust&p=1")
            .body(())
            .unwrap();
        let (mut parts, _body) = request.into_parts();

        let Listing(params) = Listing::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(params.get("q"), Some("rust"));
        assert_eq!(params.get("p"), Some("1"));
    }

    #[tokio::test]
    async fn test_extractor_without_query_is_empty() {
        let request = Request::builder().uri("/x/").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();
        let listing = Listing::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn test_extractor_rejects_over_budget() {
        let uri = format!("/x/?{}", "k=v&".repeat(MAX_PARAMS + 1));
        let request = Request::builder().uri(uri).body(()).unwrap();
        let (mut parts, _body) = request.into_parts();
        let err = Listing::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.0.status, StatusCode::BAD_REQUEST.as_u16());
    }
}
