use pretty_assertions::assert_eq;
use rescue_core::{
    parse_status_page_url, status_page_url, SearchState, StatusPageError, StatusUpdate,
    DEFAULT_STATUS_PAGE_BASE,
};

#[test]
fn found_state_is_encoded_in_query() {
    let update = StatusUpdate::new(
        "http://example.com/missing",
        SearchState::Found {
            variant: "https://www.example.com/missing".to_string(),
            archived_url: "https://web.archive.org/web/2020/https://www.example.com/missing"
                .to_string(),
        },
    );
    let address = status_page_url(DEFAULT_STATUS_PAGE_BASE, &update).unwrap();

    assert!(address.starts_with("wayback-rescue://status/wayback-search.html?state=found&url="));
    assert!(address.contains("&variant=https%3A%2F%2Fwww.example.com%2Fmissing"));
    assert_eq!(parse_status_page_url(&address).unwrap(), update);
}

#[test]
fn variant_count_and_error_text_are_carried() {
    let checking = StatusUpdate::new(
        "https://example.com/",
        SearchState::CheckingVariants { count: 6 },
    );
    let address = status_page_url(DEFAULT_STATUS_PAGE_BASE, &checking).unwrap();
    assert!(address.contains("count=6"));
    assert_eq!(parse_status_page_url(&address).unwrap(), checking);

    let failed = StatusUpdate::new(
        "https://example.com/",
        SearchState::Error {
            message: "tab went away & never came back".to_string(),
        },
    );
    let address = status_page_url(DEFAULT_STATUS_PAGE_BASE, &failed).unwrap();
    assert_eq!(parse_status_page_url(&address).unwrap(), failed);
}

#[test]
fn missing_state_defaults_to_searching() {
    let parsed = parse_status_page_url("wayback-rescue://status/wayback-search.html").unwrap();
    assert_eq!(parsed.state, SearchState::Searching);
    assert_eq!(parsed.original_url, None);

    let parsed =
        parse_status_page_url("wayback-rescue://status/page?state=variant&url=").unwrap();
    assert_eq!(parsed.state, SearchState::Searching);
    assert_eq!(parsed.original_url, None);
}

#[test]
fn error_without_message_uses_placeholder() {
    let parsed =
        parse_status_page_url("wayback-rescue://status/page?state=error&url=http%3A%2F%2Fa.b%2F")
            .unwrap();
    assert_eq!(
        parsed.state,
        SearchState::Error {
            message: "Unknown error".to_string()
        }
    );
    assert_eq!(parsed.original_url.as_deref(), Some("http://a.b/"));
}

#[test]
fn malformed_addresses_are_rejected() {
    assert!(matches!(
        parse_status_page_url("no scheme here"),
        Err(StatusPageError::InvalidUrl(_))
    ));
    assert_eq!(
        parse_status_page_url("wayback-rescue://status/page?state=found&url=x"),
        Err(StatusPageError::MissingParameter("archive"))
    );
    assert_eq!(
        parse_status_page_url("wayback-rescue://status/page?state=variants&count=many"),
        Err(StatusPageError::InvalidCount("many".to_string()))
    );
}
