use pretty_assertions::assert_eq;
use rescue_core::{derived_variants, url_variants};

#[test]
fn bare_host_yields_four_variants_in_order() {
    assert_eq!(
        url_variants("http://example.com/missing"),
        vec![
            "http://example.com/missing",
            "http://www.example.com/missing",
            "https://example.com/missing",
            "https://www.example.com/missing",
        ]
    );
}

#[test]
fn www_host_is_stripped_symmetrically() {
    assert_eq!(
        url_variants("https://www.example.com/page"),
        vec![
            "https://www.example.com/page",
            "https://example.com/page",
            "http://www.example.com/page",
            "http://example.com/page",
        ]
    );
}

#[test]
fn root_path_adds_landing_pages() {
    let variants = url_variants("https://example.com/");
    assert_eq!(
        variants,
        vec![
            "https://example.com/",
            "https://www.example.com/",
            "http://example.com/",
            "http://www.example.com/",
            "https://example.com/index.html",
            "https://example.com/home",
        ]
    );
}

#[test]
fn empty_path_counts_as_root() {
    let variants = url_variants("http://example.com");
    assert_eq!(variants.len(), 6);
    // The original is kept verbatim; derived forms are normalized.
    assert_eq!(variants[0], "http://example.com");
    assert_eq!(variants[4], "http://example.com/index.html");
    assert_eq!(variants[5], "http://example.com/home");
}

#[test]
fn query_and_fragment_survive_toggles() {
    let derived = derived_variants("http://example.com/search?q=rust#top");
    assert_eq!(derived.len(), 3);
    assert!(derived
        .iter()
        .all(|variant| variant.ends_with("/search?q=rust#top")));
}
