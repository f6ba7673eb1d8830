use url::Url;

const WWW_PREFIX: &str = "www.";
const ROOT_PATH_VARIANTS: &[&str] = &["/index.html", "/home"];

/// Returns the lookup keys for a failed URL, original first.
///
/// Order is significant: the winner of a rescue is the first variant, in this
/// order, that has a snapshot.
pub fn url_variants(original: &str) -> Vec<String> {
    let mut variants = Vec::with_capacity(1 + 3 + ROOT_PATH_VARIANTS.len());
    variants.push(original.to_string());
    variants.extend(derived_variants(original));
    variants
}

/// Alternate forms of `original`: `www.` toggle, scheme toggle, both, and for
/// root paths a couple of common landing pages.
///
/// Unparseable URLs and non-HTTP schemes have no derived variants.
pub fn derived_variants(original: &str) -> Vec<String> {
    let Ok(url) = Url::parse(original) else {
        return Vec::new();
    };
    let other_scheme = match url.scheme() {
        "http" => "https",
        "https" => "http",
        _ => return Vec::new(),
    };
    let Some(host) = url.host_str() else {
        return Vec::new();
    };
    let toggled_host = match host.strip_prefix(WWW_PREFIX) {
        Some(bare) => bare.to_string(),
        None => format!("{WWW_PREFIX}{host}"),
    };

    let mut variants = Vec::new();

    let mut www = url.clone();
    if www.set_host(Some(&toggled_host)).is_ok() {
        variants.push(www.to_string());
    }

    let mut scheme = url.clone();
    if scheme.set_scheme(other_scheme).is_ok() {
        variants.push(scheme.to_string());
    }

    let mut combined = url.clone();
    if combined.set_scheme(other_scheme).is_ok() && combined.set_host(Some(&toggled_host)).is_ok()
    {
        variants.push(combined.to_string());
    }

    if is_root_path(&url) {
        for path in ROOT_PATH_VARIANTS {
            let mut with_path = url.clone();
            with_path.set_path(path);
            variants.push(with_path.to_string());
        }
    }

    variants
}

fn is_root_path(url: &Url) -> bool {
    matches!(url.path(), "" | "/")
}
