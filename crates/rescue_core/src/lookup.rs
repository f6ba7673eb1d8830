/// Outcome of one archive lookup for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub variant: String,
    pub archived_url: Option<String>,
}

impl LookupResult {
    pub fn found(variant: impl Into<String>, archived_url: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            archived_url: Some(archived_url.into()),
        }
    }

    pub fn missing(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            archived_url: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.archived_url.is_some()
    }
}

/// The rescue target: a variant and the snapshot that was found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub variant: String,
    pub archived_url: String,
}

/// Picks the first successful lookup in insertion order.
///
/// `results` must be in the same order as the variants were generated; the
/// choice never depends on which request finished first.
pub fn select_winner(results: &[LookupResult]) -> Option<Winner> {
    results.iter().find_map(|result| {
        result.archived_url.as_ref().map(|archived_url| Winner {
            variant: result.variant.clone(),
            archived_url: archived_url.clone(),
        })
    })
}
