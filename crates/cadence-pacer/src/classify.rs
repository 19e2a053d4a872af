// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps request metadata to a [`RequestCategory`].

use cadence_core::{RequestCategory, RequestMeta};

/// Path fragments checked in order. The first match wins.
const PATH_RULES: &[(&str, RequestCategory)] = &[
    ("/chat", RequestCategory::Chat),
    ("/media", RequestCategory::Media),
    ("/location", RequestCategory::Location),
    ("/search", RequestCategory::Search),
    ("/favorites", RequestCategory::Favorites),
    ("/blocks", RequestCategory::Blocks),
];

/// Classify an outgoing request.
///
/// Profile reads are matched before the generic path rules so that
/// `/profiles/{id}/media` counts against the profile budget. Writes to
/// `/profiles/` and anything unrecognized fall into [`RequestCategory::Other`].
pub fn classify(meta: &RequestMeta) -> RequestCategory {
    let Some(url) = meta.url.as_deref() else {
        tracing::debug!("request without url classified as other");
        return RequestCategory::Other;
    };

    if url.contains("/profiles/") {
        let is_get = meta
            .method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("GET"));
        return if is_get {
            RequestCategory::ProfileFetch
        } else {
            RequestCategory::Other
        };
    }

    PATH_RULES
        .iter()
        .find(|(fragment, _)| url.contains(fragment))
        .map(|(_, category)| *category)
        .unwrap_or(RequestCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> RequestMeta {
        RequestMeta::new(url, "GET")
    }

    #[test]
    fn profile_reads_and_writes() {
        assert_eq!(
            classify(&get("https://api.example.com/v7/profiles/123")),
            RequestCategory::ProfileFetch
        );
        assert_eq!(
            classify(&RequestMeta::new("/v7/profiles/123", "get")),
            RequestCategory::ProfileFetch
        );
        assert_eq!(
            classify(&RequestMeta::new("/v7/profiles/123", "PUT")),
            RequestCategory::Other
        );
        assert_eq!(
            classify(&RequestMeta {
                url: Some("/v7/profiles/123".into()),
                method: None,
            }),
            RequestCategory::Other
        );
    }

    #[test]
    fn profile_rule_precedes_path_rules() {
        assert_eq!(
            classify(&get("/v3/profiles/9/media")),
            RequestCategory::ProfileFetch
        );
    }

    #[test]
    fn path_rules() {
        let cases = [
            ("/v4/chat/send", RequestCategory::Chat),
            ("/v4/media/upload", RequestCategory::Media),
            ("/v4/location", RequestCategory::Location),
            ("/v2/search/cascade", RequestCategory::Search),
            ("/v1/favorites", RequestCategory::Favorites),
            ("/v1/blocks/42", RequestCategory::Blocks),
            ("/v1/settings", RequestCategory::Other),
        ];
        for (url, expected) in cases {
            assert_eq!(classify(&get(url)), expected, "url: {url}");
        }
    }

    #[test]
    fn missing_url_is_other() {
        assert_eq!(classify(&RequestMeta::default()), RequestCategory::Other);
    }
}
