//! Classification of raw `play` input.
//!
//! Pure: nothing here talks to the node or the catalog.

use encore_core::catalog::CatalogListKind;
use encore_core::error::DomainError;
use url::Url;

/// Search prefixes the node understands.
pub const SEARCH_PREFIXES: [&str; 3] = ["ytsearch:", "ytmsearch:", "scsearch:"];

/// Prefix given to free text.
pub const DEFAULT_SEARCH_PREFIX: &str = "ytsearch:";

const CATALOG_HOST: &str = "open.spotify.com";
const CATALOG_URI_SCHEME: &str = "spotify";

/// An entity in the music catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRef {
    /// A single track.
    Track(String),
    /// An album or playlist.
    List(CatalogListKind, String),
}

/// What a piece of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// A catalog link; needs a catalog lookup.
    Catalog(CatalogRef),
    /// Any other web link.
    Url(String),
    /// A search expression that already carries a node prefix.
    Prefixed(String),
    /// Free text to be searched.
    Text(String),
}

impl ParsedInput {
    /// Search expression for prefixed input or free text.
    #[must_use]
    pub fn search_expression(&self) -> Option<String> {
        match self {
            Self::Prefixed(expression) => Some(expression.clone()),
            Self::Text(text) => Some(format!("{DEFAULT_SEARCH_PREFIX}{text}")),
            Self::Catalog(_) | Self::Url(_) => None,
        }
    }
}

/// Removes the `<...>` wrapping chat clients use to suppress link previews.
#[must_use]
pub fn strip_link_suppression(input: &str) -> &str {
    input
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim()
}

/// Classifies `input`.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for empty input or a catalog link
/// to an entity that cannot be queued (artist, show, ...).
pub fn classify(input: &str) -> Result<ParsedInput, DomainError> {
    let input = strip_link_suppression(input);
    if input.is_empty() {
        return Err(DomainError::InvalidArgument(
            "nothing to play: input is empty".to_owned(),
        ));
    }

    if let Some(rest) = input
        .strip_prefix(CATALOG_URI_SCHEME)
        .and_then(|r| r.strip_prefix(':'))
    {
        let mut parts = rest.split(':');
        let kind = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        return catalog_ref(kind, id).map(ParsedInput::Catalog);
    }

    if let Ok(url) = Url::parse(input)
        && matches!(url.scheme(), "http" | "https")
    {
        if url.host_str() == Some(CATALOG_HOST) {
            let mut segments = url
                .path_segments()
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty() && !s.starts_with("intl-"));
            let kind = segments.next().unwrap_or_default();
            let id = segments.next().unwrap_or_default();
            return catalog_ref(kind, id).map(ParsedInput::Catalog);
        }
        return Ok(ParsedInput::Url(input.to_owned()));
    }

    if SEARCH_PREFIXES.iter().any(|p| input.starts_with(p)) {
        return Ok(ParsedInput::Prefixed(input.to_owned()));
    }

    Ok(ParsedInput::Text(input.to_owned()))
}

fn catalog_ref(kind: &str, id: &str) -> Result<CatalogRef, DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidArgument(format!(
            "catalog link has no {kind} id"
        )));
    }
    let id = id.to_owned();
    match kind {
        "track" => Ok(CatalogRef::Track(id)),
        "album" => Ok(CatalogRef::List(CatalogListKind::Album, id)),
        "playlist" => Ok(CatalogRef::List(CatalogListKind::Playlist, id)),
        other => Err(DomainError::InvalidArgument(format!(
            "catalog links to '{other}' cannot be queued"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_track_link_with_locale_and_query() {
        let parsed =
            classify("<https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC?si=abc>")
                .unwrap();

        assert_eq!(
            parsed,
            ParsedInput::Catalog(CatalogRef::Track("4uLU6hMCjMI75M1A2tKUQC".to_owned()))
        );
    }

    #[test]
    fn test_catalog_uri_playlist() {
        let parsed = classify("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M").unwrap();

        assert_eq!(
            parsed,
            ParsedInput::Catalog(CatalogRef::List(
                CatalogListKind::Playlist,
                "37i9dQZF1DXcBWIGoYBM5M".to_owned()
            ))
        );
    }

    #[test]
    fn test_catalog_artist_link_is_rejected() {
        let result = classify("https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF");

        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_other_links_are_kept_verbatim() {
        let parsed = classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();

        assert_eq!(
            parsed,
            ParsedInput::Url("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned())
        );
    }

    #[test]
    fn test_prefixed_search_is_kept_as_is() {
        let parsed = classify("scsearch:lofi beats").unwrap();

        assert_eq!(
            parsed.search_expression().as_deref(),
            Some("scsearch:lofi beats")
        );
    }

    #[test]
    fn test_free_text_gets_default_prefix() {
        let parsed = classify("  never gonna give you up ").unwrap();

        assert_eq!(
            parsed.search_expression().as_deref(),
            Some("ytsearch:never gonna give you up")
        );
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert!(matches!(
            classify(" <> "),
            Err(DomainError::InvalidArgument(_))
        ));
    }
}
