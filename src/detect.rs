//! NF-e input detection.
//!
//! Producers deliver either a bare `<NFe>` document or the authorized
//! `<nfeProc>` envelope that wraps the `NFe` together with its protocol
//! block. Both shapes extract identically; this module only sniffs which
//! one arrived, without a full parse.

/// Shape of an NF-e input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// The `<nfeProc>` envelope produced after authorization.
    NfeProc,
    /// A bare `<NFe>` document (e.g. still pending authorization).
    Nfe,
}

impl std::fmt::Display for DocKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocKind::NfeProc => write!(f, "nfeProc"),
            DocKind::Nfe => write!(f, "NFe"),
        }
    }
}

/// How far into the input to look for the root tag.
const SNIFF_WINDOW: usize = 512;

/// Detect the document shape from raw XML text.
///
/// Returns `None` when neither root tag appears near the start of the
/// input. This is a cheap pre-check only; the extractor itself locates
/// `infNFe` by local name and is the authority on whether the document is
/// usable.
pub fn detect_kind(xml: &str) -> Option<DocKind> {
    let head: String = xml.chars().take(SNIFF_WINDOW).collect();
    // Namespace prefixes vary, so match on the local part of the tag.
    for tag in tag_names(&head) {
        let local = tag.rsplit(':').next().unwrap_or(tag);
        match local {
            "nfeProc" => return Some(DocKind::NfeProc),
            "NFe" => return Some(DocKind::Nfe),
            _ => {}
        }
    }
    None
}

/// Check whether raw text looks like an NF-e document.
pub fn is_nfe_xml(xml: &str) -> bool {
    detect_kind(xml).is_some()
}

/// Iterate the element names opened in a fragment, skipping the XML
/// declaration, comments, and processing instructions.
fn tag_names(fragment: &str) -> impl Iterator<Item = &str> {
    fragment.split('<').skip(1).filter_map(|chunk| {
        let name: &str = chunk
            .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .next()?;
        if name.is_empty() || name.starts_with('?') || name.starts_with('!') {
            None
        } else {
            Some(name)
        }
    })
}
