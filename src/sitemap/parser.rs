//! Sitemap XML parser
//!
//! Parses sitemap documents with namespace resolution. Only elements bound to
//! the sitemap protocol namespace are recognised, so a document that omits the
//! `xmlns` declaration yields no locations.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

/// Namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors raised while parsing a sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Malformed sitemap XML: {0}")]
    Xml(String),

    #[error("Failed to fetch sitemap: {0}")]
    Fetch(String),
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A sitemap index listing child sitemap locations
    Index(Vec<String>),

    /// A urlset listing page locations
    UrlSet(Vec<String>),
}

/// Parses a sitemap or sitemap index
///
/// `<sitemap><loc>` entries directly under the root make the document an
/// index; otherwise the `<url><loc>` entries form a urlset. Locations keep
/// document order.
///
/// # Arguments
///
/// * `xml` - Raw sitemap XML
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The parsed document
/// * `Err(SitemapError)` - The XML was malformed
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let namespace = Namespace(SITEMAP_NAMESPACE.as_bytes());
    let mut buf = Vec::new();

    // Local names of open elements; None for elements outside the sitemap namespace
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut child_sitemaps = Vec::new();
    let mut pages = Vec::new();
    let mut current_loc = String::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let in_namespace = matches!(ns, ResolveResult::Bound(bound) if bound == namespace);
                stack.push(in_namespace.then_some(local));
                current_loc.clear();
            }
            Ok((_, Event::Empty(_))) => {}
            Ok((_, Event::Text(e))) => {
                if is_loc(&stack) {
                    let text = e
                        .unescape()
                        .map_err(|err| SitemapError::Xml(err.to_string()))?;
                    current_loc.push_str(text.trim());
                }
            }
            Ok((_, Event::CData(e))) => {
                if is_loc(&stack) {
                    current_loc.push_str(String::from_utf8_lossy(&e).trim());
                }
            }
            Ok((_, Event::End(_))) => {
                if is_loc(&stack) && !current_loc.is_empty() {
                    match parent_name(&stack) {
                        Some("sitemap") => child_sitemaps.push(current_loc.clone()),
                        Some("url") => pages.push(current_loc.clone()),
                        _ => {}
                    }
                }
                current_loc.clear();
                stack.pop();
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(SitemapError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(SitemapError::Xml("unexpected end of document".to_string()));
    }

    if child_sitemaps.is_empty() {
        Ok(SitemapDocument::UrlSet(pages))
    } else {
        Ok(SitemapDocument::Index(child_sitemaps))
    }
}

/// True when the innermost open element is a namespaced `<loc>` two levels below the root
fn is_loc(stack: &[Option<String>]) -> bool {
    stack.len() == 3 && stack[2].as_deref() == Some("loc")
}

fn parent_name(stack: &[Option<String>]) -> Option<&str> {
    stack.get(1).and_then(|name| name.as_deref())
}
