//! Helpers over `roxmltree` for the catalog's `results` documents.

use crate::error::{ImageToolError, Result};
use roxmltree::{Document, Node};

/// Parse a catalog response, turning an embedded `results/error` into an
/// error. "No results" is not an error and yields `Ok(None)`.
pub(crate) fn parse_results(body: &str) -> Result<Option<Document<'_>>> {
    let document = Document::parse(body).map_err(|e| {
        ImageToolError::CatalogUnavailable(format!("Malformed catalog response: {e}"))
    })?;

    let root = document.root_element();
    if root.tag_name().name() != "results" {
        return Err(ImageToolError::CatalogUnavailable(format!(
            "Unexpected catalog response element <{}>",
            root.tag_name().name()
        )));
    }

    if let Some(error) = child(root, "error") {
        let message = child_text(error, "message").unwrap_or_default();
        if message.to_lowercase().starts_with("no results") {
            return Ok(None);
        }
        return Err(ImageToolError::CatalogUnavailable(message));
    }

    Ok(Some(document))
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

pub(crate) fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
