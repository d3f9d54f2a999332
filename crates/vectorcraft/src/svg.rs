//! Structural post-processing of traced SVG documents.
//!
//! Background removal works on the parsed event stream, never on the
//! serialized text: the first top-level shape carrying a solid fill (and,
//! when it states its geometry, spanning the full canvas) is dropped as a
//! node, everything else is copied through unchanged.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Remove the solid background shape from a traced SVG document.
///
/// Returns the (possibly rewritten) document and whether a background was
/// removed. A document with no matching shape, or one that fails to parse,
/// is returned unmodified; neither case is an error.
pub fn strip_background(svg: &str) -> (String, bool) {
    match rewrite_without_background(svg) {
        Ok(Some(rewritten)) => (rewritten, true),
        Ok(None) => {
            tracing::debug!("No background shape found; document left unmodified");
            (svg.to_string(), false)
        }
        Err(e) => {
            tracing::warn!("SVG could not be parsed for background removal: {e}");
            (svg.to_string(), false)
        }
    }
}

/// Rewrite the document without its background node, or `None` if no
/// top-level shape qualifies.
fn rewrite_without_background(svg: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(svg);
    let mut writer = Writer::new(Vec::new());

    let mut depth = 0usize;
    let mut canvas: Option<(f32, f32)> = None;
    let mut removed = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                if depth == 0 && e.name().as_ref() == b"svg" {
                    canvas = canvas_size(&e);
                }
                if !removed && depth == 1 && is_background_shape(&e, canvas) {
                    // Drop the whole subtree, not just the start tag.
                    reader.read_to_end(e.name())?;
                    removed = true;
                    continue;
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                if !removed && depth == 1 && is_background_shape(&e, canvas) {
                    removed = true;
                    continue;
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            other => writer.write_event(other)?,
        }
    }

    if !removed {
        return Ok(None);
    }
    let bytes = writer.into_inner();
    let rewritten = String::from_utf8(bytes)
        .map_err(|e| quick_xml::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    Ok(Some(rewritten))
}

/// Whether an element is the background candidate: a shape with a solid
/// fill that spans the canvas wherever its geometry is stated.
fn is_background_shape(element: &BytesStart, canvas: Option<(f32, f32)>) -> bool {
    let is_shape = matches!(element.name().as_ref(), b"rect" | b"path" | b"polygon");
    if !is_shape {
        return false;
    }
    let Some(fill) = attribute(element, "fill") else {
        return false;
    };
    if !is_solid_fill(&fill) {
        return false;
    }
    // Rects state their geometry; require full coverage when the canvas
    // size is known. Paths and polygons are accepted by position alone.
    if element.name().as_ref() == b"rect" {
        if let (Some((canvas_w, canvas_h)), Some(w), Some(h)) = (
            canvas,
            numeric_attribute(element, "width"),
            numeric_attribute(element, "height"),
        ) {
            let x = numeric_attribute(element, "x").unwrap_or(0.0);
            let y = numeric_attribute(element, "y").unwrap_or(0.0);
            return x <= 0.5 && y <= 0.5 && w >= canvas_w - 0.5 && h >= canvas_h - 0.5;
        }
    }
    true
}

fn is_solid_fill(fill: &str) -> bool {
    let fill = fill.trim();
    fill.starts_with('#') || fill.starts_with("rgb(")
}

fn canvas_size(svg_element: &BytesStart) -> Option<(f32, f32)> {
    Some((
        numeric_attribute(svg_element, "width")?,
        numeric_attribute(svg_element, "height")?,
    ))
}

fn attribute(element: &BytesStart, key: &str) -> Option<String> {
    element
        .try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

fn numeric_attribute(element: &BytesStart, key: &str) -> Option<f32> {
    attribute(element, key).and_then(|value| value.trim().parse().ok())
}
