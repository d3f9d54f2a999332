//! Export of the traced vector document as a downloadable artifact.

/// Fixed output file name.
pub const EXPORT_FILE_NAME: &str = "vectorcraft-output.svg";

/// Fixed media type for SVG documents.
pub const EXPORT_MEDIA_TYPE: &str = "image/svg+xml";

/// A transient named artifact suitable for a one-shot save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize the current vector result into an artifact.
///
/// Absent result is a no-op, not an error.
pub fn export_artifact(vector_result: Option<&str>) -> Option<Artifact> {
    let svg = vector_result?;
    Some(Artifact {
        file_name: EXPORT_FILE_NAME,
        media_type: EXPORT_MEDIA_TYPE,
        bytes: svg.as_bytes().to_vec(),
    })
}
