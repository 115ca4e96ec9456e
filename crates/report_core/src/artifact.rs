/// Download name used when the server sends no usable disposition.
pub const DEFAULT_FILENAME: &str = "report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Html,
    Other,
}

impl ContentKind {
    /// Classifies a `Content-Type` value. Parameters and case are ignored.
    pub fn from_content_type(content_type: &str) -> Self {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();
        if media.eq_ignore_ascii_case("application/pdf") {
            ContentKind::Pdf
        } else if media.eq_ignore_ascii_case("text/html")
            || media.eq_ignore_ascii_case("application/xhtml+xml")
        {
            ContentKind::Html
        } else {
            ContentKind::Other
        }
    }
}

/// The generated report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Pdf { bytes: Vec<u8> },
    Html { document: String },
    Other { filename: String, bytes: Vec<u8> },
}

impl Artifact {
    pub fn kind(&self) -> ContentKind {
        match self {
            Artifact::Pdf { .. } => ContentKind::Pdf,
            Artifact::Html { .. } => ContentKind::Html,
            Artifact::Other { .. } => ContentKind::Other,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Artifact::Pdf { bytes } | Artifact::Other { bytes, .. } => bytes.len(),
            Artifact::Html { document } => document.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts `filename=` from a `Content-Disposition` header, quotes stripped.
/// Falls back to [`DEFAULT_FILENAME`].
pub fn disposition_filename(header: Option<&str>) -> String {
    header
        .into_iter()
        .flat_map(disposition_params)
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Splits on `;` outside quoted strings, so a quoted value runs to its
/// closing `"`.
fn disposition_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}
