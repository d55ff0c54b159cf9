//! File-to-attachment conversion and the request parts built from attachments.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use generation_provider::ContentPart;
use session_store::{new_id, Attachment, AttachmentKind};

use crate::error::AttachmentError;

/// Extensions read as text regardless of their MIME type.
const TEXT_EXTENSIONS: &[&str] = &[
    "js",
    "ts",
    "tsx",
    "jsx",
    "py",
    "java",
    "c",
    "cpp",
    "h",
    "json",
    "md",
    "css",
    "html",
    "xml",
    "sql",
    "txt",
    "env",
    "gitignore",
];

const DEFAULT_TEXT_MIME: &str = "text/plain";
const DEFAULT_BINARY_MIME: &str = "application/octet-stream";

/// Outcome of reading several paths; one unreadable file never drops the others.
#[derive(Debug, Default)]
pub struct AttachmentBatch {
    pub attachments: Vec<Attachment>,
    pub rejected: Vec<AttachmentError>,
}

pub fn read_attachments<I, P>(paths: I) -> AttachmentBatch
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut batch = AttachmentBatch::default();
    for path in paths {
        match read_attachment(path.as_ref()) {
            Ok(attachment) => batch.attachments.push(attachment),
            Err(error) => {
                tracing::warn!(%error, "attachment skipped");
                batch.rejected.push(error);
            }
        }
    }
    batch
}

/// Reads one file into an attachment.
///
/// Text-like files keep their UTF-8 text as payload; anything else becomes a base64
/// `data:` URI.
pub fn read_attachment(path: &Path) -> Result<Attachment, AttachmentError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AttachmentError::MissingName {
            path: path.to_path_buf(),
        })?;
    let bytes = fs::read(path).map_err(|source| AttachmentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(attachment_from_bytes(&name, &bytes))
}

/// Classifies raw file content by name and bytes.
#[must_use]
pub fn attachment_from_bytes(name: &str, bytes: &[u8]) -> Attachment {
    let extension = extension_of(name);
    let guessed_mime = extension.as_deref().and_then(mime_for_extension);

    let text_like = guessed_mime.is_some_and(|mime| mime.starts_with("text/"))
        || extension
            .as_deref()
            .is_some_and(|extension| TEXT_EXTENSIONS.contains(&extension))
        || (guessed_mime.is_none() && std::str::from_utf8(bytes).is_ok());

    if text_like {
        return Attachment {
            id: new_id(),
            name: name.to_string(),
            kind: AttachmentKind::Code,
            mime_type: guessed_mime.unwrap_or(DEFAULT_TEXT_MIME).to_string(),
            payload: String::from_utf8_lossy(bytes).into_owned(),
        };
    }

    let mime_type = guessed_mime.unwrap_or(DEFAULT_BINARY_MIME);
    let kind = if mime_type.starts_with("image/") {
        AttachmentKind::Image
    } else if mime_type == "application/pdf" {
        AttachmentKind::Pdf
    } else {
        AttachmentKind::Text
    };

    Attachment {
        id: new_id(),
        name: name.to_string(),
        kind,
        mime_type: mime_type.to_string(),
        payload: format!("data:{mime_type};base64,{}", BASE64.encode(bytes)),
    }
}

/// Builds the request parts for one user turn: every attachment in order, then the
/// prompt when it is non-empty.
#[must_use]
pub fn content_parts(attachments: &[Attachment], prompt: &str) -> Vec<ContentPart> {
    let mut parts: Vec<ContentPart> = attachments
        .iter()
        .map(attachment_part)
        .collect();

    if !prompt.is_empty() {
        parts.push(ContentPart::text(prompt));
    }
    parts
}

/// Code attachments always travel as a named text part. Other kinds carry a data URI
/// and travel as inline data; a payload that is not a data URI falls back to text.
fn attachment_part(attachment: &Attachment) -> ContentPart {
    let inline = match attachment.kind {
        AttachmentKind::Code => None,
        AttachmentKind::Image | AttachmentKind::Pdf | AttachmentKind::Text => {
            split_data_uri(&attachment.payload)
        }
    };

    match inline {
        Some((mime_type, data)) => ContentPart::InlineData {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        },
        None => ContentPart::text(format!(
            "\n\nFile: {}\n{}\n\n",
            attachment.name, attachment.payload
        )),
    }
}

/// Splits `data:<mime>;base64,<body>` into its MIME type and body.
fn split_data_uri(payload: &str) -> Option<(&str, &str)> {
    let rest = payload.strip_prefix("data:")?;
    let (header, body) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    Some((mime_type, body))
}

fn extension_of(name: &str) -> Option<String> {
    let extension = Path::new(name)
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
    // Dotfiles such as `.gitignore` and `.env` carry their type in the stem.
    extension.or_else(|| {
        name.strip_prefix('.')
            .filter(|stem| !stem.is_empty() && !stem.contains('.'))
            .map(str::to_ascii_lowercase)
    })
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "txt" | "env" | "gitignore" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "jsx" => "text/javascript",
        "ts" | "tsx" => "text/typescript",
        "py" => "text/x-python",
        "java" => "text/x-java",
        "c" | "h" => "text/x-c",
        "cpp" | "hpp" | "cc" => "text/x-c++",
        "rs" => "text/x-rust",
        "sql" => "text/x-sql",
        "xml" => "text/xml",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

/// Expands a `/attach` argument list into paths, relative to the working directory.
#[must_use]
pub fn attach_paths(arguments: &str) -> Vec<PathBuf> {
    arguments.split_whitespace().map(PathBuf::from).collect()
}
