//! File download responses.

use actix_web::HttpResponse;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use chrono::{DateTime, Utc};

use crate::client::Blob;
use crate::models::RulesFormat;

/// Characters browsers refuse in saved file names.
const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if FORBIDDEN_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// File name of a mapping rules export, e.g. `Cohort A Rules - 2024-05-01 10-00-00.csv`.
pub fn rules_filename(dataset: &str, format: RulesFormat, at: DateTime<Utc>) -> String {
    sanitize_filename(&format!(
        "{} Rules - {}.{}",
        dataset,
        at.format("%Y-%m-%d %H-%M-%S"),
        format.extension()
    ))
}

/// Answer with `bytes` as a file attachment.
pub fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(sanitize_filename(filename))],
    };

    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(disposition)
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body(bytes)
}

/// Forward a backend blob, keeping its content type and announced name.
pub fn blob_attachment(blob: Blob, fallback_name: &str) -> HttpResponse {
    let filename = blob
        .filename
        .clone()
        .unwrap_or_else(|| fallback_name.to_string());
    attachment(blob.bytes, &blob.content_type, &filename)
}

/// The `<svg>` element of a diagram response, without any surrounding markup.
pub fn extract_svg(markup: &str) -> Option<&str> {
    let start = markup.find("<svg")?;
    let end = markup.rfind("</svg>")? + "</svg>".len();
    (end > start).then(|| &markup[start..end])
}

/// Serve locally assembled text (JSON, CSV or SVG) as a download.
pub fn text_attachment(text: String, format: RulesFormat, filename: &str) -> HttpResponse {
    attachment(text.into_bytes(), format.content_type(), filename)
}
