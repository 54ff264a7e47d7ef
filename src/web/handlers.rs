//! HTTP handlers for the form page and file downloads.

use askama::Template;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE},
        HeaderMap,
    },
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::path::Path as FsPath;
use tokio_util::io::ReaderStream;
use tracing::{info, instrument, warn};

use super::error::WebError;
use super::flash::{self, Message};
use super::AppState;
use crate::utils::{file_display_name, sanitize_filename};
use crate::{ExtractionError, StreamKind};

#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub url: String,
}

/// A link to a saved file
#[derive(Debug, Clone)]
pub struct DownloadLink {
    pub href: String,
    pub name: String,
}

impl DownloadLink {
    fn for_path(kind: StreamKind, path: &FsPath) -> Option<Self> {
        let name = file_display_name(path)?;
        Some(Self {
            href: format!("/download/{}/{}", kind, urlencoding::encode(&name)),
            name,
        })
    }
}

#[derive(Template, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub url: String,
    pub messages: Vec<Message>,
    pub audio_link: Option<DownloadLink>,
    pub video_link: Option<DownloadLink>,
}

/// GET / - empty form, plus any flash message left by a redirect
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    let mut page = IndexPage::default();
    if let Some(message) = state.flash.take(&headers) {
        page.messages.push(message);
    }

    let body = Html(page.render()?);
    if flash::has_cookie(&headers) {
        Ok(([(SET_COOKIE, flash::clear_cookie())], body).into_response())
    } else {
        Ok(body.into_response())
    }
}

/// POST / - run the extraction and render the result
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<Html<String>, WebError> {
    let url = form.url.trim().to_string();
    let mut page = IndexPage {
        url: url.clone(),
        ..Default::default()
    };

    match state.service.resolve(&url).await {
        Ok(selection) => {
            info!(
                audio = %selection.audio.display(),
                video = %selection.video.display(),
                "Extraction finished"
            );
            page.audio_link = DownloadLink::for_path(StreamKind::Audio, &selection.audio);
            page.video_link = DownloadLink::for_path(StreamKind::Video, &selection.video);
            page.messages.push(Message::info("Download complete."));
        }
        Err(err) => {
            match &err {
                ExtractionError::InvalidInput(reason) => info!("Rejected submission: {}", reason),
                ExtractionError::NotFound(kind) => warn!(%url, "No {} stream available", kind),
                ExtractionError::ExtractionFailed(reason) => warn!(%url, "Extraction failed: {}", reason),
            }
            page.messages.push(Message::error(format!("Error: {}", err)));
        }
    }

    Ok(Html(page.render()?))
}

/// GET /download/{kind}/{filename} - stream a saved file as an attachment
#[instrument(skip(state))]
pub async fn download(
    State(state): State<AppState>,
    Path((kind, filename)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let Some(kind) = StreamKind::from_path_segment(&kind) else {
        warn!("Rejected download with unknown kind");
        let cookie = state.flash.set_cookie(&Message::error("Invalid file type."))?;
        return Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response());
    };

    let name = sanitize_filename(&filename);
    if name.is_empty() {
        return Err(WebError::NotFound);
    }

    let path = state.service.storage().dir_for(kind).join(&name);
    let file = tokio::fs::File::open(&path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(WebError::NotFound);
    }

    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    let headers = [
        (CONTENT_TYPE, mime.to_string()),
        (CONTENT_LENGTH, metadata.len().to_string()),
        (CONTENT_DISPOSITION, content_disposition(&name)),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `attachment` disposition with an ASCII fallback and the exact UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn ascii_filename(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let compact = sanitized.trim();
    if compact.is_empty() {
        "download.bin".to_string()
    } else {
        compact.to_string()
    }
}
