//! Serving files from disk.

use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::server::{Error, Response, StatusLine, StatusCode, HTTP_1_1};

/// The content type for a file, guessed from its extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "css" => "text/css",
        "gif" => "image/gif",
        "html" => "text/html; charset=UTF-8",
        "jpeg" | "jpg" => "image/jpeg",
        "js" => "text/javascript; charset=UTF-8",
        "png" => "image/png",
        "text" => "text/plain; charset=UTF-8",
        _ => return None,
    };
    Some(content_type)
}

/// Map a request target onto a file under `root`.
///
/// `/` maps to `index.html`. Anything after `?` or `#` is ignored. Targets
/// that would climb out of `root` map to nothing.
pub fn resolve_path(root: impl AsRef<Path>, uri: &str) -> Option<PathBuf> {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let relative = match path.trim_start_matches('/') {
        "" => "index.html",
        rest => rest,
    };

    let relative = Path::new(relative);
    if !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        return None;
    }
    Some(root.as_ref().join(relative))
}

/// Serve a file with a content type guessed from its extension.
pub async fn serve_file(path: impl AsRef<Path>, response: &mut Response) -> Result<(), Error> {
    let path = path.as_ref();
    serve_file_with_type(path, response, content_type_for(path)).await
}

/// Serve a file as the response body and flush.
///
/// Answers `404 No such resource` if `path` is not a regular file. Otherwise
/// answers `200 OK` with `Content-Length` and, when given, `Content-Type`.
pub async fn serve_file_with_type(
    path: impl AsRef<Path>,
    response: &mut Response,
    content_type: Option<&str>,
) -> Result<(), Error> {
    let path = path.as_ref();

    let is_file = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };
    if !is_file {
        debug!("No file at {}", path.display());
        return not_found(response).await;
    }

    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();

    if let Some(content_type) = content_type {
        response.add_header("Content-Type", content_type)?;
    }
    response.add_header("Content-Length", length.to_string())?;
    response.set_body(Some(Box::new(file)))?;
    response.set_status_line(StatusCode::Ok)?;
    response.flush().await
}

async fn not_found(response: &mut Response) -> Result<(), Error> {
    response.set_status_line(StatusLine::new(HTTP_1_1, 404, "No such resource"))?;
    response.flush().await
}
