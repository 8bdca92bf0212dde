//! Static-file serving rooted at the document root.
//!
//! This is the router's fallback: everything that is not the API endpoint
//! lands here, including unsupported methods on the API path. The semantics
//! are the boring, expected ones — index files for directories, a generated
//! listing when there is none, `301` to the slashed URL so relative links
//! keep working, `404` for anything missing.
//!
//! Path traversal is rejected outright: a `..` component anywhere in the
//! decoded path is a `404`, never a resolution outside the root.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::{Method, StatusCode};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tracing::debug;

use crate::request::Request;
use crate::response::Response;

/// Index files tried, in order, when a directory is requested.
const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// Characters escaped when a file name is embedded in a listing href.
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Serves one request from the document root.
///
/// Handles `GET` and `HEAD` (hyper omits the body bytes for `HEAD` on its
/// own, headers included Content-Length stay those of the full response).
/// Any other method that fell through the router gets `501`.
pub async fn serve(root: Arc<PathBuf>, req: Request) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Response::builder()
            .status(StatusCode::NOT_IMPLEMENTED)
            .text(format!("Unsupported method ({})", req.method()));
    }

    let Some(relative) = sanitize_path(req.path()) else {
        debug!(path = req.path(), "rejected unsafe path");
        return not_found(req.path());
    };

    let target = root.join(&relative);
    let Ok(metadata) = tokio::fs::metadata(&target).await else {
        return not_found(req.path());
    };

    if metadata.is_dir() {
        // Redirect `/docs` to `/docs/` so the browser resolves relative
        // links against the directory, not its parent.
        if !req.path().ends_with('/') {
            return Response::builder()
                .status(StatusCode::MOVED_PERMANENTLY)
                .header("location", &format!("{}/", req.path()))
                .empty();
        }
        for index in INDEX_FILES {
            let candidate = target.join(index);
            if tokio::fs::metadata(&candidate).await.is_ok() {
                return serve_file(&candidate, req.path()).await;
            }
        }
        return directory_listing(&target, req.path()).await;
    }

    serve_file(&target, req.path()).await
}

/// Decodes and normalises a request path into a root-relative one.
///
/// Returns `None` for paths that must not resolve: undecodable bytes, `..`
/// components, NUL, or backslashes smuggled into a component.
fn sanitize_path(raw: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    let mut relative = PathBuf::new();
    for component in decoded.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            c if c.contains('\\') || c.contains('\0') => return None,
            c => relative.push(c),
        }
    }
    Some(relative)
}

async fn serve_file(path: &Path, url_path: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .body(content_type(path), contents),
        Err(e) => {
            debug!(path = %path.display(), "read failed: {e}");
            not_found(url_path)
        }
    }
}

/// Generates the fallback listing page for a directory with no index file.
async fn directory_listing(dir: &Path, url_path: &str) -> Response {
    let mut entries: Vec<(String, bool)> = Vec::new();
    let Ok(mut reader) = tokio::fs::read_dir(dir).await else {
        return not_found(url_path);
    };
    while let Ok(Some(entry)) = reader.next_entry().await {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        entries.push((name, is_dir));
    }
    entries.sort();

    let title = format!("Directory listing for {}", html_escape(url_path));
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    page.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for (name, is_dir) in &entries {
        let suffix = if *is_dir { "/" } else { "" };
        page.push_str(&format!(
            "<li><a href=\"{href}{suffix}\">{text}{suffix}</a></li>\n",
            href = utf8_percent_encode(name, HREF_ESCAPE),
            text = html_escape(name),
        ));
    }
    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Response::html(page)
}

fn not_found(url_path: &str) -> Response {
    Response::builder().status(StatusCode::NOT_FOUND).html(format!(
        "<!DOCTYPE html>\n<html><head><title>404 Not Found</title></head>\n\
         <body><h1>404 Not Found</h1><p>Nothing at {}.</p></body></html>\n",
        html_escape(url_path),
    ))
}

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Content-Type by file extension. Unknown extensions download as bytes.
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_TYPE, LOCATION};

    use super::*;

    fn site() -> (tempfile::TempDir, Arc<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        std::fs::create_dir(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/contact.html"), "<h1>contact</h1>").unwrap();
        let root = Arc::new(dir.path().to_path_buf());
        (dir, root)
    }

    async fn get(root: &Arc<PathBuf>, path: &str) -> Response {
        serve(Arc::clone(root), Request::test(Method::GET, path, b"")).await
    }

    #[tokio::test]
    async fn serves_files_with_their_content_type() {
        let (_dir, root) = site();

        let response = get(&root, "/home.html").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), b"<h1>home</h1>");
        assert_eq!(
            response.headers.get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8",
        );

        let css = get(&root, "/style.css").await;
        assert_eq!(css.headers.get(CONTENT_TYPE).unwrap(), "text/css; charset=utf-8");
    }

    #[tokio::test]
    async fn missing_files_are_404() {
        let (_dir, root) = site();
        assert_eq!(get(&root, "/nope.html").await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, root) = site();
        assert_eq!(get(&root, "/../secret").await.status, StatusCode::NOT_FOUND);
        assert_eq!(
            get(&root, "/%2e%2e/secret").await.status,
            StatusCode::NOT_FOUND,
        );
        assert_eq!(
            get(&root, "/pages/../../secret").await.status,
            StatusCode::NOT_FOUND,
        );
    }

    #[tokio::test]
    async fn directory_without_slash_redirects() {
        let (_dir, root) = site();
        let response = get(&root, "/pages").await;
        assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers.get(LOCATION).unwrap(), "/pages/");
    }

    #[tokio::test]
    async fn directory_serves_index_when_present() {
        let (dir, root) = site();
        std::fs::write(dir.path().join("pages/index.html"), "<h1>idx</h1>").unwrap();

        let response = get(&root, "/pages/").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), b"<h1>idx</h1>");
    }

    #[tokio::test]
    async fn directory_without_index_gets_a_listing() {
        let (_dir, root) = site();
        let response = get(&root, "/pages/").await;
        assert_eq!(response.status, StatusCode::OK);

        let page = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(page.contains("Directory listing for /pages/"));
        assert!(page.contains("contact.html"));
    }

    #[tokio::test]
    async fn percent_encoded_names_resolve() {
        let (dir, root) = site();
        std::fs::write(dir.path().join("a b.txt"), "spaced").unwrap();

        let response = get(&root, "/a%20b.txt").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), b"spaced");
    }

    #[tokio::test]
    async fn unsupported_methods_are_501() {
        let (_dir, root) = site();
        let req = Request::test(Method::DELETE, "/api/achievements", b"");
        let response = serve(Arc::clone(&root), req).await;
        assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn head_resolves_like_get() {
        let (_dir, root) = site();
        let req = Request::test(Method::HEAD, "/home.html", b"");
        let response = serve(Arc::clone(&root), req).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}
