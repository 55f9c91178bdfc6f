//! Songbook file server.
//!
//! Serves a directory of song pages. Song pages (`s_*.html`) are annotated
//! with a randomly picked challenge before they are sent; every other file,
//! and any `HEAD` request, gets the stored bytes. Requests are handled one at
//! a time.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use log::{debug, error, info, warn};
use tiny_http::{Header, Method, Request, Response, Server};

use fretwork::SongAnnotator;

use crate::{challenges::ChallengeDeck, error::CliError};

/// A response before it is handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: b"File not found".to_vec(),
        }
    }

    fn method_not_allowed() -> Self {
        Self {
            status: 405,
            content_type: "text/plain; charset=utf-8",
            body: b"Method not allowed".to_vec(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let response = Response::from_data(self.body).with_status_code(self.status);
        match Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            Ok(header) => response.with_header(header),
            Err(()) => response,
        }
    }
}

/// Content type for a file, from its extension.
fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// The relative file path a request URL refers to.
///
/// The query string is ignored and `/` maps to `index.html`. Paths that try
/// to leave the songbook root yield `None`.
fn request_path(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Some(PathBuf::from("index.html"));
    }
    if path.contains('\\') {
        return None;
    }

    let relative = PathBuf::from(path);
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
        .then_some(relative)
}

/// Song pages get annotated, everything else is static.
fn is_song_page(relative: &Path) -> bool {
    relative
        .to_str()
        .is_some_and(|name| name.starts_with("s_") && name.ends_with(".html"))
}

/// Serves a songbook directory.
pub struct SongServer {
    root: PathBuf,
    annotator: SongAnnotator,
    deck: ChallengeDeck,
}

impl SongServer {
    pub fn new(root: impl Into<PathBuf>, annotator: SongAnnotator, deck: ChallengeDeck) -> Self {
        Self {
            root: root.into(),
            annotator,
            deck,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produces the reply for a `GET` of `url`.
    pub fn handle(&self, url: &str) -> Reply {
        self.reply_for(url, true)
    }

    /// Produces the reply for a `HEAD` of `url`.
    ///
    /// Song pages are read as stored, without asking for voicings.
    pub fn handle_head(&self, url: &str) -> Reply {
        self.reply_for(url, false)
    }

    fn reply_for(&self, url: &str, annotate: bool) -> Reply {
        let Some(relative) = request_path(url) else {
            warn!(url; "Rejected path outside the songbook");
            return Reply::not_found();
        };

        let path = self.root.join(&relative);
        if !path.is_file() {
            debug!(path = path.display().to_string(); "File not found");
            return Reply::not_found();
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(path = path.display().to_string(), err:err; "Failed to read file");
                return Reply::not_found();
            }
        };

        if !annotate || !is_song_page(&relative) {
            return Reply::ok(content_type(&path), bytes);
        }

        let challenge = self.deck.pick();
        info!(song = relative.display().to_string(), challenge; "Serving song");
        let song = String::from_utf8_lossy(&bytes);
        let page = self.annotator.annotate_page(&song, challenge);
        Reply::ok(content_type(&path), page.into_bytes())
    }

    fn respond(&self, request: Request) {
        let reply = match request.method() {
            Method::Get => self.handle(request.url()),
            Method::Head => self.handle_head(request.url()),
            method => {
                debug!(method:% = method; "Unsupported method");
                Reply::method_not_allowed()
            }
        };
        debug!(url = request.url(), status = reply.status; "Responding");

        if let Err(err) = request.respond(reply.into_response()) {
            warn!(err:err; "Failed to send response");
        }
    }

    /// Listens on `addr` and serves requests until the process ends.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Server`] if the address cannot be bound.
    pub fn serve(&self, addr: &str) -> Result<(), CliError> {
        let server = Server::http(addr).map_err(|err| CliError::Server {
            addr: addr.to_string(),
            message: err.to_string(),
        })?;

        info!(addr, root = self.root.display().to_string(), challenges = self.deck.len(); "Serving songbook");
        for request in server.incoming_requests() {
            self.respond(request);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use fretwork::{ServiceError, SuggestionRequest, config::AppConfig};
    use tempfile::tempdir;

    use super::*;

    fn server(root: &Path) -> SongServer {
        let offline = |_: &SuggestionRequest| -> Result<String, ServiceError> {
            Err(ServiceError::MissingCredentials)
        };
        let annotator = SongAnnotator::new(AppConfig::default(), Box::new(offline));
        SongServer::new(root, annotator, ChallengeDeck::parse("Use only triads"))
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/"), Some(PathBuf::from("index.html")));
        assert_eq!(request_path("/?x=1"), Some(PathBuf::from("index.html")));
        assert_eq!(request_path("/s_song.html?v=2"), Some(PathBuf::from("s_song.html")));
        assert_eq!(request_path("/css/site.css"), Some(PathBuf::from("css/site.css")));
        assert_eq!(request_path("/../secret.txt"), None);
        assert_eq!(request_path("/a/../../b"), None);
        assert_eq!(request_path("/./a"), None);
        assert_eq!(request_path("/..\\secret.txt"), None);
    }

    #[test]
    fn test_song_page_detection() {
        assert!(is_song_page(Path::new("s_friday.html")));
        assert!(!is_song_page(Path::new("index.html")));
        assert!(!is_song_page(Path::new("s_friday.pdf")));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a.png")), "image/png");
        assert_eq!(content_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_static_and_missing_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<p>index</p>").unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let server = server(dir.path());

        let index = server.handle("/");
        assert_eq!(index.status(), 200);
        assert_eq!(index.body(), b"<p>index</p>");

        let css = server.handle("/style.css");
        assert_eq!(css.content_type(), "text/css; charset=utf-8");

        let missing = server.handle("/s_missing.html");
        assert_eq!(missing.status(), 404);
        assert_eq!(missing.body(), b"File not found");

        assert_eq!(server.handle("/../index.html").status(), 404);
    }

    #[test]
    fn test_head_skips_annotation() {
        let dir = tempdir().unwrap();
        let song = "<html><body><table><tr class=ch><td>G</td></tr></table></body></html>";
        fs::write(dir.path().join("s_song.html"), song).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = move |_: &SuggestionRequest| -> Result<String, ServiceError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("[]"))
        };
        let annotator = SongAnnotator::new(AppConfig::default(), Box::new(counting));
        let server = SongServer::new(dir.path(), annotator, ChallengeDeck::parse("Use only triads"));

        let head = server.handle_head("/s_song.html");
        assert_eq!(head.status(), 200);
        assert_eq!(head.body(), song.as_bytes());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(server.handle_head("/s_missing.html").status(), 404);

        server.handle("/s_song.html");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_song_page_gets_banner() {
        let dir = tempdir().unwrap();
        let song = "<html><body><table><tr class=ch><td>G</td></tr></table></body></html>";
        fs::write(dir.path().join("s_song.html"), song).unwrap();
        let server = server(dir.path());

        let reply = server.handle("/s_song.html");
        let page = String::from_utf8(reply.body().to_vec()).unwrap();

        assert_eq!(reply.status(), 200);
        assert!(page.starts_with(r#"<html><body><div class="chord-challenge""#));
        assert!(page.contains("Use only triads"));
        assert!(page.ends_with("<table><tr class=ch><td>G</td></tr></table></body></html>"));
    }
}
