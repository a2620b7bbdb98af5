//! Host platform collaborator surface.

use gantry_common::PlatformError;

/// The host application platform around the embedded view.
pub trait HostPlatform {
    /// Open `url` outside the embedded view.
    ///
    /// `mime` is provided only for `file:` URLs. Omitting it there
    /// leaves the platform with no handler; adding one to `http(s):`
    /// URLs breaks the platform's downloader handoff.
    fn open_external(&mut self, url: &str, mime: Option<&str>) -> Result<(), PlatformError>;
}

/// Guess the MIME type of a `file:` URL from its extension.
pub fn mime_for_file_url(url: &str) -> &'static str {
    let ext = url
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
