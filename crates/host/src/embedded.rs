//! Control panel assets compiled into the binary
//!
//! The page, its stylesheet and the wasm-pack output of `marquee-controls`.
//! In debug builds rust-embed reads them from disk instead.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "../controls/"]
#[include = "index.html"]
#[include = "404.html"]
#[include = "css/*"]
#[include = "pkg/*.js"]
#[include = "pkg/*.wasm"]
pub struct PanelAssets;

pub const INDEX: &str = "index.html";
pub const NOT_FOUND: &str = "404.html";

/// Asset bytes and MIME type. `/` and the empty path map to the index.
pub fn get_asset(path: &str) -> Option<(Vec<u8>, &'static str)> {
    let path = if path.is_empty() || path == "/" {
        INDEX
    } else {
        path.trim_start_matches('/')
    };

    PanelAssets::get(path).map(|file| {
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        (file.data.into_owned(), mime)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_exist() {
        assert!(PanelAssets::get(INDEX).is_some());
        assert!(PanelAssets::get(NOT_FOUND).is_some());
    }

    #[test]
    fn test_get_asset() {
        let (data, mime) = get_asset("/").expect("index.html should exist");
        assert!(!data.is_empty());
        assert_eq!(mime, "text/html");

        let (_, mime) = get_asset("css/style.css").expect("stylesheet should exist");
        assert_eq!(mime, "text/css");

        assert!(get_asset("nope.txt").is_none());
    }

    #[test]
    fn test_sources_are_not_served() {
        assert!(get_asset("Cargo.toml").is_none());
        assert!(get_asset("src/lib.rs").is_none());
    }
}
