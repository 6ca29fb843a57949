pub struct EmbeddedAsset {
    pub path: &'static str,
    pub mime: &'static str,
    pub bytes: &'static [u8],
}

pub static EMBEDDED_ASSETS: &[EmbeddedAsset] = &[
    EmbeddedAsset {
        path: "index.html",
        mime: "text/html; charset=utf-8",
        bytes: include_bytes!("../assets/index.html"),
    },
    EmbeddedAsset {
        path: "app.js",
        mime: "text/javascript; charset=utf-8",
        bytes: include_bytes!("../assets/app.js"),
    },
    EmbeddedAsset {
        path: "style.css",
        mime: "text/css; charset=utf-8",
        bytes: include_bytes!("../assets/style.css"),
    },
];

pub fn asset(path: &str) -> Option<&'static EmbeddedAsset> {
    let normalized = path.trim_start_matches('/');
    if normalized.is_empty() {
        return None;
    }
    EMBEDDED_ASSETS
        .iter()
        .find(|asset| asset.path == normalized)
}

pub fn index_asset() -> Option<&'static EmbeddedAsset> {
    asset("index.html")
}
