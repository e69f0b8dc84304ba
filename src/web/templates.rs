//! View model and HTML rendering for the capture page.

use crate::capture::{CaptureError, CaptureOutcome};
use crate::viewport::DEVICE_CLASSES;

/// Everything the index page needs to render one response.
#[derive(Debug, Clone)]
pub struct IndexView {
    pub screenshot_path: Option<String>,
    pub error: Option<String>,
    pub filename: Option<String>,
    pub cached: bool,
    pub device_type: String,
    /// Fresh random token per response so the browser never shows a stale
    /// image for a re-captured URL. Unrelated to the server-side cache.
    pub cache_buster: String,
}

impl IndexView {
    /// View for a plain GET with no capture attempted.
    #[must_use]
    pub fn empty(device_type: &str) -> Self {
        Self {
            screenshot_path: None,
            error: None,
            filename: None,
            cached: false,
            device_type: device_type.to_string(),
            cache_buster: fresh_token(),
        }
    }

    /// Map a capture result to the view.
    #[must_use]
    pub fn from_result(result: &Result<CaptureOutcome, CaptureError>, device_type: &str) -> Self {
        match result {
            Ok(outcome) => Self {
                screenshot_path: Some(outcome.display_path.clone()),
                error: None,
                filename: Some(outcome.filename.clone()),
                cached: outcome.cached,
                device_type: device_type.to_string(),
                cache_buster: fresh_token(),
            },
            Err(e) => Self {
                screenshot_path: None,
                error: Some(e.to_string()),
                filename: None,
                cached: false,
                device_type: device_type.to_string(),
                cache_buster: fresh_token(),
            },
        }
    }
}

fn fresh_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Escape text for embedding in HTML content.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Base HTML layout.
fn base_layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="color-scheme" content="light dark">
    <title>{title} - HyperCap</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css">
    <style>
        .screenshot-frame {{ border: 1px solid var(--pico-muted-border-color); border-radius: 5px; }}
        .screenshot-frame img {{ display: block; max-width: 100%; }}
        .cache-badge {{
            background-color: #2e7d32;
            color: white;
            padding: 0.15em 0.4em;
            border-radius: 3px;
            font-size: 0.75em;
            font-weight: bold;
            margin-left: 0.5em;
            vertical-align: middle;
        }}
    </style>
</head>
<body>
    <header class="container">
        <nav>
            <ul>
                <li><a href="/"><strong>HyperCap</strong></a></li>
            </ul>
        </nav>
    </header>
    <main class="container">
        {content}
    </main>
    <footer class="container">
        <small>HyperCap - full-page screenshots in the cloud</small>
    </footer>
</body>
</html>"#
    )
}

/// Render the capture form with the device-class selector.
fn render_form(selected_device: &str) -> String {
    let mut options = String::new();
    for class in DEVICE_CLASSES {
        let selected = if *class == selected_device {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(r#"<option value="{class}"{selected}>{class}</option>"#));
    }

    format!(
        r#"<form method="post" action="/">
    <fieldset role="group">
        <input type="text" name="url" placeholder="example.com" aria-label="URL">
        <select name="device_type" aria-label="Device type">{options}</select>
        <button type="submit">Capture</button>
    </fieldset>
</form>"#
    )
}

/// Render the index page.
#[must_use]
pub fn render_index(view: &IndexView) -> String {
    let mut content = String::from("<h1>Capture a page</h1>");
    content.push_str(&render_form(&view.device_type));

    if let Some(error) = &view.error {
        content.push_str(&format!(
            r#"<article class="error"><strong>Error:</strong> {}</article>"#,
            escape_html(error)
        ));
    }

    if let Some(path) = &view.screenshot_path {
        let badge = if view.cached {
            r#"<span class="cache-badge">cached</span>"#
        } else {
            ""
        };
        content.push_str(&format!("<h2>Result{badge}</h2>"));
        content.push_str(&format!(
            r#"<figure class="screenshot-frame"><img src="/static/{path}?cb={cb}" alt="Screenshot"></figure>"#,
            cb = view.cache_buster
        ));
        if let Some(filename) = &view.filename {
            content.push_str(&format!(
                r#"<p><a href="/download/{filename}" download>Download screenshot</a></p>"#
            ));
        }
    }

    base_layout("Capture", &content)
}
