//! `GET /`: the config file table the browser editor attaches to

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use shared_types::{
    ButtonAction, ATTR_ACTION, ATTR_FILE_NAME, CONFIG_TABLE_ID, WIDGET_CLASS,
};
use tracing::error;

use crate::catalog::{list_config_files, ConfigFile};
use crate::AppState;

/// Entry point emitted by wasm-bindgen for the `cfg-editor` bundle
pub const EDITOR_SCRIPT: &str = "/wasm/cfg_editor.js";

const MIN_ROWS: usize = 4;
const MAX_ROWS: usize = 30;

pub async fn index_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match list_config_files(&state.config_root).await {
        Ok(files) => Html(render_page(&state.title, &files)).into_response(),
        Err(e) => {
            error!(
                dir = %state.config_root.display(),
                error = %e,
                "Error reading config dir"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading config dir: {e}"),
            )
                .into_response()
        }
    }
}

pub fn render_page(title: &str, files: &[ConfigFile]) -> String {
    let title = html_escape(title);
    let mut rows = String::new();
    for file in files {
        render_row(&mut rows, file);
    }
    if files.is_empty() {
        rows.push_str("<tr><td colspan=\"2\">No config files found.</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  table {{ border-collapse: collapse; width: 100%; }}
  td, th {{ border: 1px solid #ccc; padding: 0.5rem; vertical-align: top; text-align: left; }}
  .{WIDGET_CLASS} textarea {{ width: 100%; font-family: monospace; }}
  .{WIDGET_CLASS} textarea[readonly] {{ background: #f6f6f6; }}
</style>
</head>
<body>
<h1>{title}</h1>
<table id="{CONFIG_TABLE_ID}">
<thead><tr><th>Config File</th><th>Content</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<script type="module">
  import init from "{EDITOR_SCRIPT}";
  init();
</script>
</body>
</html>
"#
    )
}

fn render_row(out: &mut String, file: &ConfigFile) {
    let name = html_escape(&file.name);
    let rows = (file.content.lines().count() + 1).clamp(MIN_ROWS, MAX_ROWS);

    // The newline after <textarea> is eaten by the HTML parser, so content
    // starting with a newline survives intact.
    let _ = write!(
        out,
        "<tr><td>{name}</td><td><div class=\"{WIDGET_CLASS}\">\
         <textarea readonly rows=\"{rows}\" {ATTR_FILE_NAME}=\"{name}\">\n{content}</textarea>\
         <div>{save}{cancel}</div></div></td></tr>\n",
        content = html_escape(&file.content),
        save = render_button(ButtonAction::Save),
        cancel = render_button(ButtonAction::Cancel),
    );
}

fn render_button(action: ButtonAction) -> String {
    format!(
        "<button {ATTR_ACTION}=\"{}\" disabled>{}</button>",
        action.as_str(),
        action.label()
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
