//! Embedded widget markup, stylesheet and client script.
//!
//! The widget is a header, a text input, a submit button and an answer area.
//! [`render_page`] wraps it in a standalone page; [`mount_into`] injects it
//! into a host page supplied by the site owner.  The client script talks to
//! `/ws` and writes every display update into the answer area as plain text.

use std::cell::Cell;

use factdesk_agent::{AnswerView, WidgetConfig};
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::{debug, error};

use crate::error::{Result, WebError};

/// Page-level rules, used when the widget owns the whole body.
pub const PAGE_STYLE: &str = r#"body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,"Helvetica Neue",Arial,sans-serif;background-color:#f0f2f5;display:flex;justify-content:center;align-items:flex-start;padding-top:50px;height:100vh;margin:0}"#;

/// The widget stylesheet.  Every rule is scoped to the widget's own elements.
pub const STYLE: &str = r#"
.factdesk-container{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,"Helvetica Neue",Arial,sans-serif;background-color:white;border-radius:12px;box-shadow:0 6px 20px rgba(0,0,0,.08);width:90%;max-width:600px;margin:0 auto;padding:25px 30px;box-sizing:border-box}
.factdesk-container h1{font-size:26px;color:#1c1e21;text-align:center;margin-top:0;margin-bottom:20px}
#factdesk-input{width:100%;padding:12px 15px;font-size:16px;border:1px solid #ddd;border-radius:8px;box-sizing:border-box;margin-bottom:15px;transition:border-color .2s}
#factdesk-input:focus{outline:none;border-color:#007bff}
#factdesk-ask{width:100%;padding:12px;background-color:#007bff;color:white;border:none;border-radius:8px;cursor:pointer;font-size:16px;font-weight:bold;transition:background-color .2s}
#factdesk-ask:hover{background-color:#0056b3}
#factdesk-answer{margin-top:25px;padding:15px;background-color:#f7f7f9;border:1px solid #e9e9eb;border-radius:8px;min-height:60px;font-size:16px;line-height:1.6;color:#333;white-space:pre-wrap}
#factdesk-answer[data-kind="config_error"],#factdesk-answer[data-kind="service_error"]{color:#b00020}
"#;

/// The client script.  It does nothing when the widget was rendered in the
/// configuration-error state.
pub const SCRIPT: &str = r##"
(function() {
  "use strict";

  const inputEl  = document.getElementById("factdesk-input");
  const askBtn   = document.getElementById("factdesk-ask");
  const answerEl = document.getElementById("factdesk-answer");

  if (!inputEl || !askBtn || !answerEl) return;
  if (answerEl.dataset.kind === "config_error") return;

  let ws = null;
  let pending = null;

  function connect() {
    const proto = location.protocol === "https:" ? "wss:" : "ws:";
    ws = new WebSocket(proto + "//" + location.host + "/ws");

    ws.onopen = function() {
      if (pending !== null) {
        send(pending);
        pending = null;
      }
    };

    ws.onmessage = function(evt) {
      try {
        const msg = JSON.parse(evt.data);
        if (msg.type === "display") {
          answerEl.dataset.kind = msg.kind;
          answerEl.textContent = msg.text;
        } else if (msg.type === "error") {
          console.error("factdesk:", msg.text);
        }
      } catch(e) {
        console.error("Failed to parse server message:", e);
      }
    };

    ws.onclose = function() {
      setTimeout(connect, 3000);
    };
  }

  function send(question) {
    ws.send(JSON.stringify({type: "ask", question: question}));
  }

  function ask() {
    const question = inputEl.value;
    if (ws && ws.readyState === WebSocket.OPEN) {
      send(question);
    } else {
      pending = question;
    }
  }

  askBtn.addEventListener("click", ask);
  inputEl.addEventListener("keyup", function(e) {
    if (e.key === "Enter") ask();
  });

  connect();
})();
"##;

/// Where the widget goes inside a host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MountPoint {
    /// Replace the whole body content.
    #[default]
    Body,
    /// Insert inside the element with this id.
    Placeholder(String),
}

impl MountPoint {
    /// Interpret the `server.mount` setting: unset, empty or `body` mean the
    /// body; anything else is an element id, with an optional leading `#`.
    pub fn from_setting(mount: Option<&str>) -> Self {
        match mount.map(|m| m.trim().trim_start_matches('#')) {
            None | Some("") => Self::Body,
            Some(id) if id.eq_ignore_ascii_case("body") => Self::Body,
            Some(id) => Self::Placeholder(id.to_owned()),
        }
    }
}

/// Escape text for use in element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the widget fragment with `display` in the answer area.
pub fn render_widget(config: &WidgetConfig, display: &AnswerView) -> String {
    format!(
        r#"<div class="factdesk-container" id="factdesk">
  <h1>{header}</h1>
  <input type="text" id="factdesk-input" placeholder="{placeholder}">
  <button id="factdesk-ask">{button}</button>
  <div id="factdesk-answer" data-kind="{kind}">{answer}</div>
</div>"#,
        header = html_escape(&config.header_title),
        placeholder = html_escape(&config.input_placeholder),
        button = html_escape(&config.submit_button_text),
        kind = display.kind(),
        answer = html_escape(&display.text()),
    )
}

/// Render a complete standalone page with the widget as its body.
pub fn render_page(config: &WidgetConfig, display: &AnswerView) -> String {
    let title = html_escape(&config.page_title);
    let widget = render_widget(config, display);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{PAGE_STYLE}{STYLE}</style>
</head>
<body>
{widget}
<script>{SCRIPT}</script>
</body>
</html>
"#
    )
}

const VIEWPORT_META: &str = r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#;

/// What a host page offers to mount into, found by a read-only pass over
/// its elements.  Comments and script text are never elements, so markup
/// inside them is not seen.
#[derive(Debug, Default)]
struct HostOutline {
    body: Cell<bool>,
    head: Cell<bool>,
    title: Cell<bool>,
    viewport: Cell<bool>,
    placeholder: Cell<bool>,
}

impl HostOutline {
    fn scan(html: &str, placeholder: Option<&str>) -> Result<Self> {
        let outline = Self::default();
        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("body", |_| {
                        outline.body.set(true);
                        Ok(())
                    }),
                    element!("head", |_| {
                        outline.head.set(true);
                        Ok(())
                    }),
                    element!("head > title", |_| {
                        outline.title.set(true);
                        Ok(())
                    }),
                    element!(r#"head > meta[name="viewport"]"#, |_| {
                        outline.viewport.set(true);
                        Ok(())
                    }),
                    element!("*[id]", |el| {
                        if placeholder.is_some() && el.get_attribute("id").as_deref() == placeholder {
                            outline.placeholder.set(true);
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )?;
        Ok(outline)
    }
}

/// Inject the widget, its stylesheet and its script into `host_html`.
///
/// The document title (`head > title`) is set to `pageTitle`, or added to
/// the head when missing, and a viewport meta tag is added when the head
/// lacks one.  Mounting into a placeholder prepends the widget to the first
/// element whose `id` matches.
///
/// # Errors
///
/// Returns [`WebError::MountPointMissing`] when the placeholder element does
/// not exist, or [`WebError::MissingBody`] when mounting into a page without
/// a body.  Nothing is rendered in either case.
pub fn mount_into(
    host_html: &str,
    config: &WidgetConfig,
    display: &AnswerView,
    mount: &MountPoint,
) -> Result<String> {
    let placeholder = match mount {
        MountPoint::Body => None,
        MountPoint::Placeholder(id) => Some(id.as_str()),
    };
    let outline = HostOutline::scan(host_html, placeholder)?;

    let style = match mount {
        MountPoint::Body if !outline.body.get() => {
            error!("cannot mount widget: host page has no <body>");
            return Err(WebError::MissingBody);
        }
        MountPoint::Placeholder(id) if !outline.placeholder.get() => {
            error!(id = %id, "cannot mount widget: placeholder element not found");
            return Err(WebError::MountPointMissing { id: id.clone() });
        }
        MountPoint::Body => format!("{PAGE_STYLE}{STYLE}"),
        MountPoint::Placeholder(_) => STYLE.to_owned(),
    };
    if !outline.head.get() {
        debug!("host page has no <head>: title and viewport left unchanged");
    }

    let widget = render_widget(config, display);
    let content = format!("\n<style>{style}</style>\n{widget}\n<script>{SCRIPT}</script>\n");

    let mut head_extra = String::new();
    if !outline.title.get() {
        head_extra.push_str(&format!("<title>{}</title>\n", html_escape(&config.page_title)));
    }
    if !outline.viewport.get() {
        head_extra.push_str(VIEWPORT_META);
        head_extra.push('\n');
    }

    let placed = Cell::new(false);
    let mut handlers = vec![element!("head > title", |el| {
        el.set_inner_content(&config.page_title, ContentType::Text);
        Ok(())
    })];
    if !head_extra.is_empty() {
        handlers.push(element!("head", |el| {
            el.append(&head_extra, ContentType::Html);
            Ok(())
        }));
    }
    match placeholder {
        None => handlers.push(element!("body", |el| {
            if !placed.replace(true) {
                el.set_inner_content(&content, ContentType::Html);
            }
            Ok(())
        })),
        Some(id) => handlers.push(element!("*[id]", |el| {
            if !placed.get() && el.get_attribute("id").as_deref() == Some(id) {
                el.prepend(&content, ContentType::Html);
                placed.set(true);
            }
            Ok(())
        })),
    }

    let html = rewrite_str(
        host_html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )?;

    debug!(mount = ?mount, "widget mounted into host page");
    Ok(html)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
