//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the reload WebSocket endpoint.
pub const RELOAD_PATH: &str = "/__reload";

/// Path of the reload client script.
pub const RELOAD_SCRIPT_PATH: &str = "/__reload.js";

/// Messages sent to connected pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// Full page reload
    Reload,

    /// Rebuilding assets failed; the page keeps its current assets
    BuildFailed {
        /// Error description
        message: String,
    },
}

/// Hub for broadcasting reload messages to all connected pages.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected pages.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers just means no page is open
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Add the reload client to an HTML page, before `</body>` when present.
pub fn inject_reload_script(html: &str) -> String {
    let tag = format!(r#"<script src="{RELOAD_SCRIPT_PATH}"></script>"#);

    match html.rfind("</body>") {
        Some(pos) => format!("{}{}\n{}", &html[..pos], tag, &html[pos..]),
        None => format!("{html}\n{tag}\n"),
    }
}

/// Client-side script that listens for reload messages.
pub fn reload_client_script() -> String {
    format!(
        r#"(function() {{
  'use strict';

  var attempts = 0;

  function connect() {{
    var proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
    var ws = new WebSocket(proto + location.host + '{RELOAD_PATH}');

    ws.onopen = function() {{
      attempts = 0;
    }};

    ws.onmessage = function(event) {{
      var msg = JSON.parse(event.data);
      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;
        case 'build_failed':
          console.error('[meridian] ' + msg.message);
          break;
      }}
    }};

    ws.onclose = function() {{
      if (attempts < 10) {{
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }}
    }};
  }}

  connect();
}})();
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        hub.send(ReloadMessage::Reload);

        match rx.try_recv() {
            Ok(ReloadMessage::Reload) => {}
            other => panic!("Expected Reload message, got {:?}", other),
        }
    }

    #[test]
    fn serializes_messages() {
        let msg = ReloadMessage::BuildFailed {
            message: "bad css".to_string(),
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(json, r#"{"type":"build_failed","message":"bad css"}"#);
    }

    #[test]
    fn injects_before_body_close() {
        assert_eq!(
            inject_reload_script("<body><p>x</p></body></html>"),
            "<body><p>x</p><script src=\"/__reload.js\"></script>\n</body></html>"
        );
        assert!(inject_reload_script("<p>x</p>").ends_with("<script src=\"/__reload.js\"></script>\n"));
    }

    #[test]
    fn client_script_targets_endpoint() {
        let script = reload_client_script();
        assert!(script.contains("location.host + '/__reload'"));
    }
}
