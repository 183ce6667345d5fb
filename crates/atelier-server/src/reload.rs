//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to connected browsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload
    Reload,

    /// Re-fetch stylesheets without a reload
    RefreshCss {
        /// Stylesheet paths written, relative to the output root
        paths: Vec<String>,
    },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new reload hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side reload script, served at `/__reload.js` and injected into
/// every HTML response the dev server sends.
pub fn reload_client_script() -> &'static str {
    RELOAD_CLIENT
}

const RELOAD_CLIENT: &str = r#"
(function() {
  'use strict';

  function refreshStylesheets(paths) {
    document.querySelectorAll('link[rel="stylesheet"]').forEach(function(link) {
      const href = link.getAttribute('href');
      if (!href) return;
      const clean = href.split('?')[0];
      if (paths && paths.length && !paths.some(function(p) { return clean.endsWith(p); })) {
        return;
      }
      link.setAttribute('href', clean + '?t=' + Date.now());
    });
  }

  function connect() {
    const proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
    const ws = new WebSocket(proto + location.host + '/__reload');

    ws.onmessage = function(event) {
      const msg = JSON.parse(event.data);

      switch (msg.type) {
        case 'reload':
          location.reload();
          break;

        case 'refresh_css':
          refreshStylesheets(msg.paths);
          break;

        case 'connected':
          console.log('[reload] connected');
          break;
      }
    };

    ws.onclose = function() {
      setTimeout(connect, 1000);
    };
  }

  connect();
})();
"#;

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
            _ => panic!("Expected Reload message"),
        }
    }

    #[test]
    fn serializes_messages() {
        let msg = ReloadMessage::RefreshCss {
            paths: vec!["css/main.css".to_string()],
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains("refresh_css"));
        assert!(json.contains("css/main.css"));
    }

    #[test]
    fn client_script_handles_every_message_kind() {
        let script = reload_client_script();

        assert!(script.contains("'reload'"));
        assert!(script.contains("'refresh_css'"));
        assert!(script.contains("location.reload()"));
    }
}
