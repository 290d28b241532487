//! Handshake parameters for opening a trace socket.

use rtcstats_core::config::TransportConfig;
use rtcstats_core::models::{HandshakeRequest, Session};

/// Build the handshake for `session`. The url is `endpoint + path` with the
/// session id and the reconnect flag in the query.
pub fn build_request(config: &TransportConfig, session: &Session, is_reconnect: bool) -> HandshakeRequest {
    let base = join_path(&config.endpoint, &config.path);
    let separator = if base.contains('?') { '&' } else { '?' };
    let url = format!(
        "{base}{separator}statsSessionId={}&isReconnect={is_reconnect}",
        urlencoded(&session.session_id),
    );

    HandshakeRequest {
        url,
        protocol: config.protocol_version(),
        user_agent: config.user_agent.clone(),
        session_id: session.session_id.clone(),
        is_reconnect,
    }
}

fn join_path(endpoint: &str, path: &str) -> String {
    match (endpoint.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{endpoint}{}", &path[1..]),
        (false, false) if !path.is_empty() => format!("{endpoint}/{path}"),
        _ => format!("{endpoint}{path}"),
    }
}

/// Percent-encode everything outside the unreserved set.
fn urlencoded(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(b as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", b));
            }
        }
    }
    result
}
