pub type Headers = Vec<(String, String)>;

/// Headers describing the downstream connection rather than the payload. The HTTP
/// client recomputes them for the rewritten body and the upstream host.
const FRAMING_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "transfer-encoding",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
];

/// Sets `name` to `value`, dropping every previous occurrence (case-insensitive).
pub fn header_set(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
    headers.push((name, value));
}

pub fn header_get<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub fn is_framing_header(name: &str) -> bool {
    FRAMING_HEADERS
        .iter()
        .any(|framing| framing.eq_ignore_ascii_case(name))
}

/// Header set sent upstream: inbound headers as received, with the gateway's own
/// credential and a JSON content type taking precedence over anything the client sent.
pub fn outbound_headers(inbound: &Headers, api_key: &str) -> Headers {
    let mut headers: Headers = inbound
        .iter()
        .filter(|(name, _)| !is_framing_header(name))
        .cloned()
        .collect();
    header_set(&mut headers, "Authorization", format!("Bearer {api_key}"));
    header_set(&mut headers, "Content-Type", "application/json");
    headers
}

/// Collapses repeated names into one entry, values joined with `", "`, and drops
/// framing headers. Order of first appearance is kept.
pub fn join_repeated(headers: Headers) -> Headers {
    let mut joined: Headers = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        if is_framing_header(&name) {
            continue;
        }
        match joined.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => joined.push((name, value)),
        }
    }
    joined
}
