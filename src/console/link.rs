//! Client connection links and their QR codes

use std::fmt::Write as _;
use std::net::IpAddr;

use base64::{engine::general_purpose, Engine as _};
use qrcode::render::svg;
use qrcode::QrCode;

/// `hysteria2://` URI for one user
///
/// The auth string and the username are percent-encoded; IPv6 hosts are
/// bracketed.
pub fn connection_uri(password: &str, host: &str, port: &str, username: &str) -> String {
    let host = match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(addr)) => format!("[{}]", addr),
        _ => host.to_string(),
    };

    format!(
        "hysteria2://{}@{}:{}/?insecure=1#{}",
        percent_encode(password),
        host,
        port,
        percent_encode(username)
    )
}

/// Escape everything outside the RFC 3986 unreserved set.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// QR code of `text` as an SVG `data:` URI
pub fn qr_data_uri(text: &str) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(text.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(image.as_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_uri() {
        assert_eq!(
            connection_uri("pw1", "203.0.113.7", "443", "alice"),
            "hysteria2://pw1@203.0.113.7:443/?insecure=1#alice"
        );
    }

    #[test]
    fn test_connection_uri_escapes_userinfo_and_fragment() {
        assert_eq!(
            connection_uri("p@ss/w?rd#1:", "203.0.113.7", "443", "bob smith"),
            "hysteria2://p%40ss%2Fw%3Frd%231%3A@203.0.113.7:443/?insecure=1#bob%20smith"
        );
        // Generated auth strings are URL-safe base64 and pass through untouched
        assert_eq!(
            connection_uri("Zm9v-YmFy_YmF6", "vpn.example.net", "8443", "carol.d~"),
            "hysteria2://Zm9v-YmFy_YmF6@vpn.example.net:8443/?insecure=1#carol.d~"
        );
    }

    #[test]
    fn test_connection_uri_brackets_ipv6() {
        assert_eq!(
            connection_uri("pw1", "2001:db8::7", "443", "alice"),
            "hysteria2://pw1@[2001:db8::7]:443/?insecure=1#alice"
        );
    }

    #[test]
    fn test_qr_data_uri_is_svg() {
        let uri = qr_data_uri("hysteria2://pw1@203.0.113.7:443/?insecure=1#alice").unwrap();
        let encoded = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(general_purpose::STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_oversized_payload_is_an_error() {
        let huge = "x".repeat(8000);
        assert!(qr_data_uri(&huge).is_err());
    }
}
