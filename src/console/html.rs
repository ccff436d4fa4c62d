//! Server-rendered HTML pages

use std::fmt::Write;

use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};

use crate::store::{SettingKey, Settings, UserStats, VpnUser};

use super::flash::{clear_flash_cookie, Flash};
use super::forms::UserForm;
use super::state::ConsoleState;

const STYLE: &str = r#"
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         color: #e0e0e0; background: #0d1117; line-height: 1.6; }
  nav { background: #161b22; border-bottom: 1px solid #30363d; padding: 0.75rem 1rem; }
  nav a { margin-right: 1.25rem; }
  .container { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
  h1 { font-size: 1.6rem; margin-bottom: 1rem; color: #f0f0f0; }
  h2 { font-size: 1.2rem; margin: 1.5rem 0 0.75rem; color: #c0c0c0; }
  a { color: #58a6ff; text-decoration: none; }
  a:hover { text-decoration: underline; }
  table { width: 100%; border-collapse: collapse; margin-bottom: 1.5rem; }
  th, td { padding: 0.5rem 0.75rem; text-align: left; border-bottom: 1px solid #21262d; }
  th { color: #8b949e; font-weight: 600; font-size: 0.85em; text-transform: uppercase; }
  form label { display: block; margin: 0.75rem 0 0.25rem; color: #8b949e; }
  input[type=text], input[type=password], input[type=number] {
         width: 100%; padding: 0.5rem; background: #0d1117; color: #e0e0e0;
         border: 1px solid #30363d; border-radius: 6px; }
  button { margin-top: 1rem; padding: 0.5rem 1.25rem; background: #238636; color: #fff;
           border: 0; border-radius: 6px; cursor: pointer; }
  pre { background: #161b22; padding: 1rem; border-radius: 8px; overflow-x: auto;
        border: 1px solid #30363d; font-size: 0.85em; }
  .cards { display: flex; gap: 1rem; flex-wrap: wrap; margin-bottom: 1.5rem; }
  .card { flex: 1; min-width: 180px; background: #161b22; border: 1px solid #30363d;
          border-radius: 8px; padding: 1rem; }
  .card .value { font-size: 1.6rem; color: #f0f0f0; }
  .flash { padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
  .flash.success { background: #12361f; border: 1px solid #238636; }
  .flash.info { background: #0c2d4d; border: 1px solid #1f6feb; }
  .flash.warning { background: #3b2e0a; border: 1px solid #9e6a03; }
  .flash.danger { background: #3d1214; border: 1px solid #da3633; }
  .online { color: #3fb950; }
  .offline { color: #f85149; }
  .qr img { background: #fff; padding: 0.5rem; border-radius: 8px; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A full page with layout, navigation and flash messages
pub struct Page {
    title: String,
    flashes: Vec<Flash>,
    body: String,
    navigation: Option<String>,
    clear_flash: bool,
}

impl Page {
    /// Page behind the session gate (with navigation)
    pub fn new(state: &ConsoleState, title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            flashes: Vec::new(),
            body,
            navigation: Some(navigation(state)),
            clear_flash: false,
        }
    }

    /// Page without navigation (login)
    pub fn bare(title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            flashes: Vec::new(),
            body,
            navigation: None,
            clear_flash: false,
        }
    }

    /// Messages read from the flash cookie; the cookie is cleared with this page
    pub fn with_pending(mut self, pending: Vec<Flash>) -> Self {
        if !pending.is_empty() {
            self.clear_flash = true;
            self.flashes.extend(pending);
        }
        self
    }

    /// Message shown inline on this render
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }

    fn render(&self) -> String {
        let mut flashes = String::new();
        for flash in &self.flashes {
            let _ = writeln!(
                flashes,
                r#"<div class="flash {}">{}</div>"#,
                flash.level.as_str(),
                escape_html(&flash.message)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Hysteria Panel</title>
<style>{style}</style>
</head>
<body>
{navigation}
<div class="container">
{flashes}{body}
</div>
</body>
</html>
"#,
            title = escape_html(&self.title),
            style = STYLE,
            navigation = self.navigation.as_deref().unwrap_or(""),
            flashes = flashes,
            body = self.body,
        )
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let html = self.render();
        let mut response = Html(html).into_response();
        if self.clear_flash {
            response.headers_mut().append(SET_COOKIE, clear_flash_cookie());
        }
        response
    }
}

fn navigation(state: &ConsoleState) -> String {
    format!(
        r#"<nav><a href="{dashboard}">Dashboard</a><a href="{users}">Users</a><a href="{add}">Add user</a><a href="{settings}">Settings</a><a href="{logs}">Logs</a><a href="{logout}">Log out</a></nav>"#,
        dashboard = state.url("/"),
        users = state.url("/users"),
        add = state.url("/users/add"),
        settings = state.url("/settings"),
        logs = state.url("/logs"),
        logout = state.url("/logout"),
    )
}

pub fn login_page(state: &ConsoleState, username: &str) -> Page {
    let body = format!(
        r#"<h1>Hysteria Panel</h1>
<form method="post" action="{action}">
  <label for="username">Username</label>
  <input type="text" id="username" name="username" value="{username}" autofocus>
  <label for="password">Password</label>
  <input type="password" id="password" name="password">
  <button type="submit">Log in</button>
</form>"#,
        action = state.url("/login"),
        username = escape_html(username),
    );
    Page::bare("Log in", body)
}

pub fn dashboard_page(
    state: &ConsoleState,
    stats: &UserStats,
    online: bool,
    recent: &[VpnUser],
) -> Page {
    let (status_class, status_text) = if online {
        ("online", "Online")
    } else {
        ("offline", "Offline")
    };

    let mut body = format!(
        r#"<h1>Dashboard</h1>
<div class="cards">
  <div class="card"><div>Total users</div><div class="value">{total}</div></div>
  <div class="card"><div>Active users</div><div class="value">{active}</div></div>
  <div class="card"><div>Used traffic</div><div class="value">{traffic:.2} GB</div></div>
  <div class="card"><div>Server</div><div class="value {status_class}" id="server-status">{status_text}</div></div>
</div>
<h2>Recent users</h2>
"#,
        total = stats.total_users,
        active = stats.active_users,
        traffic = stats.total_used_traffic_gb,
    );
    body.push_str(&users_table(state, recent));

    Page::new(state, "Dashboard", body)
}

pub fn users_page(state: &ConsoleState, users: &[VpnUser]) -> Page {
    let mut body = format!(
        "<h1>Users</h1>\n<p><a href=\"{}\">Add user</a></p>\n",
        state.url("/users/add")
    );
    body.push_str(&users_table(state, users));
    Page::new(state, "Users", body)
}

fn users_table(state: &ConsoleState, users: &[VpnUser]) -> String {
    if users.is_empty() {
        return "<p>No users yet.</p>\n".to_string();
    }

    let mut table = String::from(
        "<table>\n<tr><th>Username</th><th>Up / Down (Mbps)</th><th>Traffic (GB)</th><th>Expires</th><th>Status</th><th></th></tr>\n",
    );
    for user in users {
        let quota = if user.total_traffic_gb == 0 {
            "∞".to_string()
        } else {
            user.total_traffic_gb.to_string()
        };
        let _ = writeln!(
            table,
            r#"<tr><td>{name}</td><td>{up} / {down}</td><td>{used:.2} / {quota}</td><td>{expiry}</td><td class="{class}">{status}</td><td><a href="{connection}">Connect</a> <a href="{edit}">Edit</a> <a href="{delete}" onclick="return confirm('Delete this user?')">Delete</a></td></tr>"#,
            name = escape_html(&user.username),
            up = user.upload_mbps,
            down = user.download_mbps,
            used = user.used_traffic_gb,
            quota = quota,
            expiry = escape_html(user.expiry_date.as_deref().unwrap_or("never")),
            class = if user.is_active { "online" } else { "offline" },
            status = if user.is_active { "Active" } else { "Disabled" },
            connection = state.url(&format!("/users/connection/{}", user.id)),
            edit = state.url(&format!("/users/edit/{}", user.id)),
            delete = state.url(&format!("/users/delete/{}", user.id)),
        );
    }
    table.push_str("</table>\n");
    table
}

/// Add form when `user_id` is `None`, edit form otherwise
pub fn user_form_page(state: &ConsoleState, user_id: Option<i64>, form: &UserForm) -> Page {
    let (title, action, password_hint) = match user_id {
        None => ("Add user", state.url("/users/add"), "Leave empty to generate one"),
        Some(id) => (
            "Edit user",
            state.url(&format!("/users/edit/{}", id)),
            "Leave empty to keep the current password",
        ),
    };

    let active = match user_id {
        None => String::new(),
        Some(_) => format!(
            r#"  <label><input type="checkbox" name="is_active" value="on"{}> Active</label>
"#,
            if form.is_active.is_some() { " checked" } else { "" }
        ),
    };

    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}">
  <label for="username">Username</label>
  <input type="text" id="username" name="username" value="{username}" required>
  <label for="password">Password</label>
  <input type="text" id="password" name="password" value="" placeholder="{password_hint}">
  <label for="upload_mbps">Upload (Mbps)</label>
  <input type="number" id="upload_mbps" name="upload_mbps" value="{upload}" min="0">
  <label for="download_mbps">Download (Mbps)</label>
  <input type="number" id="download_mbps" name="download_mbps" value="{download}" min="0">
  <label for="total_traffic_gb">Traffic limit (GB, 0 = unlimited)</label>
  <input type="number" id="total_traffic_gb" name="total_traffic_gb" value="{traffic}" min="0">
  <label for="expiry_date">Expiry date</label>
  <input type="text" id="expiry_date" name="expiry_date" value="{expiry}" placeholder="YYYY-MM-DD">
{active}  <button type="submit">Save</button>
</form>"#,
        title = title,
        action = action,
        username = escape_html(&form.username),
        password_hint = password_hint,
        upload = escape_html(&form.upload_mbps),
        download = escape_html(&form.download_mbps),
        traffic = escape_html(&form.total_traffic_gb),
        expiry = escape_html(&form.expiry_date),
        active = active,
    );

    Page::new(state, title, body)
}

pub fn connection_page(
    state: &ConsoleState,
    user: &VpnUser,
    uri: &str,
    qr: Option<&str>,
) -> Page {
    let qr = match qr {
        Some(data_uri) => format!(
            r#"<div class="qr"><img src="{}" alt="QR code" width="240" height="240"></div>"#,
            data_uri
        ),
        None => "<p>QR code unavailable for this link.</p>".to_string(),
    };

    let body = format!(
        r#"<h1>Connection for {name}</h1>
<h2>Link</h2>
<pre id="connection-uri">{uri}</pre>
<h2>QR code</h2>
{qr}
<p><a href="{back}">Back to users</a></p>"#,
        name = escape_html(&user.username),
        uri = escape_html(uri),
        qr = qr,
        back = state.url("/users"),
    );

    Page::new(state, "Connection", body)
}

pub fn settings_page(state: &ConsoleState, settings: &Settings) -> Page {
    let mut fields = String::new();
    for key in SettingKey::ALL {
        let _ = write!(
            fields,
            r#"  <label for="{key}">{label}</label>
  <input type="text" id="{key}" name="{key}" value="{value}">
"#,
            key = key.as_str(),
            label = setting_label(key),
            value = escape_html(settings.get(key)),
        );
    }

    let body = format!(
        r#"<h1>Settings</h1>
<form method="post" action="{action}">
{fields}  <h2>Administrator password</h2>
  <label for="old_password">Current password</label>
  <input type="password" id="old_password" name="old_password">
  <label for="new_password">New password</label>
  <input type="password" id="new_password" name="new_password">
  <button type="submit">Save settings</button>
</form>
<p>Panel port and path changes take effect after the panel restarts.</p>"#,
        action = state.url("/settings"),
        fields = fields,
    );

    Page::new(state, "Settings", body)
}

fn setting_label(key: SettingKey) -> &'static str {
    match key {
        SettingKey::ServerPort => "Hysteria port",
        SettingKey::PanelPort => "Panel port",
        SettingKey::PanelPath => "Panel path",
        SettingKey::ServerIp => "Public server address (empty = detect)",
        SettingKey::CertPath => "TLS certificate path",
        SettingKey::KeyPath => "TLS private key path",
    }
}

pub fn logs_page(state: &ConsoleState, logs: &str) -> Page {
    let body = format!(
        "<h1>Hysteria logs</h1>\n<pre>{}</pre>",
        escape_html(logs)
    );
    Page::new(state, "Logs", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_bare_page_escapes_flashes() {
        let page = Page::bare("Log in", String::new()).with_flash(Flash::danger("<b>nope</b>"));
        let html = page.render();
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
        assert!(!html.contains("<nav>"));
    }

    #[test]
    fn test_pending_flashes_clear_cookie() {
        let response = Page::bare("Log in", String::new())
            .with_pending(vec![Flash::info("Logged out")])
            .into_response();
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        let response = Page::bare("Log in", String::new()).into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
