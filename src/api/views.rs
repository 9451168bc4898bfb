//! HTML and XML rendering for the site pages.

use super::session::SessionUser;
use axum::response::Html;
use std::fmt::Write;

/// One `<url>` entry of the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Escape text for HTML and XML bodies and attribute values.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&SessionUser>, body: &str) -> Html<String> {
    let account = match user {
        Some(_) => r#"<a href="/logout">Log out</a>"#.to_string(),
        None => r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a>"#.to_string(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Axis</title>
<script src="/static/js/scripts.js" defer></script>
</head>
<body>
<nav><a href="/">Home</a> <a href="/feedback">Feedback</a> <a href="/developer">Developer</a> {account}</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn error_block(error: Option<&str>) -> String {
    error.map_or_else(String::new, |error| {
        format!(r#"<p class="error" role="alert">{}</p>"#, escape(error))
    })
}

#[must_use]
pub fn home(user: Option<&SessionUser>) -> Html<String> {
    let greeting = user.map_or_else(
        || "<p>Sign up to book rides and track your trips.</p>".to_string(),
        |user| format!(r#"<p class="user">Signed in as {}</p>"#, escape(&user.identifier)),
    );

    let body = format!(
        r#"<h1>Axis</h1>
{greeting}
<section class="panel">
<p><span id="cnt-users" data-count-to="500">0</span> users, <span id="cnt-drivers" data-count-to="40">0</span> drivers, <span id="cnt-rides" data-count-to="3000">0</span> rides</p>
</section>"#
    );

    layout("Home", user, &body)
}

#[must_use]
pub fn signup(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Sign up</h1>
{}
<form method="post" action="/signup">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Role <select name="role"><option value="student">Student</option><option value="driver">Driver</option></select></label>
<button type="submit">Create account</button>
</form>"#,
        error_block(error)
    );

    layout("Sign up", None, &body)
}

#[must_use]
pub fn login(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Log in</h1>
{}
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        error_block(error)
    );

    layout("Log in", None, &body)
}

#[must_use]
pub fn feedback(user: Option<&SessionUser>) -> Html<String> {
    let email = user.map_or_else(String::new, |user| escape(&user.identifier));
    let body = format!(
        r#"<h1>Feedback</h1>
<form id="feedbackForm" method="post" action="/feedback">
<label>Name <input type="text" name="name"></label>
<label>Email <input type="email" name="email" value="{email}"></label>
<label>Role <input type="text" name="role"></label>
<label>Rating <select name="rating"><option>5</option><option>4</option><option>3</option><option>2</option><option>1</option></select></label>
<label>Message <textarea name="message"></textarea></label>
<button type="submit">Send</button>
</form>"#
    );

    layout("Feedback", user, &body)
}

#[must_use]
pub fn developer(user: Option<&SessionUser>) -> Html<String> {
    let body = r#"<h1>Developer</h1>
<p>Axis is built and maintained by a small team. The upcoming feature list is available as JSON at <a href="/api/upcoming-ai">/api/upcoming-ai</a>.</p>"#;

    layout("Developer", user, body)
}

#[must_use]
pub fn sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        // Writing to a String cannot fail.
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            escape(&entry.loc),
            entry.changefreq,
            entry.priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_markup() {
        assert_eq!(
            escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn home_shows_identifier_escaped() {
        let user = SessionUser {
            identifier: "<b>@x.com".to_string(),
            role: "student".to_string(),
        };
        let Html(page) = home(Some(&user));
        assert!(page.contains("Signed in as &lt;b&gt;@x.com"));
        assert!(page.contains("/logout"));

        let Html(anonymous) = home(None);
        assert!(!anonymous.contains("Signed in as"));
        assert!(anonymous.contains("/signup"));
    }

    #[test]
    fn home_counters_are_driven_by_the_site_script() {
        let Html(page) = home(None);
        for (id, end) in [("cnt-users", 500), ("cnt-drivers", 40), ("cnt-rides", 3000)] {
            assert!(
                page.contains(&format!(r#"id="{id}" data-count-to="{end}""#)),
                "{id}"
            );
        }

        let script = include_str!("../../static/js/scripts.js");
        assert!(script.contains("[data-count-to]"));
        assert!(script.contains("#feedbackForm"));
    }

    #[test]
    fn forms_render_error() {
        let Html(page) = signup(Some("Account already exists."));
        assert!(page.contains("Account already exists."));
        let Html(page) = login(None);
        assert!(!page.contains("class=\"error\""));
    }

    #[test]
    fn sitemap_lists_entries() {
        let xml = sitemap(&[SitemapEntry {
            loc: "http://h/?a=1&b=2".to_string(),
            changefreq: "daily",
            priority: "0.9",
        }]);
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>http://h/?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
