//! Page rendering.
//!
//! Every page is composed from a shared layout plus a body fragment. All
//! user-supplied content passes through `escape` before interpolation.

use crate::models::{BlogPost, DashboardStats, PostForm};

/// Escapes text for safe interpolation into HTML element content and
/// double-quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// layout
///
/// Wraps a body fragment in the shared document shell. `authenticated` switches
/// the navigation between the public and admin link sets.
fn layout(title: &str, authenticated: bool, body: &str) -> String {
    let nav = if authenticated {
        r#"<a href="/">Start</a> <a href="/news">News</a> <a href="/kontakt">Kontakt</a> <a href="/admin">Admin</a> <a href="/logout">Logout</a>"#
    } else {
        r#"<a href="/">Start</a> <a href="/news">News</a> <a href="/kontakt">Kontakt</a> <a href="/login">Login</a>"#
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} – esemos</title>
</head>
<body>
<header><h1>esemos</h1><nav>{nav}</nav></header>
<main>
{body}
</main>
<footer><p>&copy; esemos</p></footer>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn post_teaser(post: &BlogPost) -> String {
    format!(
        r#"<article>
<h3><a href="/news/{slug}">{title}</a></h3>
<p class="meta">{author} – {date}</p>
<p>{summary}</p>
</article>"#,
        slug = escape(&post.slug),
        title = escape(&post.title),
        author = escape(&post.author),
        date = post.created_at.format("%Y-%m-%d"),
        summary = escape(&post.summary),
    )
}

pub fn home_page(recent: &[BlogPost], authenticated: bool) -> String {
    let teasers: String = recent.iter().map(post_teaser).collect();
    let body = format!(
        r#"<section>
<h2>Willkommen</h2>
<p>Aktuelle Meldungen:</p>
{teasers}
<p><a href="/news">Alle News</a></p>
</section>"#
    );
    layout("Start", authenticated, &body)
}

pub fn news_page(posts: &[BlogPost], authenticated: bool) -> String {
    let teasers: String = posts.iter().map(post_teaser).collect();
    let body = format!("<section>\n<h2>News</h2>\n{teasers}\n</section>");
    layout("News", authenticated, &body)
}

pub fn post_page(post: &BlogPost, authenticated: bool) -> String {
    let body = format!(
        r#"<article>
<h2>{title}</h2>
<p class="meta">{author} – {date}</p>
<div>{content}</div>
</article>"#,
        title = escape(&post.title),
        author = escape(&post.author),
        date = post.created_at.format("%Y-%m-%d"),
        content = escape(&post.content),
    );
    layout(&post.title, authenticated, &body)
}

pub fn contact_page(submitted: bool, authenticated: bool) -> String {
    let notice = if submitted {
        "<p class=\"notice\">Vielen Dank für Ihre Nachricht!</p>"
    } else {
        ""
    };
    let body = format!(
        r#"<section>
<h2>Kontakt</h2>
{notice}
<form method="post" action="/kontakt">
<label>Name <input type="text" name="name" required></label>
<label>E-Mail <input type="email" name="email" required></label>
<label>Nachricht <textarea name="message" required></textarea></label>
<button type="submit">Senden</button>
</form>
</section>"#
    );
    layout("Kontakt", authenticated, &body)
}

pub fn login_page(error: bool) -> String {
    let notice = if error {
        "<p class=\"error\">Login fehlgeschlagen.</p>"
    } else {
        ""
    };
    let body = format!(
        r#"<section>
<h2>Login</h2>
{notice}
<form method="post" action="/login">
<label>Benutzername <input type="text" name="username" required></label>
<label>Passwort <input type="password" name="password" required></label>
<button type="submit">Anmelden</button>
</form>
</section>"#
    );
    layout("Login", false, &body)
}

// --- Admin Pages ---

pub fn admin_dashboard_page(stats: &DashboardStats) -> String {
    let body = format!(
        r#"<section>
<h2>Dashboard</h2>
<p>Beiträge: {total}</p>
<p><a href="/admin/posts">Beiträge verwalten</a> | <a href="/admin/posts/new">Neuer Beitrag</a></p>
</section>"#,
        total = stats.total_posts,
    );
    layout("Dashboard", true, &body)
}

pub fn admin_posts_page(posts: &[BlogPost]) -> String {
    let rows: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<tr>
<td>{title}</td><td>{slug}</td><td>{updated}</td>
<td><a href="/admin/posts/edit/{id}">Bearbeiten</a>
<form method="post" action="/admin/posts/delete/{id}"><button type="submit">Löschen</button></form></td>
</tr>"#,
                title = escape(&p.title),
                slug = escape(&p.slug),
                updated = p.updated_at.format("%Y-%m-%d %H:%M"),
                id = p.id,
            )
        })
        .collect();
    let body = format!(
        r#"<section>
<h2>Beiträge</h2>
<p><a href="/admin/posts/new">Neuer Beitrag</a></p>
<table>
<thead><tr><th>Titel</th><th>Slug</th><th>Geändert</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>
</section>"#
    );
    layout("Beiträge", true, &body)
}

/// post_form_page
///
/// Shared form for the new and edit flows. `action` decides where the form
/// posts; `error` carries a validation message (e.g. a slug collision) shown
/// above the redisplayed, still-populated form.
pub fn post_form_page(heading: &str, action: &str, form: &PostForm, error: Option<&str>) -> String {
    let notice = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>", escape(msg)),
        None => String::new(),
    };
    let body = format!(
        r#"<section>
<h2>{heading}</h2>
{notice}
<form method="post" action="{action}">
<label>Titel <input type="text" name="title" value="{title}" required></label>
<label>Slug <input type="text" name="slug" value="{slug}" required></label>
<label>Zusammenfassung <textarea name="summary" required>{summary}</textarea></label>
<label>Inhalt <textarea name="content" required>{content}</textarea></label>
<label>Autor <input type="text" name="author" value="{author}" required></label>
<button type="submit">Speichern</button>
</form>
</section>"#,
        heading = escape(heading),
        action = escape(action),
        title = escape(&form.title),
        slug = escape(&form.slug),
        summary = escape(&form.summary),
        content = escape(&form.content),
        author = escape(&form.author),
    );
    layout(heading, true, &body)
}

// --- Error Pages ---

pub fn not_found_page() -> String {
    layout(
        "Nicht gefunden",
        false,
        "<section><h2>404</h2><p>Die angeforderte Seite existiert nicht.</p></section>",
    )
}

pub fn conflict_page() -> String {
    layout(
        "Konflikt",
        false,
        "<section><h2>Konflikt</h2><p>Der Slug wird bereits verwendet.</p></section>",
    )
}

pub fn server_error_page() -> String {
    layout(
        "Fehler",
        false,
        "<section><h2>Fehler</h2><p>Ein interner Fehler ist aufgetreten.</p></section>",
    )
}
