//! HTML pages served by the profile routes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::Backend;
use crate::service::{ProfileView, Submission};

/// Templates offered on the landing page.
pub const TEMPLATES: [&str; 3] = ["basic", "detailed", "minimal"];

const STYLE: &str = "body{font-family:sans-serif;max-width:40em;margin:2em auto;padding:0 1em}\
label{display:block;margin-top:.8em}input,textarea{width:100%;padding:.3em}\
dt{font-weight:bold;margin-top:.5em}.qr img{max-width:100%}";

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape_html(title)
    )
}

/// Landing page listing the available templates.
#[must_use]
pub fn landing() -> String {
    let mut list = String::new();
    for name in TEMPLATES {
        list.push_str(&format!(
            "<li><a href=\"/select_template/{name}\">{name}</a></li>"
        ));
    }
    layout(
        "Medical QR profile",
        &format!(
            "<h1>Medical QR profile</h1>\
<p>Pick a template, fill in your details and print the QR code.</p>\
<ul>{list}</ul>"
        ),
    )
}

fn text_input(name: &str, label: &str, kind: &str, required: bool) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\
<input type=\"{kind}\" id=\"{name}\" name=\"{name}\"{}>",
        if required { " required" } else { "" }
    )
}

fn text_area(name: &str, label: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\
<textarea id=\"{name}\" name=\"{name}\" rows=\"2\"></textarea>"
    )
}

/// Submission form tagged with `template`.
///
/// The optional medical fields are included only when `with_medical` is set.
#[must_use]
pub fn profile_form(template: &str, with_medical: bool) -> String {
    let template = escape_html(template);
    let mut fields = String::new();
    fields.push_str(&text_input("name", "Name", "text", true));
    fields.push_str(&text_input("phone", "Phone", "tel", true));
    fields.push_str(&text_input("blood_group", "Blood group", "text", true));
    fields.push_str(&text_input("password", "Password", "password", true));
    if with_medical {
        fields.push_str("<h2>Medical details (optional)</h2>");
        fields.push_str(&text_area("emergency_contact", "Emergency contact"));
        fields.push_str(&text_area("medical_conditions", "Medical conditions"));
        fields.push_str(&text_area("allergies", "Allergies"));
        fields.push_str(&text_area("medications", "Medications"));
    }

    layout(
        "Create profile",
        &format!(
            "<h1>Create profile</h1><p>Template: <strong>{template}</strong></p>\
<form method=\"post\" action=\"/generate_profile\">\
<input type=\"hidden\" name=\"template\" value=\"{template}\">{fields}\
<p><button type=\"submit\">Generate QR code</button></p></form>"
        ),
    )
}

/// Page shown after a successful submission.
#[must_use]
pub fn qr_display(submission: &Submission) -> String {
    let encoded = STANDARD.encode(&submission.qr_png);
    let image = match &submission.image_url {
        Some(url) => format!(
            "<p><a href=\"{0}\"><img src=\"data:image/png;base64,{encoded}\" alt=\"QR code\"></a></p>\
<p><a href=\"{0}\">Stored image</a></p>",
            escape_html(url)
        ),
        None => format!("<p><img src=\"data:image/png;base64,{encoded}\" alt=\"QR code\"></p>"),
    };
    let profile_url = escape_html(&submission.profile_url);
    let download_url = escape_html(&submission.download_url);

    layout(
        "Your QR code",
        &format!(
            "<h1>Your QR code</h1><div class=\"qr\">{image}</div>\
<p>Profile ID: <code>{}</code></p>\
<p>Profile URL: <a href=\"{profile_url}\">{profile_url}</a></p>\
<p><a href=\"{download_url}\">Download QR code</a></p>\
<p><a href=\"/\">Create another</a></p>",
            submission.id
        ),
    )
}

/// Profile display page.
///
/// The stored password is never rendered. On the database backend a
/// password prompt is shown until the medical details are revealed.
#[must_use]
pub fn profile_view(view: &ProfileView, backend: Backend) -> String {
    let profile = &view.profile;
    let mut details = format!(
        "<dt>Phone</dt><dd>{}</dd><dt>Blood group</dt><dd>{}</dd>",
        escape_html(&profile.phone),
        escape_html(&profile.blood_group)
    );

    let mut extra = String::new();
    if view.show_sensitive {
        for (label, value) in profile.medical.entries() {
            details.push_str(&format!("<dt>{label}</dt><dd>{}</dd>", escape_html(value)));
        }
    } else if backend == Backend::Database {
        extra.push_str(&format!(
            "<form method=\"get\" action=\"/profile/{}\">\
<label for=\"password\">Password for medical details</label>\
<input type=\"password\" id=\"password\" name=\"password\">\
<p><button type=\"submit\">Show</button></p></form>",
            view.id
        ));
    }

    layout(
        &profile.name,
        &format!(
            "<article class=\"template-{}\"><h1>{}</h1><dl>{details}</dl></article>{extra}",
            escape_html(&profile.template),
            escape_html(&profile.name)
        ),
    )
}
