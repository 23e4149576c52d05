//! HTML pages shown to someone following a verification link.

use crate::services::{Confirmed, VerifyRejection};
use axum::http::StatusCode;
use axum::response::Html;

const INVALID_TOKEN: &str = "Invalid Token or expired Token";
const MALFORMED_TOKEN: &str = "This verification link is not valid. Please copy the full link from your message.";
const TRY_AGAIN: &str = "We could not confirm your subscription right now. Please open the link again in a few minutes.";

/// Page shown when a subscription was confirmed.
pub fn confirmation(confirmed: &Confirmed) -> Html<String> {
    page(
        "Subscription confirmed",
        &format!(
            "<p>Thank you. <strong>{}</strong> will now receive earthquake notifications.</p>",
            escape_html(confirmed.channel.identifier())
        ),
    )
}

/// Status code and page for a rejected token.
pub fn rejection(rejection: &VerifyRejection) -> (StatusCode, Html<String>) {
    let (status, message) = match rejection {
        VerifyRejection::MalformedToken(_) => (StatusCode::BAD_REQUEST, MALFORMED_TOKEN),
        VerifyRejection::UnknownOrExpiredToken | VerifyRejection::SecretMismatch => {
            (StatusCode::OK, INVALID_TOKEN)
        }
        VerifyRejection::PersistenceFailure(_) => (StatusCode::BAD_GATEWAY, TRY_AGAIN),
    };

    (
        status,
        page(
            "Subscription not confirmed",
            &format!("<p>{}</p>", escape_html(message)),
        ),
    )
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n</body>\n\
         </html>\n"
    ))
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
