//! Builds Telegram HTML messages from extracted items.

use chrono::NaiveDateTime;
use html_escape::encode_text;

use crate::models::{CveAlert, Item, ATTRIBUTION_LABEL};
use crate::parsers::truncate_with_ellipsis;

/// Longest CVE description shown before it is cut.
pub const CVE_DESCRIPTION_LIMIT: usize = 2000;

/// Telegram rejects photo captions longer than this, counted after HTML parsing.
pub const CAPTION_LIMIT: usize = 1024;

/// Longest title kept in a caption.
const TITLE_LIMIT: usize = 256;

const ELLIPSIS_CHARS: usize = 3;

const PUBLISHED_FORMAT: &str = "%I:%M %p, %A, %d-%m-%Y";

/// Caption for a news article: bold title, body, attribution line.
///
/// The body is cut to `body_limit` and to whatever room the title and
/// attribution leave under [`CAPTION_LIMIT`].
pub fn news_caption(item: &Item, source_name: &str, body_limit: Option<usize>) -> String {
    let title = truncate_with_ellipsis(&item.title, TITLE_LIMIT);

    // title, "\n", "\n\n", label, " ", source name
    let fixed = title.chars().count()
        + 4
        + ATTRIBUTION_LABEL.chars().count()
        + source_name.chars().count();
    let room = CAPTION_LIMIT.saturating_sub(fixed + ELLIPSIS_CHARS);
    let limit = body_limit.map_or(room, |limit| limit.min(room));
    let body = truncate_with_ellipsis(&item.body, limit);

    format!(
        "<b>{}</b>\n{}\n\n{} <b>{}</b>",
        encode_text(&title),
        encode_text(&body),
        ATTRIBUTION_LABEL,
        encode_text(source_name)
    )
}

pub fn format_published(published: &NaiveDateTime) -> String {
    published.format(PUBLISHED_FORMAT).to_string()
}

/// Alert text for a vulnerability with its fixed-order CVSS table.
pub fn cve_message(alert: &CveAlert) -> String {
    let CveAlert { item, severity } = alert;
    let description = truncate_with_ellipsis(&item.body, CVE_DESCRIPTION_LIMIT);
    let report = &severity.report;

    format!(
        "<b>{tier} ALERT - <code>{id}</code>  - <code>{weakness}</code></b>\n\n\
         <b>{description}</b>\n\n\
         CVSS Details:\n\
         - <b>Auth Required:</b> {auth}\n\
         - <b>Attack Vector:</b> {vector}\n\
         - <b>Complexity:</b> {complexity}\n\
         - <b>Exploit State:</b> {exploit}\n\
         - <b>Confidentiality:</b> {confidentiality}\n\
         - <b>Integrity:</b> {integrity}\n\
         - <b>Availability:</b> {availability}\n\
         - <b>Base Score:</b> {score:.1}\n\n\
         Published at: {published}",
        tier = severity.tier,
        id = encode_text(&item.title),
        weakness = encode_text(&severity.weakness),
        description = encode_text(&description),
        auth = report.auth_required,
        vector = report.attack_vector,
        complexity = report.complexity,
        exploit = report.exploit_state,
        confidentiality = report.confidentiality,
        integrity = report.integrity,
        availability = report.availability,
        score = severity.base_score,
        published = format_published(&severity.published),
    )
}
