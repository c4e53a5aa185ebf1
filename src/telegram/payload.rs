use serde_json::{json, Value};

use crate::config::DeliveryTarget;
use crate::telegram::Message;

pub const PARSE_MODE: &str = "HTML";

/// Inline keyboard with the single link button every message carries.
fn reply_markup(label: &str, url: &str) -> Value {
    json!({
        "inline_keyboard": [[
            { "text": label, "url": url }
        ]]
    })
}

/// Bot API method and request body for a message.
pub fn build_request(target: &DeliveryTarget, message: &Message) -> (&'static str, Value) {
    let markup = reply_markup(&message.button.label, &message.button.url);

    match &message.photo_url {
        Some(photo) => (
            "sendPhoto",
            json!({
                "chat_id": target.chat_id,
                "photo": photo,
                "caption": message.text,
                "parse_mode": PARSE_MODE,
                "reply_markup": markup,
            }),
        ),
        None => (
            "sendMessage",
            json!({
                "chat_id": target.chat_id,
                "text": message.text,
                "parse_mode": PARSE_MODE,
                "disable_web_page_preview": true,
                "reply_markup": markup,
            }),
        ),
    }
}
