/// Base URL of the WhatsApp click-to-chat handoff
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

const PLACEHOLDER_AVATAR_URL: &str = "https://ui-avatars.com/api/";
const PLACEHOLDER_NAME: &str = "Friend";

/// Build the WhatsApp deep link for a stored phone number
///
/// Separators and the leading `+` are stripped; the number is not validated.
pub fn whatsapp_link(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+' | '\t'))
        .collect();

    format!("{}{}", WHATSAPP_BASE_URL, digits)
}

/// Generated avatar used when a profile is saved without an upload
pub fn placeholder_avatar(name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { PLACEHOLDER_NAME } else { name };

    format!(
        "{}?name={}&background=f582ae&color=172c66&bold=true",
        PLACEHOLDER_AVATAR_URL,
        urlencoding::encode(name)
    )
}
