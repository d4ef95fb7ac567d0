//! User-facing reply text.
//!
//! Markup replies are Telegram HTML; anything interpolated into them is
//! escaped with teloxide's HTML helpers.

use teloxide::utils::html;

pub const LAUNCH_BUTTON_LABEL: &str = "🎨 Create My Avatar";

/// Greeting used when the sender has no first name.
pub const FALLBACK_NAME: &str = "there";

pub const HELP: &str = "📖 <b>How to Use This Bot</b>\n\n\
     1️⃣ Click the \"🎨 Create My Avatar\" button\n\
     2️⃣ Customize your 3D avatar in the web interface\n\
     3️⃣ Your avatar will be saved automatically\n\n\
     <b>Commands:</b>\n\
     /start - Start the bot and create avatar\n\
     /help - Show this help message\n\
     /about - Learn about this bot";

pub const ABOUT: &str = "ℹ️ <b>About This Bot</b>\n\n\
     This bot allows you to create personalized 3D avatars using Ready Player Me technology.\n\n\
     Your avatars are cross-platform compatible and can be used in various games and virtual worlds.\n\n\
     Powered by:\n\
     • Ready Player Me - Avatar creation\n\
     • Telegram Web Apps - Seamless integration\n\
     • Rust and teloxide - Bot backend";

pub const PAYLOAD_ERROR: &str = "⚠️ There was an error processing your avatar. Please try again.";

pub const DOCUMENT_CAPTION: &str = "📦 Your 3D Avatar Model (GLB format)";

/// Plain-text welcome shown with the launch button.
pub fn welcome(first_name: Option<&str>) -> String {
    let name = first_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_NAME);

    format!(
        "👋 Hello {name}!\n\n\
         Welcome to the 3D Avatar Creator Bot!\n\n\
         Click the button below to design your personalized 3D avatar using Ready Player Me. \
         You'll be able to customize your character's appearance, style, and more!\n\n\
         Once you're done, your avatar will be saved and you can use it across different platforms."
    )
}

/// HTML confirmation carrying the avatar URL in a code span.
pub fn avatar_ready(avatar_url: &str) -> String {
    format!(
        "✨ <b>Avatar Created Successfully!</b>\n\n\
         Your 3D avatar is ready! Here's your avatar URL:\n\n\
         <code>{}</code>\n\n\
         You can use this URL to display your avatar in compatible applications.\n\n\
         Want to create another avatar? Just use /start again!",
        html::escape(avatar_url)
    )
}
