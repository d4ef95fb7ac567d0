use std::sync::LazyLock;

use regex::Regex;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const WEB_APP_URL_VAR: &str = "WEB_APP_URL";

/// Values shipped in `.env.example`; seeing them means setup was never finished.
pub const BOT_TOKEN_PLACEHOLDER: &str = "your_bot_token_here";
pub const WEB_APP_URL_PLACEHOLDER: &str = "your_web_app_url_here";

static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:[A-Za-z0-9_-]+$").expect("static token pattern"));

/// Why a configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is still the placeholder value")]
    Placeholder(&'static str),
    #[error("BOT_TOKEN format looks incorrect")]
    MalformedToken,
    #[error("WEB_APP_URL must be HTTPS (required by Telegram)")]
    InsecureUrl,
    #[error("WEB_APP_URL is not a valid URL: {0}")]
    InvalidUrl(String),
}

impl ConfigIssue {
    /// One-line remediation tip shown under the error.
    pub fn hint(&self) -> &'static str {
        match self {
            ConfigIssue::Missing(BOT_TOKEN_VAR) | ConfigIssue::Placeholder(BOT_TOKEN_VAR) => {
                "Get your token from @BotFather on Telegram"
            }
            ConfigIssue::Missing(_) => "Set this to your GitHub Pages URL or ngrok URL",
            ConfigIssue::Placeholder(_) => "Deploy the web app to GitHub Pages and use that URL",
            ConfigIssue::MalformedToken => "Should be like: 123456789:ABCdefGhIjKlmNoPQRsTUVwxyZ",
            ConfigIssue::InsecureUrl => "Use GitHub Pages or ngrok for HTTPS",
            ConfigIssue::InvalidUrl(_) => "Should be like: https://username.github.io/avatar-app/",
        }
    }
}

/// Check the shape of a bot token: `<digits>:<alphanumeric, '_' or '-'>+`.
pub fn check_bot_token(token: Option<&str>) -> Result<&str, ConfigIssue> {
    let token = token.ok_or(ConfigIssue::Missing(BOT_TOKEN_VAR))?;
    if token == BOT_TOKEN_PLACEHOLDER {
        return Err(ConfigIssue::Placeholder(BOT_TOKEN_VAR));
    }
    if !BOT_TOKEN_RE.is_match(token) {
        return Err(ConfigIssue::MalformedToken);
    }
    Ok(token)
}

/// Check the shape of the web app URL. Telegram only opens HTTPS web apps,
/// and the launch button needs a URL that actually parses.
pub fn check_web_app_url(url: Option<&str>) -> Result<&str, ConfigIssue> {
    let url = url.ok_or(ConfigIssue::Missing(WEB_APP_URL_VAR))?;
    if url == WEB_APP_URL_PLACEHOLDER {
        return Err(ConfigIssue::Placeholder(WEB_APP_URL_VAR));
    }
    if !url.starts_with("https://") {
        return Err(ConfigIssue::InsecureUrl);
    }
    match reqwest::Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(url),
        Ok(_) => Err(ConfigIssue::InvalidUrl("missing host".to_string())),
        Err(e) => Err(ConfigIssue::InvalidUrl(e.to_string())),
    }
}

/// Unvalidated snapshot of the process configuration.
///
/// Read once at process entry. Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub bot_token: Option<String>,
    pub web_app_url: Option<String>,
}

impl RawConfig {
    /// Load `.env` (if present) and read both variables from the environment.
    /// Variables already set in the environment win over `.env`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            bot_token: read_var(BOT_TOKEN_VAR),
            web_app_url: read_var(WEB_APP_URL_VAR),
        }
    }

    pub fn new(bot_token: Option<&str>, web_app_url: Option<&str>) -> Self {
        Self {
            bot_token: bot_token.map(str::to_string),
            web_app_url: web_app_url.map(str::to_string),
        }
    }

    /// Validate both values, token first.
    pub fn validate(&self) -> Result<Config, ConfigIssue> {
        let bot_token = check_bot_token(self.bot_token.as_deref())?;
        let web_app_url = check_web_app_url(self.web_app_url.as_deref())?;
        Ok(Config {
            bot_token: bot_token.to_string(),
            web_app_url: web_app_url.to_string(),
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Validated configuration, immutable for the life of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub bot_token: String,
    pub web_app_url: String,
}

impl Config {
    /// Numeric bot id, the part of the token before the colon.
    pub fn bot_id(&self) -> &str {
        self.bot_token
            .split_once(':')
            .map(|(id, _)| id)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &format_args!("{}:***", self.bot_id()))
            .field("web_app_url", &self.web_app_url)
            .finish()
    }
}
