use serde_json::Value;

/// Data the avatar web app posts back through `Telegram.WebApp.sendData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPayload {
    pub avatar_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("web app data is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("web app data has no avatarUrl")]
    MissingAvatarUrl,
}

impl AvatarPayload {
    /// Parse the raw `web_app_data.data` string.
    ///
    /// Anything other than an object carrying a non-empty string `avatarUrl`
    /// is treated as a missing field.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(raw).map_err(PayloadError::Malformed)?;
        let avatar_url = value
            .as_object()
            .and_then(|obj| obj.get("avatarUrl"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or(PayloadError::MissingAvatarUrl)?;
        Ok(Self {
            avatar_url: avatar_url.to_string(),
        })
    }
}
