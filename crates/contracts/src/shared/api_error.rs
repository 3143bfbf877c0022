use thiserror::Error;

/// Подпись временной ошибки бэкенда (исчерпан пул соединений БД)
pub const TRANSIENT_SIGNATURE: &str = "connection slots are reserved";

/// Ошибка обращения к API бэкенда
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Запрос не дошёл до бэкенда или вернул не-2xx статус
    #[error("{0}")]
    Transport(String),

    /// Бэкенд ответил `success: false`
    #[error("{0}")]
    Backend(String),

    /// Ответ не удалось разобрать
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        ApiError::Backend(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode(message.into())
    }

    /// Текст ошибки без префиксов
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport(m) | ApiError::Backend(m) | ApiError::Decode(m) => m,
        }
    }

    /// Ошибка считается временной, если её текст содержит подпись
    pub fn is_transient(&self, signature: &str) -> bool {
        !signature.is_empty() && self.message().contains(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_detection() {
        let err = ApiError::backend(
            "remaining connection slots are reserved for non-replication superuser connections",
        );
        assert!(err.is_transient(TRANSIENT_SIGNATURE));

        let err = ApiError::transport("HTTP 500");
        assert!(!err.is_transient(TRANSIENT_SIGNATURE));
    }

    #[test]
    fn test_empty_signature_never_matches() {
        assert!(!ApiError::backend("anything").is_transient(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(ApiError::backend("boom").to_string(), "boom");
        assert_eq!(
            ApiError::decode("eof").to_string(),
            "Failed to parse response: eof"
        );
    }
}
