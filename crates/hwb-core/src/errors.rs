/// Core error type for the homework bot.
///
/// Adapter crates map their transport errors into this type so the poll loop
/// can render every failure the same way. Variants carry structured context;
/// the user-facing text is produced by `Display` only when the loop reports
/// the failure to the chat.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ошибка конфигурации: {0}")]
    Config(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("неверный тип данных {what}: ожидался {expected}, получен {found}")]
    TypeMismatch {
        what: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("в ответе API отсутствует ключ \"{key}\"")]
    MissingKey { key: String },

    #[error("неожиданный статус домашней работы: {}", .status.as_deref().unwrap_or("<нет>"))]
    UnknownStatus { status: Option<String> },

    #[error("не удалось отправить сообщение: {0}")]
    Send(String),
}

/// Failure to get a usable answer from the review API.
///
/// Transport failures and non-200 responses are the same kind of error for the
/// loop; they stay separate variants so logs can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("ошибка отправки запроса к эндпоинту {endpoint} (from_date={from_date}): {reason}")]
    Transport {
        endpoint: String,
        from_date: i64,
        reason: String,
    },

    #[error("ошибка запроса к эндпоинту {endpoint}: {status} {reason}")]
    Status {
        endpoint: String,
        status: u16,
        reason: String,
    },
}

/// Short JSON type name used in `TypeMismatch` errors.
pub fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dict",
    }
}

pub type Result<T> = std::result::Result<T, Error>;
