//! Review API answer handling: response shape checks and status messages.
//!
//! Expected answer:
//! `{"homeworks": [{"homework_name": "...", "status": "approved", ...}], "current_date": 1700000000}`

use serde_json::Value;

use crate::{
    domain::Cursor,
    errors::{json_type_name, Error},
    Result,
};

pub const KEY_HOMEWORKS: &str = "homeworks";
pub const KEY_CURRENT_DATE: &str = "current_date";
pub const KEY_HOMEWORK_NAME: &str = "homework_name";
pub const KEY_STATUS: &str = "status";

/// Review verdicts known to the bot. Anything else is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict shown in the chat.
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Check that the answer is an object with a `homeworks` list and a
/// `current_date` entry. Nested records are checked by [`parse_status`].
pub fn validate_response(response: &Value) -> Result<()> {
    tracing::debug!("validating review API answer");

    let Some(obj) = response.as_object() else {
        return Err(type_mismatch("ответа API", "dict", response));
    };

    for key in [KEY_HOMEWORKS, KEY_CURRENT_DATE] {
        if !obj.contains_key(key) {
            return Err(Error::MissingKey {
                key: key.to_string(),
            });
        }
    }

    let homeworks = &obj[KEY_HOMEWORKS];
    if !homeworks.is_array() {
        return Err(type_mismatch(
            "под ключом \"homeworks\"",
            "list",
            homeworks,
        ));
    }

    tracing::debug!("review API answer is valid");
    Ok(())
}

/// Homework records of a validated answer. Empty if the answer was not
/// validated first.
pub fn homeworks(response: &Value) -> &[Value] {
    response
        .get(KEY_HOMEWORKS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// The server-side timestamp of the answer, used as the next cursor.
pub fn current_date(response: &Value) -> Result<Cursor> {
    let Some(v) = response.get(KEY_CURRENT_DATE) else {
        return Err(Error::MissingKey {
            key: KEY_CURRENT_DATE.to_string(),
        });
    };
    v.as_i64()
        .map(Cursor)
        .ok_or_else(|| type_mismatch("под ключом \"current_date\"", "int", v))
}

/// Build the chat message for one homework record.
pub fn parse_status(homework: &Value) -> Result<String> {
    let Some(record) = homework.as_object() else {
        return Err(type_mismatch("домашней работы", "dict", homework));
    };

    let name = record
        .get(KEY_HOMEWORK_NAME)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::MissingKey {
            key: KEY_HOMEWORK_NAME.to_string(),
        })?;

    let raw_status = record.get(KEY_STATUS);
    let status = raw_status
        .and_then(Value::as_str)
        .and_then(HomeworkStatus::from_key)
        .ok_or_else(|| Error::UnknownStatus {
            status: raw_status.map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        })?;

    tracing::debug!(homework = name, status = status.key(), "parsed homework status");

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.verdict()
    ))
}

fn type_mismatch(what: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        what: what.to_string(),
        expected,
        found: json_type_name(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_answer() {
        let resp = json!({"homeworks": [], "current_date": 1700000000});
        validate_response(&resp).unwrap();
        assert!(homeworks(&resp).is_empty());
        assert_eq!(current_date(&resp).unwrap(), Cursor(1700000000));
    }

    #[test]
    fn rejects_non_object_answer() {
        let err = validate_response(&json!([{"homeworks": []}])).unwrap_err();
        assert!(
            matches!(err, Error::TypeMismatch { expected: "dict", found: "list", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_missing_keys() {
        for resp in [json!({"current_date": 1}), json!({"homeworks": []})] {
            let err = validate_response(&resp).unwrap_err();
            assert!(matches!(err, Error::MissingKey { .. }), "{err:?}");
        }

        let err = validate_response(&json!({"current_date": 1})).unwrap_err();
        assert!(err.to_string().contains("homeworks"));
        let err = validate_response(&json!({"homeworks": []})).unwrap_err();
        assert!(err.to_string().contains("current_date"));
    }

    #[test]
    fn rejects_homeworks_that_are_not_a_list() {
        let err =
            validate_response(&json!({"homeworks": {"homework_name": "hw"}, "current_date": 1}))
                .unwrap_err();
        assert!(
            matches!(err, Error::TypeMismatch { expected: "list", found: "dict", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn current_date_must_be_integer() {
        let err = current_date(&json!({"homeworks": [], "current_date": "yesterday"})).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: "int", .. }), "{err:?}");
    }

    #[test]
    fn every_known_status_yields_its_verdict() {
        for status in HomeworkStatus::ALL {
            let msg = parse_status(&json!({
                "homework_name": "kittygram_final",
                "status": status.key(),
            }))
            .unwrap();
            assert!(msg.contains("kittygram_final"), "{msg}");
            assert!(msg.ends_with(status.verdict()), "{msg}");
        }
    }

    #[test]
    fn approved_message_has_exact_text() {
        let msg = parse_status(&json!({"homework_name": "hw1", "status": "approved"})).unwrap();
        assert_eq!(
            msg,
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn unknown_or_missing_status_is_rejected() {
        let err = parse_status(&json!({"homework_name": "hw1", "status": "lost"})).unwrap_err();
        assert!(
            matches!(&err, Error::UnknownStatus { status: Some(s) } if s == "lost"),
            "{err:?}"
        );

        let err = parse_status(&json!({"homework_name": "hw1"})).unwrap_err();
        assert!(matches!(err, Error::UnknownStatus { status: None }), "{err:?}");

        let err = parse_status(&json!({"homework_name": "hw1", "status": 3})).unwrap_err();
        assert!(matches!(err, Error::UnknownStatus { status: Some(_) }), "{err:?}");
    }

    #[test]
    fn missing_or_empty_name_is_rejected() {
        for record in [
            json!({"status": "approved"}),
            json!({"homework_name": "", "status": "approved"}),
            json!({"homework_name": null, "status": "approved"}),
        ] {
            let err = parse_status(&record).unwrap_err();
            assert!(
                matches!(&err, Error::MissingKey { key } if key == "homework_name"),
                "{err:?}"
            );
        }
    }

    #[test]
    fn record_must_be_object() {
        let err = parse_status(&json!("hw1")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }), "{err:?}");
    }
}
