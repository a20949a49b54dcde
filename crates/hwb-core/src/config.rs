use std::{env, fmt, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Typed configuration, built once at startup and handed to every component.
#[derive(Clone)]
pub struct Config {
    // Secrets
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    // Review API
    pub endpoint: String,
    pub http_timeout: Duration,

    // Poll loop
    pub retry_period: Duration,
}

impl Config {
    /// Load `.env` (without overriding the real environment) and read the
    /// process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// All required variables are checked before returning, so the error names
    /// every missing one at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "отсутствуют обязательные переменные окружения: {}",
                missing.join(", ")
            )));
        }

        let practicum_token = get("PRACTICUM_TOKEN").unwrap_or_default();
        let telegram_token = get("TELEGRAM_TOKEN").unwrap_or_default();
        let raw_chat_id = get("TELEGRAM_CHAT_ID").unwrap_or_default();
        let telegram_chat_id = raw_chat_id
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID должен быть целым числом, получено: {raw_chat_id}"
                ))
            })?;

        let endpoint = get("PRACTICUM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let http_timeout = parse_secs(get("HTTP_TIMEOUT_SECS")).unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let retry_period = parse_secs(get("RETRY_PERIOD_SECS")).unwrap_or(DEFAULT_RETRY_PERIOD);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            http_timeout,
            retry_period,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &mask(&self.practicum_token))
            .field("telegram_token", &mask(&self.telegram_token))
            .field("telegram_chat_id", &self.telegram_chat_id.0)
            .field("endpoint", &self.endpoint)
            .field("http_timeout_secs", &self.http_timeout.as_secs())
            .field("retry_period_secs", &self.retry_period.as_secs())
            .finish()
    }
}

fn mask(s: &str) -> String {
    let head: String = s.chars().take(3).collect();
    if s.chars().count() <= 6 {
        "***".to_string()
    } else {
        format!("{head}***")
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parse_secs(v: Option<String>) -> Option<Duration> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_required_and_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p-token"),
            ("TELEGRAM_TOKEN", "t-token"),
            ("TELEGRAM_CHAT_ID", "12345"),
        ]))
        .unwrap();

        assert_eq!(cfg.practicum_token, "p-token");
        assert_eq!(cfg.telegram_chat_id, ChatId(12345));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.retry_period, Duration::from_secs(600));
        assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn names_every_missing_variable() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_TOKEN", "t-token")])).unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, Error::Config(_)));
        assert!(text.contains("PRACTICUM_TOKEN"), "{text}");
        assert!(text.contains("TELEGRAM_CHAT_ID"), "{text}");
        assert!(!text.contains("TELEGRAM_TOKEN"), "{text}");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "   "),
            ("TELEGRAM_TOKEN", "t-token"),
            ("TELEGRAM_CHAT_ID", "1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PRACTICUM_TOKEN"));
    }

    #[test]
    fn rejects_non_numeric_chat_id() {
        let err = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "@channel"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn optional_overrides_are_read() {
        let cfg = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "-100200"),
            ("PRACTICUM_ENDPOINT", "http://127.0.0.1:8080/hw/"),
            ("RETRY_PERIOD_SECS", "5"),
            ("HTTP_TIMEOUT_SECS", "bogus"),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_chat_id, ChatId(-100200));
        assert_eq!(cfg.endpoint, "http://127.0.0.1:8080/hw/");
        assert_eq!(cfg.retry_period, Duration::from_secs(5));
        assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn debug_output_masks_secrets() {
        let cfg = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "y0_AgAAAAsecretsecret"),
            ("TELEGRAM_TOKEN", "123456:ABCDEF"),
            ("TELEGRAM_CHAT_ID", "1"),
        ]))
        .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secretsecret"), "{dbg}");
        assert!(!dbg.contains("ABCDEF"), "{dbg}");
    }

    #[test]
    fn dotenv_parses_quotes_and_comments() {
        let parsed = parse_dotenv("# comment\nexport A=\"one\"\nB='two'\n\nC = three\nbroken\n");
        assert_eq!(
            parsed,
            vec![
                ("A".to_string(), "one".to_string()),
                ("B".to_string(), "two".to_string()),
                ("C".to_string(), "three".to_string()),
            ]
        );
    }
}
