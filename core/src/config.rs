/// Configuration for the replay tool
use crate::error::{Result, StoreError};
use crate::types::UserId;
use std::path::PathBuf;

/// Session configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// User whose point of view recipient lists are computed from
    pub current_user_id: UserId,

    /// JSON array of `{user_id, email, full_name}`
    pub people_path: PathBuf,

    /// One raw wire message per line
    pub messages_path: PathBuf,

    /// Print each finished message as JSON instead of a summary
    pub json_output: bool,
}

impl StoreConfig {
    /// Create config from command line arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() < 2 {
            return Err(StoreError::Config(format!(
                "Usage: {} <messages.jsonl> --people <people.json> --me <user_id> [--json]",
                args.first().map(String::as_str).unwrap_or("msgstore")
            )));
        }

        let messages_path = PathBuf::from(&args[1]);
        let mut people_path: Option<PathBuf> = None;
        let mut current_user_id: Option<UserId> = None;
        let mut json_output = false;

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--people" => {
                    let path = args.get(i + 1).ok_or_else(|| {
                        StoreError::Config("--people requires a path argument".to_string())
                    })?;
                    people_path = Some(PathBuf::from(path));
                    i += 2;
                }
                "--me" => {
                    let id = args.get(i + 1).ok_or_else(|| {
                        StoreError::Config("--me requires a user id argument".to_string())
                    })?;
                    current_user_id = Some(parse_user_id(id)?);
                    i += 2;
                }
                "--json" => {
                    json_output = true;
                    i += 1;
                }
                other => {
                    return Err(StoreError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }

        // Env overrides
        if let Ok(id) = std::env::var("MSGSTORE_ME") {
            current_user_id = Some(parse_user_id(&id)?);
        }
        if let Ok(path) = std::env::var("MSGSTORE_PEOPLE") {
            people_path = Some(PathBuf::from(path));
        }

        Ok(Self {
            current_user_id: current_user_id.ok_or_else(|| {
                StoreError::Config("current user id is required (--me or MSGSTORE_ME)".to_string())
            })?,
            people_path: people_path.ok_or_else(|| {
                StoreError::Config("people file is required (--people or MSGSTORE_PEOPLE)".to_string())
            })?,
            messages_path,
            json_output,
        })
    }
}

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.trim()
        .parse::<UserId>()
        .map_err(|_| StoreError::Config(format!("Invalid user id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_args() {
        let config = StoreConfig::from_args(&args(&[
            "msgstore",
            "feed.jsonl",
            "--people",
            "people.json",
            "--me",
            "101",
            "--json",
        ]))
        .unwrap();

        assert_eq!(config.current_user_id, 101);
        assert_eq!(config.people_path, PathBuf::from("people.json"));
        assert_eq!(config.messages_path, PathBuf::from("feed.jsonl"));
        assert!(config.json_output);
    }

    #[test]
    fn test_usage_error() {
        let err = StoreConfig::from_args(&args(&["msgstore"])).unwrap_err();
        assert!(err.to_string().contains("Usage: msgstore"));
    }

    #[test]
    fn test_bad_user_id() {
        let err = StoreConfig::from_args(&args(&[
            "msgstore",
            "feed.jsonl",
            "--me",
            "alice",
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_unknown_flag() {
        let err = StoreConfig::from_args(&args(&["msgstore", "feed.jsonl", "--verbose"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown argument: --verbose"
        );
    }
}
