use std::fmt;

use crate::error::DbError;

/// MySQL limit on schema identifiers.
const MAX_NAME_LEN: usize = 64;

/// A database name made of letters, digits, `_` and `$`.
///
/// Non-ASCII letters and digits are accepted when they lie in the Basic
/// Multilingual Plane, as MySQL requires for identifiers.
/// Identifiers cannot be bound as query parameters, so the name is checked
/// against this allow-list before being interpolated into DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseName(String);

impl DatabaseName {
    pub fn parse(raw: &str) -> Result<Self, DbError> {
        let invalid = |reason| DbError::InvalidName {
            name: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("name is empty"));
        }
        if raw.chars().count() > MAX_NAME_LEN {
            return Err(invalid("name is longer than 64 characters"));
        }
        if !raw
            .chars()
            .all(|c| c == '_' || c == '$' || (c.is_alphanumeric() && u32::from(c) <= 0xFFFF))
        {
            return Err(invalid("only letters, digits, '_' and '$' are allowed"));
        }

        Ok(Self(raw.to_string()))
    }

    /// Resolve the name from the `DB_NAME` setting.
    pub fn from_setting(value: Option<&str>) -> Result<Self, DbError> {
        match value {
            Some(raw) => Self::parse(raw),
            None => Err(DbError::MissingSetting("DB_NAME")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `CREATE DATABASE IF NOT EXISTS` for this name.
    pub fn create_statement(&self) -> String {
        format!("CREATE DATABASE IF NOT EXISTS `{}`", self.0)
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
