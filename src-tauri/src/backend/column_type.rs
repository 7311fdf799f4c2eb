use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::util::error;

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
/// The column types offered when designing a table.
pub enum ColumnType {
    #[default]
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "DOUBLE PRECISION")]
    DoublePrecision,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
    #[serde(rename = "UUID")]
    Uuid,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "JSONB")]
    Jsonb,
    #[serde(rename = "BYTEA")]
    Bytea,
    #[serde(rename = "VARCHAR")]
    Varchar,
    #[serde(rename = "CHAR")]
    Char,
}

impl ColumnType {
    /// Every type, in the order the type dropdown lists them.
    pub const ALL: [ColumnType; 17] = [
        Self::Text,
        Self::Integer,
        Self::BigInt,
        Self::SmallInt,
        Self::Decimal,
        Self::Real,
        Self::DoublePrecision,
        Self::Boolean,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Uuid,
        Self::Json,
        Self::Jsonb,
        Self::Bytea,
        Self::Varchar,
        Self::Char,
    ];

    /// Gets the SQL name of the type.
    pub fn as_str(&self) -> &'static str {
        return match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::SmallInt => "SMALLINT",
            Self::Decimal => "DECIMAL",
            Self::Real => "REAL",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
            Self::Jsonb => "JSONB",
            Self::Bytea => "BYTEA",
            Self::Varchar => "VARCHAR",
            Self::Char => "CHAR",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = error::Error;

    /// Parses a type name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        return Self::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| error::Error::UnknownColumnType(wanted.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient_about_case_and_padding() {
        assert_eq!(" double precision ".parse::<ColumnType>().unwrap(), ColumnType::DoublePrecision);
        assert_eq!("jsonb".parse::<ColumnType>().unwrap(), ColumnType::Jsonb);
        assert!("TEXT; DROP TABLE x".parse::<ColumnType>().is_err());
    }

    #[test]
    fn serde_uses_sql_names() {
        for t in ColumnType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
        assert_eq!(ColumnType::default(), ColumnType::Text);
    }
}
