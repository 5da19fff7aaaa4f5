//! Domain types shared by storage, core and API layers

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult, ErrorCode};

const MICROS_PER_UNIT: i64 = 1_000_000;

/// USD per million tokens, held exactly as micro-dollars (6 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Cost(i64);

impl Cost {
    pub const ZERO: Cost = Cost(0);

    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn micros(&self) -> i64 {
        self.0
    }
}

impl FromStr for Cost {
    type Err = AppError;

    /// Parse "1.25" / "0.000125" / "10" into an exact cost
    fn from_str(raw: &str) -> AppResult<Self> {
        let invalid = || {
            AppError::new(
                ErrorCode::ApiBadRequest,
                format!("Invalid cost {:?}: expected a non-negative decimal with at most 6 places", raw),
            )
        };

        let s = raw.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 6
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_micros: i64 = if frac.is_empty() {
            0
        } else {
            // right-pad to 6 digits: "25" -> 250000
            format!("{:0<6}", frac).parse().map_err(|_| invalid())?
        };

        whole
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|w| w.checked_add(frac_micros))
            .map(Cost)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / MICROS_PER_UNIT, self.0 % MICROS_PER_UNIT)
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Account record (API key hash is never loaded into this struct)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields accepted when creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// A priced OpenAI model users can be granted
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PricedModel {
    pub id: i64,
    pub name: String,
    pub input_cost: Cost,
    pub cached_input_cost: Option<Cost>,
    pub output_cost: Option<Cost>,
}

impl fmt::Display for PricedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Cost defaults used by get-or-create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelCosts {
    pub input: Cost,
    pub cached_input: Option<Cost>,
    pub output: Option<Cost>,
}

/// Join a model list for display ("gpt-4o, o3")
pub fn model_names(models: &[PricedModel]) -> String {
    models
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_parse() {
        assert_eq!("1.25".parse::<Cost>().unwrap().micros(), 1_250_000);
        assert_eq!("0.005".parse::<Cost>().unwrap().micros(), 5_000);
        assert_eq!("150".parse::<Cost>().unwrap().micros(), 150_000_000);
        assert_eq!(".5".parse::<Cost>().unwrap().micros(), 500_000);
        assert_eq!("0.000001".parse::<Cost>().unwrap().micros(), 1);
    }

    #[test]
    fn test_cost_rejects_garbage() {
        assert!("".parse::<Cost>().is_err());
        assert!("-1.0".parse::<Cost>().is_err());
        assert!("1.0000001".parse::<Cost>().is_err());
        assert!("abc".parse::<Cost>().is_err());
        assert!("1.2.3".parse::<Cost>().is_err());
    }

    #[test]
    fn test_cost_display() {
        assert_eq!("0.075".parse::<Cost>().unwrap().to_string(), "0.075000");
        assert_eq!("600".parse::<Cost>().unwrap().to_string(), "600.000000");
        assert_eq!(Cost::ZERO.to_string(), "0.000000");
    }

    #[test]
    fn test_cost_serializes_as_string() {
        let cost: Cost = "2.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&cost).unwrap(), "\"2.500000\"");
    }
}
