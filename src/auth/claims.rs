use serde::{Deserialize, Serialize};
use time::Duration;

/// How long an issued token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTtl {
    /// One hour.
    Short,
    /// Thirty days.
    Long,
}

impl TokenTtl {
    /// `"short"` and `"1h"` select [`TokenTtl::Short`]; anything else is long-lived.
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "short" | "1h" => TokenTtl::Short,
            _ => TokenTtl::Long,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            TokenTtl::Short => Duration::hours(1),
            TokenTtl::Long => Duration::days(30),
        }
    }
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i32,        // user ID
    pub email: String,  // email at issue time
    pub iat: i64,       // issued at (unix timestamp)
    pub exp: i64,       // expires at (unix timestamp)
}
