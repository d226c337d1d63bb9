use chrono::{Datelike, Utc};

/// Earliest year accepted by [`YearPolicy::Historical`].
pub const HISTORICAL_MIN_YEAR: i32 = 1800;

/// Rule applied to `published_year` before a book reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearPolicy {
    /// Any year >= 0
    #[default]
    NonNegative,
    /// From `min` up to and including the current UTC year
    Historical { min: i32 },
}

impl YearPolicy {
    pub fn historical() -> Self {
        YearPolicy::Historical {
            min: HISTORICAL_MIN_YEAR,
        }
    }

    pub fn check(&self, year: i32) -> Result<(), String> {
        match *self {
            YearPolicy::NonNegative if year < 0 => Err("Year must be positive".to_string()),
            YearPolicy::NonNegative => Ok(()),
            YearPolicy::Historical { min } => {
                let max = Utc::now().year();
                if (min..=max).contains(&year) {
                    Ok(())
                } else {
                    Err(format!("Year must be between {min} and {max}"))
                }
            }
        }
    }
}
