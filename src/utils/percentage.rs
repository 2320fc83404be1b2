use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. {
            None
        } else {
            Some(Percentage(value))
        }
    }

    pub fn zero() -> Percentage {
        Percentage(0.)
    }
}

impl FromStr for Percentage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end_matches("%");
        let v = s.parse::<f64>()?;
        Percentage::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into percentage"))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`. An empty whole gives 0%.
pub fn minutes_percentage(value: u32, whole: u32) -> Percentage {
    if whole == 0 {
        return Percentage::zero();
    }
    Percentage(value as f64 * 100. / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::{minutes_percentage, Percentage};

    #[test]
    fn test_minutes_percentage() {
        assert_eq!(*minutes_percentage(45, 60), 75.);
        assert_eq!(*minutes_percentage(0, 0), 0.);
        assert_eq!(minutes_percentage(1, 3).to_string(), "33%");
    }

    #[test]
    fn test_parse() {
        assert_eq!(*"12.5%".parse::<Percentage>().unwrap(), 12.5);
        assert!("-3".parse::<Percentage>().is_err());
    }
}
