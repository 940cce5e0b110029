use core::{
    cmp::Ordering,
    fmt::{Display, Error as FmtError, Formatter},
    str::FromStr,
};

use serde_derive::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A block height, qualified by the revision (epoch) of the chain that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Height {
    /// Previously known as "epoch"
    revision_number: u64,

    /// The height of a block
    revision_height: u64,
}

impl Height {
    pub fn new(revision_number: u64, revision_height: u64) -> Result<Self, ValidationError> {
        if revision_height == 0 {
            return Err(ValidationError::zero_height());
        }

        Ok(Self {
            revision_number,
            revision_height,
        })
    }

    pub fn revision_number(&self) -> u64 {
        self.revision_number
    }

    pub fn revision_height(&self) -> u64 {
        self.revision_height
    }

    pub fn increment(self) -> Self {
        self.add(1)
    }

    pub fn add(&self, delta: u64) -> Height {
        Height {
            revision_number: self.revision_number,
            revision_height: self.revision_height.saturating_add(delta),
        }
    }
}

impl PartialOrd for Height {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Height {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.revision_number < other.revision_number {
            Ordering::Less
        } else if self.revision_number > other.revision_number {
            Ordering::Greater
        } else if self.revision_height < other.revision_height {
            Ordering::Less
        } else if self.revision_height > other.revision_height {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl Display for Height {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl FromStr for Height {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (revision_number, revision_height) = s
            .split_once('-')
            .ok_or_else(|| ValidationError::invalid_height(s.to_string()))?;

        let revision_number = revision_number
            .parse::<u64>()
            .map_err(|_| ValidationError::invalid_height(s.to_string()))?;

        let revision_height = revision_height
            .parse::<u64>()
            .map_err(|_| ValidationError::invalid_height(s.to_string()))?;

        Height::new(revision_number, revision_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn height_ordering_is_revision_first() {
        let low = Height::new(1, 100).unwrap();
        let high = Height::new(2, 1).unwrap();
        assert!(low < high);
        assert!(low.increment() > low);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert!(Height::new(0, 0).is_err());
    }

    #[test]
    fn parse_height() {
        let height: Height = "1-42".parse().unwrap();
        assert_eq!(height, Height::new(1, 42).unwrap());
        assert_eq!(height.to_string(), "1-42");

        assert!("42".parse::<Height>().is_err());
        assert!("1-0".parse::<Height>().is_err());
    }
}
