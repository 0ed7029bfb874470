use std::fmt;

/// Star rating in the closed range 0..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    /// Maps the word marker used by the listing site to a rating
    ///
    /// Unrecognized words (including the site's own "Zero") map to 0.
    pub fn from_word(word: &str) -> Self {
        let value = match word {
            "One" => 1,
            "Two" => 2,
            "Three" => 3,
            "Four" => 4,
            "Five" => 5,
            _ => 0,
        };
        Self(value)
    }

    /// Extracts the rating from the marker's class list, e.g. `star-rating Three`
    ///
    /// The word is the token following `star-rating`.
    pub fn from_class_list(classes: &str) -> Self {
        let mut tokens = classes.split_whitespace();
        match tokens.position(|token| token == "star-rating") {
            Some(_) => tokens.next().map(Self::from_word).unwrap_or_default(),
            None => Self::default(),
        }
    }

    /// Builds a rating from a stored value, rejecting anything above 5
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
