use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

/// Suffix appended to a model identifier to form the element id of its
/// completion panel.
pub const COMPLETION_ELEMENT_SUFFIX: &str = "-completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceIndex(pub u64);

impl InstanceIndex {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    pub fn address(self) -> String {
        format!("/instances/{}", self.0)
    }
}

impl fmt::Display for InstanceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn element_id(&self) -> String {
        format!("{}{COMPLETION_ELEMENT_SUFFIX}", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Which of the two completion panels a judgment refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    A,
    B,
}

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseValueError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str().eq_ignore_ascii_case(raw))
                    .ok_or_else(|| ParseValueError::new(stringify!($name), raw, Self::ALL.iter().map(|v| v.as_str())))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptability {
    Yes,
    No,
}

wire_enum!(Acceptability { Yes => "yes", No => "no" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    AIsBetter,
    AIsSlightlyBetter,
    Tie,
    BIsSlightlyBetter,
    BIsBetter,
}

wire_enum!(Preference {
    AIsBetter => "a-is-better",
    AIsSlightlyBetter => "a-is-slightly-better",
    Tie => "tie",
    BIsSlightlyBetter => "b-is-slightly-better",
    BIsBetter => "b-is-better",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceQuality {
    Good,
    Acceptable,
    Poor,
}

wire_enum!(InstanceQuality {
    Good => "good",
    Acceptable => "acceptable",
    Poor => "poor",
});
