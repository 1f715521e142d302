use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::record::{AgeBracket, Gender};

/// Number of companion slots on the medevac form
pub const MEDEVAC_COMPANION_SLOTS: usize = 3;

/// How a medevac form identifies someone on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// Exact bracelet number
    Bracelet(String),
    /// Age bracket and gender only; ambiguous whenever several people share
    /// the pair, in which case the first one in roster order is taken.
    AgeGender { age: AgeBracket, gender: Gender },
    /// A filled-in age whose bracket or gender cannot be read. The person
    /// still left the vessel, but nobody on the roster can be matched.
    Unresolved(String),
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Bracelet(b) => write!(f, "bracelet {}", b),
            Identity::AgeGender { age, gender } => write!(f, "{} {}", gender, age),
            Identity::Unresolved(age) => write!(f, "unreadable age/gender '{}'", age),
        }
    }
}

/// One medical evacuation: a primary evacuee plus up to three companions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedevacEvent {
    pub evacuee: Option<Identity>,
    /// Companion identities in slot order; empty slots are left out
    #[serde(default)]
    pub companions: Vec<Identity>,
    pub submitted_at: Option<NaiveDateTime>,
}

/// A non-medical removal from the roster, e.g. a transfer ashore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisembarkEvent {
    /// Everyone from the listed rescues
    ByRescue { rescues: Vec<u32> },
    /// Everyone whose bracelet lies in `start..=end`
    ByBraceletRange { start: i64, end: i64 },
    /// Everyone whose bracelet is listed
    ByBraceletList { bracelets: Vec<String> },
}

impl std::fmt::Display for DisembarkEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisembarkEvent::ByRescue { rescues } => write!(f, "rescues {:?}", rescues),
            DisembarkEvent::ByBraceletRange { start, end } => {
                write!(f, "bracelets {}..={}", start, end)
            }
            DisembarkEvent::ByBraceletList { bracelets } => {
                write!(f, "bracelets [{}]", bracelets.join(", "))
            }
        }
    }
}
