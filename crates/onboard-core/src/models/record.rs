use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Age brackets collected by the intake survey, in canonical youngest-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub enum AgeBracket {
    #[serde(rename = "u1")]
    UnderOne,
    #[serde(rename = "1_4")]
    OneToFour,
    #[serde(rename = "5_13")]
    FiveToThirteen,
    #[serde(rename = "5_17")]
    FiveToSeventeen,
    #[serde(rename = "14_17")]
    FourteenToSeventeen,
    #[serde(rename = "18_50")]
    EighteenToFifty,
    #[serde(rename = "50p")]
    OverFifty,
}

impl AgeBracket {
    /// Every bracket, youngest first
    pub const ALL: [AgeBracket; 7] = [
        AgeBracket::UnderOne,
        AgeBracket::OneToFour,
        AgeBracket::FiveToThirteen,
        AgeBracket::FiveToSeventeen,
        AgeBracket::FourteenToSeventeen,
        AgeBracket::EighteenToFifty,
        AgeBracket::OverFifty,
    ];

    /// Brackets that describe minors, youngest first
    pub const MINORS: [AgeBracket; 5] = [
        AgeBracket::UnderOne,
        AgeBracket::OneToFour,
        AgeBracket::FiveToThirteen,
        AgeBracket::FiveToSeventeen,
        AgeBracket::FourteenToSeventeen,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() == code.trim())
    }

    /// Survey code for this bracket
    pub fn code(&self) -> &'static str {
        match self {
            AgeBracket::UnderOne => "u1",
            AgeBracket::OneToFour => "1_4",
            AgeBracket::FiveToThirteen => "5_13",
            AgeBracket::FiveToSeventeen => "5_17",
            AgeBracket::FourteenToSeventeen => "14_17",
            AgeBracket::EighteenToFifty => "18_50",
            AgeBracket::OverFifty => "50p",
        }
    }

    /// Human-readable label used in report tables
    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::UnderOne => "Less than 1 year",
            AgeBracket::OneToFour => "1-4 years",
            AgeBracket::FiveToThirteen => "5-13 years",
            AgeBracket::FiveToSeventeen => "5-17 years",
            AgeBracket::FourteenToSeventeen => "14-17 years",
            AgeBracket::EighteenToFifty => "18-50 years",
            AgeBracket::OverFifty => "More than 50 years",
        }
    }

    pub fn is_adult(&self) -> bool {
        matches!(self, AgeBracket::EighteenToFifty | AgeBracket::OverFifty)
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(YesNo::Yes),
            "no" => Some(YesNo::No),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

/// Who an accompanied person is travelling with.
/// Unknown survey codes are kept verbatim so exports stay faithful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Companion {
    Parent,
    Child,
    Other,
    Unlisted(String),
}

impl Companion {
    pub fn code(&self) -> &str {
        match self {
            Companion::Parent => "parent",
            Companion::Child => "child",
            Companion::Other => "other",
            Companion::Unlisted(code) => code,
        }
    }
}

impl From<String> for Companion {
    fn from(code: String) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "parent" => Companion::Parent,
            "child" => Companion::Child,
            "other" => Companion::Other,
            _ => Companion::Unlisted(code),
        }
    }
}

impl From<Companion> for String {
    fn from(companion: Companion) -> Self {
        companion.code().to_string()
    }
}

/// One rescued person's intake submission, projected onto the canonical columns.
///
/// Optional fields are `None` when the column was not collected by the survey
/// version in use, which is different from an explicit "no".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueRecord {
    pub rescue_number: u32,
    pub age: Option<AgeBracket>,
    pub gender: Option<Gender>,
    pub pregnant: Option<YesNo>,
    pub accompanied: Option<YesNo>,
    #[serde(rename = "accompanied_by_who")]
    pub accompanied_by: Option<Companion>,
    #[serde(rename = "accompanied_by_who_adult")]
    pub accompanied_by_adult: Option<YesNo>,
    pub country: Option<String>,
    pub bracelet_number: Option<String>,
    pub disabled: Option<YesNo>,
    #[serde(rename = "_submission_time")]
    pub submission_time: Option<NaiveDateTime>,
    #[serde(rename = "start", skip_serializing)]
    pub started_at: Option<NaiveDateTime>,
    pub rotation_no: Option<u32>,
}

impl RescueRecord {
    /// A record with only the rescue number set; the remaining columns are absent.
    pub fn new(rescue_number: u32) -> Self {
        Self {
            rescue_number,
            age: None,
            gender: None,
            pregnant: None,
            accompanied: None,
            accompanied_by: None,
            accompanied_by_adult: None,
            country: None,
            bracelet_number: None,
            disabled: None,
            submission_time: None,
            started_at: None,
            rotation_no: None,
        }
    }

    pub fn is_adult(&self) -> bool {
        self.age.map(|a| a.is_adult()).unwrap_or(false)
    }

    /// Anyone not in an adult bracket, including records without an age
    pub fn is_minor(&self) -> bool {
        !self.is_adult()
    }

    pub fn is_male(&self) -> bool {
        self.gender == Some(Gender::Male)
    }

    pub fn is_female(&self) -> bool {
        self.gender == Some(Gender::Female)
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnant == Some(YesNo::Yes)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled == Some(YesNo::Yes)
    }

    pub fn travels_alone(&self) -> bool {
        self.accompanied == Some(YesNo::No)
    }

    pub fn is_accompanied(&self) -> bool {
        self.accompanied == Some(YesNo::Yes)
    }

    pub fn accompanied_by_child(&self) -> bool {
        self.accompanied_by == Some(Companion::Child)
    }

    /// Accompanied, but the companion is explicitly not an adult
    pub fn companion_not_adult(&self) -> bool {
        self.is_accompanied() && self.accompanied_by_adult == Some(YesNo::No)
    }

    /// Minor travelling without an adult guardian
    pub fn is_unaccompanied_minor(&self) -> bool {
        self.is_minor() && (self.travels_alone() || self.companion_not_adult())
    }

    /// Adult woman travelling alone or only with her children
    pub fn is_unaccompanied_woman(&self) -> bool {
        self.is_adult()
            && self.is_female()
            && (self.travels_alone() || (self.is_accompanied() && self.accompanied_by_child()))
    }

    pub fn matches_bracelet(&self, bracelet: &str) -> bool {
        self.bracelet_number.as_deref() == Some(bracelet)
    }

    pub fn matches_age_gender(&self, age: AgeBracket, gender: Gender) -> bool {
        self.age == Some(age) && self.gender == Some(gender)
    }

    /// Bracelet number as an integer for range matching; missing or
    /// non-numeric bracelets read as 0.
    pub fn bracelet_as_int(&self) -> i64 {
        self.bracelet_number
            .as_deref()
            .and_then(crate::utils::parse_whole_number)
            .unwrap_or(0)
    }

    /// Timestamp used to place the record in a rotation: when the survey was
    /// started, falling back to when it was submitted.
    pub fn window_time(&self) -> Option<NaiveDateTime> {
        self.started_at.or(self.submission_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(age: AgeBracket, gender: Gender) -> RescueRecord {
        RescueRecord {
            age: Some(age),
            gender: Some(gender),
            ..RescueRecord::new(1)
        }
    }

    #[test]
    fn test_age_bracket_codes_round_trip() {
        for bracket in AgeBracket::ALL {
            assert_eq!(AgeBracket::from_code(bracket.code()), Some(bracket));
        }
        assert_eq!(AgeBracket::from_code("99"), None);
    }

    #[test]
    fn test_age_bracket_order_is_youngest_first() {
        assert!(AgeBracket::UnderOne < AgeBracket::OneToFour);
        assert!(AgeBracket::FourteenToSeventeen < AgeBracket::EighteenToFifty);
        assert!(AgeBracket::MINORS.iter().all(|b| !b.is_adult()));
    }

    #[test]
    fn test_missing_age_counts_as_minor() {
        let record = RescueRecord::new(1);
        assert!(record.is_minor());
        assert!(!record.is_adult());
    }

    #[test]
    fn test_unaccompanied_minor_rules() {
        let mut alone = person(AgeBracket::FiveToThirteen, Gender::Male);
        alone.accompanied = Some(YesNo::No);
        assert!(alone.is_unaccompanied_minor());

        let mut with_sibling = person(AgeBracket::FourteenToSeventeen, Gender::Female);
        with_sibling.accompanied = Some(YesNo::Yes);
        with_sibling.accompanied_by_adult = Some(YesNo::No);
        assert!(with_sibling.is_unaccompanied_minor());

        let mut with_parent = person(AgeBracket::OneToFour, Gender::Female);
        with_parent.accompanied = Some(YesNo::Yes);
        with_parent.accompanied_by = Some(Companion::Parent);
        assert!(!with_parent.is_unaccompanied_minor());

        let mut adult_alone = person(AgeBracket::EighteenToFifty, Gender::Male);
        adult_alone.accompanied = Some(YesNo::No);
        assert!(!adult_alone.is_unaccompanied_minor());
    }

    #[test]
    fn test_unaccompanied_woman_rules() {
        let mut alone = person(AgeBracket::EighteenToFifty, Gender::Female);
        alone.accompanied = Some(YesNo::No);
        assert!(alone.is_unaccompanied_woman());

        let mut with_child = person(AgeBracket::OverFifty, Gender::Female);
        with_child.accompanied = Some(YesNo::Yes);
        with_child.accompanied_by = Some(Companion::Child);
        assert!(with_child.is_unaccompanied_woman());

        let mut with_partner = person(AgeBracket::EighteenToFifty, Gender::Female);
        with_partner.accompanied = Some(YesNo::Yes);
        with_partner.accompanied_by = Some(Companion::Other);
        assert!(!with_partner.is_unaccompanied_woman());

        let mut girl = person(AgeBracket::FourteenToSeventeen, Gender::Female);
        girl.accompanied = Some(YesNo::No);
        assert!(!girl.is_unaccompanied_woman());
    }

    #[test]
    fn test_bracelet_as_int() {
        let mut record = RescueRecord::new(1);
        assert_eq!(record.bracelet_as_int(), 0);
        record.bracelet_number = Some("105".to_string());
        assert_eq!(record.bracelet_as_int(), 105);
        record.bracelet_number = Some("A-12".to_string());
        assert_eq!(record.bracelet_as_int(), 0);
    }

    #[test]
    fn test_companion_keeps_unknown_codes() {
        assert_eq!(Companion::from("Child".to_string()), Companion::Child);
        let cousin = Companion::from("cousin".to_string());
        assert_eq!(cousin, Companion::Unlisted("cousin".to_string()));
        assert_eq!(cousin.code(), "cousin");
    }
}
