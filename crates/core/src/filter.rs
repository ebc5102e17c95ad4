//! Filter composition for player list/count queries.
//!
//! A [`PlayerFilter`] carries the optional per-field filters of a request.
//! [`PlayerFilter::compose`] turns the present ones into typed
//! [`Constraint`]s and conjoins them into a single [`PlayerPredicate`].
//! Store backends consume the predicate either by evaluating it in process
//! ([`PlayerPredicate::matches`]) or by rendering each constraint to SQL.
//!
//! Sorting and paging travel next to the predicate as [`PlayerOrder`] and
//! [`PageRequest`].

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::CoreError;
use crate::player::{Player, Profession, Race};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Paging defaults
// ---------------------------------------------------------------------------

/// Page returned when the caller does not ask for one.
pub const DEFAULT_PAGE_NUMBER: i64 = 0;

/// Players per page when the caller does not say.
pub const DEFAULT_PAGE_SIZE: i64 = 3;

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// One filter condition on a single player field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Name contains the substring.
    NameContains(String),
    /// Title contains the substring.
    TitleContains(String),
    RaceIs(Race),
    ProfessionIs(Profession),
    /// Birthday at or after the instant.
    BornOnOrAfter(Timestamp),
    /// Birthday at or before the instant.
    BornOnOrBefore(Timestamp),
    BannedIs(bool),
    MinExperience(i32),
    MaxExperience(i32),
    MinLevel(i32),
    MaxLevel(i32),
}

impl Constraint {
    pub fn matches(&self, player: &Player) -> bool {
        match self {
            Constraint::NameContains(part) => player.name.contains(part.as_str()),
            Constraint::TitleContains(part) => player.title.contains(part.as_str()),
            Constraint::RaceIs(race) => player.race == *race,
            Constraint::ProfessionIs(profession) => player.profession == *profession,
            Constraint::BornOnOrAfter(after) => player.birthday >= *after,
            Constraint::BornOnOrBefore(before) => player.birthday <= *before,
            Constraint::BannedIs(banned) => player.banned == *banned,
            Constraint::MinExperience(min) => player.experience >= *min,
            Constraint::MaxExperience(max) => player.experience <= *max,
            Constraint::MinLevel(min) => player.level >= *min,
            Constraint::MaxLevel(max) => player.level <= *max,
        }
    }
}

/// Conjunction of constraints. An empty predicate matches every player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPredicate {
    constraints: Vec<Constraint>,
}

impl PlayerPredicate {
    /// The predicate that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add one more constraint to the conjunction.
    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.constraints.iter().all(|c| c.matches(player))
    }
}

impl FromIterator<Constraint> for PlayerPredicate {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Optional filters accepted by list and count. `None` means "no
/// constraint on this field".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub after: Option<Timestamp>,
    pub before: Option<Timestamp>,
    pub banned: Option<bool>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
}

impl PlayerFilter {
    /// Build the predicate from the present filters only.
    pub fn compose(&self) -> PlayerPredicate {
        [
            self.name.clone().map(Constraint::NameContains),
            self.title.clone().map(Constraint::TitleContains),
            self.race.map(Constraint::RaceIs),
            self.profession.map(Constraint::ProfessionIs),
            self.after.map(Constraint::BornOnOrAfter),
            self.before.map(Constraint::BornOnOrBefore),
            self.banned.map(Constraint::BannedIs),
            self.min_experience.map(Constraint::MinExperience),
            self.max_experience.map(Constraint::MaxExperience),
            self.min_level.map(Constraint::MinLevel),
            self.max_level.map(Constraint::MaxLevel),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort key for player listings. Always ascending, ties broken by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerOrder {
    #[default]
    Id,
    Name,
    Title,
    Experience,
    Level,
    Birthday,
}

impl PlayerOrder {
    pub const ALL: [PlayerOrder; 6] = [
        PlayerOrder::Id,
        PlayerOrder::Name,
        PlayerOrder::Title,
        PlayerOrder::Experience,
        PlayerOrder::Level,
        PlayerOrder::Birthday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerOrder::Id => "ID",
            PlayerOrder::Name => "NAME",
            PlayerOrder::Title => "TITLE",
            PlayerOrder::Experience => "EXPERIENCE",
            PlayerOrder::Level => "LEVEL",
            PlayerOrder::Birthday => "BIRTHDAY",
        }
    }

    /// Parse an optional sort key, falling back to [`PlayerOrder::Id`].
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, CoreError> {
        value.map_or(Ok(Self::default()), |s| s.parse())
    }

    /// Total order used for listings: the sort key, then id.
    pub fn compare(self, a: &Player, b: &Player) -> Ordering {
        let by_key = match self {
            PlayerOrder::Id => Ordering::Equal,
            PlayerOrder::Name => a.name.cmp(&b.name),
            PlayerOrder::Title => a.title.cmp(&b.title),
            PlayerOrder::Experience => a.experience.cmp(&b.experience),
            PlayerOrder::Level => a.level.cmp(&b.level),
            PlayerOrder::Birthday => a.birthday.cmp(&b.birthday),
        };
        by_key.then(a.id.cmp(&b.id))
    }
}

impl FromStr for PlayerOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerOrder::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CoreError::InvalidFilterKind(format!(
                    "'{s}' is not a sort key. Must be one of: {:?}",
                    PlayerOrder::ALL.map(PlayerOrder::as_str)
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// A checked page window: `number >= 0`, `size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: i64,
    size: i64,
}

impl PageRequest {
    /// Apply defaults and reject negative page numbers or empty pages.
    pub fn new(number: Option<i64>, size: Option<i64>) -> Result<Self, CoreError> {
        let number = number.unwrap_or(DEFAULT_PAGE_NUMBER);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

        if number < 0 {
            return Err(CoreError::InvalidInput(format!(
                "pageNumber must not be negative (got {number})"
            )));
        }
        if size < 1 {
            return Err(CoreError::InvalidInput(format!(
                "pageSize must be at least 1 (got {size})"
            )));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        self.number.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::player::LevelProgress;

    fn player(id: i64, name: &str, race: Race, experience: i32) -> Player {
        let progress = LevelProgress::from_experience(experience);
        Player {
            id,
            name: name.to_string(),
            title: format!("{name} the Bold"),
            race,
            profession: Profession::Warrior,
            birthday: Utc.with_ymd_and_hms(2005, 6, 1, 0, 0, 0).unwrap(),
            banned: false,
            experience,
            level: progress.level,
            until_next_level: progress.until_next_level,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let predicate = PlayerFilter::default().compose();
        assert!(predicate.is_empty());
        assert!(predicate.matches(&player(1, "Anyone", Race::Orc, 0)));
    }

    #[test]
    fn compose_emits_one_constraint_per_present_filter() {
        let filter = PlayerFilter {
            name: Some("ar".to_string()),
            banned: Some(true),
            min_level: Some(5),
            ..Default::default()
        };
        assert_eq!(
            filter.compose().constraints(),
            &[
                Constraint::NameContains("ar".to_string()),
                Constraint::BannedIs(true),
                Constraint::MinLevel(5),
            ]
        );
    }

    #[test]
    fn composition_is_order_independent() {
        let players = [
            player(1, "Aragorn", Race::Human, 20_000),
            player(2, "Boromir", Race::Human, 100),
            player(3, "Legolas", Race::Elf, 50_000),
        ];
        let race_first = PlayerPredicate::all()
            .and(Constraint::RaceIs(Race::Human))
            .and(Constraint::MinLevel(5));
        let level_first = PlayerPredicate::all()
            .and(Constraint::MinLevel(5))
            .and(Constraint::RaceIs(Race::Human));

        let matched = |p: &PlayerPredicate| {
            players
                .iter()
                .filter(|pl| p.matches(pl))
                .map(|pl| pl.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(matched(&race_first), vec![1]);
        assert_eq!(matched(&race_first), matched(&level_first));
    }

    #[test]
    fn bounds_are_inclusive() {
        let p = player(1, "Gimli", Race::Dwarf, 300);
        assert!(Constraint::MinExperience(300).matches(&p));
        assert!(Constraint::MaxExperience(300).matches(&p));
        assert!(!Constraint::MinExperience(301).matches(&p));
        assert!(Constraint::MinLevel(2).matches(&p));
        assert!(Constraint::MaxLevel(2).matches(&p));
        assert!(Constraint::BornOnOrAfter(p.birthday).matches(&p));
        assert!(Constraint::BornOnOrBefore(p.birthday).matches(&p));
    }

    #[test]
    fn substring_match_is_case_sensitive() {
        let p = player(1, "Gandalf", Race::Human, 0);
        assert!(Constraint::NameContains("anda".to_string()).matches(&p));
        assert!(!Constraint::NameContains("GAND".to_string()).matches(&p));
        assert!(Constraint::TitleContains("Bold".to_string()).matches(&p));
    }

    #[test]
    fn order_parses_known_keys_only() {
        assert_eq!("level".parse::<PlayerOrder>().unwrap(), PlayerOrder::Level);
        assert_eq!("BIRTHDAY".parse::<PlayerOrder>().unwrap(), PlayerOrder::Birthday);
        assert_matches!(
            "race".parse::<PlayerOrder>(),
            Err(CoreError::InvalidFilterKind(_))
        );
        assert_eq!(PlayerOrder::parse_or_default(None).unwrap(), PlayerOrder::Id);
    }

    #[test]
    fn order_breaks_ties_by_id() {
        let a = player(2, "Same", Race::Elf, 10);
        let b = player(1, "Same", Race::Elf, 10);
        assert_eq!(PlayerOrder::Name.compare(&a, &b), Ordering::Greater);
        assert_eq!(PlayerOrder::Experience.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn page_defaults() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.number(), 0);
        assert_eq!(page.size(), 3);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_offset_multiplies() {
        let page = PageRequest::new(Some(2), Some(5)).unwrap();
        assert_eq!(page.offset(), 10);
    }

    #[test]
    fn page_rejects_negative_number_and_empty_size() {
        assert_matches!(
            PageRequest::new(Some(-1), None),
            Err(CoreError::InvalidInput(_))
        );
        assert_matches!(PageRequest::new(None, Some(0)), Err(CoreError::InvalidInput(_)));
    }
}
