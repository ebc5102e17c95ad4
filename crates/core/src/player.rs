//! Player model, field validation and level derivation.
//!
//! Every mutation of a player goes through this module: [`NewPlayer`] is
//! checked into a [`PlayerDraft`] on create, [`PlayerPatch`] is checked and
//! merged into an existing [`Player`] on update. Level data is always
//! recomputed from experience here and is never taken from callers.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum player name length (characters).
pub const MAX_NAME_LENGTH: usize = 12;

/// Maximum player title length (characters).
pub const MAX_TITLE_LENGTH: usize = 30;

/// Maximum experience a player may hold.
pub const MAX_EXPERIENCE: i32 = 10_000_000;

/// Earliest allowed birth year (from 2000-01-01T00:00:00Z inclusive).
pub const MIN_BIRTH_YEAR: i32 = 2000;

/// Latest allowed birth year (up to 3001-01-01T00:00:00Z exclusive).
pub const MAX_BIRTH_YEAR: i32 = 3000;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Race {
    Human,
    Dwarf,
    Elf,
    Giant,
    Orc,
    Troll,
    Hobbit,
}

impl Race {
    pub const ALL: [Race; 7] = [
        Race::Human,
        Race::Dwarf,
        Race::Elf,
        Race::Giant,
        Race::Orc,
        Race::Troll,
        Race::Hobbit,
    ];

    /// Upper-case wire and storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Race::Human => "HUMAN",
            Race::Dwarf => "DWARF",
            Race::Elf => "ELF",
            Race::Giant => "GIANT",
            Race::Orc => "ORC",
            Race::Troll => "TROLL",
            Race::Hobbit => "HOBBIT",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Race {
    type Err = CoreError;

    /// Case-insensitive parse of a race name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Race::ALL
            .into_iter()
            .find(|race| race.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::validation("race", format!("has unknown value '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Profession {
    Warrior,
    Rogue,
    Sorcerer,
    Cleric,
    Paladin,
    Nazgul,
    Warlock,
    Druid,
}

impl Profession {
    pub const ALL: [Profession; 8] = [
        Profession::Warrior,
        Profession::Rogue,
        Profession::Sorcerer,
        Profession::Cleric,
        Profession::Paladin,
        Profession::Nazgul,
        Profession::Warlock,
        Profession::Druid,
    ];

    /// Upper-case wire and storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Profession::Warrior => "WARRIOR",
            Profession::Rogue => "ROGUE",
            Profession::Sorcerer => "SORCERER",
            Profession::Cleric => "CLERIC",
            Profession::Paladin => "PALADIN",
            Profession::Nazgul => "NAZGUL",
            Profession::Warlock => "WARLOCK",
            Profession::Druid => "DRUID",
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profession {
    type Err = CoreError;

    /// Case-insensitive parse of a profession name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::ALL
            .into_iter()
            .find(|profession| profession.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CoreError::validation("profession", format!("has unknown value '{s}'"))
            })
    }
}

// ---------------------------------------------------------------------------
// Entity and DTOs
// ---------------------------------------------------------------------------

/// A stored player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: DbId,
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    /// Serialized as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub birthday: Timestamp,
    pub banned: bool,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
}

/// A validated player that has not been stored yet.
///
/// Only produced by [`NewPlayer::validate`], so level data always matches
/// experience.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDraft {
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    pub birthday: Timestamp,
    pub banned: bool,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
}

impl PlayerDraft {
    /// Attach a store-assigned id.
    pub fn into_player(self, id: DbId) -> Player {
        Player {
            id,
            name: self.name,
            title: self.title,
            race: self.race,
            profession: self.profession,
            birthday: self.birthday,
            banned: self.banned,
            experience: self.experience,
            level: self.level,
            until_next_level: self.until_next_level,
        }
    }
}

/// Create request. Everything except `banned` is required; `level` and
/// `untilNextLevel` in the payload are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub birthday: Option<Timestamp>,
    pub experience: Option<i32>,
    /// Defaults to `false` if omitted.
    pub banned: Option<bool>,
}

impl NewPlayer {
    /// Run every create-time check and derive level data.
    ///
    /// Fails on the first missing or out-of-range field.
    pub fn validate(self) -> Result<PlayerDraft, CoreError> {
        let name = required("name", self.name)?;
        validate_name(&name)?;
        let title = required("title", self.title)?;
        validate_title(&title)?;
        let race = required("race", self.race)?;
        let profession = required("profession", self.profession)?;
        let birthday = required("birthday", self.birthday)?;
        validate_birthday(birthday)?;
        let experience = required("experience", self.experience)?;
        validate_experience(experience)?;

        let progress = LevelProgress::from_experience(experience);
        Ok(PlayerDraft {
            name,
            title,
            race,
            profession,
            birthday,
            banned: self.banned.unwrap_or(false),
            experience,
            level: progress.level,
            until_next_level: progress.until_next_level,
        })
    }
}

/// Update request. Only present fields are checked and applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub birthday: Option<Timestamp>,
    pub experience: Option<i32>,
    pub banned: Option<bool>,
}

impl PlayerPatch {
    /// Check every present field. Absent fields always pass.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(birthday) = self.birthday {
            validate_birthday(birthday)?;
        }
        if let Some(experience) = self.experience {
            validate_experience(experience)?;
        }
        Ok(())
    }

    /// Validate the patch, then merge it into `player`.
    ///
    /// Nothing is written to `player` unless every present field passes.
    /// Level data is re-derived when experience is part of the patch.
    pub fn apply_to(self, player: &mut Player) -> Result<(), CoreError> {
        self.validate()?;

        if let Some(name) = self.name {
            player.name = name;
        }
        if let Some(title) = self.title {
            player.title = title;
        }
        if let Some(race) = self.race {
            player.race = race;
        }
        if let Some(profession) = self.profession {
            player.profession = profession;
        }
        if let Some(birthday) = self.birthday {
            player.birthday = birthday;
        }
        if let Some(banned) = self.banned {
            player.banned = banned;
        }
        if let Some(experience) = self.experience {
            let progress = LevelProgress::from_experience(experience);
            player.experience = experience;
            player.level = progress.level;
            player.until_next_level = progress.until_next_level;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.race.is_none()
            && self.profession.is_none()
            && self.birthday.is_none()
            && self.experience.is_none()
            && self.banned.is_none()
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::validation(field, "is required"))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Identifiers must be positive.
pub fn validate_id(id: DbId) -> Result<(), CoreError> {
    if id > 0 {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!(
            "Player id must be a positive integer (got {id})"
        )))
    }
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(CoreError::validation("name", "must not be empty"));
    }
    if len > MAX_NAME_LENGTH {
        return Err(CoreError::validation(
            "name",
            format!("exceeds maximum length of {MAX_NAME_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::validation(
            "title",
            format!("exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Birthday must fall in `[2000-01-01, 3001-01-01)` UTC.
pub fn validate_birthday(birthday: Timestamp) -> Result<(), CoreError> {
    let year = birthday.year();
    if (MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "birthday",
            format!("must be between {MIN_BIRTH_YEAR}-01-01 and {MAX_BIRTH_YEAR}-12-31 (got {birthday})"),
        ))
    }
}

pub fn validate_experience(experience: i32) -> Result<(), CoreError> {
    if (0..=MAX_EXPERIENCE).contains(&experience) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "experience",
            format!("must be between 0 and {MAX_EXPERIENCE} (got {experience})"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Level derivation
// ---------------------------------------------------------------------------

/// Level reached with `experience` points:
/// `floor((sqrt(2500 + 200 * E) - 50) / 100)`.
pub fn level_for(experience: i32) -> i32 {
    let root = (2500.0 + 200.0 * f64::from(experience)).sqrt();
    // `as` truncates toward zero.
    ((root - 50.0) / 100.0) as i32
}

/// Experience still missing to reach `level + 1`:
/// `50 * (L + 1) * (L + 2) - E`.
pub fn experience_until_next_level(experience: i32, level: i32) -> i32 {
    50 * (level + 1) * (level + 2) - experience
}

/// Level and remaining experience, always computed together from one
/// experience value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: i32,
    pub until_next_level: i32,
}

impl LevelProgress {
    pub fn from_experience(experience: i32) -> Self {
        let level = level_for(experience);
        Self {
            level,
            until_next_level: experience_until_next_level(experience, level),
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

    fn date(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn sample_new() -> NewPlayer {
        NewPlayer {
            name: Some("Ниус".to_string()),
            title: Some("Приходящий Без Шума".to_string()),
            race: Some(Race::Hobbit),
            profession: Some(Profession::Rogue),
            birthday: Some(date(2010, 10, 12)),
            experience: Some(58_347),
            banned: None,
        }
    }

    fn sample_player() -> Player {
        sample_new().validate().unwrap().into_player(7)
    }

    // -- level derivation ---------------------------------------------------

    #[test]
    fn level_zero_at_zero_experience() {
        assert_eq!(level_for(0), 0);
        assert_eq!(experience_until_next_level(0, 0), 100);
    }

    #[test]
    fn level_boundaries_are_exact() {
        // Level L starts at 50 * L * (L + 1) experience.
        assert_eq!(level_for(99), 0);
        assert_eq!(level_for(100), 1);
        assert_eq!(level_for(299), 1);
        assert_eq!(level_for(300), 2);
    }

    #[test]
    fn level_for_8550_is_12() {
        let progress = LevelProgress::from_experience(8_550);
        assert_eq!(progress.level, 12);
        assert_eq!(progress.until_next_level, 550);
    }

    #[test]
    fn level_at_max_experience() {
        let progress = LevelProgress::from_experience(MAX_EXPERIENCE);
        assert_eq!(progress.level, 446);
        assert_eq!(progress.until_next_level, 50 * 447 * 448 - MAX_EXPERIENCE);
    }

    #[test]
    fn until_next_level_is_positive_across_range() {
        for experience in (0..=MAX_EXPERIENCE).step_by(9_973).chain([MAX_EXPERIENCE]) {
            let progress = LevelProgress::from_experience(experience);
            assert!(progress.level >= 0);
            assert_eq!(
                progress.until_next_level,
                50 * (progress.level + 1) * (progress.level + 2) - experience
            );
            assert!(progress.until_next_level > 0, "experience {experience}");
        }
    }

    // -- field validation ---------------------------------------------------

    #[test]
    fn name_length_boundaries() {
        assert!(validate_name(&"a".repeat(12)).is_ok());
        assert!(validate_name(&"a".repeat(13)).is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(validate_name("Эльфийкаааа!").is_ok());
    }

    #[test]
    fn title_length_boundaries() {
        assert!(validate_title("").is_ok());
        assert!(validate_title(&"t".repeat(30)).is_ok());
        assert_matches!(
            validate_title(&"t".repeat(31)),
            Err(CoreError::Validation { field: "title", .. })
        );
    }

    #[test]
    fn birthday_boundaries() {
        assert!(validate_birthday(date(2000, 1, 1)).is_ok());
        assert!(validate_birthday(date(3000, 12, 31)).is_ok());
        assert!(validate_birthday(date(3001, 1, 1)).is_err());
        assert!(validate_birthday(date(1999, 12, 31)).is_err());
        assert!(validate_birthday(date(2000, 1, 1) - chrono::Duration::milliseconds(1)).is_err());
    }

    #[test]
    fn experience_boundaries() {
        assert!(validate_experience(0).is_ok());
        assert!(validate_experience(10_000_000).is_ok());
        assert!(validate_experience(-1).is_err());
        assert!(validate_experience(10_000_001).is_err());
    }

    #[test]
    fn id_must_be_positive() {
        assert!(validate_id(1).is_ok());
        assert_matches!(validate_id(0), Err(CoreError::InvalidInput(_)));
        assert_matches!(validate_id(-3), Err(CoreError::InvalidInput(_)));
    }

    // -- create -------------------------------------------------------------

    #[test]
    fn create_defaults_banned_and_derives_level() {
        let draft = sample_new().validate().unwrap();
        assert!(!draft.banned);
        assert_eq!(draft.level, level_for(58_347));
        assert_eq!(
            draft.until_next_level,
            experience_until_next_level(58_347, draft.level)
        );
    }

    #[test]
    fn create_requires_every_field_but_banned() {
        let missing_race = NewPlayer {
            race: None,
            ..sample_new()
        };
        assert_matches!(
            missing_race.validate(),
            Err(CoreError::Validation { field: "race", .. })
        );

        let missing_birthday = NewPlayer {
            birthday: None,
            ..sample_new()
        };
        assert_matches!(
            missing_birthday.validate(),
            Err(CoreError::Validation { field: "birthday", .. })
        );
    }

    #[test]
    fn create_ignores_client_supplied_level() {
        let input: NewPlayer = serde_json::from_value(serde_json::json!({
            "name": "Amarylis",
            "title": "Lady",
            "race": "ELF",
            "profession": "DRUID",
            "birthday": 1_000_000_000_000_i64,
            "experience": 100,
            "level": 99,
            "untilNextLevel": 1
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert_eq!(draft.level, 1);
        assert_eq!(draft.until_next_level, 200);
    }

    // -- update -------------------------------------------------------------

    #[test]
    fn patch_with_only_experience_keeps_other_fields() {
        let mut player = sample_player();
        let before = player.clone();

        PlayerPatch {
            experience: Some(8_550),
            ..Default::default()
        }
        .apply_to(&mut player)
        .unwrap();

        assert_eq!(player.experience, 8_550);
        assert_eq!(player.level, 12);
        assert_eq!(player.until_next_level, 550);
        assert_eq!(player.name, before.name);
        assert_eq!(player.title, before.title);
        assert_eq!(player.race, before.race);
        assert_eq!(player.profession, before.profession);
        assert_eq!(player.birthday, before.birthday);
        assert_eq!(player.banned, before.banned);
    }

    #[test]
    fn invalid_patch_field_leaves_player_untouched() {
        let mut player = sample_player();
        let before = player.clone();

        let result = PlayerPatch {
            name: Some("Renamed".to_string()),
            title: Some("x".repeat(31)),
            ..Default::default()
        }
        .apply_to(&mut player);

        assert_matches!(result, Err(CoreError::Validation { field: "title", .. }));
        assert_eq!(player, before);
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut player = sample_player();
        let before = player.clone();
        let patch = PlayerPatch::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut player).unwrap();
        assert_eq!(player, before);
    }

    // -- enums --------------------------------------------------------------

    #[test]
    fn race_parses_case_insensitively() {
        assert_eq!("elf".parse::<Race>().unwrap(), Race::Elf);
        assert_eq!("HOBBIT".parse::<Race>().unwrap(), Race::Hobbit);
        assert!("gnome".parse::<Race>().is_err());
    }

    #[test]
    fn profession_round_trips_through_as_str() {
        for profession in Profession::ALL {
            assert_eq!(profession.as_str().parse::<Profession>().unwrap(), profession);
        }
    }

    #[test]
    fn player_serializes_with_wire_names() {
        let json = serde_json::to_value(sample_player()).unwrap();
        assert_eq!(json["race"], "HOBBIT");
        assert_eq!(json["profession"], "ROGUE");
        assert!(json["untilNextLevel"].is_number());
        assert_eq!(json["birthday"], date(2010, 10, 12).timestamp_millis());
    }
}
