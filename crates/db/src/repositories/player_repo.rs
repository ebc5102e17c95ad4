//! Repository for the `players` table.
//!
//! List and count queries are built dynamically from a
//! [`PlayerPredicate`]: every constraint becomes one `$n`-parameterized
//! condition with a matching typed bind value, and the conditions are
//! joined with `AND`.

use roster_core::filter::{Constraint, PageRequest, PlayerOrder, PlayerPredicate};
use roster_core::player::{Player, PlayerDraft};
use roster_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::player::PlayerRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, title, race, profession, birthday, banned, \
    experience, level, until_next_level";

/// Provides CRUD and filtered listing for players.
pub struct PlayerRepo;

impl PlayerRepo {
    /// Insert a new player, returning the created row.
    pub async fn create(pool: &PgPool, input: &PlayerDraft) -> Result<PlayerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO players (\
                name, title, race, profession, birthday, banned, \
                experience, level, until_next_level\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlayerRow>(&query)
            .bind(&input.name)
            .bind(&input.title)
            .bind(input.race.as_str())
            .bind(input.profession.as_str())
            .bind(input.birthday)
            .bind(input.banned)
            .bind(input.experience)
            .bind(input.level)
            .bind(input.until_next_level)
            .fetch_one(pool)
            .await
    }

    /// Find a player by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlayerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE id = $1");
        sqlx::query_as::<_, PlayerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every mutable column of a player.
    ///
    /// Returns `None` if no row with `player.id` exists.
    pub async fn update(pool: &PgPool, player: &Player) -> Result<Option<PlayerRow>, sqlx::Error> {
        let query = format!(
            "UPDATE players SET \
                name = $2, title = $3, race = $4, profession = $5, \
                birthday = $6, banned = $7, experience = $8, \
                level = $9, until_next_level = $10 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlayerRow>(&query)
            .bind(player.id)
            .bind(&player.name)
            .bind(&player.title)
            .bind(player.race.as_str())
            .bind(player.profession.as_str())
            .bind(player.birthday)
            .bind(player.banned)
            .bind(player.experience)
            .bind(player.level)
            .bind(player.until_next_level)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a player by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List one page of players matching `predicate`, ascending by `order`
    /// with ties broken by id.
    pub async fn list(
        pool: &PgPool,
        predicate: &PlayerPredicate,
        order: PlayerOrder,
        page: PageRequest,
    ) -> Result<Vec<PlayerRow>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_player_filter(predicate);
        let query = format!(
            "SELECT {COLUMNS} FROM players \
             {where_clause} \
             {order_by} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            order_by = order_by_clause(order),
            next_idx = bind_idx + 1,
        );
        tracing::debug!(%query, binds = bind_values.len(), "Listing players");

        let q = sqlx::query_as::<_, PlayerRow>(&query);
        bind_player_values(q, &bind_values)
            .bind(page.size())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count players matching `predicate`.
    pub async fn count(pool: &PgPool, predicate: &PlayerPredicate) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_player_filter(predicate);
        let query = format!("SELECT COUNT(*) FROM players {where_clause}");

        let q = sqlx::query_scalar::<_, i64>(&query);
        bind_player_values_scalar(q, &bind_values)
            .fetch_one(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built player queries.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Int(i32),
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
}

/// Render one constraint as a condition on placeholder `$idx`.
fn render_constraint(constraint: &Constraint, idx: u32) -> (String, BindValue) {
    match constraint {
        Constraint::NameContains(part) => (
            format!("strpos(name, ${idx}) > 0"),
            BindValue::Text(part.clone()),
        ),
        Constraint::TitleContains(part) => (
            format!("strpos(title, ${idx}) > 0"),
            BindValue::Text(part.clone()),
        ),
        Constraint::RaceIs(race) => (
            format!("race = ${idx}"),
            BindValue::Text(race.as_str().to_string()),
        ),
        Constraint::ProfessionIs(profession) => (
            format!("profession = ${idx}"),
            BindValue::Text(profession.as_str().to_string()),
        ),
        Constraint::BornOnOrAfter(after) => {
            (format!("birthday >= ${idx}"), BindValue::Timestamp(*after))
        }
        Constraint::BornOnOrBefore(before) => {
            (format!("birthday <= ${idx}"), BindValue::Timestamp(*before))
        }
        Constraint::BannedIs(banned) => (format!("banned = ${idx}"), BindValue::Bool(*banned)),
        Constraint::MinExperience(min) => (format!("experience >= ${idx}"), BindValue::Int(*min)),
        Constraint::MaxExperience(max) => (format!("experience <= ${idx}"), BindValue::Int(*max)),
        Constraint::MinLevel(min) => (format!("level >= ${idx}"), BindValue::Int(*min)),
        Constraint::MaxLevel(max) => (format!("level <= ${idx}"), BindValue::Int(*max)),
    }
}

/// Build a WHERE clause and bind values from a player predicate.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if the predicate has no constraints, or
/// starts with `WHERE `.
fn build_player_filter(predicate: &PlayerPredicate) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    for constraint in predicate.constraints() {
        let (condition, value) = render_constraint(constraint, bind_idx);
        conditions.push(condition);
        bind_values.push(value);
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// `ORDER BY` clause for a sort key. Always ascending, id as tie-breaker.
fn order_by_clause(order: PlayerOrder) -> &'static str {
    match order {
        PlayerOrder::Id => "ORDER BY id ASC",
        PlayerOrder::Name => "ORDER BY name ASC, id ASC",
        PlayerOrder::Title => "ORDER BY title ASC, id ASC",
        PlayerOrder::Experience => "ORDER BY experience ASC, id ASC",
        PlayerOrder::Level => "ORDER BY level ASC, id ASC",
        PlayerOrder::Birthday => "ORDER BY birthday ASC, id ASC",
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_player_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_player_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use roster_core::filter::PlayerFilter;
    use roster_core::player::Race;

    use super::*;

    #[test]
    fn empty_predicate_has_no_where_clause() {
        let (clause, values, next) = build_player_filter(&PlayerPredicate::all());
        assert_eq!(clause, "");
        assert!(values.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn constraints_are_numbered_and_joined_with_and() {
        let filter = PlayerFilter {
            name: Some("or".to_string()),
            race: Some(Race::Orc),
            max_level: Some(10),
            ..Default::default()
        };
        let (clause, values, next) = build_player_filter(&filter.compose());
        assert_eq!(
            clause,
            "WHERE strpos(name, $1) > 0 AND race = $2 AND level <= $3"
        );
        assert_eq!(
            values,
            vec![
                BindValue::Text("or".to_string()),
                BindValue::Text("ORC".to_string()),
                BindValue::Int(10),
            ]
        );
        assert_eq!(next, 4);
    }

    #[test]
    fn every_filter_renders_a_condition() {
        let at = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        let filter = PlayerFilter {
            name: Some("a".to_string()),
            title: Some("b".to_string()),
            race: Some(Race::Elf),
            profession: Some(roster_core::player::Profession::Druid),
            after: Some(at),
            before: Some(at),
            banned: Some(false),
            min_experience: Some(1),
            max_experience: Some(2),
            min_level: Some(3),
            max_level: Some(4),
        };
        let (clause, values, next) = build_player_filter(&filter.compose());
        assert_eq!(values.len(), 11);
        assert_eq!(next, 12);
        assert_eq!(clause.matches(" AND ").count(), 10);
        assert!(clause.contains("birthday >= $5"));
        assert!(clause.contains("birthday <= $6"));
        assert!(clause.contains("banned = $7"));
    }

    #[test]
    fn order_by_always_ends_with_id() {
        for order in PlayerOrder::ALL {
            assert!(order_by_clause(order).ends_with("id ASC"));
        }
    }
}
