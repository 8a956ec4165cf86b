//! `SQLite` implementation of [`ConfigStore`].
//!
//! The snapshot is spread over three tables: `areas` and `zones` keep their
//! configuration order in a `position` column, `settings` holds a single row
//! with the global state and the control options (as JSON).

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use climahub_app::ports::ConfigStore;
use climahub_domain::actuator::{Actuator, ActuatorKind};
use climahub_domain::area::Area;
use climahub_domain::error::ClimaError;
use climahub_domain::hvac::{ActiveZone, GlobalState, HvacMode};
use climahub_domain::id::{AreaId, ZoneId};
use climahub_domain::options::ControlOptions;
use climahub_domain::snapshot::ConfigSnapshot;
use climahub_domain::zone::{Zone, ZoneKind};

use crate::error::StorageError;

fn decode<E: std::error::Error + Send + Sync + 'static>(err: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Wrapper for converting database rows into a domain [`Area`].
struct AreaRow(Area);

impl<'r> FromRow<'r, SqliteRow> for AreaRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let kind: String = row.try_get("actuator_kind")?;
        let entity: String = row.try_get("actuator_entity")?;

        let id = AreaId::from_str(&id).map_err(decode)?;
        let kind = ActuatorKind::from_str(&kind).map_err(decode)?;

        Ok(Self(Area {
            id,
            name: row.try_get("name")?,
            sensor: row.try_get("sensor")?,
            actuator: Actuator::new(kind, entity),
            supports_heat: row.try_get("supports_heat")?,
            supports_cool: row.try_get("supports_cool")?,
            min_setpoint: row.try_get("min_setpoint")?,
            max_setpoint: row.try_get("max_setpoint")?,
            step: row.try_get("step")?,
            bias: row.try_get("bias")?,
            gain: row.try_get("gain")?,
            included: row.try_get("included")?,
        }))
    }
}

/// Wrapper for converting database rows into a domain [`Zone`].
struct ZoneRow(Zone);

impl<'r> FromRow<'r, SqliteRow> for ZoneRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let tied_area_id: Option<String> = row.try_get("tied_area_id")?;
        let area_ids: String = row.try_get("area_ids")?;

        let id = ZoneId::from_str(&id).map_err(decode)?;
        let area_ids: Vec<AreaId> = serde_json::from_str(&area_ids).map_err(decode)?;
        let kind = match tied_area_id {
            Some(tied) => ZoneKind::BuiltIn {
                tied_area_id: AreaId::from_str(&tied).map_err(decode)?,
            },
            None => ZoneKind::Custom,
        };

        Ok(Self(Zone { id, area_ids, kind }))
    }
}

/// Wrapper for the single `settings` row.
struct SettingsRow(GlobalState, ControlOptions);

impl<'r> FromRow<'r, SqliteRow> for SettingsRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let hvac_mode: String = row.try_get("hvac_mode")?;
        let active_zone: Option<String> = row.try_get("active_zone")?;
        let last_non_suspend_zone: Option<String> = row.try_get("last_non_suspend_zone")?;
        let options: String = row.try_get("options")?;

        let state = GlobalState {
            hvac_mode: HvacMode::from_str(&hvac_mode).map_err(decode)?,
            house_target: row.try_get("house_target")?,
            active_zone: ActiveZone::from_key(active_zone.as_deref()).map_err(decode)?,
            active_zone_offset: row.try_get("active_zone_offset")?,
            last_non_suspend_zone: last_non_suspend_zone
                .map(|s| ZoneId::from_str(&s))
                .transpose()
                .map_err(decode)?,
        };
        let options: ControlOptions = serde_json::from_str(&options).map_err(decode)?;

        Ok(Self(state, options))
    }
}

const SELECT_AREAS: &str = "SELECT * FROM areas ORDER BY position";
const SELECT_ZONES: &str = "SELECT * FROM zones ORDER BY position";
const SELECT_SETTINGS: &str = "SELECT * FROM settings WHERE id = 1";

const DELETE_AREAS: &str = "DELETE FROM areas";
const DELETE_ZONES: &str = "DELETE FROM zones";

const INSERT_AREA: &str = r"
    INSERT INTO areas (id, position, name, sensor, actuator_kind, actuator_entity,
        supports_heat, supports_cool, min_setpoint, max_setpoint, step, bias, gain, included)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const INSERT_ZONE: &str =
    "INSERT INTO zones (id, position, tied_area_id, area_ids) VALUES (?, ?, ?, ?)";

const UPSERT_SETTINGS: &str = r"
    INSERT INTO settings (id, hvac_mode, house_target, active_zone, active_zone_offset,
        last_non_suspend_zone, options)
    VALUES (1, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        hvac_mode = excluded.hvac_mode,
        house_target = excluded.house_target,
        active_zone = excluded.active_zone,
        active_zone_offset = excluded.active_zone_offset,
        last_non_suspend_zone = excluded.last_non_suspend_zone,
        options = excluded.options
";

/// `SQLite`-backed configuration store.
#[derive(Clone)]
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether no configuration has ever been saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails.
    pub async fn is_empty(&self) -> Result<bool, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count == 0)
    }

    async fn load_snapshot(pool: &SqlitePool) -> Result<ConfigSnapshot, StorageError> {
        let areas: Vec<AreaRow> = sqlx::query_as(SELECT_AREAS).fetch_all(pool).await?;
        let zones: Vec<ZoneRow> = sqlx::query_as(SELECT_ZONES).fetch_all(pool).await?;
        let settings: Option<SettingsRow> =
            sqlx::query_as(SELECT_SETTINGS).fetch_optional(pool).await?;
        let (state, options) = settings.map_or_else(
            || (GlobalState::default(), ControlOptions::default()),
            |row| (row.0, row.1),
        );

        Ok(ConfigSnapshot {
            areas: areas.into_iter().map(|row| row.0).collect(),
            zones: zones.into_iter().map(|row| row.0).collect(),
            options,
            state,
        })
    }

    async fn save_snapshot(pool: &SqlitePool, snapshot: ConfigSnapshot) -> Result<(), StorageError> {
        let options = serde_json::to_string(&snapshot.options)?;
        let mut tx = pool.begin().await?;

        sqlx::query(DELETE_AREAS).execute(&mut *tx).await?;
        for (position, area) in (0_i64..).zip(&snapshot.areas) {
            sqlx::query(INSERT_AREA)
                .bind(area.id.to_string())
                .bind(position)
                .bind(&area.name)
                .bind(&area.sensor)
                .bind(area.actuator.kind().as_str())
                .bind(area.actuator.entity())
                .bind(area.supports_heat)
                .bind(area.supports_cool)
                .bind(area.min_setpoint)
                .bind(area.max_setpoint)
                .bind(area.step)
                .bind(area.bias)
                .bind(area.gain)
                .bind(area.included)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(DELETE_ZONES).execute(&mut *tx).await?;
        for (position, zone) in (0_i64..).zip(&snapshot.zones) {
            sqlx::query(INSERT_ZONE)
                .bind(zone.id.to_string())
                .bind(position)
                .bind(zone.tied_area_id().map(|id| id.to_string()))
                .bind(serde_json::to_string(&zone.area_ids)?)
                .execute(&mut *tx)
                .await?;
        }

        let state = &snapshot.state;
        sqlx::query(UPSERT_SETTINGS)
            .bind(state.hvac_mode.as_str())
            .bind(state.house_target)
            .bind(state.active_zone.to_key())
            .bind(state.active_zone_offset)
            .bind(state.last_non_suspend_zone.map(|id| id.to_string()))
            .bind(options)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl ConfigStore for SqliteConfigStore {
    fn load(&self) -> impl Future<Output = Result<ConfigSnapshot, ClimaError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(Self::load_snapshot(&pool).await?) }
    }

    fn save(
        &self,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let pool = self.pool.clone();
        let snapshot = snapshot.clone();
        async move { Ok(Self::save_snapshot(&pool, snapshot).await?) }
    }
}
