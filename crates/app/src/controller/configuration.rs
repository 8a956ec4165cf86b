//! Configuration layer: areas and custom zones.

use climahub_domain::area::Area;
use climahub_domain::error::{ClimaError, NotFoundError, ValidationError};
use climahub_domain::id::{AreaId, ZoneId};
use climahub_domain::snapshot::ConfigSnapshot;
use climahub_domain::zone::{Zone, validate_custom_members};

use super::Controller;
use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

fn zone_not_found(id: ZoneId) -> ClimaError {
    NotFoundError {
        entity: "Zone",
        id: id.to_string(),
    }
    .into()
}

/// Find a custom zone by id, rejecting built-in zones.
fn custom_zone_index(snapshot: &ConfigSnapshot, id: ZoneId) -> Result<usize, ClimaError> {
    let index = snapshot
        .zones
        .iter()
        .position(|zone| zone.id == id)
        .ok_or_else(|| zone_not_found(id))?;
    if snapshot.zones[index].is_builtin() {
        return Err(ValidationError::BuiltInZone.into());
    }
    Ok(index)
}

impl<S, A, R, P> Controller<S, A, R, P>
where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Add an area; its built-in zone is created with it.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] for an invalid area or an id that
    /// is already configured.
    #[tracing::instrument(skip(self, area), fields(area = %area.name))]
    pub async fn add_area(&self, area: Area) -> Result<Area, ClimaError> {
        area.validate()?;
        let (added, snapshot) = self
            .mutate(move |s| {
                if s.area(area.id).is_some() {
                    return Err(ValidationError::DuplicateArea(area.id.to_string()).into());
                }
                s.areas.push(area.clone());
                Ok(area)
            })
            .await?;
        self.sync_runtime(&snapshot.areas);
        tracing::info!(area_id = %added.id, "area added");
        Ok(added)
    }

    /// Remove an area together with its built-in zone.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] for an unknown id, or
    /// [`ValidationError::AreaInCustomZone`] while a custom zone lists it.
    #[tracing::instrument(skip(self))]
    pub async fn remove_area(&self, area_id: AreaId) -> Result<(), ClimaError> {
        let ((), snapshot) = self
            .mutate(|s| {
                let index = s
                    .areas
                    .iter()
                    .position(|area| area.id == area_id)
                    .ok_or_else(|| NotFoundError {
                        entity: "Area",
                        id: area_id.to_string(),
                    })?;
                if s
                    .zones
                    .iter()
                    .any(|zone| !zone.is_builtin() && zone.contains(area_id))
                {
                    return Err(ValidationError::AreaInCustomZone.into());
                }
                s.areas.remove(index);
                Ok(())
            })
            .await?;
        self.sync_runtime(&snapshot.areas);
        tracing::info!(%area_id, "area removed");
        Ok(())
    }

    /// Create a custom zone over `members`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] when the member set breaks a zone rule.
    #[tracing::instrument(skip(self))]
    pub async fn add_custom_zone(&self, members: &[AreaId]) -> Result<Zone, ClimaError> {
        let (zone, _) = self
            .mutate(|s| {
                let members = validate_custom_members(&s.areas, &s.zones, members, None)?;
                let zone = Zone::custom(members);
                s.zones.push(zone.clone());
                Ok(zone)
            })
            .await?;
        tracing::info!(zone_id = %zone.id, "custom zone added");
        Ok(zone)
    }

    /// Replace the members of a custom zone.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] for an unknown id,
    /// [`ValidationError::BuiltInZone`] for a built-in zone, or any member
    /// rule violation.
    #[tracing::instrument(skip(self))]
    pub async fn edit_custom_zone(
        &self,
        zone_id: ZoneId,
        members: &[AreaId],
    ) -> Result<Zone, ClimaError> {
        let (zone, _) = self
            .mutate(|s| {
                let index = custom_zone_index(s, zone_id)?;
                let members =
                    validate_custom_members(&s.areas, &s.zones, members, Some(zone_id))?;
                let zone = &mut s.zones[index];
                zone.area_ids = members;
                Ok(zone.clone())
            })
            .await?;
        Ok(zone)
    }

    /// Delete a custom zone.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] for an unknown id or
    /// [`ValidationError::BuiltInZone`] for a built-in zone.
    #[tracing::instrument(skip(self))]
    pub async fn remove_custom_zone(&self, zone_id: ZoneId) -> Result<(), ClimaError> {
        self.mutate(|s| {
            let index = custom_zone_index(s, zone_id)?;
            s.zones.remove(index);
            Ok(())
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use climahub_domain::actuator::Actuator;
    use climahub_domain::hvac::ActiveZone;

    use super::*;
    use crate::controller::fixtures::{area, harness};

    fn ids(h: &crate::controller::fixtures::Harness) -> Vec<AreaId> {
        h.store.current().areas.iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn should_add_area_with_builtin_zone() {
        let h = harness();
        let attic = area("attic", Actuator::Switch("switch.attic".to_string()));

        let added = h.controller.add_area(attic.clone()).await.unwrap();

        let snapshot = h.store.current();
        assert_eq!(added, attic);
        assert_eq!(snapshot.areas.len(), 4);
        assert!(snapshot.zones.iter().any(|z| z.tied_area_id() == Some(attic.id)));
        assert!(h.controller.is_included(&attic));
    }

    #[tokio::test]
    async fn should_reject_duplicate_and_invalid_areas() {
        let h = harness();
        let existing = h.store.current().areas[0].clone();

        let duplicate = h.controller.add_area(existing).await;
        assert!(matches!(
            duplicate,
            Err(ClimaError::Validation(ValidationError::DuplicateArea(_)))
        ));

        let mut neither = area("cellar", Actuator::Switch("switch.cellar".to_string()));
        neither.supports_heat = false;
        neither.supports_cool = false;
        let invalid = h.controller.add_area(neither).await;
        assert!(matches!(
            invalid,
            Err(ClimaError::Validation(ValidationError::NoModeSupported))
        ));
    }

    #[tokio::test]
    async fn should_remove_area_and_its_builtin_zone() {
        let h = harness();
        let hall = ids(&h)[2];

        h.controller.remove_area(hall).await.unwrap();

        let snapshot = h.store.current();
        assert_eq!(snapshot.areas.len(), 2);
        assert!(snapshot.zones.iter().all(|z| !z.contains(hall)));
    }

    #[tokio::test]
    async fn should_reject_removing_area_in_custom_zone() {
        let h = harness();
        let ids = ids(&h);
        h.controller.add_custom_zone(&ids[..2]).await.unwrap();

        let result = h.controller.remove_area(ids[0]).await;

        assert!(matches!(
            result,
            Err(ClimaError::Validation(ValidationError::AreaInCustomZone))
        ));
        assert_eq!(h.store.current().areas.len(), 3);
    }

    #[tokio::test]
    async fn should_tolerate_active_zone_of_removed_area() {
        let h = harness();
        let hall = ids(&h)[2];
        let zone = h
            .store
            .current()
            .zones
            .iter()
            .find(|z| z.tied_area_id() == Some(hall))
            .unwrap()
            .id;
        h.controller
            .set_active_zone(ActiveZone::Zone(zone))
            .await
            .unwrap();

        h.controller.remove_area(hall).await.unwrap();

        let snapshot = h.store.current();
        assert_eq!(snapshot.state.active_zone, ActiveZone::Zone(zone));
        assert!(snapshot.resolver().active_zone().is_none());
        h.controller.run_pass().await.unwrap();
    }

    #[tokio::test]
    async fn should_create_edit_and_remove_custom_zone() {
        let h = harness();
        let ids = ids(&h);

        let zone = h.controller.add_custom_zone(&ids[..2]).await.unwrap();
        assert!(!zone.is_builtin());

        let edited = h
            .controller
            .edit_custom_zone(zone.id, &[ids[2], ids[0]])
            .await
            .unwrap();
        let mut expected = vec![ids[0], ids[2]];
        expected.sort();
        assert_eq!(edited.area_ids, expected);

        h.controller.remove_custom_zone(zone.id).await.unwrap();
        assert!(h.store.current().zone(zone.id).is_none());
    }

    #[tokio::test]
    async fn should_enforce_custom_zone_rules() {
        let h = harness();
        let ids = ids(&h);

        let single = h.controller.add_custom_zone(&ids[..1]).await;
        assert!(matches!(
            single,
            Err(ClimaError::Validation(ValidationError::ZoneTooSmall))
        ));

        let all = h.controller.add_custom_zone(&ids).await;
        assert!(matches!(
            all,
            Err(ClimaError::Validation(ValidationError::ZoneContainsAllAreas))
        ));

        let unknown = h.controller.add_custom_zone(&[ids[0], AreaId::new()]).await;
        assert!(matches!(
            unknown,
            Err(ClimaError::Validation(ValidationError::UnknownArea(_)))
        ));

        h.controller.add_custom_zone(&ids[..2]).await.unwrap();
        let duplicate = h.controller.add_custom_zone(&[ids[1], ids[0]]).await;
        assert!(matches!(
            duplicate,
            Err(ClimaError::Validation(ValidationError::DuplicateZone))
        ));
    }

    #[tokio::test]
    async fn should_refuse_to_touch_builtin_zones() {
        let h = harness();
        let ids = ids(&h);
        let builtin = h.store.current().zones[0].id;

        let edit = h.controller.edit_custom_zone(builtin, &ids[..2]).await;
        let remove = h.controller.remove_custom_zone(builtin).await;
        let missing = h.controller.remove_custom_zone(ZoneId::new()).await;

        assert!(matches!(
            edit,
            Err(ClimaError::Validation(ValidationError::BuiltInZone))
        ));
        assert!(matches!(
            remove,
            Err(ClimaError::Validation(ValidationError::BuiltInZone))
        ));
        assert!(matches!(missing, Err(ClimaError::NotFound(_))));
    }
}
