//! Zone lookup through trigger sequences

use crate::commands::Commands;
use crate::function_type::FunctionType;
use crate::path::resolve_entity_path;
use cathode_core::ShortGuid;

/// Zone that streams in a given entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneMatch {
    /// Composite holding the zone and its trigger sequence
    pub composite: ShortGuid,
    pub zone: ShortGuid,
    pub trigger_sequence: ShortGuid,
}

/// Find the zone owning an entity
///
/// Searches every composite for a TriggerSequence with an entry that resolves
/// to `(target_composite, target_entity)`, then for a Zone in the same
/// composite whose `composites` parameter links to that sequence.
pub fn find_zone_for_entity(
    commands: &Commands,
    target_composite: ShortGuid,
    target_entity: ShortGuid,
) -> Option<ZoneMatch> {
    let composites_param = ShortGuid::from_name("composites");

    for composite in commands.composites() {
        for trigger in composite.functions_of_type(FunctionType::TriggerSequence) {
            let hits = trigger.sequence().iter().any(|entry| {
                resolve_entity_path(commands, composite, &entry.path).map_or(false, |r| {
                    r.composite.guid == target_composite && r.entity.guid == target_entity
                })
            });
            if !hits {
                continue;
            }

            let zone = composite.functions_of_type(FunctionType::Zone).find(|zone| {
                zone.links_from(composites_param)
                    .any(|link| link.child == trigger.guid)
            });
            if let Some(zone) = zone {
                log::debug!(
                    "Entity {} is zoned by {} in {}",
                    target_entity.to_byte_string(),
                    zone.guid.to_byte_string(),
                    composite.name
                );
                return Some(ZoneMatch {
                    composite: composite.guid,
                    zone: zone.guid,
                    trigger_sequence: trigger.guid,
                });
            }
        }
    }
    None
}
