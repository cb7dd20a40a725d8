use log::debug;

use super::engine_types::{Nearby, ProximityResult};
use crate::store::{CoreError, DistanceLookup};

/**
 * Radius queries around a named anchor.
 */
pub struct ProximityQuery<'s, D: DistanceLookup + ?Sized> {
    store: &'s D,
}

impl<'s, D: DistanceLookup + ?Sized> ProximityQuery<'s, D> {
    pub fn new(store: &'s D) -> ProximityQuery<'s, D> {
        ProximityQuery { store }
    }

    /**
     * Every property strictly closer than `radius_meters`, nearest first. An empty result
     * means nothing is in range.
     */
    pub fn within_radius(&self, anchor: &str, radius_meters: f64) -> Result<ProximityResult, CoreError> {
        let column = self.store.column(anchor)?;

        // NaN fails this comparison too.
        if !(radius_meters > 0.0) {
            return Err(CoreError::InvalidArgument(format!(
                "radius must be positive, got {}",
                radius_meters
            )));
        }

        let mut matches: Vec<(&str, f64)> = column
            .iter()
            .filter(|(_, distance)| *distance < radius_meters)
            .collect();

        matches.sort_by(|(a_name, a_dist), (b_name, b_dist)| {
            a_dist
                .total_cmp(b_dist)
                .then_with(|| a_name.cmp(b_name))
        });

        debug!(
            "{} of {} properties within {} m of '{}'",
            matches.len(),
            column.len(),
            radius_meters,
            anchor
        );

        Ok(matches
            .into_iter()
            .map(|(property, distance)| Nearby {
                property: property.to_owned(),
                distance,
            })
            .collect())
    }
}
