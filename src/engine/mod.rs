mod engine_types;
mod price_band;
mod proximity_query;
mod recommender;
mod weight_set;

pub use engine_types::{Nearby, Recommendation};
pub use price_band::{price_range, PriceRange, DEFAULT_PRICE_MARGIN};
pub use proximity_query::ProximityQuery;
pub use recommender::Recommender;
pub use weight_set::{WeightEntry, WeightSet};
