/// One ranked neighbor of a query property.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub property: String,
    pub score: f64,
}

/// One property within the radius of an anchor. `distance` is in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby {
    pub property: String,
    pub distance: f64,
}

/// Ordered by score descending, then identifier ascending.
pub type RecommendationResult = Vec<Recommendation>;

/// Ordered by distance ascending, then identifier ascending.
pub type ProximityResult = Vec<Nearby>;
