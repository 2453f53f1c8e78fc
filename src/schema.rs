/// Column-name constants for the dashboard tables.
/// Single source of truth - exported to Python via PyO3.

// ── Sales columns ───────────────────────────────────────────────────────────
pub mod sales {
    pub const DATE: &str = "date";
    pub const CATEGORY: &str = "category";
    pub const SALES: &str = "sales";
    /// Derived at load time from `date`.
    pub const DAY_OF_WEEK: &str = "day_of_week";

    pub const REQUIRED: [&str; 3] = [DATE, CATEGORY, SALES];
}

// ── Geographic columns ──────────────────────────────────────────────────────
pub mod geo {
    pub const REGION: &str = "region";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const SALES: &str = "sales";
    pub const MARKET_SHARE: &str = "market_share";
    /// Web Mercator coordinates, derived at load time.
    pub const X: &str = "x";
    pub const Y: &str = "y";

    pub const REQUIRED: [&str; 5] = [REGION, LATITUDE, LONGITUDE, SALES, MARKET_SHARE];
}

// ── Feedback columns ────────────────────────────────────────────────────────
pub mod feedback {
    pub const CATEGORY: &str = "category";
    pub const RATING: &str = "rating";

    pub const REQUIRED: [&str; 2] = [CATEGORY, RATING];

    pub const MIN_RATING: f64 = 1.0;
    pub const MAX_RATING: f64 = 5.0;
}

// ── Dataset names (used in load errors and logs) ────────────────────────────
pub mod dataset {
    pub const SALES: &str = "sales";
    pub const GEO: &str = "geographic";
    pub const FEEDBACK: &str = "feedback";
}

// ── Selection values ────────────────────────────────────────────────────────
pub mod selection {
    pub const ALL: &str = "All";
}

/// Heatmap y-axis, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
