//! This module stores the column names of the epidemiological dataset that the
//! pipeline consumes. Note that these must be synchronised with the column
//! names of the upstream OWID COVID-19 release!

pub const LOCATION: &str = "location";
pub const DATE: &str = "date";

pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const TOTAL_VACCINATIONS: &str = "total_vaccinations";
pub const NEW_CASES: &str = "new_cases";
pub const NEW_CASES_SMOOTHED: &str = "new_cases_smoothed";
pub const PEOPLE_VACCINATED_PER_HUNDRED: &str = "people_vaccinated_per_hundred";

/// Derived column, computed immediately before its chart is drawn.
pub const DEATH_RATE: &str = "death_rate";
