/// ISO 3166-1 alpha-2 codes for the markets the airline sells into. The
/// commit path stores the resolved name when the code is known and falls back
/// to the raw code otherwise.
static COUNTRIES: &[(&str, &str)] = &[
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BB", "Barbados"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("BS", "Bahamas"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("CU", "Cuba"),
    ("DE", "Germany"),
    ("DO", "Dominican Republic"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GD", "Grenada"),
    ("GP", "Guadeloupe"),
    ("HT", "Haiti"),
    ("IT", "Italy"),
    ("JM", "Jamaica"),
    ("JP", "Japan"),
    ("MQ", "Martinique"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("PA", "Panama"),
    ("PE", "Peru"),
    ("PR", "Puerto Rico"),
    ("PT", "Portugal"),
    ("SE", "Sweden"),
    ("TC", "Turks and Caicos Islands"),
    ("TT", "Trinidad and Tobago"),
    ("US", "United States"),
    ("VE", "Venezuela"),
];

/// Resolve a country code to its display name. Unknown codes return `None`;
/// callers keep the raw code in that case.
pub fn resolve(code: &str) -> Option<&'static str> {
    let needle = code.trim().to_ascii_uppercase();
    COUNTRIES
        .iter()
        .find(|(candidate, _)| *candidate == needle)
        .map(|(_, name)| *name)
}
