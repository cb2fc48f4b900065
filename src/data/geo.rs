use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// US state lookup
// ---------------------------------------------------------------------------

/// Name/abbreviation pairs for the US states, DC, and the territories
/// that appear in the CSSE files.
const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Northern Mariana Islands", "MP"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Palau", "PW"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virgin Islands", "VI"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Full state name for a postal abbreviation.
pub fn state_name(abbreviation: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(_, abbr)| *abbr == abbreviation)
        .map(|(name, _)| *name)
}

/// Postal abbreviation for a full state name.
pub fn state_abbreviation(name: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(state, _)| *state == name)
        .map(|(_, abbr)| *abbr)
}

// ---------------------------------------------------------------------------
// Province / county splitting
// ---------------------------------------------------------------------------

/// Placeholder for fields the source data leaves blank.
pub const NOT_AVAILABLE: &str = "N/A";

/// Split a raw province field into (province, county).
///
/// US county rows arrive as `"King County, WA"`: the county is the text
/// before the comma and the abbreviation after it resolves to the state
/// name. `"Washington, D.C."` is its own spelling. Fields without a comma
/// are already province names; an empty field becomes [`NOT_AVAILABLE`].
pub fn split_province(raw: &str) -> Result<(String, String)> {
    if raw.is_empty() {
        return Ok((NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()));
    }
    let Some((county, rest)) = raw.split_once(',') else {
        return Ok((raw.to_string(), NOT_AVAILABLE.to_string()));
    };
    if raw.contains("D.C.") {
        return Ok(("District of Columbia".to_string(), "Washington".to_string()));
    }
    let abbreviation = rest.trim();
    match state_name(abbreviation) {
        Some(state) => Ok((state.to_string(), county.to_string())),
        None => bail!("unrecognized state abbreviation {abbreviation:?} in {raw:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_bidirectional() {
        assert_eq!(state_name("WA"), Some("Washington"));
        assert_eq!(state_abbreviation("Washington"), Some("WA"));
        assert_eq!(state_name("ZZ"), None);
        assert_eq!(state_abbreviation("Atlantis"), None);
    }

    #[test]
    fn county_rows_split_into_state_and_county() {
        let (province, county) = split_province("King County, WA").unwrap();
        assert_eq!(province, "Washington");
        assert_eq!(county, "King County");
    }

    #[test]
    fn washington_dc_has_its_own_spelling() {
        let (province, county) = split_province("Washington, D.C.").unwrap();
        assert_eq!(province, "District of Columbia");
        assert_eq!(county, "Washington");
    }

    #[test]
    fn plain_provinces_and_blanks_pass_through() {
        assert_eq!(
            split_province("Hubei").unwrap(),
            ("Hubei".to_string(), NOT_AVAILABLE.to_string())
        );
        assert_eq!(
            split_province("").unwrap(),
            (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
        );
    }

    #[test]
    fn unknown_abbreviations_are_an_error() {
        assert!(split_province("Somewhere, ZZ").is_err());
    }
}
