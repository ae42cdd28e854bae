//! Static lookup from US state names to postal codes and FIPS region ids.
//!
//! The table is the join key between the tabular dataset and any external
//! geographic boundary data. It covers the 50 states plus the District of
//! Columbia; territories such as Puerto Rico resolve to `None`.

/// One entry of the state vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub name: &'static str,
    pub code: &'static str,
    pub region_id: u32,
}

const fn state(name: &'static str, code: &'static str, region_id: u32) -> StateInfo {
    StateInfo {
        name,
        code,
        region_id,
    }
}

/// Name, postal code and FIPS id for every state plus DC, ordered by id.
static STATES: &[StateInfo] = &[
    state("Alabama", "AL", 1),
    state("Alaska", "AK", 2),
    state("Arizona", "AZ", 4),
    state("Arkansas", "AR", 5),
    state("California", "CA", 6),
    state("Colorado", "CO", 8),
    state("Connecticut", "CT", 9),
    state("Delaware", "DE", 10),
    state("District of Columbia", "DC", 11),
    state("Florida", "FL", 12),
    state("Georgia", "GA", 13),
    state("Hawaii", "HI", 15),
    state("Idaho", "ID", 16),
    state("Illinois", "IL", 17),
    state("Indiana", "IN", 18),
    state("Iowa", "IA", 19),
    state("Kansas", "KS", 20),
    state("Kentucky", "KY", 21),
    state("Louisiana", "LA", 22),
    state("Maine", "ME", 23),
    state("Maryland", "MD", 24),
    state("Massachusetts", "MA", 25),
    state("Michigan", "MI", 26),
    state("Minnesota", "MN", 27),
    state("Mississippi", "MS", 28),
    state("Missouri", "MO", 29),
    state("Montana", "MT", 30),
    state("Nebraska", "NE", 31),
    state("Nevada", "NV", 32),
    state("New Hampshire", "NH", 33),
    state("New Jersey", "NJ", 34),
    state("New Mexico", "NM", 35),
    state("New York", "NY", 36),
    state("North Carolina", "NC", 37),
    state("North Dakota", "ND", 38),
    state("Ohio", "OH", 39),
    state("Oklahoma", "OK", 40),
    state("Oregon", "OR", 41),
    state("Pennsylvania", "PA", 42),
    state("Rhode Island", "RI", 44),
    state("South Carolina", "SC", 45),
    state("South Dakota", "SD", 46),
    state("Tennessee", "TN", 47),
    state("Texas", "TX", 48),
    state("Utah", "UT", 49),
    state("Vermont", "VT", 50),
    state("Virginia", "VA", 51),
    state("Washington", "WA", 53),
    state("West Virginia", "WV", 54),
    state("Wisconsin", "WI", 55),
    state("Wyoming", "WY", 56),
];

/// Returns the full entry for `name`, matched exactly.
pub fn lookup(name: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.name == name)
}

/// Returns the two-letter postal code for `name`, if it is a known state.
pub fn abbreviation(name: &str) -> Option<&'static str> {
    lookup(name).map(|s| s.code)
}

/// Returns the FIPS region id for `name`, if it is a known state.
pub fn region_id(name: &str) -> Option<u32> {
    lookup(name).map(|s| s.region_id)
}

/// Reverse lookup from FIPS id to state name.
pub fn name_for_region(region_id: u32) -> Option<&'static str> {
    STATES
        .iter()
        .find(|s| s.region_id == region_id)
        .map(|s| s.name)
}

/// Iterates over the whole vocabulary in region id order.
pub fn all() -> impl Iterator<Item = &'static StateInfo> {
    STATES.iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vocabulary_size() {
        assert_eq!(all().count(), 51);
    }

    #[test]
    fn test_table_is_one_to_one() {
        let names: HashSet<_> = all().map(|s| s.name).collect();
        let codes: HashSet<_> = all().map(|s| s.code).collect();
        let ids: HashSet<_> = all().map(|s| s.region_id).collect();

        assert_eq!(names.len(), 51);
        assert_eq!(codes.len(), 51);
        assert_eq!(ids.len(), 51);
    }

    #[test]
    fn test_every_name_resolves() {
        for s in all() {
            assert_eq!(abbreviation(s.name), Some(s.code));
            assert_eq!(region_id(s.name), Some(s.region_id));
            assert_eq!(name_for_region(s.region_id), Some(s.name));
        }
    }

    #[test]
    fn test_known_states() {
        assert_eq!(abbreviation("California"), Some("CA"));
        assert_eq!(region_id("California"), Some(6));
        assert_eq!(abbreviation("Alaska"), Some("AK"));
        assert_eq!(region_id("Hawaii"), Some(15));
        assert_eq!(abbreviation("District of Columbia"), Some("DC"));
        assert_eq!(region_id("Wyoming"), Some(56));
    }

    #[test]
    fn test_unknown_names_are_absent() {
        for name in ["Puerto Rico", "", "california", " Texas", "Guam"] {
            assert_eq!(abbreviation(name), None, "{name}");
            assert_eq!(region_id(name), None, "{name}");
        }
        assert_eq!(name_for_region(3), None);
        assert_eq!(name_for_region(72), None);
    }
}
