use crate::models::{AgeInput, FilterInput, MatchFilter, Profile, MAX_AGE, MIN_AGE};

/// Parse a user supplied age bound
///
/// Numbers are truncated to whole years. Text is trimmed and parsed the same
/// way. Anything unparseable, non-finite or zero yields `None`, so callers
/// fall back to their default bound.
pub fn parse_age(input: Option<&AgeInput>) -> Option<i32> {
    let value = match input? {
        AgeInput::Number(n) => *n,
        AgeInput::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };

    if !value.is_finite() {
        return None;
    }

    let whole = value.trunc();
    if whole == 0.0 || whole < i32::MIN as f64 || whole > i32::MAX as f64 {
        return None;
    }

    Some(whole as i32)
}

/// Turn raw spin input into a [`MatchFilter`]
///
/// Missing or non-numeric bounds default to 18 and 99. Inverted bounds are
/// swapped so the result always satisfies `min_age <= max_age`.
pub fn normalize_filter(input: &FilterInput) -> MatchFilter {
    let min = parse_age(input.min_age.as_ref()).unwrap_or(MIN_AGE);
    let max = parse_age(input.max_age.as_ref()).unwrap_or(MAX_AGE);

    let city = input
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    MatchFilter {
        city,
        min_age: min.min(max),
        max_age: min.max(max),
    }
}

/// Case-insensitive substring test used for the city filter
///
/// Folds one character to one character, the way Postgres `ILIKE` lowers
/// text, so `İstanbul` still contains `istanbul`.
#[inline]
pub fn city_contains(city: &str, needle: &str) -> bool {
    fold_case(city).contains(&fold_case(needle))
}

fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Check whether a profile is an eligible candidate for the requester
#[inline]
pub fn is_candidate(profile: &Profile, requester_id: &str, filter: &MatchFilter) -> bool {
    // Never match the requester with themselves
    if profile.id == requester_id {
        return false;
    }

    if profile.age < filter.min_age || profile.age > filter.max_age {
        return false;
    }

    if let Some(city) = filter.city.as_deref() {
        if !city_contains(&profile.city, city) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, age: i32, city: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("User {}", id),
            city: city.to_string(),
            age,
            phone: "+15550100".to_string(),
            avatar_url: String::new(),
        }
    }

    fn input(city: Option<&str>, min: Option<AgeInput>, max: Option<AgeInput>) -> FilterInput {
        FilterInput {
            city: city.map(str::to_string),
            min_age: min,
            max_age: max,
        }
    }

    #[test]
    fn test_parse_age_number_and_text() {
        assert_eq!(parse_age(Some(&AgeInput::Number(25.0))), Some(25));
        assert_eq!(parse_age(Some(&AgeInput::Number(30.9))), Some(30));
        assert_eq!(parse_age(Some(&AgeInput::Text(" 42 ".into()))), Some(42));
    }

    #[test]
    fn test_parse_age_rejects_garbage() {
        assert_eq!(parse_age(None), None);
        assert_eq!(parse_age(Some(&AgeInput::Text("abc".into()))), None);
        assert_eq!(parse_age(Some(&AgeInput::Text("".into()))), None);
        assert_eq!(parse_age(Some(&AgeInput::Number(0.0))), None);
        assert_eq!(parse_age(Some(&AgeInput::Number(f64::NAN))), None);
    }

    #[test]
    fn test_normalize_defaults() {
        let filter = normalize_filter(&FilterInput::default());
        assert_eq!(filter.min_age, 18);
        assert_eq!(filter.max_age, 99);
        assert_eq!(filter.city, None);
    }

    #[test]
    fn test_normalize_non_numeric_uses_defaults() {
        let filter = normalize_filter(&input(None, Some("young".into()), Some("old".into())));
        assert_eq!((filter.min_age, filter.max_age), (18, 99));
    }

    #[test]
    fn test_normalize_swaps_inverted_bounds() {
        let filter = normalize_filter(&input(None, Some(40.into()), Some(20.into())));
        assert_eq!((filter.min_age, filter.max_age), (20, 40));
    }

    #[test]
    fn test_normalize_swaps_against_default() {
        // max defaults to 99, so a min above it becomes the upper bound
        let filter = normalize_filter(&input(None, Some(120.into()), None));
        assert_eq!((filter.min_age, filter.max_age), (99, 120));
    }

    #[test]
    fn test_normalize_trims_city() {
        let filter = normalize_filter(&input(Some("  Austin "), None, None));
        assert_eq!(filter.city.as_deref(), Some("Austin"));

        let filter = normalize_filter(&input(Some("   "), None, None));
        assert_eq!(filter.city, None);
    }

    #[test]
    fn test_is_candidate_excludes_requester() {
        let filter = MatchFilter::default();
        assert!(!is_candidate(&profile("1", 25, "Austin"), "1", &filter));
        assert!(is_candidate(&profile("2", 25, "Austin"), "1", &filter));
    }

    #[test]
    fn test_is_candidate_age_bounds_inclusive() {
        let filter = MatchFilter { city: None, min_age: 20, max_age: 35 };
        assert!(is_candidate(&profile("2", 20, "Austin"), "1", &filter));
        assert!(is_candidate(&profile("2", 35, "Austin"), "1", &filter));
        assert!(!is_candidate(&profile("2", 19, "Austin"), "1", &filter));
        assert!(!is_candidate(&profile("2", 36, "Austin"), "1", &filter));
    }

    #[test]
    fn test_is_candidate_city_case_insensitive_substring() {
        let filter = MatchFilter { city: Some("austin".into()), min_age: 18, max_age: 99 };
        assert!(is_candidate(&profile("2", 25, "Austin"), "1", &filter));
        assert!(is_candidate(&profile("2", 25, "North AUSTIN, TX"), "1", &filter));
        assert!(!is_candidate(&profile("2", 25, "Dallas"), "1", &filter));
    }

    #[test]
    fn test_city_contains_folds_per_character() {
        assert!(city_contains("İstanbul", "istanbul"));
        assert!(city_contains("istanbul", "İSTANBUL"));
        assert!(city_contains("São Paulo", "SÃO"));
        assert!(!city_contains("Izmir", "istanbul"));
    }
}
