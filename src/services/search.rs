use serde::Deserialize;

use crate::models::Resort;

/// Ephemeral filter/sort criteria. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCriteria {
    pub term: String,
    pub price_min: f64,
    pub price_max: f64,
    pub min_guests: i64,
    pub required_amenities: Vec<String>,
    pub sort: SortKey,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            term: String::new(),
            price_min: 0.0,
            price_max: f64::MAX,
            min_guests: 1,
            required_amenities: vec![],
            sort: SortKey::RatingDesc,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    RatingDesc,
    PriceAsc,
    PriceDesc,
    Popularity,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s {
            "price_asc" => SortKey::PriceAsc,
            "price_desc" => SortKey::PriceDesc,
            "popularity" => SortKey::Popularity,
            _ => SortKey::RatingDesc,
        }
    }
}

/// Filter and order the catalog. Pure: same inputs, same output, no I/O.
/// Stages run in a fixed order, each narrowing or reordering the last.
/// Malformed criteria (price min above max) simply match nothing.
pub fn search_resorts(resorts: Vec<Resort>, criteria: &SearchCriteria) -> Vec<Resort> {
    let term = criteria.term.trim().to_lowercase();
    let required: Vec<String> = criteria
        .required_amenities
        .iter()
        .map(|a| a.to_lowercase())
        .collect();

    let mut matched: Vec<Resort> = resorts
        .into_iter()
        .filter(|r| {
            term.is_empty()
                || r.name.to_lowercase().contains(&term)
                || r.location.to_lowercase().contains(&term)
        })
        .filter(|r| {
            let price = r.price_per_night.unwrap_or(0.0);
            price >= criteria.price_min && price <= criteria.price_max
        })
        .filter(|r| r.effective_capacity() >= criteria.min_guests)
        .filter(|r| {
            required.is_empty() || {
                let have: Vec<String> = r.amenities.iter().map(|a| a.to_lowercase()).collect();
                required.iter().all(|want| have.contains(want))
            }
        })
        .collect();

    // sort_by is stable, so equal keys keep their relative order
    match criteria.sort {
        SortKey::PriceAsc => matched.sort_by(|a, b| {
            a.price_per_night
                .unwrap_or(0.0)
                .total_cmp(&b.price_per_night.unwrap_or(0.0))
        }),
        SortKey::PriceDesc => matched.sort_by(|a, b| {
            b.price_per_night
                .unwrap_or(0.0)
                .total_cmp(&a.price_per_night.unwrap_or(0.0))
        }),
        // Popularity is a placeholder: no real popularity signal exists yet,
        // so it orders exactly like rating_desc.
        SortKey::RatingDesc | SortKey::Popularity => matched
            .sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0))),
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resort(id: &str, name: &str, location: &str, price: Option<f64>, rating: Option<f64>) -> Resort {
        let now = Utc::now().naive_utc();
        Resort {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            description: None,
            price_per_night: price,
            rating,
            capacity: Some(2),
            amenities: vec![],
            stay_options: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<Resort> {
        vec![
            {
                let mut r = resort("r1", "Misty Meadows", "Munnar", Some(4500.0), Some(4.8));
                r.amenities = vec!["Campfire".to_string(), "Wi-Fi".to_string()];
                r
            },
            {
                let mut r = resort("r2", "Backwater Bliss", "Alleppey", Some(6500.0), Some(4.5));
                r.amenities = vec!["Houseboat Option".to_string(), "Wi-Fi".to_string()];
                r
            },
            {
                let mut r = resort("r3", "Coastal Calm", "Varkala", Some(3000.0), Some(4.2));
                r.amenities = vec!["Beach Access".to_string(), "Pool".to_string()];
                r
            },
        ]
    }

    #[test]
    fn test_empty_criteria_returns_everything() {
        let out = search_resorts(catalog(), &SearchCriteria::default());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_term_matches_name_or_location_case_insensitive() {
        let criteria = SearchCriteria {
            term: "MUNNAR".to_string(),
            ..Default::default()
        };
        let out = search_resorts(catalog(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "r1");

        let criteria = SearchCriteria {
            term: "bliss".to_string(),
            ..Default::default()
        };
        let out = search_resorts(catalog(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "r2");
    }

    #[test]
    fn test_price_range_filter_and_missing_price_as_zero() {
        let mut resorts = catalog();
        resorts.push(resort("r4", "No Price Yet", "Wayanad", None, Some(4.0)));

        let criteria = SearchCriteria {
            price_min: 3500.0,
            price_max: 7000.0,
            ..Default::default()
        };
        let out = search_resorts(resorts.clone(), &criteria);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);

        // Missing price compares as 0, so it survives a 0-floor range.
        let criteria = SearchCriteria {
            price_max: 100.0,
            ..Default::default()
        };
        let out = search_resorts(resorts, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "r4");
    }

    #[test]
    fn test_inverted_price_range_yields_empty_not_panic() {
        let criteria = SearchCriteria {
            price_min: 9000.0,
            price_max: 1000.0,
            ..Default::default()
        };
        assert!(search_resorts(catalog(), &criteria).is_empty());
    }

    #[test]
    fn test_capacity_filter_uses_effective_capacity() {
        let criteria = SearchCriteria {
            min_guests: 3,
            ..Default::default()
        };
        // All catalog resorts declare capacity 2 and have no stay options.
        assert!(search_resorts(catalog(), &criteria).is_empty());

        let criteria = SearchCriteria {
            min_guests: 2,
            ..Default::default()
        };
        assert_eq!(search_resorts(catalog(), &criteria).len(), 3);
    }

    #[test]
    fn test_amenity_filter_is_case_insensitive_and_conjunctive() {
        let criteria = SearchCriteria {
            required_amenities: vec!["wi-fi".to_string()],
            ..Default::default()
        };
        assert_eq!(search_resorts(catalog(), &criteria).len(), 2);

        let criteria = SearchCriteria {
            required_amenities: vec!["Wi-Fi".to_string(), "campfire".to_string()],
            ..Default::default()
        };
        let out = search_resorts(catalog(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "r1");
    }

    #[test]
    fn test_sort_orders() {
        let criteria = SearchCriteria {
            sort: SortKey::PriceAsc,
            ..Default::default()
        };
        let ids: Vec<String> = search_resorts(catalog(), &criteria)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r3", "r1", "r2"]);

        let criteria = SearchCriteria {
            sort: SortKey::PriceDesc,
            ..Default::default()
        };
        let ids: Vec<String> = search_resorts(catalog(), &criteria)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r2", "r1", "r3"]);

        let criteria = SearchCriteria {
            sort: SortKey::RatingDesc,
            ..Default::default()
        };
        let ids: Vec<String> = search_resorts(catalog(), &criteria)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_popularity_matches_rating_desc() {
        let by_popularity: Vec<String> = search_resorts(
            catalog(),
            &SearchCriteria {
                sort: SortKey::Popularity,
                ..Default::default()
            },
        )
        .into_iter()
        .map(|r| r.id)
        .collect();
        let by_rating: Vec<String> = search_resorts(
            catalog(),
            &SearchCriteria {
                sort: SortKey::RatingDesc,
                ..Default::default()
            },
        )
        .into_iter()
        .map(|r| r.id)
        .collect();
        assert_eq!(by_popularity, by_rating);
    }

    #[test]
    fn test_sorting_is_a_permutation_of_the_filtered_set() {
        for sort in [
            SortKey::RatingDesc,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
            SortKey::Popularity,
        ] {
            let criteria = SearchCriteria {
                sort,
                ..Default::default()
            };
            let mut ids: Vec<String> = search_resorts(catalog(), &criteria)
                .into_iter()
                .map(|r| r.id)
                .collect();
            ids.sort();
            assert_eq!(ids, vec!["r1", "r2", "r3"]);
        }
    }

    #[test]
    fn test_stable_sort_keeps_input_order_on_ties() {
        let resorts = vec![
            resort("a", "First", "X", Some(1000.0), Some(4.0)),
            resort("b", "Second", "Y", Some(1000.0), Some(4.0)),
            resort("c", "Third", "Z", Some(1000.0), Some(4.0)),
        ];
        let criteria = SearchCriteria {
            sort: SortKey::PriceAsc,
            ..Default::default()
        };
        let ids: Vec<String> = search_resorts(resorts, &criteria)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
