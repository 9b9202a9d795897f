use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entities::{LatLng, OpeningHours, PlaceDetailsResult, PlacesSearchResult};

/// A restaurant as returned to API callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub address: String,
    /// Short neighbourhood address; equals `address` for search results.
    #[serde(default)]
    pub vicinity: String,
    pub location: LatLng,
    pub name: String,
    pub phone: String,
    pub rating: f32,
    /// Today's opening time (`hhmm`), empty when unknown.
    pub schedule: String,
    pub price_level: i32,
    /// Comma-separated place types.
    pub types: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
}

impl Place {
    /// Nearby search only carries `vicinity`, so that is used as the address.
    pub fn from_search(result: PlacesSearchResult, weekday: u8) -> Self {
        let open_now = result.opening_hours.as_ref().and_then(|hours| hours.open_now);
        Self {
            schedule: schedule_for(result.opening_hours.as_ref(), weekday),
            place_id: result.place_id,
            address: result.vicinity.clone(),
            vicinity: result.vicinity,
            location: result.geometry.location,
            name: result.name,
            phone: String::new(),
            rating: result.rating,
            price_level: result.price_level,
            types: result.types.join(","),
            open_now,
        }
    }

    pub fn from_details(details: PlaceDetailsResult, weekday: u8) -> Self {
        let open_now = details.opening_hours.as_ref().and_then(|hours| hours.open_now);
        let address = if details.formatted_address.is_empty() {
            details.vicinity.clone()
        } else {
            details.formatted_address
        };
        Self {
            schedule: schedule_for(details.opening_hours.as_ref(), weekday),
            place_id: details.place_id,
            address,
            vicinity: details.vicinity,
            location: details.geometry.location,
            name: details.name,
            phone: details.formatted_phone_number,
            rating: details.rating,
            price_level: details.price_level,
            types: details.types.join(","),
            open_now,
        }
    }
}

impl From<PlacesSearchResult> for Place {
    fn from(result: PlacesSearchResult) -> Self {
        Place::from_search(result, today())
    }
}

impl From<PlaceDetailsResult> for Place {
    fn from(details: PlaceDetailsResult) -> Self {
        Place::from_details(details, today())
    }
}

fn schedule_for(hours: Option<&OpeningHours>, weekday: u8) -> String {
    hours
        .and_then(|hours| hours.opens_at(weekday))
        .unwrap_or_default()
        .to_string()
}

/// Local weekday, 0 is Sunday.
pub(crate) fn today() -> u8 {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .weekday()
        .number_days_from_sunday()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Geometry, OpeningPeriod, TimeOfWeek};

    fn hours() -> OpeningHours {
        OpeningHours {
            open_now: Some(false),
            periods: vec![
                OpeningPeriod {
                    open: TimeOfWeek {
                        day: 1,
                        time: "1200".to_string(),
                    },
                    close: None,
                },
                OpeningPeriod {
                    open: TimeOfWeek {
                        day: 5,
                        time: "1900".to_string(),
                    },
                    close: None,
                },
            ],
        }
    }

    #[test]
    fn search_result_maps_vicinity_and_todays_opening() {
        let result = PlacesSearchResult {
            place_id: "p1".to_string(),
            name: "O Cantinho".to_string(),
            vicinity: "Rua Augusta 1".to_string(),
            rating: 4.3,
            price_level: 2,
            geometry: Geometry {
                location: LatLng::new(38.71, -9.13),
                location_type: None,
            },
            types: vec!["restaurant".to_string(), "food".to_string()],
            opening_hours: Some(hours()),
        };

        let place = Place::from_search(result, 5);

        assert_eq!(place.address, "Rua Augusta 1");
        assert_eq!(place.vicinity, "Rua Augusta 1");
        assert_eq!(place.schedule, "1900");
        assert_eq!(place.types, "restaurant,food");
        assert_eq!(place.open_now, Some(false));
        assert!(place.phone.is_empty());
    }

    #[test]
    fn missing_opening_hours_leave_schedule_empty() {
        let place = Place::from_search(PlacesSearchResult::default(), 3);
        assert_eq!(place.schedule, "");
        assert_eq!(place.open_now, None);
    }

    #[test]
    fn details_prefer_formatted_address() {
        let details = PlaceDetailsResult {
            name: "Tasca".to_string(),
            formatted_address: "Rua Augusta 1, Lisboa".to_string(),
            formatted_phone_number: "21 000 0000".to_string(),
            vicinity: "Rua Augusta 1".to_string(),
            opening_hours: Some(hours()),
            ..Default::default()
        };

        let place = Place::from_details(details, 2);

        assert_eq!(place.address, "Rua Augusta 1, Lisboa");
        assert_eq!(place.vicinity, "Rua Augusta 1");
        assert_eq!(place.phone, "21 000 0000");
        assert_eq!(place.schedule, "");
    }

    #[test]
    fn place_serializes_with_api_field_names() {
        let value = serde_json::to_value(Place::default()).unwrap();
        for field in [
            "address",
            "vicinity",
            "location",
            "name",
            "phone",
            "rating",
            "schedule",
            "price_level",
            "types",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert!(value.get("open_now").is_none());
    }
}
