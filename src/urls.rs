//! Absolute hyperlinks for hierarchical resources.
//!
//! A model's URL is its collection segments zipped with its recursive keys,
//! e.g. `["residence", "room"]` + `["3", "1"]` gives `/residence/3/room/1/`.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header::HOST, http::request::Parts};

use crate::models::Model;
use crate::AppState;

// ---

/// URL builder bound to the absolute base of the current request.
#[derive(Debug, Clone)]
pub struct Links {
    base: String,
}

impl Links {
    // ---
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Interleave `segments` with `keys`.
    ///
    /// With one key per segment this is a detail URL; with one key fewer it
    /// is the collection URL under the given parents.
    pub fn path(&self, segments: &[&str], keys: &[String]) -> String {
        // ---
        let mut url = self.base.clone();
        for (i, segment) in segments.iter().enumerate() {
            url.push('/');
            url.push_str(segment);
            if let Some(key) = keys.get(i) {
                url.push('/');
                url.push_str(key);
            }
        }
        url.push('/');
        url
    }

    pub fn detail<M: Model>(&self, model: &M) -> String {
        self.path(M::SEGMENTS, &model.recursive_keys())
    }

    /// Collection of `M` below the parent identified by `parent_keys`.
    pub fn collection<M: Model>(&self, parent_keys: &[String]) -> String {
        self.path(M::SEGMENTS, parent_keys)
    }

    /// Named sub-route of a collection, e.g. `.../temperature/latest/`.
    pub fn action<M: Model>(&self, parent_keys: &[String], action: &str) -> String {
        format!("{}{}/", self.collection::<M>(parent_keys), action)
    }
}

impl FromRequestParts<AppState> for Links {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let config = &state.1;
        let links = match &config.public_base_url {
            Some(base) => Links::new(base.as_str()),
            None => {
                let host = parts
                    .headers
                    .get(HOST)
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("localhost");
                Links::new(format!("http://{host}"))
            }
        };
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{Residence, Room, Temperature, Thermostat};
    use chrono::{TimeZone, Utc};

    fn links() -> Links {
        Links::new("http://testserver/")
    }

    fn thermostat() -> Thermostat {
        Thermostat {
            rfid: "5".into(),
            name: "Hallway".into(),
            room_id: 1,
            residence_rfid: "3".into(),
        }
    }

    #[test]
    fn test_base_trailing_slash_trimmed() {
        assert_eq!(
            Links::new("http://testserver///").collection::<Residence>(&[]),
            "http://testserver/residence/"
        );
    }

    #[test]
    fn test_detail_urls() {
        // ---
        let residence = Residence { rfid: "3".into() };
        assert_eq!(links().detail(&residence), "http://testserver/residence/3/");

        let room = Room {
            id: 1,
            name: "Dining Room".into(),
            residence_rfid: "3".into(),
        };
        assert_eq!(links().detail(&room), "http://testserver/residence/3/room/1/");

        assert_eq!(
            links().detail(&thermostat()),
            "http://testserver/residence/3/room/1/thermostat/5/"
        );

        let temperature = Temperature {
            datetime: Utc.with_ymd_and_hms(2015, 5, 13, 7, 0, 0).unwrap(),
            value: 36.1,
            thermostat_rfid: "5".into(),
            room_id: 1,
            residence_rfid: "3".into(),
        };
        assert_eq!(
            links().detail(&temperature),
            "http://testserver/residence/3/room/1/thermostat/5/temperature/2015-05-13T07:00:00Z/"
        );
    }

    #[test]
    fn test_collection_and_action_urls() {
        // ---
        let parent = thermostat().recursive_keys();

        assert_eq!(
            links().collection::<Temperature>(&parent),
            "http://testserver/residence/3/room/1/thermostat/5/temperature/"
        );
        assert_eq!(
            links().action::<Temperature>(&parent, "latest"),
            "http://testserver/residence/3/room/1/thermostat/5/temperature/latest/"
        );
        assert_eq!(
            links().collection::<Residence>(&[]),
            "http://testserver/residence/"
        );
    }
}
