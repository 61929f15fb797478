//! Airspace search queries and their request parameters.

use airspace_core::{BoundingBox, Track};
use serde::{Deserialize, Serialize};

/// Records per page requested from the API.
pub const PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirspaceQuery {
    BoundingBox {
        bbox: BoundingBox,
        classes: Vec<i64>,
    },
    Radius {
        /// (lat, lon)
        center: (f64, f64),
        radius_m: f64,
        classes: Vec<i64>,
    },
}

impl AirspaceQuery {
    /// Query around a track: its bounding box when `radius_m` is zero, else a
    /// circle of `radius_m` around the bounding box centre. `None` when the
    /// track has no usable position.
    pub fn for_track(track: &Track, radius_m: f64, classes: Vec<i64>) -> Option<Self> {
        let bbox = track.bbox()?;
        if radius_m == 0.0 {
            Some(Self::BoundingBox { bbox, classes })
        } else {
            Some(Self::Radius {
                center: bbox.center(),
                radius_m,
                classes,
            })
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Self::BoundingBox { classes, .. } | Self::Radius { classes, .. } => classes,
        }
    }

    /// Query string pairs for one page, without the API key.
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string()), ("limit", PAGE_LIMIT.to_string())];
        match self {
            Self::BoundingBox { bbox, .. } => params.push((
                "bbox",
                format!(
                    "{},{},{},{}",
                    bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
                ),
            )),
            Self::Radius {
                center: (lat, lon),
                radius_m,
                ..
            } => {
                params.push(("pos", format!("{lat},{lon}")));
                params.push(("dist", radius_m.to_string()));
            }
        }
        let classes = self
            .classes()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        params.push(("icaoClass", classes));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airspace_core::Fix;

    fn track() -> Track {
        Track::new(vec![
            Fix::new(0, 45.0, 6.0, 1000.0),
            Fix::new(1000, 45.5, 6.5, 1200.0),
        ])
    }

    #[test]
    fn zero_radius_uses_bounding_box() {
        let query = AirspaceQuery::for_track(&track(), 0.0, vec![0, 1, 2]).unwrap();
        let params = query.params(1);
        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("limit", "1000".to_string()),
                ("bbox", "6,45,6.5,45.5".to_string()),
                ("icaoClass", "0,1,2".to_string()),
            ]
        );
    }

    #[test]
    fn radius_uses_track_centre() {
        let query = AirspaceQuery::for_track(&track(), 50000.0, vec![3]).unwrap();
        let params = query.params(4);
        assert!(params.contains(&("page", "4".to_string())));
        assert!(params.contains(&("pos", "45.25,6.25".to_string())));
        assert!(params.contains(&("dist", "50000".to_string())));
        assert!(params.contains(&("icaoClass", "3".to_string())));
        assert!(!params.iter().any(|(name, _)| *name == "bbox"));
    }

    #[test]
    fn empty_track_has_no_query() {
        assert!(AirspaceQuery::for_track(&Track::new(vec![]), 0.0, vec![]).is_none());
    }
}
