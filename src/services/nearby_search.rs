//! Nearby ranking over an in-memory candidate set.
//!
//! Candidates are scored with the Haversine great-circle distance from the
//! query point, records beyond the radius are dropped (the boundary itself is
//! inclusive), the rest are ordered by ascending distance and cut to `limit`.
//! Candidates at equal distance keep their input order.
//!
//! There is no index here: callers hand over the full candidate set and this
//! module scans it. Enrichment (reaction counts, image URLs) happens after
//! ranking and never influences the order.

use std::f64::consts::PI;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_LIMIT: i64 = 10;

/// Anything with a position in degrees.
pub trait Located {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl QueryPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub record: T,
    pub distance_km: f64,
}

fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Great-circle distance in km between two points given in degrees.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = deg_to_rad(lat1);
    let lat2_rad = deg_to_rad(lat2);
    let delta_lat = deg_to_rad(lat2 - lat1);
    let delta_lng = deg_to_rad(lng2 - lng1);

    let a = (delta_lat / 2.0).sin() * (delta_lat / 2.0).sin()
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin() * (delta_lng / 2.0).sin();
    // Rounding can push `a` just past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn nearby<T, I>(candidates: I, origin: QueryPoint, radius_km: f64, limit: i64) -> Vec<Ranked<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    if limit <= 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<T>> = candidates
        .into_iter()
        .filter_map(|record| {
            let distance_km = haversine_km(
                origin.latitude,
                origin.longitude,
                record.latitude(),
                record.longitude(),
            );
            (distance_km <= radius_km).then_some(Ranked {
                record,
                distance_km,
            })
        })
        .collect();

    // NaN distances never pass the radius check, so total_cmp agrees with `<`.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Spot {
        id: u32,
        lat: f64,
        lng: f64,
    }

    impl Located for Spot {
        fn latitude(&self) -> f64 {
            self.lat
        }

        fn longitude(&self) -> f64 {
            self.lng
        }
    }

    const ORIGIN_LAT: f64 = 31.19322644453637;
    const ORIGIN_LNG: f64 = 121.41182831455195;

    fn origin() -> QueryPoint {
        QueryPoint::new(ORIGIN_LAT, ORIGIN_LNG)
    }

    fn shanghai_spots() -> Vec<Spot> {
        [
            (31.1940, 121.4125),
            (31.1925, 121.4110),
            (31.1935, 121.4105),
            (31.1920, 121.4130),
            (31.1945, 121.4115),
            (31.1915, 121.4120),
            (31.1930, 121.4100),
            (31.1928, 121.4135),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lng))| Spot {
            id: i as u32 + 1,
            lat,
            lng,
        })
        .collect()
    }

    fn ids<T>(ranked: &[Ranked<T>], id: impl Fn(&T) -> u32) -> Vec<u32> {
        ranked.iter().map(|r| id(&r.record)).collect()
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(
            haversine_km(ORIGIN_LAT, ORIGIN_LNG, ORIGIN_LAT, ORIGIN_LNG),
            0.0
        );
        assert_eq!(haversine_km(-45.0, 170.0, -45.0, 170.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (ORIGIN_LAT, ORIGIN_LNG, 31.1940, 121.4125),
            (39.9042, 116.4074, 31.2304, 121.4737),
            (51.5074, -0.1278, 40.7128, -74.0060),
            (-33.8688, 151.2093, 35.6762, 139.6503),
        ];
        for (lat1, lng1, lat2, lng2) in pairs {
            assert_eq!(
                haversine_km(lat1, lng1, lat2, lng2),
                haversine_km(lat2, lng2, lat1, lng1)
            );
        }
    }

    #[test]
    fn known_city_distance() {
        // Beijing to Shanghai is roughly 1067 km along the great circle.
        let d = haversine_km(39.9042, 116.4074, 31.2304, 121.4737);
        assert!((d - 1067.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn fixture_candidate_is_close_and_included() {
        let d = haversine_km(ORIGIN_LAT, ORIGIN_LNG, 31.1940, 121.4125);
        assert!(d > 0.05 && d < 0.3, "got {d}");

        let result = nearby(shanghai_spots(), origin(), DEFAULT_RADIUS_KM, DEFAULT_LIMIT);
        assert!(result.iter().any(|r| r.record.id == 1));
    }

    #[test]
    fn all_fixtures_returned_in_ascending_order() {
        let result = nearby(shanghai_spots(), origin(), 5.0, 10);
        assert_eq!(result.len(), 8);
        assert!(result
            .windows(2)
            .all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(result.iter().all(|r| r.distance_km < 1.0));
    }

    #[test]
    fn limit_keeps_the_closest() {
        let all = nearby(shanghai_spots(), origin(), 5.0, 10);
        let top = nearby(shanghai_spots(), origin(), 5.0, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(ids(&top, |s| s.id), ids(&all[..3], |s| s.id));
    }

    #[test]
    fn non_positive_limit_is_empty() {
        assert!(nearby(shanghai_spots(), origin(), 5.0, 0).is_empty());
        assert!(nearby(shanghai_spots(), origin(), 5.0, -4).is_empty());
    }

    #[test]
    fn empty_candidates_is_empty() {
        let result = nearby(Vec::<Spot>::new(), origin(), 1000.0, 100);
        assert!(result.is_empty());
    }

    #[test]
    fn records_beyond_radius_are_dropped() {
        let mut spots = shanghai_spots();
        spots.push(Spot {
            id: 99,
            lat: 39.9042,
            lng: 116.4074,
        });

        let result = nearby(spots, origin(), 5.0, 100);
        assert_eq!(result.len(), 8);
        assert!(result.iter().all(|r| r.record.id != 99));
        assert!(result.iter().all(|r| r.distance_km <= 5.0));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let spot = Spot {
            id: 1,
            lat: 31.1940,
            lng: 121.4125,
        };
        let exact = haversine_km(ORIGIN_LAT, ORIGIN_LNG, spot.lat, spot.lng);

        assert_eq!(nearby(vec![spot.clone()], origin(), exact, 10).len(), 1);

        let below = f64::from_bits(exact.to_bits() - 1);
        assert!(nearby(vec![spot], origin(), below, 10).is_empty());
    }

    #[test]
    fn zero_radius_only_matches_the_origin() {
        let spots = vec![
            Spot {
                id: 1,
                lat: 31.1940,
                lng: 121.4125,
            },
            Spot {
                id: 2,
                lat: ORIGIN_LAT,
                lng: ORIGIN_LNG,
            },
        ];
        let result = nearby(spots, origin(), 0.0, 10);
        assert_eq!(ids(&result, |s| s.id), vec![2]);
    }

    #[test]
    fn nan_radius_matches_nothing() {
        assert!(nearby(shanghai_spots(), origin(), f64::NAN, 10).is_empty());
    }

    #[test]
    fn equal_distances_keep_input_order() {
        // Same point repeated, plus a nearer and a farther one around it.
        let spots = vec![
            Spot {
                id: 10,
                lat: 31.1930,
                lng: 121.4100,
            },
            Spot {
                id: 11,
                lat: 31.1940,
                lng: 121.4125,
            },
            Spot {
                id: 12,
                lat: 31.1930,
                lng: 121.4100,
            },
            Spot {
                id: 13,
                lat: ORIGIN_LAT,
                lng: ORIGIN_LNG,
            },
            Spot {
                id: 14,
                lat: 31.1930,
                lng: 121.4100,
            },
        ];
        let result = nearby(spots, origin(), 5.0, 10);
        let order = ids(&result, |s| s.id);

        assert_eq!(order[0], 13);
        let tied: Vec<u32> = order
            .into_iter()
            .filter(|id| [10, 12, 14].contains(id))
            .collect();
        assert_eq!(tied, vec![10, 12, 14]);
    }

    #[test]
    fn huge_limit_is_not_capped() {
        let result = nearby(shanghai_spots(), origin(), 5.0, i64::MAX);
        assert_eq!(result.len(), 8);
    }
}
