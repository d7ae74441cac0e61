use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::{self, trash_can_repo};
use crate::services::image_service;
use crate::services::nearby_search::{haversine_km, QueryPoint};

/// Reference point the fixtures are scattered around (central Shanghai).
pub const SEED_ORIGIN: QueryPoint = QueryPoint {
    latitude: 31.19322644453637,
    longitude: 121.41182831455195,
};

pub struct SeedFixture {
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'static str,
    pub description: &'static str,
}

pub const SEED_FIXTURES: [SeedFixture; 8] = [
    SeedFixture {
        latitude: 31.1940,
        longitude: 121.4125,
        address: "Nanjing East Road pedestrian street, entrance",
        description: "Shopping district, heavy foot traffic",
    },
    SeedFixture {
        latitude: 31.1925,
        longitude: 121.4110,
        address: "People's Square metro station exit",
        description: "Next to the metro exit",
    },
    SeedFixture {
        latitude: 31.1935,
        longitude: 121.4105,
        address: "The Bund viewing platform",
        description: "Tourist spot",
    },
    SeedFixture {
        latitude: 31.1920,
        longitude: 121.4130,
        address: "Yuyuan Bazaar",
        description: "Shopping district",
    },
    SeedFixture {
        latitude: 31.1945,
        longitude: 121.4115,
        address: "Nanjing Road pedestrian street, middle section",
        description: "Pedestrian street",
    },
    SeedFixture {
        latitude: 31.1915,
        longitude: 121.4120,
        address: "Near the City God Temple",
        description: "Scenic area",
    },
    SeedFixture {
        latitude: 31.1930,
        longitude: 121.4100,
        address: "Near the Bund",
        description: "Tourist area",
    },
    SeedFixture {
        latitude: 31.1928,
        longitude: 121.4135,
        address: "People's Square",
        description: "Public square",
    },
];

#[derive(Debug, Default)]
pub struct SeedReport {
    pub cleared: u64,
    pub images_removed: usize,
    pub inserted: Vec<SeededTrashCan>,
    pub failed: usize,
}

#[derive(Debug)]
pub struct SeededTrashCan {
    pub id: i64,
    pub address: &'static str,
    pub distance_km: f64,
}

/// Replaces every trash can with the fixture set and deletes the cleared rows'
/// image files. Fixtures have no owner and no image.
pub async fn seed_trash_cans(pool: &SqlitePool) -> sqlx::Result<SeedReport> {
    let cleared = trash_can_repo::delete_all_trash_cans(pool).await?;
    let mut report = SeedReport {
        cleared: cleared.rows,
        ..Default::default()
    };
    for image_path in &cleared.image_paths {
        if image_service::remove_image(image_path).await {
            report.images_removed += 1;
        }
    }
    info!(
        "🗑️ Cleared {} existing trash cans and {} images",
        report.cleared, report.images_removed
    );

    let now = database::now_timestamp();
    for fixture in &SEED_FIXTURES {
        let inserted = trash_can_repo::insert_trash_can(
            pool,
            trash_can_repo::NewTrashCan {
                user_id: None,
                latitude: fixture.latitude,
                longitude: fixture.longitude,
                address: fixture.address,
                description: fixture.description,
                image_path: "",
                created_at: &now,
            },
        )
        .await;

        match inserted {
            Ok(id) => report.inserted.push(SeededTrashCan {
                id,
                address: fixture.address,
                distance_km: haversine_km(
                    SEED_ORIGIN.latitude,
                    SEED_ORIGIN.longitude,
                    fixture.latitude,
                    fixture.longitude,
                ),
            }),
            Err(e) => {
                warn!("Failed to insert fixture {}: {}", fixture.address, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_sit_within_the_default_radius() {
        for fixture in &SEED_FIXTURES {
            let d = haversine_km(
                SEED_ORIGIN.latitude,
                SEED_ORIGIN.longitude,
                fixture.latitude,
                fixture.longitude,
            );
            assert!(d < 0.5, "{} is {d} km away", fixture.address);
        }
    }
}
