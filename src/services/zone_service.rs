use sqlx::PgPool;
use tracing::info;

use crate::dto::zone_dto::ZonePayload;
use crate::error::{is_foreign_key_violation, Error, Result};
use crate::models::client::Client;
use crate::models::zone::Zone;

const ZONE_COLUMNS: &str = "id, name, email, latitude, longitude";

/// Distinct (name, email) groups of a submission, in first-appearance order.
pub fn replacement_groups(entries: &[ZonePayload]) -> Vec<(&str, &str)> {
    let mut groups: Vec<(&str, &str)> = Vec::new();
    for entry in entries {
        let key = (entry.name.as_str(), entry.email.as_str());
        if !groups.contains(&key) {
            groups.push(key);
        }
    }
    groups
}

fn unique_import_ids(import_ids: &[i32]) -> Vec<i32> {
    let mut ids = import_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn map_zone_write_error(err: sqlx::Error) -> Error {
    if is_foreign_key_violation(&err) {
        Error::BadRequest("Zone email does not belong to a registered user".into())
    } else {
        err.into()
    }
}

#[derive(Clone)]
pub struct ZoneService {
    pool: PgPool,
}

impl ZoneService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replaces every (name, email) group present in `entries` with the submitted points.
    ///
    /// Each group's previous rows are deleted and the new rows inserted inside one
    /// transaction, so readers see either the old set or the new one. The
    /// salesperson rows are locked first, which also serializes concurrent
    /// submissions for the same owner and rejects unknown emails before anything
    /// is deleted.
    pub async fn assign(&self, entries: &[ZonePayload]) -> Result<Vec<Zone>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let groups = replacement_groups(entries);

        let mut owners: Vec<&str> = groups.iter().map(|(_, email)| *email).collect();
        owners.sort_unstable();
        owners.dedup();

        let mut tx = self.pool.begin().await?;

        for email in &owners {
            let locked: Option<i32> =
                sqlx::query_scalar("SELECT id FROM users WHERE email = $1 FOR UPDATE")
                    .bind(*email)
                    .fetch_optional(&mut *tx)
                    .await?;
            if locked.is_none() {
                return Err(Error::BadRequest(format!(
                    "Unknown salesperson email: {}",
                    email
                )));
            }
        }

        for (name, email) in &groups {
            let removed = sqlx::query("DELETE FROM zones WHERE name = $1 AND email = $2")
                .bind(*name)
                .bind(*email)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            info!(zone = %name, salesperson = %email, removed, "replacing zone assignments");
        }

        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            let zone = sqlx::query_as::<_, Zone>(&format!(
                "INSERT INTO zones (name, email, latitude, longitude)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {}",
                ZONE_COLUMNS
            ))
            .bind(&entry.name)
            .bind(&entry.email)
            .bind(entry.latitude)
            .bind(entry.longitude)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_zone_write_error)?;
            created.push(zone);
        }

        tx.commit().await?;
        info!(
            groups = groups.len(),
            zones = created.len(),
            "zone assignments stored"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Zone>> {
        let zone = sqlx::query_as::<_, Zone>(&format!(
            "SELECT {} FROM zones WHERE id = $1",
            ZONE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(zone)
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Zone>> {
        let zones = sqlx::query_as::<_, Zone>(&format!(
            "SELECT {} FROM zones ORDER BY id LIMIT $1 OFFSET $2",
            ZONE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(zones)
    }

    pub async fn list_by_owner(&self, email: &str) -> Result<Vec<Zone>> {
        let zones = sqlx::query_as::<_, Zone>(&format!(
            "SELECT {} FROM zones WHERE email = $1 ORDER BY id",
            ZONE_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(zones)
    }

    /// Overwrites all mutable fields; `None` when the zone does not exist.
    pub async fn update(&self, id: i32, payload: &ZonePayload) -> Result<Option<Zone>> {
        let zone = sqlx::query_as::<_, Zone>(&format!(
            "UPDATE zones
             SET name = $2, email = $3, latitude = $4, longitude = $5
             WHERE id = $1
             RETURNING {}",
            ZONE_COLUMNS
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_zone_write_error)?;
        Ok(zone)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_group(&self, name: &str, email: &str) -> Result<u64> {
        let res = sqlx::query("DELETE FROM zones WHERE name = $1 AND email = $2")
            .bind(name)
            .bind(email)
            .execute(&self.pool)
            .await?;
        info!(zone = %name, salesperson = %email, removed = res.rows_affected(), "zone group deleted");
        Ok(res.rows_affected())
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let res = sqlx::query("DELETE FROM zones").execute(&self.pool).await?;
        info!(removed = res.rows_affected(), "all zones deleted");
        Ok(res.rows_affected())
    }

    /// Number of clients across the given imports. Duplicate or unknown ids add nothing.
    pub async fn total_clients(&self, import_ids: &[i32]) -> Result<i64> {
        let ids = unique_import_ids(import_ids);
        if ids.is_empty() {
            return Ok(0);
        }
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE import_file_id = ANY($1)")
                .bind(&ids)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// Union of the clients of the given imports. Clients sharing a `client_id`
    /// across imports are all returned.
    pub async fn clients(&self, import_ids: &[i32]) -> Result<Vec<Client>> {
        let ids = unique_import_ids(import_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, client_id, nom, prenom, telephone, reseaux_social, latitude, longitude, import_file_id
             FROM clients
             WHERE import_file_id = ANY($1)
             ORDER BY import_file_id, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, email: &str, lat: f64, lon: f64) -> ZonePayload {
        ZonePayload {
            name: name.into(),
            email: email.into(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let entries = vec![
            entry("Zone 2", "b@x.com", 1.0, 1.0),
            entry("Zone 1", "a@x.com", 2.0, 2.0),
            entry("Zone 2", "b@x.com", 3.0, 3.0),
            entry("Zone 1", "b@x.com", 4.0, 4.0),
        ];
        assert_eq!(
            replacement_groups(&entries),
            vec![
                ("Zone 2", "b@x.com"),
                ("Zone 1", "a@x.com"),
                ("Zone 1", "b@x.com"),
            ]
        );
    }

    #[test]
    fn groups_of_empty_submission() {
        assert!(replacement_groups(&[]).is_empty());
    }

    #[test]
    fn import_ids_are_treated_as_a_set() {
        assert_eq!(unique_import_ids(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }
}
