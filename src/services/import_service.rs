use csv::{ReaderBuilder, StringRecord, Trim};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};

use crate::error::{is_unique_violation, Error, Result};
use crate::models::client::{Client, NewClient};
use crate::models::import_file::{ImportFile, ImportFileSummary};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "nom",
    "prenom",
    "telephone",
    "reseaux_social",
    "latitude",
    "longitude",
];

// Postgres caps a statement at 65535 bind parameters; each client row binds 8.
const INSERT_CHUNK: usize = 1000;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Matches `import_files.filename VARCHAR(255)`.
pub const MAX_FILENAME_CHARS: usize = 255;

/// Clients accepted from an upload, plus the number of data rows presented.
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    pub clients: Vec<NewClient>,
    pub total_rows: usize,
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub import_file: ImportFile,
    pub accepted_rows: usize,
    pub total_rows: usize,
}

struct ColumnIndex {
    id: usize,
    nom: usize,
    prenom: usize,
    telephone: usize,
    reseaux_social: usize,
    latitude: usize,
    longitude: usize,
}

/// Parses CSV bytes into client rows.
///
/// Fails with `SchemaMismatch` when a required column is absent from the
/// header. Rows that cannot be coerced are skipped and only counted.
pub fn parse_clients(data: &[u8]) -> Result<ParsedBatch> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| Error::BadRequest(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut clients = Vec::new();
    let mut total_rows = 0;
    for (idx, record) in reader.records().enumerate() {
        total_rows += 1;
        // +2: one for the header line, one for 1-based numbering.
        let line = idx + 2;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(|record| parse_row(&record, &columns));
        match parsed {
            Ok(client) => clients.push(client),
            Err(reason) => warn!(line, reason = %reason, "skipping malformed client row"),
        }
    }

    Ok(ParsedBatch {
        clients,
        total_rows,
    })
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndex> {
    let position = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| position(**name).is_none())
        .map(|name| name.to_string())
        .collect();

    match (
        position("id"),
        position("nom"),
        position("prenom"),
        position("telephone"),
        position("reseaux_social"),
        position("latitude"),
        position("longitude"),
    ) {
        (
            Some(id),
            Some(nom),
            Some(prenom),
            Some(telephone),
            Some(reseaux_social),
            Some(latitude),
            Some(longitude),
        ) => Ok(ColumnIndex {
            id,
            nom,
            prenom,
            telephone,
            reseaux_social,
            latitude,
            longitude,
        }),
        _ => Err(Error::SchemaMismatch(missing)),
    }
}

fn parse_row(record: &StringRecord, columns: &ColumnIndex) -> std::result::Result<NewClient, String> {
    Ok(NewClient {
        client_id: parse_client_id(field(record, columns.id, "id")?)?,
        nom: text(record, columns.nom, "nom", 100)?,
        prenom: text(record, columns.prenom, "prenom", 100)?,
        telephone: text(record, columns.telephone, "telephone", 50)?,
        reseaux_social: text(record, columns.reseaux_social, "reseaux_social", 255)?,
        latitude: coordinate(field(record, columns.latitude, "latitude")?, "latitude", 90.0)?,
        longitude: coordinate(
            field(record, columns.longitude, "longitude")?,
            "longitude",
            180.0,
        )?,
    })
}

fn field<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &str,
) -> std::result::Result<&'a str, String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing value for '{}'", name)),
    }
}

fn text(
    record: &StringRecord,
    idx: usize,
    name: &str,
    max_chars: usize,
) -> std::result::Result<String, String> {
    let value = field(record, idx, name)?;
    if value.chars().count() > max_chars {
        return Err(format!("'{}' longer than {} characters", name, max_chars));
    }
    Ok(value.to_string())
}

// Spreadsheet exports often write integer ids as "12.0".
fn parse_client_id(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15)
        .map(|v| v as i64)
        .ok_or_else(|| format!("id '{}' is not an integer", raw))
}

fn coordinate(raw: &str, name: &str, bound: f64) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{} '{}' is not a number", name, raw))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(format!("{} {} out of range", name, value));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
}

impl ImportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores one batch and its accepted rows in a single transaction.
    pub async fn import_batch(&self, filename: &str, data: &[u8]) -> Result<ImportOutcome> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(Error::BadRequest("Uploaded file has no filename".into()));
        }
        if filename.chars().count() > MAX_FILENAME_CHARS {
            return Err(Error::BadRequest(format!(
                "Filename is longer than {} characters",
                MAX_FILENAME_CHARS
            )));
        }

        let parsed = parse_clients(data)?;
        info!(
            filename = %filename,
            accepted = parsed.clients.len(),
            total = parsed.total_rows,
            "parsed client upload"
        );

        let mut tx = self.pool.begin().await?;

        let import_file = sqlx::query_as::<_, ImportFile>(
            "INSERT INTO import_files (filename) VALUES ($1)
             RETURNING id, filename, import_date",
        )
        .bind(filename)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!("Import file '{}' already exists", filename))
            } else {
                e.into()
            }
        })?;

        for chunk in parsed.clients.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO clients (client_id, nom, prenom, telephone, reseaux_social, latitude, longitude, import_file_id) ",
            );
            builder.push_values(chunk, |mut row, client| {
                row.push_bind(client.client_id)
                    .push_bind(client.nom.clone())
                    .push_bind(client.prenom.clone())
                    .push_bind(client.telephone.clone())
                    .push_bind(client.reseaux_social.clone())
                    .push_bind(client.latitude)
                    .push_bind(client.longitude)
                    .push_bind(import_file.id);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        if parsed.clients.is_empty() {
            warn!(import_id = import_file.id, "import stored with no valid client rows");
        }
        info!(
            import_id = import_file.id,
            clients = parsed.clients.len(),
            "import stored"
        );

        Ok(ImportOutcome {
            import_file,
            accepted_rows: parsed.clients.len(),
            total_rows: parsed.total_rows,
        })
    }

    pub async fn list_batches(&self) -> Result<Vec<ImportFileSummary>> {
        let items = sqlx::query_as::<_, ImportFileSummary>(
            "SELECT f.id, f.filename, f.import_date, COUNT(c.id) AS client_count
             FROM import_files f
             LEFT JOIN clients c ON c.import_file_id = f.id
             GROUP BY f.id, f.filename, f.import_date
             ORDER BY f.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_batch(&self, id: i32) -> Result<(ImportFileSummary, Vec<Client>)> {
        let summary = sqlx::query_as::<_, ImportFileSummary>(
            "SELECT f.id, f.filename, f.import_date,
                    (SELECT COUNT(*) FROM clients c WHERE c.import_file_id = f.id) AS client_count
             FROM import_files f
             WHERE f.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Import {} not found", id)))?;

        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, client_id, nom, prenom, telephone, reseaux_social, latitude, longitude, import_file_id
             FROM clients
             WHERE import_file_id = $1
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok((summary, clients))
    }

    /// Returns false when no batch has this id. Clients go with it (ON DELETE CASCADE).
    pub async fn delete_batch(&self, id: i32) -> Result<bool> {
        let res = sqlx::query("DELETE FROM import_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = res.rows_affected() > 0;
        if deleted {
            info!(import_id = id, "import deleted");
        }
        Ok(deleted)
    }
}
