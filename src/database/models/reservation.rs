use crate::booking::slot::Slot;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

const RESERVATION_COLUMNS: &str = "id, date, slot, user_id, username, name, surname, phone, \
     payment_status, payment_method, payment_id, created_at, reminder_sent_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Cafe,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cafe => "cafe",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or user-supplied enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(UnknownVariant {
                kind: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(PaymentMethod::Online),
            "cafe" => Ok(PaymentMethod::Cafe),
            other => Err(UnknownVariant {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

/// A booked playroom slot and everything collected about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub date: NaiveDate,
    pub slot: Slot,
    pub user_id: i64,
    pub username: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub reminder_sent_at: Option<NaiveDateTime>,
}

/// Fields known at slot confirmation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub date: NaiveDate,
    pub slot: Slot,
    pub user_id: i64,
    pub username: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalDetails {
    pub name: String,
    pub surname: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub payment_id: Option<String>,
}

fn decode_column<T, E>(column: &str, raw: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> Result<T, sqlx::Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for Reservation {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let slot: String = row.try_get("slot")?;
        let payment_status: String = row.try_get("payment_status")?;
        let payment_method: Option<String> = row.try_get("payment_method")?;

        let payment_method = match payment_method {
            Some(raw) => Some(decode_column("payment_method", &raw, PaymentMethod::from_str)?),
            None => None,
        };

        Ok(Reservation {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            slot: decode_column("slot", &slot, Slot::from_str)?,
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            surname: row.try_get("surname")?,
            phone: row.try_get("phone")?,
            payment_status: decode_column("payment_status", &payment_status, PaymentStatus::from_str)?,
            payment_method,
            payment_id: row.try_get("payment_id")?,
            created_at: row.try_get("created_at")?,
            reminder_sent_at: row.try_get("reminder_sent_at")?,
        })
    }
}

impl Reservation {
    pub async fn create(pool: &sqlx::SqlitePool, new: &NewReservation) -> Result<Self, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (date, slot, user_id, username, payment_status, created_at)
            VALUES (?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(new.date)
        .bind(new.slot.to_string())
        .bind(new.user_id)
        .bind(&new.username)
        .bind(new.created_at)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Slots on `date` reserved by anyone.
    pub async fn booked_slots(pool: &sqlx::SqlitePool, date: NaiveDate) -> Result<Vec<Slot>, sqlx::Error> {
        let labels = sqlx::query_scalar::<_, String>("SELECT slot FROM reservations WHERE date = ?")
            .bind(date)
            .fetch_all(pool)
            .await?;

        labels
            .iter()
            .map(|label| decode_column("slot", label, Slot::from_str))
            .collect()
    }

    /// Only touches the row when it belongs to `user_id`.
    pub async fn update_details(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        id: i64,
        details: &PersonalDetails,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        sqlx::query("UPDATE reservations SET name = ?, surname = ?, phone = ? WHERE id = ? AND user_id = ?")
            .bind(&details.name)
            .bind(&details.surname)
            .bind(&details.phone)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await
    }

    pub async fn update_payment(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        id: i64,
        update: &PaymentUpdate,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        sqlx::query(
            "UPDATE reservations SET payment_status = ?, payment_method = ?, payment_id = ? WHERE id = ? AND user_id = ?",
        )
        .bind(update.status.as_str())
        .bind(update.method.as_str())
        .bind(&update.payment_id)
        .bind(id)
        .bind(user_id)
        .execute(pool)
            .await
    }

    /// A user's reservations on or after `from`, earliest first.
    pub async fn find_for_user_from(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        from: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = ? AND date >= ? ORDER BY date, slot"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .bind(from)
            .fetch_all(pool)
            .await
    }

    pub async fn find_for_user(pool: &sqlx::SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = ? ORDER BY date, slot");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete_for_user_slot(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        sqlx::query("DELETE FROM reservations WHERE user_id = ? AND date = ? AND slot = ?")
            .bind(user_id)
            .bind(date)
            .bind(slot.to_string())
            .execute(pool)
            .await
    }

    pub async fn delete_for_user(pool: &sqlx::SqlitePool, user_id: i64) -> Result<SqliteQueryResult, sqlx::Error> {
        sqlx::query("DELETE FROM reservations WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await
    }

    /// Reservations on any of `dates` that have not been reminded yet.
    pub async fn find_unreminded_on(pool: &sqlx::SqlitePool, dates: &[NaiveDate]) -> Result<Vec<Self>, sqlx::Error> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = dates.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reminder_sent_at IS NULL AND date IN ({placeholders}) ORDER BY date, slot"
        );

        let mut query_builder = sqlx::query_as::<_, Reservation>(&query);
        for date in dates {
            query_builder = query_builder.bind(*date);
        }

        query_builder.fetch_all(pool).await
    }

    pub async fn mark_reminded(
        pool: &sqlx::SqlitePool,
        id: i64,
        at: NaiveDateTime,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        sqlx::query("UPDATE reservations SET reminder_sent_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(pool)
            .await
    }

    /// Local start time of the reserved slot.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        self.date.and_hms_opt(u32::from(self.slot.hour()), 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_labels_round_trip_through_str() {
        for method in [PaymentMethod::Online, PaymentMethod::Cafe] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        for status in [PaymentStatus::Pending, PaymentStatus::Paid] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_payment_method_is_rejected() {
        let err = "card".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unknown payment method 'card'");
    }
}
