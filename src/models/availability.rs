use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// A counsellor-published bookable time interval. `Published -> Booked` is
/// one-way; there is no cancellation path.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub counsellor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BookOutcome {
    Booked,
    AlreadyBooked,
    NotFound,
}

impl Slot {
    /// One row per (startTime, endTime) pair. Overlapping or duplicate slots
    /// are accepted as published.
    pub async fn publish(pool: &SqlitePool, counsellor_id: &str, slots: &[NewSlot]) -> Result<usize> {
        for slot in slots {
            sqlx::query(
                r#"
                INSERT INTO availability_slots (id, counsellor_id, start_time, end_time, is_booked, created_at)
                VALUES (?, ?, ?, ?, 0, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(counsellor_id)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(Utc::now())
            .execute(pool)
            .await?;
        }
        Ok(slots.len())
    }

    /// Unbooked slots for a counsellor, start-time ascending, optionally
    /// windowed on start_time.
    pub async fn query(
        pool: &SqlitePool,
        counsellor_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Self>> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT * FROM availability_slots
            WHERE counsellor_id = ?
              AND is_booked = 0
              AND (? IS NULL OR start_time >= ?)
              AND (? IS NULL OR start_time <= ?)
            ORDER BY start_time ASC
            "#,
        )
        .bind(counsellor_id)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_all(pool)
        .await?;
        Ok(slots)
    }

    /// Single-statement compare-and-swap: the check and the flip happen in
    /// one UPDATE so two concurrent bookings cannot both win.
    pub async fn book(pool: &SqlitePool, slot_id: &str) -> Result<BookOutcome> {
        let result =
            sqlx::query("UPDATE availability_slots SET is_booked = 1 WHERE id = ? AND is_booked = 0")
                .bind(slot_id)
                .execute(pool)
                .await?;

        if result.rows_affected() == 1 {
            return Ok(BookOutcome::Booked);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM availability_slots WHERE id = ?)")
                .bind(slot_id)
                .fetch_one(pool)
                .await?;
        if exists {
            Ok(BookOutcome::AlreadyBooked)
        } else {
            Ok(BookOutcome::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BookOutcome, NewSlot, Slot};
    use crate::models::user::{hash_password, Role, User};
    use crate::MIGRATOR;
    use chrono::{Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, User) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        let hash = hash_password("password123").unwrap();
        let counsellor = User::create(&pool, "C", "c@gmail.com", "EMP-1", &hash, Role::Counsellor)
            .await
            .unwrap();
        (pool, counsellor)
    }

    fn slot_at(hours: i64) -> NewSlot {
        let start = Utc::now() + Duration::hours(hours);
        NewSlot {
            start_time: start,
            end_time: start + Duration::minutes(30),
        }
    }

    #[tokio::test]
    async fn query_skips_booked_and_out_of_window() {
        let (pool, counsellor) = setup().await;
        Slot::publish(&pool, &counsellor.id, &[slot_at(1), slot_at(2), slot_at(50)])
            .await
            .unwrap();

        let all = Slot::query(&pool, &counsellor.id, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].start_time <= w[1].start_time));

        assert_eq!(Slot::book(&pool, &all[0].id).await.unwrap(), BookOutcome::Booked);

        let unbooked = Slot::query(&pool, &counsellor.id, None, None).await.unwrap();
        assert_eq!(unbooked.len(), 2);
        assert!(unbooked.iter().all(|s| !s.is_booked && s.id != all[0].id));

        let windowed = Slot::query(
            &pool,
            &counsellor.id,
            Some(Utc::now()),
            Some(Utc::now() + Duration::hours(24)),
        )
        .await
        .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, all[1].id);
    }

    #[tokio::test]
    async fn booking_is_one_way() {
        let (pool, counsellor) = setup().await;
        Slot::publish(&pool, &counsellor.id, &[slot_at(1)]).await.unwrap();
        let slots = Slot::query(&pool, &counsellor.id, None, None).await.unwrap();

        assert_eq!(Slot::book(&pool, &slots[0].id).await.unwrap(), BookOutcome::Booked);
        assert_eq!(
            Slot::book(&pool, &slots[0].id).await.unwrap(),
            BookOutcome::AlreadyBooked
        );
        assert_eq!(
            Slot::book(&pool, "no-such-slot").await.unwrap(),
            BookOutcome::NotFound
        );
    }
}
