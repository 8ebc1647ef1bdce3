//! SQLite ledger store implementation.
//!
//! Every write runs inside an immediate transaction and is guarded by the
//! market row's version column, so a stale commit touches nothing.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{MarketRow, StakeRow};
use crate::adapter::outbound::sqlite::database::schema::{markets, stakes};
use crate::domain::{
    DomainError, Market, MarketId, MarketStatus, Side, Stake, StakeId, StakeStatus, UserId,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::LedgerStore;

/// SQLite-backed ledger store.
pub struct SqliteLedgerStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteLedgerStore {
    /// Create a new SQLite ledger store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    fn market_to_row(market: &Market) -> Result<MarketRow> {
        Ok(MarketRow {
            id: market.id().to_string(),
            question: market.question().to_string(),
            yes_pool: market.yes_pool().to_string(),
            no_pool: market.no_pool().to_string(),
            total_pool: market.total_pool().to_string(),
            status: market.status().as_str().to_string(),
            created_at: format_time(market.created_at()),
            expires_at: format_time(market.expires_at()),
            resolved_at: market.resolved_at().map(format_time),
            resolution_fee: market.resolution_fee().map(|d| d.to_string()),
            payout_pool: market.payout_pool().map(|d| d.to_string()),
            stake_count: to_i64(market.stake_count())?,
            version: to_i64(market.version())?,
            money_scale: i64::from(market.money_scale()),
        })
    }

    fn market_from_row(row: MarketRow) -> Result<Market> {
        let status = MarketStatus::from_str(&row.status).map_err(Error::Parse)?;
        Ok(Market::restore(
            MarketId::from(row.id),
            row.question,
            parse_decimal(&row.yes_pool)?,
            parse_decimal(&row.no_pool)?,
            parse_decimal(&row.total_pool)?,
            status,
            parse_time(&row.created_at)?,
            parse_time(&row.expires_at)?,
            row.resolved_at.as_deref().map(parse_time).transpose()?,
            row.resolution_fee
                .as_deref()
                .map(parse_decimal)
                .transpose()?,
            row.payout_pool.as_deref().map(parse_decimal).transpose()?,
            to_u64(row.stake_count)?,
            to_u64(row.version)?,
            u32::try_from(row.money_scale).map_err(|e| Error::Parse(e.to_string()))?,
        ))
    }

    fn stake_to_row(stake: &Stake) -> Result<StakeRow> {
        Ok(StakeRow {
            id: stake.id().to_string(),
            market_id: stake.market_id().to_string(),
            user_id: stake.user_id().to_string(),
            sequence: to_i64(stake.sequence())?,
            amount: stake.amount().to_string(),
            position: stake.position().as_str().to_string(),
            odds: stake.odds().to_string(),
            potential_win: stake.potential_win().to_string(),
            status: stake.status().as_str().to_string(),
            placed_at: format_time(stake.placed_at()),
        })
    }

    fn stake_from_row(row: StakeRow) -> Result<Stake> {
        let position = Side::from_str(&row.position)?;
        let status = StakeStatus::from_str(&row.status).map_err(Error::Parse)?;
        Ok(Stake::restore(
            StakeId::from(row.id),
            MarketId::from(row.market_id),
            UserId::from(row.user_id),
            to_u64(row.sequence)?,
            parse_decimal(&row.amount)?,
            position,
            parse_decimal(&row.odds)?,
            parse_decimal(&row.potential_win)?,
            status,
            parse_time(&row.placed_at)?,
        ))
    }

    /// Write the market row if its stored version still matches.
    fn update_market_versioned(
        conn: &mut SqliteConnection,
        row: &MarketRow,
        expected_version: i64,
    ) -> Result<()> {
        let updated = diesel::update(
            markets::table
                .filter(markets::id.eq(&row.id))
                .filter(markets::version.eq(expected_version)),
        )
        .set(row)
        .execute(conn)?;

        if updated == 0 {
            let exists: i64 = markets::table
                .filter(markets::id.eq(&row.id))
                .count()
                .get_result(conn)?;
            let market_id = MarketId::new(row.id.clone());
            return Err(if exists == 0 {
                DomainError::MarketNotFound { market_id }
            } else {
                DomainError::ConcurrencyConflict { market_id }
            }
            .into());
        }
        Ok(())
    }
}

impl LedgerStore for SqliteLedgerStore {
    async fn insert_market(&self, market: &Market) -> Result<()> {
        let row = Self::market_to_row(market)?;
        let mut conn = self.conn()?;

        match diesel::insert_into(markets::table)
            .values(&row)
            .execute(&mut conn)
        {
            Ok(_) => Ok(()),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(DomainError::MarketExists {
                    market_id: market.id().clone(),
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn market(&self, id: &MarketId) -> Result<Option<Market>> {
        let mut conn = self.conn()?;
        let row: Option<MarketRow> = markets::table
            .find(id.as_str())
            .select(MarketRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Self::market_from_row).transpose()
    }

    async fn markets(&self) -> Result<Vec<Market>> {
        let mut conn = self.conn()?;
        let rows: Vec<MarketRow> = markets::table
            .order((markets::created_at.asc(), markets::id.asc()))
            .select(MarketRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Self::market_from_row).collect()
    }

    async fn stakes_for_market(&self, id: &MarketId) -> Result<Vec<Stake>> {
        let mut conn = self.conn()?;
        let rows: Vec<StakeRow> = stakes::table
            .filter(stakes::market_id.eq(id.as_str()))
            .order(stakes::sequence.asc())
            .select(StakeRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Self::stake_from_row).collect()
    }

    async fn stakes_for_user(&self, id: &UserId) -> Result<Vec<Stake>> {
        let mut conn = self.conn()?;
        let rows: Vec<StakeRow> = stakes::table
            .filter(stakes::user_id.eq(id.as_str()))
            .order((stakes::placed_at.asc(), stakes::sequence.asc()))
            .select(StakeRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Self::stake_from_row).collect()
    }

    async fn record_stake(
        &self,
        market: &Market,
        expected_version: u64,
        stake: &Stake,
    ) -> Result<()> {
        let market_row = Self::market_to_row(market)?;
        let stake_row = Self::stake_to_row(stake)?;
        let expected = to_i64(expected_version)?;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            Self::update_market_versioned(conn, &market_row, expected)?;
            diesel::insert_into(stakes::table)
                .values(&stake_row)
                .execute(conn)?;
            Ok(())
        })
    }

    async fn record_settlement(
        &self,
        market: &Market,
        expected_version: u64,
        settled: &[Stake],
    ) -> Result<()> {
        let market_row = Self::market_to_row(market)?;
        let stake_rows = settled
            .iter()
            .map(Self::stake_to_row)
            .collect::<Result<Vec<_>>>()?;
        let expected = to_i64(expected_version)?;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            Self::update_market_versioned(conn, &market_row, expected)?;
            for row in &stake_rows {
                let updated = diesel::update(
                    stakes::table
                        .filter(stakes::id.eq(&row.id))
                        .filter(stakes::market_id.eq(&row.market_id))
                        .filter(stakes::status.eq(StakeStatus::Active.as_str())),
                )
                .set((
                    stakes::status.eq(&row.status),
                    stakes::potential_win.eq(&row.potential_win),
                ))
                .execute(conn)?;

                if updated == 0 {
                    return Err(DomainError::StakeNotFound {
                        stake_id: StakeId::from(row.id.clone()),
                    }
                    .into());
                }
            }
            Ok(())
        })
    }
}

/// Fixed-width UTC timestamps keep text ordering equal to time ordering.
fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| Error::Parse(e.to_string()))?
        .with_timezone(&Utc))
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| Error::Parse(e.to_string()))
}

fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|e| Error::Parse(e.to_string()))
}

fn to_u64(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|e| Error::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn setup_store() -> SqliteLedgerStore {
        SqliteLedgerStore::new(open(":memory:").expect("Failed to open database"))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::nanoseconds(123_456_789)
    }

    fn market(id: &str) -> Market {
        Market::open(MarketId::new(id), "Will it rain?", now() + Duration::hours(1), now()).unwrap()
    }

    fn stake_on(market: &mut Market, user: &str, side: Side, amount: Decimal) -> Stake {
        let sequence = market.add_stake(side, amount).unwrap();
        Stake::new(
            StakeId::new(),
            market.id().clone(),
            UserId::new(user),
            sequence,
            amount,
            side,
            dec!(1.5),
            amount * dec!(1.5),
            now() + Duration::seconds(i64::try_from(sequence).unwrap()),
        )
    }

    #[tokio::test]
    async fn market_roundtrip_is_exact() {
        let store = setup_store();
        let m = market("rain");
        store.insert_market(&m).await.unwrap();

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded, m);
        assert!(store.market(&MarketId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn market_keeps_its_money_scale() {
        let store = setup_store();
        let m = market("cents").with_money_scale(2);
        store.insert_market(&m).await.unwrap();

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded.money_scale(), 2);
    }

    #[tokio::test]
    async fn duplicate_market_is_rejected() {
        let store = setup_store();
        store.insert_market(&market("rain")).await.unwrap();
        let err = store.insert_market(&market("rain")).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::MarketExists { .. })
        ));
    }

    #[tokio::test]
    async fn record_stake_persists_market_and_stake() {
        let store = setup_store();
        let mut m = market("rain");
        store.insert_market(&m).await.unwrap();

        let first = stake_on(&mut m, "alice", Side::Yes, dec!(100));
        store.record_stake(&m, 0, &first).await.unwrap();
        let second = stake_on(&mut m, "bob", Side::No, dec!(0.000001));
        store.record_stake(&m, 1, &second).await.unwrap();

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded, m);
        assert_eq!(loaded.total_pool(), dec!(100.000001));

        let stakes = store.stakes_for_market(m.id()).await.unwrap();
        assert_eq!(stakes, vec![first.clone(), second]);
        assert_eq!(
            store.stakes_for_user(&UserId::new("alice")).await.unwrap(),
            vec![first]
        );
    }

    #[tokio::test]
    async fn stale_version_rolls_back() {
        let store = setup_store();
        let mut m = market("rain");
        store.insert_market(&m).await.unwrap();

        let first = stake_on(&mut m, "alice", Side::Yes, dec!(10));
        store.record_stake(&m, 0, &first).await.unwrap();

        let mut stale = market("rain");
        let second = stake_on(&mut stale, "bob", Side::No, dec!(10));
        let err = store.record_stake(&stale, 0, &second).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::ConcurrencyConflict { .. })
        ));

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded.total_pool(), dec!(10));
        assert_eq!(store.stakes_for_market(m.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_market_cannot_take_stakes() {
        let store = setup_store();
        let mut m = market("ghost");
        let stake = stake_on(&mut m, "alice", Side::Yes, dec!(1));
        let err = store.record_stake(&m, 0, &stake).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::MarketNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn settlement_updates_every_stake() {
        let store = setup_store();
        let mut m = market("rain");
        store.insert_market(&m).await.unwrap();
        let mut yes = stake_on(&mut m, "alice", Side::Yes, dec!(10));
        store.record_stake(&m, 0, &yes).await.unwrap();
        let mut no = stake_on(&mut m, "bob", Side::No, dec!(10));
        store.record_stake(&m, 1, &no).await.unwrap();

        let expected = m.version();
        let resolved_at = m.expires_at();
        m.resolve(Side::Yes, resolved_at, dec!(0.4), dec!(20)).unwrap();
        yes.settle_won(dec!(20));
        no.settle_lost();
        store
            .record_settlement(&m, expected, &[yes.clone(), no.clone()])
            .await
            .unwrap();

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded.status(), MarketStatus::ResolvedYes);
        assert_eq!(loaded.resolution_fee(), Some(dec!(0.4)));
        assert_eq!(
            store.stakes_for_market(m.id()).await.unwrap(),
            vec![yes, no]
        );
    }

    #[tokio::test]
    async fn settling_a_settled_stake_fails_atomically() {
        let store = setup_store();
        let mut m = market("rain");
        store.insert_market(&m).await.unwrap();
        let mut yes = stake_on(&mut m, "alice", Side::Yes, dec!(10));
        store.record_stake(&m, 0, &yes).await.unwrap();

        let expected = m.version();
        let mut replay = m.clone();
        let resolved_at = m.expires_at();
        m.resolve(Side::Yes, resolved_at, dec!(0.2), dec!(10)).unwrap();
        yes.settle_won(dec!(10));
        store
            .record_settlement(&m, expected, std::slice::from_ref(&yes))
            .await
            .unwrap();

        // A commit carrying the current version that tries to settle again.
        replay.resolve(Side::No, resolved_at, dec!(0.2), dec!(0)).unwrap();
        let err = store
            .record_settlement(&replay, m.version(), &[yes])
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::StakeNotFound { .. })
        ));

        let loaded = store.market(m.id()).await.unwrap().unwrap();
        assert_eq!(loaded.status(), MarketStatus::ResolvedYes);
    }

    #[tokio::test]
    async fn markets_are_listed_in_creation_order() {
        let store = setup_store();
        let later = Market::open(
            MarketId::new("a-later"),
            "Later?",
            now() + Duration::hours(3),
            now() + Duration::hours(1),
        )
        .unwrap();
        store.insert_market(&later).await.unwrap();
        store.insert_market(&market("b-earlier")).await.unwrap();

        let ids: Vec<String> = store
            .markets()
            .await
            .unwrap()
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b-earlier", "a-later"]);
    }

    #[test]
    fn timestamps_sort_as_text() {
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let late = early + Duration::nanoseconds(1);
        assert!(format_time(early) < format_time(late));
        assert_eq!(parse_time(&format_time(late)).unwrap(), late);
    }
}
