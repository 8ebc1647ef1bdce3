//! Database model types for Diesel ORM.
//!
//! Money is stored as decimal text and timestamps as fixed-width RFC 3339
//! text so both survive the round trip exactly and sort lexicographically.

use diesel::prelude::*;

use super::schema::{markets, stakes};

/// Database row for a market.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct MarketRow {
    pub id: String,
    pub question: String,
    pub yes_pool: String,
    pub no_pool: String,
    pub total_pool: String,
    pub status: String,
    pub created_at: String,
    pub expires_at: String,
    pub resolved_at: Option<String>,
    pub resolution_fee: Option<String>,
    pub payout_pool: Option<String>,
    pub stake_count: i64,
    pub version: i64,
    pub money_scale: i64,
}

/// Database row for a stake.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = stakes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StakeRow {
    pub id: String,
    pub market_id: String,
    pub user_id: String,
    pub sequence: i64,
    pub amount: String,
    pub position: String,
    pub odds: String,
    pub potential_win: String,
    pub status: String,
    pub placed_at: String,
}
