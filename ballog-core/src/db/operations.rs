use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::models::{AccountRow, NewAccountRow};
use crate::db::schema::accounts;

// Accounts
pub fn insert_account(conn: &mut SqliteConnection, new: &NewAccountRow) -> QueryResult<AccountRow> {
    conn.transaction(|conn| {
        diesel::insert_into(accounts::table)
            .values(new)
            .execute(conn)?;
        accounts::table
            .filter(accounts::username.eq(new.username))
            .select(AccountRow::as_select())
            .first(conn)
    })
}

pub fn find_account(
    conn: &mut SqliteConnection,
    username: &str,
) -> QueryResult<Option<AccountRow>> {
    accounts::table
        .filter(accounts::username.eq(username))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()
}

pub fn list_accounts(conn: &mut SqliteConnection) -> QueryResult<Vec<AccountRow>> {
    accounts::table
        .order(accounts::username.asc())
        .select(AccountRow::as_select())
        .load(conn)
}

pub fn delete_account(conn: &mut SqliteConnection, username: &str) -> QueryResult<usize> {
    diesel::delete(accounts::table.filter(accounts::username.eq(username))).execute(conn)
}

pub fn delete_all_accounts(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::delete(accounts::table).execute(conn)
}
