use diesel::{Insertable, Queryable, Selectable};
use std::fmt;

use crate::db::schema;

// Account models
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = schema::accounts)]
pub struct NewAccountRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub is_admin: bool,
    pub created_at: i64,
}

impl fmt::Display for AccountRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = if self.is_admin { " (admin)" } else { "" };
        write!(f, "#{} {} <{}>{}", self.id, self.username, self.email, role)
    }
}
