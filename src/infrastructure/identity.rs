use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::IdentityLookup;
use crate::schema::users;

/// Identity port backed by the colocated `users` table.
pub struct DieselIdentityLookup {
    pool: DbPool,
}

impl DieselIdentityLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl IdentityLookup for DieselIdentityLookup {
    fn user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;

        let id = users::table
            .filter(users::username.eq(username))
            .select(users::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(id)
    }

    fn username(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
        let mut conn = self.pool.get()?;

        let name = users::table
            .filter(users::id.eq(user_id))
            .select(users::username)
            .first::<String>(&mut conn)
            .optional()?;

        Ok(name)
    }
}
