use diesel::{prelude::*, sqlite::SqliteConnection};

use crate::{
    app::AppError,
    schema::{self, users},
};

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// PHC string produced by [`crate::auth::password::hash`]
    pub password_hash: String,
    pub name: String,
    pub is_admin: bool,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct UserInsert<'a> {
    email: &'a str,
    password_hash: &'a str,
    name: &'a str,
    is_admin: bool,
}

impl User {
    /// Pushes a new user in the database and returns the stored row.
    /// An email that is already registered fails with [`AppError::Conflict`],
    /// even when two registrations race past the lookup in the service.
    ///
    /// # Example
    /// ```
    /// let user = User::new(
    ///     &mut conn,
    ///     "alice@example.com",
    ///     &password::hash("secret")?,
    ///     "Alice",
    ///     false)?;
    /// ```
    pub fn new(
        conn: &mut SqliteConnection,
        email: &str,
        password_hash: &str,
        name: &str,
        admin: bool,
    ) -> Result<User, AppError> {
        let to_insert = UserInsert {
            email,
            password_hash,
            name,
            is_admin: admin,
        };

        let user = diesel::insert_into(schema::users::table)
            .values(&to_insert)
            .get_result(conn)?;

        Ok(user)
    }

    /** Returns the user with the id specified */
    pub fn find_by_id(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, AppError> {
        use crate::schema::users::dsl::*;

        Ok(users.find(user_id).first::<User>(conn).optional()?)
    }

    /// Returns the user registered with the email specified, `None` if there
    /// is no such account.
    pub fn find_by_email(conn: &mut SqliteConnection, address: &str) -> Result<Option<User>, AppError> {
        use crate::schema::users::dsl::*;

        Ok(users
            .filter(email.eq(address))
            .first::<User>(conn)
            .optional()?)
    }

    /// Lists users ordered by id, restricted to admins or non-admins when
    /// `admin` is given.
    pub fn list(conn: &mut SqliteConnection, admin: Option<bool>) -> Result<Vec<User>, AppError> {
        use crate::schema::users::dsl::*;

        let mut query = users.order(id.asc()).into_boxed();
        if let Some(flag) = admin {
            query = query.filter(is_admin.eq(flag));
        }

        Ok(query.load::<User>(conn)?)
    }

    /** Sets the admin flag, fails with NotFound when the user is gone */
    pub fn set_admin(conn: &mut SqliteConnection, user_id: i32, flag: bool) -> Result<User, AppError> {
        use crate::schema::users::dsl::*;

        Ok(diesel::update(users.find(user_id))
            .set(is_admin.eq(flag))
            .get_result(conn)?)
    }

    /** Deletes an user together with their comments. Users that authored posts are kept. */
    pub fn delete(conn: &mut SqliteConnection, user_id: i32) -> Result<(), AppError> {
        conn.transaction::<_, AppError, _>(|conn| {
            if super::post::BlogPost::count_by_author(conn, user_id)? > 0 {
                return Err(AppError::Conflict(
                    "user has authored posts and cannot be removed".to_string(),
                ));
            }
            super::comment::Comment::delete_by_author(conn, user_id)?;

            let deleted = diesel::delete(schema::users::table.find(user_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            Ok(())
        })
    }
}
