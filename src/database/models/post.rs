use diesel::{prelude::*, sqlite::SqliteConnection};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    schema::{self, blog_posts, users},
};

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = blog_posts)]
pub struct BlogPost {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub subtitle: String,
    /// Creation day, `"October 19, 2026"`; never touched by edits
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// The fields an admin fills in when writing or editing a post.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, AsChangeset)]
#[diesel(table_name = blog_posts)]
pub struct PostFields {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

#[derive(Insertable)]
#[diesel(table_name = blog_posts)]
struct BlogPostInsert<'a> {
    author_id: i32,
    title: &'a str,
    subtitle: &'a str,
    date: &'a str,
    body: &'a str,
    img_url: &'a str,
}

impl BlogPost {
    /// Stores a new post. A taken title fails with [`AppError::Conflict`],
    /// an unknown author with [`AppError::InvalidReference`].
    pub fn new(
        conn: &mut SqliteConnection,
        author: i32,
        fields: &PostFields,
        created_on: &str,
    ) -> Result<BlogPost, AppError> {
        let to_insert = BlogPostInsert {
            author_id: author,
            title: &fields.title,
            subtitle: &fields.subtitle,
            date: created_on,
            body: &fields.body,
            img_url: &fields.img_url,
        };

        Ok(diesel::insert_into(schema::blog_posts::table)
            .values(&to_insert)
            .get_result(conn)?)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, post_id: i32) -> Result<Option<BlogPost>, AppError> {
        use crate::schema::blog_posts::dsl::*;

        Ok(blog_posts.find(post_id).first::<BlogPost>(conn).optional()?)
    }

    /// Returns the post with the name of its author
    pub fn find_with_author(
        conn: &mut SqliteConnection,
        post_id: i32,
    ) -> Result<Option<(BlogPost, String)>, AppError> {
        Ok(blog_posts::table
            .inner_join(users::table)
            .filter(blog_posts::id.eq(post_id))
            .select((blog_posts::all_columns, users::name))
            .first::<(BlogPost, String)>(conn)
            .optional()?)
    }

    /// Returns every post in ascending id order, each with its author's name
    pub fn list_with_authors(conn: &mut SqliteConnection) -> Result<Vec<(BlogPost, String)>, AppError> {
        Ok(blog_posts::table
            .inner_join(users::table)
            .order(blog_posts::id.asc())
            .select((blog_posts::all_columns, users::name))
            .load::<(BlogPost, String)>(conn)?)
    }

    pub fn count_by_author(conn: &mut SqliteConnection, author: i32) -> Result<i64, AppError> {
        use crate::schema::blog_posts::dsl::*;

        Ok(blog_posts
            .filter(author_id.eq(author))
            .count()
            .get_result(conn)?)
    }

    /// Overwrites title, subtitle, body and image; id, author and date stay.
    pub fn update(conn: &mut SqliteConnection, post_id: i32, fields: &PostFields) -> Result<BlogPost, AppError> {
        use crate::schema::blog_posts::dsl::*;

        Ok(diesel::update(blog_posts.find(post_id))
            .set(fields)
            .get_result(conn)?)
    }

    /** Deletes a post and every comment posted on it */
    pub fn delete(conn: &mut SqliteConnection, post_id: i32) -> Result<(), AppError> {
        conn.transaction::<_, AppError, _>(|conn| {
            super::comment::Comment::delete_by_post(conn, post_id)?;

            let deleted = diesel::delete(schema::blog_posts::table.find(post_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        db_utils::in_memory_db,
        models::{comment::Comment, fixtures},
    };

    #[test]
    fn test_post_create_and_list_in_id_order() {
        let pool = in_memory_db().unwrap();
        let mut conn = pool.get().unwrap();
        let author = fixtures::user(&mut conn, "author@example.com");

        let second_title = fixtures::post(&mut conn, &author, "B comes first by id");
        let first_title = fixtures::post(&mut conn, &author, "A comes second by id");

        let listed = BlogPost::list_with_authors(&mut conn).unwrap();
        pretty_assertions::assert_eq!(
            listed.iter().map(|(post, _)| post.id).collect::<Vec<_>>(),
            vec![second_title.id, first_title.id]
        );
        pretty_assertions::assert_eq!(listed[0].1, "Test user");
    }

    #[test]
    fn test_duplicate_title_is_conflict() {
        let pool = in_memory_db().unwrap();
        let mut conn = pool.get().unwrap();
        let author = fixtures::user(&mut conn, "author@example.com");

        fixtures::post(&mut conn, &author, "Same title");
        let again = BlogPost::new(&mut conn, author.id, &fixtures::fields("Same title"), "October 20, 2026");

        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_unknown_author_is_invalid_reference() {
        let pool = in_memory_db().unwrap();
        let mut conn = pool.get().unwrap();

        pretty_assertions::assert_eq!(
            BlogPost::new(&mut conn, 999, &fixtures::fields("Orphan"), "October 19, 2026"),
            Err(AppError::InvalidReference)
        );
    }

    #[test]
    fn test_update_keeps_date_and_author() {
        let pool = in_memory_db().unwrap();
        let mut conn = pool.get().unwrap();
        let author = fixtures::user(&mut conn, "author@example.com");
        let post = fixtures::post(&mut conn, &author, "Original");

        let changes = PostFields {
            title: "Edited".to_string(),
            subtitle: "Edited subtitle".to_string(),
            body: "Edited body".to_string(),
            img_url: "https://images.example.com/other.png".to_string(),
        };
        let edited = BlogPost::update(&mut conn, post.id, &changes).unwrap();

        pretty_assertions::assert_eq!(
            edited,
            BlogPost {
                id: post.id,
                author_id: author.id,
                title: changes.title,
                subtitle: changes.subtitle,
                date: post.date,
                body: changes.body,
                img_url: changes.img_url,
            }
        );
        pretty_assertions::assert_eq!(
            BlogPost::update(&mut conn, 999, &fixtures::fields("Nope")),
            Err(AppError::NotFound)
        );
    }

    #[test]
    fn test_delete_cascades_to_comments() {
        let pool = in_memory_db().unwrap();
        let mut conn = pool.get().unwrap();
        let author = fixtures::user(&mut conn, "author@example.com");
        let post = fixtures::post(&mut conn, &author, "Doomed");
        Comment::new(&mut conn, post.id, author.id, "First!").unwrap();

        BlogPost::delete(&mut conn, post.id).unwrap();

        assert!(BlogPost::find_by_id(&mut conn, post.id).unwrap().is_none());
        assert!(Comment::find_by_post(&mut conn, post.id).unwrap().is_empty());
        pretty_assertions::assert_eq!(BlogPost::delete(&mut conn, post.id), Err(AppError::NotFound));
    }
}
