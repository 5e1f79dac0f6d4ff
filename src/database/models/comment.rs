use diesel::{prelude::*, sqlite::SqliteConnection};
use serde::Serialize;

use crate::{
    app::AppError,
    schema::{self, comments, users},
};

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
struct CommentInsert<'a> {
    text: &'a str,
    author_id: i32,
    post_id: i32,
}

impl Comment {
    /** Creates a comment on the post specified */
    pub fn new(conn: &mut SqliteConnection, post: i32, author: i32, comment_text: &str) -> Result<Comment, AppError> {
        let record = CommentInsert {
            text: comment_text,
            author_id: author,
            post_id: post,
        };

        Ok(diesel::insert_into(schema::comments::table)
            .values(&record)
            .get_result(conn)?)
    }

    /// Returns all comments posted on a post, oldest first, each with the
    /// author's name and email
    pub fn find_by_post(
        conn: &mut SqliteConnection,
        post: i32,
    ) -> Result<Vec<(Comment, String, String)>, AppError> {
        Ok(comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post))
            .order(comments::id.asc())
            .select((comments::all_columns, users::name, users::email))
            .load::<(Comment, String, String)>(conn)?)
    }

    pub fn delete_by_post(conn: &mut SqliteConnection, post: i32) -> Result<usize, AppError> {
        use crate::schema::comments::dsl::*;

        Ok(diesel::delete(comments.filter(post_id.eq(post))).execute(conn)?)
    }

    pub fn delete_by_author(conn: &mut SqliteConnection, author: i32) -> Result<usize, AppError> {
        use crate::schema::comments::dsl::*;

        Ok(diesel::delete(comments.filter(author_id.eq(author))).execute(conn)?)
    }
}
