use chrono::Local;
use serde::Serialize;
use url::Url;

use super::{require_text, BlogService, SHORT_TEXT_MAX};
use crate::{
    app::AppError,
    auth::{gravatar::avatar_url, policy::Identity},
    database::models::{
        comment::Comment,
        post::{BlogPost, PostFields},
    },
};

/// Format of [`BlogPost::date`], e.g. `October 19, 2026`
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: BlogPost,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub avatar: String,
}

impl CommentView {
    fn of(comment: Comment, author: String, author_email: &str) -> CommentView {
        CommentView {
            id: comment.id,
            text: comment.text,
            author,
            avatar: avatar_url(author_email),
        }
    }
}

/// A post page: the post and its comments, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Trims the single-line fields and checks the result, which is what gets stored
fn cleaned(fields: &PostFields) -> Result<PostFields, AppError> {
    let fields = PostFields {
        title: fields.title.trim().to_string(),
        subtitle: fields.subtitle.trim().to_string(),
        body: fields.body.clone(),
        img_url: fields.img_url.trim().to_string(),
    };

    require_text("Title", &fields.title, Some(SHORT_TEXT_MAX))?;
    require_text("Subtitle", &fields.subtitle, Some(SHORT_TEXT_MAX))?;
    require_text("Body", &fields.body, None)?;
    require_text("Image URL", &fields.img_url, Some(SHORT_TEXT_MAX))?;

    let url = Url::parse(&fields.img_url)
        .map_err(|err| AppError::ValidationError(format!("Image URL is not a valid URL: {}", err)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::ValidationError(
            "Image URL must be an http(s) address".to_string(),
        ));
    }
    Ok(fields)
}

impl BlogService {
    pub fn list_posts(&self) -> Result<Vec<PostView>, AppError> {
        Ok(BlogPost::list_with_authors(&mut *self.conn()?)?
            .into_iter()
            .map(|(post, author)| PostView { post, author })
            .collect())
    }

    pub fn get_post(&self, post_id: i32) -> Result<PostDetail, AppError> {
        let mut conn = self.conn()?;

        let (post, author) = BlogPost::find_with_author(&mut conn, post_id)?.ok_or(AppError::NotFound)?;
        let comments = Comment::find_by_post(&mut conn, post_id)?
            .into_iter()
            .map(|(comment, name, email)| CommentView::of(comment, name, &email))
            .collect();

        Ok(PostDetail {
            post: PostView { post, author },
            comments,
        })
    }

    pub fn add_comment(&self, identity: &Identity, post_id: i32, text: &str) -> Result<CommentView, AppError> {
        let author = self.policy.require_authenticated(identity)?;
        require_text("Comment", text, None)?;
        let mut conn = self.conn()?;

        if BlogPost::find_by_id(&mut conn, post_id)?.is_none() {
            return Err(AppError::NotFound);
        }
        let comment = Comment::new(&mut conn, post_id, author.id, text)?;
        log::info!("user {} commented on post {}", author.id, post_id);

        Ok(CommentView::of(comment, author.name.clone(), &author.email))
    }

    /// Publishes a post dated today with the caller as author
    pub fn create_post(&self, identity: &Identity, fields: &PostFields) -> Result<BlogPost, AppError> {
        let author = self.policy.require_admin(identity)?;
        let fields = cleaned(fields)?;

        let today = Local::now().format(DATE_FORMAT).to_string();
        let post = BlogPost::new(&mut *self.conn()?, author.id, &fields, &today)?;
        log::info!("user {} published post {}", author.id, post.id);

        Ok(post)
    }

    /// Rewrites the content of a post. The original author and date are kept.
    pub fn edit_post(&self, identity: &Identity, post_id: i32, fields: &PostFields) -> Result<BlogPost, AppError> {
        let editor = self.policy.require_admin(identity)?;
        let fields = cleaned(fields)?;

        let post = BlogPost::update(&mut *self.conn()?, post_id, &fields)?;
        log::info!("user {} edited post {}", editor.id, post.id);

        Ok(post)
    }

    /// Deletes a post with all of its comments
    pub fn delete_post(&self, identity: &Identity, post_id: i32) -> Result<(), AppError> {
        let admin = self.policy.require_admin(identity)?;

        BlogPost::delete(&mut *self.conn()?, post_id)?;
        log::info!("user {} deleted post {}", admin.id, post_id);

        Ok(())
    }
}
