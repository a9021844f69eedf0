use serde::Serialize;

use crate::session::ShopSession;

pub mod shopify;

/// Opaque id of the blog that articles attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArticle {
    pub container_id: String,
    pub title: String,
    /// HTML body.
    pub body: String,
    pub summary: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedArticle {
    /// Fully qualified id as the store reports it.
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The store answered and refused the write. Messages in store order.
    #[error("{}", first_or_default(.0))]
    Rejected(Vec<String>),

    /// The store could not be reached or answered with garbage. The detail
    /// may name the endpoint and is only logged.
    #[error("{0}")]
    Transport(String),
}

fn first_or_default(messages: &[String]) -> &str {
    messages
        .first()
        .map(String::as_str)
        .unwrap_or("content store rejected the request")
}

impl ContentError {
    /// First message the store reported, for passing through to the user.
    pub fn first_message(&self) -> String {
        self.to_string()
    }
}

/// The store's content API, scoped to one shop.
pub trait ContentStore: Send + Sync {
    fn list_containers(&self, limit: u32) -> Result<Vec<ContainerRef>, ContentError>;
    fn create_container(&self, name: &str) -> Result<ContainerRef, ContentError>;
    fn create_article(&self, article: &NewArticle) -> Result<CreatedArticle, ContentError>;
}

/// Opens a [`ContentStore`] for an authenticated shop session.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, session: &ShopSession) -> Result<Box<dyn ContentStore>, ContentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_displays_first_message() {
        let err = ContentError::Rejected(vec!["Handle has already been taken".into(), "x".into()]);
        assert_eq!(err.first_message(), "Handle has already been taken");
        assert_eq!(
            ContentError::Rejected(vec![]).first_message(),
            "content store rejected the request"
        );
    }
}
