use serde_json::{json, Value};
use std::time::Duration;

use super::{
    ContainerRef, ContentError, ContentStore, CreatedArticle, NewArticle, StoreConnector,
};
use crate::config::ShopifyConfig;
use crate::session::ShopSession;

const BLOGS_QUERY: &str = "query Blogs($first: Int!) {
  blogs(first: $first) { nodes { id title } }
}";

const BLOG_CREATE: &str = "mutation BlogCreate($blog: BlogCreateInput!) {
  blogCreate(blog: $blog) {
    blog { id title }
    userErrors { field message }
  }
}";

const ARTICLE_CREATE: &str = "mutation ArticleCreate($article: ArticleCreateInput!) {
  articleCreate(article: $article) {
    article { id title handle }
    userErrors { field message }
  }
}";

/// Shopify Admin GraphQL API for one shop.
pub struct ShopifyStore {
    endpoint: String,
    access_token: String,
    author_name: String,
    client: reqwest::blocking::Client,
}

impl ShopifyStore {
    pub fn new(
        shop_domain: &str,
        access_token: &str,
        config: &ShopifyConfig,
    ) -> Result<Self, ContentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ContentError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(ShopifyStore {
            endpoint: format!(
                "https://{}/admin/api/{}/graphql.json",
                shop_domain, config.api_version
            ),
            access_token: access_token.to_string(),
            author_name: config.author_name.clone(),
            client,
        })
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one GraphQL document and return its `data` object.
    fn graphql(&self, query: &str, variables: Value) -> Result<Value, ContentError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Content-Type", "application/json")
            .json(&json!({"query": query, "variables": variables}))
            .send()
            .map_err(|e| ContentError::Transport(format!("Shopify request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            log::warn!("[shopify] Admin API returned {}: {}", status, text);
            return Err(ContentError::Transport(format!(
                "Shopify returned {}",
                status
            )));
        }

        let body: Value = resp
            .json()
            .map_err(|e| ContentError::Transport(format!("Shopify JSON parse error: {}", e)))?;

        graphql_data(body)
    }
}

/// Top-level GraphQL errors (throttling, access scopes, bad query) fail the call.
fn graphql_data(body: Value) -> Result<Value, ContentError> {
    let errors = messages(body.get("errors"));
    if !errors.is_empty() {
        log::warn!("[shopify] GraphQL errors: {}", errors.join("; "));
        return Err(ContentError::Rejected(errors));
    }
    body.get("data")
        .cloned()
        .filter(|d| !d.is_null())
        .ok_or_else(|| ContentError::Transport("Shopify response had no data".into()))
}

/// `message` fields of a GraphQL `errors` / `userErrors` array.
fn messages(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Pull `payload.<object>` out of a mutation result, honouring `userErrors`.
fn mutation_object<'a>(
    data: &'a Value,
    mutation: &str,
    object: &str,
) -> Result<&'a Value, ContentError> {
    let payload = data
        .get(mutation)
        .ok_or_else(|| ContentError::Transport(format!("missing {} in response", mutation)))?;
    let user_errors = messages(payload.get("userErrors"));
    if !user_errors.is_empty() {
        return Err(ContentError::Rejected(user_errors));
    }
    payload
        .get(object)
        .filter(|o| !o.is_null())
        .ok_or_else(|| ContentError::Transport(format!("{} returned no {}", mutation, object)))
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

impl ContentStore for ShopifyStore {
    fn list_containers(&self, limit: u32) -> Result<Vec<ContainerRef>, ContentError> {
        let data = self.graphql(BLOGS_QUERY, json!({"first": limit}))?;
        let blogs = data
            .get("blogs")
            .and_then(|b| b.get("nodes"))
            .and_then(|n| n.as_array())
            .map(|nodes| {
                nodes
                    .iter()
                    .map(|n| str_field(n, "id"))
                    .filter(|id| !id.is_empty())
                    .map(|id| ContainerRef { id })
                    .collect()
            })
            .unwrap_or_default();
        Ok(blogs)
    }

    fn create_container(&self, name: &str) -> Result<ContainerRef, ContentError> {
        let data = self.graphql(BLOG_CREATE, json!({"blog": {"title": name}}))?;
        let blog = mutation_object(&data, "blogCreate", "blog")?;
        let id = str_field(blog, "id");
        if id.is_empty() {
            return Err(ContentError::Transport("blogCreate returned no id".into()));
        }
        log::info!("[shopify] Created blog '{}' ({})", name, id);
        Ok(ContainerRef { id })
    }

    fn create_article(&self, article: &NewArticle) -> Result<CreatedArticle, ContentError> {
        let variables = json!({
            "article": {
                "blogId": article.container_id,
                "title": article.title,
                "body": article.body,
                "summary": article.summary,
                "handle": article.slug,
                "tags": article.tags,
                "isPublished": !article.draft,
                "author": {"name": self.author_name},
            }
        });
        let data = self.graphql(ARTICLE_CREATE, variables)?;
        let created = mutation_object(&data, "articleCreate", "article")?;
        let id = str_field(created, "id");
        if id.is_empty() {
            return Err(ContentError::Transport("articleCreate returned no id".into()));
        }
        Ok(CreatedArticle {
            id,
            title: str_field(created, "title"),
        })
    }
}

/// Connects to the Admin API of whichever shop the session belongs to.
pub struct ShopifyConnector {
    config: ShopifyConfig,
}

impl ShopifyConnector {
    pub fn new(config: ShopifyConfig) -> Self {
        ShopifyConnector { config }
    }
}

impl StoreConnector for ShopifyConnector {
    fn connect(&self, session: &ShopSession) -> Result<Box<dyn ContentStore>, ContentError> {
        let store = ShopifyStore::new(&session.shop, &session.access_token, &self.config)?;
        Ok(Box::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_shop_and_version() {
        let store =
            ShopifyStore::new("demo.myshopify.com", "shpat_x", &ShopifyConfig::default()).unwrap();
        assert_eq!(
            store.endpoint(),
            "https://demo.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn top_level_errors_are_rejections() {
        let body = json!({"errors": [{"message": "Throttled"}, {"message": "other"}]});
        assert_eq!(
            graphql_data(body).unwrap_err(),
            ContentError::Rejected(vec!["Throttled".into(), "other".into()])
        );
        assert!(matches!(
            graphql_data(json!({"data": null})).unwrap_err(),
            ContentError::Transport(_)
        ));
    }

    #[test]
    fn user_errors_win_over_object() {
        let data = json!({
            "articleCreate": {
                "article": null,
                "userErrors": [{"field": ["article", "handle"], "message": "Handle has already been taken"}]
            }
        });
        let err = mutation_object(&data, "articleCreate", "article").unwrap_err();
        assert_eq!(err.first_message(), "Handle has already been taken");
    }

    #[test]
    fn mutation_object_returns_created_object() {
        let data = json!({
            "blogCreate": {
                "blog": {"id": "gid://shopify/Blog/7", "title": "News"},
                "userErrors": []
            }
        });
        let blog = mutation_object(&data, "blogCreate", "blog").unwrap();
        assert_eq!(str_field(blog, "id"), "gid://shopify/Blog/7");
    }
}
