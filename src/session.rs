use regex::Regex;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use std::sync::OnceLock;

/// Header carrying the shop domain of an already-authenticated session.
pub const SHOP_HEADER: &str = "X-Shop-Domain";
/// Header carrying the Admin API access token for that shop.
pub const TOKEN_HEADER: &str = "X-Shop-Access-Token";

/// Shop identity handed over by the embedding layer, which has already done
/// the OAuth / session-token exchange.
#[derive(Debug, Clone)]
pub struct ShopSession {
    pub shop: String,
    pub access_token: String,
}

fn shop_domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9-]*\.myshopify\.com$").expect("valid regex")
    })
}

/// Only `*.myshopify.com` hosts: the domain ends up in an outbound URL.
pub fn is_valid_shop_domain(shop: &str) -> bool {
    shop.len() <= 255 && shop_domain_re().is_match(shop)
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    Missing,
    InvalidShop,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ShopSession {
    type Error = SessionError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();
        let shop = headers
            .get_one(SHOP_HEADER)
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let token = headers
            .get_one(TOKEN_HEADER)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if shop.is_empty() || token.is_empty() {
            return Outcome::Error((Status::Unauthorized, SessionError::Missing));
        }
        if !is_valid_shop_domain(&shop) {
            log::warn!("[session] Rejected shop domain: {}", shop);
            return Outcome::Error((Status::Unauthorized, SessionError::InvalidShop));
        }

        Outcome::Success(ShopSession {
            shop,
            access_token: token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_myshopify_domains() {
        assert!(is_valid_shop_domain("demo-store.myshopify.com"));
        assert!(is_valid_shop_domain("a1.myshopify.com"));
        assert!(!is_valid_shop_domain("evil.com"));
        assert!(!is_valid_shop_domain("demo.myshopify.com.evil.com"));
        assert!(!is_valid_shop_domain("-demo.myshopify.com"));
        assert!(!is_valid_shop_domain("demo.myshopify.com/admin"));
        assert!(!is_valid_shop_domain(""));
    }
}
