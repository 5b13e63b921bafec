use actix_web::{web, HttpResponse};

use super::state::AppState;

// Publishable identifiers the storefront needs; empty when unset

fn plain(value: &str) -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(value.to_string())
}

pub async fn paypal(state: web::Data<AppState>) -> HttpResponse {
    plain(&state.config.payments.paypal_client_id)
}

pub async fn stripe(state: web::Data<AppState>) -> HttpResponse {
    plain(&state.config.payments.stripe_publishable_key)
}

pub async fn google(state: web::Data<AppState>) -> HttpResponse {
    plain(&state.config.maps.google_api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_plain_body() {
        let response = plain("sb-client-id");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], b"sb-client-id");
    }
}
