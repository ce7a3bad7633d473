//! Tour of the auto-api client against a live marketplace.
//!
//! ```sh
//! AUTO_API_KEY=... RUST_LOG=auto_api=debug cargo run -p encar-tour
//! ```
//!
//! `AUTO_API_SOURCE` picks the marketplace (`encar` by default) and
//! `AUTO_API_DATE` the day the change feed starts from.

#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use auto_api::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const DEFAULT_SOURCE: &str = "encar";
const DEFAULT_DATE: &str = "2025-01-15";
const SAMPLE_OFFER_URL: &str = "https://www.encar.com/dc/dc_cardetailview.do?carid=40427050";

#[tokio::main]
async fn main() -> auto_api::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = std::env::var("AUTO_API_KEY") else {
        tracing::error!("AUTO_API_KEY is not set");
        return Err(ApiError::default_auth());
    };
    let source = std::env::var("AUTO_API_SOURCE").unwrap_or_else(|_| DEFAULT_SOURCE.to_string());
    let date = std::env::var("AUTO_API_DATE").unwrap_or_else(|_| DEFAULT_DATE.to_string());

    let client = ApiClient::builder(api_key).with_logging().build();

    show_filters(&client, &source).await?;
    let inner_id = show_offers(&client, &source).await?;
    show_offer(&client, &source, &inner_id).await?;
    show_changes(&client, &source, &date).await?;
    show_offer_by_url(&client, SAMPLE_OFFER_URL).await?;
    show_bad_key(client.base_url()).await;

    Ok(())
}

async fn show_filters<C: HttpClient>(client: &ApiClient<C>, source: &str) -> auto_api::Result<()> {
    let filters = client.get_filters(source).await?;

    println!("Available brands:");
    for brand in filters["mark"].as_object().into_iter().flat_map(|marks| marks.keys()) {
        println!("  - {brand}");
    }
    println!("\nTransmission types: {}", join(&filters["transmission_type"]));
    println!("Body types: {}", join(&filters["body_type"]));

    Ok(())
}

/// Lists the first page of recent Hyundais, peeks at the next one, and
/// returns an offer id to look at in detail.
async fn show_offers<C: HttpClient>(
    client: &ApiClient<C>,
    source: &str,
) -> auto_api::Result<String> {
    let query = OffersQuery::page(1)
        .brand("Hyundai")
        .year_from(2020)
        .price_to(50_000);
    let offers = client.get_offers(source, &query).await?;

    println!("\n--- Offers (page {}) ---", offers["meta"]["page"]);
    for item in items(&offers) {
        let data = &item["data"];
        println!(
            "{} {} {} - ${} ({} km)",
            text(&data["mark"]),
            text(&data["model"]),
            data["year"],
            data["price"],
            data["km_age"]
        );
    }

    if let Some(page) = next_page(&offers) {
        let next = client.get_offers(source, query.with_page(page)).await?;
        println!("Next page has {} offers", items(&next).len());
    }

    Ok(items(&offers)
        .first()
        .and_then(|item| item["inner_id"].as_str())
        .unwrap_or("40427050")
        .to_string())
}

async fn show_offer<C: HttpClient>(
    client: &ApiClient<C>,
    source: &str,
    inner_id: &str,
) -> auto_api::Result<()> {
    let offer = client.get_offer(source, inner_id).await?;
    let data = &offer["data"];

    println!("\n--- Single offer ---");
    println!("URL: {}", text(&data["url"]));
    println!("Seller: {}", text(&data["seller_type"]));
    println!("Images: {}", data["images"].as_array().map_or(0, Vec::len));

    Ok(())
}

async fn show_changes<C: HttpClient>(
    client: &ApiClient<C>,
    source: &str,
    date: &str,
) -> auto_api::Result<()> {
    let change_id = client.get_change_id(source, date).await?;
    println!("\n--- Changes from {date} (change_id: {change_id}) ---");

    let changes = client.get_changes(source, change_id).await?;
    for change in items(&changes) {
        println!("[{}] {}", text(&change["change_type"]), text(&change["inner_id"]));
    }

    if let Some(next) = next_change_id(&changes) {
        let more = client.get_changes(source, next).await?;
        println!("Next batch: {} changes", items(&more).len());
    }

    Ok(())
}

async fn show_offer_by_url<C: HttpClient>(client: &ApiClient<C>, url: &str) -> auto_api::Result<()> {
    let info = client.get_offer_by_url(url).await?;

    println!("\n--- Offer by URL ---");
    println!(
        "{} {} {} - ${}",
        text(&info["mark"]),
        text(&info["model"]),
        info["year"],
        info["price"]
    );

    Ok(())
}

async fn show_bad_key(base_url: &str) {
    let client = ApiClient::builder("invalid-key").base_url(base_url).build();

    match client.get_offers("encar", OffersQuery::page(1)).await {
        Ok(_) => println!("\nUnexpectedly accepted an invalid key"),
        Err(err) if err.is_auth() => {
            println!("\nAuth error: {err} (HTTP {})", err.status());
        }
        Err(err) => println!("\nAPI error: {err} (HTTP {})", err.status()),
    }
}

fn items(response: &Value) -> &[Value] {
    response["result"].as_array().map_or(&[][..], Vec::as_slice)
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("-")
}

fn join(values: &Value) -> String {
    values
        .as_array()
        .map(|values| values.iter().map(text).collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::builder("demo-key").base_url(server.uri()).build()
    }

    #[tokio::test]
    async fn offers_follow_next_page_and_return_first_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/encar/offers"))
            .and(query_param("page", "1"))
            .and(query_param("brand", "Hyundai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"inner_id": "777", "data": {"mark": "Hyundai", "model": "Avante"}}],
                "meta": {"page": 1, "next_page": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/encar/offers"))
            .and(query_param("page", "2"))
            .and(query_param("brand", "Hyundai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [],
                "meta": {"page": 2, "next_page": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let inner_id = show_offers(&client_for(&server), "encar").await;

        let_assert!(Ok(inner_id) = inner_id);
        check!(inner_id == "777");
    }

    #[tokio::test]
    async fn changes_follow_next_change_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/encar/change_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"change_id": "10"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/encar/changes"))
            .and(query_param("change_id", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"change_type": "removed", "inner_id": "1"}],
                "meta": {"next_change_id": 11}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/encar/changes"))
            .and(query_param("change_id", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [], "meta": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let result = show_changes(&client_for(&server), "encar", "2025-01-15").await;

        check!(result.is_ok());
    }

    #[tokio::test]
    async fn auth_failure_surfaces_from_tour_step() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"})))
            .mount(&server)
            .await;

        let result = show_filters(&client_for(&server), "encar").await;

        let_assert!(Err(err) = result);
        check!(err.is_auth());
    }

    #[test]
    fn join_renders_string_lists() {
        check!(join(&json!(["automatic", "manual"])) == "automatic, manual");
        check!(join(&json!(null)).is_empty());
    }
}
