//! Typed builder for the offers listing query.

use std::fmt::Display;

use crate::{Params, ToQueryPairs};

/// Filters for [`crate::ApiClient::get_offers`].
///
/// `page` always comes first; the remaining parameters keep the order they
/// were set in. Setting a parameter twice replaces its value in place.
///
/// # Example
///
/// ```ignore
/// use auto_api::OffersQuery;
///
/// let query = OffersQuery::page(1)
///     .brand("Hyundai")
///     .year_from(2020)
///     .price_to(25_000);
///
/// let offers = client.get_offers("encar", &query).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffersQuery {
    params: Params,
}

impl OffersQuery {
    /// Query for the given page (1-based).
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            params: Params::new().with("page", page),
        }
    }

    /// Same filters, different page.
    #[must_use]
    pub fn with_page(self, page: u32) -> Self {
        self.set("page", page)
    }

    /// Current page.
    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        self.params.get("page").and_then(|page| page.parse().ok())
    }

    /// Make, as listed in the source's filters.
    #[must_use]
    pub fn brand(self, brand: impl Display) -> Self {
        self.set("brand", brand)
    }

    /// Model within the brand.
    #[must_use]
    pub fn model(self, model: impl Display) -> Self {
        self.set("model", model)
    }

    /// Configuration (generation or trim family).
    #[must_use]
    pub fn configuration(self, configuration: impl Display) -> Self {
        self.set("configuration", configuration)
    }

    /// Complectation (equipment level).
    #[must_use]
    pub fn complectation(self, complectation: impl Display) -> Self {
        self.set("complectation", complectation)
    }

    /// Transmission type.
    #[must_use]
    pub fn transmission(self, transmission: impl Display) -> Self {
        self.set("transmission", transmission)
    }

    /// Exterior color.
    #[must_use]
    pub fn color(self, color: impl Display) -> Self {
        self.set("color", color)
    }

    /// Body type, e.g. `sedan` or `suv`.
    #[must_use]
    pub fn body_type(self, body_type: impl Display) -> Self {
        self.set("body_type", body_type)
    }

    /// Engine or fuel type.
    #[must_use]
    pub fn engine_type(self, engine_type: impl Display) -> Self {
        self.set("engine_type", engine_type)
    }

    /// Minimum production year.
    #[must_use]
    pub fn year_from(self, year: u16) -> Self {
        self.set("year_from", year)
    }

    /// Maximum production year.
    #[must_use]
    pub fn year_to(self, year: u16) -> Self {
        self.set("year_to", year)
    }

    /// Minimum mileage, in the source's unit.
    #[must_use]
    pub fn mileage_from(self, mileage: u64) -> Self {
        self.set("mileage_from", mileage)
    }

    /// Maximum mileage, in the source's unit.
    #[must_use]
    pub fn mileage_to(self, mileage: u64) -> Self {
        self.set("mileage_to", mileage)
    }

    /// Minimum price, in the source's currency.
    #[must_use]
    pub fn price_from(self, price: u64) -> Self {
        self.set("price_from", price)
    }

    /// Maximum price, in the source's currency.
    #[must_use]
    pub fn price_to(self, price: u64) -> Self {
        self.set("price_to", price)
    }

    /// Any parameter without a dedicated setter.
    #[must_use]
    pub fn extra(self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, value)
    }

    fn set(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.params.insert(key, value);
        self
    }
}

impl Default for OffersQuery {
    fn default() -> Self {
        Self::page(1)
    }
}

impl ToQueryPairs for OffersQuery {
    fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.params.to_query_pairs()
    }
}

impl From<OffersQuery> for Params {
    fn from(query: OffersQuery) -> Self {
        query.params
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    fn pairs(query: &OffersQuery) -> Vec<(String, String)> {
        query.to_query_pairs()
    }

    #[test]
    fn default_is_first_page() {
        let query = OffersQuery::default();

        check!(query.current_page() == Some(1));
        check!(pairs(&query) == vec![("page".to_string(), "1".to_string())]);
    }

    #[test]
    fn filters_follow_page_in_call_order() {
        let query = OffersQuery::page(2)
            .brand("BMW")
            .year_from(2020)
            .price_to(50_000);

        insta::assert_debug_snapshot!(pairs(&query), @r#"
        [
            (
                "page",
                "2",
            ),
            (
                "brand",
                "BMW",
            ),
            (
                "year_from",
                "2020",
            ),
            (
                "price_to",
                "50000",
            ),
        ]
        "#);
    }

    #[test]
    fn with_page_keeps_filters() {
        let query = OffersQuery::page(1).brand("Kia").body_type("suv");

        let next = query.clone().with_page(3);

        check!(next.current_page() == Some(3));
        check!(next.to_query_pairs()[1..] == query.to_query_pairs()[1..]);
    }

    #[test]
    fn setting_twice_replaces_value() {
        let query = OffersQuery::page(1).brand("Kia").color("white").brand("Hyundai");

        check!(
            pairs(&query)
                == vec![
                    ("page".to_string(), "1".to_string()),
                    ("brand".to_string(), "Hyundai".to_string()),
                    ("color".to_string(), "white".to_string()),
                ]
        );
    }

    #[test]
    fn extra_parameters_pass_through() {
        let query = OffersQuery::page(1).extra("region", "Seoul");

        let params = Params::from(query);
        check!(params.get("region") == Some("Seoul"));
    }
}
