//! Integration tests for listing queries against the in-memory document store

use folio::adapters::document_store::InMemoryDocumentStore;
use folio::config::QueryConfig;
use folio::core::query::{
    query_resources, rewrite_operators, BaseQuery, Filter, QueryFeatureComposer, RawParams,
};
use folio::domain::{ErrorKind, ResourceKind};
use serde_json::{json, Value};
use test_case::test_case;

async fn library() -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new();
    store
        .seed(
            "books",
            vec![
                json!({"_id": "b1", "title": "Dune", "language": "en", "pages": 412,
                       "categoryId": "c1", "createdAt": "2025-01-01T00:00:00Z"}),
                json!({"_id": "b2", "title": "Dune Messiah", "language": "en", "pages": 256,
                       "categoryId": "c1", "createdAt": "2025-01-02T00:00:00Z"}),
                json!({"_id": "b3", "title": "Hyperion", "language": "en", "pages": 482,
                       "categoryId": "c2", "createdAt": "2025-01-03T00:00:00Z"}),
                json!({"_id": "b4", "title": "Le Petit Prince", "language": "fr", "pages": 96,
                       "categoryId": "c2", "createdAt": "2025-01-04T00:00:00Z"}),
            ],
        )
        .await;
    store
}

fn ids(documents: &[Value]) -> Vec<&str> {
    documents
        .iter()
        .map(|d| d["_id"].as_str().unwrap())
        .collect()
}

async fn list(store: &InMemoryDocumentStore, query: &str, base: BaseQuery) -> Vec<Value> {
    let params = RawParams::parse(query).unwrap();
    query_resources(store, &QueryFeatureComposer::default(), &params, base)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected_by_query_resources() {
    let store = library().await;
    let params = RawParams::parse("page=9223372036854775807").unwrap();
    let err = query_resources(
        &store,
        &QueryFeatureComposer::default(),
        &params,
        BaseQuery::of(ResourceKind::Book),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_default_listing_is_newest_first() {
    let store = library().await;
    let books = list(&store, "", BaseQuery::of(ResourceKind::Book)).await;
    assert_eq!(ids(&books), vec!["b4", "b3", "b2", "b1"]);
}

#[tokio::test]
async fn test_search_field_is_case_insensitive_substring() {
    let store = library().await;
    let books = list(&store, "title=dune&sort=title%20asc", BaseQuery::of(ResourceKind::Book)).await;
    assert_eq!(ids(&books), vec!["b1", "b2"]);
}

#[tokio::test]
async fn test_bracket_operators_and_plain_fields_are_anded() {
    let store = library().await;
    let books = list(
        &store,
        "pages[gte]=250&pages[lt]=450&language=en&sort=pages%20desc",
        BaseQuery::of(ResourceKind::Book),
    )
    .await;
    assert_eq!(ids(&books), vec!["b1", "b2"]);

    let books = list(&store, "language[in]=fr,de", BaseQuery::of(ResourceKind::Book)).await;
    assert_eq!(ids(&books), vec!["b4"]);
}

#[tokio::test]
async fn test_base_filter_narrows_results() {
    let store = library().await;
    let base = BaseQuery::of(ResourceKind::Book).with_filter(Filter::eq("categoryId", "c2").unwrap());
    let books = list(&store, "sort=title", base).await;
    assert_eq!(ids(&books), vec!["b3", "b4"]);
}

#[test_case("page=1&size=2&sort=pages%20asc", vec!["b4", "b2"]; "first page")]
#[test_case("page=2&size=2&sort=pages%20asc", vec!["b1", "b3"]; "second page")]
#[test_case("page=0&size=2&sort=pages%20asc", vec!["b4", "b2"]; "page zero is first page")]
#[test_case("page=3&size=2&sort=pages%20asc", vec![]; "past the end")]
#[tokio::test]
async fn test_pagination(query: &str, expected: Vec<&str>) {
    let store = library().await;
    let books = list(&store, query, BaseQuery::of(ResourceKind::Book)).await;
    assert_eq!(ids(&books), expected);
}

#[test]
fn test_page_size_limits_follow_config() {
    let composer = QueryFeatureComposer::new(&QueryConfig {
        default_page_size: 3,
        max_page_size: 5,
    });
    let params = RawParams::parse("page=4&size=50").unwrap();
    let query = composer
        .compose(&params, BaseQuery::of(ResourceKind::Category))
        .unwrap();
    assert_eq!(query.limit, 5);
    assert_eq!(query.skip, 15);

    let query = composer
        .compose(&RawParams::default(), BaseQuery::of(ResourceKind::Category))
        .unwrap();
    assert_eq!((query.limit, query.skip), (3, 0));
}

#[test]
fn test_rewrite_is_idempotent() {
    let params = json!({"price": {"gte": 100, "lt": 500}, "language": "en"});
    let once = rewrite_operators(&params).unwrap();
    let twice = rewrite_operators(&once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once["price"]["$gte"], 100);
    assert_eq!(once["language"]["$eq"], "en");
}

#[test_case("pages[between]=1"; "unknown operator")]
#[test_case("$where=1"; "operator as field")]
#[test_case("sort=title%20sideways"; "bad sort direction")]
#[test_case("page=two"; "non numeric page")]
#[test_case("page=9223372036854775807"; "page beyond largest offset")]
#[test_case("page=922337203685477582&size=10"; "offset overflows i64")]
fn test_invalid_params_are_validation_errors(query: &str) {
    let err = RawParams::parse(query)
        .and_then(|params| {
            QueryFeatureComposer::default().compose(&params, BaseQuery::of(ResourceKind::Book))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_to_json_shape() {
    let params = RawParams::parse("title=dune&page=2&size=5").unwrap();
    let query = QueryFeatureComposer::default()
        .compose(&params, BaseQuery::of(ResourceKind::Book))
        .unwrap();
    let rendered = query.to_json();
    assert_eq!(rendered["collection"], "books");
    assert_eq!(rendered["limit"], 5);
    assert_eq!(rendered["skip"], 5);
    assert_eq!(rendered["sort"]["createdAt"], -1);
    assert_eq!(rendered["filter"]["title"]["$options"], "i");
}

#[test]
fn test_to_json_keeps_base_and_request_conditions_on_one_field() {
    let params = RawParams::parse("categoryId=c2").unwrap();
    let base =
        BaseQuery::of(ResourceKind::Book).with_filter(Filter::eq("categoryId", "c1").unwrap());
    let rendered = QueryFeatureComposer::default()
        .compose(&params, base)
        .unwrap()
        .to_json();

    assert_eq!(rendered["filter"]["categoryId"]["$eq"], "c1");
    assert_eq!(
        rendered["filter"]["$and"],
        json!([{"categoryId": {"$eq": "c2"}}])
    );
}
