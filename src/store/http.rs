use async_trait::async_trait;
use log::trace;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::app_config::AppConfig;
use crate::data::{NewNote, Note};
use crate::store::{Filter, OrderBy, RowStore, StoreError};

/// `RowStore` over the hosted store's REST dialect: filters and ordering go
/// into the query string, authorization into `apikey` + bearer headers.
pub struct HttpRowStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl HttpRowStore {
    pub fn new(client: Client, config: &AppConfig) -> HttpRowStore {
        HttpRowStore {
            client,
            base_url: config.store_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(
                self.access_token.as_deref().unwrap_or(&self.api_key),
            )
    }
}

#[async_trait]
impl RowStore for HttpRowStore {
    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Note>, StoreError> {
        trace!("querying {collection} with filter {filter:?}");
        let mut request = self.client
            .get(self.collection_url(collection))
            .query(&[("select", "*")]);
        if let Some(filter) = filter {
            request = request.query(&[filter_param(filter)]);
        }
        if let Some(order) = order {
            request = request.query(&[("order", order_param(order))]);
        }
        let response = self.authorize(request).send().await?;
        let body = check_status(response).await?;
        decode_rows(&body)
    }

    async fn insert(
        &self,
        collection: &str,
        row: NewNote,
    ) -> Result<Note, StoreError> {
        trace!("inserting into {collection} for owner {}", row.owner_id);
        let request = self.client
            .post(self.collection_url(collection))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.authorize(request).send().await?;
        let body = check_status(response).await?;
        // the store answers an insert with a one-row result set
        decode_rows(&body)?
            .into_iter()
            .next()
            .ok_or_else(||
                StoreError::Decoding("insert returned no rows".to_owned())
            )
    }

    async fn delete(
        &self,
        collection: &str,
        id: Uuid,
        filter: Option<Filter>,
    ) -> Result<(), StoreError> {
        trace!("deleting {id} from {collection}");
        let mut request = self.client
            .delete(self.collection_url(collection))
            .query(&[("id", format!("eq.{id}"))]);
        if let Some(filter) = filter {
            request = request.query(&[filter_param(filter)]);
        }
        let response = self.authorize(request).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

fn filter_param(filter: Filter) -> (&'static str, String) {
    match filter {
        Filter::OwnerEq(owner_id) => ("user_id", format!("eq.{owner_id}")),
    }
}

fn order_param(order: OrderBy) -> &'static str {
    match order {
        OrderBy::CreatedAtDesc => "created_at.desc",
    }
}

async fn check_status(response: Response) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(StoreError::Rejected(rejection_message(status, &body)))
    }
}

fn decode_rows(body: &str) -> Result<Vec<Note>, StoreError> {
    serde_json::from_str(body)
        .map_err(|e| StoreError::Decoding(e.to_string()))
}

/// Failed requests carry a `{"message": ...}` body; surface that message
/// verbatim, falling back to the raw body or the status line.
fn rejection_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_owned(),
        Err(_) => status.to_string(),
    }
}
