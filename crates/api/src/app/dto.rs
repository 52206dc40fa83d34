use serde::Deserialize;

/// Body of `POST /accounts/:id/transactions`.
///
/// `type` stays a raw string on purpose: the engine owns validation and its
/// ordering, so nothing is parsed or rejected here beyond JSON shape.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
    pub description: String,
}
