//! Protobuf messages of the `hipstershop.AdService` API.

/// A single advertisement. Opaque to the client.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Ad {
    /// URL to redirect to when the ad is clicked
    #[prost(string, tag = "1")]
    pub redirect_url: String,

    /// Short advertisement text to display
    #[prost(string, tag = "2")]
    pub text: String,
}

/// Request for ads matching a list of context keys.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AdRequest {
    /// Context keys used to select ads, in caller order
    #[prost(string, repeated, tag = "1")]
    pub context_keys: Vec<String>,
}

impl AdRequest {
    /// Build a request carrying exactly one context key.
    ///
    /// No validation is applied: an empty key is sent as-is.
    pub fn for_context_key(context_key: impl Into<String>) -> Self {
        Self {
            context_keys: vec![context_key.into()],
        }
    }
}

/// Ads returned by the server, in server order.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AdResponse {
    #[prost(message, repeated, tag = "1")]
    pub ads: Vec<Ad>,
}
