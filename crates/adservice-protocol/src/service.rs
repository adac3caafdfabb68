use tonic::codegen::{http, Body, Bytes, GrpcMethod, StdError};

use crate::ads::{AdRequest, AdResponse};

/// Fully qualified gRPC service name
pub const AD_SERVICE_NAME: &str = "hipstershop.AdService";

/// Short service name recorded on client spans
pub const AD_SERVICE_SHORT_NAME: &str = "AdService";

const GET_ADS_METHOD: &str = "GetAds";
const GET_ADS_PATH: &str = "/hipstershop.AdService/GetAds";

/// gRPC stub for the Ad Service.
///
/// Cheap to clone: clones share the underlying transport (for a tonic
/// `Channel`, one multiplexed HTTP/2 connection).
#[derive(Debug, Clone)]
pub struct AdServiceStub<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> AdServiceStub<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        Self {
            inner: tonic::client::Grpc::new(inner),
        }
    }

    /// Unary `GetAds` call
    pub async fn get_ads(
        &mut self,
        request: impl tonic::IntoRequest<AdRequest>,
    ) -> Result<tonic::Response<AdResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;

        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static(GET_ADS_PATH);

        let mut request = request.into_request();
        request
            .extensions_mut()
            .insert(GrpcMethod::new(AD_SERVICE_NAME, GET_ADS_METHOD));

        self.inner.unary(request, path, codec).await
    }
}
