use jsonrpsee::core::traits::ToRpcParams;
use serde::{Deserialize, Serialize};
use serde_json::value::to_raw_value;

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcDownloadRequest<'a> {
    pub url: &'a str,
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<&'a str>,
}

impl ToRpcParams for RpcDownloadRequest<'_> {
    fn to_rpc_params(self) -> Result<Option<Box<serde_json::value::RawValue>>, serde_json::Error> {
        to_raw_value(&self).map(Some)
    }
}
