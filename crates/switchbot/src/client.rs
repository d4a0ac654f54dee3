//! SwitchBot API client.
//!
//! This module provides the `SwitchBotClient`, which signs every request with
//! the account token and secret and decodes the v1.1 response envelopes.

use std::sync::Arc;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use thermopilot_core::Credentials;
use tracing::debug;

use crate::config::SwitchBotConfig;
use crate::error::{Error, Result};
use crate::sign::sign_now;
use crate::types::{
    API_SUCCESS, AirConditionerMode, CommandRequest, CommandResponse, Device, InfraredRemote,
    ListDeviceResponse, MeterStatusResponse,
};

/// `deviceType` of the Meter Pro thermo-hygrometer.
pub const METER_PRO: &str = "MeterPro";
/// `remoteType` of infrared air conditioner remotes.
pub const AIR_CONDITIONER: &str = "Air Conditioner";

/// Client for the SwitchBot cloud API.
#[derive(Clone)]
pub struct SwitchBotClient {
    config: Arc<SwitchBotConfig>,
    http_client: reqwest::Client,
    credentials: Credentials,
}

impl std::fmt::Debug for SwitchBotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchBotClient")
            .field("base_url", &self.config.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl SwitchBotClient {
    /// Create a client for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed or the HTTP client
    /// cannot be built.
    pub fn new(config: SwitchBotConfig, credentials: Credentials) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
            credentials,
        })
    }

    /// List every device and infrared remote in the account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx response, or an
    /// undecodable body.
    pub async fn list_devices(&self) -> Result<ListDeviceResponse> {
        let request = self.http_client.get(self.config.endpoint("/devices"));
        self.send(request).await
    }

    /// First Meter Pro in the account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the account has no Meter Pro.
    pub async fn meter_pro(&self) -> Result<Device> {
        self.list_devices()
            .await?
            .body
            .device_list
            .into_iter()
            .find(|device| device.device_type == METER_PRO)
            .ok_or_else(|| Error::not_found("meter pro"))
    }

    /// Every infrared air conditioner remote in the account, in listing order.
    ///
    /// # Errors
    ///
    /// Returns an error when the device list cannot be fetched.
    pub async fn air_conditioners(&self) -> Result<Vec<InfraredRemote>> {
        Ok(self
            .list_devices()
            .await?
            .body
            .infrared_remote_list
            .into_iter()
            .filter(|remote| remote.remote_type == AIR_CONDITIONER)
            .collect())
    }

    /// Current temperature reported by a meter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiStatus`] when the API reports a non-success code and
    /// [`Error::MissingReading`] when the status carries no temperature.
    pub async fn temperature(&self, device_id: &str) -> Result<f64> {
        let request = self
            .http_client
            .get(self.config.endpoint(&format!("/devices/{device_id}/status")));
        let response: MeterStatusResponse = self.send(request).await?;

        if response.status_code != API_SUCCESS {
            return Err(Error::ApiStatus {
                code: response.status_code,
                message: response.message,
            });
        }
        response
            .body
            .temperature
            .ok_or_else(|| Error::missing_reading(device_id))
    }

    /// Send a `setAll` command to an air conditioner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiStatus`] when the API reports a non-success code.
    pub async fn set_temperature(
        &self,
        device_id: &str,
        temperature: f64,
        mode: AirConditionerMode,
    ) -> Result<()> {
        let request = self
            .http_client
            .post(self.config.endpoint(&format!("/devices/{device_id}/commands")))
            .json(&CommandRequest::set_all(temperature, mode));
        let response: CommandResponse = self.send(request).await?;

        if response.status_code != API_SUCCESS {
            return Err(Error::ApiStatus {
                code: response.status_code,
                message: response.message,
            });
        }
        Ok(())
    }

    /// Sign, send and decode a request.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let headers = sign_now(&self.credentials.token, &self.credentials.secret)?;

        let response = request
            .header("Authorization", headers.authorization)
            .header("sign", headers.sign)
            .header("nonce", headers.nonce)
            .header("t", headers.timestamp)
            .send()
            .await?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "SwitchBot response");

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
