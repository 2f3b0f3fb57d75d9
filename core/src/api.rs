//! `ApiClient` paired with a `Transport`: one method per endpoint doing
//! build, execute, parse. Exactly one network attempt per call.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AuthGrant, ChildProfile, Credentials, Deletion, HealthStatus, ProfileList,
    RegistrationRequest, UserInfo,
};

pub struct Api<T> {
    client: ApiClient,
    transport: T,
}

impl Api<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiClient::new(&config.base_url), UreqTransport::new(config))
    }
}

impl<T: Transport> Api<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self.transport.execute(self.client.build_health_check())?;
        self.client.parse_health_check(response)
    }

    pub fn register(&self, input: &RegistrationRequest) -> Result<AuthGrant, ApiError> {
        let response = self.transport.execute(self.client.build_register(input)?)?;
        self.client.parse_register(response)
    }

    pub fn login(&self, input: &Credentials) -> Result<AuthGrant, ApiError> {
        let response = self.transport.execute(self.client.build_login(input)?)?;
        self.client.parse_login(response)
    }

    pub fn current_user(&self, token: &str) -> Result<UserInfo, ApiError> {
        let response = self.transport.execute(self.client.build_current_user(token)?)?;
        self.client.parse_current_user(response)
    }

    pub fn logout(&self, token: &str) -> Result<Option<String>, ApiError> {
        let response = self.transport.execute(self.client.build_logout(token)?)?;
        self.client.parse_logout(response)
    }

    pub fn list_profiles(&self, token: &str) -> Result<ProfileList, ApiError> {
        let response = self.transport.execute(self.client.build_list_profiles(token)?)?;
        self.client.parse_list_profiles(response)
    }

    pub fn create_profile(&self, token: &str, input: &ChildProfile) -> Result<ChildProfile, ApiError> {
        let request = self.client.build_create_profile(token, input)?;
        let response = self.transport.execute(request)?;
        self.client.parse_create_profile(response)
    }

    pub fn get_profile(&self, token: &str, id: Uuid) -> Result<ChildProfile, ApiError> {
        let response = self.transport.execute(self.client.build_get_profile(token, id)?)?;
        self.client.parse_get_profile(response)
    }

    pub fn update_profile(
        &self,
        token: &str,
        id: Uuid,
        input: &ChildProfile,
    ) -> Result<ChildProfile, ApiError> {
        let request = self.client.build_update_profile(token, id, input)?;
        let response = self.transport.execute(request)?;
        self.client.parse_update_profile(response)
    }

    pub fn delete_profile(&self, token: &str, id: Uuid) -> Result<Deletion, ApiError> {
        let response = self.transport.execute(self.client.build_delete_profile(token, id)?)?;
        self.client.parse_delete_profile(response)
    }
}
