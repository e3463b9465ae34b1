use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::credentials::Credentials;
use crate::types::{RecordWithRelations, Role, Section, Shift};

/// User as the server reports it: nested role and section, no password.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub role: Role,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub section: Option<Section>,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    pub user: UserInfo,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl ApiClient {
    pub fn new(creds: &Credentials) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: creds.server_url.trim_end_matches('/').to_string(),
            token: creds.token.clone(),
        })
    }

    /// Client for the login call itself, before a token exists.
    pub fn unauthenticated(server_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            token: String::new(),
        })
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self.client.get(&url).bearer_auth(&self.token).send()?;
        self.handle_response(resp)
    }

    pub fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        self.handle_response(resp)
    }

    pub fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        self.handle_response(resp)
    }

    pub fn delete(&self, path: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self.client.delete(&url).bearer_auth(&self.token).send()?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let api_resp: ApiResponse<()> = resp.json()?;
            Err(anyhow::anyhow!(api_resp.error.unwrap_or_else(|| {
                "Server error (no details provided)".into()
            })))
        }
    }

    fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::blocking::Response,
    ) -> anyhow::Result<T> {
        if resp.status().is_success() {
            let api_resp: ApiResponse<T> = resp.json()?;
            api_resp
                .data
                .ok_or_else(|| anyhow::anyhow!("Server returned an empty response"))
        } else {
            let api_resp: ApiResponse<()> = resp.json()?;
            Err(anyhow::anyhow!(api_resp.error.unwrap_or_else(|| {
                "Server error (no details provided)".into()
            })))
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_sections(&self) -> anyhow::Result<Vec<Section>> {
        self.get("/sections")
    }

    pub fn fetch_shifts(&self) -> anyhow::Result<Vec<Shift>> {
        self.get("/shifts")
    }

    /// All records when the caller is an admin, otherwise their own.
    /// Only a 403 means "not an admin"; network and server errors
    /// propagate instead of being misread as a role.
    pub fn fetch_visible_records(&self) -> anyhow::Result<Vec<RecordWithRelations>> {
        let url = format!("{}/api/v1/records", self.base_url);
        let resp = self.client.get(&url).bearer_auth(&self.token).send()?;
        if resp.status() == reqwest::StatusCode::FORBIDDEN {
            return self.get("/records/my-records");
        }
        self.handle_response(resp)
    }
}

pub fn find_section_by_name(sections: &[Section], name: &str) -> anyhow::Result<Section> {
    sections
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No section named '{name}'"))
}

pub fn find_shift_by_name(shifts: &[Shift], name: &str) -> anyhow::Result<Shift> {
    shifts
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No shift named '{name}'"))
}
