// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::aru::Credentials;
use crate::error::Result;
use crate::user_agent;
use attohttpc::{Response, Session};
use std::io::{self, Read};
use std::time::Duration;

pub trait HttpClient {
    fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<Box<dyn HttpResponse>>;

    fn set_timeout(&mut self, timeout: Duration);
}

pub trait HttpResponse: Read {
    fn status(&self) -> u16;

    fn header(&self, name: &str) -> Option<&str>;
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub struct AttohttpcClient {
    timeout: Duration,
    user_agent: String,
}

impl AttohttpcClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: user_agent::download_client(),
        }
    }
}

impl Default for AttohttpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for AttohttpcClient {
    fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<Box<dyn HttpResponse>> {
        let mut session = Session::new();
        session.proxy_settings(attohttpc::ProxySettings::from_env());

        let mut request_builder = session
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent)
            .follow_redirects(true);

        if let Some(credentials) = credentials {
            request_builder =
                request_builder.basic_auth(credentials.username(), Some(credentials.password()));
        }

        let response = request_builder.send()?;
        Ok(Box::new(AttohttpcResponse { response }))
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

struct AttohttpcResponse {
    response: Response,
}

impl Read for AttohttpcResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.response.read(buf)
    }
}

impl HttpResponse for AttohttpcResponse {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.response.headers().get(name)?.to_str().ok()
    }
}
