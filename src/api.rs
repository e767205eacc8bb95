use std::time::Duration;

use anyhow::Context;
use log::debug;
use url::Url;

/// The two diagnostic pages the device serves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum StatusPage {
    #[strum(serialize = "upstream")]
    Upstream,
    #[strum(serialize = "downstream")]
    Downstream,
}
impl StatusPage {
    pub fn path(self) -> &'static str {
        match self {
            StatusPage::Upstream => "cgi-bin/VmRouterStatusUpstreamCfgCgi",
            StatusPage::Downstream => "cgi-bin/VmRouterStatusDownstreamCfgCgi",
        }
    }
}

/// Anything that can hand out the raw markup of a status page.
pub trait StatusSource {
    fn fetch(&self, page: StatusPage) -> anyhow::Result<String>;
}

pub struct SuperHubClient {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl SuperHubClient {
    /// `device` is a host name or address, optionally with a port.
    pub fn new(device: &str) -> anyhow::Result<Self> {
        let base_url = device_base_url(device)?;
        // Requests never time out.
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn page_url(&self, page: StatusPage) -> anyhow::Result<Url> {
        Ok(self.base_url.join(page.path())?)
    }
}

impl StatusSource for SuperHubClient {
    fn fetch(&self, page: StatusPage) -> anyhow::Result<String> {
        let url = self.page_url(page)?;
        debug!("Fetching the {page} status page from {url}");
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

pub fn device_base_url(device: &str) -> anyhow::Result<Url> {
    Url::parse(&format!("http://{device}/"))
        .with_context(|| format!("Invalid device address: {device:?}"))
}

#[cfg(test)]
mod tests {
    use super::{device_base_url, StatusPage, SuperHubClient};

    #[test]
    fn page_urls() {
        let client = SuperHubClient::new("192.168.100.1").unwrap();
        assert_eq!(
            client.page_url(StatusPage::Upstream).unwrap().as_str(),
            "http://192.168.100.1/cgi-bin/VmRouterStatusUpstreamCfgCgi"
        );
        assert_eq!(
            client.page_url(StatusPage::Downstream).unwrap().as_str(),
            "http://192.168.100.1/cgi-bin/VmRouterStatusDownstreamCfgCgi"
        );
    }

    #[test]
    fn device_with_port() {
        assert_eq!(
            device_base_url("superhub.lan:8080").unwrap().as_str(),
            "http://superhub.lan:8080/"
        );
        assert!(device_base_url("not a host").is_err());
    }
}
