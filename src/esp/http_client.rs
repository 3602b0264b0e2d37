use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::Read;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;

use crate::config::HTTP_TIMEOUT_MS;

const MAX_BODY: usize = 16 * 1024;

/// HTTPS GET against the bundled CA store; returns the body of a 200 reply.
pub fn https_get(url: &str) -> Result<String> {
    let config = Configuration {
        timeout: Some(std::time::Duration::from_millis(HTTP_TIMEOUT_MS)),
        use_global_ca_store: true,
        crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
        ..Default::default()
    };

    let connection = EspHttpConnection::new(&config)?;
    let mut client = Client::wrap(connection);
    let mut response = client.request(Method::Get, url, &[])?.submit()?;

    let status = response.status();
    info!("HTTP GET {} -> status {}", url, status);
    if status != 200 {
        bail!("HTTP error: status {}", status);
    }

    let mut body: Vec<u8> = Vec::new();
    let mut buf = [0u8; 512];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if body.len() > MAX_BODY {
            bail!("Response too large (>{} bytes)", MAX_BODY);
        }
    }

    Ok(String::from_utf8(body)?)
}
