use crate::error::{FetchbinError, Result};
use crate::utils::fs;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CHUNK_SIZE: usize = 8192;

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("fetchbin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Downloader { client })
    }

    /// Stream `url` into the destination directory and return the path of
    /// the file written.
    ///
    /// The local filename comes from the response's `Content-Disposition`
    /// header when it carries a `filename=` value, otherwise from the last
    /// path segment of the URL. Exactly one file is created; a half-written
    /// file is left behind if the transfer dies mid-body.
    pub fn download(&self, url: &str, destination: &Path) -> Result<PathBuf> {
        fs::ensure_dir_exists(destination)?;

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchbinError::DownloadFailed {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchbinError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| url_filename(url));

        let location = destination.join(filename.trim());
        let mut file = File::create(&location)?;
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            let read = response.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])?;
        }

        Ok(location)
    }
}

fn disposition_filename(value: &str) -> Option<String> {
    let (_, name) = value.split_once("filename=")?;
    let name = name.trim().trim_matches('"').trim_matches('\'');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn url_filename(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().trim().to_string()
}
