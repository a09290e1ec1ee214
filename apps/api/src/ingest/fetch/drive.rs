//! Google Drive retrieval backend.
//!
//! Single files go through the public `uc?export=download` endpoint, following the
//! "can't scan this file for viruses" interstitial form when Drive serves one. Folders
//! are listed by decoding the `_DRIVE_ivd` payload embedded in the folder page, then
//! downloaded file by file.
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{ContentFetcher, FetchError};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const MAX_FOLDER_DEPTH: usize = 5;
const DEFAULT_FILE_NAME: &str = "file";

static IVD_PAYLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"window\['_DRIVE_ivd'\]\s*=\s*'([^']*)'"#).unwrap());
static FORM_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<form[^>]*id="download-form"[^>]*action="([^"]+)""#).unwrap());
static HIDDEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input[^>]*type="hidden"[^>]*name="([^"]+)"[^>]*value="([^"]*)""#).unwrap()
});
static DISPOSITION_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"filename\*=UTF-8''([^;]+)").unwrap());
static DISPOSITION_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename="?([^";]+)"?"#).unwrap());

/// One entry of a Drive folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

impl FolderEntry {
    fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }
}

#[derive(Clone)]
pub struct DriveFetcher {
    client: Client,
    base_url: String,
    max_retries: u32,
    max_download_bytes: u64,
}

impl DriveFetcher {
    pub fn new(
        base_url: impl Into<String>,
        max_retries: u32,
        max_download_bytes: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(concat!("resume-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: max_retries.max(1),
            max_download_bytes,
        })
    }

    /// GET with retries on connection errors, 429 and 5xx, using exponential backoff.
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Response, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Drive request attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url).query(query).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(FetchError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(FetchError::Status {
                    status: status.as_u16(),
                });
                continue;
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(FetchError::Status { status: 503 }))
    }

    async fn list_folder(&self, id: &str) -> Result<Vec<FolderEntry>, FetchError> {
        let url = format!("{}/drive/folders/{id}", self.base_url);
        let page = self.get_with_retry(&url, &[]).await?.text().await?;
        parse_folder_listing(&page)
    }

    /// Downloads `id` into `dest`. `name` overrides the server-provided file name.
    async fn download(
        &self,
        id: &str,
        dest: &Path,
        name: Option<&str>,
    ) -> Result<PathBuf, FetchError> {
        let url = format!("{}/uc", self.base_url);
        let query = vec![
            ("export".to_string(), "download".to_string()),
            ("id".to_string(), id.to_string()),
        ];
        let mut response = self.get_with_retry(&url, &query).await?;

        if is_html(&response) {
            let page = response.text().await?;
            let (action, fields) =
                parse_confirm_form(&page).ok_or(FetchError::NotDownloadable)?;
            debug!("Following Drive download confirmation for {id}");
            response = self.get_with_retry(&action, &fields).await?;
            if is_html(&response) {
                return Err(FetchError::NotDownloadable);
            }
        }

        let file_name = name
            .map(sanitize_file_name)
            .or_else(|| {
                response
                    .headers()
                    .get(header::CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(file_name_from_disposition)
            })
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        let path = unique_path(dest, &file_name);

        self.stream_to_file(response, &path).await?;
        Ok(path)
    }

    async fn stream_to_file(&self, mut response: Response, path: &Path) -> Result<(), FetchError> {
        if let Some(len) = response.content_length() {
            if len > self.max_download_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_download_bytes,
                });
            }
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > self.max_download_bytes {
                drop(file);
                let _ = tokio::fs::remove_file(path).await;
                return Err(FetchError::TooLarge {
                    limit: self.max_download_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        debug!("Downloaded {written} bytes to {}", path.display());
        Ok(())
    }

    fn fetch_folder_recursive<'a>(
        &'a self,
        id: &'a str,
        dest: &'a Path,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<usize, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let entries = self.list_folder(id).await?;
            let mut count = 0;

            for entry in entries {
                if entry.is_folder() {
                    if depth + 1 >= MAX_FOLDER_DEPTH {
                        warn!("Skipping sub-folder {} beyond depth {MAX_FOLDER_DEPTH}", entry.name);
                        continue;
                    }
                    let sub = unique_path(dest, &sanitize_file_name(&entry.name));
                    tokio::fs::create_dir_all(&sub).await?;
                    count += self
                        .fetch_folder_recursive(&entry.id, &sub, depth + 1)
                        .await?;
                } else {
                    self.download(&entry.id, dest, Some(&entry.name)).await?;
                    count += 1;
                }
            }

            Ok(count)
        })
    }
}

#[async_trait]
impl ContentFetcher for DriveFetcher {
    async fn fetch_folder(&self, id: &str, dest: &Path) -> Result<usize, FetchError> {
        self.fetch_folder_recursive(id, dest, 0).await
    }

    async fn fetch_file(&self, id: &str, dest: &Path) -> Result<PathBuf, FetchError> {
        self.download(id, dest, None).await
    }
}

/// Exponential backoff before retry `attempt` (1-based): 1s, 2s, 4s, capped at 64s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000u64 << attempt.saturating_sub(1).min(6))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false)
}

/// Decodes the folder listing embedded in a Drive folder page.
pub fn parse_folder_listing(page: &str) -> Result<Vec<FolderEntry>, FetchError> {
    let encoded = IVD_PAYLOAD
        .captures(page)
        .map(|c| c[1].to_string())
        .ok_or_else(|| FetchError::FolderListing("no listing payload in page".to_string()))?;

    let decoded = unescape_js(&encoded);
    let payload: serde_json::Value = serde_json::from_str(&decoded)
        .map_err(|e| FetchError::FolderListing(format!("listing is not JSON: {e}")))?;

    let items = match payload.get(0) {
        Some(serde_json::Value::Array(items)) => items,
        // A null first element is how Drive renders an empty folder.
        Some(serde_json::Value::Null) => return Ok(vec![]),
        _ => return Err(FetchError::FolderListing("unexpected listing shape".to_string())),
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let id = item.get(0)?.as_str()?;
            let name = item.get(2)?.as_str()?;
            let mime_type = item.get(3).and_then(|m| m.as_str()).unwrap_or_default();
            Some(FolderEntry {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            })
        })
        .collect())
}

/// Extracts the action URL and hidden fields of Drive's download confirmation form.
pub fn parse_confirm_form(page: &str) -> Option<(String, Vec<(String, String)>)> {
    let action = FORM_ACTION.captures(page)?[1].replace("&amp;", "&");
    let fields = HIDDEN_INPUT
        .captures_iter(page)
        .map(|c| (c[1].to_string(), c[2].replace("&amp;", "&")))
        .collect();
    Some((action, fields))
}

/// Reads the file name from a `Content-Disposition` header, preferring the RFC 5987 form.
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    let raw = DISPOSITION_UTF8
        .captures(value)
        .map(|c| {
            String::from_utf8_lossy(&urlencoding::decode_binary(c[1].trim().as_bytes()))
                .into_owned()
        })
        .or_else(|| DISPOSITION_PLAIN.captures(value).map(|c| c[1].trim().to_string()))?;
    Some(sanitize_file_name(&raw))
}

/// Keeps only the final path component and drops characters unsafe for file names.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned
    }
}

fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let mut path = dir.join(name);
    let mut n = 1;
    while path.exists() {
        n += 1;
        path = dir.join(format!("{n}_{name}"));
    }
    path
}

/// Undoes JavaScript string-literal escaping (`\xNN`, `\uNNNN`, `\/`, `\\`, …).
fn unescape_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&hex),
                }
            }
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&hex),
                }
            }
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
