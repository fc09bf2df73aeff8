use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use futures_util::AsyncReadExt;
use isahc::{
    AsyncBody, Response,
    config::{Configurable, RedirectPolicy},
};
use tokio::{fs, io::AsyncWriteExt, task::JoinSet, time::Instant};

use crate::{
    Error,
    config::{DatabaseFile, Download},
};

const CHUNK_SIZE: usize = 64 * 1024;
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Makes sure every database file exists locally, downloading the missing
/// ones concurrently. Returns the first failure; remaining downloads are
/// aborted with it.
pub async fn ensure_databases<'a, I>(files: I, settings: &Download) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a DatabaseFile>,
{
    let mut missing = Vec::new();
    for file in files {
        if is_file(&file.path).await {
            debug!("database present: {}", file.path.display());
        } else {
            missing.push(file.clone());
        }
    }
    if missing.is_empty() {
        return Ok(());
    }

    let downloader = Downloader::new(settings)?;
    let mut tasks = JoinSet::new();
    for file in missing {
        if let Some(parent) = file.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let downloader = downloader.clone();
        tasks.spawn(async move {
            info!("download database: {}", file.path.display());
            downloader.fetch_with_retry(&file.url, &file.path).await?;
            info!("database downloaded: {}", file.path.display());
            Ok::<(), Error>(())
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    Ok(())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[derive(Clone)]
pub(crate) struct Downloader {
    inner: isahc::HttpClient,
    max_attempts: usize,
    backoff: Duration,
}

impl Downloader {
    pub fn new(settings: &Download) -> Result<Self, Error> {
        let inner = isahc::HttpClient::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect_policy(RedirectPolicy::Follow)
            .default_header(
                "user-agent",
                format!("ipgeo/{}", env!("CARGO_PKG_VERSION")),
            )
            .build()?;

        Ok(Self {
            inner,
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_secs(settings.backoff_secs),
        })
    }

    /// Waits `backoff * (attempt - 1)` before each retry.
    pub async fn fetch_with_retry(&self, url: &str, path: &Path) -> Result<(), Error> {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                info!(
                    "retry download {} ({}/{})",
                    path.display(),
                    attempt,
                    self.max_attempts
                );
                tokio::time::sleep(retry_delay(self.backoff, attempt)).await;
            }

            match self.fetch(url, path).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(
                        "download attempt {}/{} for {} failed: {}",
                        attempt,
                        self.max_attempts,
                        path.display(),
                        err
                    );
                    last_err = Some(err);
                }
            }
        }

        let source = last_err.unwrap_or_else(|| Error::Download {
            path: path.to_path_buf(),
            status: 0,
        });
        error!("download retries exhausted: {}", path.display());
        Err(Error::RetriesExhausted {
            path: path.to_path_buf(),
            attempts: self.max_attempts,
            source: Box::new(source),
        })
    }

    /// Streams into `<path>.tmp` and renames on success so a partial file is
    /// never mistaken for a database.
    async fn fetch(&self, url: &str, path: &Path) -> Result<(), Error> {
        let tmp = tmp_path(path);
        let result = self.download_to(url, path, &tmp).await;
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn download_to(&self, url: &str, path: &Path, tmp: &Path) -> Result<(), Error> {
        let response: Response<AsyncBody> = self.inner.get_async(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                path: path.to_path_buf(),
                status: status.as_u16(),
            });
        }

        let mut progress = Progress::new(path, response.body().len());
        let mut body = response.into_body();
        let mut file = fs::File::create(tmp).await?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = body.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
            progress.advance(n as u64);
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

fn retry_delay(backoff: Duration, attempt: usize) -> Duration {
    let steps = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
    backoff.saturating_mul(steps)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

struct Progress<'a> {
    path: &'a Path,
    total: Option<u64>,
    current: u64,
    last_report: Instant,
}

impl<'a> Progress<'a> {
    fn new(path: &'a Path, total: Option<u64>) -> Self {
        Self {
            path,
            total: total.filter(|total| *total > 0),
            current: 0,
            last_report: Instant::now(),
        }
    }

    fn advance(&mut self, n: u64) {
        self.current += n;
        if self.last_report.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        match self.total {
            Some(total) => info!(
                "download progress {}: {:.2}% ({}/{} bytes)",
                self.path.display(),
                self.current as f64 / total as f64 * 100.0,
                self.current,
                total
            ),
            None => info!(
                "download progress {}: {} bytes",
                self.path.display(),
                self.current
            ),
        }
    }
}
