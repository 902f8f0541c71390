// Poster download: one GET for the image referenced by a resolved movie,
// streamed straight into `<Title><ext>` in the output directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::api::{Movie, Transport};
use crate::error::{LookupError, Result};

/// OMDb's placeholder for "no poster available".
pub const NO_POSTER: &str = "N/A";

/// Where the poster ended up and how many bytes were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// File name for a poster: the movie title followed by the extension of the
/// poster URL's last path segment (".jpg" for ".../poster.jpg"). Titles that
/// would name no file or a directory (`""`, `"."`, `".."`) become `poster`.
pub fn poster_filename(title: &str, poster_url: &str) -> String {
    let stem = if title.chars().all(|c| c == '.') {
        "poster"
    } else {
        title
    };
    let stem = stem.replace(['/', '\\'], "_");
    format!("{}{}", stem, extension(poster_url))
}

fn extension(poster_url: &str) -> &str {
    let path = poster_url.split(['?', '#']).next().unwrap_or(poster_url);
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => &path[dot..],
        _ => "",
    }
}

/// Download `movie`'s poster into `dir`.
///
/// Fails with [`LookupError::NoPoster`] without touching the network when
/// the movie has no poster URL. An existing file of the same name is
/// overwritten. If streaming the body fails the partial file is removed.
pub fn fetch_poster<T: Transport>(
    transport: &T,
    movie: &Movie,
    dir: &Path,
    progress: &ProgressBar,
) -> Result<PosterFile> {
    if movie.poster.is_empty() || movie.poster == NO_POSTER {
        return Err(LookupError::NoPoster);
    }

    let res = transport.get(&movie.poster)?;
    if res.status != StatusCode::OK {
        return Err(LookupError::Status {
            url: movie.poster.clone(),
            status: res.status,
        });
    }

    let path = dir.join(poster_filename(&movie.title, &movie.poster));
    if let Some(len) = res.content_length {
        progress.set_length(len);
    }

    let file = File::create(&path).map_err(|source| LookupError::Io {
        path: path.clone(),
        source,
    })?;
    let mut body = Body {
        inner: res.body,
        failed: false,
    };
    match stream(&mut body, file, progress) {
        Ok(bytes) => {
            info!(path = %path.display(), bytes, "poster written");
            Ok(PosterFile { path, bytes })
        }
        Err(source) => {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "could not remove partial poster");
            }
            if body.failed {
                Err(LookupError::Transport {
                    url: movie.poster.clone(),
                    source: Box::new(source),
                })
            } else {
                Err(LookupError::Io { path, source })
            }
        }
    }
}

/// Response body that remembers whether reading it failed, so a dropped
/// connection is not reported as a disk error.
struct Body {
    inner: Box<dyn Read>,
    failed: bool,
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
            e
        })
    }
}

fn stream(body: &mut Body, file: File, progress: &ProgressBar) -> io::Result<u64> {
    let mut writer = progress.wrap_write(BufWriter::new(file));
    let bytes = io::copy(body, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}
