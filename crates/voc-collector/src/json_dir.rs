//! Offline page source backed by JSON dumps

use crate::{CollectorError, RawReview, ReviewPage, ReviewPager};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A dump file holds either a flat review list (one page) or a list of pages
#[derive(Deserialize)]
#[serde(untagged)]
enum DumpFile {
    Pages(Vec<DumpPage>),
    Reviews(Vec<RawReview>),
}

#[derive(Deserialize)]
struct DumpPage {
    reviews: Vec<RawReview>,
}

/// Reads `<dir>/<app_id>.json` dumps.
///
/// Continuation tokens are page positions within the dump.
#[derive(Debug, Clone)]
pub struct JsonDirPager {
    dir: PathBuf,
}

impl JsonDirPager {
    /// Pager over the dumps in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the dumps
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self, app_id: &str) -> Result<Vec<Vec<RawReview>>, CollectorError> {
        let path = self.dir.join(format!("{}.json", app_id));
        let contents = std::fs::read_to_string(&path)?;

        let dump: DumpFile = serde_json::from_str(&contents)
            .map_err(|e| CollectorError::Parse(format!("{}: {}", path.display(), e)))?;

        Ok(match dump {
            DumpFile::Pages(pages) => pages.into_iter().map(|p| p.reviews).collect(),
            DumpFile::Reviews(reviews) => vec![reviews],
        })
    }
}

impl ReviewPager for JsonDirPager {
    type Error = CollectorError;

    fn fetch_page(
        &self,
        app_id: &str,
        continuation: Option<&str>,
    ) -> Result<ReviewPage, Self::Error> {
        let mut pages = self.load(app_id)?;

        let idx = match continuation {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| CollectorError::Parse(format!("bad continuation token '{}'", token)))?,
            None => 0,
        };

        if idx >= pages.len() {
            return Ok(ReviewPage::default());
        }

        let next = (idx + 1 < pages.len()).then(|| (idx + 1).to_string());
        Ok(ReviewPage {
            reviews: pages.swap_remove(idx),
            next,
        })
    }
}
