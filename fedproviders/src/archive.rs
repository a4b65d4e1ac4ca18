//! Internet Archive adapter focused on the Indian music collections
//!
//! The advanced search only returns item identifiers; the file list of each
//! item is then fetched to find something playable. Items without an audio
//! file are dropped.

use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceError, SourceId, Track, TrackBuilder,
    lenient_string,
};
use futures::future::join_all;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Default Internet Archive base URL
pub const DEFAULT_BASE_URL: &str = "https://archive.org";

const COLLECTION_CLAUSE: &str = "mediatype:audio AND (subject:(hindi OR bollywood OR punjabi OR tamil OR telugu) OR collection:(hindusthanirecords))";
const FIELDS: &[&str] = &["identifier", "title", "creator", "language", "downloads"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".ogg", ".flac"];

/// Maximum number of items looked up for a trending list
const TRENDING_ROWS: u32 = 25;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchResponse {
    pub(crate) response: SearchDocs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchDocs {
    pub(crate) docs: Vec<Doc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Doc {
    pub(crate) identifier: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) creator: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) language: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub(crate) collection: Option<String>,
    pub(crate) stream_url: Option<String>,
    pub(crate) download_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    files: Vec<FileEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileEntry {
    name: String,
}

fn is_audio_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Builds `{base}/{segments...}` with every segment percent-encoded
pub(crate) fn archive_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| SourceError::other(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

/// Runs an advanced search and returns the matching documents
pub(crate) async fn advanced_search(
    http: &HttpClient,
    base_url: &str,
    q: &str,
    rows: u32,
    page: u32,
    sort: Option<&str>,
    fields: &[&str],
) -> Result<Vec<Doc>> {
    let mut query: Vec<(&str, String)> = vec![
        ("q", q.to_string()),
        ("rows", rows.to_string()),
        ("page", page.to_string()),
        ("output", "json".to_string()),
    ];
    query.extend(fields.iter().map(|f| ("fl[]", f.to_string())));
    if let Some(sort) = sort {
        query.push(("sort[]", sort.to_string()));
    }

    let url = format!("{base_url}/advancedsearch.php");
    let response: SearchResponse = http.get_json(&url, &query).await?;
    Ok(response.response.docs)
}

#[derive(Debug)]
pub struct ArchiveAdapter {
    http: HttpClient,
    base_url: String,
}

impl ArchiveAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }

    /// Resolves one document to a playable track
    async fn resolve(&self, doc: Doc) -> Result<Option<Track>> {
        let Some(identifier) = doc.identifier else {
            return Ok(None);
        };
        let meta_url = archive_url(&self.base_url, &["metadata", &identifier])?;
        let metadata: Metadata = self.http.get_json(&meta_url, &[] as &[(&str, &str)]).await?;

        let Some(file) = metadata.files.into_iter().find(|f| is_audio_file(&f.name)) else {
            return Ok(None);
        };

        let stream = archive_url(&self.base_url, &["download", &identifier, &file.name])?;
        let image = archive_url(&self.base_url, &["services", "img", &identifier])?;
        Ok(Some(
            TrackBuilder::new(SourceId::Archive, format!("{}_{}", identifier, file.name))
                .name(doc.title.or_else(|| Some(file.name.clone())))
                .artist(doc.creator.or_else(|| Some("Internet Archive".to_string())))
                .album(Some(identifier.as_str()))
                .image_url(Some(image))
                .preview_url(Some(stream.clone()))
                .download_url(Some(stream))
                .language(doc.language)
                .build(),
        ))
    }

    async fn lookup(&self, q: &str, rows: u32, page: u32, sort: Option<&str>) -> Result<Vec<Track>> {
        let docs = advanced_search(&self.http, &self.base_url, q, rows, page, sort, FIELDS).await?;
        let resolved = join_all(docs.into_iter().map(|doc| self.resolve(doc))).await;
        Ok(resolved
            .into_iter()
            .filter_map(|r| match r {
                Ok(track) => track,
                Err(e) => {
                    debug!(error = %e, "Archive item lookup failed");
                    None
                }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ArchiveAdapter {
    fn id(&self) -> SourceId {
        SourceId::Archive
    }

    fn name(&self) -> &str {
        "Internet Archive (India)"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let query = query.trim();
        let q = if query.is_empty() {
            COLLECTION_CLAUSE.to_string()
        } else {
            format!("({query}) AND {COLLECTION_CLAUSE}")
        };
        self.lookup(&q, page_size, page, None).await
    }

    /// Most downloaded items of the collections
    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        let mut tracks = self
            .lookup(COLLECTION_CLAUSE, limit.min(TRENDING_ROWS), 1, Some("downloads desc"))
            .await?;
        tracks.truncate(limit as usize);
        Ok(tracks)
    }
}
