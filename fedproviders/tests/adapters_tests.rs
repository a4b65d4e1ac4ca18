//! Integration tests for the provider adapters against mock servers

use fedproviders::{
    ArchiveAdapter, AudiusAdapter, AudiusSettings, DeezerAdapter, EndpointSettings, FmaAdapter,
    GatewayAdapter, HttpClient, JamendoAdapter, JamendoSettings, MusiqAdapter, OpenverseAdapter,
    RadioAdapter, YoutubeAdapter,
};
use fedsource::{MirrorSet, SourceAdapter, SourceError, SourceId};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::new().unwrap()
}

#[tokio::test]
async fn test_audius_discovers_host_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [server.uri()]})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/tracks/search"))
        .and(query_param("query", "lofi"))
        .and(query_param("offset", "10"))
        .and(query_param("app_name", "tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "D7KyD", "title": "Night Drive", "user": {"name": "Synth"},
                      "duration": 183, "downloadable": false}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let settings = AudiusSettings {
        discovery_url: format!("{}/discovery", server.uri()),
        app_name: "tests".to_string(),
    };
    let adapter = AudiusAdapter::new(http(), &settings);

    let tracks = adapter.search("lofi", 2, 10).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "audius_D7KyD");
    assert_eq!(
        tracks[0].preview_url.as_deref(),
        Some(format!("{}/v1/tracks/D7KyD/stream?app_name=tests", server.uri()).as_str())
    );

    // Second call reuses the resolved host
    adapter.search("lofi", 2, 10).await.unwrap();
}

#[tokio::test]
async fn test_audius_empty_discovery_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let settings = AudiusSettings {
        discovery_url: server.uri(),
        app_name: "tests".to_string(),
    };
    let adapter = AudiusAdapter::new(http(), &settings);
    let err = adapter.trending(5).await.unwrap_err();
    assert!(matches!(err, SourceError::Discovery(_)));
}

#[tokio::test]
async fn test_musiq_fails_over_and_remembers_mirror() {
    let broken = MockServer::start().await;
    let working = MockServer::start().await;

    // Both search paths of the broken mirror fail, once each
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&broken)
        .await;

    // Newer mirror layout: only the /api prefix answers
    Mock::given(method("GET"))
        .and(path("/api/search/songs"))
        .and(query_param("query", "kesariya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"results": [
                {"id": "abc", "name": "Kesariya", "primaryArtists": "Arijit Singh",
                 "duration": 268, "language": "hindi",
                 "downloadUrl": [{"link": "https://cdn.example/96.mp4"}]}
            ]}
        })))
        .mount(&working)
        .await;

    let adapter = MusiqAdapter::with_mirrors(http(), vec![broken.uri(), working.uri()]);

    let tracks = adapter.search("kesariya", 1, 20).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "musiq_abc");
    assert_eq!(tracks[0].artist, "Arijit Singh");
    assert!(tracks[0].is_downloadable());

    // The working mirror is now preferred; the broken one is not hit again
    let again = adapter.search("kesariya", 1, 20).await.unwrap();
    assert_eq!(again.len(), 1);
}

#[tokio::test]
async fn test_musiq_all_mirrors_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let adapter = MusiqAdapter::with_mirrors(http(), vec![server.uri()]);
    let err = adapter.search("x", 1, 5).await.unwrap_err();
    assert!(matches!(err, SourceError::AllMirrorsFailed { tried: 1, .. }));
}

#[tokio::test]
async fn test_jamendo_sends_client_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .and(query_param("client_id", "secret"))
        .and(query_param("search", "piano"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "headers": {"status": "success"},
            "results": [{"id": "168", "name": "Etude", "artist_name": "Pia",
                         "album_name": "Keys", "duration": 95,
                         "audio": "https://mp3l.jamendo.com/168",
                         "musicinfo": {"tags": {"genres": ["classical"]}}}]
        })))
        .mount(&server)
        .await;

    let settings = JamendoSettings {
        base_url: server.uri(),
        client_id: "secret".to_string(),
    };
    let adapter = JamendoAdapter::new(http(), &settings);
    let tracks = adapter.search("piano", 1, 10).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "jamendo_168");
    assert_eq!(tracks[0].genre.as_deref(), Some("classical"));
    // No explicit download link: the stream is used
    assert_eq!(tracks[0].download_url, tracks[0].preview_url);
}

#[tokio::test]
async fn test_radio_stations_are_live_tracks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stations/topvote"))
        .and(query_param("hidebroken", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"stationuuid": "9617a958", "name": "Radio Mirchi", "country": "India",
             "url_resolved": "https://stream.example/mirchi", "language": "hindi"},
            {"name": "no uuid"}
        ])))
        .mount(&server)
        .await;

    let adapter = RadioAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let tracks = adapter.trending(10).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].artist, "Radio Station");
    assert_eq!(tracks[0].album, "India");
    assert_eq!(tracks[0].duration_ms, 0);
    assert_eq!(tracks[0].language.as_deref(), Some("hindi"));
}

#[tokio::test]
async fn test_fma_search_normalizes_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .and(query_param("q", "ambient"))
        .and(query_param("limit", "10"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dataset": [
                {"track_id": 1234, "track_title": "Drift", "artist_name": "Lee Rosevere",
                 "track_duration": "185", "track_file": "https://files.example/drift.mp3",
                 "track_license": "CC BY"},
                {"track_id": "77", "track_title": "Tide", "album_title": "Shores",
                 "track_duration": 200, "genre_handle": "Ambient"},
                {"track_title": "no id"}
            ]
        })))
        .mount(&server)
        .await;

    let adapter = FmaAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let tracks = adapter.search("ambient", 2, 10).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "fma_1234");
    assert_eq!(tracks[0].album, "Free Music Archive");
    assert_eq!(tracks[0].duration_ms, 185_000);
    assert_eq!(tracks[0].license.as_deref(), Some("CC BY"));
    assert!(tracks[0].is_downloadable());
    assert_eq!(tracks[1].id, "fma_77");
    assert_eq!(tracks[1].album, "Shores");
    assert_eq!(tracks[1].duration_ms, 200_000);
    assert_eq!(tracks[1].genre.as_deref(), Some("Ambient"));
    assert!(!tracks[1].is_playable());
}

#[tokio::test]
async fn test_fma_trending_searches_seed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .and(query_param("q", fedproviders::fma::TRENDING_SEED))
        .and(query_param("limit", "5"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dataset": [{"track_id": 9, "track_title": "Seeded"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = FmaAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let tracks = adapter.trending(5).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "fma_9");
    assert_eq!(tracks[0].source, SourceId::Fma);
}

#[tokio::test]
async fn test_openverse_retries_broader_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/audio/"))
        .and(query_param("q", "rain forest ambience"))
        .and(query_param("page_size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/audio/"))
        .and(query_param("q", "rain"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "r1", "title": "Rain", "audio": "https://cdn.example/rain.mp3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = OpenverseAdapter::new(
        http(),
        &EndpointSettings::new(format!("{}/v1/audio/", server.uri())),
    );
    let tracks = adapter.search("rain forest ambience", 1, 50).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "ov_r1");
}

#[tokio::test]
async fn test_openverse_rate_limit_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let adapter = OpenverseAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let err = adapter.trending(5).await.unwrap_err();
    assert!(err.is_rate_limit());
}

#[tokio::test]
async fn test_deezer_skips_empty_relay_answer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direct/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/relay/search"))
        .and(query_param("index", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 3135556, "title": "Harder", "duration": 224,
                      "artist": {"name": "Daft Punk"},
                      "album": {"title": "Discovery"},
                      "preview": "https://cdns-preview.example/x.mp3"}]
        })))
        .mount(&server)
        .await;

    let mirrors = MirrorSet::new(
        "deezer",
        vec![
            format!("{}/direct", server.uri()),
            format!("{}/relay", server.uri()),
        ],
    );
    let adapter = DeezerAdapter::new(http(), mirrors);
    let tracks = adapter.search("daft punk", 2, 20).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "dz_3135556");
    assert_eq!(tracks[0].source, SourceId::Deezer);
}

#[tokio::test]
async fn test_youtube_all_proxies_empty_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = YoutubeAdapter::new(http(), MirrorSet::new("youtube", vec![server.uri()]));
    let tracks = adapter.trending(10).await.unwrap();
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_archive_looks_up_item_files() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"docs": [
                {"identifier": "78_tere-bina", "title": "Tere Bina", "language": "Hindi"},
                {"identifier": "no-audio"}
            ]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/metadata/78_tere-bina"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"name": "cover.jpg"}, {"name": "Tere Bina.mp3"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/metadata/no-audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .mount(&server)
        .await;

    let adapter = ArchiveAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let tracks = adapter.search("tere bina", 1, 10).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "archive_78_tere-bina_Tere Bina.mp3");
    assert_eq!(tracks[0].artist, "Internet Archive");
    assert_eq!(
        tracks[0].preview_url.as_deref(),
        Some(format!("{}/download/78_tere-bina/Tere%20Bina.mp3", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_gateway_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "sufi"))
        .and(query_param("language", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"trackId": 5, "title": "Kun Faya", "uploader": "A",
                         "streamUrl": "https://gw.example/5"}]
        })))
        .mount(&server)
        .await;

    let adapter = GatewayAdapter::new(http(), &EndpointSettings::new(server.uri()));
    let tracks = adapter.search("sufi", 1, 20).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "gateway_5");
    assert_eq!(tracks[0].artist, "A");
}
