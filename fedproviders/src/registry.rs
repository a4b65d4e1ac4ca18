//! Builds the default adapter list
//!
//! Registration order matters: the engine concatenates fan-out results in
//! this order before deduplicating, so earlier sources win on duplicates.

use crate::archive::ArchiveAdapter;
use crate::audius::AudiusAdapter;
use crate::ccmixter::CcMixterAdapter;
use crate::curated::CuratedAdapter;
use crate::deezer::DeezerAdapter;
use crate::fma::FmaAdapter;
use crate::freesound::FreesoundAdapter;
use crate::gateway::GatewayAdapter;
use crate::http::HttpClient;
use crate::internet_archive::InternetArchiveAdapter;
use crate::jamendo::JamendoAdapter;
use crate::musiq::MusiqAdapter;
use crate::openverse::OpenverseAdapter;
use crate::radio::RadioAdapter;
use crate::settings::ProvidersSettings;
use crate::youtube::YoutubeAdapter;
use fedsource::{MirrorSet, Result, SourceAdapter};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Mirror set built according to the shuffle settings
fn mirror_set(settings: &ProvidersSettings, name: &str, mirrors: &[String], seed: u64) -> MirrorSet {
    let set = if settings.shuffle_mirrors {
        MirrorSet::shuffled(name, mirrors.to_vec(), seed)
    } else {
        MirrorSet::new(name, mirrors.to_vec())
    };
    set.with_budget(settings.mirror_budget())
}

/// Instantiates every provider adapter from `settings`
///
/// All adapters share one HTTP connection pool. The gateway is only
/// registered when its base URL is set.
pub fn default_adapters(settings: &ProvidersSettings) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let http = HttpClient::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()?;

    let seed = settings.mirror_seed.unwrap_or_else(|| rand::rng().random());

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    if settings.gateway_enabled() {
        adapters.push(Arc::new(GatewayAdapter::new(http.clone(), &settings.gateway)));
    }

    let musiq_mirrors = mirror_set(settings, "musiq", &settings.musiq.mirrors, seed);
    adapters.push(Arc::new(MusiqAdapter::new(
        http.clone(),
        &settings.musiq,
        musiq_mirrors,
    )));
    adapters.push(Arc::new(AudiusAdapter::new(http.clone(), &settings.audius)));
    adapters.push(Arc::new(JamendoAdapter::new(http.clone(), &settings.jamendo)));
    adapters.push(Arc::new(RadioAdapter::new(http.clone(), &settings.radio)));
    adapters.push(Arc::new(ArchiveAdapter::new(http.clone(), &settings.archive)));

    let youtube_mirrors = mirror_set(settings, "youtube", &settings.youtube.mirrors, seed);
    adapters.push(Arc::new(YoutubeAdapter::new(http.clone(), youtube_mirrors)));
    let deezer_mirrors = mirror_set(settings, "deezer", &settings.deezer.mirrors, seed);
    adapters.push(Arc::new(DeezerAdapter::new(http.clone(), deezer_mirrors)));

    adapters.push(Arc::new(OpenverseAdapter::new(http.clone(), &settings.openverse)));
    adapters.push(Arc::new(FreesoundAdapter::new(http.clone(), &settings.freesound)));
    adapters.push(Arc::new(InternetArchiveAdapter::new(
        http.clone(),
        &settings.internet_archive,
    )));
    adapters.push(Arc::new(FmaAdapter::new(http.clone(), &settings.fma)));
    adapters.push(Arc::new(CcMixterAdapter::new(http, &settings.ccmixter)));
    adapters.push(Arc::new(CuratedAdapter::incompetech()));
    adapters.push(Arc::new(CuratedAdapter::bensound()));

    info!(
        count = adapters.len(),
        shuffled = settings.shuffle_mirrors,
        "Provider adapters registered"
    );
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedsource::SourceId;

    #[test]
    fn test_default_registration_order() {
        let adapters = default_adapters(&ProvidersSettings::default()).unwrap();
        let ids: Vec<SourceId> = adapters.iter().map(|a| a.id()).collect();
        assert_eq!(ids.first(), Some(&SourceId::Musiq));
        assert_eq!(ids.last(), Some(&SourceId::Bensound));
        assert!(!ids.contains(&SourceId::Gateway));
        assert!(!ids.contains(&SourceId::Demo));
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn test_gateway_comes_first_when_configured() {
        let mut settings = ProvidersSettings::default();
        settings.gateway.base_url = "http://localhost:7000".to_string();
        settings.mirror_seed = Some(7);
        let adapters = default_adapters(&settings).unwrap();
        assert_eq!(adapters[0].id(), SourceId::Gateway);
        assert_eq!(adapters.len(), 15);
    }
}
