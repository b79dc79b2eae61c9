//! End-to-end artifact updates.

use media_updater::artifact::ArtifactPattern;
use media_updater::config::NetworkConfig;
use media_updater::release::{GitHubReleaseFeed, HttpDownloader, ReleaseResolver};
use media_updater::test_utils::{
    RecordingServiceManager, ServiceFixture, StubServer, init_test_logging,
};
use media_updater::update::{ArtifactUpdater, PruneResult, UpdateOutcome};
use std::fs;

fn pattern() -> ArtifactPattern {
    ArtifactPattern::new("komga-", ".jar").unwrap()
}

fn local_updater(
    fixture: &ServiceFixture,
    services: &RecordingServiceManager,
) -> ArtifactUpdater<GitHubReleaseFeed, HttpDownloader, RecordingServiceManager> {
    ArtifactUpdater::new(
        fixture.service_file(),
        pattern(),
        ReleaseResolver::local(fixture.artifact_dir(), pattern()),
        services.clone(),
    )
}

#[tokio::test]
async fn test_local_update_then_noop() {
    init_test_logging(None);
    let fixture = ServiceFixture::komga("1.0.0", &["1.0.0", "1.9.0", "2.0.0"]);
    let services = RecordingServiceManager::default();

    let outcome = local_updater(&fixture, &services).run().await.unwrap();

    assert!(matches!(
        outcome,
        UpdateOutcome::Updated {
            pruned: PruneResult::Deleted(2),
            ..
        }
    ));
    assert_eq!(fixture.service_text(), ServiceFixture::unit_text(fixture.artifact_dir(), "2.0.0"));
    assert_eq!(fixture.artifact_names(), vec!["komga-2.0.0.jar"]);
    assert_eq!(services.calls(), vec!["daemon-reload", "restart komga"]);

    let second = RecordingServiceManager::default();
    let outcome = local_updater(&fixture, &second).run().await.unwrap();

    assert!(matches!(outcome, UpdateOutcome::NoUpdateNeeded { .. }));
    assert!(second.calls().is_empty());
    assert_eq!(fixture.artifact_names(), vec!["komga-2.0.0.jar"]);
}

#[tokio::test]
async fn test_same_version_sibling_pruned_active_kept() {
    let fixture = ServiceFixture::komga("1.0.0", &["1.0.0", "2.0.0"]);
    let nested = fixture.artifact_dir().join("old");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("komga-2.0.0.jar"), b"").unwrap();

    let outcome =
        local_updater(&fixture, &RecordingServiceManager::default()).run().await.unwrap();

    match outcome {
        UpdateOutcome::Updated {
            active,
            pruned,
            ..
        } => {
            assert_eq!(active, fixture.artifact_dir().join("komga-2.0.0.jar"));
            assert_eq!(pruned, PruneResult::Deleted(2));
            assert!(active.is_file());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!nested.join("komga-2.0.0.jar").exists());
}

#[tokio::test]
async fn test_newest_jar_in_subdirectory_is_what_the_unit_starts() {
    let fixture = ServiceFixture::komga("1.0.0", &["1.0.0"]);
    let staging = fixture.artifact_dir().join("staging");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("komga-2.0.0.jar"), b"").unwrap();

    local_updater(&fixture, &RecordingServiceManager::default()).run().await.unwrap();

    let unit = fixture.service_text();
    let exec = unit.lines().find(|line| line.starts_with("ExecStart=")).unwrap();
    let jar = exec.rsplit(' ').next().unwrap();
    assert_eq!(jar, staging.join("komga-2.0.0.jar").display().to_string());
    assert!(std::path::Path::new(jar).is_file());
    assert_eq!(fixture.artifact_names(), vec!["staging"]);
}

#[tokio::test]
async fn test_crlf_unit_file_keeps_other_lines() {
    let fixture = ServiceFixture::komga("1.0.0", &["1.0.0", "1.1.0"]);
    let original = fixture.service_text().replace('\n', "\r\n");
    fs::write(fixture.service_file(), &original).unwrap();

    local_updater(&fixture, &RecordingServiceManager::default()).run().await.unwrap();

    let updated = fixture.service_text();
    let changed: Vec<(&str, &str)> = original
        .split_inclusive('\n')
        .zip(updated.split_inclusive('\n'))
        .filter(|(before, after)| before != after)
        .collect();
    assert_eq!(changed.len(), 1);
    assert!(changed[0].1.starts_with("ExecStart="));
    assert!(changed[0].1.ends_with("komga-1.1.0.jar\r\n"));
}

#[tokio::test]
async fn test_remote_update_over_http() {
    let jar = StubServer::start("200 OK", b"PK\x03\x04jar".to_vec()).await;
    let release = format!(
        r#"{{"tag_name":"v1.2.0","assets":[
            {{"name":"komga-1.2.0-sources.tar.gz","browser_download_url":"{0}/sources"}},
            {{"name":"komga-1.2.0.jar","browser_download_url":"{0}/komga-1.2.0.jar"}}
        ]}}"#,
        jar.url()
    );
    let api = StubServer::start("200 OK", release.into_bytes()).await;

    let fixture = ServiceFixture::komga("1.1.0", &["1.1.0"]);
    let network = NetworkConfig {
        retries: 0,
        ..NetworkConfig::default()
    };
    let services = RecordingServiceManager::default();
    let updater = ArtifactUpdater::new(
        fixture.service_file(),
        pattern(),
        ReleaseResolver::remote(
            fixture.artifact_dir(),
            pattern(),
            GitHubReleaseFeed::with_api_base(&api.url(), "gotson/komga", &network).unwrap(),
            HttpDownloader::new(&network).unwrap(),
        ),
        services.clone(),
    );

    let outcome = updater.run().await.unwrap();

    assert!(matches!(outcome, UpdateOutcome::Updated { .. }));
    assert_eq!(fixture.artifact_names(), vec!["komga-1.2.0.jar"]);
    assert_eq!(fs::read(fixture.artifact_dir().join("komga-1.2.0.jar")).unwrap(), b"PK\x03\x04jar");
    assert!(fixture.service_text().contains("komga-1.2.0.jar"));
    assert_eq!(services.calls(), vec!["daemon-reload", "restart komga"]);

    let downloads = jar.requests();
    assert_eq!(downloads.len(), 1);
    assert!(downloads[0].starts_with("GET /komga-1.2.0.jar"));
}
