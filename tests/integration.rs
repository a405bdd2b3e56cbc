use std::env;
use std::time::Duration;

use all_asserts::{assert_false, assert_true};
use serial_test::serial;

use cdn_blob::models::AdminUser;
use cdn_blob::session::{CdnApi, CdnSession, ConnectionState, SessionOptions, TransferMode};

/// These integration tests run against a real CDN instance.  As a result they
/// are ignored by default.  To run them, set the environment variable
/// CDN_TEST_URL to the base url of a test instance and CDN_TEST_USER /
/// CDN_TEST_PASSWORD to credentials with admin rights on it.
///
/// Note that these tests write blobs (only under paths starting with
/// `cdn_blob_unittest`) and create/remove a `cdn_blob_unittest` user.

fn test_url() -> String {
    env::var("CDN_TEST_URL").expect("CDN_TEST_URL must point at a test instance")
}

fn test_credentials() -> (String, String) {
    (
        env::var("CDN_TEST_USER").expect("CDN_TEST_USER must be set"),
        env::var("CDN_TEST_PASSWORD").expect("CDN_TEST_PASSWORD must be set"),
    )
}

async fn connected_session() -> CdnSession {
    let mut session = CdnSession::with_options(
        test_url(),
        SessionOptions {
            request_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        },
    )
    .unwrap();
    let (user, password) = test_credentials();
    assert_true!(session.connect(&user, &password).await.unwrap());
    session
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_ping() {
    let mut session = CdnSession::new(test_url());
    assert_eq!(session.ping().await.unwrap(), "pong");
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_login_rejected() {
    let mut session = CdnSession::new(test_url());
    let (user, _) = test_credentials();
    assert_false!(session
        .connect(&user, "definitely-not-the-password")
        .await
        .unwrap());
    assert_eq!(session.state(), ConnectionState::NotAuthenticated);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_blob_round_trip() {
    let mut session = connected_session().await;

    let payload: Vec<u8> = (0..=255).collect();
    let result = session
        .write_data("cdn_blob_unittest.bin", payload.clone())
        .await
        .unwrap();
    assert_true!(result.saved_successfully);

    let read_back = session.read_data("cdn_blob_unittest.bin").await.unwrap();
    assert_eq!(read_back.as_ref(), payload.as_slice());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_empty_blob_round_trip() {
    let mut session = connected_session().await;

    let result = session
        .write_data("cdn_blob_unittest_empty.bin", Vec::<u8>::new())
        .await
        .unwrap();
    assert_true!(result.saved_successfully);

    let read_back = session
        .read_data("cdn_blob_unittest_empty.bin")
        .await
        .unwrap();
    assert_true!(read_back.is_empty());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_multipart_round_trip() {
    let mut session = CdnSession::with_options(
        test_url(),
        SessionOptions {
            transfer_mode: TransferMode::Multipart,
            ..Default::default()
        },
    )
    .unwrap();
    let (user, password) = test_credentials();
    assert_true!(session.connect(&user, &password).await.unwrap());

    let payload = b"multipart payload".to_vec();
    let result = session
        .write_data("cdn_blob_unittest_mp.bin", payload.clone())
        .await
        .unwrap();
    assert_true!(result.saved_successfully);

    let read_back = session.read_data("cdn_blob_unittest_mp.bin").await.unwrap();
    assert_eq!(read_back.as_ref(), payload.as_slice());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_user_admin_cycle() {
    let mut session = connected_session().await;

    let user = AdminUser {
        user_name: "cdn_blob_unittest".to_string(),
        password: Some("initial".to_string()),
        salt: None,
        roles: vec!["reader".to_string()],
    };
    session.add_user(&user).await.unwrap();

    let users = session.get_all_users().await.unwrap();
    assert_true!(users.iter().any(|u| u.user_name == "cdn_blob_unittest"));

    let updated = AdminUser {
        roles: vec!["reader".to_string(), "writer".to_string()],
        ..user.clone()
    };
    session.update_user(&updated).await.unwrap();

    session.remove_user(&user).await.unwrap();
    let users = session.get_all_users().await.unwrap();
    assert_false!(users.iter().any(|u| u.user_name == "cdn_blob_unittest"));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_index_config_round_trip() {
    let mut session = connected_session().await;

    let config = session.get_index_config().await.unwrap();
    session.set_index_config(&config).await.unwrap();
    let read_back = session.get_index_config().await.unwrap();
    assert_eq!(read_back.enabled, config.enabled);
    assert_eq!(read_back.rebuild_interval, config.rebuild_interval);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_communication_config_round_trip() {
    let mut session = connected_session().await;

    let config = session.get_communication_config().await.unwrap();
    session.set_communication_config(&config).await.unwrap();
    let read_back = session.get_communication_config().await.unwrap();
    assert_eq!(read_back.host, config.host);
    assert_eq!(read_back.port, config.port);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_get_log() {
    let mut session = connected_session().await;
    // Only checks that the endpoint answers with a decodable payload.
    let _log = session.get_log().await.unwrap();
}
