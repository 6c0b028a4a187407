// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process lifecycle against the real mock plugin.

mod common;

use std::time::Duration;

use hangar_core::HangarError;
use hangar_test_utils::{MockBehavior, PluginFixture, PluginTree, spawn_count};

use common::{eventually, mock_plugin, mock_bin, runtime_for};

#[tokio::test]
async fn concurrent_starts_spawn_one_process() {
    let tree = PluginTree::new();
    let dir = tree.add(&mock_plugin("sms", "alisms").sms().behavior(MockBehavior {
        init_delay_ms: 300,
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    let starts = (0..8).map(|_| {
        let runtime = runtime.clone();
        async move { runtime.start("sms", "alisms", "sms-alisms-1", "{}").await }
    });
    let results = futures::future::join_all(starts).await;

    for result in &results {
        assert_eq!(result.as_ref().unwrap().plugin_id, "alisms");
    }
    assert_eq!(spawn_count(&dir), 1);
    assert!(runtime.is_running("sms", "alisms"));
    assert_eq!(runtime.list_running().len(), 1);

    runtime.shutdown().await;
    assert!(!runtime.is_running("sms", "alisms"));
}

#[tokio::test]
async fn start_of_running_plugin_returns_cached_manifest() {
    let tree = PluginTree::new();
    let dir = tree.add(&mock_plugin("kyc", "tencent").kyc().version("2.1.0"));
    let runtime = runtime_for(&tree);

    let first = runtime.start("kyc", "tencent", "kyc-tencent-1", "").await.unwrap();
    let second = runtime.start("kyc", "tencent", "kyc-tencent-1", "").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.version, "2.1.0");
    assert_eq!(spawn_count(&dir), 1);

    runtime.shutdown().await;
}

#[tokio::test]
async fn stop_is_idempotent_and_ends_heartbeat() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);
    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();

    let plugin = runtime.get_running("sms", "alisms").unwrap();
    assert!(eventually(Duration::from_secs(5), || plugin.health().beats >= 2).await);

    runtime.stop("sms", "alisms").await;
    runtime.stop("sms", "alisms").await;
    runtime.stop("sms", "never-started").await;
    assert!(!runtime.is_running("sms", "alisms"));
    assert!(runtime.health("sms", "alisms").is_none());

    let beats = plugin.health().beats;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(plugin.health().beats, beats);
}

#[tokio::test]
async fn heartbeat_reports_the_init_config() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);
    runtime
        .start("sms", "alisms", "sms-alisms-1", r#"{"region":"cn"}"#)
        .await
        .unwrap();

    assert!(
        eventually(Duration::from_secs(5), || {
            runtime
                .health("sms", "alisms")
                .and_then(|h| h.last_health)
                .is_some_and(|h| h.message == r#"{"region":"cn"}"#)
        })
        .await
    );
    runtime.shutdown().await;
}

#[tokio::test]
async fn init_rejection_leaves_nothing_behind() {
    let tree = PluginTree::new();
    let dir = tree.add(&mock_plugin("payment", "ezpay").payment(&["alipay"]).behavior(MockBehavior {
        init_error: "missing merchant key".into(),
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    let err = runtime.start("payment", "ezpay", "payment-ezpay-1", "{}").await.unwrap_err();
    assert_eq!(err, HangarError::InitRejected("missing merchant key".into()));
    assert!(!runtime.is_running("payment", "ezpay"));

    // A retry launches a fresh process rather than reusing a failed one.
    let err = runtime.start("payment", "ezpay", "payment-ezpay-1", "{}").await.unwrap_err();
    assert!(matches!(err, HangarError::InitRejected(_)));
    assert_eq!(spawn_count(&dir), 2);
    assert!(runtime.list_running().is_empty());
}

#[tokio::test]
async fn empty_manifest_plugin_id_fails_start() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "blank").sms().behavior(MockBehavior {
        manifest_plugin_id: Some(String::new()),
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    let err = runtime.start("sms", "blank", "sms-blank-1", "{}").await.unwrap_err();
    assert!(matches!(err, HangarError::Process(_)), "{err:?}");
    assert!(!runtime.is_running("sms", "blank"));
}

#[tokio::test]
async fn unsupported_platform_never_spawns() {
    let tree = PluginTree::new();
    let dir = tree.add(
        &PluginFixture::new("sms", "legacy")
            .sms()
            .platforms(&["plan9/mips"])
            .binary(mock_bin()),
    );
    let runtime = runtime_for(&tree);

    let err = runtime.start("sms", "legacy", "sms-legacy-1", "{}").await.unwrap_err();
    match err {
        HangarError::PlatformUnsupported { supported, .. } => assert!(supported.iter().any(|p| p == "plan9/mips")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(spawn_count(&dir), 0);
}

#[tokio::test]
async fn non_executable_entry_is_a_process_error() {
    let tree = PluginTree::new();
    tree.add(&PluginFixture::new("sms", "broken").sms());
    let runtime = runtime_for(&tree);

    let err = runtime.start("sms", "broken", "sms-broken-1", "{}").await.unwrap_err();
    assert!(matches!(err, HangarError::Process(_)), "{err:?}");
}

#[tokio::test]
async fn exited_process_is_removed_from_the_table() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "flaky").sms().behavior(MockBehavior {
        exit_after_init_ms: Some(100),
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    runtime.start("sms", "flaky", "sms-flaky-1", "{}").await.unwrap();
    assert!(eventually(Duration::from_secs(5), || !runtime.is_running("sms", "flaky")).await);
    assert!(runtime.list_running().is_empty());
}

#[tokio::test]
async fn stop_during_start_discards_the_process() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "slow").sms().behavior(MockBehavior {
        init_delay_ms: 500,
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    let starting = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.start("sms", "slow", "sms-slow-1", "{}").await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;
    runtime.stop("sms", "slow").await;

    let err = starting.await.unwrap().unwrap_err();
    assert!(matches!(err, HangarError::Process(_)), "{err:?}");
    assert!(!runtime.is_running("sms", "slow"));
}

#[tokio::test]
async fn restart_after_stop_spawns_a_fresh_process() {
    let tree = PluginTree::new();
    let dir = tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);

    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();
    let first_pid = runtime.get_running("sms", "alisms").unwrap().pid();
    runtime.stop("sms", "alisms").await;
    assert!(!runtime.is_running("sms", "alisms"));

    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();
    let second = runtime.get_running("sms", "alisms").unwrap();
    assert_ne!(second.pid(), first_pid);
    assert_eq!(spawn_count(&dir), 2);
    assert!(eventually(Duration::from_secs(5), || second.health().beats >= 1).await);

    runtime.shutdown().await;
}

#[tokio::test]
async fn start_after_stop_during_start_launches_anew() {
    let tree = PluginTree::new();
    let dir = tree.add(&mock_plugin("sms", "slow").sms().behavior(MockBehavior {
        init_delay_ms: 800,
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);

    let doomed = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.start("sms", "slow", "sms-slow-1", "{}").await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;
    runtime.stop("sms", "slow").await;

    let manifest = runtime.start("sms", "slow", "sms-slow-1", "{}").await.unwrap();
    assert_eq!(manifest.plugin_id, "slow");

    let err = doomed.await.unwrap().unwrap_err();
    assert!(matches!(err, HangarError::Process(_)), "{err:?}");
    assert!(runtime.is_running("sms", "slow"));
    assert_eq!(runtime.list_running().len(), 1);
    assert_eq!(spawn_count(&dir), 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn shutdown_refuses_new_starts() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);
    runtime.shutdown().await;

    let err = runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap_err();
    assert!(matches!(err, HangarError::Process(_)));
}
