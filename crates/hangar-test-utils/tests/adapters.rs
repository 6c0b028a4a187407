// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability adapters and the payment registry against live mock plugins.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use hangar_adapters::{
    AutomationAdapter, CreateHost, KycAdapter, PaymentCreate, PaymentProvider, PaymentProviderRegistry,
    PluginPaymentProvider, RawHttpRequest, RefundCreate, SmsAdapter, SmsMessage,
};
use hangar_core::{HangarError, InstallationStore, PluginInstallation, SignatureStatus};
use hangar_protocol::payment::PaymentStatus;
use hangar_test_utils::{MemoryInstallationStore, MockBehavior, PluginTree};

use common::{mock_plugin, runtime_for};

fn message(phones: &[&str]) -> SmsMessage {
    SmsMessage {
        template_id: "welcome".into(),
        phones: phones.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn sms_only_plugin_serves_sms_but_not_payment() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);
    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();

    let plugin = runtime.get_running("sms", "alisms").unwrap();
    assert!(matches!(plugin.payment(), Err(HangarError::NotSupported(_))));
    let provider = PluginPaymentProvider::new(runtime.clone(), "sms", "alisms", "sms-alisms-1", "alipay", "");
    let err = provider.create_payment(&PaymentCreate::default()).await.unwrap_err();
    assert!(matches!(err, HangarError::NotSupported(_)), "{err:?}");

    let sms = SmsAdapter::new(runtime.clone(), "alisms", "sms-alisms-1");
    assert_eq!(sms.send(&message(&["+8613800000000"])).await.unwrap(), "msg-1");
    assert_eq!(
        sms.send(&message(&[])).await.unwrap_err(),
        HangarError::Rejected("no recipients".into())
    );

    runtime.shutdown().await;
}

#[tokio::test]
async fn adapter_follows_stop_and_restart() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "alisms").sms());
    let runtime = runtime_for(&tree);
    let sms = SmsAdapter::new(runtime.clone(), "alisms", "sms-alisms-1");

    assert!(matches!(sms.send(&message(&["1"])).await, Err(HangarError::NotRunning(_))));

    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();
    let first_pid = runtime.get_running("sms", "alisms").unwrap().pid();
    assert!(sms.send(&message(&["1"])).await.unwrap().starts_with("msg-"));

    runtime.stop("sms", "alisms").await;
    assert_eq!(
        sms.send(&message(&["1"])).await.unwrap_err(),
        HangarError::NotRunning("sms:alisms".into())
    );

    runtime.start("sms", "alisms", "sms-alisms-1", "{}").await.unwrap();
    assert_ne!(runtime.get_running("sms", "alisms").unwrap().pid(), first_pid);
    assert!(sms.send(&message(&["1"])).await.unwrap().starts_with("msg-"));

    // Reinstalled under a new instance id: the old binding no longer matches.
    runtime.stop("sms", "alisms").await;
    runtime.start("sms", "alisms", "sms-alisms-2", "{}").await.unwrap();
    assert!(matches!(sms.send(&message(&["1"])).await, Err(HangarError::NotRunning(_))));

    runtime.shutdown().await;
}

#[tokio::test]
async fn dropped_call_leaves_the_connection_usable() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("sms", "slow").sms().behavior(MockBehavior {
        call_delay_ms: 400,
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);
    runtime.start("sms", "slow", "sms-slow-1", "{}").await.unwrap();
    let sms = SmsAdapter::new(runtime.clone(), "slow", "sms-slow-1");

    let abandoned = tokio::time::timeout(Duration::from_millis(50), sms.send(&message(&["1"]))).await;
    assert!(abandoned.is_err());

    let bounded = sms.clone().with_timeout(Duration::from_millis(100));
    let err = bounded.send(&message(&["1"])).await.unwrap_err();
    assert!(matches!(err, HangarError::Timeout { .. }), "{err:?}");

    // Answers to abandoned calls are discarded; a fresh call still completes.
    let id = sms.send(&message(&["1"])).await.unwrap();
    assert!(id.starts_with("msg-"));
    assert!(runtime.is_running("sms", "slow"));

    runtime.shutdown().await;
}

#[tokio::test]
async fn kyc_start_and_query() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("kyc", "tencent").kyc());
    let runtime = runtime_for(&tree);
    runtime.start("kyc", "tencent", "kyc-tencent-1", "{}").await.unwrap();
    let kyc = KycAdapter::new(runtime.clone(), "tencent", "kyc-tencent-1");

    let started = kyc.start(42, BTreeMap::new()).await.unwrap();
    assert_eq!(started.token, "tok-42");
    assert_eq!(started.next_step, "redirect");

    let result = kyc.query_result(&started.token).await.unwrap();
    assert_eq!(result.status, "verified");
    assert_eq!(
        kyc.query_result("forged").await.unwrap_err(),
        HangarError::Rejected("unknown token".into())
    );

    let stale = KycAdapter::new(runtime.clone(), "tencent", "kyc-tencent-old");
    assert!(matches!(stale.start(42, BTreeMap::new()).await, Err(HangarError::NotRunning(_))));

    runtime.shutdown().await;
}

#[tokio::test]
async fn automation_adapter_maps_domain_types_and_errors() {
    let tree = PluginTree::new();
    tree.add(&mock_plugin("automation", "lxd").automation().behavior(MockBehavior {
        monitor_json: r#"{"CpuStats":12.6,"MemoryStats":50,"StorageStats":7.2,"NetworkStats":"{\"BytesIn\":10,\"BytesOut\":20}"}"#.into(),
        ..Default::default()
    }));
    let runtime = runtime_for(&tree);
    runtime
        .start("automation", "lxd", "automation-lxd-1", "{}")
        .await
        .unwrap();
    let adapter = AutomationAdapter::new(runtime.clone(), "lxd", "automation-lxd-1");

    let host_id = adapter
        .create_host(&CreateHost {
            line_id: 7,
            os: "debian-12".into(),
            host_name: "web-1".into(),
            sys_password: "pw".into(),
            vnc_password: "vnc".into(),
            expire_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            port_num: 10,
            cpu: 2,
            memory_gb: 4,
            disk_gb: 40,
            bandwidth_mbps: 100,
        })
        .await
        .unwrap();
    assert_eq!(host_id, 1007);

    let info = adapter.get_host_info(host_id).await.unwrap();
    assert_eq!(info.host_name, "vm-1007");
    assert_eq!(info.expire_at.unwrap().timestamp(), 1_900_000_000);

    adapter.lock(host_id).await.unwrap();
    assert_eq!(
        adapter.destroy(host_id).await.unwrap_err(),
        HangarError::Rejected("instance is protected".into())
    );
    assert!(matches!(adapter.reboot(host_id).await, Err(HangarError::NotSupported(_))));
    assert_eq!(adapter.vnc_url(host_id).await.unwrap(), "https://vnc.example/1007");

    let monitor = adapter.monitor(host_id).await.unwrap();
    assert_eq!(monitor.cpu_percent, 13);
    assert_eq!((monitor.bytes_in, monitor.bytes_out), (10, 20));

    let stale = AutomationAdapter::new(runtime.clone(), "lxd", "automation-lxd-old");
    assert!(matches!(stale.lock(host_id).await, Err(HangarError::NotRunning(_))));

    runtime.shutdown().await;
}

async fn enabled_installation(store: &MemoryInstallationStore, category: &str, plugin_id: &str) -> PluginInstallation {
    let mut inst = PluginInstallation::new_disabled(
        category,
        plugin_id,
        format!("{category}-{plugin_id}-1"),
        SignatureStatus::Official,
    );
    inst.enabled = true;
    store.upsert_installation(&inst).await.unwrap();
    store.get_installation(category, plugin_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn registry_lists_live_methods_and_follows_enablement() {
    let tree = PluginTree::new();
    tree.add(
        &mock_plugin("payment", "ezpay")
            .name("EZPay")
            .payment(&["alipay", "wx.pay", " ", "wxpay", "fail"]),
    );
    tree.add(&mock_plugin("payment", "idle").payment(&["card"]));
    let runtime = runtime_for(&tree);
    let store = Arc::new(MemoryInstallationStore::new());
    let ezpay = enabled_installation(&store, "payment", "ezpay").await;
    enabled_installation(&store, "payment", "idle").await;
    runtime
        .start("payment", "ezpay", &ezpay.instance_id, "{}")
        .await
        .unwrap();

    let registry = PaymentProviderRegistry::new(store.clone(), runtime.clone());
    let keys: Vec<String> = registry.list_providers().await.unwrap().iter().map(|p| p.key()).collect();
    assert_eq!(keys, ["ezpay.alipay", "ezpay.fail", "ezpay.wxpay"]);

    let provider = registry.get_provider_by_key("ezpay.alipay").await.unwrap().unwrap();
    assert_eq!(provider.name(), "EZPay / alipay");
    assert!(provider.schema_json().await.contains("api_key"));
    assert!(registry.get_provider_by_key("ezpay.wx.pay").await.unwrap().is_none());
    assert!(registry.get_provider_by_key("idle.card").await.unwrap().is_none());

    let created = provider
        .create_payment(&PaymentCreate {
            order_no: "O-1".into(),
            amount: 100,
            currency: "CNY".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.trade_no, "T-O-1");

    let notify = provider
        .verify_notify(&RawHttpRequest {
            method: "POST".into(),
            body: r#"{"order_no":"O-1","trade_no":"T-O-1","amount":100,"status":"paid"}"#.into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(notify.paid);
    assert_eq!(notify.raw["order_no"], "O-1");
    assert_eq!(notify.raw["status"], "paid");
    assert_eq!(notify.ack_body, "success");

    let query = provider.query_payment("T-O-1").await.unwrap();
    assert_eq!(query.status, PaymentStatus::Paid);
    assert!(matches!(
        provider.refund(&RefundCreate::default()).await,
        Err(HangarError::NotSupported(_))
    ));

    let declined = registry.get_provider_by_key("ezpay.fail").await.unwrap().unwrap();
    assert_eq!(
        declined.create_payment(&PaymentCreate::default()).await.unwrap_err(),
        HangarError::Rejected("payment declined".into())
    );

    let mut disabled = ezpay.clone();
    disabled.enabled = false;
    store.upsert_installation(&disabled).await.unwrap();
    assert!(registry.get_provider_by_key("ezpay.alipay").await.unwrap().is_none());
    assert!(registry.list_providers().await.unwrap().is_empty());

    runtime.shutdown().await;
}
