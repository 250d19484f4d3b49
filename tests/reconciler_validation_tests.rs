//! Integration tests for reconciler validation logic
//!
//! These tests verify that the validation functions for each CRD type
//! correctly accept valid specs and reject invalid ones.

use chia_operator::crd::{
    ChiaCA, ChiaCASpec, ChiaCrawler, ChiaCrawlerSpec, ChiaDataLayer, ChiaDataLayerSpec, ChiaFarmer,
    ChiaFarmerSpec, ChiaHarvester, ChiaHarvesterSpec, ChiaIntroducer, ChiaIntroducerSpec, ChiaNode,
    ChiaNodeSpec, ChiaSeeder, ChiaSeederSpec, ChiaTimelord, ChiaTimelordSpec, ChiaWallet,
    ChiaWalletSpec, CommonSpec, HostPathSpec, PeerSpec, PlotVolumeSpec, SecretKeyRef,
    VolumeSourceSpec,
};
use chia_operator::reconcilers::{
    ca, crawler, data_layer, farmer, harvester, introducer, node, seeder, timelord, wallet,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

// ============================================================================
// Test Helpers
// ============================================================================

fn valid_common() -> CommonSpec {
    CommonSpec {
        ca_secret_name: Some("chia-ca".to_string()),
        ..Default::default()
    }
}

fn valid_secret_key() -> SecretKeyRef {
    SecretKeyRef {
        name: "farmer-keys".to_string(),
        key: "mnemonic".to_string(),
    }
}

fn default_metadata(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some("default".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// ChiaCA Validation Tests
// ============================================================================

fn create_ca(spec: ChiaCASpec) -> ChiaCA {
    ChiaCA {
        metadata: default_metadata("test-ca"),
        spec,
        status: None,
    }
}

#[test]
fn ca_valid_spec_passes_validation() {
    let ca_resource = create_ca(ChiaCASpec {
        secret_name: "chia-ca".to_string(),
        image: None,
        image_pull_policy: None,
    });
    assert!(ca::validate(&ca_resource).is_ok());
}

#[test]
fn ca_empty_secret_name_fails_validation() {
    let ca_resource = create_ca(ChiaCASpec {
        secret_name: "  ".to_string(),
        image: None,
        image_pull_policy: None,
    });
    let result = ca::validate(&ca_resource);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("secretName"));
}

// ============================================================================
// ChiaNode Validation Tests
// ============================================================================

fn valid_node_spec() -> ChiaNodeSpec {
    ChiaNodeSpec {
        common: valid_common(),
        replicas: 1,
        full_node_peers: None,
    }
}

fn create_node(spec: ChiaNodeSpec) -> ChiaNode {
    ChiaNode {
        metadata: default_metadata("test-node"),
        spec,
        status: None,
    }
}

#[test]
fn node_valid_spec_passes_validation() {
    let chia_node = create_node(valid_node_spec());
    let result = node::validate(&chia_node);
    if let Err(e) = &result {
        panic!("Validation failed unexpectedly: {:?}", e);
    }
    assert!(result.is_ok());
}

#[test]
fn node_zero_replicas_fails_validation() {
    let mut spec = valid_node_spec();
    spec.replicas = 0;

    let chia_node = create_node(spec);
    let result = node::validate(&chia_node);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("replicas"));
}

#[test]
fn node_missing_ca_secret_fails_validation() {
    let mut spec = valid_node_spec();
    spec.common.ca_secret_name = None;

    let chia_node = create_node(spec);
    let result = node::validate(&chia_node);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("caSecretName"));
}

#[test]
fn node_empty_peer_host_fails_validation() {
    let mut spec = valid_node_spec();
    spec.full_node_peers = Some(vec![PeerSpec {
        host: String::new(),
        port: 8444,
    }]);

    let chia_node = create_node(spec);
    let result = node::validate(&chia_node);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("peer"));
}

#[test]
fn node_multiple_replicas_pass_validation() {
    for replicas in [1, 3, 5] {
        let mut spec = valid_node_spec();
        spec.replicas = replicas;

        let chia_node = create_node(spec);
        assert!(
            node::validate(&chia_node).is_ok(),
            "Replicas {} should be valid",
            replicas
        );
    }
}

// ============================================================================
// ChiaFarmer Validation Tests
// ============================================================================

fn valid_farmer_spec() -> ChiaFarmerSpec {
    ChiaFarmerSpec {
        common: valid_common(),
        full_node_peer: "mainnet-node.default.svc.cluster.local:8444".to_string(),
        secret_key: valid_secret_key(),
    }
}

fn create_farmer(spec: ChiaFarmerSpec) -> ChiaFarmer {
    ChiaFarmer {
        metadata: default_metadata("test-farmer"),
        spec,
        status: None,
    }
}

#[test]
fn farmer_valid_spec_passes_validation() {
    let chia_farmer = create_farmer(valid_farmer_spec());
    assert!(farmer::validate(&chia_farmer).is_ok());
}

#[test]
fn farmer_empty_full_node_peer_fails_validation() {
    let mut spec = valid_farmer_spec();
    spec.full_node_peer = String::new();

    let chia_farmer = create_farmer(spec);
    let result = farmer::validate(&chia_farmer);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("fullNodePeer"));
}

#[test]
fn farmer_empty_secret_key_name_fails_validation() {
    let mut spec = valid_farmer_spec();
    spec.secret_key.name = String::new();

    let chia_farmer = create_farmer(spec);
    let result = farmer::validate(&chia_farmer);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("secretKey"));
}

#[test]
fn farmer_missing_ca_secret_fails_validation() {
    let mut spec = valid_farmer_spec();
    spec.common.ca_secret_name = None;

    let chia_farmer = create_farmer(spec);
    let result = farmer::validate(&chia_farmer);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("caSecretName"));
}

// ============================================================================
// ChiaHarvester Validation Tests
// ============================================================================

fn valid_harvester_spec() -> ChiaHarvesterSpec {
    ChiaHarvesterSpec {
        common: valid_common(),
        farmer_address: "test-farmer.default.svc.cluster.local".to_string(),
        plot_volumes: vec![PlotVolumeSpec {
            name: "plots1".to_string(),
            source: VolumeSourceSpec {
                host_path: Some(HostPathSpec {
                    path: "/mnt/plots".to_string(),
                }),
                ..Default::default()
            },
        }],
    }
}

fn create_harvester(spec: ChiaHarvesterSpec) -> ChiaHarvester {
    ChiaHarvester {
        metadata: default_metadata("test-harvester"),
        spec,
        status: None,
    }
}

#[test]
fn harvester_valid_spec_passes_validation() {
    let chia_harvester = create_harvester(valid_harvester_spec());
    assert!(harvester::validate(&chia_harvester).is_ok());
}

#[test]
fn harvester_empty_farmer_address_fails_validation() {
    let mut spec = valid_harvester_spec();
    spec.farmer_address = String::new();

    let chia_harvester = create_harvester(spec);
    let result = harvester::validate(&chia_harvester);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("farmerAddress"));
}

#[test]
fn harvester_missing_ca_secret_fails_validation() {
    let mut spec = valid_harvester_spec();
    spec.common.ca_secret_name = None;

    let chia_harvester = create_harvester(spec);
    let result = harvester::validate(&chia_harvester);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("caSecretName"));
}

#[test]
fn harvester_no_plot_volumes_fails_validation() {
    let mut spec = valid_harvester_spec();
    spec.plot_volumes = vec![];

    let chia_harvester = create_harvester(spec);
    let result = harvester::validate(&chia_harvester);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("plot volume"));
}

#[test]
fn harvester_plot_volume_without_source_fails_validation() {
    let mut spec = valid_harvester_spec();
    spec.plot_volumes = vec![PlotVolumeSpec {
        name: "plots1".to_string(),
        source: VolumeSourceSpec::default(),
    }];

    let chia_harvester = create_harvester(spec);
    let result = harvester::validate(&chia_harvester);

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(err_msg.contains("plots1"));
}

#[test]
fn harvester_plot_volume_with_empty_name_fails_validation() {
    let mut spec = valid_harvester_spec();
    spec.plot_volumes = vec![PlotVolumeSpec {
        name: String::new(),
        source: VolumeSourceSpec::default(),
    }];

    let chia_harvester = create_harvester(spec);
    assert!(harvester::validate(&chia_harvester).is_err());
}

// ============================================================================
// ChiaWallet Validation Tests
// ============================================================================

fn valid_wallet_spec() -> ChiaWalletSpec {
    ChiaWalletSpec {
        common: valid_common(),
        full_node_peer: "mainnet-node.default.svc.cluster.local:8444".to_string(),
        secret_key: valid_secret_key(),
    }
}

fn create_wallet(spec: ChiaWalletSpec) -> ChiaWallet {
    ChiaWallet {
        metadata: default_metadata("test-wallet"),
        spec,
        status: None,
    }
}

#[test]
fn wallet_valid_spec_passes_validation() {
    let chia_wallet = create_wallet(valid_wallet_spec());
    assert!(wallet::validate(&chia_wallet).is_ok());
}

#[test]
fn wallet_empty_full_node_peer_fails_validation() {
    let mut spec = valid_wallet_spec();
    spec.full_node_peer = String::new();

    let chia_wallet = create_wallet(spec);
    assert!(wallet::validate(&chia_wallet).is_err());
}

#[test]
fn wallet_empty_secret_key_name_fails_validation() {
    let mut spec = valid_wallet_spec();
    spec.secret_key.name = String::new();

    let chia_wallet = create_wallet(spec);
    assert!(wallet::validate(&chia_wallet).is_err());
}

#[test]
fn wallet_missing_ca_secret_fails_validation() {
    let mut spec = valid_wallet_spec();
    spec.common.ca_secret_name = None;

    let chia_wallet = create_wallet(spec);
    assert!(wallet::validate(&chia_wallet).is_err());
}

// ============================================================================
// ChiaTimelord Validation Tests
// ============================================================================

fn valid_timelord_spec() -> ChiaTimelordSpec {
    ChiaTimelordSpec {
        common: valid_common(),
        full_node_peer: "mainnet-node.default.svc.cluster.local:8444".to_string(),
    }
}

fn create_timelord(spec: ChiaTimelordSpec) -> ChiaTimelord {
    ChiaTimelord {
        metadata: default_metadata("test-timelord"),
        spec,
        status: None,
    }
}

#[test]
fn timelord_valid_spec_passes_validation() {
    let chia_timelord = create_timelord(valid_timelord_spec());
    assert!(timelord::validate(&chia_timelord).is_ok());
}

#[test]
fn timelord_empty_full_node_peer_fails_validation() {
    let mut spec = valid_timelord_spec();
    spec.full_node_peer = "  ".to_string();

    let chia_timelord = create_timelord(spec);
    assert!(timelord::validate(&chia_timelord).is_err());
}

#[test]
fn timelord_missing_ca_secret_fails_validation() {
    let mut spec = valid_timelord_spec();
    spec.common.ca_secret_name = None;

    let chia_timelord = create_timelord(spec);
    assert!(timelord::validate(&chia_timelord).is_err());
}

// ============================================================================
// ChiaSeeder Validation Tests
// ============================================================================

fn valid_seeder_spec() -> ChiaSeederSpec {
    ChiaSeederSpec {
        common: valid_common(),
        domain_name: "seeder.example.com.".to_string(),
        nameserver: "ns1.example.com.".to_string(),
        rname: "hostmaster".to_string(),
        bootstrap_peer: None,
        minimum_height: None,
    }
}

fn create_seeder(spec: ChiaSeederSpec) -> ChiaSeeder {
    ChiaSeeder {
        metadata: default_metadata("test-seeder"),
        spec,
        status: None,
    }
}

#[test]
fn seeder_valid_spec_passes_validation() {
    let chia_seeder = create_seeder(valid_seeder_spec());
    assert!(seeder::validate(&chia_seeder).is_ok());
}

#[test]
fn seeder_empty_domain_name_fails_validation() {
    let mut spec = valid_seeder_spec();
    spec.domain_name = String::new();

    let chia_seeder = create_seeder(spec);
    let result = seeder::validate(&chia_seeder);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("domainName"));
}

#[test]
fn seeder_empty_nameserver_fails_validation() {
    let mut spec = valid_seeder_spec();
    spec.nameserver = String::new();

    let chia_seeder = create_seeder(spec);
    let result = seeder::validate(&chia_seeder);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("nameserver"));
}

#[test]
fn seeder_missing_ca_secret_fails_validation() {
    let mut spec = valid_seeder_spec();
    spec.common.ca_secret_name = None;

    let chia_seeder = create_seeder(spec);
    assert!(seeder::validate(&chia_seeder).is_err());
}

// ============================================================================
// ChiaIntroducer Validation Tests
// ============================================================================

fn create_introducer(spec: ChiaIntroducerSpec) -> ChiaIntroducer {
    ChiaIntroducer {
        metadata: default_metadata("test-introducer"),
        spec,
        status: None,
    }
}

#[test]
fn introducer_without_ca_secret_passes_validation() {
    // Introducers hold no keys and do not require the CA secret
    let chia_introducer = create_introducer(ChiaIntroducerSpec {
        common: CommonSpec::default(),
        port: None,
    });
    assert!(introducer::validate(&chia_introducer).is_ok());
}

#[test]
fn introducer_custom_port_passes_validation() {
    let chia_introducer = create_introducer(ChiaIntroducerSpec {
        common: CommonSpec::default(),
        port: Some(18445),
    });
    assert!(introducer::validate(&chia_introducer).is_ok());
}

#[test]
fn introducer_zero_port_fails_validation() {
    let chia_introducer = create_introducer(ChiaIntroducerSpec {
        common: CommonSpec::default(),
        port: Some(0),
    });
    let result = introducer::validate(&chia_introducer);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("port"));
}

// ============================================================================
// ChiaCrawler Validation Tests
// ============================================================================

fn create_crawler(spec: ChiaCrawlerSpec) -> ChiaCrawler {
    ChiaCrawler {
        metadata: default_metadata("test-crawler"),
        spec,
        status: None,
    }
}

#[test]
fn crawler_without_ca_secret_passes_validation() {
    // Crawlers do not require the CA secret
    let chia_crawler = create_crawler(ChiaCrawlerSpec {
        common: CommonSpec::default(),
        bootstrap_peer: None,
    });
    assert!(crawler::validate(&chia_crawler).is_ok());
}

#[test]
fn crawler_with_bootstrap_peer_passes_validation() {
    let chia_crawler = create_crawler(ChiaCrawlerSpec {
        common: CommonSpec::default(),
        bootstrap_peer: Some("node.example.com:8444".to_string()),
    });
    assert!(crawler::validate(&chia_crawler).is_ok());
}

#[test]
fn crawler_blank_bootstrap_peer_fails_validation() {
    let chia_crawler = create_crawler(ChiaCrawlerSpec {
        common: CommonSpec::default(),
        bootstrap_peer: Some("  ".to_string()),
    });
    let result = crawler::validate(&chia_crawler);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("bootstrapPeer"));
}

// ============================================================================
// ChiaDataLayer Validation Tests
// ============================================================================

fn valid_data_layer_spec() -> ChiaDataLayerSpec {
    ChiaDataLayerSpec {
        common: valid_common(),
        full_node_peer: "mainnet-node.default.svc.cluster.local:8444".to_string(),
        secret_key: valid_secret_key(),
        enable_http: true,
    }
}

fn create_data_layer(spec: ChiaDataLayerSpec) -> ChiaDataLayer {
    ChiaDataLayer {
        metadata: default_metadata("test-data-layer"),
        spec,
        status: None,
    }
}

#[test]
fn data_layer_valid_spec_passes_validation() {
    let chia_data_layer = create_data_layer(valid_data_layer_spec());
    assert!(data_layer::validate(&chia_data_layer).is_ok());
}

#[test]
fn data_layer_empty_full_node_peer_fails_validation() {
    let mut spec = valid_data_layer_spec();
    spec.full_node_peer = String::new();

    let chia_data_layer = create_data_layer(spec);
    assert!(data_layer::validate(&chia_data_layer).is_err());
}

#[test]
fn data_layer_empty_secret_key_name_fails_validation() {
    let mut spec = valid_data_layer_spec();
    spec.secret_key.name = String::new();

    let chia_data_layer = create_data_layer(spec);
    assert!(data_layer::validate(&chia_data_layer).is_err());
}

#[test]
fn data_layer_missing_ca_secret_fails_validation() {
    let mut spec = valid_data_layer_spec();
    spec.common.ca_secret_name = None;

    let chia_data_layer = create_data_layer(spec);
    assert!(data_layer::validate(&chia_data_layer).is_err());
}

#[test]
fn data_layer_http_disabled_passes_validation() {
    let mut spec = valid_data_layer_spec();
    spec.enable_http = false;

    let chia_data_layer = create_data_layer(spec);
    assert!(data_layer::validate(&chia_data_layer).is_ok());
}
