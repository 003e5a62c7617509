//! Scenario S3 - kill & recover: a single node is killed mid-run and revived later; the
//! orchestrator logs both events and the network re-converges afterward.

use dct_sim::config::SimConfig;
use dct_sim::network::Network;
use dct_sim::types::Role;

fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dct_sim_scenario_{label}_{}", std::process::id()))
}

#[test]
fn a_killed_node_is_logged_revived_and_the_tree_re_converges() {
    let cfg = SimConfig {
        sim_node_count: 40,
        sim_duration: 1200.0,
        enable_data_packets: false,
        packet_loss_ratio: 0.0,
        failure_time: 500.0,
        recovery_time: 550.0,
        num_nodes_to_kill: 1,
        seed: 22,
        ..SimConfig::default()
    };
    let dir = temp_dir("kill_and_recover");
    let mut net = Network::new(cfg, &dir);
    net.run();

    let failures_csv = std::fs::read_to_string(dir.join("failures.csv")).unwrap();
    let killed = failures_csv.lines().filter(|l| l.contains("KILLED")).count();
    let recovered = failures_csv.lines().filter(|l| l.contains("RECOVERED")).count();
    assert_eq!(killed, 1, "num_nodes_to_kill=1 must produce exactly one KILLED row");
    assert_eq!(recovered, 1, "the one killed node must be revived exactly once");

    assert!(
        net.nodes.values().all(|n| !n.failed),
        "the only node ever killed was revived well before the run ended"
    );
    for node in net.nodes.values() {
        assert!(
            matches!(node.role, Role::Root | Role::ClusterHead | Role::Registered | Role::Router),
            "node {} failed to rejoin the tree after recovery",
            node.id
        );
    }

    let _ = std::fs::remove_dir_all(&dir);
}
