//! Scenario S4 - network death threshold: under a tight energy budget and steady sensor traffic,
//! enough nodes deplete that `network_death_time` is eventually recorded, and it never un-sets.

use dct_sim::config::SimConfig;
use dct_sim::network::Network;

fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dct_sim_scenario_{label}_{}", std::process::id()))
}

#[test]
fn a_tight_energy_budget_eventually_triggers_network_death() {
    let cfg = SimConfig {
        sim_node_count: 30,
        sim_duration: 4000.0,
        initial_energy_j: 0.5,
        min_energy_j: 0.05,
        enable_data_packets: true,
        data_interval: 0.5,
        packet_loss_ratio: 0.0,
        num_nodes_to_kill: 0,
        seed: 22,
        ..SimConfig::default()
    };
    let dir = temp_dir("network_death");
    let mut net = Network::new(cfg, &dir);
    net.run();

    assert!(
        net.failure.network_death_time.is_some(),
        "a 0.5 J budget against 0.5 s sensor traffic should deplete at least half the nodes"
    );
    let recorded_at = net.failure.network_death_time.unwrap();
    assert!(recorded_at > 0.0 && recorded_at <= net.now());

    let dead = net.nodes.values().filter(|n| n.failed).count();
    let total = net.nodes.len();
    assert!(
        dead as f64 / total as f64 >= 0.5 - 1e-9,
        "dead fraction must have actually reached the configured threshold"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
