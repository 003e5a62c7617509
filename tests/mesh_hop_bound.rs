//! Scenario S6 / property P6 - mesh fan-out bound: no `neighbors_table` entry anywhere in the
//! network ever carries a `neighbor_hop_count` beyond `MESH_HOP_N + 1`.

use dct_sim::config::SimConfig;
use dct_sim::network::Network;

fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dct_sim_scenario_{label}_{}", std::process::id()))
}

#[test]
fn mesh_table_entries_never_exceed_the_hop_cap() {
    let cfg = SimConfig {
        sim_node_count: 60,
        sim_duration: 5000.0,
        neighbor_table_max_hops: 2,
        packet_loss_ratio: 0.0,
        num_nodes_to_kill: 0,
        seed: 22,
        ..SimConfig::default()
    };
    let cap = cfg.neighbor_table_max_hops;
    let dir = temp_dir("mesh_hop_bound");
    let mut net = Network::new(cfg, &dir);
    net.run();

    for node in net.nodes.values() {
        for (peer, entry) in &node.neighbors_table {
            assert!(
                entry.neighbor_hop_count <= cap + 1,
                "node {} holds a mesh entry for {} with neighbor_hop_count {} > {}",
                node.id,
                peer,
                entry.neighbor_hop_count,
                cap + 1
            );
        }
    }

    let _ = std::fs::remove_dir_all(&dir);
}
