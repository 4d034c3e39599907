use std::fs::{self, File};

use ego_recommend::{read_measures, EgoNetworkRecommender, NetworkMeasure};

const N_SAMPLES: usize = 100;

fn sample_measures() -> Vec<NetworkMeasure> {
    (0..N_SAMPLES)
        .map(|i| NetworkMeasure {
            measure_name: "pagerank".to_string(),
            node: i.to_string(),
            measure_value: i as f64 / 10.0,
        })
        .collect()
}

#[test]
fn test_recommender_train() {
    let recommender = EgoNetworkRecommender::new(sample_measures());

    let results = recommender.train();

    let expected = (N_SAMPLES - 1) as f64 / 10.0;
    assert_eq!(results.len(), N_SAMPLES);
    assert_eq!(results[0].measure_value, expected);
    assert_eq!(results[0].node, "99");
    assert_eq!(results[0].score, 10.0);
}

#[test]
fn test_train_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measures.csv");

    let mut body = String::from("measure_name,node,measure_value\n");
    for m in sample_measures() {
        body.push_str(&format!("{},{},{}\n", m.measure_name, m.node, m.measure_value));
    }
    body.push_str("betweenness,12345,1000.0\n");
    fs::write(&path, body).unwrap();

    let measures = read_measures(File::open(&path).unwrap()).unwrap();
    let results = EgoNetworkRecommender::new(measures).exclude(["99"]).train();

    assert_eq!(results.len(), N_SAMPLES - 1);
    assert_eq!(results[0].node, "98");
    assert_eq!(results[0].measure_value, 9.8);
}
