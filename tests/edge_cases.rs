//! Edge case tests for nsg.
//!
//! Unusual inputs and boundary conditions: tiny point sets, degenerate
//! geometry, invalid parameters and phase misuse.

use nsg::{BuildParams, GraphBuilder, KnnGraph, NsgError, NsgIndex, Phase, SearchParams, VectorStore};

fn complete_knn(n: u32) -> KnnGraph {
    KnnGraph::from_lists((0..n).map(|i| (0..n).filter(|&j| j != i).collect()).collect())
}

// =============================================================================
// Size edge cases
// =============================================================================

#[test]
fn single_point() {
    let points = vec![vec![3.0_f32, -1.0, 2.0]];
    let mut index = NsgIndex::new(3, 1).unwrap();
    let stats = index
        .build_with_knn(&points, &KnnGraph::from_lists(vec![vec![]]), &BuildParams::default())
        .unwrap();
    assert_eq!(stats.edges, 0);
    assert_eq!(stats.entry, 0);

    let hits = index.search(&[0.0, 0.0, 0.0], &SearchParams::new(5, 5)).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, 0);
    assert!((hits[0].1 - 14.0).abs() < 1e-5);
}

#[test]
fn two_points() {
    let points = vec![vec![0.0_f32], vec![1.0]];
    let mut index = NsgIndex::new(1, 2).unwrap();
    index
        .build_with_knn(&points, &complete_knn(2), &BuildParams::new(4, 1, 4))
        .unwrap();
    let graph = index.graph().unwrap();
    assert!(graph.is_connected());
    assert_eq!(graph.neighbors(0), &[1]);
    assert_eq!(graph.neighbors(1), &[0]);
}

#[test]
fn max_degree_one_on_a_line() {
    let points: Vec<Vec<f32>> = (0..7).map(|i| vec![i as f32]).collect();
    let mut index = NsgIndex::new(1, 7).unwrap();
    let stats = index
        .build_with_knn(&points, &complete_knn(7), &BuildParams::new(8, 1, 8))
        .unwrap();
    // Pruning leaves 4..=6 behind the entry 3 and every reached node full,
    // so each one is spliced into its predecessor's only edge.
    assert_eq!(stats.entry, 3);
    assert_eq!(stats.grafted, 3);
    assert_eq!(stats.spliced_grafts, 3);
    assert!(stats.degree.max <= 1);

    let graph = index.graph().unwrap();
    assert!(graph.is_connected());
    assert_eq!(graph.neighbors(3), &[4]);
    assert_eq!(graph.neighbors(4), &[5]);
    assert_eq!(graph.neighbors(5), &[6]);
    assert_eq!(graph.neighbors(6), &[2]);

    let hits = index.search(&[6.2], &SearchParams::new(1, 7)).unwrap();
    assert_eq!(hits[0].0, 6);
}

// =============================================================================
// Degenerate geometry
// =============================================================================

#[test]
fn all_points_identical() {
    let points = vec![vec![1.0_f32, 1.0]; 6];
    let mut index = NsgIndex::new(2, 6).unwrap();
    index
        .build_with_knn(&points, &complete_knn(6), &BuildParams::new(10, 5, 10))
        .unwrap();
    let graph = index.graph().unwrap();
    assert!(graph.is_connected());
    assert_eq!(graph.entry(), 0);

    let hits = index.search(&[1.0, 1.0], &SearchParams::new(6, 6)).unwrap();
    let ids: Vec<u32> = hits.iter().map(|h| h.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    assert!(hits.iter().all(|h| h.1 == 0.0));
}

#[test]
fn orphan_without_knn_neighbors_is_reachable() {
    // Node 4 sits far away, has an empty k-NN list and is listed by nobody.
    // Its own pruned edge is mirrored back by interlinking.
    let points = vec![vec![0.0_f32], vec![1.0], vec![2.0], vec![3.0], vec![100.0]];
    let knn = KnnGraph::from_lists(vec![vec![1], vec![0, 2], vec![1, 3], vec![2], vec![]]);
    let store = VectorStore::from_rows(&points, 1).unwrap();
    let (graph, _) = GraphBuilder::new(&store, &knn, &BuildParams::new(8, 2, 8))
        .unwrap()
        .build()
        .unwrap();
    assert!(graph.is_connected());
    assert!(graph.lists().iter().all(|l| l.len() <= 2));

    let mut index = NsgIndex::new(1, 5).unwrap();
    index.build_with_knn(&points, &knn, &BuildParams::new(8, 2, 8)).unwrap();
    let hits = index.search(&[99.0], &SearchParams::new(1, 4)).unwrap();
    assert_eq!(hits[0].0, 4);
}

#[test]
fn disconnected_knn_components_are_joined() {
    // Two clusters whose k-NN lists never cross.
    let mut points: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32, 0.0]).collect();
    points.extend((0..5).map(|i| vec![i as f32, 50.0]));
    let lists: Vec<Vec<u32>> = (0..10u32)
        .map(|i| {
            let base = if i < 5 { 0 } else { 5 };
            (base..base + 5).filter(|&j| j != i).collect()
        })
        .collect();
    let mut index = NsgIndex::new(2, 10).unwrap();
    index
        .build_with_knn(&points, &KnnGraph::from_lists(lists), &BuildParams::new(10, 4, 10))
        .unwrap();
    assert!(index.graph().unwrap().is_connected());

    let hits = index.search(&[4.0, 49.0], &SearchParams::new(1, 10)).unwrap();
    assert_eq!(hits[0].0, 9);
}

#[test]
fn high_dimension_with_padding() {
    let dim = 129;
    let points: Vec<Vec<f32>> = (0..20)
        .map(|i| (0..dim).map(|d| ((i * d) as f32 * 0.01).sin()).collect())
        .collect();
    let mut index = NsgIndex::new(dim, 20).unwrap();
    index
        .build_with_knn(&points, &complete_knn(20), &BuildParams::new(20, 8, 20))
        .unwrap();
    index.optimize().unwrap();
    assert_eq!(index.layout().unwrap().aligned_dimension(), 136);

    let hits = index.search_optimized(&points[13], &SearchParams::new(1, 20)).unwrap();
    assert_eq!(hits[0].0, 13);
    assert_eq!(hits[0].1, 0.0);
}

// =============================================================================
// Invalid input and parameters
// =============================================================================

#[test]
fn zero_build_parameters_are_rejected() {
    let points: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32]).collect();
    for params in [
        BuildParams::new(0, 2, 2),
        BuildParams::new(2, 0, 2),
        BuildParams::new(2, 2, 0),
    ] {
        let mut index = NsgIndex::new(1, 3).unwrap();
        let err = index.build_with_knn(&points, &complete_knn(3), &params).unwrap_err();
        assert!(matches!(err, NsgError::InvalidParameter(_)), "got {err:?}");
        assert!(err.is_caller_error());
        assert_eq!(index.phase(), Phase::Unbuilt);
    }
}

#[test]
fn search_parameters_are_checked() {
    let points: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32]).collect();
    let mut index = NsgIndex::new(1, 3).unwrap();
    index
        .build_with_knn(&points, &complete_knn(3), &BuildParams::new(4, 2, 4))
        .unwrap();
    assert!(matches!(
        index.search(&[0.0], &SearchParams::new(0, 4)),
        Err(NsgError::InvalidParameter(_))
    ));
    assert!(matches!(
        index.search(&[0.0], &SearchParams::new(5, 4)),
        Err(NsgError::InvalidParameter(_))
    ));
}

#[test]
fn ragged_rows_are_rejected() {
    let points = vec![vec![0.0_f32, 1.0], vec![2.0]];
    let mut index = NsgIndex::new(2, 2).unwrap();
    let err = index
        .build_with_knn(&points, &complete_knn(2), &BuildParams::default())
        .unwrap_err();
    assert!(matches!(err, NsgError::DimensionMismatch { expected: 2, actual: 1 }));
}

#[test]
fn out_of_range_knn_id_is_invalid_input() {
    let points: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32]).collect();
    let knn = KnnGraph::from_lists(vec![vec![1], vec![7], vec![0]]);
    let mut index = NsgIndex::new(1, 3).unwrap();
    assert!(matches!(
        index.build_with_knn(&points, &knn, &BuildParams::default()),
        Err(NsgError::InvalidInput(_))
    ));
}

#[test]
fn knn_list_count_must_match_points() {
    let points: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32]).collect();
    let mut index = NsgIndex::new(1, 3).unwrap();
    assert!(matches!(
        index.build_with_knn(&points, &complete_knn(4), &BuildParams::default()),
        Err(NsgError::InvalidInput(_))
    ));
}

#[test]
fn zero_dimension_is_rejected() {
    assert!(matches!(NsgIndex::new(0, 10), Err(NsgError::InvalidInput(_))));
}

#[test]
fn empty_point_set_cannot_be_built() {
    let points: Vec<Vec<f32>> = Vec::new();
    let mut index = NsgIndex::new(4, 0).unwrap();
    assert!(matches!(
        index.build_with_knn(&points, &KnnGraph::default(), &BuildParams::default()),
        Err(NsgError::InvalidInput(_))
    ));
}

#[test]
fn nan_query_does_not_panic() {
    let points: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.0]).collect();
    let mut index = NsgIndex::new(2, 10).unwrap();
    index
        .build_with_knn(&points, &complete_knn(10), &BuildParams::new(10, 4, 10))
        .unwrap();
    let hits = index.search(&[f32::NAN, 0.0], &SearchParams::new(3, 10)).unwrap();
    assert!(hits.len() <= 3);
}

// =============================================================================
// Configuration documents
// =============================================================================

#[test]
fn build_params_accept_reference_names() {
    let params = BuildParams::from_json_str(r#"{"L": 40, "R": 16, "C": 200, "nn_graph_path": "x.knng"}"#).unwrap();
    assert_eq!(params.pool_size, 40);
    assert_eq!(params.max_degree, 16);
    assert_eq!(params.max_candidates, 200);
    assert_eq!(params.knn_graph_path.to_str(), Some("x.knng"));
}

#[test]
fn malformed_config_is_config_error() {
    assert!(matches!(
        BuildParams::from_json_str("{\"L\": \"many\"}"),
        Err(NsgError::Config(_))
    ));
}
