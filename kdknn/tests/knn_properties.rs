/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

#[macro_use]
extern crate assert_approx_eq;
extern crate kdknn;
extern crate pointcloud;

use kdknn::utils::{load_index, save_index};
use kdknn::*;
use pointcloud::data_sources::DataRam;
use pointcloud::label_sources::SmallIntLabels;
use pointcloud::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::sync::Arc;
use tempdir::TempDir;

fn gaussian_points(count: usize, dim: usize, seed: u64) -> DataRam<L2> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, 1.0).unwrap();
    let data: Vec<f32> = (0..count * dim).map(|_| normal.sample(&mut rng)).collect();
    DataRam::new(data, dim).unwrap()
}

fn brute_force(points: &DataRam<L2>, query: &[f32], k: usize) -> Vec<(f32, usize)> {
    let mut all: Vec<(f32, usize)> = (0..points.len())
        .map(|i| (L2::rdist(query, points.row(i)), i))
        .collect();
    all.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    all.truncate(k);
    all.iter().map(|(d, i)| (L2::rdist_to_dist(*d), *i)).collect()
}

fn scenario() -> KdIndex<L2> {
    let points = DataRam::<L2>::new(
        vec![
            0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 6.0, 6.0, 5.0, 6.0, 6.0,
        ],
        2,
    )
    .unwrap();
    let labels = SmallIntLabels::new(vec![0, 0, 0, 0, 1, 1, 1, 1], None);
    build(points, Some(labels), 2, 7).unwrap()
}

#[test]
fn eight_point_scenario() {
    let index = scenario();
    let found = query(&index, &[0.1, 0.1], 3).unwrap();
    let indexes: Vec<usize> = found.iter().map(|n| n.index).collect();
    // (1, 0) and (0, 1) are the same distance away, the smaller index comes first
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_approx_eq!(found[0].distance, 0.02f32.sqrt());
    assert_approx_eq!(found[1].distance, 0.82f32.sqrt());
    assert_approx_eq!(found[2].distance, found[1].distance);
    assert!(found.iter().all(|n| n.label == Some(0)));
    assert_eq!(index.classify(&[0.1, 0.1], 3).unwrap(), Some(0));
    assert_eq!(index.classify(&[5.4, 5.6], 3).unwrap(), Some(1));
}

#[test]
fn every_point_is_its_own_neighbor() {
    let points = gaussian_points(300, 4, 1);
    let copy = points.clone();
    let index = build(points, None, 5, 3).unwrap();
    for i in 0..copy.len() {
        let found = index.knn(copy.row(i), 1).unwrap();
        assert_eq!(found[0].1, i);
        assert_eq!(found[0].0, 0.0);
    }
}

#[test]
fn matches_brute_force() {
    let points = gaussian_points(200, 5, 2);
    let copy = points.clone();
    let index = build(points, None, 4, 11).unwrap();
    let queries = gaussian_points(50, 5, 3);
    for q in 0..queries.len() {
        for k in &[1, 5, 20] {
            let expected = brute_force(&copy, queries.row(q), *k);
            let found = index.knn(queries.row(q), *k).unwrap();
            assert_eq!(found.len(), *k);
            for ((d1, i1), (d2, i2)) in found.iter().zip(&expected) {
                assert_eq!(i1, i2);
                assert_approx_eq!(d1, d2);
            }
        }
    }
}

#[test]
fn grid_ties_match_brute_force() {
    let mut rng = SmallRng::seed_from_u64(21);
    let data: Vec<f32> = (0..600 * 3).map(|_| rng.gen_range(0..5) as f32).collect();
    let points = DataRam::<L2>::new(data, 3).unwrap();
    let copy = points.clone();
    let index = build(points, None, 4, 8).unwrap();
    let mut queries: Vec<Vec<f32>> = (0..20).map(|i| copy.row(i * 29).to_vec()).collect();
    queries.push(vec![2.5, 2.5, 2.5]);
    queries.push(vec![-1.0, 0.5, 4.0]);
    for q in &queries {
        for k in &[1, 7, 50, 600] {
            let expected: Vec<usize> = brute_force(&copy, q, *k).iter().map(|(_, i)| *i).collect();
            let found: Vec<usize> = index.knn(q, *k).unwrap().iter().map(|(_, i)| *i).collect();
            assert_eq!(found, expected);
        }
    }
}

#[test]
fn parallel_phase_matches_brute_force() {
    let points = gaussian_points(4000, 3, 4);
    let copy = points.clone();
    let mut builder = KdTreeBuilder::new();
    builder
        .set_leaf_capacity(6)
        .set_rng_seed(5)
        .set_serial_threshold(64)
        .set_parallel_depth(6);
    let index = builder.build_from_parts(points, None).unwrap();
    assert!(index.table().boundary() > 1);
    let queries = gaussian_points(30, 3, 6);
    for q in 0..queries.len() {
        let expected = brute_force(&copy, queries.row(q), 10);
        let found: Vec<usize> = index
            .knn(queries.row(q), 10)
            .unwrap()
            .iter()
            .map(|(_, i)| *i)
            .collect();
        let expected: Vec<usize> = expected.iter().map(|(_, i)| *i).collect();
        assert_eq!(found, expected);
    }
}

#[test]
fn kd_invariant_holds() {
    let points = gaussian_points(1000, 3, 8);
    let index = build(points, None, 3, 1).unwrap();
    let table = index.table();
    let mut leaves_seen = 0;
    let mut stack = vec![(table.root(), 0..index.len())];
    while let Some((i, range)) = stack.pop() {
        let node = table.nodes()[i];
        if let Some(leaf) = node.range() {
            assert_eq!(leaf, range);
            assert!(leaf.len() <= 3);
            leaves_seen += leaf.len();
            continue;
        }
        let dimension = node.dimension().unwrap();
        let (left, right) = node.children().unwrap();
        let split = range
            .clone()
            .find(|pos| index.points().coordinate(*pos, dimension) > node.cut_value())
            .unwrap();
        assert!(split > range.start);
        for pos in range.clone() {
            let below = index.points().coordinate(pos, dimension) <= node.cut_value();
            assert_eq!(below, pos < split);
        }
        stack.push((left, range.start..split));
        stack.push((right, split..range.end));
    }
    assert_eq!(leaves_seen, index.len());
    assert!(table.len() <= 2 * index.len() - 1);
}

#[test]
fn seeded_builds_are_deterministic() {
    let a = build(gaussian_points(2500, 4, 9), None, 8, 99).unwrap();
    let b = build(gaussian_points(2500, 4, 9), None, 8, 99).unwrap();
    assert_eq!(a.table(), b.table());
    assert_eq!(a.permutation(), b.permutation());
    let q = [0.3, -0.2, 0.1, 1.0];
    assert_eq!(a.knn(&q, 7).unwrap(), b.knn(&q, 7).unwrap());
    assert_eq!(a.knn(&q, 7).unwrap(), a.knn(&q, 7).unwrap());
}

#[test]
fn identical_points_make_a_single_leaf() {
    let points = DataRam::<L2>::new(vec![1.5; 3 * 500], 3).unwrap();
    let index = build(points, None, 4, 0).unwrap();
    assert_eq!(index.table().len(), 1);
    assert_eq!(index.table().nodes()[0].range(), Some(0..500));
    let found = index.knn(&[1.5, 1.5, 1.5], 3).unwrap();
    let indexes: Vec<usize> = found.iter().map(|(_, i)| *i).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[test]
fn k_equal_to_n_returns_everything() {
    let points = gaussian_points(40, 2, 12);
    let copy = points.clone();
    let index = build(points, None, 3, 0).unwrap();
    let q = [0.0, 0.0];
    let found = index.knn(&q, 40).unwrap();
    let expected = brute_force(&copy, &q, 40);
    let found_indexes: Vec<usize> = found.iter().map(|(_, i)| *i).collect();
    let expected_indexes: Vec<usize> = expected.iter().map(|(_, i)| *i).collect();
    assert_eq!(found_indexes, expected_indexes);
    assert!(matches!(
        index.knn(&q, 41),
        Err(KdError::KTooLarge { k: 41, len: 40 })
    ));
    assert!(matches!(index.knn(&q, 0), Err(KdError::ZeroK)));
}

#[test]
fn build_errors() {
    let empty = DataRam::<L2>::new(vec![], 2).unwrap();
    assert!(matches!(build(empty, None, 2, 0), Err(KdError::EmptyPointSet)));
    let labels = SmallIntLabels::new(vec![1, 2], None);
    assert!(matches!(
        build(gaussian_points(3, 2, 0), Some(labels), 2, 0),
        Err(KdError::LabelCountMismatch { .. })
    ));
}

#[test]
fn labeled_cloud_with_missing_labels() {
    let points = gaussian_points(60, 2, 13);
    let mask: Vec<bool> = (0..60).map(|i| i % 3 != 0).collect();
    let labels = SmallIntLabels::new((0..60).map(|i| (i % 2) as i64).collect(), Some(mask));
    let cloud = SimpleLabeledCloud::new(points, labels);
    let mut builder = KdTreeBuilder::new();
    builder.set_leaf_capacity(4).set_rng_seed(2);
    let index = builder.build_labeled(&cloud).unwrap();
    let found = index.query(cloud.point(9).unwrap(), 1).unwrap();
    assert_eq!(found[0].index, 9);
    assert_eq!(found[0].label, None);
    let found = index.query(cloud.point(10).unwrap(), 1).unwrap();
    assert_eq!(found[0].label, Some(0));
}

#[test]
fn save_and_load() {
    let dir = TempDir::new("kdknn_persist").unwrap();
    let path = dir.path().join("scenario.json");
    let index = scenario();
    save_index(&path, &index).unwrap();
    let loaded: KdIndex<L2> = load_index(&path).unwrap();
    assert_eq!(loaded.table(), index.table());
    assert_eq!(loaded.permutation(), index.permutation());
    assert_eq!(
        loaded.query(&[5.9, 5.1], 4).unwrap(),
        index.query(&[5.9, 5.1], 4).unwrap()
    );
}

#[test]
fn wrong_version_is_rejected() {
    let dir = TempDir::new("kdknn_persist").unwrap();
    let path = dir.path().join("scenario.json");
    scenario().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let bumped = text.replacen(
        &format!("\"format_version\":{}", FORMAT_VERSION),
        &format!("\"format_version\":{}", FORMAT_VERSION + 1),
        1,
    );
    assert_ne!(text, bumped);
    std::fs::write(&path, bumped).unwrap();
    assert!(matches!(
        KdIndex::<L2>::load(&path),
        Err(KdError::VersionMismatch { .. })
    ));
}

#[test]
fn bulk_queries_from_many_threads() {
    let points = gaussian_points(500, 3, 14);
    let index = Arc::new(build(points, None, 8, 0).unwrap());
    let interface = query_interface::BulkInterface::new(Arc::clone(&index));
    let mut rng = SmallRng::seed_from_u64(15);
    let queries: Vec<Vec<f32>> = (0..100)
        .map(|_| (0..3).map(|_| rng.gen_range(-2.0..2.0)).collect())
        .collect();
    let refs: Vec<&[f32]> = queries.iter().map(|q| &q[..]).collect();
    let results = interface.knn(&refs, 5);
    for (q, result) in queries.iter().zip(results) {
        assert_eq!(result.unwrap(), index.knn(q, 5).unwrap());
    }
}
